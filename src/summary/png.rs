use crate::domain::CountryRecord;
use crate::summary::font::{glyph, GLYPH_WIDTH};
use crate::summary::{RenderError, SummaryRenderer};
use chrono::{DateTime, SecondsFormat, Utc};
use image::{ImageFormat, Rgb, RgbImage};
use log::info;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// How many countries make the ranking.
pub const TOP_N: usize = 5;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const MARGIN: u32 = 50;
const MAX_LABEL_CHARS: usize = 36;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const BAR: Rgb<u8> = Rgb([46, 125, 50]);
const RULE: Rgb<u8> = Rgb([200, 200, 200]);

/// Writes an 800x600 PNG: total count, the top countries by estimated GDP
/// with proportional bars, and the generation time.
pub struct PngSummary {
    path: PathBuf,
}

impl PngSummary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn draw(countries: &[CountryRecord], generated_at: DateTime<Utc>) -> RgbImage {
        let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);

        draw_centered(
            &mut img,
            &format!("Total Countries: {}", countries.len()),
            30,
            3,
            BLACK,
        );
        fill_rect(&mut img, MARGIN, 70, WIDTH - 2 * MARGIN, 2, RULE);

        let top = top_by_gdp(countries, TOP_N);
        let max_gdp = top.first().map(|c| c.estimated_gdp).unwrap_or(0.0);
        let bar_span = WIDTH - 2 * MARGIN;

        for (i, country) in top.iter().enumerate() {
            let y = 95 + i as u32 * 80;
            let label = format!(
                "{}. {}: {:.2}",
                i + 1,
                clip(&country.name, MAX_LABEL_CHARS),
                country.estimated_gdp
            );
            draw_text(&mut img, &label, MARGIN, y, 2, BLACK);

            let bar_len = if max_gdp > 0.0 {
                ((country.estimated_gdp / max_gdp) * bar_span as f64).round() as u32
            } else {
                0
            };
            fill_rect(&mut img, MARGIN, y + 22, bar_len.max(2), 24, BAR);
        }

        fill_rect(&mut img, MARGIN, HEIGHT - 80, WIDTH - 2 * MARGIN, 2, RULE);
        let stamp = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        draw_centered(
            &mut img,
            &format!("Last Refreshed: {stamp}"),
            HEIGHT - 55,
            2,
            BLACK,
        );

        img
    }

    pub fn encode(img: &RgbImage) -> Result<Vec<u8>, RenderError> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

impl SummaryRenderer for PngSummary {
    fn render(
        &self,
        countries: &[CountryRecord],
        generated_at: DateTime<Utc>,
    ) -> Result<(), RenderError> {
        let bytes = Self::encode(&Self::draw(countries, generated_at))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        // Swap in a finished file so readers never see a partial PNG.
        let tmp = self.path.with_extension("png.tmp");
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, &self.path)?;

        info!(
            "Summary image written to {} ({} bytes)",
            self.path.display(),
            bytes.len()
        );
        Ok(())
    }
}

/// The `n` records with the highest estimated GDP, highest first.
pub fn top_by_gdp(countries: &[CountryRecord], n: usize) -> Vec<&CountryRecord> {
    let mut ranked: Vec<&CountryRecord> = countries.iter().collect();
    ranked.sort_by(|a, b| b.estimated_gdp.total_cmp(&a.estimated_gdp));
    ranked.truncate(n);
    ranked
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * (GLYPH_WIDTH + 1) * scale
}

fn draw_centered(img: &mut RgbImage, text: &str, y: u32, scale: u32, color: Rgb<u8>) {
    let x = WIDTH.saturating_sub(text_width(text, scale)) / 2;
    draw_text(img, text, x, y, scale, color);
}

fn draw_text(img: &mut RgbImage, text: &str, x: u32, y: u32, scale: u32, color: Rgb<u8>) {
    let advance = (GLYPH_WIDTH + 1) * scale;
    for (i, c) in text.chars().enumerate() {
        let origin = x + i as u32 * advance;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                    fill_rect(
                        img,
                        origin + col * scale,
                        y + row as u32 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}

/// Clipped to the canvas.
fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}
