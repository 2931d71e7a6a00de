use crate::db::connection::Database;
use crate::domain::{CountryFilter, CountryRecord, NewCountry, SortOrder};
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};

/// Record store keyed by exact country name.
///
/// `insert` and `update` own the `created_at` / `updated_at` stamps;
/// callers only supply the refresh-owned fields.
pub trait CountryStore {
    fn find_by_name(&self, name: &str) -> Result<Option<CountryRecord>, ServerError>;
    fn insert(&self, country: &NewCountry) -> Result<CountryRecord, ServerError>;
    /// Overwrites every refresh-owned field of `existing`.
    fn update(
        &self,
        existing: &CountryRecord,
        country: &NewCountry,
    ) -> Result<CountryRecord, ServerError>;
    fn delete(&self, existing: &CountryRecord) -> Result<(), ServerError>;
    fn find_all(&self, filter: &CountryFilter) -> Result<Vec<CountryRecord>, ServerError>;
    fn count(&self) -> Result<i64, ServerError>;
    fn max_last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>, ServerError>;
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,                 -- 0
        name,               -- 1
        capital,            -- 2
        region,             -- 3
        population,         -- 4
        currency_code,      -- 5
        exchange_rate,      -- 6
        estimated_gdp,      -- 7
        flag_url,           -- 8
        last_refreshed_at,  -- 9
        created_at,         -- 10
        updated_at          -- 11
    FROM countries
"#;

fn micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn timestamp_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: i64 = row.get(idx)?;
    DateTime::from_timestamp_micros(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp {raw} out of range").into(),
        )
    })
}

fn map_country(row: &Row<'_>) -> rusqlite::Result<CountryRecord> {
    Ok(CountryRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        capital: row.get(2)?,
        region: row.get(3)?,
        population: row.get(4)?,
        currency_code: row.get(5)?,
        exchange_rate: row.get(6)?,
        estimated_gdp: row.get(7)?,
        flag_url: row.get(8)?,
        last_refreshed_at: timestamp_col(row, 9)?,
        created_at: timestamp_col(row, 10)?,
        updated_at: timestamp_col(row, 11)?,
    })
}

pub fn find_country_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<CountryRecord>, ServerError> {
    let sql = format!("{SELECT_COLUMNS} WHERE name = ?1");
    conn.query_row(&sql, params![name], map_country)
        .optional()
        .map_err(|e| ServerError::DbError(format!("find country failed: {e}")))
}

fn find_country_by_id(conn: &Connection, id: i64) -> Result<CountryRecord, ServerError> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, params![id], map_country)
        .map_err(|e| ServerError::DbError(format!("reload country {id} failed: {e}")))
}

pub fn insert_country(
    conn: &Connection,
    country: &NewCountry,
    now: DateTime<Utc>,
) -> Result<CountryRecord, ServerError> {
    conn.execute(
        r#"
        INSERT INTO countries (
            name, capital, region, population,
            currency_code, exchange_rate, estimated_gdp, flag_url,
            last_refreshed_at, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            &country.name,
            &country.capital,
            &country.region,
            country.population,
            &country.currency_code,
            country.exchange_rate,
            country.estimated_gdp,
            &country.flag_url,
            micros(country.last_refreshed_at),
            micros(now),
            micros(now),
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert country failed: {e}")))?;

    find_country_by_id(conn, conn.last_insert_rowid())
}

pub fn update_country(
    conn: &Connection,
    existing: &CountryRecord,
    country: &NewCountry,
    now: DateTime<Utc>,
) -> Result<CountryRecord, ServerError> {
    let changed = conn
        .execute(
            r#"
            UPDATE countries SET
                name = ?1, capital = ?2, region = ?3, population = ?4,
                currency_code = ?5, exchange_rate = ?6, estimated_gdp = ?7, flag_url = ?8,
                last_refreshed_at = ?9, updated_at = ?10
            WHERE id = ?11
            "#,
            params![
                &country.name,
                &country.capital,
                &country.region,
                country.population,
                &country.currency_code,
                country.exchange_rate,
                country.estimated_gdp,
                &country.flag_url,
                micros(country.last_refreshed_at),
                micros(now),
                existing.id,
            ],
        )
        .map_err(|e| ServerError::DbError(format!("update country failed: {e}")))?;

    if changed == 0 {
        return Err(ServerError::NotFound);
    }

    find_country_by_id(conn, existing.id)
}

pub fn delete_country(conn: &Connection, id: i64) -> Result<(), ServerError> {
    let changed = conn
        .execute("DELETE FROM countries WHERE id = ?1", params![id])
        .map_err(|e| ServerError::DbError(format!("delete country failed: {e}")))?;
    if changed == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn list_countries(
    conn: &Connection,
    filter: &CountryFilter,
) -> Result<Vec<CountryRecord>, ServerError> {
    let mut sql = format!("{SELECT_COLUMNS} WHERE 1 = 1");
    let mut args: Vec<&dyn ToSql> = Vec::new();

    if let Some(region) = &filter.region {
        args.push(region);
        sql.push_str(&format!(" AND region = ?{}", args.len()));
    }
    if let Some(code) = &filter.currency_code {
        args.push(code);
        sql.push_str(&format!(" AND currency_code = ?{}", args.len()));
    }

    match filter.sort {
        Some(SortOrder::GdpDesc) => sql.push_str(" ORDER BY estimated_gdp DESC, id ASC"),
        None => sql.push_str(" ORDER BY id ASC"),
    }

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(args.as_slice(), map_country)
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut countries = Vec::new();
    for row in rows {
        countries.push(row.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(countries)
}

pub fn count_countries(conn: &Connection) -> Result<i64, ServerError> {
    conn.query_row("SELECT COUNT(*) FROM countries", [], |r| r.get(0))
        .map_err(|e| ServerError::DbError(format!("count countries failed: {e}")))
}

pub fn latest_refresh(conn: &Connection) -> Result<Option<DateTime<Utc>>, ServerError> {
    let raw: Option<i64> = conn
        .query_row("SELECT MAX(last_refreshed_at) FROM countries", [], |r| r.get(0))
        .map_err(|e| ServerError::DbError(format!("max last_refreshed_at failed: {e}")))?;

    match raw {
        Some(v) => DateTime::from_timestamp_micros(v)
            .map(Some)
            .ok_or_else(|| ServerError::DbError(format!("timestamp {v} out of range"))),
        None => Ok(None),
    }
}

impl CountryStore for Database {
    fn find_by_name(&self, name: &str) -> Result<Option<CountryRecord>, ServerError> {
        self.with_conn(|conn| find_country_by_name(conn, name))
    }

    fn insert(&self, country: &NewCountry) -> Result<CountryRecord, ServerError> {
        self.with_conn(|conn| insert_country(conn, country, Utc::now()))
    }

    fn update(
        &self,
        existing: &CountryRecord,
        country: &NewCountry,
    ) -> Result<CountryRecord, ServerError> {
        self.with_conn(|conn| update_country(conn, existing, country, Utc::now()))
    }

    fn delete(&self, existing: &CountryRecord) -> Result<(), ServerError> {
        self.with_conn(|conn| delete_country(conn, existing.id))
    }

    fn find_all(&self, filter: &CountryFilter) -> Result<Vec<CountryRecord>, ServerError> {
        self.with_conn(|conn| list_countries(conn, filter))
    }

    fn count(&self) -> Result<i64, ServerError> {
        self.with_conn(|conn| count_countries(conn))
    }

    fn max_last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>, ServerError> {
        self.with_conn(|conn| latest_refresh(conn))
    }
}
