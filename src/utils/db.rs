use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::geo::{BoundingBox, GeoPoint, PointKind};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store task failed: {0}")]
    Join(String),
}

/// Airport and station lookup tables.
///
/// Implementations are read concurrently from many request tasks and written
/// only by the bulk load at startup.
pub trait GeoStore: Send + Sync {
    fn find_by_id(&self, kind: PointKind, id: &str) -> Result<Option<GeoPoint>, DbError>;

    /// Inclusive range match on both axes. Result order is unspecified.
    fn find_in_bounding_box(&self, kind: PointKind, bbox: &BoundingBox) -> Result<Vec<GeoPoint>, DbError>;

    /// Inserts every point in one transaction. A duplicate id fails the whole batch.
    fn bulk_insert(&self, kind: PointKind, points: &[GeoPoint]) -> Result<usize, DbError>;

    fn count(&self, kind: PointKind) -> Result<usize, DbError>;
}

/// SQLite-backed store. Every call opens its own connection so request tasks
/// never contend on a shared handle.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn open_or_init(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let store = Self { path };
        let conn = store.connect()?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS airport_cache (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                point_id TEXT NOT NULL UNIQUE,
                name TEXT,
                state TEXT,
                country TEXT,
                latitude REAL,
                longitude REAL,
                elevation REAL,
                cached_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS station_cache (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                point_id TEXT NOT NULL UNIQUE,
                name TEXT,
                state TEXT,
                country TEXT,
                latitude REAL,
                longitude REAL,
                elevation INTEGER,
                cached_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS airport_cache_lat_lon ON airport_cache(latitude, longitude);
            CREATE INDEX IF NOT EXISTS station_cache_lat_lon ON station_cache(latitude, longitude);
            "#,
        )?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, DbError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }
}

fn point_from_row(row: &Row<'_>) -> rusqlite::Result<GeoPoint> {
    Ok(GeoPoint {
        id: row.get(0)?,
        display_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        region_code: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        country_code: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        elevation: row.get(6)?,
    })
}

impl GeoStore for SqliteStore {
    fn find_by_id(&self, kind: PointKind, id: &str) -> Result<Option<GeoPoint>, DbError> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT point_id, name, state, country, latitude, longitude, elevation FROM {} WHERE point_id = ?1",
            kind.table()
        );
        let point = conn.query_row(&sql, params![id], point_from_row).optional()?;
        Ok(point)
    }

    fn find_in_bounding_box(&self, kind: PointKind, bbox: &BoundingBox) -> Result<Vec<GeoPoint>, DbError> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT point_id, name, state, country, latitude, longitude, elevation FROM {}
             WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4",
            kind.table()
        );
        let mut stmt = conn.prepare(&sql)?;
        let iter = stmt.query_map(
            params![bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon],
            point_from_row,
        )?;
        Ok(iter.collect::<Result<Vec<_>, rusqlite::Error>>()?)
    }

    fn bulk_insert(&self, kind: PointKind, points: &[GeoPoint]) -> Result<usize, DbError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let cached_at = chrono::Utc::now().to_rfc3339();
        {
            let sql = format!(
                "INSERT INTO {} (point_id, name, state, country, latitude, longitude, elevation, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                kind.table()
            );
            let mut stmt = tx.prepare(&sql)?;
            for p in points {
                match kind {
                    // station rows keep whole-foot elevation
                    PointKind::Station => stmt.execute(params![
                        p.id,
                        p.display_name,
                        p.region_code,
                        p.country_code,
                        p.latitude,
                        p.longitude,
                        p.elevation.map(|e| e as i64),
                        cached_at,
                    ])?,
                    PointKind::Airport => stmt.execute(params![
                        p.id,
                        p.display_name,
                        p.region_code,
                        p.country_code,
                        p.latitude,
                        p.longitude,
                        p.elevation,
                        cached_at,
                    ])?,
                };
            }
        }
        tx.commit()?;
        Ok(points.len())
    }

    fn count(&self, kind: PointKind) -> Result<usize, DbError> {
        let conn = self.connect()?;
        let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", kind.table()), [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
