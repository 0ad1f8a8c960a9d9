use std::io::Read;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::core::geo::{GeoPoint, PointKind};
use crate::utils::db::{DbError, GeoStore};

/// Download location of the reference dataset, logged when the file is missing.
pub const AIRPORTS_CSV_URL: &str = "https://davidmegginson.github.io/ourairports-data/airports.csv";

const MIN_FIELDS: usize = 13;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("store error: {0}")]
    Db(#[from] DbError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

/// Parses OurAirports-style rows into points.
///
/// Kept rows have a 4-character ident, a type containing `airport` or
/// `heliport`, and parseable latitude and longitude. Everything else is
/// counted as skipped.
pub fn parse_dataset<R: Read>(reader: R) -> (Vec<GeoPoint>, usize) {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for record in csv_reader.records() {
        match record.ok().and_then(|r| point_from_record(&r)) {
            Some(p) => points.push(p),
            None => skipped += 1,
        }
    }
    (points, skipped)
}

fn point_from_record(record: &csv::StringRecord) -> Option<GeoPoint> {
    if record.len() < MIN_FIELDS {
        return None;
    }
    let ident = record.get(1)?;
    let kind = record.get(2)?;
    if ident.chars().count() != 4 || !(kind.contains("airport") || kind.contains("heliport")) {
        return None;
    }

    let latitude = parse_number(record.get(4)?)?;
    let longitude = parse_number(record.get(5)?)?;
    let region_code = region_code(record.get(9).unwrap_or(""))?;

    Some(GeoPoint {
        id: ident.to_string(),
        display_name: record.get(3).unwrap_or("").to_string(),
        region_code: region_code.to_string(),
        country_code: record.get(8).unwrap_or("").to_string(),
        latitude: Some(latitude),
        longitude: Some(longitude),
        elevation: record.get(6).and_then(parse_number),
    })
}

/// `US-CO` gives `CO`, a code without `-` gives an empty string. A code whose
/// second segment is missing (`US-`, `US--`) is malformed and drops the row.
fn region_code(iso_region: &str) -> Option<&str> {
    if !iso_region.contains('-') {
        return Some("");
    }
    let mut parts: Vec<&str> = iso_region.split('-').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts.get(1).copied()
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse().ok()
}

/// Loads the dataset into both tables. A missing file is not an error: the
/// service then answers from the remote lookup alone.
pub fn load_into(store: &dyn GeoStore, path: &Path) -> Result<LoadSummary, LoadError> {
    if !path.exists() {
        warn!(path = %path.display(), "Airports dataset not found, skipping load");
        info!("Download from: {}", AIRPORTS_CSV_URL);
        return Ok(LoadSummary::default());
    }

    // each table commits on its own, so a load interrupted after the first
    // leaves the second empty; refill whichever is empty
    let airports = store.count(PointKind::Airport)?;
    let stations = store.count(PointKind::Station)?;
    if airports > 0 && stations > 0 {
        info!(airports, stations, "Store already populated, skipping load");
        return Ok(LoadSummary { loaded: airports, skipped: 0 });
    }

    info!(path = %path.display(), "Loading airports dataset");
    let file = std::fs::File::open(path)?;
    let (points, skipped) = parse_dataset(file);

    for (kind, existing) in [(PointKind::Airport, airports), (PointKind::Station, stations)] {
        if existing > 0 {
            info!(kind = %kind, count = existing, "Table already populated, leaving it alone");
            continue;
        }
        info!(kind = %kind, count = points.len(), "Saving points");
        store.bulk_insert(kind, &points)?;
    }

    info!(loaded = points.len(), skipped, "Loaded airports/stations from dataset");
    Ok(LoadSummary { loaded: points.len(), skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::db::SqliteStore;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const HEADER: &str = "id,ident,type,name,latitude_deg,longitude_deg,elevation_ft,continent,iso_country,iso_region,municipality,scheduled_service,gps_code,iata_code,local_code,home_link,wikipedia_link,keywords";

    fn dataset(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for r in rows {
            out.push('\n');
            out.push_str(r);
        }
        out
    }

    #[test]
    fn keeps_only_icao_airports_and_heliports() {
        let csv = dataset(&[
            r#"3486,KDEN,large_airport,"Denver International Airport",39.861698150635,-104.672996521,5434,NA,US,US-CO,Denver,yes,KDEN,DEN,DEN,,,"#,
            r#"1,00A,heliport,"Total RF Heliport",40.070985,-74.933689,11,NA,US,US-PA,Bensalem,no,K00A,,00A,,,"#,
            r#"2,KXYZ,closed,"Closed Field",40.0,-74.0,11,NA,US,US-PA,X,no,,,,,,"#,
            r#"3,EGHH,small_airport,"Bad Coords",,1.0,11,EU,GB,GB-ENG,X,no,,,,,,"#,
            r#"4,LFPH,heliport,"Paris, Issy",48.833302,2.27278,,EU,FR,FR-IDF,Paris,no,LFPH,,,,,"#,
            r#"5,SHRT,small_airport,"Too few fields",1.0,2.0"#,
        ]);
        let (points, skipped) = parse_dataset(csv.as_bytes());
        assert_eq!(skipped, 4);
        assert_eq!(points.len(), 2);

        let den = &points[0];
        assert_eq!(den.id, "KDEN");
        assert_eq!(den.display_name, "Denver International Airport");
        assert_eq!(den.region_code, "CO");
        assert_eq!(den.country_code, "US");
        assert_eq!(den.elevation, Some(5434.0));

        let issy = &points[1];
        assert_eq!(issy.display_name, "Paris, Issy");
        assert_eq!(issy.region_code, "IDF");
        assert_eq!(issy.elevation, None);
    }

    #[test]
    fn load_populates_both_tables() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open_or_init(dir.path().join("geo.sqlite")).unwrap();
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            dataset(&[r#"3486,KDEN,large_airport,"Denver International Airport",39.86,-104.67,5434.9,NA,US,US-CO,Denver,yes,KDEN,DEN,DEN,,,"#])
        )
        .unwrap();

        let summary = load_into(&store, file.path()).unwrap();
        assert_eq!(summary, LoadSummary { loaded: 1, skipped: 0 });

        let airport = store.find_by_id(PointKind::Airport, "KDEN").unwrap().unwrap();
        let station = store.find_by_id(PointKind::Station, "KDEN").unwrap().unwrap();
        assert_eq!(airport.coordinates(), station.coordinates());
        assert_eq!(airport.display_name, station.display_name);
        assert_eq!(airport.region_code, station.region_code);
        assert_eq!(airport.elevation, Some(5434.9));
        assert_eq!(station.elevation, Some(5434.0));

        // second start leaves the populated store alone
        let again = load_into(&store, file.path()).unwrap();
        assert_eq!(again.loaded, 1);
        assert_eq!(store.count(PointKind::Station).unwrap(), 1);
    }

    #[test]
    fn region_code_needs_a_second_segment() {
        assert_eq!(region_code("US-CO"), Some("CO"));
        assert_eq!(region_code("GB-ENG-X"), Some("ENG"));
        assert_eq!(region_code("ZZ"), Some(""));
        assert_eq!(region_code("US-"), None);
        assert_eq!(region_code("US--"), None);
    }

    #[test]
    fn truncated_region_drops_the_row() {
        let csv = dataset(&[
            r#"1,KAAA,small_airport,"Dangling Region",40.0,-105.0,5000,NA,US,US-,X,no,,,,,,"#,
            r#"2,KBBB,small_airport,"No Region",41.0,-105.0,5000,NA,US,US,X,no,,,,,,"#,
        ]);
        let (points, skipped) = parse_dataset(csv.as_bytes());
        assert_eq!(skipped, 1);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, "KBBB");
        assert_eq!(points[0].region_code, "");
    }

    #[test]
    fn refills_station_table_left_empty_by_interrupted_load() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open_or_init(dir.path().join("geo.sqlite")).unwrap();
        let row = r#"3486,KDEN,large_airport,"Denver International Airport",39.86,-104.67,5434,NA,US,US-CO,Denver,yes,KDEN,DEN,DEN,,,"#;
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", dataset(&[row])).unwrap();

        let (points, _) = parse_dataset(dataset(&[row]).as_bytes());
        store.bulk_insert(PointKind::Airport, &points).unwrap();
        assert_eq!(store.count(PointKind::Station).unwrap(), 0);

        let summary = load_into(&store, file.path()).unwrap();
        assert_eq!(summary, LoadSummary { loaded: 1, skipped: 0 });
        assert_eq!(store.count(PointKind::Airport).unwrap(), 1);
        assert_eq!(store.count(PointKind::Station).unwrap(), 1);
        assert!(store.find_by_id(PointKind::Station, "KDEN").unwrap().is_some());
    }

    #[test]
    fn missing_file_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open_or_init(dir.path().join("geo.sqlite")).unwrap();
        let summary = load_into(&store, &dir.path().join("absent.csv")).unwrap();
        assert_eq!(summary, LoadSummary::default());
        assert_eq!(store.count(PointKind::Airport).unwrap(), 0);
    }
}
