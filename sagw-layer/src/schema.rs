//! SQL schema definitions for the in-memory layer database.
//!
//! The schema is applied as a single batch when a layer is created.

/// Returns the full SQL schema as a single batch string.
///
/// This creates the following tables:
///
/// - `fields` - Ordered attribute field list (name, kind)
/// - `features` - One point per drillhole (dh_no, well_id, lon, lat, attributes as JSON)
/// - `categories` - Categorised style entries keyed on `well_id` (value, colour, label)
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS fields (
        position INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        kind TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS features (
        dh_no INTEGER PRIMARY KEY,
        well_id TEXT NOT NULL,
        lon REAL NOT NULL,
        lat REAL NOT NULL,
        attributes TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_features_well_id ON features(well_id);

    CREATE TABLE IF NOT EXISTS categories (
        position INTEGER PRIMARY KEY,
        value TEXT NOT NULL UNIQUE,
        colour TEXT NOT NULL,
        label TEXT NOT NULL
    );
    "#
}
