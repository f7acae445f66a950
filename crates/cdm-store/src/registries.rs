use cdm_model::{CareSite, FactId};
use rusqlite::{Connection, params};

use crate::error::{Result, StoreError};

/// Insert hospitals that are not yet registered. Returns how many were new.
pub fn insert_care_sites(conn: &Connection, sites: &[CareSite]) -> Result<usize> {
    let mut stmt = conn
        .prepare(
            "INSERT OR IGNORE INTO care_site (care_site_name, care_site_source_value) VALUES (?1, ?2)",
        )
        .map_err(StoreError::write("care_site"))?;
    let mut inserted = 0;
    for site in sites {
        inserted += stmt
            .execute(params![site.name, site.code])
            .map_err(StoreError::write("care_site"))?;
    }
    Ok(inserted)
}

/// Remember which measurement a source culture id produced.
pub fn record_culture_origin(conn: &Connection, source_culture_id: &str, measurement: FactId) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO culture_origin (source_culture_id, culture_measurement_id) VALUES (?1, ?2)",
        params![source_culture_id, measurement.get()],
    )
    .map_err(StoreError::write("culture_origin"))?;
    Ok(())
}
