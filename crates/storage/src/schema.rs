//! Ntuple table schema.
//!
//! This module only declares tables; row emission lives in `store`.

use rusqlite::Connection;

/// Declare the four ntuple tables. Must run once, after the run's database
/// is opened and before any row is appended.
pub fn init_ntuples(conn: &Connection) -> rusqlite::Result<()> {
    // Per-event summary
    conn.execute(
        "CREATE TABLE IF NOT EXISTS event (
            eventID INTEGER NOT NULL,
            n_primaries INTEGER NOT NULL,
            n_hits INTEGER NOT NULL
        )",
        [],
    )?;

    // Primary particles
    conn.execute(
        "CREATE TABLE IF NOT EXISTS primary_particles (
            eventID INTEGER NOT NULL,
            particle TEXT NOT NULL,
            E_MeV REAL NOT NULL,
            dir_x REAL NOT NULL,
            dir_y REAL NOT NULL,
            dir_z REAL NOT NULL,
            pos_x_mm REAL NOT NULL,
            pos_y_mm REAL NOT NULL,
            pos_z_mm REAL NOT NULL
        )",
        [],
    )?;

    // Detector hits with local coordinates
    conn.execute(
        "CREATE TABLE IF NOT EXISTS hits (
            eventID INTEGER NOT NULL,
            detID INTEGER NOT NULL,
            det_name TEXT NOT NULL,
            copyNo INTEGER NOT NULL,
            edep_MeV REAL NOT NULL,
            x_mm REAL NOT NULL,
            y_mm REAL NOT NULL,
            z_mm REAL NOT NULL,
            t_ns REAL NOT NULL,
            particle TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_hits_event ON hits(eventID)",
        [],
    )?;

    // Retained scattering/absorption interactions
    conn.execute(
        "CREATE TABLE IF NOT EXISTS interactions (
            eventID INTEGER NOT NULL,
            trackID INTEGER NOT NULL,
            parentID INTEGER NOT NULL,
            process TEXT NOT NULL,
            volume TEXT NOT NULL,
            x_mm REAL NOT NULL,
            y_mm REAL NOT NULL,
            z_mm REAL NOT NULL,
            E_MeV REAL NOT NULL
        )",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntuple_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        init_ntuples(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for table in ["event", "primary_particles", "hits", "interactions"] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_ntuples(&conn).unwrap();
        init_ntuples(&conn).unwrap();
    }
}
