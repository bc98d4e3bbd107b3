//! Shared sqlite ntuple store.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::Connection;
use types::{EventId, EventSummary, Hit, InteractionRecord, PrimaryRecord};

use crate::schema::init_ntuples;

/// One database connection shared by every worker.
///
/// Uses interior mutability (Mutex) because workers commit rows concurrently;
/// the backend provides durability, this type only serializes access. Row
/// methods return the backend error so the caller can decide whether the
/// stream is dead.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file and declare the ntuple tables.
    pub fn open<P: AsRef<Path>>(path: P) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        init_ntuples(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_ntuples(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn fill_event_row(&self, summary: &EventSummary) -> rusqlite::Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO event (eventID, n_primaries, n_hits) VALUES (?1, ?2, ?3)",
        )?;
        stmt.execute(rusqlite::params![
            summary.event_id as i64,
            summary.n_primaries,
            summary.n_hits,
        ])?;
        Ok(())
    }

    pub fn fill_primary_row(&self, event: EventId, rec: &PrimaryRecord) -> rusqlite::Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO primary_particles
             (eventID, particle, E_MeV, dir_x, dir_y, dir_z, pos_x_mm, pos_y_mm, pos_z_mm)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        stmt.execute(rusqlite::params![
            event as i64,
            rec.name,
            rec.energy_mev,
            rec.dir.x,
            rec.dir.y,
            rec.dir.z,
            rec.pos_mm.x,
            rec.pos_mm.y,
            rec.pos_mm.z,
        ])?;
        Ok(())
    }

    pub fn fill_hit_row(&self, event: EventId, det_name: &str, hit: &Hit) -> rusqlite::Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO hits
             (eventID, detID, det_name, copyNo, edep_MeV, x_mm, y_mm, z_mm, t_ns, particle)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        stmt.execute(rusqlite::params![
            event as i64,
            hit.region.0,
            det_name,
            hit.copy_no,
            hit.edep_mev,
            hit.pos_local_mm.x,
            hit.pos_local_mm.y,
            hit.pos_local_mm.z,
            hit.t_ns,
            hit.particle,
        ])?;
        Ok(())
    }

    pub fn fill_interaction_row(
        &self,
        event: EventId,
        rec: &InteractionRecord,
    ) -> rusqlite::Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "INSERT INTO interactions
             (eventID, trackID, parentID, process, volume, x_mm, y_mm, z_mm, E_MeV)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        stmt.execute(rusqlite::params![
            event as i64,
            rec.track_id.0,
            rec.parent_track_id.0,
            rec.process,
            rec.volume,
            rec.pos_mm.x,
            rec.pos_mm.y,
            rec.pos_mm.z,
            rec.secondary_energy_mev,
        ])?;
        Ok(())
    }

    /// Row count of one table, for summaries and tests.
    pub fn count(&self, table: &str) -> rusqlite::Result<i64> {
        let conn = self.conn.lock();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{RegionId, TrackId, Vec3};

    #[test]
    fn rows_round_trip_counts() {
        let store = SqliteStore::open_in_memory().unwrap();

        store
            .fill_primary_row(
                3,
                &PrimaryRecord {
                    index: 0,
                    name: "gamma".into(),
                    pdg: 22,
                    energy_mev: 0.662,
                    dir: Vec3::new(0.0, 0.0, -1.0),
                    pos_mm: Vec3::new(0.0, 0.0, 300.0),
                    t0_ns: 0.0,
                },
            )
            .unwrap();

        let mut hit = Hit::new(RegionId(6), 11);
        hit.edep_mev = 0.4;
        hit.particle = "e-".into();
        store.fill_hit_row(3, "Calorimeter", &hit).unwrap();
        store.fill_hit_row(3, "Calorimeter", &hit).unwrap();

        store
            .fill_event_row(&EventSummary {
                event_id: 3,
                n_primaries: 1,
                n_hits: 2,
            })
            .unwrap();

        store
            .fill_interaction_row(
                3,
                &InteractionRecord {
                    track_id: TrackId(1),
                    parent_track_id: TrackId(0),
                    process: "compt".into(),
                    volume: "CsICrystal".into(),
                    pos_mm: Vec3::ZERO,
                    secondary_energy_mev: 0.2,
                },
            )
            .unwrap();

        assert_eq!(store.count("primary_particles").unwrap(), 1);
        assert_eq!(store.count("hits").unwrap(), 2);
        assert_eq!(store.count("event").unwrap(), 1);
        assert_eq!(store.count("interactions").unwrap(), 1);
    }

    #[test]
    fn stored_hit_uses_last_write_time() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut hit = Hit::new(RegionId(2), 0);
        hit.edep_mev = 1.5;
        hit.t_min_ns = 0.5;
        hit.t_ns = 9.0;
        hit.particle = "mu-".into();
        store.fill_hit_row(0, "Veto", &hit).unwrap();

        let t: f64 = store
            .conn
            .lock()
            .query_row("SELECT t_ns FROM hits", [], |row| row.get(0))
            .unwrap();
        assert_eq!(t, 9.0);
    }
}
