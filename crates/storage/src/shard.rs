//! Per-worker CSV shard files.
//!
//! Each worker owns one shard per logical table, named
//! `<base>_<segment>.csv` so that concatenation order at merge time is
//! defined by lexical filename order. A shard that fails to open or write is
//! disabled for the rest of the run and the failure logged; the event loop
//! never sees the error.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::error;
use types::RegionTable;

/// One delimited-text output stream that degrades to a no-op on failure.
pub struct CsvStream {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl CsvStream {
    /// Open the shard and write its header line. On failure the stream is
    /// created disabled.
    pub fn create(dir: &Path, base: &str, segment: &str, header: &str) -> Self {
        let path = dir.join(format!("{base}_{segment}.csv"));
        let writer = match File::create(&path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                error!(path = %path.display(), error = %e, "shard open failed");
                None
            }
        };
        let mut stream = Self { path, writer };
        if let Some(writer) = stream.writer.as_mut()
            && let Err(e) = writeln!(writer, "{header}")
        {
            error!(path = %stream.path.display(), error = %e, "shard header write failed");
            stream.scrap();
        }
        stream
    }

    /// Disable the stream and delete its file. A shard that never got its
    /// header must not survive to merge time: it could sort first and leave
    /// the consolidated table headerless.
    fn scrap(&mut self) {
        self.writer = None;
        if let Err(e) = fs::remove_file(&self.path) {
            error!(path = %self.path.display(), error = %e, "dead shard removal failed");
        }
    }

    /// Append one data row. A write error disables the stream.
    pub fn write_row(&mut self, row: std::fmt::Arguments<'_>) {
        if let Some(writer) = self.writer.as_mut()
            && let Err(e) = writer.write_fmt(format_args!("{row}\n"))
        {
            error!(path = %self.path.display(), error = %e, "shard write failed, stream disabled");
            self.writer = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.writer.is_some()
    }

    /// Flush buffered rows; called once at worker close.
    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut()
            && let Err(e) = writer.flush()
        {
            error!(path = %self.path.display(), error = %e, "shard flush failed");
            self.writer = None;
        }
    }
}

/// The six shard streams one worker writes.
pub struct ShardSet {
    pub primaries: CsvStream,
    pub fibers: CsvStream,
    pub hits: CsvStream,
    pub secondaries: CsvStream,
    pub crystals: CsvStream,
    pub edep: CsvStream,
}

impl ShardSet {
    /// Open all six shards for one worker segment. The energy-summary header
    /// is derived from the region table: veto column first, then the
    /// remaining regions in table order, then the total.
    pub fn create(dir: &Path, segment: &str, regions: &RegionTable) -> Self {
        Self {
            primaries: CsvStream::create(
                dir,
                "events_primary",
                segment,
                "event_id,particle,E_MeV,dir_x,dir_y,dir_z",
            ),
            fibers: CsvStream::create(
                dir,
                "events_fibers",
                segment,
                "event_id,particle,plane,module_id,layer_id,row_id,copy_no,edep_MeV,t_ns",
            ),
            hits: CsvStream::create(
                dir,
                "events_hits",
                segment,
                "event_id,track_id,parent_track_id,is_secondary,particle,particle_pdg,det_id,\
                 det_name,copy_no,edep_MeV,plane,module_id,layer_id,row_id,crystal_ix,crystal_iy",
            ),
            secondaries: CsvStream::create(
                dir,
                "events_secondaries",
                segment,
                "event_id,secondary_track_id,parent_track_id,parent_pdg,parent_name,process,\
                 birth_volume,secondary_name,secondary_pdg,E_MeV,dir0_x,dir0_y,dir0_z,t0_ns",
            ),
            crystals: CsvStream::create(
                dir,
                "events_crystals",
                segment,
                "event_id,crystal_copy_no,crystal_ix,crystal_iy,edep_MeV,t_ns,particle",
            ),
            edep: CsvStream::create(dir, "events_edep", segment, &edep_header(regions)),
        }
    }

    pub fn flush(&mut self) {
        self.primaries.flush();
        self.fibers.flush();
        self.hits.flush();
        self.secondaries.flush();
        self.crystals.flush();
        self.edep.flush();
    }
}

fn edep_header(regions: &RegionTable) -> String {
    let mut header = String::from("event_id,edep_Veto_MeV");
    for def in regions.iter() {
        if def.id != regions.veto {
            header.push_str(",edep_");
            header.push_str(&def.name);
            header.push_str("_MeV");
        }
    }
    header.push_str(",edep_total_MeV");
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../target/shard_tests")
            .join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn shard_carries_header_and_rows() {
        let dir = test_dir("header_rows");
        let mut stream = CsvStream::create(&dir, "events_hits", "0", "a,b,c");
        stream.write_row(format_args!("1,2,3"));
        stream.write_row(format_args!("4,5,6"));
        stream.flush();

        let text = fs::read_to_string(dir.join("events_hits_0.csv")).unwrap();
        assert_eq!(text, "a,b,c\n1,2,3\n4,5,6\n");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn open_failure_degrades_to_noop() {
        let dir = PathBuf::from("/nonexistent/output/dir");
        let mut stream = CsvStream::create(&dir, "events_hits", "0", "a,b");
        assert!(!stream.is_active());
        // Writing to a dead stream is a no-op, never a panic.
        stream.write_row(format_args!("1,2"));
        stream.flush();
    }

    #[test]
    fn headers_carry_the_persisted_column_layout() {
        let dir = test_dir("layout");
        let mut set = ShardSet::create(&dir, "0", &RegionTable::standard());
        set.flush();

        let header = |base: &str| {
            let text = fs::read_to_string(dir.join(format!("{base}_0.csv"))).unwrap();
            text.lines().next().unwrap().to_string()
        };
        assert_eq!(
            header("events_primary"),
            "event_id,particle,E_MeV,dir_x,dir_y,dir_z"
        );
        assert_eq!(
            header("events_fibers"),
            "event_id,particle,plane,module_id,layer_id,row_id,copy_no,edep_MeV,t_ns"
        );
        assert_eq!(
            header("events_hits"),
            "event_id,track_id,parent_track_id,is_secondary,particle,particle_pdg,det_id,\
             det_name,copy_no,edep_MeV,plane,module_id,layer_id,row_id,crystal_ix,crystal_iy"
        );
        assert_eq!(
            header("events_secondaries"),
            "event_id,secondary_track_id,parent_track_id,parent_pdg,parent_name,process,\
             birth_volume,secondary_name,secondary_pdg,E_MeV,dir0_x,dir0_y,dir0_z,t0_ns"
        );
        assert_eq!(
            header("events_crystals"),
            "event_id,crystal_copy_no,crystal_ix,crystal_iy,edep_MeV,t_ns,particle"
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn scrapped_stream_leaves_no_file_behind() {
        let dir = test_dir("scrap");
        let mut stream = CsvStream::create(&dir, "events_hits", "0", "a,b");
        assert!(stream.is_active());

        stream.scrap();
        assert!(!stream.is_active());
        assert!(!dir.join("events_hits_0.csv").exists());
        // Scrapped streams swallow writes like any other dead stream.
        stream.write_row(format_args!("1,2"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn edep_header_puts_veto_first() {
        let header = edep_header(&RegionTable::standard());
        assert_eq!(
            header,
            "event_id,edep_Veto_MeV,edep_TriggerTop_MeV,edep_TriggerBottom_MeV,\
             edep_FiberX_MeV,edep_FiberY_MeV,edep_Calorimeter_MeV,edep_total_MeV"
        );
    }
}
