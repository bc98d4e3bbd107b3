//! Run-end shard consolidation.
//!
//! Strictly single-threaded, run only after every worker has flushed and
//! closed its shards. Row order across workers is defined by lexical shard
//! filename order; decimal worker segments therefore sort before the
//! `master` segment.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info};

/// Logical tables merged at run end, in merge order.
pub const CSV_TABLES: [&str; 6] = [
    "events_primary",
    "events_fibers",
    "events_hits",
    "events_secondaries",
    "events_crystals",
    "events_edep",
];

#[derive(Debug)]
pub enum MergeError {
    /// The output directory could not be listed.
    ListDir { dir: PathBuf, source: io::Error },
    /// The consolidated output file could not be opened for writing.
    OpenOutput { path: PathBuf, source: io::Error },
    /// A shard failed partway through copying. Shards already merged into
    /// this table are not restored.
    CopyShard { path: PathBuf, source: io::Error },
    /// The consolidated output could not be flushed after all shards were
    /// copied; the shards are already deleted.
    FlushOutput { path: PathBuf, source: io::Error },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::ListDir { dir, source } => {
                write!(f, "cannot list shard directory {}: {source}", dir.display())
            }
            MergeError::OpenOutput { path, source } => {
                write!(f, "cannot open merge output {}: {source}", path.display())
            }
            MergeError::CopyShard { path, source } => {
                write!(f, "failed copying shard {}: {source}", path.display())
            }
            MergeError::FlushOutput { path, source } => {
                write!(f, "failed flushing merge output {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MergeError::ListDir { source, .. }
            | MergeError::OpenOutput { source, .. }
            | MergeError::CopyShard { source, .. }
            | MergeError::FlushOutput { source, .. } => Some(source),
        }
    }
}

/// Merge all shards of one logical table into `<base>.csv`.
///
/// The header line is taken from the first shard only; every shard is
/// deleted once fully copied. Zero matching shards is not an error and
/// produces no output file.
pub fn merge(dir: &Path, base: &str) -> Result<Option<PathBuf>, MergeError> {
    let mut shards = list_shards(dir, base)?;
    if shards.is_empty() {
        return Ok(None);
    }
    shards.sort();

    let out_path = dir.join(format!("{base}.csv"));
    let out_file = File::create(&out_path).map_err(|source| MergeError::OpenOutput {
        path: out_path.clone(),
        source,
    })?;
    let mut out = BufWriter::new(out_file);

    for (i, shard) in shards.iter().enumerate() {
        copy_shard(shard, &mut out, i == 0).map_err(|source| MergeError::CopyShard {
            path: shard.clone(),
            source,
        })?;
        fs::remove_file(shard).map_err(|source| MergeError::CopyShard {
            path: shard.clone(),
            source,
        })?;
    }

    out.flush().map_err(|source| MergeError::FlushOutput {
        path: out_path.clone(),
        source,
    })?;

    info!(table = base, shards = shards.len(), "merged shards");
    Ok(Some(out_path))
}

/// Merge every logical table. A failure on one table is logged and does not
/// stop the remaining tables from merging.
pub fn merge_all(dir: &Path) -> usize {
    let mut merged = 0;
    for base in CSV_TABLES {
        match merge(dir, base) {
            Ok(Some(_)) => merged += 1,
            Ok(None) => {}
            Err(e) => error!(table = base, error = %e, "table merge failed"),
        }
    }
    merged
}

/// Files named `<base>_<segment>.csv` in `dir`, unsorted.
fn list_shards(dir: &Path, base: &str) -> Result<Vec<PathBuf>, MergeError> {
    let prefix = format!("{base}_");
    let entries = fs::read_dir(dir).map_err(|source| MergeError::ListDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut shards = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MergeError::ListDir {
            dir: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(&prefix) && name.ends_with(".csv") {
            shards.push(entry.path());
        }
    }
    Ok(shards)
}

fn copy_shard(shard: &Path, out: &mut BufWriter<File>, keep_header: bool) -> io::Result<()> {
    let reader = BufReader::new(File::open(shard)?);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if i == 0 && !keep_header {
            continue;
        }
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../target/merge_tests")
            .join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_shard(dir: &Path, name: &str, rows: &[&str]) {
        let body: String = std::iter::once("event_id,value")
            .chain(rows.iter().copied())
            .map(|l| format!("{l}\n"))
            .collect();
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn merges_in_lexical_order_and_deletes_shards() {
        let dir = test_dir("lexical");
        write_shard(&dir, "table_0.csv", &["0,a", "1,b"]);
        write_shard(&dir, "table_1.csv", &["2,c", "3,d"]);
        write_shard(&dir, "table_master.csv", &["4,e", "5,f"]);

        let out = merge(&dir, "table").unwrap().unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(
            text,
            "event_id,value\n0,a\n1,b\n2,c\n3,d\n4,e\n5,f\n"
        );

        assert!(!dir.join("table_0.csv").exists());
        assert!(!dir.join("table_1.csv").exists());
        assert!(!dir.join("table_master.csv").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn zero_shards_is_not_an_error() {
        let dir = test_dir("empty");
        assert!(merge(&dir, "table").unwrap().is_none());
        assert!(!dir.join("table.csv").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unrelated_files_are_left_alone() {
        let dir = test_dir("unrelated");
        write_shard(&dir, "table_0.csv", &["0,a"]);
        write_shard(&dir, "other_0.csv", &["9,z"]);
        fs::write(dir.join("table.txt"), "not a shard\n").unwrap();

        merge(&dir, "table").unwrap().unwrap();

        assert!(dir.join("other_0.csv").exists());
        assert!(dir.join("table.txt").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_a_list_error() {
        let err = merge(Path::new("/nonexistent/run/output"), "table").unwrap_err();
        assert!(matches!(err, MergeError::ListDir { .. }));
    }

    #[test]
    fn error_display_names_the_failing_stage() {
        let path = PathBuf::from("events_hits.csv");
        let flush = MergeError::FlushOutput {
            path: path.clone(),
            source: io::Error::other("device full"),
        };
        assert!(flush.to_string().contains("flushing"));
        let open = MergeError::OpenOutput {
            path,
            source: io::Error::other("permission denied"),
        };
        assert!(open.to_string().contains("open"));
    }
}
