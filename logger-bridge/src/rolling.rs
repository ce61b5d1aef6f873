//! Size- and interval-based rotating log file
//!
//! The active file keeps its configured name. On rotation it is renamed to
//! `<stem>.<YYYY-MM-DD_HH-MM-SS_ffffff>.<ext>` in the same directory and a
//! fresh file is opened; rotated files beyond the retention count are
//! deleted oldest first. Rotated names sort chronologically.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime};
use log_config::Rotation;
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S_%6f";

#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    stem: String,
    extension: String,
    policy: Rotation,
    retention: usize,
    file: File,
    written: u64,
    /// Creation time of the active file; interval rotation counts from here.
    opened_at: SystemTime,
    last_stamp: Option<DateTime<Local>>,
}

impl RotatingFile {
    /// Open (or create) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from opening the file.
    pub fn open(path: impl Into<PathBuf>, policy: Rotation, retention: usize) -> io::Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let metadata = file.metadata()?;
        let written = metadata.len();
        // A reopened file keeps its age, so frequent restarts still rotate.
        let opened_at = metadata
            .created()
            .or_else(|_| metadata.modified())
            .unwrap_or_else(|_| SystemTime::now());
        let stem = path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("log")
            .to_string();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .unwrap_or("log")
            .to_string();

        Ok(Self {
            path,
            stem,
            extension,
            policy,
            retention,
            file,
            written,
            opened_at,
            last_stamp: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rotated files belonging to this log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from listing the log directory.
    pub fn rotated_files(&self) -> io::Result<Vec<PathBuf>> {
        let prefix = format!("{}.", self.stem);
        let suffix = format!(".{}", self.extension);

        let mut files: Vec<PathBuf> = fs::read_dir(self.directory())?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                let name = path.file_name().and_then(OsStr::to_str).unwrap_or_default();
                name.strip_prefix(&prefix)
                    .and_then(|rest| rest.strip_suffix(&suffix))
                    .is_some_and(is_rotation_stamp)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn should_rotate(&self, incoming: usize) -> bool {
        match self.policy {
            // A single record larger than the threshold still goes into an empty file.
            Rotation::Size(limit) => {
                self.written > 0 && self.written.saturating_add(incoming as u64) > limit
            }
            Rotation::Interval(interval) => {
                let age = SystemTime::now()
                    .duration_since(self.opened_at)
                    .unwrap_or_default();
                self.written > 0 && age >= interval
            }
            Rotation::Never => false,
        }
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let target = self.next_rotated_path();
        fs::rename(&self.path, &target)?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        self.opened_at = SystemTime::now();

        self.prune()
    }

    /// Names are strictly increasing even when rotations land in the same microsecond.
    fn next_rotated_path(&mut self) -> PathBuf {
        let tick = ChronoDuration::microseconds(1);
        let mut stamp = match self.last_stamp {
            Some(last) => Local::now().max(last + tick),
            None => Local::now(),
        };
        loop {
            let name = format!("{}.{}.{}", self.stem, stamp.format(TIMESTAMP_FORMAT), self.extension);
            let candidate = self.directory().join(name);
            if !candidate.exists() {
                self.last_stamp = Some(stamp);
                return candidate;
            }
            stamp = stamp + tick;
        }
    }

    fn prune(&self) -> io::Result<()> {
        let rotated = self.rotated_files()?;
        let excess = rotated.len().saturating_sub(self.retention);
        for stale in rotated.iter().take(excess) {
            fs::remove_file(stale)?;
        }
        Ok(())
    }

    fn before_write(&mut self, incoming: usize) -> io::Result<()> {
        if self.should_rotate(incoming) {
            self.rotate()?;
        }
        Ok(())
    }
}

/// `true` for the stamp part of a rotated name, as written by `next_rotated_path`.
fn is_rotation_stamp(stamp: &str) -> bool {
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok()
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.before_write(buf.len())?;
        let written = self.file.write(buf)?;
        self.written += written as u64;
        Ok(written)
    }

    // One record is one `write_all`, so rotation never splits a line.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.before_write(buf.len())?;
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn line(n: usize) -> String {
        format!("record {n:04} {}\n", "x".repeat(20))
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");
        fs::write(&path, "earlier\n").unwrap();

        let mut file = RotatingFile::open(&path, Rotation::Never, 5).unwrap();
        file.write_all(b"later\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
    }

    #[test]
    fn test_size_rotation_starts_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");
        let record = line(0);
        let limit = (record.len() * 3) as u64;

        let mut file = RotatingFile::open(&path, Rotation::Size(limit), 5).unwrap();
        for n in 0..4 {
            file.write_all(line(n).as_bytes()).unwrap();
        }
        file.flush().unwrap();

        let rotated = file.rotated_files().unwrap();
        assert_eq!(rotated.len(), 1);
        assert_eq!(fs::read_to_string(&rotated[0]).unwrap().lines().count(), 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), line(3));
    }

    #[test]
    fn test_retention_bounds_rotated_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");
        let limit = line(0).len() as u64;

        let mut file = RotatingFile::open(&path, Rotation::Size(limit), 2).unwrap();
        for n in 0..10 {
            file.write_all(line(n).as_bytes()).unwrap();
            assert!(file.rotated_files().unwrap().len() <= 2);
        }
        file.flush().unwrap();

        let rotated = file.rotated_files().unwrap();
        assert_eq!(rotated.len(), 2);
        // Only the newest records survive, in order.
        assert_eq!(fs::read_to_string(&rotated[0]).unwrap(), line(7));
        assert_eq!(fs::read_to_string(&rotated[1]).unwrap(), line(8));
        assert_eq!(fs::read_to_string(&path).unwrap(), line(9));
    }

    #[test]
    fn test_no_records_lost_across_rotations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");
        let limit = (line(0).len() * 4) as u64;

        let mut file = RotatingFile::open(&path, Rotation::Size(limit), 100).unwrap();
        for n in 0..25 {
            file.write_all(line(n).as_bytes()).unwrap();
        }
        file.flush().unwrap();

        let mut contents = String::new();
        for rotated in file.rotated_files().unwrap() {
            contents.push_str(&fs::read_to_string(rotated).unwrap());
        }
        contents.push_str(&fs::read_to_string(&path).unwrap());

        let expected: String = (0..25).map(line).collect();
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_oversized_record_goes_into_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");

        let mut file = RotatingFile::open(&path, Rotation::Size(4), 5).unwrap();
        file.write_all(b"a record longer than four bytes\n").unwrap();

        assert!(file.rotated_files().unwrap().is_empty());
    }

    #[test]
    fn test_interval_rotation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");

        let mut file =
            RotatingFile::open(&path, Rotation::Interval(Duration::from_millis(20)), 5).unwrap();
        file.write_all(b"first\n").unwrap();
        std::thread::sleep(Duration::from_millis(40));
        file.write_all(b"second\n").unwrap();
        file.flush().unwrap();

        let rotated = file.rotated_files().unwrap();
        assert_eq!(rotated.len(), 1);
        assert_eq!(fs::read_to_string(&rotated[0]).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
    }

    #[test]
    fn test_interval_counts_from_file_creation_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");
        let policy = Rotation::Interval(Duration::from_millis(50));

        let mut first = RotatingFile::open(&path, policy, 5).unwrap();
        first.write_all(b"old run\n").unwrap();
        first.flush().unwrap();
        drop(first);
        std::thread::sleep(Duration::from_millis(120));

        let mut second = RotatingFile::open(&path, policy, 5).unwrap();
        second.write_all(b"new run\n").unwrap();
        second.flush().unwrap();

        let rotated = second.rotated_files().unwrap();
        assert_eq!(rotated.len(), 1);
        assert_eq!(fs::read_to_string(&rotated[0]).unwrap(), "old run\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "new run\n");
    }

    #[test]
    fn test_interval_never_rotates_an_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");
        fs::write(&path, "").unwrap();
        std::thread::sleep(Duration::from_millis(40));

        let mut file =
            RotatingFile::open(&path, Rotation::Interval(Duration::from_millis(20)), 5).unwrap();
        file.write_all(b"first\n").unwrap();

        assert!(file.rotated_files().unwrap().is_empty());
    }

    #[test]
    fn test_similar_names_do_not_count_toward_retention() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");
        let backup = dir.path().join("process.backup.log");
        let stale = dir.path().join("process.2024-01-01.log");
        fs::write(&backup, "keep").unwrap();
        fs::write(&stale, "keep").unwrap();

        let limit = line(0).len() as u64;
        let mut file = RotatingFile::open(&path, Rotation::Size(limit), 1).unwrap();
        for n in 0..4 {
            file.write_all(line(n).as_bytes()).unwrap();
        }

        let rotated = file.rotated_files().unwrap();
        assert_eq!(rotated.len(), 1);
        assert_eq!(fs::read_to_string(&rotated[0]).unwrap(), line(2));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "keep");
        assert_eq!(fs::read_to_string(&stale).unwrap(), "keep");
    }

    #[test]
    fn test_unrelated_files_are_left_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("process.log");
        fs::write(dir.path().join("other.log"), "keep").unwrap();
        fs::write(dir.path().join("process.txt"), "keep").unwrap();

        let limit = line(0).len() as u64;
        let mut file = RotatingFile::open(&path, Rotation::Size(limit), 0).unwrap();
        for n in 0..3 {
            file.write_all(line(n).as_bytes()).unwrap();
        }

        assert!(file.rotated_files().unwrap().is_empty());
        assert!(dir.path().join("other.log").exists());
        assert!(dir.path().join("process.txt").exists());
    }
}
