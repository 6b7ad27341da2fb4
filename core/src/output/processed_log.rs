use crate::output::primary::csv_writer;
use crate::prelude::{PipelineError, PipelineResult};
use crate::protocol::{SampleRecord, SAMPLE_COLUMNS};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Append-only CSV mirror of every emitted sample.
pub struct ProcessedLog {
    writer: csv::Writer<File>,
}

impl ProcessedLog {
    /// Opens `path` for appending; the header row is written only when the file is empty.
    pub fn open<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| PipelineError::OpenFile {
                path: path.display().to_string(),
                source,
            })?;
        let is_empty = file.metadata()?.len() == 0;

        let mut writer = csv_writer(file);
        if is_empty {
            writer.write_record(SAMPLE_COLUMNS)?;
            writer.flush()?;
        }
        Ok(Self { writer })
    }

    pub fn write_sample(&mut self, sample: &SampleRecord) -> PipelineResult<()> {
        self.writer.serialize(sample)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn flush(&mut self) -> PipelineResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(seq: i64) -> SampleRecord {
        SampleRecord {
            seq,
            fs_hz: 2000.0,
            counter: seq,
            delta_counter: 1,
            step_nm: 1.0,
            x_nm: seq as f64,
            v_nm_s: 2000.0,
            x_nm_ema: None,
            x_nm_ma: None,
            x_nm_env: seq as f64,
            angle_deg: None,
            x2: None,
            y2: None,
        }
    }

    #[test]
    fn header_written_once_across_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.csv");

        let mut log = ProcessedLog::open(&path).unwrap();
        log.write_sample(&sample(1)).unwrap();
        drop(log);

        let mut log = ProcessedLog::open(&path).unwrap();
        log.write_sample(&sample(2)).unwrap();
        drop(log);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("seq,fs_hz,D,deltaD"));
        assert!(lines[1].starts_with("1,2000.0,1,1,"));
        assert!(lines[2].starts_with("2,2000.0,2,1,"));
    }

    #[test]
    fn existing_empty_file_gets_a_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        let log = ProcessedLog::open(&path).unwrap();
        drop(log);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("run.csv");
        assert!(ProcessedLog::open(path).is_err());
    }
}
