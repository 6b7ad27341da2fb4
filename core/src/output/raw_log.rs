use crate::telemetry::LogManager;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Verbatim copy of raw device lines, written before parsing.
///
/// Failures never stop the pipeline: an open failure disables the sidecar and
/// write failures are only logged.
pub struct RawSidecar {
    writer: BufWriter<File>,
    logger: LogManager,
}

impl RawSidecar {
    pub fn open<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let logger = LogManager::new("raw-log");
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                logger.record(&format!("mirroring raw lines to {}", path.display()));
                Some(Self {
                    writer: BufWriter::new(file),
                    logger,
                })
            }
            Err(err) => {
                logger.warn(&format!(
                    "cannot open raw-log file '{}': {}",
                    path.display(),
                    err
                ));
                None
            }
        }
    }

    pub fn record(&mut self, line: &str) {
        if let Err(err) = self.write_line(line) {
            self.logger.detail(&format!("raw-log write failed: {}", err));
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()
    }

    pub fn flush(&mut self) {
        if let Err(err) = self.writer.flush() {
            self.logger.detail(&format!("raw-log flush failed: {}", err));
        }
    }
}
