use crate::prelude::{PipelineError, PipelineResult};
use crate::source::{decode_lenient, LineSource, Origin, RawLine, SourceEvent};
use serialport::SerialPort;
use std::io::{ErrorKind, Read};
use std::time::Duration;

/// Read timeout of a single device poll.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(200);
/// Upper bound on bytes taken from the link per poll.
pub const READ_CHUNK: usize = 4096;

/// Endless line source over a polled byte link.
///
/// Partial lines are held across polls; a poll that completes no line yields
/// [`SourceEvent::Idle`] so the caller regains control.
pub struct DeviceSource<L> {
    link: L,
    pending: Vec<u8>,
    chunk: Vec<u8>,
}

impl DeviceSource<Box<dyn SerialPort>> {
    pub fn open(path: &str, baud: u32) -> PipelineResult<Self> {
        let port = serialport::new(path, baud)
            .timeout(POLL_TIMEOUT)
            .open()
            .map_err(|source| PipelineError::DeviceOpen {
                path: path.to_string(),
                source,
            })?;
        Ok(Self::from_link(port))
    }
}

impl<L: Read> DeviceSource<L> {
    pub fn from_link(link: L) -> Self {
        Self {
            link,
            pending: Vec::new(),
            chunk: vec![0; READ_CHUNK],
        }
    }

    fn take_line(&mut self) -> Option<RawLine> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let text = decode_lenient(&self.pending[..end]);
        self.pending.drain(..=end);
        Some(RawLine {
            text,
            origin: Origin::Device,
        })
    }
}

impl<L: Read> LineSource for DeviceSource<L> {
    fn origin(&self) -> Origin {
        Origin::Device
    }

    fn poll_line(&mut self) -> PipelineResult<SourceEvent> {
        if let Some(line) = self.take_line() {
            return Ok(SourceEvent::Line(line));
        }
        match self.link.read(&mut self.chunk) {
            Ok(0) => {}
            Ok(read) => self.pending.extend_from_slice(&self.chunk[..read]),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => {}
            Err(err) => return Err(PipelineError::DeviceLink(err)),
        }
        Ok(self
            .take_line()
            .map_or(SourceEvent::Idle, SourceEvent::Line))
    }
}
