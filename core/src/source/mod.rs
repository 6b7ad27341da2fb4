//! Raw line producers: a polled device link, a recorded file, or stdin.

pub mod device;
pub mod reader;

pub use device::DeviceSource;
pub use reader::ReaderSource;

use crate::prelude::PipelineResult;

/// Where a raw line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Device,
    File,
    Stream,
}

/// One raw line, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub text: String,
    pub origin: Origin,
}

/// Result of a single poll of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Line(RawLine),
    /// Nothing complete arrived within the poll interval.
    Idle,
    End,
}

pub trait LineSource {
    fn origin(&self) -> Origin;
    fn poll_line(&mut self) -> PipelineResult<SourceEvent>;
}

/// Decodes device bytes, silently dropping invalid UTF-8 sequences.
pub fn decode_lenient(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_bytes_are_dropped() {
        assert_eq!(decode_lenient(b"N:1 \xff\xfeD:2"), "N:1 D:2");
        assert_eq!(decode_lenient("µm".as_bytes()), "µm");
    }
}
