use crate::prelude::{PipelineError, PipelineResult};
use crate::source::{decode_lenient, LineSource, Origin, RawLine, SourceEvent};
use std::fs::File;
use std::io::{self, BufRead, BufReader, StdinLock};
use std::path::Path;

/// Finite line source over any buffered reader (recorded file or stdin).
pub struct ReaderSource<R> {
    reader: R,
    origin: Origin,
    buffer: Vec<u8>,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R, origin: Origin) -> Self {
        Self {
            reader,
            origin,
            buffer: Vec::new(),
        }
    }
}

impl ReaderSource<BufReader<File>> {
    pub fn open_file<P: AsRef<Path>>(path: P) -> PipelineResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PipelineError::OpenFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file), Origin::File))
    }
}

impl ReaderSource<StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), Origin::Stream)
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn origin(&self) -> Origin {
        self.origin
    }

    fn poll_line(&mut self) -> PipelineResult<SourceEvent> {
        self.buffer.clear();
        let read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if read == 0 {
            return Ok(SourceEvent::End);
        }
        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }
        Ok(SourceEvent::Line(RawLine {
            text: decode_lenient(&self.buffer),
            origin: self.origin,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn drain<S: LineSource>(source: &mut S) -> Vec<String> {
        let mut lines = Vec::new();
        while let SourceEvent::Line(line) = source.poll_line().unwrap() {
            lines.push(line.text);
        }
        lines
    }

    #[test]
    fn reader_yields_lines_then_end() {
        let mut source = ReaderSource::new(Cursor::new("a\r\nb\n\nlast"), Origin::Stream);
        assert_eq!(drain(&mut source), vec!["a", "b", "", "last"]);
        assert_eq!(source.poll_line().unwrap(), SourceEvent::End);
    }

    #[test]
    fn file_source_reads_recorded_capture() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"Sample Frequency = 10 Hz\nN:1 D:5\n").unwrap();
        let mut source = ReaderSource::open_file(temp.path()).unwrap();
        assert_eq!(source.origin(), Origin::File);
        assert_eq!(drain(&mut source).len(), 2);
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let result = ReaderSource::open_file("/definitely/not/here.log");
        assert!(matches!(result, Err(PipelineError::OpenFile { .. })));
    }
}
