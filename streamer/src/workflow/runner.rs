use crate::shutdown::Shutdown;
use anyhow::Context;
use log::debug;
use std::io::Write;
use umdcore::output::SinkSet;
use umdcore::prelude::PipelineResult;
use umdcore::source::{LineSource, SourceEvent};
use umdcore::telemetry::Metrics;
use umdcore::Pipeline;

/// Why the run ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndOfInput,
    Interrupted,
}

#[derive(Debug)]
pub struct RunSummary {
    pub stop: StopReason,
    pub metrics: Metrics,
}

/// Pull loop: one raw line at a time, through the pipeline, into the sinks.
pub struct Runner<W: Write> {
    pipeline: Pipeline,
    sinks: SinkSet<W>,
    shutdown: Shutdown,
}

impl<W: Write> Runner<W> {
    pub fn new(pipeline: Pipeline, sinks: SinkSet<W>, shutdown: Shutdown) -> Self {
        Self {
            pipeline,
            sinks,
            shutdown,
        }
    }

    /// Drives `source` until it ends, fails, or a shutdown is requested. The
    /// sinks are flushed on every path.
    pub fn run<S: LineSource + ?Sized>(&mut self, source: &mut S) -> anyhow::Result<RunSummary> {
        debug!("reading {:?} source", source.origin());
        let stop = loop {
            if self.shutdown.is_requested() {
                break StopReason::Interrupted;
            }
            match self.step(source) {
                Ok(Some(stop)) => break stop,
                Ok(None) => {}
                Err(err) => {
                    if let Err(flush_err) = self.sinks.finish() {
                        debug!("flush after failure also failed: {}", flush_err);
                    }
                    return Err(err).context("stream stopped unexpectedly");
                }
            }
        };

        self.sinks.finish().context("flushing output sinks")?;
        Ok(RunSummary {
            stop,
            metrics: self.pipeline.metrics().snapshot(),
        })
    }

    fn step<S: LineSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> PipelineResult<Option<StopReason>> {
        match source.poll_line()? {
            SourceEvent::Line(raw) => {
                self.sinks.mirror_raw(&raw.text);
                let outcome = self.pipeline.process_line(&raw.text);
                self.sinks.emit(&outcome)?;
                Ok(None)
            }
            SourceEvent::Idle => Ok(None),
            SourceEvent::End => Ok(Some(StopReason::EndOfInput)),
        }
    }

    #[cfg(test)]
    fn into_sinks(self) -> SinkSet<W> {
        self.sinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, ErrorKind, Read};
    use umdcore::config::EmitPolicy;
    use umdcore::output::{OutputFormat, PrimarySink, RawSidecar};
    use umdcore::source::{DeviceSource, Origin, ReaderSource};
    use umdcore::PipelineConfig;

    const SCENARIO: &str =
        "Sample Frequency = 2000 Hz\nN:1 D:100\nN:2 D:105\nN:3 D:105\nN:4 D:110\n";

    fn runner(config: PipelineConfig, format: OutputFormat) -> Runner<Vec<u8>> {
        let pipeline = Pipeline::new(config).unwrap();
        let sinks = SinkSet::new(PrimarySink::new(format, Vec::new()).unwrap());
        Runner::new(pipeline, sinks, Shutdown::new())
    }

    fn stream_of(runner: Runner<Vec<u8>>) -> String {
        let bytes = runner.into_sinks().into_primary().into_inner().unwrap();
        String::from_utf8(bytes).unwrap()
    }

    fn onstep() -> PipelineConfig {
        PipelineConfig {
            emit: EmitPolicy::OnStep,
            ..Default::default()
        }
    }

    #[test]
    fn runner_executes_scenario() {
        let mut runner = runner(onstep(), OutputFormat::Jsonl);
        let mut source = ReaderSource::new(Cursor::new(SCENARIO), Origin::Stream);
        let summary = runner.run(&mut source).unwrap();
        assert_eq!(summary.stop, StopReason::EndOfInput);
        assert_eq!(summary.metrics.emitted, 2);
        assert_eq!(summary.metrics.headers, 1);

        let stream = stream_of(runner);
        let records: Vec<serde_json::Value> = stream
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["seq"], 2);
        assert_eq!(records[1]["seq"], 4);
        assert!(records.iter().all(|r| r["fs_hz"] == 2000.0));
    }

    #[test]
    fn identical_input_gives_identical_bytes() {
        let config = PipelineConfig {
            ema_alpha: 0.3,
            ma_window: 3,
            fft_len: 2,
            fft_every: 1,
            ..Default::default()
        };
        let render = || {
            let mut runner = runner(config.clone(), OutputFormat::Jsonl);
            let mut source = ReaderSource::new(Cursor::new(SCENARIO), Origin::Stream);
            runner.run(&mut source).unwrap();
            stream_of(runner)
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn csv_stream_has_header_and_rows() {
        let mut runner = runner(onstep(), OutputFormat::Csv);
        let mut source = ReaderSource::new(Cursor::new(SCENARIO), Origin::Stream);
        runner.run(&mut source).unwrap();
        let stream = stream_of(runner);
        let lines: Vec<&str> = stream.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("seq,fs_hz,"));
        assert!(lines[1].starts_with("2,2000.0,105,5,"));
    }

    #[test]
    fn requested_shutdown_stops_before_reading() {
        let mut runner = runner(PipelineConfig::default(), OutputFormat::Jsonl);
        runner.shutdown.request();
        let mut source = ReaderSource::new(Cursor::new(SCENARIO), Origin::Stream);
        let summary = runner.run(&mut source).unwrap();
        assert_eq!(summary.stop, StopReason::Interrupted);
        assert_eq!(summary.metrics.lines, 0);
        assert!(stream_of(runner).is_empty());
    }

    /// Delivers one chunk, stays quiet once, then fails.
    struct FlakyLink {
        calls: usize,
    }

    impl Read for FlakyLink {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            match self.calls {
                1 => {
                    let chunk = b"N:1 D:1\nN:2 D:3\n";
                    buf[..chunk.len()].copy_from_slice(chunk);
                    Ok(chunk.len())
                }
                2 => Err(io::Error::new(ErrorKind::TimedOut, "quiet")),
                _ => Err(io::Error::new(ErrorKind::BrokenPipe, "unplugged")),
            }
        }
    }

    #[test]
    fn device_failure_surfaces_after_flushing_records() {
        let dir = tempfile::tempdir().unwrap();
        let raw_path = dir.path().join("capture.raw.log");
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let sinks = SinkSet::new(PrimarySink::new(OutputFormat::Jsonl, Vec::new()).unwrap())
            .with_raw_sidecar(RawSidecar::open(&raw_path).unwrap());
        let mut runner = Runner::new(pipeline, sinks, Shutdown::new());

        let mut source = DeviceSource::from_link(FlakyLink { calls: 0 });
        let err = runner.run(&mut source).unwrap_err();
        assert!(format!("{:#}", err).contains("device link failed"));

        assert_eq!(stream_of(runner).lines().count(), 2);
        let raw = std::fs::read_to_string(&raw_path).unwrap();
        assert_eq!(raw, "N:1 D:1\nN:2 D:3\n");
    }
}
