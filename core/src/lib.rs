//! Processing core for the UMD2 displacement interferometer.
//!
//! Raw device lines flow through parsing, fringe integration, conditioning,
//! emission filtering and optional spectral snapshots before being handed to
//! the output sinks. All running state lives in a single [`PipelineState`]
//! owned by the [`Pipeline`] driver.

pub mod config;
pub mod math;
pub mod output;
pub mod prelude;
pub mod processing;
pub mod protocol;
pub mod source;
pub mod telemetry;

pub use config::PipelineConfig;
pub use prelude::{PipelineError, PipelineResult};
pub use processing::{LineOutcome, Pipeline, PipelineState};
