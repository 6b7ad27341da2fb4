pub mod conditioner;
pub mod emission;
pub mod integrator;
pub mod pipeline;
pub mod ring_buffer;
pub mod spectral;
pub mod state;

pub use emission::Rejection;
pub use pipeline::{LineOutcome, Pipeline};
pub use ring_buffer::RingBuffer;
pub use spectral::SpectralAnalyzer;
pub use state::PipelineState;
