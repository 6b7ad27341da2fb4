pub mod frame;
pub mod record;

pub use frame::{parse_line, Frame, ParsedLine, TokenSet, TokenValue};
pub use record::{SampleRecord, SpectralRecord, SAMPLE_COLUMNS};
