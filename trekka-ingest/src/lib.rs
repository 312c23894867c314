//! Email import: relay payload in, pending trip out.

pub mod email;
pub mod extractor;
pub mod openai;
pub mod pipeline;
pub mod prompt;

pub use email::InboundEmail;
pub use extractor::{parse_candidate, ExtractionError, TripExtractor};
pub use openai::{OpenAiConfig, OpenAiExtractor};
pub use pipeline::{IngestOutcome, Ingestor};
