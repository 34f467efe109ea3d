//! Streaming section extraction.
//!
//! [`SectionExtractor`] consumes [`XmlEvent`](crate::xml::XmlEvent)s and
//! keeps an explicit element stack instead of recursing, so arbitrarily deep
//! or large documents are handled in constant stack space. [`RecordStream`]
//! wraps it as an iterator of [`DocumentRecord`](crate::types::DocumentRecord)s.

mod accumulator;
mod engine;
mod record;
mod state;
mod stream;

pub use accumulator::{Segment, TextAccumulator};
pub use engine::SectionExtractor;
pub use record::RecordAssembler;
pub use state::{ExtractionState, Frame, FrameRole, Mode};
pub use stream::{extract_events, extract_reader, extract_str, RecordStream};
