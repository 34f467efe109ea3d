//! XML event model and the quick-xml based tokenizer that produces it.
//!
//! The extraction engine only ever sees [`XmlEvent`] values, so anything that
//! can produce element-open, element-close and text events can drive it.

mod event;
mod reader;

pub use event::{Attribute, XmlEvent};
pub use reader::EventReader;
