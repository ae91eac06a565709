use std::sync::Arc;

use crate::document::{Document, Token};
use crate::properties::{Properties, PRETTY_PRINT};
use crate::serialization::{DocumentSerializer, SerializationError};

mod conll;
mod json;
mod text;
mod xml;

pub use conll::ConllOutputter;
pub use json::JsonOutputter;
pub use text::TextOutputter;
pub use xml::XmlOutputter;

/// Renders an annotated document into response bytes.
pub trait Outputter: Send + Sync {
    fn print(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputOptions {
    pub pretty_print: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self { pretty_print: true }
    }
}

impl OutputOptions {
    pub fn from_properties(properties: &Properties) -> Self {
        Self {
            pretty_print: properties.get_bool(PRETTY_PRINT, true),
        }
    }
}

/// A token's 1-based index, or its position in `tokens` when sentences were
/// never split and the token carries no index.
pub(crate) fn display_index(token: &Token, position: usize) -> usize {
    match token.index {
        0 => position + 1,
        index => index as usize,
    }
}

/// Lets any registered binary serializer stand in as an outputter.
pub struct SerializedOutputter(pub Arc<dyn DocumentSerializer>);

impl Outputter for SerializedOutputter {
    fn print(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        self.0.write(document, out)
    }
}
