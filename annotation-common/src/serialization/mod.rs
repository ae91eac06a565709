//! Machine-oriented document formats, addressable by name.
//!
//! Each format can both write a [`Document`] and read one back from the front
//! of a byte stream, handing back whatever follows it untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::document::Document;

pub mod binary;
pub mod protobuf;

pub use binary::BinarySerializer;
pub use protobuf::ProtobufSerializer;

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("failed to encode document: {0}")]
    Encode(String),
    #[error("failed to decode document: {0}")]
    Decode(String),
    #[error("invalid protobuf document: {0}")]
    Protobuf(#[from] prost::DecodeError),
    #[error("failed to write json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("failed to write conll: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait DocumentSerializer: Send + Sync {
    fn name(&self) -> &'static str;

    fn content_type(&self) -> &'static str;

    fn write(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError>;

    /// Reads one document off the front of `input`, returning it with the unread rest.
    fn read<'a>(&self, input: &'a [u8]) -> Result<(Document, &'a [u8]), SerializationError>;
}

/// Serializers by name. Populated once at startup and shared read-only.
#[derive(Clone, Default)]
pub struct SerializerRegistry {
    serializers: BTreeMap<&'static str, Arc<dyn DocumentSerializer>>,
}

impl SerializerRegistry {
    pub fn with_builtins() -> Self {
        Self::default()
            .register(Arc::new(BinarySerializer))
            .register(Arc::new(ProtobufSerializer))
    }

    pub fn register(mut self, serializer: Arc<dyn DocumentSerializer>) -> Self {
        self.serializers.insert(serializer.name(), serializer);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DocumentSerializer>> {
        self.serializers.get(name.trim()).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.serializers.keys().copied().collect()
    }
}
