use bincode::config;

use super::{DocumentSerializer, SerializationError};
use crate::document::Document;

pub const BINARY: &str = "binary";

/// Ceiling on what one decode may claim, checked before length-prefixed
/// strings and sequences are allocated. Well above any accepted request body.
pub const MAX_DECODED_BYTES: usize = 256 * 1024 * 1024;

/// Compact, schema-less encoding of the whole document model.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinarySerializer;

impl DocumentSerializer for BinarySerializer {
    fn name(&self) -> &'static str {
        BINARY
    }

    fn content_type(&self) -> &'static str {
        "application/octet-stream"
    }

    fn write(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        bincode::serde::encode_into_std_write(document, out, config::standard())
            .map_err(|e| SerializationError::Encode(e.to_string()))?;
        Ok(())
    }

    fn read<'a>(&self, input: &'a [u8]) -> Result<(Document, &'a [u8]), SerializationError> {
        let limited = config::standard().with_limit::<MAX_DECODED_BYTES>();
        let (document, read): (Document, usize) =
            bincode::serde::decode_from_slice(input, limited)
                .map_err(|e| SerializationError::Decode(e.to_string()))?;
        Ok((document, &input[read..]))
    }
}
