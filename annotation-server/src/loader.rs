use annotation_common::document::Document;
use annotation_common::properties::{Properties, INPUT_FORMAT, INPUT_SERIALIZER};
use annotation_common::serialization::binary::BINARY;
use annotation_common::serialization::SerializerRegistry;

use crate::api::AnnotateError;

pub const TEXT: &str = "text";
pub const SERIALIZED: &str = "serialized";

/// Builds the request's document from its body according to `inputFormat`.
pub fn load(
    properties: &Properties,
    serializers: &SerializerRegistry,
    body: &[u8],
) -> Result<Document, AnnotateError> {
    match properties.get_or(INPUT_FORMAT, TEXT) {
        TEXT => {
            let text = std::str::from_utf8(body).map_err(|e| {
                AnnotateError::Deserialization(format!("request body is not valid UTF-8: {e}"))
            })?;
            Ok(Document::new(text))
        }
        SERIALIZED => {
            let name = properties.get_or(INPUT_SERIALIZER, BINARY);
            let serializer = serializers
                .get(name)
                .ok_or_else(|| AnnotateError::unknown_serializer(name, serializers))?;

            // anything after the first document is ignored
            let (document, _rest) = serializer
                .read(body)
                .map_err(|e| AnnotateError::Deserialization(e.to_string()))?;
            Ok(document)
        }
        other => Err(AnnotateError::UnsupportedInputFormat(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use annotation_common::serialization::protobuf::PROTOBUF;

    use super::*;

    fn serialized(serializer: &str) -> Properties {
        Properties::new()
            .with(INPUT_FORMAT, SERIALIZED)
            .with(INPUT_SERIALIZER, serializer)
    }

    #[test]
    fn text_bodies_become_plain_documents() {
        let props = Properties::new().with(INPUT_FORMAT, TEXT);

        let document = load(&props, &SerializerRegistry::with_builtins(), b"Hello world.").unwrap();

        assert_eq!(document, Document::new("Hello world."));
    }

    #[test]
    fn invalid_utf8_text_is_rejected() {
        let props = Properties::new().with(INPUT_FORMAT, TEXT);

        let result = load(&props, &SerializerRegistry::with_builtins(), &[0xff, 0xfe]);

        assert!(matches!(result, Err(AnnotateError::Deserialization(_))));
    }

    #[test]
    fn serialized_bodies_go_through_the_named_serializer() {
        let registry = SerializerRegistry::with_builtins();
        let mut original = Document::new("Already parsed.");
        original.doc_id = Some("doc-7".to_string());

        for name in [BINARY, PROTOBUF] {
            let mut body = Vec::new();
            let serializer = registry.get(name).unwrap();
            serializer.write(&original, &mut body).unwrap();
            // trailing data after the first document is discarded
            serializer.write(&Document::new("second"), &mut body).unwrap();

            let loaded = load(&serialized(name), &registry, &body).unwrap();

            assert_eq!(loaded, original, "{name}");
        }
    }

    #[test]
    fn serializer_defaults_to_binary() {
        let registry = SerializerRegistry::with_builtins();
        let mut body = Vec::new();
        registry
            .get(BINARY)
            .unwrap()
            .write(&Document::new("x"), &mut body)
            .unwrap();
        let props = Properties::new().with(INPUT_FORMAT, SERIALIZED);

        assert_eq!(load(&props, &registry, &body).unwrap().text, "x");
    }

    #[test]
    fn unknown_formats_and_serializers_are_rejected() {
        let registry = SerializerRegistry::with_builtins();

        assert!(matches!(
            load(&Properties::new().with(INPUT_FORMAT, "pdf"), &registry, b""),
            Err(AnnotateError::UnsupportedInputFormat(f)) if f == "pdf"
        ));
        assert!(matches!(
            load(&serialized("java.lang.Object"), &registry, b""),
            Err(AnnotateError::UnknownSerializer(_))
        ));
        assert!(matches!(
            load(&serialized(PROTOBUF), &registry, &[0x05, 0x01]),
            Err(AnnotateError::Deserialization(_))
        ));
    }
}
