use prost::Message;

use super::{DocumentSerializer, SerializationError};
use crate::document::{Document, Sentence, Token};

pub const PROTOBUF: &str = "protobuf";

#[derive(Clone, PartialEq, Message)]
pub struct DocumentProto {
    #[prost(string, tag = "1")]
    pub text: String,
    #[prost(string, optional, tag = "2")]
    pub doc_id: Option<String>,
    #[prost(message, repeated, tag = "3")]
    pub tokens: Vec<TokenProto>,
    #[prost(message, repeated, tag = "4")]
    pub sentences: Vec<SentenceProto>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TokenProto {
    #[prost(uint32, tag = "1")]
    pub index: u32,
    #[prost(string, tag = "2")]
    pub word: String,
    #[prost(uint32, tag = "3")]
    pub begin: u32,
    #[prost(uint32, tag = "4")]
    pub end: u32,
    #[prost(string, optional, tag = "5")]
    pub pos: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub lemma: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SentenceProto {
    #[prost(uint32, tag = "1")]
    pub index: u32,
    #[prost(uint32, tag = "2")]
    pub token_begin: u32,
    #[prost(uint32, tag = "3")]
    pub token_end: u32,
    #[prost(uint32, tag = "4")]
    pub char_begin: u32,
    #[prost(uint32, tag = "5")]
    pub char_end: u32,
}

impl From<&Document> for DocumentProto {
    fn from(document: &Document) -> Self {
        Self {
            text: document.text.clone(),
            doc_id: document.doc_id.clone(),
            tokens: document
                .tokens
                .iter()
                .map(|t| TokenProto {
                    index: t.index,
                    word: t.word.clone(),
                    begin: t.begin,
                    end: t.end,
                    pos: t.pos.clone(),
                    lemma: t.lemma.clone(),
                })
                .collect(),
            sentences: document
                .sentences
                .iter()
                .map(|s| SentenceProto {
                    index: s.index,
                    token_begin: s.token_begin,
                    token_end: s.token_end,
                    char_begin: s.char_begin,
                    char_end: s.char_end,
                })
                .collect(),
        }
    }
}

impl From<DocumentProto> for Document {
    fn from(proto: DocumentProto) -> Self {
        Self {
            text: proto.text,
            doc_id: proto.doc_id,
            tokens: proto
                .tokens
                .into_iter()
                .map(|t| Token {
                    index: t.index,
                    word: t.word,
                    begin: t.begin,
                    end: t.end,
                    pos: t.pos,
                    lemma: t.lemma,
                })
                .collect(),
            sentences: proto
                .sentences
                .into_iter()
                .map(|s| Sentence {
                    index: s.index,
                    token_begin: s.token_begin,
                    token_end: s.token_end,
                    char_begin: s.char_begin,
                    char_end: s.char_end,
                })
                .collect(),
        }
    }
}

/// Length-delimited protobuf messages, so several documents can share a stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProtobufSerializer;

impl DocumentSerializer for ProtobufSerializer {
    fn name(&self) -> &'static str {
        PROTOBUF
    }

    fn content_type(&self) -> &'static str {
        "application/x-protobuf"
    }

    fn write(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        DocumentProto::from(document)
            .encode_length_delimited(out)
            .map_err(|e| SerializationError::Encode(e.to_string()))
    }

    fn read<'a>(&self, input: &'a [u8]) -> Result<(Document, &'a [u8]), SerializationError> {
        let mut remaining = input;
        let proto = DocumentProto::decode_length_delimited(&mut remaining)?;
        Ok((proto.into(), remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_consecutive_documents_from_one_stream() {
        let first = Document::new("first");
        let mut second = Document::new("second");
        second.tokens.push(Token {
            word: "second".to_string(),
            end: 6,
            pos: Some("JJ".to_string()),
            ..Default::default()
        });

        let mut stream = Vec::new();
        ProtobufSerializer.write(&first, &mut stream).unwrap();
        ProtobufSerializer.write(&second, &mut stream).unwrap();

        let (read_first, rest) = ProtobufSerializer.read(&stream).unwrap();
        let (read_second, rest) = ProtobufSerializer.read(rest).unwrap();

        assert_eq!(read_first, first);
        assert_eq!(read_second, second);
        assert!(rest.is_empty());
    }

    #[test]
    fn truncated_message_is_rejected() {
        let mut stream = Vec::new();
        ProtobufSerializer
            .write(&Document::new("some text"), &mut stream)
            .unwrap();
        stream.truncate(stream.len() - 2);

        assert!(matches!(
            ProtobufSerializer.read(&stream),
            Err(SerializationError::Protobuf(_))
        ));
    }
}
