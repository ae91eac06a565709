use serde::Serialize;

use super::{OutputOptions, Outputter};
use crate::document::{Document, Token};
use crate::serialization::SerializationError;

pub struct JsonOutputter {
    pub options: OutputOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_id: Option<&'a str>,
    sentences: Vec<JsonSentence<'a>>,
    // only for documents that were tokenized but never split
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tokens: Vec<JsonToken<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSentence<'a> {
    index: u32,
    character_offset_begin: u32,
    character_offset_end: u32,
    tokens: Vec<JsonToken<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonToken<'a> {
    index: u32,
    word: &'a str,
    original_text: String,
    character_offset_begin: u32,
    character_offset_end: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pos: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lemma: Option<&'a str>,
}

fn json_token<'a>(document: &'a Document, token: &'a Token) -> JsonToken<'a> {
    JsonToken {
        index: token.index,
        word: &token.word,
        original_text: document.original_text(token),
        character_offset_begin: token.begin,
        character_offset_end: token.end,
        pos: token.pos.as_deref(),
        lemma: token.lemma.as_deref(),
    }
}

impl Outputter for JsonOutputter {
    fn print(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        let sentences = document
            .sentences
            .iter()
            .map(|s| JsonSentence {
                index: s.index,
                character_offset_begin: s.char_begin,
                character_offset_end: s.char_end,
                tokens: document
                    .sentence_tokens(s)
                    .iter()
                    .map(|t| json_token(document, t))
                    .collect(),
            })
            .collect::<Vec<_>>();
        let tokens = if sentences.is_empty() {
            document
                .tokens
                .iter()
                .map(|t| json_token(document, t))
                .collect()
        } else {
            Vec::new()
        };

        let body = JsonDocument {
            doc_id: document.doc_id.as_deref(),
            sentences,
            tokens,
        };

        if self.options.pretty_print {
            serde_json::to_writer_pretty(&mut *out, &body)?;
        } else {
            serde_json::to_writer(&mut *out, &body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_json_diff::assert_json_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::outputters::test_documents::annotated;

    #[test]
    fn prints_sentences_with_tokens() {
        let document = annotated("Hello world.", "tokenize,ssplit,pos,lemma");
        let mut out = Vec::new();

        JsonOutputter {
            options: OutputOptions { pretty_print: false },
        }
        .print(&document, &mut out)
        .unwrap();

        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_json_eq!(
            value,
            json!({
                "sentences": [{
                    "index": 0,
                    "characterOffsetBegin": 0,
                    "characterOffsetEnd": 12,
                    "tokens": [
                        {"index": 1, "word": "Hello", "originalText": "Hello", "characterOffsetBegin": 0, "characterOffsetEnd": 5, "pos": "NN", "lemma": "hello"},
                        {"index": 2, "word": "world", "originalText": "world", "characterOffsetBegin": 6, "characterOffsetEnd": 11, "pos": "NN", "lemma": "world"},
                        {"index": 3, "word": ".", "originalText": ".", "characterOffsetBegin": 11, "characterOffsetEnd": 12, "pos": ".", "lemma": "."}
                    ]
                }]
            })
        );
    }

    #[test]
    fn unsplit_documents_list_tokens_at_the_top() {
        let document = annotated("Hi you", "tokenize");
        let mut out = Vec::new();

        JsonOutputter {
            options: OutputOptions::default(),
        }
        .print(&document, &mut out)
        .unwrap();

        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["sentences"], json!([]));
        assert_eq!(value["tokens"].as_array().unwrap().len(), 2);
        // pretty printing spreads the object over several lines
        assert!(out.iter().filter(|b| **b == b'\n').count() > 1);
    }
}
