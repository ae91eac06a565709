use std::io::Write;

use super::Outputter;
use crate::document::{Document, Token};
use crate::serialization::SerializationError;

/// Human-readable dump: each sentence's text followed by one bracketed line per token.
pub struct TextOutputter;

fn write_token(out: &mut Vec<u8>, document: &Document, token: &Token) -> std::io::Result<()> {
    write!(
        out,
        "[Text={} CharacterOffsetBegin={} CharacterOffsetEnd={}",
        document.original_text(token),
        token.begin,
        token.end
    )?;
    if let Some(pos) = &token.pos {
        write!(out, " PartOfSpeech={pos}")?;
    }
    if let Some(lemma) = &token.lemma {
        write!(out, " Lemma={lemma}")?;
    }
    writeln!(out, "]")
}

impl Outputter for TextOutputter {
    fn print(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        if let Some(doc_id) = &document.doc_id {
            writeln!(
                out,
                "Document: ID={} ({} sentences, {} tokens)\n",
                doc_id,
                document.sentences.len(),
                document.tokens.len()
            )?;
        }

        if document.sentences.is_empty() {
            writeln!(out, "{}", document.text)?;
            if !document.tokens.is_empty() {
                writeln!(out, "\nTokens:")?;
                for token in &document.tokens {
                    write_token(out, document, token)?;
                }
            }
            return Ok(());
        }

        for sentence in &document.sentences {
            let text: String = document
                .text
                .chars()
                .skip(sentence.char_begin as usize)
                .take(sentence.char_end.saturating_sub(sentence.char_begin) as usize)
                .collect();
            writeln!(
                out,
                "Sentence #{} ({} tokens):\n{}\n\nTokens:",
                sentence.index + 1,
                sentence.len(),
                text
            )?;
            for token in document.sentence_tokens(sentence) {
                write_token(out, document, token)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
