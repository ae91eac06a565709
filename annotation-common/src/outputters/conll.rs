use csv::{QuoteStyle, WriterBuilder};

use super::{display_index, Outputter};
use crate::document::{Document, Token};
use crate::serialization::SerializationError;

const MISSING: &str = "_";

/// Tab separated, one token per line (index, word, lemma, tag) and a blank
/// line after every sentence.
pub struct ConllOutputter;

impl Outputter for ConllOutputter {
    fn print(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        let blocks: Vec<&[Token]> = if document.sentences.is_empty() {
            vec![document.tokens.as_slice()]
        } else {
            document
                .sentences
                .iter()
                .map(|s| document.sentence_tokens(s))
                .collect()
        };

        let mut builder = WriterBuilder::new();
        builder
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .has_headers(false);

        for block in blocks.into_iter().filter(|b| !b.is_empty()) {
            {
                let mut writer = builder.from_writer(&mut *out);
                for (position, token) in block.iter().enumerate() {
                    let index = display_index(token, position);
                    writer.write_record([
                        index.to_string().as_str(),
                        token.word.as_str(),
                        token.lemma.as_deref().unwrap_or(MISSING),
                        token.pos.as_deref().unwrap_or(MISSING),
                    ])?;
                }
                writer.flush()?;
            }
            out.push(b'\n');
        }
        Ok(())
    }
}
