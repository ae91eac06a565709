use std::borrow::Cow;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{display_index, OutputOptions, Outputter};
use crate::document::{Document, Token};
use crate::serialization::SerializationError;

pub struct XmlOutputter {
    pub options: OutputOptions,
}

impl Outputter for XmlOutputter {
    fn print(&self, document: &Document, out: &mut Vec<u8>) -> Result<(), SerializationError> {
        let mut writer = if self.options.pretty_print {
            Writer::new_with_indent(&mut *out, b' ', 2)
        } else {
            Writer::new(&mut *out)
        };

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("root")))?;
        writer.write_event(Event::Start(BytesStart::new("document")))?;

        if let Some(doc_id) = &document.doc_id {
            write_simple_element(&mut writer, "docId", doc_id)?;
        }

        writer.write_event(Event::Start(BytesStart::new("sentences")))?;
        for sentence in &document.sentences {
            let id = (sentence.index + 1).to_string();
            let mut element = BytesStart::new("sentence");
            element.push_attribute(("id", id.as_str()));
            writer.write_event(Event::Start(element))?;
            write_tokens(&mut writer, document, document.sentence_tokens(sentence))?;
            writer.write_event(Event::End(BytesEnd::new("sentence")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("sentences")))?;

        if document.sentences.is_empty() && !document.tokens.is_empty() {
            write_tokens(&mut writer, document, &document.tokens)?;
        }

        writer.write_event(Event::End(BytesEnd::new("document")))?;
        writer.write_event(Event::End(BytesEnd::new("root")))?;
        drop(writer);

        out.push(b'\n');
        Ok(())
    }
}

fn write_tokens<W: Write>(
    writer: &mut Writer<W>,
    document: &Document,
    tokens: &[Token],
) -> Result<(), SerializationError> {
    writer.write_event(Event::Start(BytesStart::new("tokens")))?;
    for (position, token) in tokens.iter().enumerate() {
        let id = display_index(token, position).to_string();
        let mut element = BytesStart::new("token");
        element.push_attribute(("id", id.as_str()));
        writer.write_event(Event::Start(element))?;

        write_simple_element(writer, "word", &token.word)?;
        write_simple_element(writer, "originalText", &document.original_text(token))?;
        if let Some(lemma) = &token.lemma {
            write_simple_element(writer, "lemma", lemma)?;
        }
        write_simple_element(writer, "CharacterOffsetBegin", &token.begin.to_string())?;
        write_simple_element(writer, "CharacterOffsetEnd", &token.end.to_string())?;
        if let Some(pos) = &token.pos {
            write_simple_element(writer, "POS", pos)?;
        }

        writer.write_event(Event::End(BytesEnd::new("token")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("tokens")))?;
    Ok(())
}

/// Drops characters XML 1.0 cannot carry, even escaped.
fn xml_chars(value: &str) -> Cow<'_, str> {
    let allowed = |c: char| {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
    };
    if value.chars().all(allowed) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.chars().filter(|c| allowed(*c)).collect())
    }
}

fn write_simple_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), SerializationError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    let value = xml_chars(value);
    writer.write_event(Event::Text(BytesText::new(&value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
