//! A small rule-based annotation engine.
//!
//! None of this is linguistically serious: tokenization is character-class
//! based, sentences end at terminal punctuation, tags are guessed from the
//! word's shape and a handful of closed-class words. It exists so the server
//! answers usefully without a heavyweight model behind the
//! [`AnnotationEngine`] seam.

use std::sync::Arc;

use crate::document::{Document, Sentence, Token};
use crate::engine::{AnnotationEngine, AnnotationError, Annotator, AnnotatorPipeline, Pipeline};
use crate::properties::{Properties, ANNOTATORS, SSPLIT_EOL_ONLY, TOKENIZE_WHITESPACE};

pub const TOKENIZE: &str = "tokenize";
pub const SSPLIT: &str = "ssplit";
pub const POS: &str = "pos";
pub const LEMMA: &str = "lemma";

#[derive(Clone, Copy, Debug, Default)]
pub struct RuleBasedEngine;

impl AnnotationEngine for RuleBasedEngine {
    fn build(&self, properties: &Properties) -> Result<Arc<dyn Pipeline>, AnnotationError> {
        let annotators = properties
            .get_list(ANNOTATORS)
            .into_iter()
            .map(|name| annotator_for(name, properties))
            .collect::<Result<Vec<_>, _>>()?;

        let pipeline = AnnotatorPipeline::new(annotators)?;
        tracing::debug!(annotators = ?pipeline.annotators(), "built rule-based pipeline");
        Ok(Arc::new(pipeline))
    }
}

fn annotator_for(
    name: &str,
    properties: &Properties,
) -> Result<Box<dyn Annotator>, AnnotationError> {
    match name.to_lowercase().as_str() {
        TOKENIZE => Ok(Box::new(Tokenizer {
            whitespace: properties.get_bool(TOKENIZE_WHITESPACE, false),
        })),
        SSPLIT => Ok(Box::new(SentenceSplitter {
            eol_only: properties.get_bool(SSPLIT_EOL_ONLY, false),
        })),
        POS => Ok(Box::new(ShapeTagger)),
        LEMMA => Ok(Box::new(Lemmatizer)),
        _ => Err(AnnotationError::UnknownAnnotator(name.to_string())),
    }
}

pub struct Tokenizer {
    whitespace: bool,
}

impl Tokenizer {
    fn spans(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            if chars[i].is_whitespace() {
                i += 1;
                continue;
            }
            let start = i;

            if self.whitespace {
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
            } else if chars[i].is_alphanumeric() {
                i += 1;
                while i < chars.len() {
                    if chars[i].is_alphanumeric() {
                        i += 1;
                    } else if joins_word(chars, i) {
                        // the joiner and the character after it
                        i += 2;
                    } else {
                        break;
                    }
                }
            } else {
                i += 1;
            }

            spans.push((start, i));
        }

        spans
    }
}

/// Apostrophes and hyphens glue letters (`don't`, `well-known`), periods and
/// commas glue digits (`3.14`, `1,000`).
fn joins_word(chars: &[char], i: usize) -> bool {
    let next = chars.get(i + 1);
    match chars[i] {
        '\'' | '-' => next.is_some_and(|c| c.is_alphanumeric()),
        '.' | ',' => chars[i - 1].is_ascii_digit() && next.is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

impl Annotator for Tokenizer {
    fn name(&self) -> &'static str {
        TOKENIZE
    }

    fn annotate(&self, document: &mut Document) -> Result<(), AnnotationError> {
        let chars: Vec<char> = document.text.chars().collect();

        document.tokens = self
            .spans(&chars)
            .into_iter()
            .map(|(begin, end)| Token {
                index: 0,
                word: chars[begin..end].iter().collect(),
                begin: begin as u32,
                end: end as u32,
                pos: None,
                lemma: None,
            })
            .collect();
        document.sentences.clear();

        Ok(())
    }
}

pub struct SentenceSplitter {
    eol_only: bool,
}

impl SentenceSplitter {
    fn newlines_between(chars: &[char], from: u32, to: u32) -> usize {
        chars
            .get(from as usize..to as usize)
            .map(|gap| gap.iter().filter(|c| **c == '\n').count())
            .unwrap_or(0)
    }
}

impl Annotator for SentenceSplitter {
    fn name(&self) -> &'static str {
        SSPLIT
    }

    fn requires(&self) -> &'static [&'static str] {
        &[TOKENIZE]
    }

    fn annotate(&self, document: &mut Document) -> Result<(), AnnotationError> {
        let chars: Vec<char> = document.text.chars().collect();
        let mut boundaries = Vec::new();
        let mut start = 0;

        for (i, token) in document.tokens.iter().enumerate() {
            let ends_here = match document.tokens.get(i + 1) {
                None => true,
                Some(next) => {
                    let breaks = Self::newlines_between(&chars, token.end, next.begin);
                    if self.eol_only {
                        breaks >= 1
                    } else {
                        // a blank line always closes the paragraph's last sentence
                        breaks >= 2 || matches!(token.word.as_str(), "." | "!" | "?")
                    }
                }
            };

            if ends_here {
                boundaries.push((start, i + 1));
                start = i + 1;
            }
        }

        document.sentences = boundaries
            .into_iter()
            .enumerate()
            .map(|(index, (begin, end))| Sentence {
                index: index as u32,
                token_begin: begin as u32,
                token_end: end as u32,
                char_begin: document.tokens[begin].begin,
                char_end: document.tokens[end - 1].end,
            })
            .collect();

        for sentence in &document.sentences {
            let span = sentence.token_begin as usize..sentence.token_end as usize;
            for (offset, token) in document.tokens[span].iter_mut().enumerate() {
                token.index = offset as u32 + 1;
            }
        }

        Ok(())
    }
}

pub struct ShapeTagger;

const DETERMINERS: &[&str] = &["a", "an", "the", "this", "that", "these", "those"];
const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];
const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "of", "for", "with", "by", "from", "about", "into",
];
const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor"];

impl ShapeTagger {
    fn tag(token: &Token) -> &'static str {
        let word = token.word.as_str();
        let lower = word.to_lowercase();

        if !word.chars().any(char::is_alphanumeric) {
            return match word {
                "." | "!" | "?" => ".",
                "," => ",",
                ":" | ";" => ":",
                "(" | "[" | "{" => "-LRB-",
                ")" | "]" | "}" => "-RRB-",
                _ => "SYM",
            };
        }
        if word.chars().any(|c| c.is_ascii_digit())
            && word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        {
            return "CD";
        }
        if DETERMINERS.contains(&lower.as_str()) {
            return "DT";
        }
        if PRONOUNS.contains(&lower.as_str()) {
            return "PRP";
        }
        if PREPOSITIONS.contains(&lower.as_str()) {
            return "IN";
        }
        if CONJUNCTIONS.contains(&lower.as_str()) {
            return "CC";
        }
        if token.index > 1 && word.chars().next().is_some_and(char::is_uppercase) {
            return "NNP";
        }
        if lower.len() > 4 && lower.ends_with("ly") {
            return "RB";
        }
        if lower.len() > 5 && lower.ends_with("ing") {
            return "VBG";
        }
        if lower.len() > 4 && lower.ends_with("ed") {
            return "VBD";
        }
        if lower.len() > 3 && lower.ends_with('s') && !lower.ends_with("ss") {
            return "NNS";
        }
        "NN"
    }
}

impl Annotator for ShapeTagger {
    fn name(&self) -> &'static str {
        POS
    }

    fn requires(&self) -> &'static [&'static str] {
        &[TOKENIZE, SSPLIT]
    }

    fn annotate(&self, document: &mut Document) -> Result<(), AnnotationError> {
        for token in document.tokens.iter_mut() {
            token.pos = Some(Self::tag(token).to_string());
        }
        Ok(())
    }
}

pub struct Lemmatizer;

impl Lemmatizer {
    fn lemma(token: &Token) -> String {
        let lower = token.word.to_lowercase();
        match token.pos.as_deref() {
            Some("NNS") if lower.ends_with("ies") => format!("{}y", &lower[..lower.len() - 3]),
            Some("NNS") => lower[..lower.len() - 1].to_string(),
            _ => lower,
        }
    }
}

impl Annotator for Lemmatizer {
    fn name(&self) -> &'static str {
        LEMMA
    }

    fn requires(&self) -> &'static [&'static str] {
        &[TOKENIZE, SSPLIT, POS]
    }

    fn annotate(&self, document: &mut Document) -> Result<(), AnnotationError> {
        for token in document.tokens.iter_mut() {
            if token.pos.is_none() {
                return Err(AnnotationError::MissingAnnotation("part-of-speech"));
            }
            token.lemma = Some(Self::lemma(token));
        }
        Ok(())
    }
}
