use serde::{Deserialize, Serialize};

/// One request's input text plus whatever the annotators attached to it.
///
/// Offsets are in characters, not bytes, so they can be handed to clients
/// working in other languages without re-encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub doc_id: Option<String>,
    pub tokens: Vec<Token>,
    pub sentences: Vec<Sentence>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// 1-based position within its sentence, 0 until sentences are split.
    pub index: u32,
    pub word: String,
    pub begin: u32,
    pub end: u32,
    pub pos: Option<String>,
    pub lemma: Option<String>,
}

/// A contiguous `[token_begin, token_end)` span of the document's tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub index: u32,
    pub token_begin: u32,
    pub token_end: u32,
    pub char_begin: u32,
    pub char_end: u32,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Tokens covered by `sentence`, empty if the span doesn't fit this document.
    pub fn sentence_tokens(&self, sentence: &Sentence) -> &[Token] {
        self.tokens
            .get(sentence.token_begin as usize..sentence.token_end as usize)
            .unwrap_or(&[])
    }

    /// The exact source text of a token.
    pub fn original_text(&self, token: &Token) -> String {
        self.text
            .chars()
            .skip(token.begin as usize)
            .take(token.end.saturating_sub(token.begin) as usize)
            .collect()
    }
}

impl Sentence {
    pub fn len(&self) -> usize {
        self.token_end.saturating_sub(self.token_begin) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
