//! Turns a request's query string into the configuration it runs with.
//!
//! Overrides arrive in a `properties` query field holding a flat object
//! literal such as `{"annotators":"tokenize,ssplit","outputFormat":"xml"}`.
//! Keys and values may be quoted, and quoted text may contain `,` and `:`.
//! Only one level is supported: nested objects or arrays are rejected.

use annotation_common::properties::Properties;

use crate::api::AnnotateError;

pub const PROPERTIES_FIELD: &str = "properties";

// Escape sequences are swapped for private-use characters while the payload
// is split, then swapped back per field.
const ESCAPES: [(char, char, char); 7] = [
    ('\\', '\u{E000}', '\\'),
    ('"', '\u{E001}', '"'),
    ('b', '\u{E002}', '\u{8}'),
    ('f', '\u{E003}', '\u{C}'),
    ('n', '\u{E004}', '\n'),
    ('r', '\u{E005}', '\r'),
    ('t', '\u{E006}', '\t'),
];

fn malformed(message: impl Into<String>) -> AnnotateError {
    AnnotateError::MalformedRequest(message.into())
}

/// Overlays the `properties` found in `query`, if any, on top of `defaults`.
pub fn resolve(defaults: &Properties, query: Option<&str>) -> Result<Properties, AnnotateError> {
    let query = match query {
        Some(query) if !query.is_empty() => query,
        _ => return Ok(defaults.clone()),
    };

    let plus_decoded = query.replace('+', " ");
    let decoded = urlencoding::decode(&plus_decoded)
        .map_err(|e| malformed(format!("query string is not valid UTF-8: {e}")))?;

    let payload = decoded
        .split('&')
        .filter_map(|field| match field.split_once('=') {
            Some((key, value)) => Some((key, value)),
            None if !field.is_empty() => Some((field, "")),
            None => None,
        })
        .filter(|(key, _)| *key == PROPERTIES_FIELD)
        .map(|(_, value)| value)
        .last();

    match payload {
        Some(payload) => Ok(defaults.overlay(parse_properties(payload)?)),
        None => Ok(defaults.clone()),
    }
}

/// Parses a flat `{key:value, ...}` literal into its pairs, in order.
pub fn parse_properties(payload: &str) -> Result<Vec<(String, String)>, AnnotateError> {
    let body = payload
        .trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| malformed("properties must be enclosed in braces"))?;

    let body = protect_escapes(body)?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let mut start = 0;
    for end in separators(&body, ',')?
        .into_iter()
        .chain(std::iter::once(body.len()))
    {
        entries.push(parse_entry(&body[start..end])?);
        start = end + 1;
    }
    Ok(entries)
}

fn protect_escapes(body: &str) -> Result<String, AnnotateError> {
    if body
        .chars()
        .any(|c| ESCAPES.iter().any(|(_, placeholder, _)| *placeholder == c))
    {
        return Err(malformed("properties contain reserved characters"));
    }

    let mut protected = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            protected.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped) => match ESCAPES.iter().find(|(e, _, _)| *e == escaped) {
                Some((_, placeholder, _)) => protected.push(*placeholder),
                None => {
                    protected.push('\\');
                    protected.push(escaped);
                }
            },
            None => protected.push('\\'),
        }
    }
    Ok(protected)
}

fn restore_escapes(field: &str) -> String {
    field
        .chars()
        .map(|c| {
            ESCAPES
                .iter()
                .find(|(_, placeholder, _)| *placeholder == c)
                .map_or(c, |(_, _, literal)| *literal)
        })
        .collect()
}

/// Byte offsets of every `separator` that sits outside double quotes.
fn separators(input: &str, separator: char) -> Result<Vec<usize>, AnnotateError> {
    let mut quoted = false;
    let mut found = Vec::new();
    for (i, c) in input.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            found.push(i);
        }
    }
    if quoted {
        return Err(malformed("unterminated quote in properties"));
    }
    Ok(found)
}

fn parse_entry(entry: &str) -> Result<(String, String), AnnotateError> {
    let colon = separators(entry, ':')?
        .first()
        .copied()
        .ok_or_else(|| malformed(format!("properties entry '{}' has no ':'", entry.trim())))?;

    let key = parse_field(&entry[..colon])?;
    if key.is_empty() {
        return Err(malformed("properties entry has an empty key"));
    }
    let value = parse_field(&entry[colon + 1..])?;
    Ok((key, value))
}

fn parse_field(raw: &str) -> Result<String, AnnotateError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('"') && trimmed.contains(['{', '}', '[', ']']) {
        return Err(malformed(format!(
            "nested value '{trimmed}' in properties, only flat string values are supported"
        )));
    }

    // escaped quotes are still placeholders here, so only real quotes are stripped
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    Ok(restore_escapes(unquoted).trim().to_string())
}
