//! Text tokenizer for keyword indexing and query terms
//!
//! Pipeline: split on whitespace/dash runs → remove non-alphanumeric
//!           → lowercase → drop empty tokens
//!
//! Indexing and querying share this pipeline, so a term always tokenizes
//! the same way as the field text it is meant to find.

use std::collections::HashSet;

/// Dash characters that separate words like whitespace does.
const DASHES: &[char] = &[
    '-', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}',
];

#[inline]
fn is_separator(c: char) -> bool {
    c.is_whitespace() || DASHES.contains(&c)
}

/// Tokenize text into normalized word tokens.
///
/// Pipeline:
/// 1. Split on runs of whitespace and dashes
/// 2. Remove every non-alphanumeric character inside a word
/// 3. Lowercase
/// 4. Drop tokens left empty
///
/// No length filter is applied here; that is the prefix expander's job.
///
/// # Example
///
/// ```
/// use recdex_engine::search::tokenizer::tokenize;
///
/// let tokens = tokenize("Salomon S/Race-Pro, 170cm");
/// assert_eq!(tokens, vec!["salomon", "srace", "pro", "170cm"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(is_separator)
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .map(|w| w.to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Tokenize several values, concatenating the tokens in order.
pub fn tokenize_all<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().flat_map(tokenize).collect()
}

/// Tokenize and deduplicate, keeping first occurrences.
///
/// Used for query terms, where repeating a word adds nothing.
///
/// # Example
///
/// ```
/// use recdex_engine::search::tokenizer::tokenize_unique;
///
/// let tokens = tokenize_unique("Race race RACE slalom");
/// assert_eq!(tokens, vec!["race", "slalom"]);
/// ```
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
