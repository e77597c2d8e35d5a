//! Prefix expansion for search-as-you-type
//!
//! Every token of at least `min_len` characters is stored together with all
//! of its prefixes of length `min_len..=len`. A typed term then needs a
//! single array-membership test against the stored set. Shorter tokens are
//! dropped: they discriminate poorly and would bloat every record.
//!
//! Lengths count Unicode scalar values, so a prefix never ends inside a
//! multi-byte character.

use std::collections::BTreeSet;

/// Character length of a token
#[inline]
pub fn char_len(token: &str) -> usize {
    token.chars().count()
}

/// All prefixes of `token` with lengths `min_len..=len`, shortest first.
///
/// Returns nothing for tokens shorter than `min_len`. A `min_len` of zero
/// is treated as one.
///
/// # Example
///
/// ```
/// use recdex_engine::search::prefix::expand_token;
///
/// let prefixes = expand_token("salomon", 3);
/// assert_eq!(prefixes, vec!["sal", "salo", "salom", "salomo", "salomon"]);
/// ```
pub fn expand_token(token: &str, min_len: usize) -> Vec<String> {
    let min_len = min_len.max(1);
    // byte offset just past each character
    let ends: Vec<usize> = token
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .collect();
    if ends.len() < min_len {
        return Vec::new();
    }
    ends[min_len - 1..]
        .iter()
        .map(|&end| token[..end].to_string())
        .collect()
}

/// Expand every token into `out`.
pub fn expand_into<I, S>(tokens: I, min_len: usize, out: &mut BTreeSet<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for token in tokens {
        out.extend(expand_token(token.as_ref(), min_len));
    }
}

/// Expand tokens into a fresh deduplicated set.
pub fn expand<I, S>(tokens: I, min_len: usize) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = BTreeSet::new();
    expand_into(tokens, min_len, &mut out);
    out
}
