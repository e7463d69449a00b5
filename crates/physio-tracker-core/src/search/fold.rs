//! Case and diacritic folding.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase `text` and strip diacritics.
///
/// Text is lowercased, canonically decomposed (NFD) and stripped of
/// combining marks, so `é`, `ș`, `ễ` and `ư` fold to their base letters.
/// Letters with no decomposition (`ø`, `ł`, `đ`) map through a small table
/// and ligatures expand (`æ` → `ae`, `ß` → `ss`).
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let letters = text
        .chars()
        .flat_map(char::to_lowercase)
        .nfd()
        .filter(|c| !is_combining_mark(*c));

    for c in letters {
        match undecomposable(c) {
            Some(base) => out.push_str(base),
            None => out.push(c),
        }
    }
    out
}

/// Latin letters whose stroke or ligature is not a combining mark.
fn undecomposable(c: char) -> Option<&'static str> {
    let base = match c {
        'æ' => "ae",
        'đ' | 'ð' => "d",
        'ħ' => "h",
        'ı' => "i",
        'ŀ' | 'ł' => "l",
        'ø' => "o",
        'œ' => "oe",
        'ß' => "ss",
        'ŧ' => "t",
        'þ' => "th",
        _ => return None,
    };
    Some(base)
}
