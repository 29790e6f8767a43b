// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Title pattern matcher for listicle detection
//!
//! A title is listicle-like when it contains, in order:
//! - an anchor: the start of the title, or one of `:` `-` `—`, a fully-qualified
//!   emoji, or the words "the", "top", "mastering", "these", "my", "best",
//!   followed by one character that is not a letter, mark or number
//! - any further non-letter/mark/number characters
//! - a count token: a digit 2-9, a 2 or 3 digit number, or "two" through "ten"
//! - a space separator or `+`
//!
//! Four digit numbers never count (they are almost always years). Matching is
//! case-insensitive and works on Unicode general categories rather than bytes.

use serde::Serialize;
use std::fmt;
use unicode_general_category::{get_general_category, GeneralCategory};

/// Punctuation that typically opens a subtitle
const ANCHOR_PUNCTUATION: [char; 3] = [':', '-', '\u{2014}'];

/// Words often found right before the count in listicle titles
const ANCHOR_WORDS: [&str; 6] = ["the", "top", "mastering", "these", "my", "best"];

/// Longest RGI emoji sequence, in chars (kiss with two skin tones)
const MAX_EMOJI_CHARS: usize = 10;

const COUNT_WORDS: [&str; 9] = [
    "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// What allowed the count token to start a listicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Anchor {
    /// Only separators precede the count
    Start,
    /// Subtitle punctuation
    Punctuation(char),
    /// A fully-qualified emoji, possibly the first part of a longer sequence
    Emoji(String),
    /// One of the anchor words
    Word(&'static str),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Start => write!(f, "start of title"),
            Anchor::Punctuation(c) => write!(f, "punctuation '{}'", c),
            Anchor::Emoji(e) => write!(f, "emoji {}", e),
            Anchor::Word(w) => write!(f, "word \"{}\"", w),
        }
    }
}

/// The number that looks like a list count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CountToken {
    Digits(String),
    Word(&'static str),
}

impl fmt::Display for CountToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountToken::Digits(d) => write!(f, "{}", d),
            CountToken::Word(w) => write!(f, "\"{}\"", w),
        }
    }
}

/// Details of the first listicle pattern found in a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListicleMatch {
    pub anchor: Anchor,
    pub count: CountToken,
    /// Char offset where the count token starts
    pub start: usize,
    /// Char offset just past the count token
    pub end: usize,
}

impl fmt::Display for ListicleMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count {} at chars {}..{} after {}",
            self.count, self.start, self.end, self.anchor
        )
    }
}

/// Returns true if the title looks like a listicle ("7 Tips for ...", "Rust: Top 10 ...")
pub fn is_listicle_like(title: &str) -> bool {
    find_listicle_match(title).is_some()
}

/// Find the first count token that satisfies the listicle pattern
pub fn find_listicle_match(title: &str) -> Option<ListicleMatch> {
    let chars: Vec<char> = title.chars().collect();
    if chars.is_empty() {
        return None;
    }

    let emoji_ends = emoji_end_offsets(&chars);

    (0..chars.len()).find_map(|start| {
        let (count, end) = count_token_at(&chars, start)?;
        let anchor = anchor_before(&chars, start, &emoji_ends)?;
        Some(ListicleMatch {
            anchor,
            count,
            start,
            end,
        })
    })
}

/// Letters, marks and numbers; everything else acts as a separator
fn is_word_char(c: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(c),
        UppercaseLetter
            | LowercaseLetter
            | TitlecaseLetter
            | ModifierLetter
            | OtherLetter
            | NonspacingMark
            | SpacingMark
            | EnclosingMark
            | DecimalNumber
            | LetterNumber
            | OtherNumber
    )
}

fn is_trailing_separator(c: char) -> bool {
    c == '+' || matches!(get_general_category(c), GeneralCategory::SpaceSeparator)
}

/// Simple case folding, restricted to single-char mappings
fn fold(c: char) -> char {
    // long s folds to 's'
    if c == '\u{017F}' {
        return 's';
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

fn matches_word_at(chars: &[char], pos: usize, word: &str) -> bool {
    let len = word.chars().count();
    match chars.get(pos..pos + len) {
        Some(slice) => slice.iter().zip(word.chars()).all(|(c, w)| fold(*c) == w),
        None => false,
    }
}

/// Parse a count token starting at `pos`, requiring a trailing separator
fn count_token_at(chars: &[char], pos: usize) -> Option<(CountToken, usize)> {
    let digits = chars[pos..].iter().take_while(|c| c.is_ascii_digit()).count();

    let (token, end) = if digits > 0 {
        let valid = match digits {
            1 => matches!(chars[pos], '2'..='9'),
            2 | 3 => true,
            _ => false,
        };
        if !valid {
            return None;
        }
        let text: String = chars[pos..pos + digits].iter().collect();
        (CountToken::Digits(text), pos + digits)
    } else {
        let word = COUNT_WORDS
            .iter()
            .copied()
            .find(|w| matches_word_at(chars, pos, w))?;
        (CountToken::Word(word), pos + word.len())
    };

    let next = *chars.get(end)?;
    is_trailing_separator(next).then_some((token, end))
}

/// Find an anchor in front of the count token at `pos`.
///
/// Everything between the anchor and the count must be separators, with at
/// least one separator right after a non-start anchor.
fn anchor_before(chars: &[char], pos: usize, emoji_ends: &[(usize, String)]) -> Option<Anchor> {
    let run_start = chars[..pos]
        .iter()
        .rposition(|c| is_word_char(*c))
        .map_or(0, |i| i + 1);

    if run_start == 0 {
        return Some(Anchor::Start);
    }
    if run_start == pos {
        return None;
    }

    if let Some(c) = chars[run_start..pos - 1]
        .iter()
        .find(|c| ANCHOR_PUNCTUATION.contains(c))
    {
        return Some(Anchor::Punctuation(*c));
    }

    if let Some((_, emoji)) = emoji_ends
        .iter()
        .find(|(end, _)| (run_start..pos).contains(end))
    {
        return Some(Anchor::Emoji(emoji.clone()));
    }

    ANCHOR_WORDS
        .iter()
        .copied()
        .find(|w| run_start >= w.len() && matches_word_at(chars, run_start - w.len(), w))
        .map(Anchor::Word)
}

/// Char offsets just past every fully-qualified emoji in the title.
///
/// Emoji are looked up at every char position, so the leading emoji of a ZWJ
/// or skin tone sequence counts on its own. Text-style symbols without a
/// variation selector (`™`, `☺`) are not fully qualified and never count.
fn emoji_end_offsets(chars: &[char]) -> Vec<(usize, String)> {
    let mut ends = Vec::new();
    for start in 0..chars.len() {
        let first = chars[start];
        // keycaps are the only emoji starting with an ASCII char
        if first.is_ascii() && !matches!(first, '#' | '*' | '0'..='9') {
            continue;
        }

        let mut candidate = String::new();
        for (len, c) in chars[start..].iter().take(MAX_EMOJI_CHARS).enumerate() {
            candidate.push(*c);
            let qualified = emojis::get(&candidate).is_some_and(|e| e.as_str() == candidate);
            if qualified {
                ends.push((start + len + 1, candidate.clone()));
            }
        }
    }
    ends
}
