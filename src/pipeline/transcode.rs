//! Braille transcoding: normalised text → ordered sequence of 6-dot cells.
//!
//! The symbol table is a single Grade 1 (uncontracted) English table: 26
//! letters, the ten digits, space and eleven punctuation marks. Digits share
//! their patterns with the letters A–J, so every run of digits is preceded by
//! one number sign (`#`, dots 3-4-5-6). The sign is inserted as a real
//! character *before* the table lookup so it gets its own cell.
//!
//! Anything without a table entry, and anything outside printable ASCII, is
//! dropped. A reader should never feel a "blank" cell that stands in for a
//! character the table cannot express.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of dot positions in a standard Braille cell.
pub const DOTS_PER_CELL: usize = 6;

/// Character inserted in front of every digit run.
pub const NUMBER_SIGN: char = '#';

/// Raised/flat state of the six dots of one cell.
///
/// Index 0 is dot 1 (top left), index 5 is dot 6 (bottom right), following
/// the usual column-major dot numbering:
///
/// ```text
/// 1 ● ● 4
/// 2 ● ● 5
/// 3 ● ● 6
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DotPattern([bool; DOTS_PER_CELL]);

impl DotPattern {
    /// All six dots lowered.
    pub const FLAT: DotPattern = DotPattern([false; DOTS_PER_CELL]);

    /// Build a pattern from the list of raised dot numbers (1-based).
    const fn dots(raised: &[u8]) -> DotPattern {
        let mut cell = [false; DOTS_PER_CELL];
        let mut i = 0;
        while i < raised.len() {
            cell[(raised[i] - 1) as usize] = true;
            i += 1;
        }
        DotPattern(cell)
    }

    pub const fn from_array(dots: [bool; DOTS_PER_CELL]) -> Self {
        DotPattern(dots)
    }

    /// Whether the dot at `position` (0-based) is raised. Out-of-range
    /// positions read as flat.
    pub fn is_raised(&self, position: usize) -> bool {
        self.0.get(position).copied().unwrap_or(false)
    }

    /// 1-based numbers of the raised dots, in ascending order.
    pub fn raised_dots(&self) -> impl Iterator<Item = u8> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, raised)| **raised)
            .map(|(i, _)| i as u8 + 1)
    }

    /// Dot 1 in bit 0 through dot 6 in bit 5.
    pub fn bits(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, raised)| if *raised { acc | (1 << i) } else { acc })
    }

    pub fn is_flat(&self) -> bool {
        self.bits() == 0
    }

    /// The matching glyph from the Unicode Braille Patterns block.
    pub fn to_unicode(&self) -> char {
        char::from_u32(0x2800 + self.bits() as u32).unwrap_or('\u{2800}')
    }

    pub fn as_array(&self) -> [bool; DOTS_PER_CELL] {
        self.0
    }
}

impl fmt::Display for DotPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for raised in self.0 {
            f.write_str(if raised { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// One transcoded character and the pattern that renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrailleUnit {
    pub symbol: char,
    pub pattern: DotPattern,
}

/// The full transcoded text, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    units: Vec<BrailleUnit>,
}

impl Document {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BrailleUnit> {
        self.units.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BrailleUnit> {
        self.units.iter()
    }

    /// The symbol sequence as a string, number signs included.
    pub fn symbols(&self) -> String {
        self.units.iter().map(|u| u.symbol).collect()
    }

    /// The document as a line of Unicode Braille glyphs.
    pub fn to_unicode(&self) -> String {
        self.units.iter().map(|u| u.pattern.to_unicode()).collect()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a BrailleUnit;
    type IntoIter = std::slice::Iter<'a, BrailleUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

impl FromIterator<BrailleUnit> for Document {
    fn from_iter<T: IntoIterator<Item = BrailleUnit>>(iter: T) -> Self {
        Document {
            units: iter.into_iter().collect(),
        }
    }
}

/// Transcode normalised text into a [`Document`].
///
/// Steps: uppercase, insert number signs, keep printable ASCII, look up each
/// character and drop the ones without a pattern.
pub fn transcode(text: &str) -> Document {
    let marked = insert_number_signs(&text.to_uppercase());
    marked
        .chars()
        .filter(|c| is_printable(*c))
        .filter_map(|symbol| lookup(symbol).map(|pattern| BrailleUnit { symbol, pattern }))
        .collect()
}

/// Insert one [`NUMBER_SIGN`] before every run of ASCII digits.
pub fn insert_number_signs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut in_number = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            if !in_number {
                out.push(NUMBER_SIGN);
                in_number = true;
            }
        } else {
            in_number = false;
        }
        out.push(c);
    }
    out
}

/// Space (0x20) through tilde (0x7E).
pub fn is_printable(c: char) -> bool {
    (' '..='~').contains(&c)
}

/// Look up the pattern for an (uppercase) symbol.
pub fn lookup(symbol: char) -> Option<DotPattern> {
    let pattern = match symbol {
        'A' | '1' => DotPattern::dots(&[1]),
        'B' | '2' => DotPattern::dots(&[1, 2]),
        'C' | '3' => DotPattern::dots(&[1, 4]),
        'D' | '4' => DotPattern::dots(&[1, 4, 5]),
        'E' | '5' => DotPattern::dots(&[1, 5]),
        'F' | '6' => DotPattern::dots(&[1, 2, 4]),
        'G' | '7' => DotPattern::dots(&[1, 2, 4, 5]),
        'H' | '8' => DotPattern::dots(&[1, 2, 5]),
        'I' | '9' => DotPattern::dots(&[2, 4]),
        'J' | '0' => DotPattern::dots(&[2, 4, 5]),
        'K' => DotPattern::dots(&[1, 3]),
        'L' => DotPattern::dots(&[1, 2, 3]),
        'M' => DotPattern::dots(&[1, 3, 4]),
        'N' => DotPattern::dots(&[1, 3, 4, 5]),
        'O' => DotPattern::dots(&[1, 3, 5]),
        'P' => DotPattern::dots(&[1, 2, 3, 4]),
        'Q' => DotPattern::dots(&[1, 2, 3, 4, 5]),
        'R' => DotPattern::dots(&[1, 2, 3, 5]),
        'S' => DotPattern::dots(&[2, 3, 4]),
        'T' => DotPattern::dots(&[2, 3, 4, 5]),
        'U' => DotPattern::dots(&[1, 3, 6]),
        'V' => DotPattern::dots(&[1, 2, 3, 6]),
        'W' => DotPattern::dots(&[2, 4, 5, 6]),
        'X' => DotPattern::dots(&[1, 3, 4, 6]),
        'Y' => DotPattern::dots(&[1, 3, 4, 5, 6]),
        'Z' => DotPattern::dots(&[1, 3, 5, 6]),
        ' ' => DotPattern::FLAT,
        '.' => DotPattern::dots(&[2, 5, 6]),
        ',' => DotPattern::dots(&[2]),
        '!' => DotPattern::dots(&[2, 3, 5]),
        '?' => DotPattern::dots(&[2, 3, 6]),
        ';' => DotPattern::dots(&[2, 3]),
        ':' => DotPattern::dots(&[2, 5]),
        '-' => DotPattern::dots(&[3, 6]),
        '\'' => DotPattern::dots(&[3]),
        '"' => DotPattern::dots(&[3, 5, 6]),
        '/' => DotPattern::dots(&[3, 4]),
        NUMBER_SIGN => DotPattern::dots(&[3, 4, 5, 6]),
        _ => return None,
    };
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_sign_before_each_run() {
        assert_eq!(
            insert_number_signs("I HAVE 23 CATS AND 4 DOGS"),
            "I HAVE #23 CATS AND #4 DOGS"
        );
    }

    #[test]
    fn number_sign_at_start_of_text() {
        assert_eq!(insert_number_signs("1984"), "#1984");
    }

    #[test]
    fn number_sign_resets_on_any_non_digit() {
        assert_eq!(insert_number_signs("3.14"), "#3.#14");
        assert_eq!(insert_number_signs("A1B2"), "A#1B#2");
    }

    #[test]
    fn transcode_is_case_insensitive() {
        assert_eq!(transcode("abc"), transcode("ABC"));
        assert_eq!(transcode("abc").symbols(), "ABC");
    }

    #[test]
    fn digits_share_letter_patterns() {
        let doc = transcode("1 a");
        assert_eq!(doc.symbols(), "#1 A");
        assert_eq!(doc.get(1).unwrap().pattern, doc.get(3).unwrap().pattern);
    }

    #[test]
    fn unsupported_characters_are_elided() {
        let doc = transcode("a+b=c\n\té");
        assert_eq!(doc.symbols(), "ABC");
    }

    #[test]
    fn all_unsupported_gives_empty_document() {
        assert!(transcode("+=*&%$@<>").is_empty());
        assert!(transcode("").is_empty());
    }

    #[test]
    fn every_supported_symbol_but_space_has_a_raised_dot() {
        let table = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789.,!?;:-'\"/#";
        for c in table.chars() {
            let pattern = lookup(c).unwrap_or_else(|| panic!("missing {c:?}"));
            assert!(!pattern.is_flat(), "{c:?} renders flat");
        }
        assert_eq!(lookup(' '), Some(DotPattern::FLAT));
    }

    #[test]
    fn known_patterns() {
        assert_eq!(lookup('A').unwrap().to_string(), "100000");
        assert_eq!(lookup('W').unwrap().to_string(), "010111");
        assert_eq!(lookup('#').unwrap().to_string(), "001111");
        assert_eq!(lookup('0').unwrap(), lookup('J').unwrap());
    }

    #[test]
    fn unicode_glyphs_match_dot_numbers() {
        assert_eq!(lookup('A').unwrap().to_unicode(), '⠁');
        assert_eq!(lookup('C').unwrap().to_unicode(), '⠉');
        assert_eq!(lookup('#').unwrap().to_unicode(), '⠼');
        assert_eq!(DotPattern::FLAT.to_unicode(), '⠀');
    }

    #[test]
    fn raised_dots_are_one_based() {
        let d = lookup('D').unwrap();
        assert_eq!(d.raised_dots().collect::<Vec<_>>(), vec![1, 4, 5]);
        assert!(d.is_raised(0));
        assert!(!d.is_raised(1));
        assert!(!d.is_raised(6));
    }

    #[test]
    fn document_length_bounded_by_printable_input() {
        let input = "Hello, World! 42 ~ {}";
        let printable = input.chars().filter(|c| is_printable(*c)).count();
        let digit_runs = 1;
        assert!(transcode(input).len() <= printable + digit_runs);
    }
}
