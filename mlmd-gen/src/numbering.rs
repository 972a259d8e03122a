//! Heading numbering schemes
//!
//! A scheme is a comma separated list of per-level definitions:
//!
//! ```text
//! <level><sep>[<prefix>]<sep><symbol><sep><separator>[,...]
//! ```
//!
//! where `<sep>` is the first non-numeric character found after the
//! first level (usually `:`), `<prefix>` is only honored on level 1,
//! `<symbol>` is a starting digit (`1`-`9`), letter (`a`-`z`,
//! `A`-`Z`) or Roman marker (`&I`, `&i`), and `<separator>` is written
//! between the symbols of consecutive levels. Example:
//! `1:Chapter :1:.,2::1:.,3::1` numbers `###` headings like
//! `Chapter 1.2.3) `.

use crate::output_mode::OutputMode;
use crate::report::Report;

const ROMAN_PAIRS: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Decimal to Roman conversion.
pub fn to_roman(mut number: u32) -> String {
    let mut result = String::new();
    for (limit, roman) in ROMAN_PAIRS {
        while number >= limit {
            number -= limit;
            result.push_str(roman);
        }
        if number == 0 {
            break;
        }
    }
    result
}

/// Roman to decimal conversion. Interprets the string until the first
/// non-Roman notation; returns 0 for strings with no Roman prefix.
pub fn from_roman(roman: &str) -> u32 {
    let upper = roman.to_uppercase();
    let mut rest = upper.as_str();
    let mut result = 0;
    'outer: while !rest.is_empty() {
        for (value, symbol) in ROMAN_PAIRS {
            if rest.starts_with(symbol) {
                result += value;
                rest = &rest[symbol.len()..];
                continue 'outer;
            }
        }
        break;
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    /// Starting digit, '1' to '9'
    Digit(char),
    /// Starting letter, case kept
    Letter(char),
    /// Roman numbers, uppercase when true
    Roman(bool),
}

#[derive(Debug, Clone, Default)]
struct LevelScheme {
    prefix: String,
    symbol: Option<Symbol>,
    separator: String,
}

/// Numbering state for the headings of one file.
#[derive(Debug, Clone)]
pub struct Numbering {
    output_mode: OutputMode,
    start_level: usize,
    end_level: usize,
    levels: [Option<LevelScheme>; 10],
    /// Current offset from the starting symbol at each level; -1
    /// disables a level.
    counters: [i32; 10],
    prev_level: usize,
}

impl Numbering {
    /// Parses a scheme definition. An empty string builds an inactive
    /// numbering.
    pub fn parse(scheme: &str, report: &mut Report) -> Self {
        let mut numbering = Numbering {
            output_mode: OutputMode::default(),
            start_level: 10,
            end_level: 0,
            levels: Default::default(),
            counters: [0; 10],
            prev_level: 0,
        };
        let scheme = scheme.trim();
        if scheme.is_empty() {
            return numbering;
        }
        // the definition separator is the first non-numeric character
        let separator = scheme
            .chars()
            .find(|c| !c.is_ascii_digit())
            .unwrap_or(':');
        for def in scheme.split(',') {
            let mut parts = def.split(separator);
            let level: usize = parts.next().unwrap_or("").trim().parse().unwrap_or(0);
            let prefix = parts.next().unwrap_or("");
            let symbol = parts.next().unwrap_or("1");
            let level_separator = parts.next().unwrap_or("");
            if !(1..=9).contains(&level) {
                report.error(
                    format!("invalid .numbering scheme '{def}': level must be between 1 and 9"),
                    None,
                    None,
                );
                continue;
            }
            if level < numbering.start_level {
                numbering.start_level = level;
            } else if level > numbering.end_level {
                numbering.end_level = level;
            }
            let mut entry = LevelScheme {
                prefix: prefix.to_string(),
                symbol: None,
                separator: level_separator.to_string(),
            };
            if level > 1 && !entry.prefix.is_empty() {
                report.warning(
                    format!("prefix '{}' in '{def}' will be ignored (level > 1)", entry.prefix),
                    None,
                    None,
                );
                entry.prefix.clear();
            }
            entry.symbol = match symbol {
                "&I" => Some(Symbol::Roman(true)),
                "&i" => Some(Symbol::Roman(false)),
                s => match s.chars().next() {
                    Some(c @ '1'..='9') if s.len() == 1 => Some(Symbol::Digit(c)),
                    Some(c) if s.len() == 1 && c.is_ascii_alphabetic() => {
                        Some(Symbol::Letter(c))
                    }
                    _ => {
                        report.error(
                            format!(
                                "invalid numbering symbol in .numbering '{def}': \
                                 values are 1 to 9, 'a' to 'z', 'A' to 'Z', '&i' or '&I'"
                            ),
                            None,
                            None,
                        );
                        None
                    }
                },
            };
            numbering.levels[level] = Some(entry);
        }
        numbering
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// True when at least one level definition was accepted.
    pub fn is_active(&self) -> bool {
        self.levels.iter().any(|l| l.is_some())
    }

    pub fn start(&self) -> usize {
        self.start_level
    }

    pub fn end(&self) -> usize {
        self.end_level
    }

    /// Resets all level counters except the top one, which is set per
    /// file by `.topnumber`.
    pub fn reset_sub(&mut self) {
        for (level, counter) in self.counters.iter_mut().enumerate() {
            if level != 1 {
                *counter = 0;
            }
        }
        self.prev_level = 0;
    }

    /// Sets the running number of a level; 1 selects the first symbol
    /// of the level scheme.
    pub fn set_level_number(&mut self, level: usize, number: i32) {
        if (1..10).contains(&level) {
            self.counters[level] = number - 1;
        }
    }

    /// Advances the counter for a level: entering a deeper level resets
    /// it, staying at or returning to a level increments it. Level 1 is
    /// fixed per file and never advanced here.
    pub fn next_number(&mut self, level: usize) {
        if (self.start_level == 0 && self.end_level == 0) || level == 1 || !(1..10).contains(&level)
        {
            return;
        }
        if level <= self.prev_level {
            self.counters[level] += 1;
        } else {
            self.counters[level] = 0;
        }
        self.prev_level = level;
    }

    /// Advances to the next number for a level and renders the label
    /// written before a heading or TOC entry. `add_dash` prepends the
    /// list dash used by TOC lines in non-pure Markdown and plain HTML
    /// modes.
    pub fn label(&mut self, level: usize, add_dash: bool) -> String {
        let mut sequence = String::new();
        if add_dash
            && matches!(
                self.output_mode,
                OutputMode::Md | OutputMode::MdNum | OutputMode::Html | OutputMode::HtmlOld
            )
        {
            sequence.push_str("- ");
        }
        if (self.start_level == 0 && self.end_level == 0) || !self.is_active() {
            return sequence;
        }
        self.next_number(level);
        if !(1..10).contains(&level) {
            return sequence;
        }

        // pure Markdown: emit an ordered-list number and let viewers
        // renumber
        if self.output_mode == OutputMode::MdPure {
            let number = self.counters[level] + 1;
            if number > 0 {
                return format!("{number}. ");
            }
            return sequence;
        }

        if level == 1 && self.start_level <= 1 && self.counters[1] >= 0 {
            if let Some(scheme) = &self.levels[1] {
                sequence.push_str(&scheme.prefix);
            }
        }
        for i in self.start_level..=level.min(9) {
            if self.counters[i] < 0 {
                continue;
            }
            let (symbol, separator) = match &self.levels[i] {
                Some(scheme) => (scheme.symbol.unwrap_or(Symbol::Digit('1')), scheme.separator.as_str()),
                None => (Symbol::Digit('1'), ""),
            };
            match symbol {
                Symbol::Digit(start) => {
                    let value = (start as i32 - '0' as i32) + self.counters[i];
                    sequence.push_str(&value.to_string());
                }
                Symbol::Letter(start) => {
                    let value = (start as u8).wrapping_add(self.counters[i] as u8);
                    sequence.push(value as char);
                }
                Symbol::Roman(upper) => {
                    let roman = to_roman((self.counters[i] + 1) as u32);
                    if upper {
                        sequence.push_str(&roman);
                    } else {
                        sequence.push_str(&roman.to_lowercase());
                    }
                }
            }
            if i < level {
                sequence.push_str(separator);
            } else {
                sequence.push_str(") ");
            }
        }
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme(text: &str) -> Numbering {
        let mut report = Report::new();
        let numbering = Numbering::parse(text, &mut report);
        assert_eq!(report.error_count(), 0);
        numbering
    }

    #[test]
    fn roman_conversion() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(1987), "MCMLXXXVII");
        assert_eq!(from_roman("MCMLXXXVII"), 1987);
        assert_eq!(from_roman("xiv"), 14);
        assert_eq!(from_roman("hello"), 0);
    }

    #[test]
    fn labels_follow_levels() {
        let mut numbering = scheme("1:Chapter :1:.,2::1:.,3::1:.");
        assert_eq!(numbering.label(1, false), "Chapter 1) ");
        assert_eq!(numbering.label(2, false), "1.1) ");
        assert_eq!(numbering.label(2, false), "1.2) ");
        assert_eq!(numbering.label(3, false), "1.2.1) ");
        assert_eq!(numbering.label(2, false), "1.3) ");
    }

    #[test]
    fn replay_is_idempotent() {
        let mut numbering = scheme("1::1:.,2::1:.");
        numbering.label(1, false);
        numbering.label(2, false);
        numbering.reset_sub();
        assert_eq!(numbering.label(1, false), "1) ");
        assert_eq!(numbering.label(2, false), "1.1) ");
    }

    #[test]
    fn letter_and_roman_symbols() {
        let mut numbering = scheme("1::A:-,2::&i:");
        assert_eq!(numbering.label(1, false), "A) ");
        assert_eq!(numbering.label(2, false), "A-i) ");
        assert_eq!(numbering.label(2, false), "A-ii) ");
    }

    #[test]
    fn dash_only_without_scheme() {
        let mut report = Report::new();
        let mut numbering = Numbering::parse("", &mut report);
        assert!(!numbering.is_active());
        assert_eq!(numbering.label(2, true), "- ");
        assert_eq!(numbering.label(2, false), "");
    }

    #[test]
    fn topnumber_offsets_level_one() {
        let mut numbering = scheme("1::1:.,2::1:.");
        numbering.set_level_number(1, 3);
        assert_eq!(numbering.label(1, false), "3) ");
        assert_eq!(numbering.label(2, false), "3.1) ");
    }
}
