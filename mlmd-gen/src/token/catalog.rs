//! Ordered directive keyword catalog
//!
//! Recognition order matters: language opening directives are tried
//! before everything else (so a language named like a directive prefix
//! still wins), `.!((` before the `.!` escaper, and longer backtick
//! escapers before shorter ones. The catalog is rebuilt whenever the
//! declared language list changes.

use crate::language::LanguageList;
use crate::storage::CharacterStream;

/// Escaped-text delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscaperKind {
    /// Line-start triple backtick code fence, runs to the closing fence
    /// line.
    Fence,
    TripleBacktick,
    DoubleBacktick,
    SingleBacktick,
    DoubleQuote,
    /// `.!` ... `.!` escape whose markers are stripped from output.
    Mlmd,
}

/// A directive or escaper recognized at the current stream position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// `.<code>((` for a declared language
    OpenLanguage(String),
    /// `.all((`
    OpenAll,
    /// `.((` or `.default((`
    OpenDefault,
    /// `.ignore((` or `.!((`
    OpenIgnore,
    /// `.))`
    Close,
    Languages,
    Numbering,
    TopNumber,
    Include,
    Toc,
    End,
    Stop,
    PicturesDir,
    Escaper(EscaperKind),
}

struct CatalogEntry {
    keyword: String,
    marker: Marker,
    /// Only recognized right after an EOL (or at the very start).
    line_start: bool,
}

/// Ordered set of recognizable keywords.
pub struct TokenCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for TokenCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCatalog {
    pub fn new() -> Self {
        let mut catalog = TokenCatalog { entries: Vec::new() };
        catalog.rebuild(None);
        catalog
    }

    /// Rebuilds the catalog with one opening entry per declared
    /// language, placed before every fixed keyword.
    pub fn set_languages(&mut self, languages: &LanguageList) {
        self.rebuild(Some(languages));
    }

    fn rebuild(&mut self, languages: Option<&LanguageList>) {
        self.entries.clear();
        if let Some(languages) = languages {
            for entry in languages.iter() {
                self.push(
                    format!(".{}((", entry.code),
                    Marker::OpenLanguage(entry.code.clone()),
                    false,
                );
            }
        }
        self.push(".))", Marker::Close, false);
        self.push(".all((", Marker::OpenAll, false);
        self.push(".((", Marker::OpenDefault, false);
        self.push(".default((", Marker::OpenDefault, false);
        self.push(".!((", Marker::OpenIgnore, false);
        self.push(".ignore((", Marker::OpenIgnore, false);
        self.push(".!", Marker::Escaper(EscaperKind::Mlmd), false);
        self.push("```", Marker::Escaper(EscaperKind::Fence), true);
        self.push("```", Marker::Escaper(EscaperKind::TripleBacktick), false);
        self.push("``", Marker::Escaper(EscaperKind::DoubleBacktick), false);
        self.push("`", Marker::Escaper(EscaperKind::SingleBacktick), false);
        self.push("\"", Marker::Escaper(EscaperKind::DoubleQuote), false);
        self.push(".languages", Marker::Languages, true);
        self.push(".numbering", Marker::Numbering, true);
        self.push(".topnumber", Marker::TopNumber, true);
        self.push(".include", Marker::Include, true);
        self.push(".toc", Marker::Toc, true);
        self.push(".end", Marker::End, true);
        self.push(".stop", Marker::Stop, true);
        self.push(".picturesdir", Marker::PicturesDir, true);
    }

    fn push(&mut self, keyword: impl Into<String>, marker: Marker, line_start: bool) {
        self.entries.push(CatalogEntry {
            keyword: keyword.into(),
            marker,
            line_start,
        });
    }

    /// Finds the first entry matching at the current stream position,
    /// without consuming anything. Returns the marker and the keyword
    /// length in characters.
    pub fn recognize(&self, stream: &mut CharacterStream) -> Option<(Marker, usize)> {
        let at_line_start = matches!(stream.prev_char(), None | Some('\n'));
        for entry in &self.entries {
            if entry.line_start && !at_line_start {
                continue;
            }
            if stream.matches_ci(&entry.keyword) {
                return Some((entry.marker.clone(), entry.keyword.chars().count()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Report;

    fn catalog() -> TokenCatalog {
        let mut report = Report::new();
        let mut languages = LanguageList::default();
        languages.set_from("en,fr", &mut report);
        let mut catalog = TokenCatalog::new();
        catalog.set_languages(&languages);
        catalog
    }

    fn recognize(catalog: &TokenCatalog, text: &str) -> Option<Marker> {
        let mut stream = CharacterStream::from_str(text);
        catalog.recognize(&mut stream).map(|(marker, _)| marker)
    }

    #[test]
    fn languages_win_over_fixed_keywords() {
        let catalog = catalog();
        assert_eq!(
            recognize(&catalog, ".fr((text"),
            Some(Marker::OpenLanguage("fr".into()))
        );
        assert_eq!(recognize(&catalog, ".FR((text"), Some(Marker::OpenLanguage("fr".into())));
        assert_eq!(recognize(&catalog, ".de((text"), None);
    }

    #[test]
    fn ignore_alias_beats_mlmd_escape() {
        let catalog = catalog();
        assert_eq!(recognize(&catalog, ".!(("), Some(Marker::OpenIgnore));
        assert_eq!(
            recognize(&catalog, ".!text"),
            Some(Marker::Escaper(EscaperKind::Mlmd))
        );
    }

    #[test]
    fn longest_backtick_run_wins() {
        let catalog = catalog();
        assert_eq!(
            recognize(&catalog, "```rust"),
            Some(Marker::Escaper(EscaperKind::Fence))
        );
        assert_eq!(
            recognize(&catalog, "``x``"),
            Some(Marker::Escaper(EscaperKind::DoubleBacktick))
        );
        let mut stream = CharacterStream::from_str("x```y");
        stream.next_char();
        // not at line start: triple backtick, not a fence
        assert_eq!(
            catalog.recognize(&mut stream).map(|(m, _)| m),
            Some(Marker::Escaper(EscaperKind::TripleBacktick))
        );
    }

    #[test]
    fn single_line_directives_need_line_start() {
        let catalog = catalog();
        assert_eq!(recognize(&catalog, ".toc level=2"), Some(Marker::Toc));
        let mut stream = CharacterStream::from_str("x.toc");
        stream.next_char();
        assert_eq!(catalog.recognize(&mut stream), None);
    }
}
