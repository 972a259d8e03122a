//! Per-language output buffering and routing
//!
//! The [`OutputRouter`] owns one ordered buffer of parts per declared
//! language plus a buffer for default text. Stream tokens drained from
//! the lexer replay their open/close markers against a scope stack
//! here, which selects where content lands:
//!
//! - a language section feeds that language's buffer only,
//! - `all` feeds every language (after giving buffered default text to
//!   the languages that have no specific content yet),
//! - default text goes to the default buffer, forcing a file flush
//!   first when some language already buffered specific content,
//! - `ignore` drops everything while at least one ignore section is
//!   open.
//!
//! EOLs are queued per language rather than buffered, capped at two so
//! generated files never hold more than one empty line in a row; they
//! materialize only when real text follows. Variable expansion happens
//! at flush time, once per language, skipping escaped parts.

use std::io::Write;

use crate::language::{LanguageList, LanguageStack, ALL, DEFAULT, IGNORE};
use crate::output_mode::OutputMode;
use crate::pictures::PictureStore;
use crate::report::Report;
use crate::vars::{self, ExpandContext};

/// One buffered piece of text; `expand` is false for escaped text.
#[derive(Debug, Clone)]
struct OutputPart {
    text: String,
    expand: bool,
}

pub struct OutputRouter<'a, W: Write> {
    languages: LanguageList,
    mode: OutputMode,
    /// One sink per declared language, in declaration order.
    sinks: Vec<W>,
    parts: Vec<Vec<OutputPart>>,
    pending_eols: Vec<usize>,
    trailing_eols: Vec<usize>,
    default_parts: Vec<OutputPart>,
    scopes: LanguageStack,
    started: bool,
    /// Relative source file name without its template extension.
    basename: String,
    main_basename: Option<String>,
    pictures: Option<&'a PictureStore>,
    /// Diagnostics raised while flushing (variable expansion, picture
    /// copies); drained by the caller at the end of the file.
    report: Report,
}

impl<'a, W: Write> OutputRouter<'a, W> {
    /// Builds a router over one sink per declared language. `sinks`
    /// must match the language declaration order.
    pub fn new(
        languages: LanguageList,
        mode: OutputMode,
        sinks: Vec<W>,
        basename: &str,
        main_basename: Option<&str>,
        pictures: Option<&'a PictureStore>,
    ) -> Self {
        let count = languages.len();
        debug_assert_eq!(count, sinks.len());
        Self {
            languages,
            mode,
            sinks,
            parts: vec![Vec::new(); count],
            pending_eols: vec![0; count],
            trailing_eols: vec![0; count],
            default_parts: Vec::new(),
            scopes: LanguageStack::new(),
            started: false,
            basename: basename.to_string(),
            main_basename: main_basename.map(str::to_owned),
            pictures,
            report: Report::new(),
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        self.mode
    }

    pub fn languages(&self) -> &LanguageList {
        &self.languages
    }

    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// True once some real content was routed; EOLs before that are
    /// dropped so files never start with blank lines.
    pub fn started(&self) -> bool {
        self.started
    }

    /// Replays a language opening marker.
    pub fn open_scope(&mut self, code: &str, line: usize) {
        self.scopes.push(code, line);
    }

    /// Replays a section close.
    pub fn close_scope(&mut self) {
        self.scopes.pop();
    }

    /// Routes one piece of content to the current scope.
    pub fn write_content(&mut self, text: &str, expand: bool) {
        if self.scopes.ignore_depth() > 0 {
            return;
        }
        self.started = true;
        match self.scopes.current() {
            ALL => self.output_all(text, expand),
            DEFAULT => self.output_default(text, expand),
            IGNORE => {}
            code => {
                if let Some(index) = self.languages.index_of(code) {
                    self.output_language(index, text, expand);
                }
            }
        }
    }

    /// Routes an end of line; dropped until output has started.
    pub fn write_eol(&mut self) {
        if !self.started || self.scopes.ignore_depth() > 0 {
            return;
        }
        match self.scopes.current() {
            ALL => self.output_all("\n", false),
            DEFAULT => self.output_default("\n", false),
            IGNORE => {}
            code => {
                if let Some(index) = self.languages.index_of(code) {
                    self.output_language(index, "\n", false);
                }
            }
        }
    }

    fn output_all(&mut self, text: &str, expand: bool) {
        self.fill_empty_outputs();
        for index in 0..self.languages.len() {
            self.output_language(index, text, expand);
        }
    }

    fn output_default(&mut self, text: &str, expand: bool) {
        // a language buffered specific content: write everything out
        // before default text starts a new run
        if self.parts.iter().any(|parts| !parts.is_empty()) {
            self.flush_buffers();
        }
        self.default_parts.push(OutputPart {
            text: text.to_string(),
            expand,
        });
    }

    fn output_language(&mut self, index: usize, text: &str, expand: bool) {
        if text.is_empty() {
            return;
        }
        // EOLs wait in a queue capped at two (one empty line at most)
        // and are only written when real text follows
        if text == "\n" {
            if self.pending_eols[index] < 2 {
                self.pending_eols[index] += 1;
            }
            return;
        }
        if self.pending_eols[index] > 0 {
            self.parts[index].push(OutputPart {
                text: "\n".repeat(self.pending_eols[index]),
                expand: false,
            });
            self.pending_eols[index] = 0;
        }
        self.parts[index].push(OutputPart {
            text: text.to_string(),
            expand,
        });
    }

    /// Copies buffered default text into every language buffer that has
    /// no specific content yet, then clears the default buffer.
    fn fill_empty_outputs(&mut self) {
        if self.default_parts.is_empty() {
            return;
        }
        let default_parts = std::mem::take(&mut self.default_parts);
        for index in 0..self.languages.len() {
            if self.parts[index].is_empty() {
                for part in &default_parts {
                    self.output_language(index, &part.text, part.expand);
                }
            }
        }
    }

    /// Writes every buffered part to its sink, expanding variables.
    /// Pending EOLs stay queued; trailing-EOL counts restart with each
    /// flush.
    pub fn flush_buffers(&mut self) {
        self.fill_empty_outputs();
        let Self {
            languages,
            mode,
            sinks,
            parts,
            trailing_eols,
            basename,
            main_basename,
            pictures,
            report,
            ..
        } = self;
        let context = ExpandContext {
            basename,
            main_basename: main_basename.as_deref(),
            languages,
            mode: *mode,
            pictures: *pictures,
        };
        for (index, entry) in languages.iter().enumerate() {
            trailing_eols[index] = 0;
            for part in parts[index].drain(..) {
                let text = if part.expand {
                    vars::expand(&part.text, &entry.code, &context, report)
                } else {
                    part.text
                };
                if text.is_empty() {
                    continue;
                }
                let _ = sinks[index].write_all(text.as_bytes());
                if !text.starts_with('\n') {
                    trailing_eols[index] = 0;
                }
                trailing_eols[index] += text.chars().rev().take_while(|c| *c == '\n').count();
            }
        }
    }

    /// Final flush, guaranteeing every output ends with one EOL.
    pub fn end_output(&mut self) {
        self.flush_buffers();
        for index in 0..self.sinks.len() {
            if self.trailing_eols[index] < 1 {
                let _ = self.sinks[index].write_all(b"\n");
            }
        }
    }

    /// Hands the flush-time diagnostics to the caller's report.
    pub fn take_report(&mut self) -> Report {
        std::mem::take(&mut self.report)
    }

    /// Gives the sinks back, consuming the router.
    pub fn into_sinks(self) -> Vec<W> {
        self.sinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> LanguageList {
        let mut report = Report::new();
        let mut list = LanguageList::default();
        list.set_from("en,fr main=en", &mut report);
        list
    }

    fn router(languages: LanguageList) -> OutputRouter<'static, Vec<u8>> {
        let sinks = vec![Vec::new(), Vec::new()];
        OutputRouter::new(languages, OutputMode::Md, sinks, "doc", None, None)
    }

    fn text_of(sinks: &[Vec<u8>], index: usize) -> String {
        String::from_utf8(sinks[index].clone()).unwrap()
    }

    #[test]
    fn default_text_fills_languages_without_content() {
        let mut router = router(languages());
        router.write_content("shared", true);
        router.open_scope("fr", 1);
        router.write_content("bonjour", true);
        router.close_scope();
        router.end_output();
        let sinks = router.into_sinks();
        assert_eq!(text_of(&sinks, 0), "shared\n");
        assert_eq!(text_of(&sinks, 1), "bonjour\n");
    }

    #[test]
    fn all_section_reaches_every_language() {
        let mut router = router(languages());
        router.open_scope(ALL, 1);
        router.write_content("both", true);
        router.close_scope();
        router.end_output();
        let sinks = router.into_sinks();
        assert_eq!(text_of(&sinks, 0), "both\n");
        assert_eq!(text_of(&sinks, 1), "both\n");
    }

    #[test]
    fn pending_eols_cap_at_two() {
        let mut router = router(languages());
        router.open_scope(ALL, 1);
        router.write_content("a", true);
        for _ in 0..5 {
            router.write_eol();
        }
        router.write_content("b", true);
        router.close_scope();
        router.end_output();
        let sinks = router.into_sinks();
        assert_eq!(text_of(&sinks, 0), "a\n\nb\n");
    }

    #[test]
    fn leading_eols_are_dropped() {
        let mut router = router(languages());
        router.write_eol();
        router.write_eol();
        router.write_content("text", true);
        router.end_output();
        let sinks = router.into_sinks();
        assert_eq!(text_of(&sinks, 0), "text\n");
    }

    #[test]
    fn ignore_sections_produce_nothing() {
        let mut router = router(languages());
        router.write_content("before", true);
        router.open_scope(IGNORE, 1);
        router.write_content("hidden", true);
        router.open_scope("en", 2);
        router.write_content("also hidden", true);
        router.close_scope();
        router.close_scope();
        router.write_content(" after", true);
        router.end_output();
        let sinks = router.into_sinks();
        assert_eq!(text_of(&sinks, 0), "before after\n");
        assert_eq!(text_of(&sinks, 1), "before after\n");
    }

    #[test]
    fn variables_expand_only_in_unescaped_parts() {
        let mut router = router(languages());
        router.open_scope(ALL, 1);
        router.write_content("{language}", true);
        router.write_content(" `{language}`", false);
        router.close_scope();
        router.end_output();
        let sinks = router.into_sinks();
        assert_eq!(text_of(&sinks, 0), "en `{language}`\n");
        assert_eq!(text_of(&sinks, 1), "fr `{language}`\n");
    }
}
