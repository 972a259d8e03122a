//! Language declarations and the open-directive stack

use crate::report::Report;

/// Pseudo language code targeting every declared language.
pub const ALL: &str = "all";
/// Pseudo language code discarding everything until closed.
pub const IGNORE: &str = "ignore";
/// Pseudo language code for text without a dedicated section.
pub const DEFAULT: &str = "default";

/// One declared output language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    pub code: String,
    /// Optional ISO identifier, used by the `{iso}` variable.
    pub iso: Option<String>,
}

/// Ordered set of languages declared by the `.languages` directive.
#[derive(Debug, Clone, Default)]
pub struct LanguageList {
    entries: Vec<LanguageEntry>,
    main: Option<String>,
}

impl LanguageList {
    /// Parses the parameters of a `.languages` directive:
    /// comma or space separated `code[=iso]` entries plus an optional
    /// `main=code`. Returns whether at least one language was declared.
    pub fn set_from(&mut self, params: &str, report: &mut Report) -> bool {
        let normalized = params.replace(char::is_whitespace, ",");
        for part in normalized.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((key, value)) if key.eq_ignore_ascii_case("main") => {
                    self.main = Some(value.trim().to_lowercase());
                }
                Some((code, iso)) => {
                    self.add(code.trim(), Some(iso.trim()));
                }
                None => {
                    self.add(part, None);
                }
            }
        }
        if let Some(main) = &self.main {
            if !self.entries.iter().any(|e| &e.code == main) {
                report.warning(
                    format!("main language '{main}' is not a declared language"),
                    None,
                    None,
                );
            }
        }
        !self.entries.is_empty()
    }

    fn add(&mut self, code: &str, iso: Option<&str>) {
        let code = code.to_lowercase();
        if code.is_empty() || self.entries.iter().any(|e| e.code == code) {
            return;
        }
        self.entries.push(LanguageEntry {
            code,
            iso: iso.map(|s| s.to_lowercase()).filter(|s| !s.is_empty()),
        });
    }

    /// True for every declared code and for the `all` / `ignore` /
    /// `default` specials.
    pub fn contains(&self, code: &str) -> bool {
        matches!(code, ALL | IGNORE | DEFAULT) || self.index_of(code).is_some()
    }

    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.code.eq_ignore_ascii_case(code))
    }

    pub fn get(&self, code: &str) -> Option<&LanguageEntry> {
        self.index_of(code).map(|i| &self.entries[i])
    }

    pub fn is_main(&self, code: &str) -> bool {
        self.main
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(code))
    }

    pub fn main(&self) -> Option<&str> {
        self.main.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One open directive on the stack, remembering where it was opened so
/// that end-of-file unbalance warnings can point at it.
#[derive(Debug, Clone)]
pub struct StackEntry {
    pub code: String,
    pub line: usize,
}

/// Stack of open language sections.
///
/// The root entry is a `default` sentinel that is never popped; the
/// current language is always the top of the stack. Entries with the
/// `ignore` code additionally maintain a depth counter that gates all
/// output while non-zero.
#[derive(Debug, Clone)]
pub struct LanguageStack {
    entries: Vec<StackEntry>,
    ignore_depth: usize,
}

impl Default for LanguageStack {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageStack {
    pub fn new() -> Self {
        Self {
            entries: vec![StackEntry {
                code: DEFAULT.to_string(),
                line: 0,
            }],
            ignore_depth: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.entries.len() - 1].code
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn ignore_depth(&self) -> usize {
        self.ignore_depth
    }

    /// Pushes a code unconditionally; callers validate against the
    /// declared languages before pushing.
    pub fn push(&mut self, code: &str, line: usize) {
        let code = code.to_lowercase();
        if code == IGNORE {
            self.ignore_depth += 1;
        }
        self.entries.push(StackEntry { code, line });
    }

    /// Pops the top entry, returning it, or `None` when only the root
    /// sentinel remains (which also clears the ignore depth).
    pub fn pop(&mut self) -> Option<StackEntry> {
        if self.entries.len() <= 1 {
            self.ignore_depth = 0;
            return None;
        }
        let entry = self.entries.pop()?;
        if entry.code == IGNORE {
            self.ignore_depth = self.ignore_depth.saturating_sub(1);
        }
        Some(entry)
    }

    /// Entries left open above the root sentinel, bottom first.
    pub fn unclosed(&self) -> impl Iterator<Item = &StackEntry> {
        self.entries.iter().skip(1)
    }

    pub fn reset(&mut self) {
        self.entries.truncate(1);
        self.ignore_depth = 0;
    }
}
