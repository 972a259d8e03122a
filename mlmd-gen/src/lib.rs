//! Multilingual Markdown generation
//!
//!     This crate turns one annotated Markdown template into one plain
//!     Markdown file per declared language. A template is a normal
//!     Markdown file plus directives: `.languages` declares the output
//!     languages, `.<code>((` ... `.))` brackets language-specific
//!     sections, `.all((`, `.((` and `.ignore((` target every language,
//!     the default text or nobody, and line directives handle includes,
//!     heading numbering and table-of-contents generation.
//!
//!     TLDR for callers:
//!         - build a [`GeneratorOptions`], add inputs to a [`Generator`], call `run()`
//!         - inspect the returned [`RunSummary`]: written files plus a [`Report`] of
//!           warnings and errors, nothing is printed by the library itself
//!         - the lower layers (lexer, router) are public for tests and tooling but
//!           `Generator` is the supported entry point
//!
//! Architecture
//!
//!     Processing is two-phase. A preprocessing pass over every input collects
//!     what output needs ahead of time (languages, headings, numbering schemes,
//!     included files); the processing pass then tokenizes each line and routes
//!     the token stream into per-language buffered writers. Tokens stay pending
//!     until end of file so that a handful of look-behind rewrites (blank line
//!     wrapping, EOL cancelling around directives) can fix the stream before
//!     anything is written.
//!
//!     This is a pure lib: it powers the mlmd binary but is shell agnostic, no
//!     code here prints, reads env vars or assumes a terminal.
//!
//!     The file structure :
//!     .
//!     ├── error.rs            # GenError for IO / usage failures
//!     ├── report.rs           # Diagnostic collection (warnings, errors)
//!     ├── storage.rs          # Buffered character stream over inputs
//!     ├── language.rs         # .languages list and the section stack
//!     ├── token               # Stream tokens and the directive catalog
//!     ├── lexer.rs            # Tokenizer, collapsing rules, two passes
//!     ├── heading.rs          # Preprocessed headings, TOC lines
//!     ├── numbering.rs        # .numbering schemes and level counters
//!     ├── output_mode.rs      # md / html family output variants
//!     ├── output.rs           # Per-language buffering and routing
//!     ├── vars.rs             # {file}, {language}, {picture:...} expansion
//!     ├── pictures.rs         # Picture lookup and copying
//!     └── generator.rs        # Whole-run orchestration

pub mod error;
pub mod generator;
pub mod heading;
pub mod language;
pub mod lexer;
pub mod numbering;
pub mod output;
pub mod output_mode;
pub mod pictures;
pub mod report;
pub mod storage;
pub mod token;
pub mod vars;

pub use error::{GenError, Result};
pub use generator::{GeneratedFile, Generator, GeneratorOptions, ProcessedFile, RunSummary};
pub use output_mode::OutputMode;
pub use report::{Diagnostic, Report, Severity};
