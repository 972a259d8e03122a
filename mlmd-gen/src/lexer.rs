//! Directive tokenizer and two-phase template processing
//!
//! The [`Lexer`] reads one template twice. The preprocessing pass
//! collects everything output needs ahead of time: the declared
//! language list, headings of every file, numbering schemes and
//! per-file top numbers, the starting line after `.languages`. The
//! processing pass then tokenizes the template line by line into a
//! pending token list and replays it through an [`OutputRouter`].
//!
//! Tokens stay pending until end of file (or a `.toc` directive)
//! because a few collapsing rules rewrite the tail of the list after
//! the fact:
//!
//! - a blank line outside language sections becomes an `all` section
//!   holding the line break, so every language gets the paragraph gap,
//! - an EOL sitting between a close (or text) and an opening directive
//!   is dropped, letting consecutive per-language source lines share
//!   one output line,
//! - an EOL enclosed right before a close moves after it,
//! - EOLs never pile up beyond two in a row.

use std::collections::HashMap;
use std::io::Write;

use crate::heading::{Heading, HeadingArray};
use crate::language::{LanguageList, LanguageStack, StackEntry, ALL, DEFAULT, IGNORE};
use crate::numbering::Numbering;
use crate::output::OutputRouter;
use crate::output_mode::OutputMode;
use crate::report::Report;
use crate::storage::CharacterStream;
use crate::token::catalog::EscaperKind;
use crate::token::{Marker, Token, TokenCatalog};

/// True when `text` starts with `prefix`, ASCII case ignored.
pub(crate) fn starts_with_ci(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// First position of `key` in `text`, ASCII case ignored.
fn find_ci(text: &str, key: &str) -> Option<usize> {
    if key.len() > text.len() {
        return None;
    }
    (0..=text.len() - key.len()).find(|&i| {
        text.is_char_boundary(i) && text.as_bytes()[i..i + key.len()].eq_ignore_ascii_case(key.as_bytes())
    })
}

/// Consumes and returns everything left in the stream.
fn read_rest(stream: &mut CharacterStream) -> String {
    let mut text = String::new();
    while let Some(c) = stream.current_char() {
        text.push(c);
        stream.next_char();
    }
    text
}

/// `title=` and `level=` parameters of a `.toc` directive, accepted in
/// either order. The title runs until the next recognized parameter
/// key; the level spec accepts `N`, `-N`, `N-` and `N-M` forms.
fn parse_toc_params(params: &str) -> (String, usize, usize) {
    let mut title = String::from("Table of Contents");
    let mut start = 2usize;
    let mut end = 4usize;
    let params = params.trim();
    let mut level_area = params;
    let mut after_title_level = None;
    if let Some(pos) = find_ci(params, "title=") {
        let after = &params[pos + "title=".len()..];
        let text = match find_ci(after, "level=") {
            Some(cut) => {
                after_title_level = Some(&after[cut + "level=".len()..]);
                &after[..cut]
            }
            None => after,
        };
        let text = text.trim();
        if !text.is_empty() {
            title = text.to_string();
        }
        level_area = &params[..pos];
    }
    let spec_area = after_title_level
        .or_else(|| find_ci(level_area, "level=").map(|pos| &level_area[pos + "level=".len()..]));
    if let Some(area) = spec_area {
        let spec = area.split_whitespace().next().unwrap_or("");
        match spec.split_once('-') {
            None => {
                if let Ok(n) = spec.parse() {
                    start = n;
                    end = n;
                }
            }
            Some(("", high)) => {
                start = 1;
                end = high.parse().unwrap_or(9);
            }
            Some((low, "")) => {
                start = low.parse().unwrap_or(1);
                end = 9;
            }
            Some((low, high)) => {
                start = low.parse().unwrap_or(start);
                end = high.parse().unwrap_or(end);
            }
        }
    }
    (title, start, end)
}

pub struct Lexer {
    catalog: TokenCatalog,
    languages: LanguageList,
    language_set: bool,
    output_mode: OutputMode,
    /// Open directives of the parsing pass; the router replays its own
    /// copy when the pending tokens are drained.
    scopes: LanguageStack,
    pending: Vec<Token>,
    /// Consecutive EOLs at the tail of the pending list, recomputed
    /// before every EOL decision.
    eol_count: usize,
    /// Open minus closed directives appended so far; blank line
    /// rewriting only happens outside language sections.
    language_count: usize,
    /// True until a token with content is appended; EOLs before the
    /// first content are dropped.
    empty_content: bool,
    /// Relative file names in registration order.
    files: Vec<String>,
    headings: HashMap<String, HeadingArray>,
    numberings: HashMap<String, Numbering>,
    /// First line to process, right after the `.languages` directive.
    starting_lines: HashMap<String, usize>,
    top_numbers: HashMap<String, i32>,
    /// Scheme applied to files without their own `.numbering`.
    default_numbering: Option<Numbering>,
    pictures_dir: Option<String>,
    heading_sequence: u32,
    heading_prev_level: usize,
    current_file: String,
}

impl Lexer {
    pub fn new(output_mode: OutputMode) -> Self {
        Self {
            catalog: TokenCatalog::new(),
            languages: LanguageList::default(),
            language_set: false,
            output_mode,
            scopes: LanguageStack::new(),
            pending: Vec::new(),
            eol_count: 0,
            language_count: 0,
            empty_content: true,
            files: Vec::new(),
            headings: HashMap::new(),
            numberings: HashMap::new(),
            starting_lines: HashMap::new(),
            top_numbers: HashMap::new(),
            default_numbering: None,
            pictures_dir: None,
            heading_sequence: 0,
            heading_prev_level: 0,
            current_file: String::new(),
        }
    }

    pub fn languages(&self) -> &LanguageList {
        &self.languages
    }

    /// True once a `.languages` directive was found in some input file.
    pub fn language_set(&self) -> bool {
        self.language_set
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Directory declared by `.picturesdir`, if any.
    pub fn pictures_dir(&self) -> Option<&str> {
        self.pictures_dir.as_deref()
    }

    /// Sets the numbering scheme applied to files that declare none.
    /// A scheme from the first `.numbering` directive does not replace
    /// a scheme set here.
    pub fn set_default_numbering(&mut self, scheme: &str, report: &mut Report) {
        let mut numbering = Numbering::parse(scheme, report);
        numbering.set_output_mode(self.output_mode);
        self.default_numbering = Some(numbering);
    }

    fn set_languages(&mut self, params: &str, report: &mut Report) {
        if self.languages.set_from(params, report) {
            self.language_set = true;
            self.catalog.set_languages(&self.languages);
        }
    }

    /// Preprocessing pass over one file: languages, headings, numbering,
    /// top numbers, pictures directory. Files must be preprocessed in
    /// processing order so heading anchors are numbered consistently.
    pub fn preprocess_file(&mut self, rel: &str, file: &mut CharacterStream, report: &mut Report) {
        let mut top_number = 1i32;
        let mut array = HeadingArray::new(rel);
        array.set_output_mode(self.output_mode);
        while let Some(line) = file.get_line() {
            let line_no = file.current_line();
            let trimmed = line.trim();
            if starts_with_ci(trimmed, ".end") {
                break;
            }
            if starts_with_ci(trimmed, ".languages") {
                self.set_languages(&trimmed[".languages".len()..], report);
                self.starting_lines.insert(rel.to_string(), line_no + 1);
                continue;
            }
            if !self.language_set {
                continue;
            }
            if trimmed.starts_with("```") {
                let mut closed = false;
                while let Some(inner) = file.get_line() {
                    if inner.starts_with("```") {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    report.error(
                        "Code fence (```) unable to find closing code fence",
                        Some(rel),
                        Some(line_no),
                    );
                }
                continue;
            }
            if starts_with_ci(trimmed, ".topnumber") {
                if let Ok(number) = trimmed[".topnumber".len()..].trim().parse() {
                    top_number = number;
                }
                continue;
            }
            if starts_with_ci(trimmed, ".numbering") {
                if self.numberings.contains_key(rel) {
                    report.warning("numbering scheme overloading", Some(rel), Some(line_no));
                }
                let scheme = trimmed[".numbering".len()..].trim();
                let mut numbering = Numbering::parse(scheme, report);
                numbering.set_output_mode(self.output_mode);
                if self.default_numbering.is_none() {
                    self.default_numbering = Some(numbering.clone());
                }
                self.numberings.insert(rel.to_string(), numbering);
                continue;
            }
            if starts_with_ci(trimmed, ".picturesdir") {
                self.pictures_dir = Some(trimmed[".picturesdir".len()..].trim().to_string());
                continue;
            }
            if trimmed.starts_with('#') {
                array.push(Heading::parse(
                    trimmed,
                    line_no,
                    &mut self.heading_sequence,
                    &mut self.heading_prev_level,
                    report,
                    rel,
                ));
            }
        }
        self.starting_lines.entry(rel.to_string()).or_insert(0);
        self.top_numbers.insert(rel.to_string(), top_number);
        if array.is_empty() {
            // every file needs at least one heading for TOC links
            array.push(Heading::parse(
                &format!("# {rel}"),
                1,
                &mut self.heading_sequence,
                &mut self.heading_prev_level,
                report,
                rel,
            ));
        }
        self.headings.insert(rel.to_string(), array);
        self.files.push(rel.to_string());
    }

    /// Completes preprocessing once every file was seen: files without
    /// their own scheme get the default one, and each level 1 counter
    /// starts at the file's `.topnumber`.
    pub fn finish_preprocess(&mut self) {
        let files = self.files.clone();
        for rel in &files {
            if !self.numberings.contains_key(rel) {
                if let Some(default) = &self.default_numbering {
                    self.numberings.insert(rel.clone(), default.clone());
                }
            }
            let top = self.top_numbers.get(rel).copied().unwrap_or(1);
            if let Some(numbering) = self.numberings.get_mut(rel) {
                numbering.set_level_number(1, top);
            }
        }
    }

    /// Processing pass over one file, writing to the router's sinks.
    /// Returns the number of template lines read. `.end` and `.stop`
    /// match on the trimmed line, like the preprocessing pass.
    pub fn process_file<W: Write>(
        &mut self,
        rel: &str,
        file: &mut CharacterStream,
        router: &mut OutputRouter<'_, W>,
        report: &mut Report,
    ) -> usize {
        self.current_file = rel.to_string();
        self.scopes.reset();
        self.pending.clear();
        self.eol_count = 0;
        self.language_count = 0;
        self.empty_content = true;
        let start = self.starting_lines.get(rel).copied().unwrap_or(0);
        while let Some(line) = file.get_line() {
            let line_no = file.current_line();
            let trimmed = line.trim();
            if starts_with_ci(trimmed, ".end") {
                report.warning(".end directive found", Some(rel), Some(line_no));
                break;
            }
            if line_no < start {
                continue;
            }
            if starts_with_ci(trimmed, ".stop") {
                report.warning(".stop directive found", Some(rel), Some(line_no));
                continue;
            }
            self.tokenize(&line, line_no, Some(file), router, report);
            self.append_eol();
        }
        let unclosed: Vec<StackEntry> = self.scopes.unclosed().cloned().collect();
        for entry in &unclosed {
            report.warning(
                format!(
                    "a .{}(( language opening directive has not been closed",
                    entry.code
                ),
                Some(rel),
                Some(entry.line),
            );
        }
        for _ in 0..unclosed.len() {
            let _ = self.scopes.pop();
            self.append_token(Token::Close);
        }
        self.drain(router);
        router.end_output();
        file.current_line()
    }

    /// Cuts one line (or synthesized text) into pending tokens. `file`
    /// is the backing input, needed by escapers spanning several lines
    /// and by heading replacement; recursive calls pass `None`.
    fn tokenize<W: Write>(
        &mut self,
        text: &str,
        line: usize,
        mut file: Option<&mut CharacterStream>,
        router: &mut OutputRouter<'_, W>,
        report: &mut Report,
    ) {
        let mut stream = CharacterStream::from_str(text);
        let mut current = String::new();
        loop {
            let Some(c) = stream.current_char() else {
                break;
            };
            if !self.language_set {
                // nothing is interpreted or kept before .languages
                if c == '.' {
                    if let Some((Marker::Languages, len)) = self.catalog.recognize(&mut stream) {
                        let _ = stream.get_string(len);
                        let params = read_rest(&mut stream);
                        self.set_languages(&params, report);
                        continue;
                    }
                }
                stream.next_char();
                continue;
            }
            match c {
                '#' => {
                    let replacement = if file.is_some() && stream.prev_char() == Some('\n') {
                        self.heading_replacement(line)
                    } else {
                        None
                    };
                    match replacement {
                        Some((prefix, text)) => {
                            self.flush_text(&mut current);
                            self.tokenize(".all((", line, None, router, report);
                            self.append_token(Token::Text(prefix));
                            self.tokenize(".))", line, None, router, report);
                            self.tokenize(&text, line, None, router, report);
                            let _ = read_rest(&mut stream);
                        }
                        None => {
                            current.push(c);
                            stream.next_char();
                        }
                    }
                }
                '.' | '`' | '"' => match self.catalog.recognize(&mut stream) {
                    Some((marker, len)) => {
                        self.flush_text(&mut current);
                        self.handle_marker(
                            marker,
                            len,
                            &mut stream,
                            line,
                            file.as_deref_mut(),
                            router,
                            report,
                        );
                    }
                    None => {
                        current.push(c);
                        stream.next_char();
                    }
                },
                _ => {
                    current.push(c);
                    stream.next_char();
                }
            }
        }
        self.flush_text(&mut current);
        self.adjust_eol_close_eol();
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_marker<W: Write>(
        &mut self,
        marker: Marker,
        len: usize,
        stream: &mut CharacterStream,
        line: usize,
        file: Option<&mut CharacterStream>,
        router: &mut OutputRouter<'_, W>,
        report: &mut Report,
    ) {
        match marker {
            Marker::OpenLanguage(code) => {
                let _ = stream.get_string(len);
                self.open_section(&code, line);
            }
            Marker::OpenAll => {
                let _ = stream.get_string(len);
                self.open_section(ALL, line);
            }
            Marker::OpenDefault => {
                let _ = stream.get_string(len);
                self.open_section(DEFAULT, line);
            }
            Marker::OpenIgnore => {
                let _ = stream.get_string(len);
                self.open_section(IGNORE, line);
            }
            Marker::Close => {
                let _ = stream.get_string(len);
                if self.scopes.pop().is_some() {
                    self.append_token(Token::Close);
                }
                // closing at root level is silently ignored
            }
            Marker::Toc => {
                let _ = stream.get_string(len);
                let params = read_rest(stream);
                self.insert_toc(&params, line, router, report);
            }
            Marker::Languages
            | Marker::Numbering
            | Marker::TopNumber
            | Marker::Include
            | Marker::PicturesDir
            | Marker::End
            | Marker::Stop => {
                // settled during preprocessing, the line only has to go
                let _ = stream.get_string(len);
                let _ = read_rest(stream);
            }
            Marker::Escaper(kind) => self.handle_escaper(kind, len, stream, file, report),
        }
    }

    fn open_section(&mut self, code: &str, line: usize) {
        // an explicit default at root level changes nothing
        if code == DEFAULT && self.scopes.depth() == 1 {
            return;
        }
        self.scopes.push(code, line);
        self.adjust_close_open();
        self.append_token(Token::Open {
            code: code.to_string(),
            line,
        });
    }

    fn handle_escaper(
        &mut self,
        kind: EscaperKind,
        len: usize,
        stream: &mut CharacterStream,
        mut file: Option<&mut CharacterStream>,
        report: &mut Report,
    ) {
        match kind {
            EscaperKind::Fence => {
                // the whole opening line is kept, then source lines are
                // copied up to and including the closing fence line
                let mut content = read_rest(stream);
                if let Some(file) = file {
                    let mut closed = false;
                    while let Some(line) = file.get_line() {
                        content.push('\n');
                        content.push_str(&line);
                        if line.starts_with("```") {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        report.warning(
                            "Code fence (```) unable to find closing code fence",
                            Some(&self.current_file),
                            Some(file.current_line()),
                        );
                    }
                }
                self.append_token(Token::Escaped(content));
            }
            EscaperKind::Mlmd => {
                // markers are stripped, content may span lines
                let _ = stream.get_string(len);
                let mut content = String::new();
                let mut closed = false;
                loop {
                    match stream.current_char() {
                        Some(c) => {
                            content.push(c);
                            stream.next_char();
                            if content.ends_with(".!") {
                                content.truncate(content.len() - 2);
                                closed = true;
                                break;
                            }
                        }
                        None => {
                            let Some(line) = file.as_deref_mut().and_then(|f| f.get_line()) else {
                                break;
                            };
                            content.push('\n');
                            stream.append_text(&line);
                        }
                    }
                }
                if !closed {
                    report.warning(
                        "a '.!' has no matching '.!'",
                        Some(&self.current_file),
                        None,
                    );
                }
                self.append_token(Token::Escaped(content));
            }
            EscaperKind::TripleBacktick => self.escape_span("```", stream, report),
            EscaperKind::DoubleBacktick => self.escape_span("``", stream, report),
            EscaperKind::SingleBacktick => self.escape_span("`", stream, report),
            EscaperKind::DoubleQuote => self.escape_span("\"", stream, report),
        }
    }

    /// Single line escaper: content keeps the surrounding marks and is
    /// copied verbatim up to the closing mark or the end of the line.
    fn escape_span(&mut self, keyword: &str, stream: &mut CharacterStream, report: &mut Report) {
        let _ = stream.get_string(keyword.chars().count());
        let mut content = String::from(keyword);
        let mut closed = false;
        while let Some(c) = stream.current_char() {
            content.push(c);
            stream.next_char();
            if content[keyword.len()..].ends_with(keyword) {
                closed = true;
                break;
            }
        }
        if !closed {
            report.warning(
                format!("a '{keyword}' escaper has no matching closing mark"),
                Some(&self.current_file),
                None,
            );
        }
        self.append_token(Token::Escaped(content));
    }

    /// Replacement parts for a heading line: the `#` prefix and the
    /// annotated text built from the preprocessed headings.
    fn heading_replacement(&self, line: usize) -> Option<(String, String)> {
        let array = self.headings.get(&self.current_file)?;
        let (index, heading) = array.find_by_line(line)?;
        let mut numbering = self.numberings.get(&self.current_file).cloned();
        let prefix = format!("{} ", "#".repeat(heading.level()));
        let text = array.heading_text(index, numbering.as_mut());
        Some((prefix, text))
    }

    /// Expands a `.toc` directive: title heading, then one line per
    /// eligible heading, flushed as they are produced.
    fn insert_toc<W: Write>(
        &mut self,
        params: &str,
        line: usize,
        router: &mut OutputRouter<'_, W>,
        report: &mut Report,
    ) {
        let (title, start, end) = parse_toc_params(params);
        self.tokenize(".all((", line, None, router, report);
        self.append_token(Token::Text("## ".to_string()));
        self.tokenize(".))", line, None, router, report);
        let title_line = format!("{title}{}", self.output_mode.anchor("toc"));
        self.tokenize(&title_line, line, None, router, report);
        self.append_eol();
        let files = if start == 1 {
            // a global TOC covers every file, ordered by top number
            let mut files = self.files.clone();
            files.sort_by_key(|rel| self.top_numbers.get(rel).copied().unwrap_or(0));
            files
        } else {
            vec![self.current_file.clone()]
        };
        let current_file = self.current_file.clone();
        for rel in files {
            let mut numbering = self.numberings.get(&rel).cloned();
            if let Some(n) = &numbering {
                if n.start() > end || n.end() < start {
                    report.error(
                        "Inconsistent levels in TOC directive or missing numbering scheme",
                        Some(&rel),
                        Some(line),
                    );
                    continue;
                }
            }
            let mut lines = Vec::new();
            {
                let Some(array) = self.headings.get(&rel) else {
                    continue;
                };
                for index in 0..array.len() {
                    let Some(heading) = array.get(index) else {
                        break;
                    };
                    if heading.level() < start || heading.level() > end {
                        continue;
                    }
                    match array.toc_line(index, numbering.as_mut(), &current_file) {
                        Some(text) => lines.push(text),
                        None => report.error(
                            "Inconsistent levels in TOC directive or missing numbering scheme",
                            Some(&rel),
                            Some(line),
                        ),
                    }
                }
            }
            for text in lines {
                self.append_eol();
                self.tokenize(&text, line, None, router, report);
                self.drain(router);
                router.flush_buffers();
            }
        }
    }

    fn flush_text(&mut self, current: &mut String) {
        if !current.is_empty() {
            self.append_token(Token::Text(std::mem::take(current)));
        }
    }

    /// Appends an EOL unless no content was appended yet.
    fn append_eol(&mut self) {
        if !self.empty_content {
            self.append_token(Token::Eol);
        }
    }

    fn append_token(&mut self, token: Token) {
        if token.is_eol() {
            // a blank line between sections becomes an all() section so
            // every language gets the paragraph gap
            if self.language_count == 0 && self.pending.last().is_some_and(Token::is_eol) {
                self.delete_last_token();
                self.pending.push(Token::Open {
                    code: ALL.to_string(),
                    line: 0,
                });
                self.language_count += 1;
                self.append_eol();
                self.append_eol();
                self.pending.push(Token::Close);
                self.language_count -= 1;
                return;
            }
            // trailing spacing on a line is dropped with its EOL redone
            let count = self.pending.len();
            if count >= 2 && self.pending[count - 1].is_spacing() && self.pending[count - 2].is_eol()
            {
                self.delete_last_token();
                self.append_eol();
                return;
            }
            self.recalculate_eols();
            if self.eol_count >= 2 {
                return;
            }
            self.eol_count += 1;
        } else {
            self.eol_count = 0;
        }
        if !token.is_empty() {
            self.empty_content = false;
        }
        match &token {
            Token::Open { .. } => {
                self.language_count += 1;
                self.recalculate_eols();
            }
            Token::Close => {
                self.language_count = self.language_count.saturating_sub(1);
                self.recalculate_eols();
            }
            _ => {}
        }
        self.pending.push(token);
    }

    fn delete_last_token(&mut self) {
        match self.pending.pop() {
            Some(Token::Close) => self.language_count += 1,
            Some(Token::Open { .. }) => {
                self.language_count = self.language_count.saturating_sub(1)
            }
            Some(Token::Eol) => self.eol_count = self.eol_count.saturating_sub(1),
            _ => {}
        }
    }

    /// Recounts the EOLs ending the pending list, looking through
    /// sections opened for `all` or the current language. A section
    /// with its own content stops the count.
    fn recalculate_eols(&mut self) {
        self.eol_count = 0;
        let current = self.scopes.current().to_string();
        let mut index = self.pending.len();
        while index > 0 {
            index -= 1;
            match &self.pending[index] {
                Token::Eol => self.eol_count += 1,
                Token::Close => {
                    let mut eols = 0usize;
                    let mut non_eol = false;
                    let mut count_ok = false;
                    let mut open_index = None;
                    let mut inner = index;
                    while inner > 0 {
                        inner -= 1;
                        match &self.pending[inner] {
                            Token::Open { code, .. } => {
                                count_ok = code == ALL || *code == current;
                                open_index = Some(inner);
                                break;
                            }
                            Token::Eol if !non_eol => eols += 1,
                            Token::Eol => {}
                            _ => non_eol = true,
                        }
                    }
                    if eols > 0 && count_ok {
                        self.eol_count += eols;
                    }
                    let Some(open_index) = open_index else {
                        break;
                    };
                    if non_eol {
                        break;
                    }
                    index = open_index;
                }
                Token::Open { code, .. } if code == ALL || *code == current => {}
                _ => break,
            }
        }
    }

    /// Deletes a lone EOL between a close (or text) and the opening
    /// directive about to be appended, joining the two source lines.
    fn adjust_close_open(&mut self) {
        let count = self.pending.len();
        if count >= 2
            && self.pending[count - 1].is_eol()
            && (self.pending[count - 2].is_close() || self.pending[count - 2].is_text_or_escaped())
        {
            self.delete_last_token();
        }
    }

    /// Moves a close sitting right after a lone EOL before it, so the
    /// line break lands outside the closed section.
    fn adjust_eol_close_eol(&mut self) {
        let count = self.pending.len();
        if count >= 3
            && self.pending[count - 1].is_close()
            && self.pending[count - 2].is_eol()
            && !self.pending[count - 3].is_eol()
        {
            self.delete_last_token();
            self.delete_last_token();
            self.append_token(Token::Close);
        }
    }

    /// Replays every pending token through the router.
    fn drain<W: Write>(&mut self, router: &mut OutputRouter<'_, W>) {
        for token in self.pending.drain(..) {
            match token {
                Token::Text(text) => router.write_content(&text, true),
                Token::Escaped(text) => router.write_content(&text, false),
                Token::Eol => router.write_eol(),
                Token::Open { code, line } => router.open_scope(&code, line),
                Token::Close => router.close_scope(),
            }
        }
    }
}
