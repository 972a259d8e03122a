//! Headings collected during preprocessing
//!
//! Preprocessing records every `#` heading of every input file before
//! any output happens, so that TOC generation can reference headings
//! across files and numbering can be replayed deterministically.

use crate::numbering::Numbering;
use crate::output_mode::OutputMode;
use crate::report::Report;

/// One heading of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Unique sequence number across all files of the run, used as the
    /// anchor identifier.
    number: u32,
    /// Number of leading `#` characters, 1 to 9.
    level: usize,
    /// Line number in the source file.
    line: usize,
    /// Heading text without the `#` prefix, directives kept.
    text: String,
}

impl Heading {
    /// Parses a `#` heading line. The sequence counter is owned by the
    /// run and incremented here; `prev_level` tracks the previously
    /// parsed level to warn about skipped levels.
    pub fn parse(
        content: &str,
        line: usize,
        sequence: &mut u32,
        prev_level: &mut usize,
        report: &mut Report,
        file: &str,
    ) -> Self {
        *sequence += 1;
        let text = content.trim();
        let level = text.chars().take_while(|c| *c == '#').count();
        if level > *prev_level + 1 {
            report.warning(
                format!("level {level} heading skipped one or more heading levels"),
                Some(file),
                Some(line),
            );
        }
        *prev_level = level;
        Heading {
            number: *sequence,
            level,
            line,
            text: text[level..].trim().to_string(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when no numbering restricts the level, or the level falls
    /// within the numbering limits.
    fn is_level_within(&self, numbering: Option<&Numbering>) -> bool {
        match numbering {
            None => true,
            Some(n) => self.level >= n.start() && self.level <= n.end(),
        }
    }
}

/// All headings of one input file, ordered by line.
#[derive(Debug, Clone)]
pub struct HeadingArray {
    /// Path of the file relative to the root directory, used in TOC
    /// links targeting other files.
    file: String,
    output_mode: OutputMode,
    headings: Vec<Heading>,
}

impl HeadingArray {
    pub fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            output_mode: OutputMode::default(),
            headings: Vec::new(),
        }
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn push(&mut self, heading: Heading) {
        self.headings.push(heading);
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Heading> {
        self.headings.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Heading> {
        self.headings.get(index)
    }

    /// First heading at or after a source line. Heading lookup happens
    /// while the processing loop sits on the heading line itself.
    pub fn find_by_line(&self, line: usize) -> Option<(usize, &Heading)> {
        self.headings
            .iter()
            .enumerate()
            .find(|(_, h)| h.line >= line)
    }

    /// True when no further heading within the level interval follows
    /// the given one (HTML TOC lines end with `<BR>` except the last).
    fn is_last_between(&self, index: usize, start: usize, end: usize) -> bool {
        !self.headings[index + 1..]
            .iter()
            .any(|h| h.level >= start && h.level <= end)
    }

    fn anchor(&self, index: usize) -> String {
        self.output_mode
            .anchor(&self.headings[index].number.to_string())
    }

    /// Numbering label for a heading, replaying the level counters from
    /// the start of the file so the result does not depend on previous
    /// queries.
    fn numbering_label(
        &self,
        index: usize,
        numbering: Option<&mut Numbering>,
        add_dash: bool,
    ) -> Option<String> {
        let numbering = numbering?;
        numbering.reset_sub();
        for heading in &self.headings[..index] {
            numbering.next_number(heading.level);
        }
        Some(numbering.label(self.headings[index].level, add_dash))
    }

    /// Link to a heading for a TOC line. `path` is the target file
    /// relative to the root directory, empty for the current file.
    fn toc_link(&self, path: &str, index: usize, start: usize, end: usize) -> String {
        let id = self.headings[index].number;
        let text = &self.headings[index].text;
        if self.output_mode.is_markdown() {
            format!(".all(([.)){text}.all((](<{path}#a{id}>).))")
        } else if self.is_last_between(index, start, end) {
            format!(".all((<A href=\"{path}#a{id}\">{text}</A>.))")
        } else {
            format!(".all((<A href=\"{path}#a{id}\">{text}</A><BR>.))")
        }
    }

    /// Replacement text for a heading source line. Numbering and anchor
    /// are wrapped in `.all((` sections so every language receives them.
    pub fn heading_text(&self, index: usize, numbering: Option<&mut Numbering>) -> String {
        let anchor = self.anchor(index);
        let label = self
            .numbering_label(index, numbering, false)
            .filter(|l| !l.is_empty());
        let text = &self.headings[index].text;
        if self.output_mode.is_markdown() {
            match label {
                Some(label) => format!(".all(({label}.)){text}.all(({anchor}.))"),
                None => format!("{text}.all(({anchor}.))"),
            }
        } else {
            format!(".all(({anchor}{}.)){text}", label.unwrap_or_default())
        }
    }

    /// Full TOC line for a heading, or `None` when the heading level
    /// falls outside the numbering limits.
    pub fn toc_line(
        &self,
        index: usize,
        mut numbering: Option<&mut Numbering>,
        current_file: &str,
    ) -> Option<String> {
        let heading = self.headings.get(index)?;
        if !heading.is_level_within(numbering.as_deref()) {
            return None;
        }
        let spacing = self.output_mode.toc_spacing(heading.level);
        let label = self.numbering_label(index, numbering.as_deref_mut(), true);
        let (start, end) = match numbering.as_deref() {
            Some(n) => (n.start(), n.end()),
            None => (0, 10000),
        };
        let link = if self.file == current_file {
            self.toc_link("", index, start, end)
        } else {
            // {extension} expands per language at flush time, giving
            // e.g. file.fr.md for the fr output
            let stem = self
                .file
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(&self.file);
            self.toc_link(&format!("{stem}{{extension}}"), index, start, end)
        };
        let label = label.unwrap_or_default();
        if spacing.is_empty() && label.is_empty() {
            return Some(format!("- {link}"));
        }
        let label = if label.is_empty() { "- ".to_string() } else { label };
        Some(format!(".all(({spacing}{label}.)){link}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array_of(lines: &[(&str, usize)]) -> HeadingArray {
        let mut report = Report::new();
        let mut sequence = 0;
        let mut prev_level = 0;
        let mut array = HeadingArray::new("doc.mlmd");
        for (text, line) in lines {
            array.push(Heading::parse(
                text,
                *line,
                &mut sequence,
                &mut prev_level,
                &mut report,
                "doc.mlmd",
            ));
        }
        array
    }

    #[test]
    fn parses_level_and_text() {
        let mut report = Report::new();
        let mut sequence = 0;
        let mut prev_level = 0;
        let heading = Heading::parse("## Some title", 4, &mut sequence, &mut prev_level, &mut report, "f");
        assert_eq!(heading.level(), 2);
        assert_eq!(heading.text(), "Some title");
        assert_eq!(heading.number(), 1);
        assert_eq!(report.warning_count(), 1); // level 2 with no level 1 before
    }

    #[test]
    fn finds_heading_by_line() {
        let array = array_of(&[("# One", 2), ("## Two", 5)]);
        assert_eq!(array.find_by_line(2).map(|(i, _)| i), Some(0));
        assert_eq!(array.find_by_line(3).map(|(i, _)| i), Some(1));
        assert_eq!(array.find_by_line(9), None);
    }

    #[test]
    fn heading_text_wraps_anchor_for_all_languages() {
        let array = array_of(&[("# One", 1)]);
        assert_eq!(
            array.heading_text(0, None),
            "One.all((<A id=\"a1\"></A>.))"
        );
    }

    #[test]
    fn toc_line_for_current_file() {
        let array = array_of(&[("# One", 1), ("## Two", 2)]);
        assert_eq!(
            array.toc_line(1, None, "doc.mlmd").as_deref(),
            Some(".all((  - .)).all(([.))Two.all((](<#a2>).))")
        );
        assert_eq!(
            array.toc_line(0, None, "doc.mlmd").as_deref(),
            Some("- .all(([.))One.all((](<#a1>).))")
        );
    }

    #[test]
    fn toc_line_for_other_file_uses_extension_variable() {
        let array = array_of(&[("# One", 1)]);
        let line = array.toc_line(0, None, "other.mlmd");
        assert_eq!(
            line.as_deref(),
            Some("- .all(([.))One.all((](<doc{extension}#a1>).))")
        );
    }
}
