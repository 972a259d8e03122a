//! Output modes
//!
//! An output mode defines the style used for heading anchors, TOC
//! indentation, TOC links and picture embedding. Each base mode has a
//! numbered variant selected when a numbering scheme is active (except
//! `mdpure`, where Markdown viewers number ordered lists themselves).

/// Rendering style of generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Md,
    MdNum,
    MdPure,
    Html,
    HtmlNum,
    HtmlOld,
    HtmlOldNum,
}

impl OutputMode {
    /// Resolves a mode name (`md`, `mdpure`, `html`, `htmlold`) to a
    /// mode, picking the numbered variant when `numbered` is set.
    pub fn from_name(name: &str, numbered: bool) -> Option<Self> {
        match (name.to_lowercase().as_str(), numbered) {
            ("md", false) => Some(OutputMode::Md),
            ("md", true) => Some(OutputMode::MdNum),
            ("mdpure", _) => Some(OutputMode::MdPure),
            ("html", false) => Some(OutputMode::Html),
            ("html", true) => Some(OutputMode::HtmlNum),
            ("htmlold", false) => Some(OutputMode::HtmlOld),
            ("htmlold", true) => Some(OutputMode::HtmlOldNum),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputMode::Md | OutputMode::MdNum => "md",
            OutputMode::MdPure => "mdpure",
            OutputMode::Html | OutputMode::HtmlNum => "html",
            OutputMode::HtmlOld | OutputMode::HtmlOldNum => "htmlold",
        }
    }

    /// Markdown flavors embed pictures with `![](path)`, HTML flavors
    /// with an `<img>` element.
    pub fn is_markdown(self) -> bool {
        matches!(self, OutputMode::Md | OutputMode::MdNum | OutputMode::MdPure)
    }

    /// Anchor for a target name. Numeric names are heading identifiers
    /// and get an `a` prefix.
    pub fn anchor(self, name: &str) -> String {
        let name = if name.chars().all(|c| c.is_ascii_digit()) {
            format!("a{name}")
        } else {
            name.to_string()
        };
        match self {
            OutputMode::MdPure => format!("{{#{name}}}"),
            OutputMode::HtmlOld | OutputMode::HtmlOldNum => {
                format!("<A name=\"{name}\"></A>")
            }
            _ => format!("<A id=\"{name}\"></A>"),
        }
    }

    /// Indentation prefix used before a TOC line for a heading level.
    pub fn toc_spacing(self, level: usize) -> String {
        let depth = level.saturating_sub(1);
        match self {
            OutputMode::MdPure => " ".repeat(3 * depth),
            OutputMode::Md | OutputMode::MdNum => " ".repeat(2 * depth),
            _ => "&nbsp;".repeat(4 * depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_variants() {
        assert_eq!(OutputMode::from_name("md", true), Some(OutputMode::MdNum));
        assert_eq!(OutputMode::from_name("mdpure", true), Some(OutputMode::MdPure));
        assert_eq!(OutputMode::from_name("bogus", false), None);
    }

    #[test]
    fn anchors_by_mode() {
        assert_eq!(OutputMode::MdPure.anchor("12"), "{#a12}");
        assert_eq!(OutputMode::HtmlOld.anchor("12"), "<A name=\"a12\"></A>");
        assert_eq!(OutputMode::Md.anchor("toc"), "<A id=\"toc\"></A>");
    }

    #[test]
    fn toc_spacing_by_mode() {
        assert_eq!(OutputMode::Md.toc_spacing(3), "    ");
        assert_eq!(OutputMode::MdPure.toc_spacing(2), "   ");
        assert_eq!(OutputMode::Html.toc_spacing(2), "&nbsp;&nbsp;&nbsp;&nbsp;");
        assert_eq!(OutputMode::Md.toc_spacing(1), "");
    }
}
