//! Flush-time variable expansion
//!
//! Variables are expanded when buffered parts are written to the
//! output files, once per language, and never inside escaped text:
//!
//! - `{file}` — output file name for the language
//! - `{filename}` — output file name without extension
//! - `{extension}` — `.md` for the main language, `.<code>.md` otherwise
//! - `{main}` — main output file name for the language
//! - `{language}` — language code
//! - `{iso}` — ISO code declared for the language
//! - `{picture:<name>}` — resolved picture reference; also copies the
//!   picture file next to the generated output

use crate::language::LanguageList;
use crate::output_mode::OutputMode;
use crate::pictures::PictureStore;
use crate::report::Report;

/// Everything expansion needs about the file being flushed.
pub struct ExpandContext<'a> {
    /// Relative source file name without its template extension.
    pub basename: &'a str,
    /// Main file name without extension, when a main file is set.
    pub main_basename: Option<&'a str>,
    pub languages: &'a LanguageList,
    pub mode: OutputMode,
    pub pictures: Option<&'a PictureStore>,
}

/// Expands all variables of `text` for one output language.
pub fn expand(text: &str, language: &str, ctx: &ExpandContext, report: &mut Report) -> String {
    let extension = if ctx.languages.is_main(language) {
        ".md".to_string()
    } else {
        format!(".{language}.md")
    };
    let mut result = text.replace("{file}", &format!("{}{extension}", ctx.basename));
    result = result.replace("{filename}", ctx.basename);
    result = result.replace("{extension}", &extension);
    if let Some(main) = ctx.main_basename {
        result = result.replace("{main}", &format!("{main}{extension}"));
    }
    result = result.replace("{language}", language);
    match ctx.languages.get(language).and_then(|e| e.iso.as_deref()) {
        Some(iso) => result = result.replace("{iso}", iso),
        None => {
            if result.contains("{iso}") {
                report.warning(
                    format!("ISO code variable found and no associated iso for {language}"),
                    None,
                    None,
                );
            }
        }
    }
    expand_pictures(result, language, ctx, report)
}

fn expand_pictures(
    text: String,
    language: &str,
    ctx: &ExpandContext,
    report: &mut Report,
) -> String {
    const KEY: &str = "{picture:";
    if !text.contains(KEY) {
        return text;
    }
    let mut result = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(start) = rest.find(KEY) {
        result.push_str(&rest[..start]);
        let after_key = &rest[start + KEY.len()..];
        let Some(end) = after_key.find('}') else {
            report.error(
                format!(
                    "Picture variable {{picture:}} lacks ending '}}' after {after_key}"
                ),
                None,
                None,
            );
            result.push_str(&rest[start..]);
            return result;
        };
        let name = &after_key[..end];
        match ctx.pictures.and_then(|p| p.find_relative_path(name, language)) {
            Some(path) => {
                // link relative to the directory of the generated file
                let file_dir = std::path::Path::new(ctx.basename)
                    .parent()
                    .unwrap_or_else(|| std::path::Path::new(""));
                let link = pathdiff::diff_paths(std::path::Path::new(&path), file_dir)
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or(path);
                if ctx.mode.is_markdown() {
                    result.push_str(&format!("![]({link})"));
                } else {
                    result.push_str(&format!("<img src=\"{link}\">"));
                }
                if let Some(pictures) = ctx.pictures {
                    pictures.copy(name, language, report);
                }
            }
            None => {
                // leave the unresolved reference in place
                result.push_str(&rest[start..start + KEY.len() + end + 1]);
            }
        }
        rest = &after_key[end + 1..];
    }
    result.push_str(rest);
    result
}
