//! Whole-run orchestration: inputs, includes, output files
//!
//! The [`Generator`] owns the list of template files, resolves
//! `.include` directives, runs the preprocessing pass over every file,
//! then processes each file into one output file per declared language.
//! The main language writes `<name>.md`, the others `<name>.<code>.md`,
//! mirroring the input tree below the output directory.

use std::env;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind};
use std::path::{Component, Path, PathBuf};

use crate::error::{GenError, Result};
use crate::lexer::{starts_with_ci, Lexer};
use crate::output::OutputRouter;
use crate::output_mode::OutputMode;
use crate::pictures::PictureStore;
use crate::report::Report;
use crate::storage::CharacterStream;

/// Recognized template extensions, longest first.
const TEMPLATE_EXTENSIONS: [&str; 2] = [".base.md", ".mlmd"];

/// Strips the template extension, or `None` for non-template names.
fn template_basename(name: &str) -> Option<&str> {
    TEMPLATE_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    pub output_mode: OutputMode,
    /// Default numbering scheme for files without `.numbering`.
    pub numbering: Option<String>,
    /// Main template; its directory becomes the root directory and its
    /// outputs keep the plain `.md` name for the `{main}` variable.
    pub main_file: Option<PathBuf>,
    /// Where generated files land; defaults to the root directory.
    pub output_dir: Option<PathBuf>,
}

/// One output file written for one language.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub language: String,
    pub path: PathBuf,
}

/// Outputs generated from one input template.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    /// Input path relative to the root directory.
    pub input: String,
    /// Number of template lines read.
    pub lines: usize,
    pub outputs: Vec<GeneratedFile>,
}

/// Everything a run produced, outputs and diagnostics.
#[derive(Debug)]
pub struct RunSummary {
    pub files: Vec<ProcessedFile>,
    pub report: Report,
}

impl RunSummary {
    pub fn has_errors(&self) -> bool {
        self.report.error_count() > 0
    }

    /// Template lines read over the whole run.
    pub fn total_lines(&self) -> usize {
        self.files.iter().map(|f| f.lines).sum()
    }
}

pub struct Generator {
    options: GeneratorOptions,
    inputs: Vec<PathBuf>,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            options,
            inputs: Vec::new(),
        }
    }

    /// Registers a template file, or every template below a directory.
    pub fn add_input(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        if path.is_dir() {
            return self.add_directory(&path);
        }
        if !path.is_file() {
            return Err(GenError::io(path, ErrorKind::NotFound.into()));
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if template_basename(name).is_none() {
            return Err(GenError::InvalidExtension(path));
        }
        if !self.inputs.contains(&path) {
            self.inputs.push(path);
        }
        Ok(())
    }

    /// Walks a directory tree and registers every `.mlmd` / `.base.md`
    /// file found, in sorted order.
    fn add_directory(&mut self, dir: &Path) -> Result<()> {
        let mut entries: Vec<PathBuf> = Vec::new();
        let read = fs::read_dir(dir).map_err(|e| GenError::io(dir, e))?;
        for entry in read {
            let entry = entry.map_err(|e| GenError::io(dir, e))?;
            entries.push(entry.path());
        }
        entries.sort();
        for path in entries {
            if path.is_dir() {
                self.add_directory(&path)?;
            } else {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if template_basename(name).is_some() {
                    self.add_input(path)?;
                }
            }
        }
        Ok(())
    }

    /// Runs the two passes over every input and writes the per-language
    /// files. Without any registered input the working directory is
    /// explored for templates. IO failures abort; template problems
    /// only land in the summary report.
    pub fn run(&mut self) -> Result<RunSummary> {
        if let Some(main) = self.options.main_file.clone() {
            self.add_input(main)?;
        }
        if self.inputs.is_empty() {
            // no inputs at all: explore the working directory
            let cwd = env::current_dir().map_err(|e| GenError::io(".", e))?;
            self.add_directory(&cwd)?;
        }
        if self.inputs.is_empty() {
            return Err(GenError::NoInput);
        }
        if self.options.main_file.is_none() {
            self.options.main_file = self.find_readme();
        }
        let mut report = Report::new();
        self.order_inputs();
        self.resolve_includes(&mut report)?;
        let root = self.root_dir();
        let out_root = self.options.output_dir.clone().unwrap_or_else(|| root.clone());

        let mut lexer = Lexer::new(self.options.output_mode);
        if let Some(scheme) = self.options.numbering.clone() {
            lexer.set_default_numbering(&scheme, &mut report);
        }
        let mut relatives = Vec::with_capacity(self.inputs.len());
        for path in &self.inputs {
            let rel = relative_name(path, &root);
            let mut stream = open_stream(path)?;
            lexer.preprocess_file(&rel, &mut stream, &mut report);
            relatives.push(rel);
        }
        lexer.finish_preprocess();
        if !lexer.language_set() {
            report.error(
                "no .languages directive found in input files",
                None,
                None,
            );
            return Ok(RunSummary {
                files: Vec::new(),
                report,
            });
        }

        let mut pictures = PictureStore::new();
        pictures.set_source_root(&root);
        pictures.set_destination_root(&out_root);
        if let Some(dir) = lexer.pictures_dir() {
            pictures.set_pictures_dir(dir);
        }
        let main_basename = self
            .options
            .main_file
            .as_ref()
            .map(|main| relative_name(main, &root))
            .as_deref()
            .and_then(template_basename)
            .map(str::to_owned);

        let languages = lexer.languages().clone();
        let mut files = Vec::with_capacity(self.inputs.len());
        for (path, rel) in self.inputs.clone().iter().zip(&relatives) {
            let Some(basename) = template_basename(rel) else {
                continue;
            };
            let mut outputs = Vec::with_capacity(languages.len());
            let mut sinks = Vec::with_capacity(languages.len());
            for entry in languages.iter() {
                let name = if languages.is_main(&entry.code) {
                    format!("{basename}.md")
                } else {
                    format!("{basename}.{}.md", entry.code)
                };
                let target = out_root.join(&name);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| GenError::io(parent, e))?;
                }
                let file = File::create(&target).map_err(|e| GenError::io(&target, e))?;
                sinks.push(BufWriter::new(file));
                outputs.push(GeneratedFile {
                    language: entry.code.clone(),
                    path: target,
                });
            }
            let mut router = OutputRouter::new(
                languages.clone(),
                self.options.output_mode,
                sinks,
                basename,
                main_basename.as_deref(),
                Some(&pictures),
            );
            let mut stream = open_stream(path)?;
            let lines = lexer.process_file(rel, &mut stream, &mut router, &mut report);
            report.merge(router.take_report());
            files.push(ProcessedFile {
                input: rel.clone(),
                lines,
                outputs,
            });
        }
        Ok(RunSummary { files, report })
    }

    /// Without an explicit main file, a registered template named
    /// README (any case) becomes the main one.
    fn find_readme(&self) -> Option<PathBuf> {
        self.inputs
            .iter()
            .find(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(template_basename)
                    .is_some_and(|base| base.eq_ignore_ascii_case("readme"))
            })
            .cloned()
    }

    /// The main file is processed first so its declarations govern the
    /// whole run.
    fn order_inputs(&mut self) {
        if let Some(main) = &self.options.main_file {
            if let Some(pos) = self.inputs.iter().position(|p| p == main) {
                let main = self.inputs.remove(pos);
                self.inputs.insert(0, main);
            }
        }
    }

    /// Expands `.include` directives into additional inputs, depth
    /// first, each file registered once. Missing files are reported but
    /// do not abort the run.
    fn resolve_includes(&mut self, report: &mut Report) -> Result<()> {
        let mut index = 0;
        while index < self.inputs.len() {
            let path = self.inputs[index].clone();
            for included in scan_includes(&path)? {
                if !included.is_file() {
                    report.error(
                        format!("included file not found '{}'", included.display()),
                        path.to_str(),
                        None,
                    );
                    continue;
                }
                if !self.inputs.contains(&included) {
                    self.inputs.push(included);
                }
            }
            index += 1;
        }
        Ok(())
    }

    /// Root directory every relative name is computed against: the main
    /// file's directory, or the deepest common directory of the inputs.
    fn root_dir(&self) -> PathBuf {
        if let Some(main) = &self.options.main_file {
            if let Some(parent) = main.parent() {
                return parent.to_path_buf();
            }
        }
        let mut root: Option<PathBuf> = None;
        for path in &self.inputs {
            let dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
            root = Some(match root {
                None => dir,
                Some(current) => common_prefix(&current, &dir),
            });
        }
        root.unwrap_or_default()
    }
}

fn open_stream(path: &Path) -> Result<CharacterStream> {
    let file = File::open(path).map_err(|e| GenError::io(path, e))?;
    Ok(CharacterStream::from_reader(Box::new(BufReader::new(file))))
}

/// Path of `path` relative to `root`, with forward slashes.
fn relative_name(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn common_prefix(a: &Path, b: &Path) -> PathBuf {
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.as_os_str())
        .collect()
}

/// Collects the targets of `.include` directives of one file, skipping
/// fenced code and stopping at `.end`. Paths are relative to the
/// including file's directory.
fn scan_includes(path: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(path).map_err(|e| GenError::io(path, e))?;
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let mut in_fence = false;
    let mut found = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| GenError::io(path, e))?;
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if starts_with_ci(trimmed, ".end") {
            break;
        }
        if starts_with_ci(trimmed, ".include") {
            let name = trimmed[".include".len()..].trim();
            if !name.is_empty() {
                found.push(parent.join(name));
            }
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_extensions_are_recognized() {
        assert_eq!(template_basename("doc.mlmd"), Some("doc"));
        assert_eq!(template_basename("doc.base.md"), Some("doc"));
        assert_eq!(template_basename("doc.md"), None);
        assert_eq!(template_basename("doc.txt"), None);
    }

    #[test]
    fn non_template_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "text").unwrap();
        let mut generator = Generator::new(GeneratorOptions::default());
        assert!(matches!(
            generator.add_input(&path),
            Err(GenError::InvalidExtension(_))
        ));
    }

    #[test]
    fn includes_are_discovered_outside_fences() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.mlmd");
        fs::write(
            &main,
            ".languages en\n```\n.include fenced.mlmd\n```\n.include part.mlmd\n",
        )
        .unwrap();
        let found = scan_includes(&main).unwrap();
        assert_eq!(found, vec![dir.path().join("part.mlmd")]);
    }

    #[test]
    fn run_writes_one_file_per_language() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("doc.mlmd");
        fs::write(&main, ".languages en,fr main=en\nHello\n.fr((Bonjour.))\n").unwrap();
        let mut generator = Generator::new(GeneratorOptions {
            main_file: Some(main),
            ..GeneratorOptions::default()
        });
        let summary = generator.run().unwrap();
        assert!(!summary.has_errors());
        assert_eq!(summary.files.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("doc.md")).unwrap(),
            "Hello\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("doc.fr.md")).unwrap(),
            "Bonjour\n"
        );
    }

    #[test]
    fn readme_template_defaults_as_main() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("README.mlmd"),
            ".languages en main=en\nRoot is {main}\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.mlmd"), "See {main}\n").unwrap();
        let mut generator = Generator::new(GeneratorOptions::default());
        generator.add_input(dir.path()).unwrap();
        let summary = generator.run().unwrap();
        assert!(!summary.has_errors());
        assert_eq!(
            fs::read_to_string(dir.path().join("README.md")).unwrap(),
            "Root is README.md\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.md")).unwrap(),
            "See README.md\n"
        );
    }

    #[test]
    fn summary_counts_processed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("doc.mlmd");
        fs::write(&main, ".languages en,fr main=en\nHello\n.fr((Bonjour.))\n").unwrap();
        let mut generator = Generator::new(GeneratorOptions {
            main_file: Some(main),
            ..GeneratorOptions::default()
        });
        let summary = generator.run().unwrap();
        assert_eq!(summary.files[0].lines, 3);
        assert_eq!(summary.total_lines(), 3);
    }

    #[test]
    fn missing_languages_directive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("doc.mlmd");
        fs::write(&main, "just text\n").unwrap();
        let mut generator = Generator::new(GeneratorOptions::default());
        generator.add_input(&main).unwrap();
        let summary = generator.run().unwrap();
        assert!(summary.has_errors());
        assert!(summary.files.is_empty());
    }

    #[test]
    fn included_files_produce_their_own_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("main.mlmd"),
            ".languages en\n.include part.mlmd\nMain text\n",
        )
        .unwrap();
        fs::write(dir.path().join("part.mlmd"), "Part text\n").unwrap();
        let mut generator = Generator::new(GeneratorOptions {
            main_file: Some(dir.path().join("main.mlmd")),
            ..GeneratorOptions::default()
        });
        let summary = generator.run().unwrap();
        assert!(!summary.has_errors());
        assert_eq!(summary.files.len(), 2);
        assert!(dir.path().join("main.en.md").exists());
        assert!(dir.path().join("part.en.md").exists());
    }
}
