// Command-line interface for mlmd
//
// This binary turns annotated multilingual Markdown templates into one
// plain Markdown file per declared language.
//
// Usage:
//  mlmd <input>... [--main <file>] [--out-dir <dir>]     - Generate from files or directories
//  mlmd --main <file>                                    - Generate from a main template and its includes
//  mlmd                                                  - Generate from every template below the current directory
//
// Settings come from three layers: the embedded defaults, an optional
// mlmd.toml (or an explicit --config file), and command-line flags, the
// later layers winning. Diagnostics print as text on stderr by default;
// --diagnostics json writes them as a JSON array on stdout instead.

use clap::{Arg, Command, ValueHint};
use mlmd_config::{ConfigError, Loader, MlmdConfig};
use mlmd_gen::{Generator, GeneratorOptions, OutputMode, RunSummary};
use std::path::PathBuf;
use std::process::ExitCode;

fn build_cli() -> Command {
    Command::new("mlmd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate per-language Markdown files from multilingual templates")
        .long_about(
            "mlmd processes Markdown templates annotated with language directives\n\
            (.languages, .<code>((...)), .all((...)), .toc, .numbering, ...) and\n\
            writes one plain Markdown file per declared language.\n\n\
            Templates carry a .mlmd or .base.md extension. The main language\n\
            writes <name>.md, every other language <name>.<code>.md.\n\n\
            Without arguments, every template below the current directory is\n\
            processed; a README.mlmd template becomes the main file.\n\n\
            Examples:\n  \
            mlmd --main docs/README.mlmd            # Main template plus its .include files\n  \
            mlmd docs/                              # Every template below docs/\n  \
            mlmd doc.mlmd --numbering '1::1:.'      # Number level-1 headings\n  \
            mlmd doc.mlmd --mode html               # HTML anchors and TOC markup",
        )
        .arg(
            Arg::new("input")
                .help("Template files or directories to process (current directory when omitted)")
                .num_args(0..)
                .value_hint(ValueHint::AnyPath),
        )
        .arg(
            Arg::new("main")
                .long("main")
                .short('m')
                .value_name("FILE")
                .help("Main template; its directory becomes the root directory")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("out-dir")
                .long("out-dir")
                .short('o')
                .value_name("DIR")
                .help("Directory for generated files (defaults to the root directory)")
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("MODE")
                .help("Output mode for anchors and TOC markup")
                .value_parser(clap::builder::PossibleValuesParser::new([
                    "md", "mdpure", "html", "htmlold",
                ])),
        )
        .arg(
            Arg::new("numbering")
                .long("numbering")
                .short('n')
                .value_name("SCHEME")
                .help("Default heading numbering scheme, e.g. '1:Chapter :1:.,2::1:.'")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an mlmd.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("diagnostics")
                .long("diagnostics")
                .value_name("FORMAT")
                .help("How to print warnings and errors")
                .value_parser(clap::builder::PossibleValuesParser::new(["text", "json"]))
                .default_value("text"),
        )
}

/// Layers an mlmd.toml from the working directory, then an explicit
/// --config file, over the embedded defaults.
fn load_cli_config(path: Option<&str>) -> Result<MlmdConfig, ConfigError> {
    let loader = Loader::new().with_optional_file("mlmd.toml");
    let loader = match path {
        Some(path) => loader.with_file(path),
        None => loader,
    };
    loader.build()
}

fn report_summary(summary: &RunSummary, format: &str) {
    if format == "json" {
        if let Ok(text) = serde_json::to_string_pretty(summary.report.diagnostics()) {
            println!("{text}");
        }
        return;
    }
    for diagnostic in summary.report.diagnostics() {
        eprintln!("{diagnostic}");
    }
    for file in &summary.files {
        println!("{}: {} lines", file.input, file.lines);
        for output in &file.outputs {
            println!("  -> {}", output.path.display());
        }
    }
    println!(
        "{} lines processed in {} files",
        summary.total_lines(),
        summary.files.len()
    );
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    let config = match load_cli_config(matches.get_one::<String>("config").map(String::as_str)) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::from(2);
        }
    };

    // command-line flags win over mlmd.toml, which wins over defaults
    let numbering = matches.get_one::<String>("numbering").cloned().or_else(|| {
        let scheme = &config.generate.numbering;
        (!scheme.is_empty()).then(|| scheme.clone())
    });
    let mode_name = matches
        .get_one::<String>("mode")
        .unwrap_or(&config.generate.output_mode);
    let Some(output_mode) = OutputMode::from_name(mode_name, numbering.is_some()) else {
        eprintln!("unknown output mode '{mode_name}'");
        return ExitCode::from(2);
    };

    let options = GeneratorOptions {
        output_mode,
        numbering,
        main_file: matches.get_one::<String>("main").map(PathBuf::from),
        output_dir: matches.get_one::<String>("out-dir").map(PathBuf::from),
    };
    let mut generator = Generator::new(options);
    if let Some(inputs) = matches.get_many::<String>("input") {
        for input in inputs {
            if let Err(error) = generator.add_input(input) {
                eprintln!("{error}");
                return ExitCode::from(2);
            }
        }
    }

    let summary = match generator.run() {
        Ok(summary) => summary,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::from(2);
        }
    };
    let format = matches
        .get_one::<String>("diagnostics")
        .map(String::as_str)
        .unwrap_or("text");
    report_summary(&summary, format);
    if summary.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
