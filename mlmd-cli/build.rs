use clap::{Arg, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the command from src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("mlmd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate per-language Markdown files from multilingual templates")
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
                .help("Default heading numbering scheme")
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
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "mlmd", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "mlmd", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "mlmd", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
