//! End-to-end generation tests: whole templates through [`Generator`],
//! checking the exact bytes of the per-language output files.

use insta::assert_snapshot;
use mlmd_gen::{Generator, GeneratorOptions, RunSummary};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn generate(dir: &Path, main: &str, options: GeneratorOptions) -> RunSummary {
    let mut generator = Generator::new(GeneratorOptions {
        main_file: Some(dir.join(main)),
        ..options
    });
    generator.run().expect("generation to succeed")
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).expect("output file to exist")
}

#[test]
fn sections_and_headings_route_per_language() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("doc.mlmd"),
        ".languages en,fr main=en\n\
         # My Document\n\
         \n\
         Intro text.\n\
         .fr((Texte d'introduction..))\n\
         \n\
         .en((English only..))\n\
         .fr((Français seulement..))\n",
    )
    .unwrap();
    let summary = generate(dir.path(), "doc.mlmd", GeneratorOptions::default());
    assert!(!summary.has_errors());
    assert_snapshot!(read(dir.path(), "doc.md"), @r#"
    # My Document<A id="a1"></A>

    Intro text.

    English only.
    "#);
    assert_snapshot!(read(dir.path(), "doc.fr.md"), @r#"
    # My Document<A id="a1"></A>

    Texte d'introduction.

    Français seulement.
    "#);
}

#[test]
fn variables_expand_per_output_file() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("doc.mlmd"),
        ".languages en,fr main=en\nThis is {file}, from {main}.\n",
    )
    .unwrap();
    let summary = generate(dir.path(), "doc.mlmd", GeneratorOptions::default());
    assert!(!summary.has_errors());
    assert_eq!(
        read(dir.path(), "doc.md"),
        "This is doc.md, from doc.md.\n"
    );
    assert_eq!(
        read(dir.path(), "doc.fr.md"),
        "This is doc.fr.md, from doc.fr.md.\n"
    );
}

#[test]
fn numbering_directive_labels_headings() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("doc.mlmd"),
        ".languages en main=en\n.numbering 1::1:.,2::1:.\n# Doc\n\n## A\n\n## B\n",
    )
    .unwrap();
    let summary = generate(dir.path(), "doc.mlmd", GeneratorOptions::default());
    assert!(!summary.has_errors());
    assert_eq!(
        read(dir.path(), "doc.md"),
        "# 1) Doc<A id=\"a1\"></A>\n\n## 1.1) A<A id=\"a2\"></A>\n\n## 1.2) B<A id=\"a3\"></A>\n"
    );
}

#[test]
fn default_numbering_applies_without_directive() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("doc.mlmd"),
        ".languages en main=en\n# Doc\n\n## Sub\n",
    )
    .unwrap();
    let options = GeneratorOptions {
        numbering: Some("1::1:.,2::1:.".to_string()),
        ..GeneratorOptions::default()
    };
    let summary = generate(dir.path(), "doc.mlmd", options);
    assert!(!summary.has_errors());
    assert_eq!(
        read(dir.path(), "doc.md"),
        "# 1) Doc<A id=\"a1\"></A>\n\n## 1.1) Sub<A id=\"a2\"></A>\n"
    );
}

#[test]
fn global_toc_links_included_files() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("main.mlmd"),
        ".languages en main=en\n\
         # Guide\n\
         \n\
         .toc level=1-2 title=Contents\n\
         .include chap1.mlmd\n\
         .include chap2.mlmd\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("chap1.mlmd"),
        ".topnumber 2\n# Chapter One\n\n## Basics\n",
    )
    .unwrap();
    fs::write(dir.path().join("chap2.mlmd"), ".topnumber 3\n# Chapter Two\n").unwrap();
    let summary = generate(dir.path(), "main.mlmd", GeneratorOptions::default());
    assert!(!summary.has_errors());
    assert_eq!(
        read(dir.path(), "main.md"),
        "# Guide<A id=\"a1\"></A>\n\
         \n\
         ## Contents<A id=\"toc\"></A>\n\
         \n\
         - [Guide](<#a1>)\n\
         - [Chapter One](<chap1.md#a2>)\n\
         \x20 - [Basics](<chap1.md#a3>)\n\
         - [Chapter Two](<chap2.md#a4>)\n"
    );
    assert_eq!(
        read(dir.path(), "chap1.md"),
        "# Chapter One<A id=\"a2\"></A>\n\n## Basics<A id=\"a3\"></A>\n"
    );
    assert_eq!(
        read(dir.path(), "chap2.md"),
        "# Chapter Two<A id=\"a4\"></A>\n"
    );
}

#[test]
fn output_dir_mirrors_the_input_tree() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(src.join("sub")).unwrap();
    fs::write(
        src.join("main.mlmd"),
        ".languages en main=en\n.include sub/part.mlmd\nMain text\n",
    )
    .unwrap();
    fs::write(src.join("sub/part.mlmd"), "Part text\n").unwrap();
    let options = GeneratorOptions {
        output_dir: Some(out.clone()),
        ..GeneratorOptions::default()
    };
    let summary = generate(&src, "main.mlmd", options);
    assert!(!summary.has_errors());
    assert_eq!(read(&out, "main.md"), "Main text\n");
    assert_eq!(read(&out, "sub/part.md"), "Part text\n");
}
