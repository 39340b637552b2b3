//! Integration tests that build and run generated render functions.
//!
//! These tests generate Rust code from templates into a scratch Cargo project
//! and run it with `cargo run` to check both that the generated code compiles
//! and what it renders.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use jadec_codegen::{Driver, RunOptions};
use tempfile::TempDir;

const COLORS: &str = "\
:args colors: &[&str]
h1 Hello
ul
  each c in colors
    li= c
";

const MENU: &str = "\
:args colors: &[&str], loud: bool
mixin item(c)
  li= c
ul
  each c in colors
    +item(c)
if loud
  p Loud
else
  p Quiet
";

/// Write `templates` into a scratch project, generate the first one into
/// `src/views`, run it, and return what `main_body` printed.
fn render(options: RunOptions, templates: &[(&str, &str)], mods: &[&str], main_body: &str) -> String {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    let views = root.join("src/views");
    fs::create_dir_all(&views).unwrap();

    let sources = root.join("templates");
    fs::create_dir_all(&sources).unwrap();
    for (name, source) in templates {
        fs::write(sources.join(name), source).unwrap();
    }
    let inputs = vec![sources.join(templates[0].0)];

    let config = RunOptions {
        out_dir: Some(views.clone()),
        ..options
    }
    .resolve(&inputs)
    .expect("Failed to resolve options");
    if let Err(err) = Driver::new(&config).run(&inputs).into_result() {
        panic!("generation failed: {err}");
    }

    let runtime = Path::new(env!("CARGO_MANIFEST_DIR")).join("../jade-runtime");
    fs::write(
        root.join("Cargo.toml"),
        format!(
            "[package]\nname = \"rendered\"\nversion = \"0.1.0\"\nedition = \"2024\"\n\n\
             [dependencies]\njadec-runtime = {{ path = {:?} }}\n\n[workspace]\n",
            runtime.display().to_string()
        ),
    )
    .unwrap();

    let mod_rs: String = mods.iter().map(|m| format!("pub mod {m};\n")).collect();
    fs::write(views.join("mod.rs"), mod_rs).unwrap();
    fs::write(
        root.join("src/main.rs"),
        format!("mod views;\n\nfn main() -> std::io::Result<()> {{\n{main_body}\n}}\n"),
    )
    .unwrap();

    let output = Command::new("cargo")
        .args(["run", "--quiet"])
        .current_dir(root)
        .env("CARGO_TARGET_DIR", target_dir())
        .output()
        .expect("Failed to run cargo run");

    if !output.status.success() {
        eprintln!("\n=== Generated files ===");
        print_generated_files(&views);
        panic!(
            "Generated code failed to run!\n\nstdout:\n{}\n\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    String::from_utf8(output.stdout).expect("rendered output is not UTF-8")
}

/// Shared across tests so the runtime is only built once.
fn target_dir() -> PathBuf {
    Path::new(env!("CARGO_TARGET_TMPDIR")).join("render_compiles")
}

/// Print all generated files for debugging
fn print_generated_files(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();
    for path in paths {
        eprintln!("{}", path.display());
        if let Ok(content) = fs::read_to_string(&path) {
            for line in content.lines() {
                eprintln!("  | {}", line);
            }
        }
    }
}

#[test]
fn test_colors_with_support_file() {
    let options = RunOptions {
        pretty: false,
        ..RunOptions::default()
    };
    let stdout = render(
        options,
        &[("index.jade", COLORS)],
        &["index", "jade"],
        "    views::index::index(&[\"red\", \"blue\"], &mut std::io::stdout())",
    );

    assert_eq!(stdout, "<h1>Hello</h1><ul><li>red</li><li>blue</li></ul>");
}

#[test]
fn test_colors_in_library_mode_with_pooled_buffer() {
    let options = RunOptions {
        pretty: false,
        lib: true,
        std_buffer: false,
        writer: false,
        ..RunOptions::default()
    };
    let stdout = render(
        options,
        &[("index.jade", COLORS)],
        &["index"],
        "    let mut buffer = jadec_runtime::PooledBuffer::new();\n    \
         views::index::index(&[], &mut buffer)?;\n    \
         views::index::index(&[\"red\"], &mut buffer)?;\n    \
         print!(\"{}\", buffer.to_string_lossy());\n    \
         Ok(())",
    );

    assert_eq!(
        stdout,
        "<h1>Hello</h1><ul></ul><h1>Hello</h1><ul><li>red</li></ul>"
    );
}

#[test]
fn test_includes_and_integers_render() {
    let options = RunOptions {
        pretty: false,
        ..RunOptions::default()
    };
    let stdout = render(
        options,
        &[
            ("page.jade", ":args count: i64, title: &str\ninclude header\np= count\n"),
            ("header.jade", "h1= title\n"),
        ],
        &["jade", "page"],
        "    let mut out = std::io::stdout();\n    \
         views::page::page(3, \"<Fish & Chips>\", &mut out)",
    );

    assert_eq!(stdout, "<h1>&lt;Fish &amp; Chips&gt;</h1><p>3</p>");
}

#[test]
fn test_colors_pretty_printed() {
    let stdout = render(
        RunOptions::default(),
        &[("index.jade", COLORS)],
        &["index", "jade"],
        "    views::index::index(&[\"red\", \"blue\"], &mut std::io::stdout())",
    );

    assert_eq!(
        stdout,
        "<h1>Hello</h1>\n<ul>\n  <li>red</li>\n  <li>blue</li>\n</ul>\n"
    );
}

#[test]
fn test_hoisted_and_inline_render_same_bytes() {
    let main_body = "    let mut out = std::io::stdout();\n    \
         views::menu::menu(&[\"red\", \"blue\"], true, &mut out)?;\n    \
         views::menu::menu(&[], false, &mut out)";
    let run = |inline: bool| {
        let options = RunOptions {
            pretty: false,
            inline,
            ..RunOptions::default()
        };
        render(options, &[("menu.jade", MENU)], &["menu", "jade"], main_body)
    };

    let inline = run(true);
    assert_eq!(
        inline,
        "<ul><li>red</li><li>blue</li></ul><p>Loud</p><ul></ul><p>Quiet</p>"
    );
    assert_eq!(run(false), inline);
}
