use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

const BUTTON: &str = include_str!("../test_fixtures/Button.jsx");
const BROKEN: &str = include_str!("../test_fixtures/Broken.jsx");
const CARD: &str = include_str!("../test_fixtures/Card.tsx");

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_generate-docs"))
}

fn run(args: &[&str]) -> Output {
    bin().args(args).output().expect("run generate-docs")
}

fn components(temp_dir: &TempDir, files: &[(&str, &str)]) -> String {
    let dir = temp_dir.path().join("components");
    std::fs::create_dir_all(&dir).expect("mkdir components");
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir parent");
        }
        std::fs::write(path, content).expect("write component");
    }
    dir.to_string_lossy().to_string()
}

fn read_json(path: &Path) -> Vec<Value> {
    let text = std::fs::read_to_string(path).expect("read output");
    serde_json::from_str(&text).expect("parse output")
}

/// Golden test: one good component and one with a syntax error
#[test]
fn e2e_button_and_broken() {
    let temp_dir = TempDir::new().expect("temp dir");
    let input = components(&temp_dir, &[("Button.jsx", BUTTON), ("Broken.jsx", BROKEN)]);
    let output = temp_dir.path().join("docs.json");

    let result = run(&[&input, output.to_string_lossy().as_ref()]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(
        stdout.contains(&format!("Documentation generated at {}", output.display())),
        "Got:\n{}",
        stdout
    );

    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Broken.jsx"), "Got:\n{}", stderr);

    let records = read_json(&output);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], json!({"file": "Broken.jsx"}));
    assert_eq!(records[1]["file"], json!("Button.jsx"));
    assert_eq!(records[1]["displayName"], json!("Button"));
    assert_eq!(
        records[1]["properties"]["label"]["type"],
        json!({"name": "string"})
    );
}

#[test]
fn e2e_missing_directory_fails_without_output() {
    let temp_dir = TempDir::new().expect("temp dir");
    let input = temp_dir.path().join("nope");
    let output = temp_dir.path().join("docs.json");

    let result = run(&[
        input.to_string_lossy().as_ref(),
        output.to_string_lossy().as_ref(),
    ]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Error:"));
    assert!(!output.exists());
}

#[test]
fn e2e_empty_directory_fails_without_output() {
    let temp_dir = TempDir::new().expect("temp dir");
    let input = components(&temp_dir, &[("notes.txt", "not a component")]);
    let output = temp_dir.path().join("docs.json");

    let result = run(&[&input, output.to_string_lossy().as_ref()]);
    assert_eq!(result.status.code(), Some(1));
    assert!(!output.exists());

    let result = run(&["--allow-empty", &input, output.to_string_lossy().as_ref()]);
    assert!(result.status.success());
    assert_eq!(std::fs::read_to_string(&output).expect("read"), "[]");
}

#[test]
fn e2e_wrong_argument_count_is_usage_error() {
    let result = run(&["only-one"]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Usage"));
}

#[test]
fn e2e_output_is_deterministic() {
    let temp_dir = TempDir::new().expect("temp dir");
    let input = components(
        &temp_dir,
        &[("Zed.jsx", BUTTON), ("Button.jsx", BUTTON), ("Broken.jsx", BROKEN)],
    );
    let first = temp_dir.path().join("first.json");
    let second = temp_dir.path().join("second.json");

    assert!(run(&[&input, first.to_string_lossy().as_ref()]).status.success());
    assert!(run(&[&input, second.to_string_lossy().as_ref()]).status.success());

    let a = std::fs::read(&first).expect("read first");
    let b = std::fs::read(&second).expect("read second");
    assert_eq!(a, b);

    let files: Vec<_> = read_json(&first)
        .iter()
        .map(|r| r["file"].as_str().expect("file").to_string())
        .collect();
    assert_eq!(files, vec!["Broken.jsx", "Button.jsx", "Zed.jsx"]);
}

#[test]
fn e2e_annotations_and_config() {
    let temp_dir = TempDir::new().expect("temp dir");
    let input = components(
        &temp_dir,
        &[
            ("Button.jsx", BUTTON),
            ("Button.test.jsx", BUTTON),
            ("cards/Card.tsx", CARD),
            (
                "compdoc.toml",
                "extensions = [\"jsx\", \"tsx\"]\nexclude = [\"*.test.jsx\"]\nrecursive = true\nannotations = \"annotations.toml\"\n",
            ),
            (
                "annotations.toml",
                "[[component]]\nmodule = \"cards/Card.tsx\"\nname = \"Card\"\n[component.meta]\ndescription = \"Annotated card\"\n",
            ),
        ],
    );
    let output = temp_dir.path().join("docs.json");

    let result = run(&["-q", &input, output.to_string_lossy().as_ref()]);
    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));

    let records = read_json(&output);
    let files: Vec<_> = records.iter().map(|r| r["file"].clone()).collect();
    assert_eq!(files, vec![json!("Button.jsx"), json!("cards/Card.tsx")]);

    assert_eq!(records[1]["description"], json!("Annotated card"));
    assert_eq!(records[1]["name"], json!("Card"));
    assert_eq!(records[1]["properties"]["title"]["required"], json!(true));
}

#[test]
fn e2e_invalid_manifest_aborts() {
    let temp_dir = TempDir::new().expect("temp dir");
    let input = components(&temp_dir, &[("Button.jsx", BUTTON)]);
    let manifest = temp_dir.path().join("annotations.json");
    std::fs::write(&manifest, "{ broken").expect("write manifest");
    let output = temp_dir.path().join("docs.json");

    let result = run(&[
        "--annotations",
        manifest.to_string_lossy().as_ref(),
        &input,
        output.to_string_lossy().as_ref(),
    ]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("annotation manifest"));
    assert!(!output.exists());
}
