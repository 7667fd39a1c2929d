//! CLI integration tests.
//!
//! These tests invoke the `brick-migrate` binary via `std::process::Command`
//! against a local ontology fixture and a temporary directory of building
//! graphs, so nothing is downloaded.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Path to the built binary (set by cargo test).
fn binary_path() -> PathBuf {
    // `cargo test` places the test binary next to the main binary
    let mut path = std::env::current_exe()
        .expect("current_exe")
        .parent()
        .expect("parent")
        .parent()
        .expect("grandparent")
        .to_path_buf();
    path.push("brick-migrate");
    path
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A scratch layout: `graphs/` with inputs, `out/`, and an imports zip.
struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        fs::create_dir(root.path().join("graphs")).expect("graphs dir");

        let zip_file = File::create(root.path().join("imports.zip")).expect("zip file");
        let mut zip = zip::ZipWriter::new(zip_file);
        zip.start_file("units.ttl", SimpleFileOptions::default())
            .expect("zip entry");
        zip.write_all(&fs::read(fixture_path("units.ttl")).expect("units fixture"))
            .expect("zip write");
        zip.start_file("README.txt", SimpleFileOptions::default())
            .expect("zip entry");
        zip.write_all(b"not a graph").expect("zip write");
        zip.finish().expect("zip finish");

        Self { root }
    }

    fn input(&self) -> PathBuf {
        self.root.path().join("graphs")
    }

    fn output(&self) -> PathBuf {
        self.root.path().join("out")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn add_building(&self, name: &str, body: &str) {
        let text = format!(
            "@prefix brick: <https://brickschema.org/schema/Brick#> .\n\
             @prefix unit: <http://qudt.org/vocab/unit/> .\n\
             @prefix {name}: <http://buildsys.org/ontologies/{name}#> .\n{body}"
        );
        fs::write(self.input().join(format!("{name}.ttl")), text).expect("write building");
    }

    /// Run the binary with the local ontology plus `extra` arguments.
    fn run(&self, extra: &[&str]) -> Output {
        let brick = fixture_path("mini_brick.ttl");
        let imports = self.path("imports.zip");
        let input = self.input();
        let output = self.output();
        let mut args: Vec<&str> = vec![
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--brick-file",
            brick.to_str().unwrap(),
            "--imports-file",
            imports.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        Command::new(binary_path())
            .args(&args)
            .output()
            .expect("failed to execute binary")
    }
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "brick-migrate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("summary file");
    serde_json::from_str(&text).expect("summary is JSON")
}

#[test]
fn migrates_directory_to_turtle() {
    let ws = Workspace::new();
    ws.add_building(
        "bldg1",
        "bldg1:HD1 a brick:Heating_Demand ; brick:value 4 .\nbldg1:R1 brick:hasUnits unit:FT_2 .\n",
    );

    let output = ws.run(&["-q"]);
    assert_success(&output);

    let text = fs::read_to_string(ws.output().join("bldg1.ttl")).expect("output graph");
    assert!(text.contains("@prefix bldg1: <http://buildsys.org/ontologies/bldg1#> ."));
    assert!(text.contains("brick:Heating_Demand_Sensor"));
    assert!(text.contains("bldg1:R1 brick:hasUnit unit:FT2 ."), "{text}");
    // Ontology triples, including the imported units, are not written back.
    assert!(!text.contains("square foot"));
    assert!(!text.contains("PointValueShape"));

    let stdout = String::from_utf8(output.stdout).expect("invalid UTF-8");
    assert!(stdout.lines().any(|l| l == "bldg1"));
}

#[test]
fn ntriples_format_writes_nt_files() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");

    let output = ws.run(&["--format", "ntriples", "-q"]);
    assert_success(&output);

    let text = fs::read_to_string(ws.output().join("bldg1.nt")).expect("output graph");
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        assert!(line.starts_with('<'), "not an N-Triples line: {line}");
        assert!(line.ends_with(" ."), "not an N-Triples line: {line}");
    }
}

#[test]
fn summary_json_lists_every_file() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor ; brick:value \"12\" .\n");
    fs::write(ws.input().join("bldg2.ttl"), "not turtle at all {").expect("write");
    ws.add_building("bldg3", "bldg3:T1 a brick:Temperature_Sensor .\n");
    let summary = ws.path("summary.json");

    let output = ws.run(&["--summary-json", summary.to_str().unwrap(), "-q"]);
    assert_success(&output);

    let json = read_json(&summary);
    let outcomes = json["outcomes"].as_array().expect("outcomes");
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["status"], "migrated");
    assert_eq!(outcomes[0]["repaired"], true);
    assert_eq!(outcomes[1]["status"], "failed");
    assert_eq!(outcomes[2]["status"], "migrated");
    assert!(ws.output().join("bldg1.ttl").exists());
    assert!(ws.output().join("bldg3.ttl").exists());
}

#[test]
fn print_validation_shows_validity_line() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor ; brick:value \"12\" .\n");

    let output = ws.run(&["--print-validation", "-q"]);
    assert_success(&output);

    let stdout = String::from_utf8(output.stdout).expect("invalid UTF-8");
    assert!(stdout.contains("is valid? false"));
    assert!(stdout.contains("is valid? true"));
    assert!(stdout.contains(&"-".repeat(79)));
}

#[test]
fn unrepairable_graph_is_reported() {
    let ws = Workspace::new();
    ws.add_building(
        "bldg1",
        "bldg1:T1 a brick:Temperature_Sensor ; brick:value \"1\" .\nbldg1:T2 a brick:Temperature_Sensor ; brick:value \"2\" .\n",
    );
    let reports = ws.path("reports");

    let output = ws.run(&["--report-dir", reports.to_str().unwrap()]);
    assert_success(&output);

    let stdout = String::from_utf8(output.stdout).expect("invalid UTF-8");
    assert!(stdout.contains("not a valid graph"));
    let stderr = String::from_utf8(output.stderr).expect("invalid UTF-8");
    assert!(stderr.contains("0 ok, 1 failed"), "{stderr}");
    assert!(reports.join("bldg1_report.ttl").exists());
    assert!(!ws.output().join("bldg1.ttl").exists());
}

#[test]
fn validate_only_writes_only_conforming_graphs() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor ; brick:value 3 .\n");
    ws.add_building("bldg2", "bldg2:T1 a brick:Temperature_Sensor ; brick:value \"3\" .\n");

    let output = ws.run(&["--validate-only", "-q"]);
    assert_success(&output);

    let stdout = String::from_utf8(output.stdout).expect("invalid UTF-8");
    assert!(stdout.contains("bldg1.ttl is valid? true"));
    assert!(stdout.contains("bldg2.ttl is valid? false"));
    assert!(ws.output().join("bldg1.ttl").exists());
    assert!(!ws.output().join("bldg2.ttl").exists());
}

#[test]
fn failed_file_prints_not_a_valid_graph() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");
    fs::write(ws.input().join("bldg2.ttl"), "this is { not turtle").expect("write");
    ws.add_building("bldg3", "bldg3:T1 a brick:Temperature_Sensor .\n");

    let output = ws.run(&["-q"]);
    assert_success(&output);

    let stdout = String::from_utf8(output.stdout).expect("invalid UTF-8");
    assert!(stdout.contains("bldg2.ttl not a valid graph"), "{stdout}");
    assert!(!stdout.contains("bldg1.ttl not a valid graph"), "{stdout}");
    assert!(ws.output().join("bldg1.ttl").exists());
    assert!(ws.output().join("bldg3.ttl").exists());
}

#[test]
fn config_file_supplies_paths() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");
    let config = ws.path("migrate.toml");
    fs::write(
        &config,
        format!(
            "[paths]\ninput_dir = {:?}\noutput_dir = {:?}\n\n[ontology]\nbrick_file = {:?}\nimports_file = {:?}\n\n[report]\nformat = \"ntriples\"\n",
            ws.input(),
            ws.path("from-config"),
            fixture_path("mini_brick.ttl"),
            ws.path("imports.zip"),
        ),
    )
    .expect("write config");

    let output = Command::new(binary_path())
        .args(["--config", config.to_str().unwrap(), "-q"])
        .output()
        .expect("failed to execute binary");
    assert_success(&output);
    assert!(ws.path("from-config").join("bldg1.nt").exists());
}

#[test]
fn unknown_config_key_fails() {
    let ws = Workspace::new();
    let config = ws.path("bad.toml");
    fs::write(&config, "[paths]\ninput = \"graphs\"\n").expect("write config");

    let output = ws.run(&["--config", config.to_str().unwrap(), "-q"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("invalid UTF-8");
    assert!(stderr.contains("invalid config"), "{stderr}");
}

#[test]
fn missing_brick_file_fails() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");
    let missing = ws.path("nope.ttl");

    let output = Command::new(binary_path())
        .args([
            ws.input().to_str().unwrap(),
            "-o",
            ws.output().to_str().unwrap(),
            "--brick-file",
            missing.to_str().unwrap(),
            "--imports-file",
            ws.path("imports.zip").to_str().unwrap(),
            "-q",
        ])
        .output()
        .expect("failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("invalid UTF-8");
    assert!(stderr.contains("failed to load the Brick ontology"), "{stderr}");
    assert!(!ws.output().exists());
}

#[test]
fn unknown_format_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["--format", "rdfxml", "-q"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("invalid UTF-8");
    assert!(stderr.contains("unknown output format"), "{stderr}");
}

#[test]
fn quiet_suppresses_stderr() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");

    let output = ws.run(&["-q"]);
    assert_success(&output);

    let stderr = String::from_utf8(output.stderr).expect("invalid UTF-8");
    assert!(
        stderr.is_empty(),
        "Quiet mode should produce no stderr output, got: {stderr}"
    );
}

#[test]
fn verbose_prints_summary_to_stderr() {
    let ws = Workspace::new();
    ws.add_building("bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");

    let output = ws.run(&["--verbose"]);
    assert_success(&output);

    let stderr = String::from_utf8(output.stderr).expect("invalid UTF-8");
    assert!(stderr.contains("Processed 1 graph(s): 1 ok, 0 failed"));
    assert!(stderr.contains("wrote clean graph"));
}
