use std::fs;
use std::path::{Path, PathBuf};

use brick_migrate::batch::{BatchDriver, BatchOptions, FileStatus};
use brick_migrate::emitter::OutputFormat;
use brick_migrate::model::ontology::brick;
use brick_migrate::model::{Graph, Literal, NamedNode, Term, Triple};
use brick_migrate::parser::{load_file, parse_turtle};
use brick_migrate::rules::RuleRegistry;
use oxigraph::model::vocab::xsd;

const PREFIXES: &str = "@prefix brick: <https://brickschema.org/schema/Brick#> .\n";

fn ontology() -> Graph {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("mini_brick.ttl");
    load_file(&path, "brick").unwrap().skolemize()
}

fn write_building(dir: &Path, name: &str, body: &str) {
    let ns = format!(
        "@prefix {name}: <http://buildsys.org/ontologies/{name}#> .\n"
    );
    fs::write(dir.join(format!("{name}.ttl")), format!("{PREFIXES}{ns}{body}")).unwrap();
}

fn options(input: &Path, output: &Path) -> BatchOptions {
    BatchOptions {
        input_dir: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        format: OutputFormat::Turtle,
        print_validation: false,
        report_dir: None,
    }
}

fn read_output(path: &Path) -> Graph {
    let text = fs::read_to_string(path).unwrap();
    parse_turtle(&text, "output").unwrap()
}

#[test]
fn bad_file_does_not_stop_the_batch() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_building(input.path(), "bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");
    fs::write(input.path().join("bldg2.ttl"), "this is { not turtle").unwrap();
    write_building(input.path(), "bldg3", "bldg3:T1 a brick:Temperature_Sensor .\n");

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    let summary = driver.run().unwrap();

    assert_eq!(summary.outcomes.len(), 3);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(output.path().join("bldg1.ttl").exists());
    assert!(!output.path().join("bldg2.ttl").exists());
    assert!(output.path().join("bldg3.ttl").exists());

    let failed = summary.outcome("bldg2").unwrap();
    match &failed.status {
        FileStatus::Failed { error, .. } => assert!(error.contains("bldg2.ttl"), "{error}"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn clean_output_has_no_ontology_triples() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_building(
        input.path(),
        "bldg1",
        "bldg1:HD1 a brick:Heating_Demand ; brick:value 5 .\n",
    );

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    let summary = driver.run().unwrap();
    assert_eq!(summary.succeeded(), 1);

    let out = output.path().join("bldg1.ttl");
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("@prefix bldg1: <http://buildsys.org/ontologies/bldg1#> ."));
    assert!(text.contains("brick:Heating_Demand_Sensor"), "{text}");

    let clean = read_output(&out);
    assert_eq!(clean.len(), 2);
    assert!(clean.iter().all(|t| !ontology.contains(t)));
}

#[test]
fn repaired_file_is_written_with_typed_value() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_building(
        input.path(),
        "bldg1",
        "bldg1:T1 a brick:Temperature_Sensor ; brick:value \"150\" .\n",
    );

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    let summary = driver.run().unwrap();

    match &summary.outcomes[0].status {
        FileStatus::Migrated { repaired, triples, .. } => {
            assert!(*repaired);
            assert_eq!(*triples, 2);
        }
        other => panic!("expected migration, got {other:?}"),
    }
    let clean = read_output(&output.path().join("bldg1.ttl"));
    assert!(clean.contains(&Triple::new(
        NamedNode::new_unchecked("http://buildsys.org/ontologies/bldg1#T1"),
        brick::VALUE,
        Literal::new_typed_literal("150", xsd::INTEGER),
    )));
}

#[test]
fn unrepairable_file_is_reported_with_violations() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let reports = tempfile::tempdir().unwrap();
    write_building(
        input.path(),
        "bldg1",
        "bldg1:T1 a brick:Temperature_Sensor ; brick:value \"1\" .\nbldg1:T2 a brick:Temperature_Sensor ; brick:value \"2\" .\n",
    );

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let mut opts = options(input.path(), output.path());
    opts.report_dir = Some(reports.path().to_path_buf());
    let driver = BatchDriver::new(&ontology, &registry, opts);
    let summary = driver.run().unwrap();

    assert_eq!(summary.failed(), 1);
    assert!(!output.path().join("bldg1.ttl").exists());
    match &summary.outcomes[0].status {
        FileStatus::Failed { violations, .. } => assert_eq!(violations.len(), 2),
        other => panic!("expected failure, got {other:?}"),
    }
    let report = read_output(&reports.path().join("bldg1_report.ttl"));
    assert!(!report.is_empty());
}

#[test]
fn building_rules_follow_file_name() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_building(input.path(), "bldg43", "bldg43:AHU1 a brick:Chiller .\n");

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    driver.run().unwrap();

    let clean = read_output(&output.path().join("bldg43.ttl"));
    assert!(clean.has_subject(&Term::from(NamedNode::new_unchecked(
        "http://buildsys.org/ontologies/bldg43#chiller"
    ))));
}

#[test]
fn ntriples_output_uses_nt_extension() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_building(input.path(), "bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let mut opts = options(input.path(), output.path());
    opts.format = OutputFormat::NTriples;
    BatchDriver::new(&ontology, &registry, opts).run().unwrap();

    let text = fs::read_to_string(output.path().join("bldg1.nt")).unwrap();
    assert!(text.contains(
        "<http://buildsys.org/ontologies/bldg1#T1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://brickschema.org/schema/Brick#Temperature_Sensor> ."
    ));
}

#[test]
fn subdirectories_are_skipped() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::create_dir(input.path().join("nested")).unwrap();
    write_building(input.path(), "bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    let summary = driver.run().unwrap();
    assert_eq!(summary.outcomes.len(), 1);
}

#[test]
fn missing_input_directory_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(
        &ontology,
        &registry,
        options(&root.path().join("absent"), &root.path().join("out")),
    );
    assert!(driver.run().is_err());
}

#[test]
fn validate_only_writes_conforming_graphs() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_building(input.path(), "bldg1", "bldg1:T1 a brick:Temperature_Sensor ; brick:value 1 .\n");
    write_building(input.path(), "bldg2", "bldg2:T1 a brick:Temperature_Sensor ; brick:value \"1\" .\n");

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    let summary = driver.validate_only().unwrap();

    let written = output.path().join("bldg1.ttl");
    assert_eq!(
        summary.outcome("bldg1").unwrap().status,
        FileStatus::Valid {
            triples: 2,
            output: written.clone(),
        }
    );
    match &summary.outcome("bldg2").unwrap().status {
        FileStatus::Invalid { violations } => assert_eq!(violations.len(), 1),
        other => panic!("expected invalid, got {other:?}"),
    }
    assert!(!output.path().join("bldg2.ttl").exists());

    // No rule ran and no repair was attempted.
    let text = fs::read_to_string(&written).unwrap();
    assert!(text.contains("@prefix bldg1: <http://buildsys.org/ontologies/bldg1#> ."));
    let graph = read_output(&written);
    assert_eq!(graph.len(), 2);
    assert!(graph.iter().all(|t| !ontology.contains(t)));
}

#[test]
fn validate_only_does_not_migrate() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_building(input.path(), "bldg1", "bldg1:HD1 a brick:Heating_Demand ; brick:value 5 .\n");

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    let summary = driver.validate_only().unwrap();
    assert_eq!(summary.succeeded(), 1);

    let text = fs::read_to_string(output.path().join("bldg1.ttl")).unwrap();
    assert!(text.contains("brick:Heating_Demand"), "{text}");
    assert!(!text.contains("brick:Heating_Demand_Sensor"), "{text}");
}

#[test]
fn validate_only_reports_unparseable_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("bldg2.ttl"), "this is { not turtle").unwrap();

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    let summary = driver.validate_only().unwrap();
    assert_eq!(summary.failed(), 1);
    assert!(matches!(
        summary.outcome("bldg2").unwrap().status,
        FileStatus::Failed { .. }
    ));
    assert_eq!(fs::read_dir(output.path()).unwrap().count(), 0);
}

#[test]
fn summary_serializes_to_json() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_building(input.path(), "bldg1", "bldg1:T1 a brick:Temperature_Sensor .\n");
    fs::write(input.path().join("bldg2.ttl"), "@@@").unwrap();

    let ontology = ontology();
    let registry = RuleRegistry::brick_migrations();
    let driver = BatchDriver::new(&ontology, &registry, options(input.path(), output.path()));
    let summary = driver.run().unwrap();

    let json: serde_json::Value = serde_json::to_value(&summary).unwrap();
    let outcomes = json["outcomes"].as_array().unwrap();
    assert_eq!(outcomes[0]["building"], "bldg1");
    assert_eq!(outcomes[0]["status"], "migrated");
    assert_eq!(outcomes[1]["status"], "failed");
}
