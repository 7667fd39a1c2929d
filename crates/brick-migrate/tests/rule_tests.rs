use std::path::PathBuf;

use brick_migrate::error::StoreError;
use brick_migrate::model::ontology::{brick, unit};
use brick_migrate::model::union::{compose, snapshot};
use brick_migrate::model::{Graph, NamedNode, Triple};
use brick_migrate::parser::{load_file, parse_turtle};
use brick_migrate::rules::registry::{deprecation_fix, retype};
use brick_migrate::rules::{apply_rule, apply_rules, Rule, RuleRegistry};
use oxigraph::model::vocab::rdf;

const PREFIXES: &str = r#"
@prefix brick: <https://brickschema.org/schema/Brick#> .
@prefix unit: <http://qudt.org/vocab/unit/> .
@prefix bldg1: <http://buildsys.org/ontologies/bldg1#> .
@prefix bldg6: <http://buildsys.org/ontologies/bldg6#> .
@prefix bldg42: <http://buildsys.org/ontologies/bldg42#> .
@prefix bldg43: <http://buildsys.org/ontologies/bldg43#> .
"#;

fn ontology() -> Graph {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("mini_brick.ttl");
    load_file(&path, "brick").unwrap().skolemize()
}

fn building(body: &str) -> Graph {
    parse_turtle(&format!("{PREFIXES}{body}"), "building").unwrap()
}

fn entity(building: &str, local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://buildsys.org/ontologies/{building}#{local}"))
}

fn ex(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.org/{local}"))
}

fn is_a(g: &Graph, node: &NamedNode, class: &str) -> bool {
    g.contains(&Triple::new(node.clone(), rdf::TYPE, brick::iri(class)))
}

/// Apply `rules` to `graph` alone and return the result.
fn run(graph: &Graph, rules: &[Rule]) -> Graph {
    let store = compose(&[graph]).unwrap();
    apply_rules(&store, rules).unwrap();
    snapshot(&store).unwrap()
}

fn migrate(body: &str, name: &str) -> Graph {
    let registry = RuleRegistry::brick_migrations();
    let (data, ontology) = (building(body), ontology());
    let store = compose(&[&data, &ontology]).unwrap();
    apply_rules(&store, registry.global()).unwrap();
    apply_rules(&store, registry.for_building(name)).unwrap();
    snapshot(&store).unwrap()
}

// --- Engine semantics ---

#[test]
fn every_rule_runs_on_an_empty_store() {
    let registry = RuleRegistry::brick_migrations();
    let store = compose(&[]).unwrap();
    for rule in registry.global() {
        apply_rule(&store, rule).unwrap_or_else(|e| panic!("{}: {e}", rule.name()));
    }
    for building in ["bldg6", "bldg43"] {
        for rule in registry.for_building(building) {
            apply_rule(&store, rule).unwrap_or_else(|e| panic!("{}: {e}", rule.name()));
        }
    }
}

#[test]
fn rule_without_match_is_noop() {
    let registry = RuleRegistry::brick_migrations();
    let (data, ontology) = (
        building("bldg1:AHU1 a brick:AHU ; brick:hasPoint bldg1:SAT .\n"),
        ontology(),
    );
    let original = &data + &ontology;
    for rule in registry.global() {
        let store = compose(&[&data, &ontology]).unwrap();
        rule.apply(&store).unwrap();
        assert_eq!(snapshot(&store).unwrap(), original, "{} changed the graph", rule.name());
    }
}

#[test]
fn request_declares_vocabulary_prefixes() {
    let request = retype("mode_fix", "Mode", "Mode_Status").request();
    assert!(request.contains("PREFIX brick: <https://brickschema.org/schema/Brick#>"));
    assert!(request.contains("PREFIX owl: <http://www.w3.org/2002/07/owl#>"));
    assert!(request.ends_with("WHERE { ?this a brick:Mode }"));
}

#[test]
fn malformed_rule_is_a_sparql_error() {
    let store = compose(&[]).unwrap();
    let err = Rule::new("broken", "DELETE { ?s ?p ?o } WHERE {")
        .apply(&store)
        .unwrap_err();
    assert!(
        matches!(&err, StoreError::Sparql { request, .. } if request == "broken"),
        "unexpected error: {err}"
    );
}

#[test]
fn retype_rewrites_every_match() {
    let g = building(
        "bldg1:A a brick:Cooling_Demand .\nbldg1:B a brick:Cooling_Demand .\nbldg1:C a brick:AHU .\n",
    );
    let rule = retype("cooling_demand_fix", "Cooling_Demand", "Cooling_Demand_Sensor");
    let g = run(&g, &[rule]);
    assert_eq!(g.len(), 3);
    assert!(is_a(&g, &entity("bldg1", "A"), "Cooling_Demand_Sensor"));
    assert!(is_a(&g, &entity("bldg1", "B"), "Cooling_Demand_Sensor"));
    assert!(is_a(&g, &entity("bldg1", "C"), "AHU"));
    assert!(!is_a(&g, &entity("bldg1", "A"), "Cooling_Demand"));
}

#[test]
fn solutions_are_computed_before_any_change() {
    // Reversing a symmetric pair: all deletes happen before any insert, so
    // both edges survive. Interleaving per solution would lose one.
    let (x, y, p) = (ex("x"), ex("y"), ex("p"));
    let g: Graph = [
        Triple::new(x.clone(), p.clone(), y.clone()),
        Triple::new(y.clone(), p.clone(), x.clone()),
    ]
    .into_iter()
    .collect();
    let reverse = Rule::new(
        "reverse",
        "DELETE { ?s <http://example.org/p> ?o }
         INSERT { ?o <http://example.org/p> ?s }
         WHERE { ?s <http://example.org/p> ?o }",
    );
    let g = run(&g, &[reverse]);
    assert_eq!(g.len(), 2);
    assert!(g.contains(&Triple::new(x.clone(), p.clone(), y.clone())));
    assert!(g.contains(&Triple::new(y, p, x)));
}

#[test]
fn insert_data_is_idempotent() {
    let registry = RuleRegistry::brick_migrations();
    let rules = registry.for_building("bldg43");
    let g = run(&Graph::new(), &[rules, rules].concat());
    assert_eq!(g.len(), 1);
    assert!(is_a(&g, &entity("bldg43", "chiller"), "Chiller"));
}

#[test]
fn unbound_insert_variable_is_skipped() {
    let g = building("bldg1:A a brick:Mode .\n");
    let rule = Rule::new(
        "dangling",
        "INSERT { ?this brick:isPointOf ?nowhere } WHERE { ?this a brick:Mode }",
    );
    assert_eq!(run(&g, &[rule]), g);
}

#[test]
fn regex_filter_matches_iri_text() {
    let registry = RuleRegistry::brick_migrations();
    let g = building(
        "bldg6:VAVRM101 brick:hasPoint bldg6:T1 .\nbldg6:AHU1 brick:hasPoint bldg6:T2 .\n",
    );
    let g = run(&g, registry.for_building("bldg6"));
    assert!(is_a(&g, &entity("bldg6", "VAVRM101"), "HVAC_Zone"));
    assert!(!is_a(&g, &entity("bldg6", "AHU1"), "HVAC_Zone"));
}

#[test]
fn not_exists_filter_excludes_typed_nodes() {
    let registry = RuleRegistry::brick_migrations();
    let g = building(
        "bldg6:VAVRM1 brick:hasPoint bldg6:T1 .\nbldg6:VAVRM2 a brick:VAV ; brick:hasPoint bldg6:T2 .\n",
    );
    let g = run(&g, registry.for_building("bldg6"));
    assert!(is_a(&g, &entity("bldg6", "VAVRM1"), "HVAC_Zone"));
    assert!(!is_a(&g, &entity("bldg6", "VAVRM2"), "HVAC_Zone"));
}

// --- Migration rules ---

#[test]
fn heating_demand_becomes_sensor_and_stays_migrated() {
    let full = migrate("bldg1:HD1 a brick:Heating_Demand .\n", "bldg1");
    let hd = entity("bldg1", "HD1");
    assert!(is_a(&full, &hd, "Heating_Demand_Sensor"));
    assert!(!is_a(&full, &hd, "Heating_Demand"));
}

#[test]
fn deprecation_fix_uses_ontology_replacement() {
    let full = migrate("bldg1:T1 a brick:Legacy_Temperature_Sensor .\n", "bldg1");
    let t1 = entity("bldg1", "T1");
    assert!(is_a(&full, &t1, "Temperature_Sensor"));
    assert!(!is_a(&full, &t1, "Legacy_Temperature_Sensor"));
}

#[test]
fn deprecation_fix_needs_the_ontology() {
    let g = building("bldg1:T1 a brick:Legacy_Temperature_Sensor .\n");
    assert_eq!(run(&g, &[deprecation_fix()]), g);
}

#[test]
fn electric_meter_gets_meters_relation() {
    let full = migrate(
        "bldg1:M1 a brick:Electric_Meter ; brick:isPointOf bldg1:Panel1 .\n",
        "bldg1",
    );
    let m1 = entity("bldg1", "M1");
    assert!(is_a(&full, &m1, "Electrical_Meter"));
    assert!(full.contains(&Triple::new(
        m1.clone(),
        brick::iri("meters"),
        entity("bldg1", "Panel1"),
    )));
    assert!(!full.contains(&Triple::new(
        m1,
        brick::iri("isPointOf"),
        entity("bldg1", "Panel1"),
    )));
}

#[test]
fn meters_fix_runs_before_rename_too() {
    let registry = RuleRegistry::brick_migrations();
    let names: Vec<&str> = registry.global().iter().map(Rule::name).collect();
    let meters: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, n)| **n == "meters_fix")
        .map(|(i, _)| i)
        .collect();
    let rename = names.iter().position(|n| *n == "electricalmeter_fix").unwrap();
    assert_eq!(meters.len(), 2);
    assert!(meters[0] < rename && rename < meters[1]);
    assert_eq!(names.last(), Some(&"deprecation_fix"));
    assert_eq!(names.first(), Some(&"heating_demand_fix"));
}

#[test]
fn substance_retype_adds_substance() {
    let full = migrate("bldg1:V1 a brick:Hot_Water_Valve_Command .\n", "bldg1");
    let v1 = entity("bldg1", "V1");
    assert!(is_a(&full, &v1, "Valve_Command"));
    assert!(full.contains(&Triple::new(
        v1,
        brick::iri("hasSubstance"),
        brick::iri("Hot_Water"),
    )));
}

#[test]
fn square_feet_unit_is_renamed() {
    let full = migrate("bldg1:Room1 brick:hasUnits unit:FT_2 .\n", "bldg1");
    let room = entity("bldg1", "Room1");
    assert!(full.contains(&Triple::new(
        room.clone(),
        brick::iri("hasUnit"),
        unit::iri("FT2"),
    )));
    assert!(full
        .object(&room.into(), brick::iri("hasUnits").as_ref())
        .is_none());
}

#[test]
fn bypass_valve_becomes_chiller_part() {
    let full = migrate(
        "bldg42:CH1 a brick:Chiller ; brick:hasPoint bldg42:BPV .\nbldg42:BPV a brick:Chilled_Water_Bypass_Valve .\n",
        "bldg42",
    );
    let bpv = entity("bldg42", "BPV");
    // The status point lives in the building's `#` namespace.
    let status = NamedNode::new_unchecked("http://buildsys.org/ontologies/bldg42#BypassValveStatus");
    assert!(is_a(&full, &bpv, "Bypass_Valve"));
    assert!(is_a(&full, &status, "Valve_Status"));
    assert!(full.contains(&Triple::new(
        entity("bldg42", "CH1"),
        brick::iri("hasPart"),
        bpv.clone(),
    )));
    assert!(!full.contains(&Triple::new(
        entity("bldg42", "CH1"),
        brick::iri("hasPoint"),
        bpv,
    )));
}

// --- Building-specific rules ---

#[test]
fn bldg6_rooms_become_zones() {
    let full = migrate(
        "bldg6:VAVRM101 brick:hasPoint bldg6:T1 .\nbldg6:VAVRM102 a brick:VAV ; brick:hasPoint bldg6:T2 .\n",
        "bldg6",
    );
    assert!(is_a(&full, &entity("bldg6", "VAVRM101"), "HVAC_Zone"));
    assert!(!is_a(&full, &entity("bldg6", "VAVRM102"), "HVAC_Zone"));
}

#[test]
fn bldg43_gets_a_chiller() {
    let full = migrate("bldg43:AHU1 a brick:AHU .\n", "bldg43");
    assert!(is_a(&full, &entity("bldg43", "chiller"), "Chiller"));
}

#[test]
fn bldg6_rules_do_not_run_for_bldg43() {
    let body = "bldg6:VAVRM101 brick:hasPoint bldg6:T1 .\n";
    let full = migrate(body, "bldg43");
    assert!(!is_a(&full, &entity("bldg6", "VAVRM101"), "HVAC_Zone"));
}

#[test]
fn bldg43_rules_do_not_run_for_bldg6() {
    let full = migrate("bldg6:AHU1 a brick:AHU .\n", "bldg6");
    assert!(!full.has_subject(&entity("bldg43", "chiller").into()));
}

#[test]
fn unknown_building_has_no_specific_rules() {
    let registry = RuleRegistry::brick_migrations();
    assert!(registry.for_building("bldg1").is_empty());
    assert_eq!(registry.for_building("bldg6").len(), 1);
    assert_eq!(registry.for_building("bldg43").len(), 1);
}
