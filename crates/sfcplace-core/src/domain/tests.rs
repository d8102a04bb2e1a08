//! Tests for scenario loading and validation.

use super::*;
use crate::error::SfcError;

const LINE: &str = r#"{
    "nodes": [
        {"id": "n0", "compute": 100, "memory": 1000},
        {"id": "n1", "compute": 100, "memory": 1000}
    ],
    "edges": [{"a": "n0", "b": "n1", "latency": 10, "bandwidth": 50}],
    "vnfs": [
        {"id": "fw", "compute": 10, "memory": 10},
        {"id": "nat", "compute": 10, "memory": 10},
        {"id": "ids", "compute": 10, "memory": 10}
    ],
    "sfcs": [
        {"id": "web", "chain": ["fw", "nat", "ids"], "bandwidth": 5,
         "latency_budget": 100, "origin": "n0"}
    ]
}"#;

fn malformed_path(err: SfcError) -> String {
    match err {
        SfcError::MalformedInput { path, .. } => path,
        other => panic!("expected MalformedInput, got {other:?}"),
    }
}

#[test]
fn test_load_json() {
    let scenario = Scenario::from_json_str(LINE).unwrap();
    assert_eq!(scenario.node_count(), 2);
    assert_eq!(scenario.vnf_count(), 3);
    assert_eq!(scenario.sfc_count(), 1);

    let sfc = scenario.sfc(SfcId(0));
    assert_eq!(sfc.origin, NodeId(0));
    assert_eq!(sfc.head(), VnfId(0));
    assert_eq!(sfc.tail(), VnfId(2));
    assert_eq!(scenario.node_by_name("n1"), Some(NodeId(1)));
    assert_eq!(scenario.vnf_by_name("missing"), None);
}

#[test]
fn test_hops_are_bounded() {
    let scenario = Scenario::from_json_str(LINE).unwrap();
    let sfc = scenario.sfc(SfcId(0));

    let hops: Vec<_> = sfc.hops().collect();
    assert_eq!(hops.len(), 2);
    assert_eq!(hops[1].index, 1);
    assert_eq!((hops[1].from, hops[1].to), (VnfId(1), VnfId(2)));

    assert_eq!(sfc.next_after(VnfId(0)), Some(VnfId(1)));
    assert_eq!(sfc.next_after(VnfId(2)), None);
}

#[test]
fn test_repeated_vnf_in_chain_is_rejected() {
    let doc = r#"{
        "nodes": [
            {"id": "n0", "compute": 100, "memory": 1000},
            {"id": "n1", "compute": 100, "memory": 1000}
        ],
        "edges": [{"a": "n0", "b": "n1", "latency": 10, "bandwidth": 50}],
        "vnfs": [{"id": "v", "compute": 10, "memory": 10}],
        "sfcs": [{"id": "s", "chain": ["v", "v", "v"], "bandwidth": 5,
                  "latency_budget": 100, "origin": "n0"}]
    }"#;

    let err = Scenario::from_json_str(doc).unwrap_err();
    assert!(err.is_malformed_input());
    assert_eq!(malformed_path(err), "sfcs[0].chain[1]");
}

#[test]
fn test_short_chain_is_rejected() {
    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.sfcs[0].chain.truncate(2);

    let err = Scenario::from_document(&doc).unwrap_err();
    assert_eq!(malformed_path(err), "sfcs[0].chain");
}

#[test]
fn test_zero_capacity_is_rejected() {
    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.nodes[1].memory = 0;

    let err = Scenario::from_document(&doc).unwrap_err();
    assert_eq!(malformed_path(err), "nodes[1].memory");
}

#[test]
fn test_oversized_quantity_is_rejected() {
    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.sfcs[0].latency_budget = MAX_QUANTITY + 1;

    let err = Scenario::from_document(&doc).unwrap_err();
    assert_eq!(malformed_path(err), "sfcs[0].latency_budget");
}

#[test]
fn test_parallel_edge_is_rejected() {
    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.edges.push(EdgeSpec {
        a: "n1".into(),
        b: "n0".into(),
        latency: 3,
        bandwidth: 3,
    });

    let err = Scenario::from_document(&doc).unwrap_err();
    assert_eq!(malformed_path(err), "edges[1]");
}

#[test]
fn test_self_loop_is_rejected() {
    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.edges[0].b = "n0".into();

    let err = Scenario::from_document(&doc).unwrap_err();
    assert_eq!(malformed_path(err), "edges[0]");
}

#[test]
fn test_unknown_references_are_rejected() {
    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.sfcs[0].origin = "n9".into();
    assert_eq!(
        malformed_path(Scenario::from_document(&doc).unwrap_err()),
        "sfcs[0].origin"
    );

    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.sfcs[0].chain[2] = "dpi".into();
    assert_eq!(
        malformed_path(Scenario::from_document(&doc).unwrap_err()),
        "sfcs[0].chain[2]"
    );

    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.edges[0].a = "n7".into();
    assert_eq!(
        malformed_path(Scenario::from_document(&doc).unwrap_err()),
        "edges[0].a"
    );
}

#[test]
fn test_duplicate_identifier_is_rejected() {
    let mut doc = ScenarioDocument::from_json_str(LINE).unwrap();
    doc.vnfs[2].id = "fw".into();

    let err = Scenario::from_document(&doc).unwrap_err();
    assert_eq!(malformed_path(err), "vnfs[2].id");
}

#[test]
fn test_unknown_field_is_a_parse_error() {
    let doc = r#"{"nodes": [{"id": "n0", "compute": 1, "memory": 1, "gpu": 2}]}"#;
    let err = Scenario::from_json_str(doc).unwrap_err();
    assert!(matches!(err, SfcError::Parse(_)));
}

#[test]
fn test_negative_number_is_a_parse_error() {
    let doc = r#"{"nodes": [{"id": "n0", "compute": -1, "memory": 1}]}"#;
    assert!(Scenario::from_json_str(doc).unwrap_err().is_malformed_input());
}

#[test]
fn test_yaml_and_toml_documents() {
    let yaml = r#"
        nodes:
          - {id: a, compute: 10, memory: 10}
        vnfs:
          - {id: x, compute: 1, memory: 1}
    "#;
    let scenario = Scenario::from_yaml_str(yaml).unwrap();
    assert_eq!(scenario.node_count(), 1);
    assert_eq!(scenario.sfc_count(), 0);

    let toml = r#"
        [[nodes]]
        id = "a"
        compute = 10
        memory = 10
    "#;
    let scenario = Scenario::from_toml_str(toml).unwrap();
    assert_eq!(scenario.node(NodeId(0)).name, "a");
}

#[test]
fn test_format_from_extension() {
    use std::path::Path;
    assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
    assert_eq!(DocumentFormat::from_path(Path::new("a.TOML")), DocumentFormat::Toml);
    assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
    assert_eq!(DocumentFormat::from_path(Path::new("scenario")), DocumentFormat::Json);
}

#[test]
fn test_load_from_file_and_document_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.json");
    std::fs::write(&path, LINE).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    let doc = scenario.to_document();
    assert_eq!(doc, ScenarioDocument::from_json_str(LINE).unwrap());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Scenario::load("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, SfcError::Io(_)));
}

#[test]
fn test_sfcs_using() {
    let scenario = Scenario::from_json_str(LINE).unwrap();
    assert_eq!(scenario.sfcs_using(VnfId(1)).count(), 1);
}
