//! Tests for placement reports.

use sfcplace_config::SolverConfig;
use sfcplace_model::ModelBuilder;
use sfcplace_test::scenarios::{
    bandwidth_contention, latency_limited, scenario_b, scenario_c, scenario_d,
};
use sfcplace_test::DocumentBuilder;

use super::*;
use crate::Solver;

/// Report of an outcome without an assignment, ready to be edited.
fn blank(builder: DocumentBuilder) -> (Scenario, Topology, PlacementReport) {
    let (scenario, topology) = builder.build();
    let model = ModelBuilder::new(&scenario, &topology).build();
    let outcome = SolveOutcome::without_solution(ResultKind::TimedOut, SolverStats::default());
    let report = PlacementReport::from_outcome(&scenario, &topology, &model, &outcome);
    (scenario, topology, report)
}

fn place(report: &mut PlacementReport, vnf: &str, node: &str) {
    let placement = report
        .placements
        .iter_mut()
        .find(|p| p.vnf == vnf)
        .expect("vnf");
    placement.node = Some(node.to_string());
}

fn admit(report: &mut PlacementReport, sfc: &str) {
    let admission = report
        .admissions
        .iter_mut()
        .find(|a| a.sfc == sfc)
        .expect("sfc");
    admission.admitted = true;
}

#[test]
fn test_solved_report_is_consistent() {
    let (scenario, topology) = scenario_d().build();
    let model = ModelBuilder::new(&scenario, &topology).build();
    let outcome = Solver::new(SolverConfig::default()).solve(&model);
    let report = PlacementReport::from_outcome(&scenario, &topology, &model, &outcome);

    assert_eq!(report.kind, ResultKind::Optimal);
    assert!(report.proven_optimal);
    assert_eq!(report.objective, Some(3));
    assert_eq!(report.admitted_count(), 3);
    assert_eq!(report.node_of("fw"), Some("n0"));
    assert_eq!(report.node_of("wan"), Some("n1"));
    for admission in &report.admissions {
        let latency = admission.routed_latency.expect("latency");
        assert!(latency <= 100);
    }
    assert!(report.links.iter().all(|l| l.used <= l.capacity));
    assert!(report.violations(&scenario, &topology).is_empty());
}

#[test]
fn test_report_without_assignment() {
    let (scenario, topology, report) = blank(scenario_d());

    assert!(!report.has_solution());
    assert!(!report.proven_optimal);
    assert_eq!(report.placements.len(), 9);
    assert!(report.placements.iter().all(|p| p.node.is_none()));
    assert_eq!(report.admitted_count(), 0);
    assert!(report.admissions.iter().all(|a| a.routed_latency.is_none()));
    assert_eq!(report.links.len(), 3);
    assert!(report.links.iter().all(|l| l.used == 0));
    assert!(report.violations(&scenario, &topology).is_empty());
}

#[test]
fn test_report_serializes() {
    let (_, _, report) = blank(scenario_b());
    let json = serde_json::to_value(&report).expect("json");

    assert_eq!(json["kind"], "timed_out");
    assert_eq!(json["proven_optimal"], false);
    assert!(json["objective"].is_null());
    assert_eq!(json["placements"][0]["vnf"], "a");
    assert!(json["placements"][0]["node"].is_null());
    assert!(json["placements"][0].get("also_on").is_none());
    assert!(json.get("conflict").is_none());
}

#[test]
fn test_unplaced_chain_vnf() {
    let (scenario, topology, mut report) = blank(scenario_d());
    admit(&mut report, "web");
    place(&mut report, "fw", "n0");
    place(&mut report, "ids", "n0");

    let violations = report.violations(&scenario, &topology);
    assert_eq!(
        violations,
        vec![Violation::UnplacedChainVnf {
            sfc: "web".into(),
            vnf: "nat".into(),
        }]
    );
}

#[test]
fn test_endpoint_off_origin() {
    let (scenario, topology, mut report) = blank(scenario_d());
    admit(&mut report, "web");
    place(&mut report, "fw", "n1");
    place(&mut report, "nat", "n0");
    place(&mut report, "ids", "n0");

    let violations = report.violations(&scenario, &topology);
    assert_eq!(
        violations,
        vec![Violation::EndpointOffOrigin {
            sfc: "web".into(),
            vnf: "fw".into(),
            origin: "n0".into(),
        }]
    );
}

#[test]
fn test_compute_overload() {
    let (scenario, topology, mut report) = blank(scenario_b());
    admit(&mut report, "s0");
    for vnf in ["a", "b", "c"] {
        place(&mut report, vnf, "n0");
    }

    let violations = report.violations(&scenario, &topology);
    assert_eq!(
        violations,
        vec![Violation::ComputeOverload {
            node: "n0".into(),
            demand: 30,
            capacity: 20,
        }]
    );
}

#[test]
fn test_bandwidth_overload() {
    let (scenario, topology, mut report) = blank(bandwidth_contention());
    for (sfc, first, mid, last) in [("s1", "in1", "mid1", "out1"), ("s2", "in2", "mid2", "out2")] {
        admit(&mut report, sfc);
        place(&mut report, first, "edge");
        place(&mut report, mid, "core");
        place(&mut report, last, "edge");
    }

    let violations = report.violations(&scenario, &topology);
    assert_eq!(
        violations,
        vec![Violation::BandwidthOverload {
            a: "edge".into(),
            b: "core".into(),
            used: 40,
            capacity: 30,
        }]
    );
}

#[test]
fn test_latency_exceeded() {
    let (scenario, topology, mut report) = blank(latency_limited(19));
    admit(&mut report, "s0");
    place(&mut report, "a", "home");
    place(&mut report, "b", "far");
    place(&mut report, "c", "home");

    let violations = report.violations(&scenario, &topology);
    assert_eq!(
        violations,
        vec![Violation::LatencyExceeded {
            sfc: "s0".into(),
            latency: 20,
            budget: 19,
        }]
    );
}

#[test]
fn test_unroutable_hop() {
    let (scenario, topology, mut report) = blank(scenario_c());
    admit(&mut report, "s0");
    place(&mut report, "a", "n0");
    place(&mut report, "b", "n1");
    place(&mut report, "c", "n0");

    let violations = report.violations(&scenario, &topology);
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| matches!(v, Violation::Unroutable { .. })));
}

#[test]
fn test_multiple_placements_and_unknown_names() {
    let (scenario, topology, mut report) = blank(scenario_d());
    report.placements[0].node = Some("n0".into());
    report.placements[0].also_on = vec!["n1".into()];
    report.placements[1].node = Some("nowhere".into());

    let violations = report.violations(&scenario, &topology);
    assert_eq!(
        violations,
        vec![
            Violation::MultiplePlacements {
                vnf: "fw".into(),
                count: 2,
            },
            Violation::UnknownEntity {
                name: "nowhere".into(),
            },
        ]
    );
}

#[test]
fn test_violation_messages() {
    let violation = Violation::LatencyExceeded {
        sfc: "s0".into(),
        latency: 20,
        budget: 19,
    };
    assert_eq!(violation.to_string(), "SFC `s0` routes 20 latency, budget 19");
}
