//! Invariant, idempotence, monotonicity and optimality checks on random
//! instances.

use sfcplace::prelude::*;
use sfcplace::{run, solve, Topology};
use sfcplace_core::{NodeId, VnfId};
use sfcplace_test::{random_document, RandomConfig};

const SEEDS: u64 = 12;

fn config() -> SolverConfig {
    SolverConfig {
        assert_solution: true,
        ..SolverConfig::default()
    }
    .with_thread_count(ThreadCount::Count(2))
}

fn objective(document: &sfcplace::ScenarioDocument) -> i64 {
    let scenario = Scenario::from_document(document).expect("valid document");
    let report = solve(&scenario, &config()).expect("solve");
    assert_eq!(report.kind, ResultKind::Optimal);
    report.objective.expect("objective")
}

#[test]
fn test_random_solutions_satisfy_every_invariant() {
    let shape = RandomConfig::default();
    for seed in 0..SEEDS {
        let scenario = Scenario::from_document(&random_document(seed, &shape)).expect("valid");
        let run = run(&scenario, &config()).expect("solve");

        assert_eq!(run.report.kind, ResultKind::Optimal, "seed {seed}");
        let values = run.outcome.values.as_ref().expect("values");
        assert!(run.model.violated_constraints(values).is_empty(), "seed {seed}");
        assert!(run.report.violations(&scenario, &run.topology).is_empty(), "seed {seed}");
        assert_eq!(
            run.report.objective,
            Some(run.report.admitted_count() as i64),
            "seed {seed}"
        );
    }
}

#[test]
fn test_solving_twice_gives_same_result() {
    let shape = RandomConfig {
        sfcs: 4,
        vnfs: 8,
        ..RandomConfig::default()
    };
    for seed in 0..SEEDS {
        let scenario = Scenario::from_document(&random_document(seed, &shape)).expect("valid");
        let first = solve(&scenario, &config()).expect("solve");
        let second = solve(&scenario, &config()).expect("solve");

        assert_eq!(first.objective, second.objective, "seed {seed}");
        assert_eq!(first.placements, second.placements, "seed {seed}");
        assert_eq!(first.admissions, second.admissions, "seed {seed}");
    }
}

#[test]
fn test_thread_count_does_not_change_placement() {
    let shape = RandomConfig {
        sfcs: 5,
        vnfs: 10,
        nodes: 4,
        ..RandomConfig::default()
    };
    for seed in 0..6 {
        let scenario = Scenario::from_document(&random_document(seed, &shape)).expect("valid");
        let serial = solve(&scenario, &config().with_thread_count(ThreadCount::None)).expect("solve");
        let parallel =
            solve(&scenario, &config().with_thread_count(ThreadCount::Count(4))).expect("solve");

        assert_eq!(serial.placements, parallel.placements, "seed {seed}");
        assert_eq!(serial.admissions, parallel.admissions, "seed {seed}");
    }
}

#[test]
fn test_relaxing_capacity_never_hurts() {
    let shape = RandomConfig::default();
    for seed in 0..SEEDS {
        let document = random_document(seed, &shape);
        let base = objective(&document);

        for node in 0..document.nodes.len() {
            let mut relaxed = document.clone();
            relaxed.nodes[node].compute += 25;
            relaxed.nodes[node].memory += 25;
            assert!(objective(&relaxed) >= base, "seed {seed}, node {node}");
        }
        for edge in 0..document.edges.len() {
            let mut relaxed = document.clone();
            relaxed.edges[edge].bandwidth += 25;
            assert!(objective(&relaxed) >= base, "seed {seed}, edge {edge}");
        }
    }
}

#[test]
fn test_relaxing_latency_budget_never_hurts() {
    let shape = RandomConfig::default();
    for seed in 0..SEEDS {
        let document = random_document(seed, &shape);
        let base = objective(&document);

        for sfc in 0..document.sfcs.len() {
            let mut relaxed = document.clone();
            relaxed.sfcs[sfc].latency_budget += 15;
            assert!(objective(&relaxed) >= base, "seed {seed}, sfc {sfc}");
        }
    }
}

#[test]
fn test_heuristic_never_beats_optimum() {
    let shape = RandomConfig {
        sfcs: 4,
        vnfs: 8,
        ..RandomConfig::default()
    };
    for seed in 0..SEEDS {
        let scenario = Scenario::from_document(&random_document(seed, &shape)).expect("valid");
        let optimal = solve(&scenario, &config()).expect("solve");
        let heuristic = solve(
            &scenario,
            &config()
                .with_search_type(SearchType::Heuristic)
                .with_random_seed(seed),
        )
        .expect("solve");

        assert_eq!(heuristic.kind, ResultKind::Heuristic);
        assert!(heuristic.objective <= optimal.objective, "seed {seed}");
    }
}

/// Node loads of `placement` fit every node.
fn fits_nodes(scenario: &Scenario, placement: &[Option<usize>]) -> bool {
    let mut compute = vec![0u64; scenario.node_count()];
    let mut memory = vec![0u64; scenario.node_count()];
    for vnf in scenario.vnfs() {
        if let Some(node) = placement[vnf.id.index()] {
            compute[node] += vnf.compute;
            memory[node] += vnf.memory;
        }
    }
    scenario
        .nodes()
        .iter()
        .all(|n| compute[n.id.index()] <= n.compute && memory[n.id.index()] <= n.memory)
}

/// Whether the chains in the `admitted` bit set can all be served by
/// `placement`, checked hop by hop on the topology.
fn serves(
    scenario: &Scenario,
    topology: &Topology,
    placement: &[Option<usize>],
    admitted: u32,
) -> bool {
    let at = |vnf: VnfId| placement[vnf.index()].map(NodeId);
    let mut bandwidth = vec![0u64; scenario.edges().len()];
    for sfc in scenario.sfcs() {
        if (admitted >> sfc.id.index()) & 1 == 0 {
            continue;
        }
        if at(sfc.head()) != Some(sfc.origin) || at(sfc.tail()) != Some(sfc.origin) {
            return false;
        }
        let mut latency = 0;
        for hop in sfc.hops() {
            let (Some(a), Some(b)) = (at(hop.from), at(hop.to)) else {
                return false;
            };
            let Ok(edges) = topology.shortest_path_edges(a, b) else {
                return false;
            };
            latency += topology.shortest_path_length(a, b).expect("routed pair");
            for edge in edges {
                bandwidth[edge.index()] += sfc.bandwidth;
            }
        }
        if latency > sfc.latency_budget {
            return false;
        }
    }
    scenario
        .edges()
        .iter()
        .all(|e| bandwidth[e.id.index()] <= e.bandwidth)
}

/// Largest admitted count over every placement of every VNF, unplaced
/// included, and every admission set.
fn enumerated_optimum(scenario: &Scenario) -> i64 {
    let topology = Topology::new(scenario);
    let nodes = scenario.node_count();
    let sets = 1u32 << scenario.sfc_count();
    let mut placement: Vec<Option<usize>> = vec![None; scenario.vnf_count()];
    let mut best = 0;
    loop {
        if fits_nodes(scenario, &placement) {
            for admitted in 0..sets {
                let count = i64::from(admitted.count_ones());
                if count > best && serves(scenario, &topology, &placement, admitted) {
                    best = count;
                }
            }
        }

        let mut digit = 0;
        loop {
            let Some(slot) = placement.get_mut(digit) else {
                return best;
            };
            *slot = match *slot {
                None => Some(0),
                Some(node) if node + 1 < nodes => Some(node + 1),
                Some(_) => None,
            };
            if slot.is_some() {
                break;
            }
            digit += 1;
        }
    }
}

#[test]
fn test_optimum_matches_enumeration() {
    let shapes = [
        RandomConfig::default(),
        RandomConfig {
            nodes: 4,
            connected: false,
            chord_probability: 0.4,
            node_capacity: (15, 40),
            edge_bandwidth: (5, 20),
            ..RandomConfig::default()
        },
    ];
    for (index, shape) in shapes.iter().enumerate() {
        for seed in 0..20 {
            let scenario =
                Scenario::from_document(&random_document(seed, shape)).expect("valid");
            let expected = enumerated_optimum(&scenario);

            for threads in [ThreadCount::None, ThreadCount::Count(4)] {
                let report = solve(&scenario, &config().with_thread_count(threads)).expect("solve");
                assert_eq!(report.kind, ResultKind::Optimal, "shape {index}, seed {seed}");
                assert_eq!(
                    report.objective,
                    Some(expected),
                    "shape {index}, seed {seed}, {threads}"
                );
            }
        }
    }
}
