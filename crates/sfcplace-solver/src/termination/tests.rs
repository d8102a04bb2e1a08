//! Tests for termination conditions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::*;

#[test]
fn test_time_termination() {
    let scope = SolverScope::new();

    assert!(!TimeTermination::seconds(60).is_terminated(&scope));
    assert!(TimeTermination::new(Duration::ZERO).is_terminated(&scope));
}

#[test]
fn test_node_count_termination() {
    let scope = SolverScope::new();
    let termination = NodeCountTermination::new(3);

    scope.record_node();
    scope.record_node();
    assert!(!termination.is_terminated(&scope));
    scope.record_node();
    assert!(termination.is_terminated(&scope));
}

#[test]
fn test_external_termination() {
    let scope = SolverScope::new();
    let flag = Arc::new(AtomicBool::new(false));
    let termination = ExternalTermination::new(flag.clone());

    assert!(!termination.is_terminated(&scope));
    flag.store(true, Ordering::SeqCst);
    assert!(termination.is_terminated(&scope));
}

#[test]
fn test_or_termination() {
    let scope = SolverScope::new();
    let termination = OrTermination::new((
        TimeTermination::seconds(60),
        NodeCountTermination::new(1),
    ));

    assert!(!termination.is_terminated(&scope));
    scope.record_node();
    assert!(termination.is_terminated(&scope));
}

#[test]
fn test_optional_termination() {
    let scope = SolverScope::new();
    let absent: Option<TimeTermination> = None;
    let present = Some(TimeTermination::new(Duration::ZERO));

    assert!(!absent.is_terminated(&scope));
    assert!(present.is_terminated(&scope));
    assert!(!NeverTermination.is_terminated(&scope));
}
