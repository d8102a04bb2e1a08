//! Reference scenarios.
//!
//! Each function returns a fresh value; expected optimal objectives are
//! given in the doc comments.

use sfcplace_core::ScenarioDocument;

use crate::builder::DocumentBuilder;

/// Two nodes, one edge, a chain repeating its only VNF. Malformed.
pub fn scenario_a() -> ScenarioDocument {
    DocumentBuilder::new()
        .node("n0", 100, 1000)
        .node("n1", 100, 1000)
        .edge("n0", "n1", 10, 50)
        .vnf("fw", 10, 10)
        .sfc("s0", &["fw", "fw", "fw"], 5, 100, "n0")
        .document()
}

/// One node too small for the chain's total compute demand. Optimum 0.
pub fn scenario_b() -> DocumentBuilder {
    DocumentBuilder::new()
        .node("n0", 20, 1000)
        .vnf("a", 10, 10)
        .vnf("b", 10, 10)
        .vnf("c", 10, 10)
        .sfc("s0", &["a", "b", "c"], 5, 100, "n0")
}

/// Two disconnected nodes.
///
/// `s0` originates at `n0`, which only fits its head and tail, so its middle
/// VNF would have to sit on the unreachable `n1`. `s1` lives entirely on
/// `n1`. Optimum 1.
pub fn scenario_c() -> DocumentBuilder {
    DocumentBuilder::new()
        .node("n0", 20, 1000)
        .node("n1", 30, 1000)
        .vnf("a", 10, 10)
        .vnf("b", 10, 10)
        .vnf("c", 10, 10)
        .vnf("d", 10, 10)
        .vnf("e", 10, 10)
        .vnf("f", 10, 10)
        .sfc("s0", &["a", "b", "c"], 5, 100, "n0")
        .sfc("s1", &["d", "e", "f"], 5, 100, "n1")
}

/// Generous triangle with three independent chains. Optimum 3.
pub fn scenario_d() -> DocumentBuilder {
    DocumentBuilder::new()
        .node("n0", 1000, 1000)
        .node("n1", 1000, 1000)
        .node("n2", 1000, 1000)
        .edge("n0", "n1", 5, 1000)
        .edge("n1", "n2", 5, 1000)
        .edge("n0", "n2", 5, 1000)
        .vnf("fw", 10, 10)
        .vnf("nat", 10, 10)
        .vnf("ids", 10, 10)
        .vnf("lb", 10, 10)
        .vnf("dpi", 10, 10)
        .vnf("wan", 10, 10)
        .vnf("proxy", 10, 10)
        .vnf("cache", 10, 10)
        .vnf("vpn", 10, 10)
        .sfc("web", &["fw", "nat", "ids"], 10, 100, "n0")
        .sfc("video", &["lb", "dpi", "wan"], 10, 100, "n1")
        .sfc("office", &["proxy", "cache", "vpn"], 10, 100, "n2")
}

/// Two chains competing for one link.
///
/// The origin only holds four VNFs, so admitting both chains moves both
/// middle VNFs to `core`, putting `2 · 2 · 10` bandwidth on a link of
/// capacity 30. Optimum 1.
pub fn bandwidth_contention() -> DocumentBuilder {
    DocumentBuilder::new()
        .node("edge", 40, 1000)
        .node("core", 1000, 1000)
        .edge("edge", "core", 1, 30)
        .vnf("in1", 10, 10)
        .vnf("mid1", 10, 10)
        .vnf("out1", 10, 10)
        .vnf("in2", 10, 10)
        .vnf("mid2", 10, 10)
        .vnf("out2", 10, 10)
        .sfc("s1", &["in1", "mid1", "out1"], 10, 100, "edge")
        .sfc("s2", &["in2", "mid2", "out2"], 10, 100, "edge")
}

/// One chain whose middle VNF must travel to `far` and back.
///
/// The round trip costs `2 · 10` latency, so the chain is admitted exactly
/// when `budget >= 20`.
pub fn latency_limited(budget: u64) -> DocumentBuilder {
    DocumentBuilder::new()
        .node("home", 20, 1000)
        .node("far", 1000, 1000)
        .edge("home", "far", 10, 1000)
        .vnf("a", 10, 10)
        .vnf("b", 10, 10)
        .vnf("c", 10, 10)
        .sfc("s0", &["a", "b", "c"], 5, budget, "home")
}

/// Two chains sharing their middle VNF, which may only be placed once.
///
/// The shared VNF sits on the second node and both chains route through
/// it. Optimum 2.
pub fn shared_vnf() -> DocumentBuilder {
    DocumentBuilder::new()
        .node("n0", 40, 1000)
        .node("n1", 100, 1000)
        .edge("n0", "n1", 2, 100)
        .vnf("a", 10, 10)
        .vnf("shared", 30, 10)
        .vnf("c", 10, 10)
        .vnf("d", 10, 10)
        .vnf("f", 10, 10)
        .sfc("s0", &["a", "shared", "c"], 10, 50, "n0")
        .sfc("s1", &["d", "shared", "f"], 10, 50, "n0")
}
