//! Functional construction of a [`DecisionModel`].


use std::collections::HashSet;

use smallvec::smallvec;
use tracing::debug;

use sfcplace_core::{EdgeId, NodeId, Scenario, Topology};

use crate::constraint::{Comparison, Constraint, ConstraintGroup};
use crate::expr::LinearExpr;
use crate::model::{AdmissionBlock, DecisionModel, PlaceGroup, ResourceRelaxation};
use crate::variable::{Product, VarId, VarKind, Variable};

/// Route between an ordered node pair, resolved once per build.
#[derive(Debug, Clone)]
struct Route {
    latency: u64,
    edges: Vec<EdgeId>,
}

/// Builds the decision model of one scenario.
///
/// The builder only borrows its inputs; [`build`](Self::build) consumes it
/// and returns the finished model, so no partially built state escapes.
///
/// # Example
///
/// ```
/// use sfcplace_core::{Scenario, Topology};
/// use sfcplace_model::ModelBuilder;
///
/// let scenario = Scenario::from_json_str(r#"{
///     "nodes": [{"id": "n0", "compute": 10, "memory": 10}],
///     "vnfs": [
///         {"id": "a", "compute": 1, "memory": 1},
///         {"id": "b", "compute": 1, "memory": 1},
///         {"id": "c", "compute": 1, "memory": 1}
///     ],
///     "sfcs": [{"id": "s", "chain": ["a", "b", "c"], "bandwidth": 1,
///               "latency_budget": 5, "origin": "n0"}]
/// }"#).unwrap();
/// let topology = Topology::new(&scenario);
/// let model = ModelBuilder::new(&scenario, &topology).build();
/// assert_eq!(model.admissions().len(), 1);
/// ```
pub struct ModelBuilder<'a> {
    scenario: &'a Scenario,
    topology: &'a Topology,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    names: HashSet<String>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(scenario: &'a Scenario, topology: &'a Topology) -> Self {
        Self {
            scenario,
            topology,
            variables: Vec::new(),
            constraints: Vec::new(),
            names: HashSet::new(),
        }
    }

    pub fn build(mut self) -> DecisionModel {
        let scenario = self.scenario;
        let node_count = scenario.node_count();

        let place_groups: Vec<PlaceGroup> = scenario
            .vnfs()
            .iter()
            .map(|vnf| PlaceGroup {
                vnf: vnf.id,
                vars: scenario
                    .nodes()
                    .iter()
                    .map(|node| {
                        let name = format!("place_{}_{}", vnf.name, node.name);
                        self.add_variable(
                            VarKind::Place {
                                vnf: vnf.id,
                                node: node.id,
                            },
                            &name,
                            None,
                        )
                    })
                    .collect(),
            })
            .collect();

        let admissions: Vec<AdmissionBlock> = scenario
            .sfcs()
            .iter()
            .map(|sfc| {
                let name = format!("admit_{}", sfc.name);
                let var = self.add_variable(VarKind::Admit { sfc: sfc.id }, &name, None);
                AdmissionBlock {
                    sfc: sfc.id,
                    var,
                    chain: sfc.chain.iter().map(|v| v.index()).collect(),
                    origin: sfc.origin,
                }
            })
            .collect();

        self.add_uniqueness(&place_groups);
        self.add_capacities(&place_groups);
        self.add_chain_placement(&place_groups, &admissions);
        let routes = self.resolve_routes();
        self.add_routing(&place_groups, &admissions, &routes);

        let objective = LinearExpr::sum(admissions.iter().map(|a| a.var));
        let relaxation = ResourceRelaxation {
            vnf_demand: scenario
                .vnfs()
                .iter()
                .map(|v| [v.compute as i64, v.memory as i64])
                .collect(),
            node_capacity: scenario
                .nodes()
                .iter()
                .map(|n| [n.compute as i64, n.memory as i64])
                .collect(),
        };

        let model = DecisionModel::assemble(
            self.variables,
            self.constraints,
            objective,
            place_groups,
            admissions,
            relaxation,
            node_count,
        );
        let stats = model.stats();
        debug!(
            event = "model_built",
            place_vars = stats.place_vars,
            admit_vars = stats.admit_vars,
            uses_vars = stats.uses_vars,
            constraints = stats.constraint_count(),
        );
        for (group, count) in &stats.constraints_by_group {
            debug!(event = "model_group", group = group.as_str(), constraints = count);
        }
        model
    }

    fn add_variable(&mut self, kind: VarKind, name: &str, definition: Option<Product>) -> VarId {
        let id = VarId(self.variables.len());
        let name = self.unique_name(name);
        self.variables.push(Variable {
            id,
            kind,
            name,
            definition,
        });
        id
    }

    fn add_constraint(
        &mut self,
        name: &str,
        group: ConstraintGroup,
        expr: LinearExpr,
        comparison: Comparison,
        rhs: i64,
    ) {
        let name = self.unique_name(name);
        self.constraints
            .push(Constraint::new(name, group, expr, comparison, rhs));
    }

    /// Maps `raw` to an LP-safe identifier not used so far in this model.
    fn unique_name(&mut self, raw: &str) -> String {
        let base = lp_identifier(raw);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.names.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.names.insert(name.clone());
        name
    }

    fn add_uniqueness(&mut self, place_groups: &[PlaceGroup]) {
        for group in place_groups {
            if group.vars.is_empty() {
                continue;
            }
            let name = format!("unique_{}", self.scenario.vnf(group.vnf).name);
            self.add_constraint(
                &name,
                ConstraintGroup::Uniqueness,
                LinearExpr::sum(group.vars.iter().copied()),
                Comparison::LessOrEqual,
                1,
            );
        }
    }

    fn add_capacities(&mut self, place_groups: &[PlaceGroup]) {
        let scenario = self.scenario;
        for node in scenario.nodes() {
            let mut compute = LinearExpr::new();
            let mut memory = LinearExpr::new();
            for group in place_groups {
                let vnf = scenario.vnf(group.vnf);
                let var = group.vars[node.id.index()];
                compute.add_term(var, vnf.compute as i64);
                memory.add_term(var, vnf.memory as i64);
            }
            if compute.is_empty() {
                continue;
            }
            self.add_constraint(
                &format!("compute_{}", node.name),
                ConstraintGroup::ComputeCapacity,
                compute,
                Comparison::LessOrEqual,
                node.compute as i64,
            );
            self.add_constraint(
                &format!("memory_{}", node.name),
                ConstraintGroup::MemoryCapacity,
                memory,
                Comparison::LessOrEqual,
                node.memory as i64,
            );
        }
    }

    fn add_chain_placement(&mut self, place_groups: &[PlaceGroup], admissions: &[AdmissionBlock]) {
        let scenario = self.scenario;
        for block in admissions {
            let sfc = scenario.sfc(block.sfc);
            for &vnf in &sfc.chain {
                let expr = LinearExpr::sum(place_groups[vnf.index()].vars.iter().copied())
                    .plus(block.var, -1);
                self.add_constraint(
                    &format!("chain_{}_{}", sfc.name, scenario.vnf(vnf).name),
                    ConstraintGroup::ChainPlacement,
                    expr,
                    Comparison::GreaterOrEqual,
                    0,
                );
            }
            for (end, vnf) in [("head", sfc.head()), ("tail", sfc.tail())] {
                let place = place_groups[vnf.index()].vars[sfc.origin.index()];
                self.add_constraint(
                    &format!("origin_{}_{}", sfc.name, end),
                    ConstraintGroup::OriginPinning,
                    LinearExpr::var(place).plus(block.var, -1),
                    Comparison::GreaterOrEqual,
                    0,
                );
            }
        }
    }

    /// Shortest routes for every ordered node pair, `None` across components.
    fn resolve_routes(&self) -> Vec<Option<Route>> {
        let n = self.scenario.node_count();
        let mut routes = Vec::with_capacity(n * n);
        for a in 0..n {
            for b in 0..n {
                let (a, b) = (NodeId(a), NodeId(b));
                let route = match (
                    self.topology.shortest_path_length(a, b),
                    self.topology.shortest_path_edges(a, b),
                ) {
                    (Ok(latency), Ok(edges)) => Some(Route { latency, edges }),
                    _ => None,
                };
                routes.push(route);
            }
        }
        routes
    }

    /// Adds `uses` variables with their linearization, then the bandwidth and
    /// latency sums over them.
    fn add_routing(
        &mut self,
        place_groups: &[PlaceGroup],
        admissions: &[AdmissionBlock],
        routes: &[Option<Route>],
    ) {
        let scenario = self.scenario;
        let n = scenario.node_count();
        let mut bandwidth: Vec<LinearExpr> = vec![LinearExpr::new(); scenario.edges().len()];

        for block in admissions {
            let sfc = scenario.sfc(block.sfc);
            let mut latency = LinearExpr::new();
            for hop in sfc.hops() {
                let from_vars = &place_groups[hop.from.index()].vars;
                let to_vars = &place_groups[hop.to.index()].vars;
                for a in 0..n {
                    for b in 0..n {
                        let (place_from, place_to) = (from_vars[a], to_vars[b]);
                        let name = format!(
                            "uses_{}_{}_{}_{}",
                            sfc.name,
                            hop.index,
                            scenario.node(NodeId(a)).name,
                            scenario.node(NodeId(b)).name
                        );
                        let uses = self.add_variable(
                            VarKind::Uses {
                                sfc: sfc.id,
                                hop: hop.index,
                                from: NodeId(a),
                                to: NodeId(b),
                            },
                            &name,
                            Some(Product(smallvec![block.var, place_from, place_to])),
                        );
                        let var_name = self.variables[uses.index()].name.clone();
                        self.add_linearization(&var_name, uses, [block.var, place_from, place_to]);

                        match &routes[a * n + b] {
                            None => self.add_constraint(
                                &format!("route_{var_name}"),
                                ConstraintGroup::Routing,
                                LinearExpr::var(uses),
                                Comparison::LessOrEqual,
                                0,
                            ),
                            Some(route) => {
                                latency.add_term(uses, route.latency as i64);
                                for edge in &route.edges {
                                    bandwidth[edge.index()].add_term(uses, sfc.bandwidth as i64);
                                }
                            }
                        }
                    }
                }
            }
            if !latency.is_empty() {
                self.add_constraint(
                    &format!("latency_{}", sfc.name),
                    ConstraintGroup::Latency,
                    latency,
                    Comparison::LessOrEqual,
                    sfc.latency_budget as i64,
                );
            }
        }

        for (edge, expr) in scenario.edges().iter().zip(bandwidth) {
            if expr.is_empty() {
                continue;
            }
            let name = format!(
                "bandwidth_{}_{}",
                scenario.node(edge.a).name,
                scenario.node(edge.b).name
            );
            self.add_constraint(
                &name,
                ConstraintGroup::Bandwidth,
                expr,
                Comparison::LessOrEqual,
                edge.bandwidth as i64,
            );
        }
    }

    /// `uses = f0 · f1 · f2` as four linear inequalities.
    fn add_linearization(&mut self, name: &str, uses: VarId, factors: [VarId; 3]) {
        for (suffix, factor) in ["admit", "from", "to"].into_iter().zip(factors) {
            self.add_constraint(
                &format!("lin_{name}_{suffix}"),
                ConstraintGroup::Linearization,
                LinearExpr::var(uses).plus(factor, -1),
                Comparison::LessOrEqual,
                0,
            );
        }
        let all = factors
            .iter()
            .fold(LinearExpr::var(uses), |expr, f| expr.plus(*f, -1));
        self.add_constraint(
            &format!("lin_{name}_all"),
            ConstraintGroup::Linearization,
            all,
            Comparison::GreaterOrEqual,
            1 - factors.len() as i64,
        );
    }
}

/// Replaces characters LP readers reject and guards the leading character.
pub(crate) fn lp_identifier(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
