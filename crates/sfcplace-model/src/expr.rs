//! Linear expressions over binary variables.

use crate::variable::VarId;

/// `Σ coefficient · variable`, integer coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// `1 · var`.
    pub fn var(var: VarId) -> Self {
        Self {
            terms: vec![(var, 1)],
        }
    }

    /// `Σ 1 · var` over `vars`.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
        }
    }

    /// Adds `coefficient · var`; zero coefficients are dropped.
    pub fn add_term(&mut self, var: VarId, coefficient: i64) {
        if coefficient != 0 {
            self.terms.push((var, coefficient));
        }
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn plus(mut self, var: VarId, coefficient: i64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Evaluates the expression for a complete 0/1 assignment.
    pub fn evaluate(&self, value: impl Fn(VarId) -> bool) -> i64 {
        self.terms
            .iter()
            .filter(|(var, _)| value(*var))
            .map(|(_, coefficient)| *coefficient)
            .sum()
    }

    /// Smallest value any 0/1 assignment can give.
    pub fn min_value(&self) -> i64 {
        self.terms.iter().map(|(_, c)| (*c).min(0)).sum()
    }

    /// Largest value any 0/1 assignment can give.
    pub fn max_value(&self) -> i64 {
        self.terms.iter().map(|(_, c)| (*c).max(0)).sum()
    }
}
