//! CPLEX LP text export.
//!
//! The full model is written by [`write_lp`]; [`write_lp_subset`] writes the
//! same objective over a chosen constraint subset, which is how conflict
//! sets are exported (conventionally to an `.ilp` file).


use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::constraint::{Constraint, ConstraintId};
use crate::error::ModelError;
use crate::expr::LinearExpr;
use crate::model::DecisionModel;
use crate::variable::VarId;

const TERMS_PER_LINE: usize = 8;

/// Writes the whole model.
pub fn write_lp<W: Write>(model: &DecisionModel, writer: W) -> Result<(), ModelError> {
    let all: Vec<ConstraintId> = model.constraints().iter().map(|c| c.id).collect();
    write_lp_subset(model, &all, writer)
}

/// Writes the objective and the constraints in `subset`, in the given order.
///
/// # Errors
///
/// Returns [`ModelError::UnknownConstraint`] for an id the model lacks, and
/// [`ModelError::Io`] if writing fails.
pub fn write_lp_subset<W: Write>(
    model: &DecisionModel,
    subset: &[ConstraintId],
    mut writer: W,
) -> Result<(), ModelError> {
    let constraints: Vec<&Constraint> = subset
        .iter()
        .map(|id| {
            model
                .constraints()
                .get(id.index())
                .ok_or(ModelError::UnknownConstraint(id.index()))
        })
        .collect::<Result<_, _>>()?;

    let mut binaries: BTreeSet<VarId> = model.objective().terms().iter().map(|(v, _)| *v).collect();
    for constraint in &constraints {
        binaries.extend(constraint.expr.terms().iter().map(|(v, _)| *v));
    }
    let placeholder = binaries.iter().next().copied();

    writeln!(
        writer,
        "\\ sfcplace model: {} variables, {} constraints",
        binaries.len(),
        constraints.len()
    )?;
    writeln!(writer, "Maximize")?;
    write!(writer, " obj:")?;
    write_expr(model, model.objective(), placeholder, &mut writer)?;
    writeln!(writer)?;

    writeln!(writer, "Subject To")?;
    for constraint in constraints {
        write!(writer, " {}:", constraint.name)?;
        write_expr(model, &constraint.expr, placeholder, &mut writer)?;
        writeln!(writer, " {} {}", constraint.comparison.as_lp(), constraint.rhs)?;
    }

    writeln!(writer, "Binaries")?;
    for chunk in binaries.iter().collect::<Vec<_>>().chunks(TERMS_PER_LINE) {
        let names: Vec<&str> = chunk
            .iter()
            .map(|v| model.variable(**v).name.as_str())
            .collect();
        writeln!(writer, " {}", names.join(" "))?;
    }
    writeln!(writer, "End")?;
    writer.flush()?;
    Ok(())
}

/// Writes the whole model to `path`.
pub fn save_lp(model: &DecisionModel, path: impl AsRef<Path>) -> Result<(), ModelError> {
    write_lp(model, BufWriter::new(File::create(path)?))
}

/// Writes a constraint subset of the model to `path`.
pub fn save_lp_subset(
    model: &DecisionModel,
    subset: &[ConstraintId],
    path: impl AsRef<Path>,
) -> Result<(), ModelError> {
    write_lp_subset(model, subset, BufWriter::new(File::create(path)?))
}

fn write_expr<W: Write>(
    model: &DecisionModel,
    expr: &LinearExpr,
    placeholder: Option<VarId>,
    writer: &mut W,
) -> Result<(), ModelError> {
    if expr.is_empty() {
        // LP readers need a variable on every row.
        if let Some(var) = placeholder {
            write!(writer, " 0 {}", model.variable(var).name)?;
        }
        return Ok(());
    }
    for (i, (var, coefficient)) in expr.terms().iter().enumerate() {
        if i > 0 && i % TERMS_PER_LINE == 0 {
            write!(writer, "\n  ")?;
        }
        let sign = if *coefficient < 0 { "-" } else { "+" };
        let magnitude = coefficient.unsigned_abs();
        let name = &model.variable(*var).name;
        match (i, magnitude) {
            (0, 1) if *coefficient > 0 => write!(writer, " {name}")?,
            (0, m) if *coefficient > 0 => write!(writer, " {m} {name}")?,
            (_, 1) => write!(writer, " {sign} {name}")?,
            (_, m) => write!(writer, " {sign} {m} {name}")?,
        }
    }
    Ok(())
}
