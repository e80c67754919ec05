//! Flattening of nested geometry members into dotted variable paths.
//!
//! The resolved order (geometry members depth-first in declaration order,
//! then own variables) is what ties together constructor parameters,
//! accessor lists, functor inputs and registration addresses.
//!
//! Cyclic geometry graphs are not detected and recurse until the stack is
//! exhausted. Duplicate member names are passed through unchanged.

use crate::ast::{Composite, ConstraintDefinition, EquationUsage, EquationVariables};
use crate::index::TypeIndex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("{entity}: unknown geometry type `{type_name}`")]
    UnknownGeometryType { entity: String, type_name: String },
}

/// Every variable reachable from `entity`, as dotted paths.
pub fn resolve_variables(
    entity: &(impl Composite + ?Sized),
    index: &TypeIndex<'_>,
) -> Result<Vec<String>, ResolveError> {
    let mut paths = Vec::new();
    for reference in entity.geoms() {
        let geom = index.lookup(reference, entity)?;
        paths.extend(
            resolve_variables(geom, index)?
                .into_iter()
                .map(|path| format!("{}.{}", reference.name, path)),
        );
    }
    paths.extend(entity.variables().iter().cloned());
    Ok(paths)
}

/// Variables an equation is applied to, in functor input order.
pub fn equation_variables(
    equation: &EquationUsage,
    constraint: &ConstraintDefinition,
    index: &TypeIndex<'_>,
) -> Result<Vec<String>, ResolveError> {
    match &equation.variables {
        EquationVariables::All => resolve_variables(constraint, index),
        EquationVariables::List(list) => Ok(list.clone()),
    }
}

/// Turn a dotted path into a flat identifier (`a.b.c` -> `a_b_c`).
///
/// Lossy: `a.b_c` and `a_b.c` collapse to the same identifier.
pub fn flatten_identifier(path: &str) -> String {
    path.replace('.', "_")
}
