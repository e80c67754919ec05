//! C++ syntax helpers for the gcs/ceres target.

use crate::ast::{Role, namespace_segments};

pub const SCOPE_SEPARATOR: &str = "::";
pub const VARIABLE_TYPE: &str = "gcs::Variable";
pub const CONSTANT_TYPE: &str = "double";
pub const PROBLEM_TYPE: &str = "ceres::Problem";

pub const SYSTEM_INCLUDES: &[&str] = &["vector"];
pub const SOLVER_INCLUDES: &[&str] = &["ceres/ceres.h", "metal.h"];

pub fn base_type(role: Role) -> &'static str {
    match role {
        Role::Geometry => "gcs::Geometry",
        Role::Constraints => "gcs::Constraint",
    }
}

/// `gcs.g2d` + `Point` -> `gcs::g2d::Point`.
pub fn qualified_name(namespace: &str, classname: &str) -> String {
    let mut parts = namespace_segments(namespace);
    parts.push(classname);
    parts.join(SCOPE_SEPARATOR)
}

/// How a struct holds its geometry and variable members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Owned by value (geometries).
    Value,
    /// Borrowed through a pointer set from a reference parameter (constraints).
    Pointer,
}

impl Binding {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Geometry => Binding::Value,
            Role::Constraints => Binding::Pointer,
        }
    }

    pub fn field(self, ty: &str, name: &str) -> String {
        match self {
            Binding::Value => format!("{ty} {name};"),
            Binding::Pointer => format!("{ty}* {name};"),
        }
    }

    pub fn parameter(self, ty: &str, name: &str) -> String {
        match self {
            Binding::Value => format!("{ty} {name}"),
            Binding::Pointer => format!("{ty}& {name}"),
        }
    }

    pub fn initializer(self, name: &str) -> String {
        match self {
            Binding::Value => format!("{name}{{{name}}}"),
            Binding::Pointer => format!("{name}{{&{name}}}"),
        }
    }
}

/// Address expression for a dotted variable path. Paths that cross a
/// geometry member go through that member; own variables are addressed
/// directly.
pub fn address_of(path: &str, binding: Binding) -> String {
    match path.split_once('.') {
        Some((member, rest)) => match binding {
            Binding::Value => format!("&{member}.{rest}"),
            Binding::Pointer => format!("&{member}->{rest}"),
        },
        None => format!("&{path}"),
    }
}

/// Accessor expression for a dotted variable path. Own variables of a
/// pointer-bound struct already hold the address.
pub fn variable_pointer(path: &str, binding: Binding) -> String {
    match (path.contains('.'), binding) {
        (false, Binding::Pointer) => path.to_string(),
        _ => address_of(path, binding),
    }
}

pub fn include_system(header: &str) -> String {
    format!("#include <{header}>")
}

pub fn include_local(header: &str) -> String {
    format!("#include \"{header}\"")
}

pub fn namespace_open(segment: &str) -> String {
    format!("namespace {segment} {{")
}

pub fn namespace_close(segment: &str) -> String {
    format!("}}  // namespace {segment}")
}

/// Include guard token: `[prefix_]SEG1_SEG2_ROLE`, uppercased.
pub fn guard_token(prefix: Option<&str>, namespace: &str, role: Role) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
        parts.push(prefix);
    }
    parts.extend(namespace_segments(namespace));
    parts.push(role.guard_suffix());

    parts
        .join("_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

/// Relative header path for a namespace/role pair, `/`-separated.
pub fn header_path(namespace: &str, role: Role, extension: &str) -> String {
    let mut parts = namespace_segments(namespace);
    let file = format!("{}.{}", role.file_stem(), extension);
    parts.push(&file);
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        assert_eq!(qualified_name("gcs.g2d", "Point"), "gcs::g2d::Point");
        assert_eq!(qualified_name("", "Point"), "Point");
    }

    #[test]
    fn test_address_of() {
        assert_eq!(address_of("radius", Binding::Value), "&radius");
        assert_eq!(address_of("radius", Binding::Pointer), "&radius");
        assert_eq!(address_of("p1.x", Binding::Value), "&p1.x");
        assert_eq!(address_of("p1.x", Binding::Pointer), "&p1->x");
        assert_eq!(address_of("line.p1.x", Binding::Pointer), "&line->p1.x");
    }

    #[test]
    fn test_variable_pointer() {
        assert_eq!(variable_pointer("radius", Binding::Value), "&radius");
        assert_eq!(variable_pointer("d", Binding::Pointer), "d");
        assert_eq!(variable_pointer("p1.x", Binding::Pointer), "&p1->x");
        assert_eq!(variable_pointer("p1.x", Binding::Value), "&p1.x");
    }

    #[test]
    fn test_binding_rendering() {
        assert_eq!(Binding::Value.field("gcs::g2d::Point", "p1"), "gcs::g2d::Point p1;");
        assert_eq!(Binding::Pointer.field("gcs::Variable", "d"), "gcs::Variable* d;");
        assert_eq!(Binding::Pointer.parameter("gcs::Variable", "d"), "gcs::Variable& d");
        assert_eq!(Binding::Value.initializer("x"), "x{x}");
        assert_eq!(Binding::Pointer.initializer("x"), "x{&x}");
    }

    #[test]
    fn test_guard_token() {
        assert_eq!(guard_token(None, "gcs.g2d", Role::Geometry), "GCS_G2D_GEOMETRY");
        assert_eq!(
            guard_token(Some("gcs_lib-include"), "gcs", Role::Constraints),
            "GCS_LIB_INCLUDE_GCS_CONSTRAINTS"
        );
        assert_eq!(guard_token(Some(""), "", Role::Geometry), "GEOMETRY");
    }

    #[test]
    fn test_header_path() {
        assert_eq!(header_path("gcs.g2d", Role::Geometry, "h"), "gcs/g2d/geometry.h");
        assert_eq!(header_path("", Role::Constraints, "hpp"), "constraints.hpp");
    }
}
