//! In-memory schema model for geometry and constraint definitions.
//!
//! The model is immutable once the loader hands it over; everything here is
//! plain data plus a few derived accessors.

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub geometry_definitions: Vec<GeometryDefinition>,
    pub constraint_definitions: Vec<ConstraintDefinition>,
}

/// A member of a geometry or constraint that owns another geometry instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryReference {
    /// Dotted type key of the referenced geometry, e.g. `gcs.g2d.Point`.
    pub typ: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDefinition {
    pub classname: String,
    pub namespace: String,
    pub variables: Vec<String>,
    pub geoms: Vec<GeometryReference>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtorArg {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EquationVariables {
    /// Every resolved variable of the owning constraint, in resolution order.
    #[default]
    All,
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquationUsage {
    pub funcname: String,
    pub variables: EquationVariables,
    pub ftor_args: Vec<FtorArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDefinition {
    pub classname: String,
    pub namespace: String,
    pub variables: Vec<String>,
    pub geoms: Vec<GeometryReference>,
    pub equations: Vec<EquationUsage>,
}

/// Shared shape of geometries and constraints: scalar variables plus nested
/// geometry members.
pub trait Composite {
    fn classname(&self) -> &str;
    fn namespace(&self) -> &str;
    fn variables(&self) -> &[String];
    fn geoms(&self) -> &[GeometryReference];

    /// Key under which geometries are indexed and referenced.
    fn type_key(&self) -> String {
        if self.namespace().is_empty() {
            self.classname().to_string()
        } else {
            format!("{}.{}", self.namespace(), self.classname())
        }
    }

    fn namespace_segments(&self) -> Vec<&str> {
        namespace_segments(self.namespace())
    }
}

impl Composite for GeometryDefinition {
    fn classname(&self) -> &str {
        &self.classname
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn variables(&self) -> &[String] {
        &self.variables
    }

    fn geoms(&self) -> &[GeometryReference] {
        &self.geoms
    }
}

impl Composite for ConstraintDefinition {
    fn classname(&self) -> &str {
        &self.classname
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn variables(&self) -> &[String] {
        &self.variables
    }

    fn geoms(&self) -> &[GeometryReference] {
        &self.geoms
    }
}

/// Which kind of generated unit an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Geometry,
    Constraints,
}

impl Role {
    /// Suffix used in include guards.
    pub fn guard_suffix(self) -> &'static str {
        match self {
            Role::Geometry => "GEOMETRY",
            Role::Constraints => "CONSTRAINTS",
        }
    }

    /// Stem of the per-namespace header file.
    pub fn file_stem(self) -> &'static str {
        match self {
            Role::Geometry => "geometry",
            Role::Constraints => "constraints",
        }
    }
}

/// A borrowed geometry or constraint, for code paths that handle both.
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    Geometry(&'a GeometryDefinition),
    Constraint(&'a ConstraintDefinition),
}

impl<'a> Definition<'a> {
    pub fn role(&self) -> Role {
        match self {
            Definition::Geometry(_) => Role::Geometry,
            Definition::Constraint(_) => Role::Constraints,
        }
    }

    pub fn composite(&self) -> &'a dyn Composite {
        match *self {
            Definition::Geometry(g) => g,
            Definition::Constraint(c) => c,
        }
    }
}

impl<'a> From<&'a GeometryDefinition> for Definition<'a> {
    fn from(geometry: &'a GeometryDefinition) -> Self {
        Definition::Geometry(geometry)
    }
}

impl<'a> From<&'a ConstraintDefinition> for Definition<'a> {
    fn from(constraint: &'a ConstraintDefinition) -> Self {
        Definition::Constraint(constraint)
    }
}

/// Split a dotted namespace into its non-empty segments.
pub fn namespace_segments(namespace: &str) -> Vec<&str> {
    namespace.split('.').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(namespace: &str) -> GeometryDefinition {
        GeometryDefinition {
            classname: "Point".to_string(),
            namespace: namespace.to_string(),
            variables: vec!["x".to_string(), "y".to_string()],
            geoms: vec![],
        }
    }

    #[test]
    fn test_type_key_with_namespace() {
        assert_eq!(point("gcs.g2d").type_key(), "gcs.g2d.Point");
    }

    #[test]
    fn test_type_key_without_namespace() {
        assert_eq!(point("").type_key(), "Point");
    }

    #[test]
    fn test_namespace_segments_skip_empty() {
        assert_eq!(namespace_segments("gcs..g2d"), vec!["gcs", "g2d"]);
        assert!(namespace_segments("").is_empty());
    }

    #[test]
    fn test_definition_role() {
        let p = point("gcs");
        let def: Definition = (&p).into();
        assert_eq!(def.role(), Role::Geometry);
        assert_eq!(def.composite().classname(), "Point");
    }
}
