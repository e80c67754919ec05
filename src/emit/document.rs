//! Assembly of emitted structs into the combined unit and per-namespace
//! headers.

use super::cpp;
use super::{CppEmitter, EmitError, Scope};
use crate::ast::{Composite, Definition, Role, SchemaDocument, namespace_segments};
use crate::index::TypeIndex;
use crate::resolve::ResolveError;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// One generated text unit and where it goes, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    pub combined: OutputFile,
    /// Namespace -> geometry header.
    pub geometry: BTreeMap<String, OutputFile>,
    /// Namespace -> constraints header.
    pub constraints: BTreeMap<String, OutputFile>,
}

impl GeneratedOutput {
    /// Combined unit first, then geometry headers, then constraint headers.
    pub fn files(&self) -> impl Iterator<Item = &OutputFile> {
        std::iter::once(&self.combined)
            .chain(self.geometry.values())
            .chain(self.constraints.values())
    }
}

/// Group entities by namespace. Groups appear in order of first occurrence
/// and keep declaration order inside.
pub fn group_by_namespace<T: Composite>(items: &[T]) -> Vec<(&str, Vec<&T>)> {
    let mut groups: Vec<(&str, Vec<&T>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(ns, _)| *ns == item.namespace()) {
            Some((_, members)) => members.push(item),
            None => groups.push((item.namespace(), vec![item])),
        }
    }
    groups
}

fn check_distinct_paths(output: &GeneratedOutput) -> Result<(), EmitError> {
    let units = std::iter::once(("combined unit".to_string(), &output.combined))
        .chain(output.geometry.iter().map(|(ns, f)| (format!("geometry of `{ns}`"), f)))
        .chain(output.constraints.iter().map(|(ns, f)| (format!("constraints of `{ns}`"), f)));

    let mut seen: HashMap<&Path, String> = HashMap::new();
    for (unit, file) in units {
        if let Some(first) = seen.get(file.path.as_path()) {
            return Err(EmitError::DuplicateOutput {
                path: file.path.display().to_string(),
                first: first.clone(),
                second: unit,
            });
        }
        seen.insert(file.path.as_path(), unit);
    }
    Ok(())
}

impl CppEmitter {
    /// Emit every unit for a schema. Nothing is returned unless every entity
    /// resolves and every unit has a path of its own.
    pub fn assemble(&self, schema: &SchemaDocument) -> Result<GeneratedOutput, EmitError> {
        let index = TypeIndex::from_schema(schema);

        let combined = OutputFile {
            path: PathBuf::from(&self.config.combined_output),
            contents: self.emit_combined(schema, &index)?,
        };

        let mut geometry = BTreeMap::new();
        for (namespace, group) in group_by_namespace(&schema.geometry_definitions) {
            let definitions: Vec<Definition> = group.into_iter().map(Definition::from).collect();
            let file = self.emit_namespace_file(namespace, Role::Geometry, &definitions, &index)?;
            geometry.insert(namespace.to_string(), file);
        }

        let mut constraints = BTreeMap::new();
        for (namespace, group) in group_by_namespace(&schema.constraint_definitions) {
            let definitions: Vec<Definition> = group.into_iter().map(Definition::from).collect();
            let file =
                self.emit_namespace_file(namespace, Role::Constraints, &definitions, &index)?;
            constraints.insert(namespace.to_string(), file);
        }

        let output = GeneratedOutput {
            combined,
            geometry,
            constraints,
        };
        check_distinct_paths(&output)?;

        tracing::info!(
            geometries = schema.geometry_definitions.len(),
            constraints = schema.constraint_definitions.len(),
            files = output.files().count(),
            "assembled schema"
        );

        Ok(output)
    }

    /// Single unit holding every geometry then every constraint, in
    /// document order.
    pub fn emit_combined(
        &self,
        schema: &SchemaDocument,
        index: &TypeIndex<'_>,
    ) -> Result<String, ResolveError> {
        let mut includes: Vec<String> = cpp::SYSTEM_INCLUDES
            .iter()
            .chain(cpp::SOLVER_INCLUDES)
            .map(|h| cpp::include_system(h))
            .collect();
        includes.push(String::new());
        includes.push(cpp::include_local(&self.config.core_include));

        let mut blocks = vec![includes.join("\n")];
        let definitions = schema
            .geometry_definitions
            .iter()
            .map(Definition::from)
            .chain(schema.constraint_definitions.iter().map(Definition::from));
        for definition in definitions {
            blocks.push(self.emit_struct(definition, index, Scope::Global)?);
        }

        Ok(blocks.join("\n\n") + "\n")
    }

    fn emit_namespace_file(
        &self,
        namespace: &str,
        role: Role,
        definitions: &[Definition<'_>],
        index: &TypeIndex<'_>,
    ) -> Result<OutputFile, ResolveError> {
        let guard = cpp::guard_token(self.config.guard_prefix.as_deref(), namespace, role);
        let segments = namespace_segments(namespace);

        let mut system: Vec<&str> = cpp::SYSTEM_INCLUDES.to_vec();
        if role == Role::Constraints {
            system.extend(cpp::SOLVER_INCLUDES);
        }
        let mut local = vec![cpp::include_local(&self.config.core_include)];
        for dependency in self.referenced_namespaces(namespace, role, definitions, index)? {
            let header =
                cpp::header_path(&dependency, Role::Geometry, &self.config.header_extension);
            local.push(cpp::include_local(&header));
        }

        let mut blocks = vec![
            format!("#ifndef {guard}\n#define {guard}"),
            system
                .iter()
                .map(|h| cpp::include_system(h))
                .collect::<Vec<_>>()
                .join("\n"),
            local.join("\n"),
        ];
        blocks.extend(segments.iter().map(|s| cpp::namespace_open(s)));
        for definition in definitions {
            blocks.push(self.emit_struct(*definition, index, Scope::Namespaced)?);
        }
        blocks.extend(segments.iter().rev().map(|s| cpp::namespace_close(s)));
        blocks.push(format!("#endif  // {guard}"));

        tracing::debug!(
            namespace,
            ?role,
            entities = definitions.len(),
            "assembled namespace header"
        );

        Ok(OutputFile {
            path: cpp::header_path(namespace, role, &self.config.header_extension).into(),
            contents: blocks.join("\n\n") + "\n",
        })
    }

    /// Namespaces whose geometry headers a unit must include. A geometry
    /// header never includes itself; a constraints header includes its own
    /// namespace's geometry header when it references it.
    fn referenced_namespaces(
        &self,
        namespace: &str,
        role: Role,
        definitions: &[Definition<'_>],
        index: &TypeIndex<'_>,
    ) -> Result<BTreeSet<String>, ResolveError> {
        let mut namespaces = BTreeSet::new();
        for definition in definitions {
            let entity = definition.composite();
            for reference in entity.geoms() {
                let geom = index.lookup(reference, entity)?;
                if role == Role::Geometry && geom.namespace == namespace {
                    continue;
                }
                namespaces.insert(geom.namespace.clone());
            }
        }
        Ok(namespaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::emit::fixtures::shapes;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_by_namespace_preserves_order() {
        let schema = shapes();
        let groups = group_by_namespace(&schema.constraint_definitions);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "gcs");
        assert_eq!(groups[1].0, "gcs.g2d");
        let names: Vec<&str> = groups[1].1.iter().map(|c| c.classname.as_str()).collect();
        assert_eq!(names, vec!["DistancePoints", "CoincidentPoints", "LineLength"]);
    }

    #[test]
    fn test_partition_is_complete() {
        let schema = shapes();
        let output = CppEmitter::default().assemble(&schema).unwrap();

        for geom in &schema.geometry_definitions {
            let hits = output
                .geometry
                .values()
                .filter(|f| {
                    f.contents
                        .contains(&format!("struct {} : gcs::Geometry {{", geom.classname))
                })
                .count();
            assert_eq!(hits, 1, "{}", geom.classname);
        }
        for constraint in &schema.constraint_definitions {
            let hits = output
                .constraints
                .values()
                .filter(|f| {
                    f.contents
                        .contains(&format!("struct {} : gcs::Constraint {{", constraint.classname))
                })
                .count();
            assert_eq!(hits, 1, "{}", constraint.classname);
        }
    }

    #[test]
    fn test_combined_order_and_preamble() {
        let schema = shapes();
        let output = CppEmitter::default().assemble(&schema).unwrap();
        let text = &output.combined.contents;

        assert_eq!(output.combined.path, PathBuf::from("gcs_definitions.h"));
        assert!(text.starts_with(
            "#include <vector>\n#include <ceres/ceres.h>\n#include <metal.h>\n\n#include \"gcs/core/core.h\"\n\n"
        ));

        let order = [
            "struct gcs::g2d::Point :",
            "struct gcs::g2d::Line :",
            "struct gcs::g2d::Circle :",
            "struct gcs::Empty :",
            "struct gcs::SetConstant :",
            "struct gcs::g2d::DistancePoints :",
            "struct gcs::g2d::CoincidentPoints :",
            "struct gcs::g2d::LineLength :",
        ];
        let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_namespace_geometry_header() {
        let schema = shapes();
        let output = CppEmitter::default().assemble(&schema).unwrap();
        let file = &output.geometry["gcs"];

        assert_eq!(file.path, PathBuf::from("gcs/geometry.h"));
        assert_eq!(
            file.contents,
            "\
#ifndef GCS_GEOMETRY
#define GCS_GEOMETRY

#include <vector>

#include \"gcs/core/core.h\"

namespace gcs {

struct Empty : gcs::Geometry {
    Empty() {}

    std::vector<gcs::Variable*> get_variables() {
        return {};
    }
};

}  // namespace gcs

#endif  // GCS_GEOMETRY
"
        );
    }

    #[test]
    fn test_nested_namespaces_open_and_close() {
        let schema = shapes();
        let output = CppEmitter::default().assemble(&schema).unwrap();
        let text = &output.geometry["gcs.g2d"].contents;

        let open_gcs = text.find("namespace gcs {").unwrap();
        let open_g2d = text.find("namespace g2d {").unwrap();
        let close_g2d = text.find("}  // namespace g2d").unwrap();
        let close_gcs = text.find("}  // namespace gcs").unwrap();
        assert!(open_gcs < open_g2d && open_g2d < close_g2d && close_g2d < close_gcs);
        assert!(text.starts_with("#ifndef GCS_G2D_GEOMETRY\n#define GCS_G2D_GEOMETRY\n"));
        assert!(text.ends_with("#endif  // GCS_G2D_GEOMETRY\n"));
        // Same-namespace references need no extra include.
        assert!(!text.contains("#include \"gcs/g2d/geometry.h\""));
    }

    #[test]
    fn test_constraint_header_includes() {
        let schema = shapes();
        let output = CppEmitter::default().assemble(&schema).unwrap();
        let text = &output.constraints["gcs.g2d"].contents;

        assert_eq!(output.constraints["gcs.g2d"].path, PathBuf::from("gcs/g2d/constraints.h"));
        assert!(text.contains("#include <ceres/ceres.h>\n#include <metal.h>"));
        assert!(text.contains("#include \"gcs/g2d/geometry.h\""));
        assert!(text.contains("#ifndef GCS_G2D_CONSTRAINTS"));

        let set_constant = &output.constraints["gcs"].contents;
        assert!(!set_constant.contains("geometry.h"));
    }

    #[test]
    fn test_no_file_for_empty_role() {
        let mut schema = shapes();
        schema.constraint_definitions.retain(|c| c.namespace == "gcs.g2d");
        let output = CppEmitter::default().assemble(&schema).unwrap();

        assert!(output.geometry.contains_key("gcs"));
        assert!(!output.constraints.contains_key("gcs"));
        assert_eq!(output.files().count(), 1 + 2 + 1);
    }

    #[test]
    fn test_guard_prefix_and_extension() {
        let schema = shapes();
        let config = GeneratorConfig {
            guard_prefix: Some("GCS_LIB_INCLUDE".to_string()),
            header_extension: "hpp".to_string(),
            ..Default::default()
        };
        let output = CppEmitter::new(config).assemble(&schema).unwrap();
        let file = &output.geometry["gcs.g2d"];

        assert_eq!(file.path, PathBuf::from("gcs/g2d/geometry.hpp"));
        assert!(file.contents.contains("#define GCS_LIB_INCLUDE_GCS_G2D_GEOMETRY"));
        let constraints = &output.constraints["gcs.g2d"].contents;
        assert!(constraints.contains("#include \"gcs/g2d/geometry.hpp\""));
    }

    #[test]
    fn test_cross_namespace_geometry_include() {
        let schema = crate::loader::load_schema(
            r#"
geometry_definitions:
  - { classname: Point, namespace: gcs.g2d, variables: [x, y] }
  - classname: Segment
    namespace: gcs.g3d
    variables: [z]
    geoms: [{ type: gcs.g2d.Point, name: base }]
constraint_definitions: []
"#,
            crate::loader::SourceFormat::Yaml,
        )
        .unwrap();
        let output = CppEmitter::default().assemble(&schema).unwrap();

        assert!(output.geometry["gcs.g3d"].contents.contains("#include \"gcs/g2d/geometry.h\""));
        assert!(output.constraints.is_empty());
    }

    #[test]
    fn test_empty_namespace_has_no_blocks() {
        let schema = crate::loader::load_schema(
            "geometry_definitions: [{ classname: Scalar, variables: [v] }]\nconstraint_definitions: []\n",
            crate::loader::SourceFormat::Yaml,
        )
        .unwrap();
        let output = CppEmitter::default().assemble(&schema).unwrap();
        let file = &output.geometry[""];

        assert_eq!(file.path, PathBuf::from("geometry.h"));
        assert!(!file.contents.contains("namespace"));
        assert!(file.contents.contains("#ifndef GEOMETRY"));
    }

    #[test]
    fn test_unknown_type_aborts_assembly() {
        let schema = crate::loader::load_schema(
            r#"
geometry_definitions: []
constraint_definitions:
  - classname: Orphan
    namespace: gcs
    geoms: [{ type: gcs.Missing, name: m }]
    equations: [{ funcname: f }]
"#,
            crate::loader::SourceFormat::Yaml,
        )
        .unwrap();
        let err = CppEmitter::default().assemble(&schema).unwrap_err();

        assert_eq!(
            err,
            EmitError::Resolve(ResolveError::UnknownGeometryType {
                entity: "gcs::Orphan".to_string(),
                type_name: "gcs.Missing".to_string(),
            })
        );
    }

    #[test]
    fn test_namespaces_sharing_a_header_path_are_rejected() {
        let mut schema = shapes();
        // Built by hand; the loader refuses empty namespace segments.
        let mut twin = schema.geometry_definitions[3].clone();
        twin.classname = "Twin".to_string();
        twin.namespace = "gcs.".to_string();
        schema.geometry_definitions.push(twin);

        let err = CppEmitter::default().assemble(&schema).unwrap_err();
        assert_eq!(
            err,
            EmitError::DuplicateOutput {
                path: "gcs/geometry.h".to_string(),
                first: "geometry of `gcs`".to_string(),
                second: "geometry of `gcs.`".to_string(),
            }
        );
    }

    #[test]
    fn test_combined_output_clashing_with_header_is_rejected() {
        let schema = crate::loader::load_schema(
            "geometry_definitions: [{ classname: Scalar, variables: [v] }]\nconstraint_definitions: []\n",
            crate::loader::SourceFormat::Yaml,
        )
        .unwrap();
        let config = GeneratorConfig {
            combined_output: "geometry.h".to_string(),
            ..Default::default()
        };

        let err = CppEmitter::new(config).assemble(&schema).unwrap_err();
        assert!(matches!(
            &err,
            EmitError::DuplicateOutput { path, first, .. }
                if path == "geometry.h" && first == "combined unit"
        ));
    }
}
