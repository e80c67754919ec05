//! Typed loading of schema documents from YAML or JSON.

use crate::ast::*;
use crate::emit::cpp::qualified_name;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{entity}: missing required field `{field}`")]
    MissingField { entity: String, field: &'static str },
    #[error("{entity}: {message}")]
    Malformed { entity: String, message: String },
}

/// Serialization format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    #[default]
    Yaml,
    Json,
}

impl SourceFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_str)
    }

    /// Guess the format from document content.
    pub fn detect(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{') => Self::Json,
            _ => Self::Yaml,
        }
    }
}

// Raw layer: required fields are optional here and checked on conversion.

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    geometry_definitions: Option<Vec<RawComposite>>,
    constraint_definitions: Option<Vec<RawComposite>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawComposite {
    classname: Option<String>,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    variables: Vec<String>,
    #[serde(default)]
    geoms: Vec<RawReference>,
    equations: Option<Vec<RawEquation>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReference {
    #[serde(rename = "type")]
    typ: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawVariables {
    Keyword(String),
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEquation {
    funcname: Option<String>,
    variables: Option<RawVariables>,
    #[serde(default)]
    ftor_args: Vec<RawFtorArg>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFtorArg {
    name: Option<String>,
}

/// Parse a schema document from text.
pub fn load_schema(source: &str, format: SourceFormat) -> Result<SchemaDocument, SchemaError> {
    let raw: RawDocument = match format {
        SourceFormat::Yaml => serde_yaml::from_str(source)?,
        SourceFormat::Json => serde_json::from_str(source)?,
    };
    raw.into_document()
}

/// Read and parse a schema file. Without an explicit format the file
/// extension decides, falling back to content sniffing.
pub fn load_schema_file(
    path: &Path,
    format: Option<SourceFormat>,
) -> Result<SchemaDocument, SchemaError> {
    let source = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let format = format
        .or_else(|| SourceFormat::from_path(path))
        .unwrap_or_else(|| SourceFormat::detect(&source));
    tracing::debug!(path = %path.display(), ?format, "loading schema");
    load_schema(&source, format)
}

impl RawDocument {
    fn into_document(self) -> Result<SchemaDocument, SchemaError> {
        let geometries = self.geometry_definitions.ok_or(SchemaError::MissingField {
            entity: "document".to_string(),
            field: "geometry_definitions",
        })?;
        let constraints = self.constraint_definitions.ok_or(SchemaError::MissingField {
            entity: "document".to_string(),
            field: "constraint_definitions",
        })?;

        let geometry_definitions = geometries
            .into_iter()
            .enumerate()
            .map(|(i, raw)| raw.into_geometry(i))
            .collect::<Result<Vec<_>, _>>()?;
        let constraint_definitions = constraints
            .into_iter()
            .enumerate()
            .map(|(i, raw)| raw.into_constraint(i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SchemaDocument {
            geometry_definitions,
            constraint_definitions,
        })
    }
}

impl RawComposite {
    /// Validated classname plus the qualified name used in diagnostics.
    fn identify(&self, list: &str, position: usize) -> Result<(String, String), SchemaError> {
        let classname = self.classname.clone().ok_or_else(|| SchemaError::MissingField {
            entity: format!("{list}[{position}]"),
            field: "classname",
        })?;
        if classname.is_empty() {
            return Err(SchemaError::Malformed {
                entity: format!("{list}[{position}]"),
                message: "classname must not be empty".to_string(),
            });
        }
        let entity = qualified_name(&self.namespace, &classname);
        if !self.namespace.is_empty() && self.namespace.split('.').any(str::is_empty) {
            return Err(SchemaError::Malformed {
                entity,
                message: format!("namespace `{}` has an empty segment", self.namespace),
            });
        }
        Ok((classname, entity))
    }

    fn references(
        geoms: Vec<RawReference>,
        entity: &str,
    ) -> Result<Vec<GeometryReference>, SchemaError> {
        geoms
            .into_iter()
            .map(|r| {
                let typ = r.typ.ok_or_else(|| SchemaError::MissingField {
                    entity: entity.to_string(),
                    field: "geoms.type",
                })?;
                let name = r.name.ok_or_else(|| SchemaError::MissingField {
                    entity: entity.to_string(),
                    field: "geoms.name",
                })?;
                Ok(GeometryReference { typ, name })
            })
            .collect()
    }

    fn into_geometry(self, position: usize) -> Result<GeometryDefinition, SchemaError> {
        let (classname, entity) = self.identify("geometry_definitions", position)?;
        if self.equations.is_some() {
            return Err(SchemaError::Malformed {
                entity,
                message: "geometries cannot declare equations".to_string(),
            });
        }
        Ok(GeometryDefinition {
            classname,
            namespace: self.namespace,
            variables: self.variables,
            geoms: Self::references(self.geoms, &entity)?,
        })
    }

    fn into_constraint(self, position: usize) -> Result<ConstraintDefinition, SchemaError> {
        let (classname, entity) = self.identify("constraint_definitions", position)?;
        let equations = self.equations.ok_or_else(|| SchemaError::MissingField {
            entity: entity.clone(),
            field: "equations",
        })?;
        if equations.is_empty() {
            return Err(SchemaError::Malformed {
                entity,
                message: "constraints need at least one equation".to_string(),
            });
        }
        let equations = equations
            .into_iter()
            .map(|eqn| eqn.into_usage(&entity))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ConstraintDefinition {
            classname,
            namespace: self.namespace,
            variables: self.variables,
            geoms: Self::references(self.geoms, &entity)?,
            equations,
        })
    }
}

impl RawEquation {
    fn into_usage(self, entity: &str) -> Result<EquationUsage, SchemaError> {
        let funcname = self.funcname.ok_or_else(|| SchemaError::MissingField {
            entity: entity.to_string(),
            field: "equations.funcname",
        })?;
        let variables = match self.variables {
            None => EquationVariables::All,
            Some(RawVariables::Keyword(k)) if k == "all" => EquationVariables::All,
            Some(RawVariables::Keyword(k)) => {
                return Err(SchemaError::Malformed {
                    entity: entity.to_string(),
                    message: format!(
                        "equation `{funcname}`: variables must be \"all\" or a list, got \"{k}\""
                    ),
                });
            }
            Some(RawVariables::List(list)) => EquationVariables::List(list),
        };
        let ftor_args = self
            .ftor_args
            .into_iter()
            .map(|arg| {
                arg.name
                    .map(|name| FtorArg { name })
                    .ok_or_else(|| SchemaError::MissingField {
                        entity: entity.to_string(),
                        field: "equations.ftor_args.name",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EquationUsage {
            funcname,
            variables,
            ftor_args,
        })
    }
}
