use crate::ast::{Composite, GeometryDefinition, GeometryReference, SchemaDocument};
use crate::emit::cpp::qualified_name;
use crate::resolve::ResolveError;
use std::collections::HashMap;

/// Lookup from dotted type key to geometry definition, built once per run.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex<'a> {
    geometries: HashMap<String, &'a GeometryDefinition>,
}

impl<'a> TypeIndex<'a> {
    pub fn from_schema(schema: &'a SchemaDocument) -> Self {
        let mut geometries = HashMap::new();
        for geom in &schema.geometry_definitions {
            let key = geom.type_key();
            if geometries.insert(key.clone(), geom).is_some() {
                tracing::warn!(type_key = %key, "duplicate geometry definition, last one wins");
            }
        }
        Self { geometries }
    }

    pub fn get(&self, type_key: &str) -> Option<&'a GeometryDefinition> {
        self.geometries.get(type_key).copied()
    }

    /// Resolve a reference made by `owner`, failing with the owner's name.
    pub fn lookup(
        &self,
        reference: &GeometryReference,
        owner: &(impl Composite + ?Sized),
    ) -> Result<&'a GeometryDefinition, ResolveError> {
        self.get(&reference.typ)
            .ok_or_else(|| ResolveError::UnknownGeometryType {
                entity: qualified_name(owner.namespace(), owner.classname()),
                type_name: reference.typ.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}
