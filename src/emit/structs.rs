use super::cpp::{self, Binding};
use super::{CppEmitter, Scope};
use crate::ast::Definition;
use crate::index::TypeIndex;
use crate::resolve::{ResolveError, resolve_variables};

/// One constructor parameter and the field it initializes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
    ty: String,
    name: String,
    binding: Binding,
}

impl CppEmitter {
    /// Render a geometry or constraint as a struct with fields, a
    /// constructor and a `get_variables()` accessor. Constraints also carry
    /// one functor per equation and an `add_to_problem()` method.
    pub fn emit_struct(
        &self,
        definition: Definition<'_>,
        index: &TypeIndex<'_>,
        scope: Scope,
    ) -> Result<String, ResolveError> {
        let entity = definition.composite();
        let role = definition.role();
        let binding = Binding::for_role(role);
        let members = members(definition, index)?;
        let pad = self.metrics.pad(1);

        tracing::debug!(
            entity = %entity.type_key(),
            ?role,
            members = members.len(),
            "emitting struct"
        );

        let header_name = match scope {
            Scope::Global => cpp::qualified_name(entity.namespace(), entity.classname()),
            Scope::Namespaced => entity.classname().to_string(),
        };

        let mut lines = vec![format!("struct {} : {} {{", header_name, cpp::base_type(role))];
        for member in &members {
            lines.push(format!("{}{}", pad, member.binding.field(&member.ty, &member.name)));
        }
        if !members.is_empty() {
            lines.push(String::new());
        }

        lines.push(self.constructor(entity.classname(), &members));
        lines.push(String::new());

        let addresses: Vec<String> = resolve_variables(entity, index)?
            .iter()
            .map(|path| cpp::variable_pointer(path, binding))
            .collect();
        lines.push(format!("{}std::vector<{}*> get_variables() {{", pad, cpp::VARIABLE_TYPE));
        lines.push(self.metrics.wrap_list(2, "return {", &addresses, "};"));
        lines.push(format!("{pad}}}"));

        if let Definition::Constraint(constraint) = definition {
            for (i, equation) in constraint.equations.iter().enumerate() {
                lines.push(String::new());
                let suffix = i.to_string();
                let functor = self.emit_functor(equation, constraint, index, Some(&*suffix))?;
                lines.push(functor);
            }

            lines.push(String::new());
            lines.push(format!("{}void add_to_problem({}& problem) {{", pad, cpp::PROBLEM_TYPE));
            for (i, equation) in constraint.equations.iter().enumerate() {
                let suffix = i.to_string();
                lines.push(self.emit_registration(equation, constraint, index, Some(&*suffix))?);
            }
            lines.push(format!("{pad}}}"));
        }

        lines.push("};".to_string());
        Ok(lines.join("\n"))
    }

    fn constructor(&self, classname: &str, members: &[Member]) -> String {
        if members.is_empty() {
            return format!("{}{}() {{}}", self.metrics.pad(1), classname);
        }

        let params: Vec<String> = members
            .iter()
            .map(|m| m.binding.parameter(&m.ty, &m.name))
            .collect();
        let inits: Vec<String> = members.iter().map(|m| m.binding.initializer(&m.name)).collect();

        format!(
            "{}\n{}",
            self.metrics.wrap_list(1, &format!("{classname}("), &params, ")"),
            self.metrics.wrap_list(2, ": ", &inits, " {}")
        )
    }
}

/// Fields in constructor order: geometry members, own variables, then (for
/// constraints) the constant arguments of every equation.
fn members(
    definition: Definition<'_>,
    index: &TypeIndex<'_>,
) -> Result<Vec<Member>, ResolveError> {
    let entity = definition.composite();
    let binding = Binding::for_role(definition.role());
    let mut members = Vec::new();

    for reference in entity.geoms() {
        let geom = index.lookup(reference, entity)?;
        members.push(Member {
            ty: cpp::qualified_name(&geom.namespace, &geom.classname),
            name: reference.name.clone(),
            binding,
        });
    }
    for variable in entity.variables() {
        members.push(Member {
            ty: cpp::VARIABLE_TYPE.to_string(),
            name: variable.clone(),
            binding,
        });
    }
    if let Definition::Constraint(constraint) = definition {
        for arg in constraint.equations.iter().flat_map(|eqn| &eqn.ftor_args) {
            members.push(Member {
                ty: cpp::CONSTANT_TYPE.to_string(),
                name: arg.name.clone(),
                binding: Binding::Value,
            });
        }
    }

    Ok(members)
}
