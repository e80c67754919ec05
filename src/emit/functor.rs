use super::CppEmitter;
use super::cpp::{self, Binding};
use crate::ast::{ConstraintDefinition, EquationUsage};
use crate::index::TypeIndex;
use crate::resolve::{ResolveError, equation_variables, flatten_identifier};

impl CppEmitter {
    /// Render the functor wrapping one equation of `constraint`. Inputs are
    /// the equation's variables in resolution order, followed by the
    /// constant arguments baked into the functor. `suffix` names the struct
    /// (`Functor_{suffix}`) and defaults to the equation's function name.
    pub fn emit_functor(
        &self,
        equation: &EquationUsage,
        constraint: &ConstraintDefinition,
        index: &TypeIndex<'_>,
        suffix: Option<&str>,
    ) -> Result<String, ResolveError> {
        let inputs: Vec<String> = equation_variables(equation, constraint, index)?
            .iter()
            .map(|path| flatten_identifier(path))
            .collect();
        let suffix = suffix.unwrap_or(&equation.funcname);
        let outer = self.metrics.pad(1);
        let inner = self.metrics.pad(2);
        let body = self.metrics.pad(3);

        let mut params: Vec<String> = inputs.iter().map(|v| format!("const T* {v}")).collect();
        params.push("T* r".to_string());

        let mut args: Vec<String> = inputs.iter().map(|v| format!("*{v}")).collect();
        args.extend(equation.ftor_args.iter().map(|arg| arg.name.clone()));

        let mut lines = vec![
            format!("{outer}struct Functor_{suffix} {{"),
            format!("{inner}static const metal::int_ num_params = {};", inputs.len()),
        ];
        for arg in &equation.ftor_args {
            lines.push(format!("{}{} {};", inner, cpp::CONSTANT_TYPE, arg.name));
        }
        lines.push(String::new());
        lines.push(format!("{inner}template <typename T>"));
        lines.push(self.metrics.wrap_list(2, "bool operator()(", &params, ") const {"));
        lines.push(self.metrics.wrap_list(3, &format!("*r = {}(", equation.funcname), &args, ");"));
        lines.push(format!("{body}return true;"));
        lines.push(format!("{inner}}}"));
        lines.push(format!("{outer}}};"));

        Ok(lines.join("\n"))
    }

    /// Render the statement registering `Functor_{suffix}` with the problem,
    /// bound to the addresses of the same variables, in the same order, as
    /// the functor's inputs.
    pub fn emit_registration(
        &self,
        equation: &EquationUsage,
        constraint: &ConstraintDefinition,
        index: &TypeIndex<'_>,
        suffix: Option<&str>,
    ) -> Result<String, ResolveError> {
        let suffix = suffix.unwrap_or(&equation.funcname);
        let constants: Vec<&str> = equation.ftor_args.iter().map(|arg| arg.name.as_str()).collect();

        let mut items = vec![
            format!(
                "gcs::create_scalar_autodiff(new Functor_{}{{{}}})",
                suffix,
                constants.join(", ")
            ),
            "nullptr".to_string(),
        ];
        items.extend(
            equation_variables(equation, constraint, index)?
                .iter()
                .map(|path| cpp::address_of(path, Binding::Pointer)),
        );

        Ok(self.metrics.break_list(2, "problem.AddResidualBlock(", &items, ");"))
    }
}
