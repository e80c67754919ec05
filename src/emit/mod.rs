//! C++ emission for geometry and constraint definitions.

pub mod cpp;
mod document;
mod functor;
mod structs;

pub use document::{GeneratedOutput, OutputFile, group_by_namespace};

use crate::config::GeneratorConfig;
use crate::measure::LineMetrics;
use crate::resolve::ResolveError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("{path} would be written twice ({first}, {second})")]
    DuplicateOutput {
        path: String,
        first: String,
        second: String,
    },
}

/// Where an emitted struct is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top level of the combined unit; the header names the full path.
    Global,
    /// Inside the entity's own namespace blocks.
    Namespaced,
}

/// Renders schema entities as C++ source for the gcs/ceres runtime.
pub struct CppEmitter {
    metrics: LineMetrics,
    config: GeneratorConfig,
}

impl Default for CppEmitter {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl CppEmitter {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            metrics: config.metrics(),
            config,
        }
    }
}
