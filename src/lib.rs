//! Canvas Schema Pipeline
//!
//! A schema resolution and code-generation pipeline for the Canvas
//! application platform. The pipeline consumes JSON-Schema-like files
//! describing the configuration surface (pages, tables, automations,
//! connections) and produces three derived artifacts from one resolved
//! tree:
//!
//! - a fully dereferenced, cycle-safe schema tree (`resolver`)
//! - a per-property-path status/completion report against the currently
//!   implemented schema, bucketed into release phases (`diff`, `phases`)
//! - runtime-validation modules plus behavioral test scenarios that stay
//!   consistent with the same source tree (`codegen`, `blueprint`, `specs`)
//!
//! ## Data flow
//!
//! ```text
//! schema files -> resolver -> resolved tree -> traverse
//!                                  |-> diff -> phases
//!                                  |-> codegen -> blueprint
//!                                  |-> specs
//! ```
//!
//! The differ and the code generator are independent consumers of the same
//! resolved tree and never feed each other. Resolution is best-effort: a
//! `$ref` that cannot be resolved stays observable in the output instead of
//! failing the run.

pub mod blueprint;
pub mod codegen;
pub mod config;
pub mod diff;
pub mod error;
pub mod loader;
pub mod phases;
pub mod policy;
pub mod resolver;
pub mod schema;
pub mod specs;
pub mod traverse;

pub use blueprint::{BlueprintReport, BlueprintValidator, Severity, ValidationIssue};
pub use codegen::{generate_module, GeneratedModule};
pub use config::PipelineConfig;
pub use diff::{classify, diff_trees, summarize, DiffReport, PropertyStatus, Status};
pub use error::{PipelineError, Result};
pub use loader::{load_directory, SchemaBundle, SchemaSource};
pub use phases::{plan, Phase};
pub use resolver::Resolver;
pub use schema::{SchemaKind, SchemaNode};
pub use specs::{BehavioralScenario, PropertyScenarios, ScenarioTag, StoryParser};
pub use traverse::Traversal;
