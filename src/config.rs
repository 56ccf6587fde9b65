//! Configuration for the schema pipeline
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (canvas-schemas.toml)
//! - Environment variables (CANVAS_*)
//!
//! ## Example config file (canvas-schemas.toml):
//! ```toml
//! [schemas]
//! vision_dir = "./schemas/vision"
//! current_dir = "./schemas/current"
//! root_file = "app.schema.json"
//!
//! [codegen]
//! output_dir = "./generated"
//!
//! [planner]
//! package_version = "0.4.0"
//! critical_properties = ["tables", "pages", "automations", "connections"]
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::policy;

/// Main configuration for the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Schema locations
    #[serde(default)]
    pub schemas: SchemasConfig,

    /// Code generation settings
    #[serde(default)]
    pub codegen: CodegenConfig,

    /// Phase planner settings
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Schema location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemasConfig {
    /// Directory holding the target ("vision") schema files
    pub vision_dir: PathBuf,
    /// Directory holding the currently implemented schema files
    pub current_dir: PathBuf,
    /// Root schema file name within each directory
    pub root_file: String,
}

impl Default for SchemasConfig {
    fn default() -> Self {
        Self {
            vision_dir: PathBuf::from("./schemas/vision"),
            current_dir: PathBuf::from("./schemas/current"),
            root_file: "app.schema.json".to_string(),
        }
    }
}

/// Code generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Directory generated modules are written to
    pub output_dir: PathBuf,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./generated"),
        }
    }
}

/// Phase planner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Version label for the first phase
    pub package_version: String,
    /// Property paths that get an extra happy-path scenario
    pub critical_properties: Vec<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            package_version: env!("CARGO_PKG_VERSION").to_string(),
            critical_properties: policy::DEFAULT_CRITICAL_PROPERTIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration: defaults, then an optional config file, then
    /// `CANVAS_*` environment overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match config_file {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()));
            }
            None => {
                builder = builder.add_source(File::with_name("canvas-schemas").required(false));
            }
        }

        builder = builder.add_source(Environment::with_prefix("CANVAS").separator("__"));

        let config = builder.build()?;
        // Missing sections fall back to their Default impls
        let mut loaded: PipelineConfig = config.try_deserialize()?;
        if loaded.planner.critical_properties.is_empty() {
            loaded.planner.critical_properties = PlannerConfig::default().critical_properties;
        }
        Ok(loaded)
    }
}
