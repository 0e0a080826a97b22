//! Backend configuration (jolt.toml)
//!
//! ```toml
//! [pipeline]
//! passes = ["insert-not-null-assertions", "verify-tree-shape"]
//! parallel = true
//! worker-threads = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::not_null::InsertNotNullAssertions;
use crate::pass::NormalizationPass;
use crate::verify::VerifyTreeShape;

/// Top-level backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Normalization pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// Passes in execution order
    #[serde(default = "default_passes")]
    pub passes: Vec<PassKind>,

    /// Process units on a worker pool
    #[serde(default)]
    pub parallel: bool,

    /// Worker count for parallel runs; 0 uses one worker per CPU
    #[serde(default)]
    pub worker_threads: usize,
}

/// Passes compiled into the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PassKind {
    InsertNotNullAssertions,
    VerifyTreeShape,
}

impl PassKind {
    pub fn create(&self) -> Box<dyn NormalizationPass> {
        match self {
            PassKind::InsertNotNullAssertions => Box::new(InsertNotNullAssertions::new()),
            PassKind::VerifyTreeShape => Box::new(VerifyTreeShape::new()),
        }
    }
}

fn default_passes() -> Vec<PassKind> {
    vec![PassKind::InsertNotNullAssertions, PassKind::VerifyTreeShape]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            passes: default_passes(),
            parallel: false,
            worker_threads: 0,
        }
    }
}

impl PipelineConfig {
    /// Effective number of workers for a parallel run
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }
}

impl BackendConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BackendConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let passes = &self.pipeline.passes;
        for (i, pass) in passes.iter().enumerate() {
            if passes[..i].contains(pass) {
                return Err(ConfigError::ValidationError(format!(
                    "Pass {:?} is listed more than once",
                    pass
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BackendConfig::from_toml_str("").unwrap();
        assert_eq!(config, BackendConfig::default());
        assert_eq!(
            config.pipeline.passes,
            vec![PassKind::InsertNotNullAssertions, PassKind::VerifyTreeShape]
        );
        assert!(!config.pipeline.parallel);
    }

    #[test]
    fn test_parse_pipeline_section() {
        let toml = r#"
            [pipeline]
            passes = ["verify-tree-shape"]
            parallel = true
            worker-threads = 3
        "#;
        let config = BackendConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.pipeline.passes, vec![PassKind::VerifyTreeShape]);
        assert!(config.pipeline.parallel);
        assert_eq!(config.pipeline.effective_worker_threads(), 3);
    }

    #[test]
    fn test_unknown_pass_is_rejected() {
        let toml = r#"
            [pipeline]
            passes = ["inline-everything"]
        "#;
        assert!(matches!(
            BackendConfig::from_toml_str(toml),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_duplicate_pass_is_rejected() {
        let toml = r#"
            [pipeline]
            passes = ["verify-tree-shape", "verify-tree-shape"]
        "#;
        assert!(matches!(
            BackendConfig::from_toml_str(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_workers_means_cpu_count() {
        let config = PipelineConfig::default();
        assert_eq!(config.effective_worker_threads(), num_cpus::get());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jolt.toml");
        std::fs::write(&path, "[pipeline]\nparallel = true\n").unwrap();

        let config = BackendConfig::load(&path).unwrap();
        assert!(config.pipeline.parallel);
        assert_eq!(config.pipeline.passes.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = BackendConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
