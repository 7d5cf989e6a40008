//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Refuse cross-category re-registration of an already-bound name.
    /// Same-category overwrite stays silent either way.
    pub strict_bindings: bool,

    /// Hard cap on expression nesting during construction.
    pub max_expr_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_bindings: true,
            max_expr_depth: 64,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `RIVULET_STRICT_BINDINGS`: "true" / "false"
    /// - `RIVULET_MAX_EXPR_DEPTH`: nesting cap
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("RIVULET_STRICT_BINDINGS") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.strict_bindings = v;
            }
        }

        if let Ok(s) = std::env::var("RIVULET_MAX_EXPR_DEPTH") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_expr_depth = v;
            }
        }

        cfg
    }
}
