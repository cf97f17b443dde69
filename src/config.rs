//! Editor configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commands::{GraphError, GraphResult};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::identifiers::IdStrategy;
use crate::value_objects::SchemeType;

pub const DEFAULT_CACHE_KEY: &str = "argument-graph";
pub const DEFAULT_ATOM_TEXT: &str = "Atom Node";

/// Settings of one editing session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo entries kept
    pub history_limit: usize,
    /// Scheme type given to schemes synthesized between two atoms
    pub connection_scheme: SchemeType,
    pub id_strategy: IdStrategy,
    /// Key of the session blob in the persistence cache
    pub cache_key: String,
    /// Text of atoms added without any
    pub default_atom_text: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            connection_scheme: SchemeType::Support,
            id_strategy: IdStrategy::Uuid,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            default_atom_text: DEFAULT_ATOM_TEXT.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(raw: &str) -> GraphResult<Self> {
        let config: EditorConfig = serde_json::from_str(raw)
            .map_err(|err| GraphError::Config(format!("parse config: {err}")))?;
        config.validated()
    }

    /// Read a JSON config file; a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> GraphResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .map_err(|err| GraphError::Config(format!("read config: {err}")))?;
        Self::from_json_str(&raw)
    }

    fn validated(self) -> GraphResult<Self> {
        if self.history_limit == 0 {
            return Err(GraphError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }
        if self.cache_key.is_empty() {
            return Err(GraphError::Config("cache_key must not be empty".to_string()));
        }
        Ok(self)
    }
}
