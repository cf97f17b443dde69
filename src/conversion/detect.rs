//! Interchange format detection

use crate::commands::ImportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// External document shapes the editor reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Flat AIFdb JSON (lossy)
    Aif,
    /// Arguebuf JSON (lossless)
    Arguebuf,
}

impl FromStr for DocumentFormat {
    type Err = ImportError;

    /// Parse a format name, ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aif" => Ok(DocumentFormat::Aif),
            "arguebuf" => Ok(DocumentFormat::Arguebuf),
            other => Err(ImportError::UnrecognizedFormat(format!(
                "unknown format name '{other}'"
            ))),
        }
    }
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Aif => "aif",
            DocumentFormat::Arguebuf => "arguebuf",
        }
    }

    /// Recognize a document by its structural signature.
    ///
    /// Arguebuf keys its nodes by id and carries a schema version; AIF lists nodes
    /// in an array.
    pub fn detect(document: &Value) -> Result<Self, ImportError> {
        let Some(object) = document.as_object() else {
            return Err(ImportError::UnrecognizedFormat(
                "expected a JSON object".to_string(),
            ));
        };

        if object.contains_key("schemaVersion") {
            return Ok(DocumentFormat::Arguebuf);
        }
        match object.get("nodes") {
            Some(Value::Object(_)) => Ok(DocumentFormat::Arguebuf),
            Some(Value::Array(_)) => Ok(DocumentFormat::Aif),
            Some(_) => Err(ImportError::UnrecognizedFormat(
                "'nodes' must be an array or an object".to_string(),
            )),
            None => Err(ImportError::UnrecognizedFormat(
                "document has no 'nodes'".to_string(),
            )),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
