//! Statement scripts.
//!
//! A script is a JSON array of steps, each a serialized statement and the
//! runtime values for its PREPARED markers:
//!
//! ```json
//! [
//!   {
//!     "statement": {
//!       "kind": "find",
//!       "collection": { "database": "shop", "name": "users" },
//!       "entries": [{
//!         "type": "condition", "kind": "equals",
//!         "field": { "field": "name" }, "value": "prepared"
//!       }]
//!     },
//!     "values": ["alice"]
//!   }
//! ]
//! ```

use std::path::Path;

use dbquery_core::{SqlValue, Statement};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// One statement with its runtime values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// The statement.
    pub statement: Statement,
    /// Values consumed by PREPARED markers in declaration order.
    #[serde(default)]
    pub values: Vec<SqlValue>,
}

/// Parses a script.
pub fn parse(path: &Path, text: &str) -> Result<Vec<Step>> {
    serde_json::from_str(text).map_err(|source| CliError::Script {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and parses a script file.
pub fn load(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)?;
    parse(path, &text)
}
