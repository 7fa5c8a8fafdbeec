//! JSON loading for tables produced by an external compiler.

use super::error::LoadError;
use super::table::{GrammarTable, TableData};
use std::path::Path;

impl GrammarTable {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let data: TableData = serde_json::from_str(json)?;
        Ok(Self::new(data)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self.data())?)
    }
}
