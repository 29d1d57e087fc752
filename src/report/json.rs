//! JSON report export

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Writes any report as pretty-printed JSON, creating parent
/// directories as needed
pub fn export<T: Serialize>(value: &T, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(output_path, json)?;
    info!("JSON report saved to {}", output_path.display());
    Ok(())
}

/// Loads a previously exported report from a JSON file
pub fn load<T: DeserializeOwned>(input_path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(input_path)?;
    let value = serde_json::from_str(&content)?;
    Ok(value)
}
