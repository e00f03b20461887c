//! Saves records as JSON files.

use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use gridform_binding::Record;
use gridform_core::{Persistence, UpdateFailure};

/// Writes the record to one JSON file on every commit.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Persistence<Record> for JsonFileStore {
    async fn update(&self, record: &Record) -> Result<(), UpdateFailure> {
        let content = serde_json::to_string_pretty(&record.to_json())
            .context("Serializing record")?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Writing {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "Record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridform_binding::{Value, ValueType};

    #[tokio::test]
    async fn test_writes_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        let record = Record::new().with("name", ValueType::Text, Value::from("Ana"));

        JsonFileStore::new(&path).update(&record).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(Record::from_json(&json).unwrap(), record);
    }

    #[tokio::test]
    async fn test_io_failure_is_not_a_domain_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("record.json");

        let err = JsonFileStore::new(&path)
            .update(&Record::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateFailure::Other(_)));
    }
}
