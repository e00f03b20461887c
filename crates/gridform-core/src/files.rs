//! File selections for file-typed columns.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::column::ColumnDescriptor;
use crate::registry::Registry;

/// A file picked by the user. Only metadata; bytes stay with the transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl FileEntry {
    /// Creates an entry without a content type.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: None,
        }
    }
}

/// Selected files by field path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSelections {
    selections: IndexMap<String, Vec<FileEntry>>,
}

impl FileSelections {
    /// Creates an empty selection table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection of `column`'s field with `files`.
    ///
    /// Columns that do not allow multiple files keep only the first entry.
    /// Returns the stored selection.
    pub fn select(&mut self, column: &ColumnDescriptor, mut files: Vec<FileEntry>) -> &[FileEntry] {
        if !column.multiple_files {
            files.truncate(1);
        }
        let slot = self.selections.entry(column.field.clone()).or_default();
        *slot = files;
        slot
    }

    /// Returns the files selected for a field.
    pub fn get(&self, field: &str) -> Option<&[FileEntry]> {
        self.selections.get(field).map(Vec::as_slice)
    }

    /// Iterates over selections in first-selected order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FileEntry])> {
        self.selections
            .iter()
            .map(|(field, files)| (field.as_str(), files.as_slice()))
    }

    /// Returns the number of fields with a selection.
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Returns true if nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// A rendered file input control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInputHandle {
    /// Element the picker is attached to; absent until the control is mounted
    pub element_id: Option<String>,
}

impl FileInputHandle {
    /// Creates a handle for a mounted control.
    pub fn mounted(element_id: impl Into<String>) -> Self {
        Self {
            element_id: Some(element_id.into()),
        }
    }
}

/// File input controls by field path.
pub type FileInputRegistry = Registry<FileInputHandle>;

/// Moves file bytes and drives the platform picker.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// Opens the picker attached to an element.
    async fn open_picker(&self, element_id: &str) -> anyhow::Result<()>;

    /// Transfers the selected files of a field.
    async fn upload(&self, field: &str, files: &[FileEntry]) -> anyhow::Result<()>;
}
