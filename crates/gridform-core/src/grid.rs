//! Child grids opened from nested-grid columns.

use std::collections::HashMap;

use async_trait::async_trait;
use gridform_binding::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Text direction of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// What a child grid inherits from the record that opened it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedGridContext {
    /// Child column name to the parent value that fixes it
    pub fixed_values: IndexMap<String, Value>,
    /// Display direction copied from the parent grid
    pub direction: Direction,
}

/// A configured child grid, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildGrid {
    /// Child grid identifier
    pub grid: String,
    /// Element type of the rows the child grid shows
    pub element_type: String,
    /// Filter and direction inherited from the parent
    pub context: NestedGridContext,
}

impl ChildGrid {
    /// Creates a child grid with an empty context.
    pub fn new(grid: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            grid: grid.into(),
            element_type: element_type.into(),
            context: NestedGridContext::default(),
        }
    }
}

/// Builds child grids for nested-grid columns.
///
/// The planner overwrites the returned grid's context with the filter it
/// extracted and the parent's direction.
#[async_trait]
pub trait NestedGridProvider: Send + Sync {
    /// Returns the child grid `grid`, scoped by the key values in order.
    async fn child_grid(&self, grid: &str, keys: &[Value]) -> anyhow::Result<ChildGrid>;
}

/// A provider backed by a fixed table of grid identifiers to element types.
#[derive(Debug, Clone, Default)]
pub struct GridCatalog {
    grids: HashMap<String, String>,
}

impl GridCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a grid.
    pub fn register(&mut self, grid: impl Into<String>, element_type: impl Into<String>) {
        self.grids.insert(grid.into(), element_type.into());
    }

    /// Returns the element type of a grid.
    pub fn element_type(&self, grid: &str) -> Option<&str> {
        self.grids.get(grid).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GridCatalog {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (grid, element_type) in iter {
            catalog.register(grid, element_type);
        }
        catalog
    }
}

#[async_trait]
impl NestedGridProvider for GridCatalog {
    async fn child_grid(&self, grid: &str, keys: &[Value]) -> anyhow::Result<ChildGrid> {
        let element_type = self
            .element_type(grid)
            .ok_or_else(|| anyhow::anyhow!("unknown grid `{grid}`"))?;
        tracing::debug!(grid, keys = keys.len(), "Opening child grid");
        Ok(ChildGrid::new(grid, element_type))
    }
}
