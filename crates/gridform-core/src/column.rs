//! Column descriptors.
//!
//! ## Learning: Internally Tagged Enums
//!
//! `#[serde(tag = "kind")]` stores the variant name next to the variant's
//! fields, so a column file can say:
//!
//! ```toml
//! [[columns]]
//! field = "orders"
//!
//! [columns.editor]
//! kind = "nested_grid"
//! grid = "orders"
//! keys = [{ child_column = "customer_id", parent_path = "id" }]
//! ```

use std::path::Path;

use gridform_binding::{FieldAccess, FieldPath, PathResolutionError, Value, get_value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ConfigError;

/// Describes one editable column of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Unique key; generated when left blank
    #[serde(default)]
    pub name: String,

    /// Dotted path of the field this column edits
    pub field: String,

    /// Header text
    #[serde(default)]
    pub title: Option<String>,

    /// Which editor renders the column
    #[serde(default)]
    pub editor: EditorKind,

    /// Tab the column is shown in
    #[serde(default)]
    pub tab_group: Option<String>,

    /// File columns: accept more than one file
    #[serde(default)]
    pub multiple_files: bool,

    /// Semantic input type (`week`, `month`, `date`, ...)
    #[serde(default)]
    pub input_type: Option<String>,
}

/// How a column is edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditorKind {
    /// Default inline input, rendered outside the planner
    #[default]
    Plain,
    /// A pluggable editor component, looked up by name when realized
    Custom { component: String },
    /// A child grid filtered by values of this record
    NestedGrid(NestedGridSpec),
}

/// Which child grid to open and how it is filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedGridSpec {
    /// Child grid identifier, resolved by the nested grid provider
    pub grid: String,

    /// Filter keys, in the order the provider expects them
    #[serde(default)]
    pub keys: Vec<KeyMapping>,
}

/// One filter key of a child grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    /// Column of the child grid that is fixed
    pub child_column: String,
    /// Path of the parent record field supplying the value
    pub parent_path: String,
}

impl ColumnDescriptor {
    /// Creates a plain column for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            field: field.into(),
            title: None,
            editor: EditorKind::Plain,
            tab_group: None,
            multiple_files: false,
            input_type: None,
        }
    }

    /// Sets the column name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Uses a custom editor component.
    pub fn custom(mut self, component: impl Into<String>) -> Self {
        self.editor = EditorKind::Custom {
            component: component.into(),
        };
        self
    }

    /// Uses a nested grid.
    pub fn nested(mut self, spec: NestedGridSpec) -> Self {
        self.editor = EditorKind::NestedGrid(spec);
        self
    }

    /// Places the column in a tab.
    pub fn in_tab(mut self, tab: impl Into<String>) -> Self {
        self.tab_group = Some(tab.into());
        self
    }

    /// Sets the semantic input type.
    pub fn input(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    /// Allows selecting several files.
    pub fn multiple_files(mut self) -> Self {
        self.multiple_files = true;
        self
    }

    /// Assigns a generated name if the current one is blank.
    ///
    /// Returns true if a name was assigned. Once set, the name is kept, so
    /// planning the same columns again yields the same names.
    pub fn ensure_name(&mut self) -> bool {
        if !self.name.trim().is_empty() {
            return false;
        }
        self.name = Uuid::new_v4().to_string();
        true
    }

    /// Parses the column's field path.
    pub fn field_path(&self) -> Result<FieldPath, PathResolutionError> {
        FieldPath::parse(&self.field)
    }

    /// Returns the tab label, if the column has a non-blank one.
    pub fn tab(&self) -> Option<&str> {
        self.tab_group
            .as_deref()
            .filter(|tab| !tab.trim().is_empty())
    }

    /// Returns the header text, falling back to the field path.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.field)
    }
}

impl NestedGridSpec {
    /// Creates a spec with no filter keys.
    pub fn new(grid: impl Into<String>) -> Self {
        Self {
            grid: grid.into(),
            keys: Vec::new(),
        }
    }

    /// Adds a filter key.
    pub fn key(mut self, child_column: impl Into<String>, parent_path: impl Into<String>) -> Self {
        self.keys.push(KeyMapping {
            child_column: child_column.into(),
            parent_path: parent_path.into(),
        });
        self
    }

    /// Reads the filter values from the record, keyed by child column.
    pub fn extract(
        &self,
        record: &dyn FieldAccess,
    ) -> Result<IndexMap<String, Value>, PathResolutionError> {
        self.keys
            .iter()
            .map(|key| {
                let path = FieldPath::parse(&key.parent_path)?;
                Ok((key.child_column.clone(), get_value(record, &path)?))
            })
            .collect()
    }
}

/// A column file: the columns plus the child grids they may open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefinition {
    /// Child grid identifier to element type name
    pub grids: IndexMap<String, String>,

    /// Columns in declaration order
    pub columns: Vec<ColumnDescriptor>,
}

impl FormDefinition {
    /// Parses a column file.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a column file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridform_binding::{Record, ValueType};

    #[test]
    fn test_ensure_name_is_stable() {
        let mut column = ColumnDescriptor::new("name");
        assert!(column.ensure_name());
        let generated = column.name.clone();
        assert!(!generated.is_empty());

        assert!(!column.ensure_name());
        assert_eq!(column.name, generated);
    }

    #[test]
    fn test_ensure_name_replaces_whitespace() {
        let mut column = ColumnDescriptor::new("name").named("  ");
        assert!(column.ensure_name());
        assert_ne!(column.name.trim(), "");

        let mut named = ColumnDescriptor::new("name").named("Name");
        assert!(!named.ensure_name());
        assert_eq!(named.name, "Name");
    }

    #[test]
    fn test_blank_tab_is_no_tab() {
        assert_eq!(ColumnDescriptor::new("a").in_tab(" ").tab(), None);
        assert_eq!(ColumnDescriptor::new("a").in_tab("Main").tab(), Some("Main"));
        assert_eq!(ColumnDescriptor::new("a").tab(), None);
    }

    #[test]
    fn test_extract_keys() {
        let customer = Record::new().with("id", ValueType::Int, Value::Int(12));
        let record = Record::new()
            .with("customer", ValueType::Record, Value::Record(customer))
            .with("region", ValueType::Text, Value::from("EU"));

        let spec = NestedGridSpec::new("orders")
            .key("CustomerId", "customer.id")
            .key("Region", "region");
        let values = spec.extract(&record).unwrap();

        let pairs: Vec<_> = values.iter().collect();
        assert_eq!(
            pairs,
            [
                (&"CustomerId".to_string(), &Value::Int(12)),
                (&"Region".to_string(), &Value::from("EU")),
            ]
        );

        let broken = NestedGridSpec::new("orders").key("X", "customer.missing");
        assert!(broken.extract(&record).is_err());
    }

    #[test]
    fn test_parse_form_definition() {
        let form = FormDefinition::parse(
            r#"
            [grids]
            orders = "Order"

            [[columns]]
            name = "Name"
            field = "name"
            tab_group = "General"

            [[columns]]
            field = "born"
            input_type = "week"

            [[columns]]
            field = "bio"
            editor = { kind = "custom", component = "rich_text" }

            [[columns]]
            field = "orders"

            [columns.editor]
            kind = "nested_grid"
            grid = "orders"
            keys = [{ child_column = "CustomerId", parent_path = "id" }]
            "#,
        )
        .unwrap();

        assert_eq!(form.grids.get("orders").map(String::as_str), Some("Order"));
        assert_eq!(form.columns.len(), 4);
        assert_eq!(form.columns[0].tab(), Some("General"));
        assert!(form.columns[1].name.is_empty());
        assert_eq!(form.columns[1].input_type.as_deref(), Some("week"));
        assert_eq!(
            form.columns[2].editor,
            EditorKind::Custom {
                component: "rich_text".to_string()
            }
        );
        assert_eq!(
            form.columns[3].editor,
            EditorKind::NestedGrid(NestedGridSpec::new("orders").key("CustomerId", "id"))
        );
    }
}
