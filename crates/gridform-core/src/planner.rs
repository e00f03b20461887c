//! Decides which columns get an editor and what kind.
//!
//! ## Learning: Plans Instead of Widgets
//!
//! The planner never creates an editor. It returns plain data, an
//! [`EditorSpec`] per column plus an empty [`HandleSlot`], and leaves
//! instantiation to a renderer. That keeps planning testable without any
//! UI and lets the same plan be realized by different front ends.

use std::sync::Arc;

use gridform_binding::{FieldAccess, Value};
use indexmap::IndexMap;

use crate::column::{ColumnDescriptor, EditorKind, NestedGridSpec};
use crate::grid::{ChildGrid, Direction, NestedGridContext, NestedGridProvider};
use crate::registry::{HandleSlot, ReferenceRegistry};
use crate::{CoreError, CoreResult, tabs};

/// What a planned editor instantiates.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorSpec {
    /// A named editor component bound to the column and record
    Custom { component: String },
    /// A child grid of `ChildGrid::element_type` rows
    Nested(ChildGrid),
}

/// One planned editor.
#[derive(Debug, Clone)]
pub struct EditorDescriptor {
    /// Name of the column the editor belongs to
    pub column: String,
    /// What to instantiate
    pub spec: EditorSpec,
    /// Receives the instance once realized
    pub slot: HandleSlot,
}

/// Result of one planning pass.
#[derive(Debug, Clone, Default)]
pub struct EditorPlan {
    /// Editors by column name, in column order
    pub editors: IndexMap<String, EditorDescriptor>,
    /// Distinct tab labels of the planned editors
    pub tabs: Vec<String>,
}

impl EditorPlan {
    /// Returns the editor planned for a column.
    pub fn editor(&self, column: &str) -> Option<&EditorDescriptor> {
        self.editors.get(column)
    }

    /// Returns the number of planned editors.
    pub fn len(&self) -> usize {
        self.editors.len()
    }

    /// Returns true if no column needs an editor.
    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}

/// Builds editor plans for a record.
pub struct EditorPlanner {
    direction: Direction,
    grids: Arc<dyn NestedGridProvider>,
}

impl EditorPlanner {
    /// Creates a planner for a grid shown in `direction`.
    pub fn new(direction: Direction, grids: Arc<dyn NestedGridProvider>) -> Self {
        Self { direction, grids }
    }

    /// Returns the direction handed down to child grids.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Changes the direction handed down to child grids.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Plans the editors for `record`.
    ///
    /// Blank column names are filled in place. Every planned editor gets a
    /// fresh slot, which replaces any slot registered under the same name.
    /// The registry is only written once every column has planned.
    pub async fn plan(
        &self,
        record: &dyn FieldAccess,
        columns: &mut [ColumnDescriptor],
        registry: &mut ReferenceRegistry,
    ) -> CoreResult<EditorPlan> {
        let mut editors = IndexMap::new();

        for column in columns.iter_mut() {
            if column.ensure_name() {
                tracing::debug!(column = %column.name, field = %column.field, "Generated column name");
            }

            let spec = match &column.editor {
                EditorKind::Plain => continue,
                EditorKind::Custom { component } => EditorSpec::Custom {
                    component: component.clone(),
                },
                EditorKind::NestedGrid(nested) => {
                    EditorSpec::Nested(self.child_grid(&column.name, nested, record).await?)
                }
            };

            editors.insert(
                column.name.clone(),
                EditorDescriptor {
                    column: column.name.clone(),
                    spec,
                    slot: HandleSlot::new(),
                },
            );
        }

        for (name, descriptor) in &editors {
            registry.set(name.clone(), descriptor.slot.clone());
        }

        let tabs = tabs::partition(columns, &editors);
        tracing::debug!(editors = editors.len(), tabs = tabs.len(), "Planned editors");
        Ok(EditorPlan { editors, tabs })
    }

    async fn child_grid(
        &self,
        column: &str,
        nested: &NestedGridSpec,
        record: &dyn FieldAccess,
    ) -> CoreResult<ChildGrid> {
        let fixed_values = nested.extract(record)?;
        let keys: Vec<Value> = fixed_values.values().cloned().collect();

        let mut child = self
            .grids
            .child_grid(&nested.grid, &keys)
            .await
            .map_err(|source| CoreError::NestedGrid {
                column: column.to_string(),
                source,
            })?;

        child.context = NestedGridContext {
            fixed_values,
            direction: self.direction,
        };
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridCatalog;
    use gridform_binding::{PathResolutionError, Record, ValueType};

    fn planner(direction: Direction) -> EditorPlanner {
        let catalog: GridCatalog = [("orders", "Order")].into_iter().collect();
        EditorPlanner::new(direction, Arc::new(catalog))
    }

    fn customer() -> Record {
        let address = Record::new().with("country", ValueType::Text, Value::from("PT"));
        Record::new()
            .with("id", ValueType::Int, Value::Int(7))
            .with("name", ValueType::Text, Value::from("Ana"))
            .with("address", ValueType::Record, Value::Record(address))
    }

    #[tokio::test]
    async fn test_plain_columns_get_no_editor() {
        let mut columns = vec![
            ColumnDescriptor::new("name").named("Name").in_tab("Main"),
            ColumnDescriptor::new("id").custom("badge").in_tab("Extra"),
        ];
        let mut registry = ReferenceRegistry::new();

        let plan = planner(Direction::Ltr)
            .plan(&customer(), &mut columns, &mut registry)
            .await
            .unwrap();

        assert_eq!(plan.len(), 1);
        assert!(plan.editor("Name").is_none());
        let generated = &columns[1].name;
        assert_eq!(
            plan.editor(generated).unwrap().spec,
            EditorSpec::Custom {
                component: "badge".to_string()
            }
        );
        assert!(registry.contains(generated));
        assert!(!registry.contains("Name"));
        assert_eq!(plan.tabs, ["Extra"]);
    }

    #[tokio::test]
    async fn test_generated_names_are_unique_and_stable() {
        let mut columns = vec![
            ColumnDescriptor::new("name").custom("text"),
            ColumnDescriptor::new("id"),
            ColumnDescriptor::new("id").custom("badge"),
        ];
        let mut registry = ReferenceRegistry::new();
        let planner = planner(Direction::Ltr);
        let record = customer();

        planner.plan(&record, &mut columns, &mut registry).await.unwrap();
        let first: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        assert!(first.iter().all(|name| !name.is_empty()));
        assert_ne!(first[0], first[1]);
        assert_ne!(first[1], first[2]);
        assert_ne!(first[0], first[2]);

        planner.plan(&record, &mut columns, &mut registry).await.unwrap();
        let second: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_nested_grid_context() {
        let mut columns = vec![ColumnDescriptor::new("orders").named("Orders").nested(
            NestedGridSpec::new("orders")
                .key("CustomerId", "id")
                .key("Country", "address.country"),
        )];
        let mut registry = ReferenceRegistry::new();
        let record = customer();

        let plan = planner(Direction::Rtl)
            .plan(&record, &mut columns, &mut registry)
            .await
            .unwrap();

        let EditorSpec::Nested(child) = &plan.editor("Orders").unwrap().spec else {
            panic!("expected a nested grid");
        };
        let expected = match &columns[0].editor {
            EditorKind::NestedGrid(spec) => spec.extract(&record).unwrap(),
            _ => unreachable!(),
        };
        assert_eq!(child.element_type, "Order");
        assert_eq!(child.context.fixed_values, expected);
        assert_eq!(child.context.direction, Direction::Rtl);
    }

    #[tokio::test]
    async fn test_replan_supersedes_slots() {
        let mut columns = vec![ColumnDescriptor::new("name").named("Name").custom("text")];
        let mut registry = ReferenceRegistry::new();
        let planner = planner(Direction::Ltr);
        let record = customer();

        let first = planner.plan(&record, &mut columns, &mut registry).await.unwrap();
        let second = planner.plan(&record, &mut columns, &mut registry).await.unwrap();

        assert_eq!(registry.len(), 1);
        let registered = registry.get("Name").unwrap();
        assert!(registered.same_slot(&second.editor("Name").unwrap().slot));
        assert!(!registered.same_slot(&first.editor("Name").unwrap().slot));
    }

    #[tokio::test]
    async fn test_bad_key_path_fails() {
        let mut columns = vec![ColumnDescriptor::new("orders")
            .nested(NestedGridSpec::new("orders").key("CustomerId", "customer.id"))];
        let mut registry = ReferenceRegistry::new();

        let err = planner(Direction::Ltr)
            .plan(&customer(), &mut columns, &mut registry)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Path(PathResolutionError::MissingField { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_child_grid_fails() {
        let mut columns = vec![ColumnDescriptor::new("invoices")
            .named("Invoices")
            .nested(NestedGridSpec::new("invoices"))];
        let mut registry = ReferenceRegistry::new();

        let err = planner(Direction::Ltr)
            .plan(&customer(), &mut columns, &mut registry)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NestedGrid { column, .. } if column == "Invoices"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_failed_replan_keeps_registered_slots() {
        let mut columns = vec![
            ColumnDescriptor::new("name").named("Name").custom("text"),
            ColumnDescriptor::new("orders").named("Orders").nested(
                NestedGridSpec::new("orders").key("Country", "address.country"),
            ),
        ];
        let mut registry = ReferenceRegistry::new();
        let planner = planner(Direction::Ltr);

        let first = planner
            .plan(&customer(), &mut columns, &mut registry)
            .await
            .unwrap();

        let mut moved = customer();
        moved.set_field("address", Value::Null).unwrap();
        let err = planner
            .plan(&moved, &mut columns, &mut registry)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Path(_)));

        assert_eq!(registry.len(), 2);
        for name in ["Name", "Orders"] {
            let registered = registry.get(name).unwrap();
            assert!(registered.same_slot(&first.editor(name).unwrap().slot));
        }
    }
}
