//! A renderer that builds plain data instead of widgets.

use gridform_binding::{FieldAccess, Value, get_value};
use gridform_core::{
    ChildGrid, ColumnDescriptor, ComponentRegistry, EditorComponent, EditorHandle, Renderer,
};

/// A custom editor showing the column's current value.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessEditor {
    pub component: String,
    pub value: Value,
}

/// A child grid with the filter it was opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessGrid {
    pub element_type: String,
    pub filter: String,
}

/// Creates a [`HeadlessEditor`] for any column.
struct ValueComponent {
    name: String,
}

impl EditorComponent for ValueComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(
        &self,
        column: &ColumnDescriptor,
        record: &dyn FieldAccess,
    ) -> anyhow::Result<EditorHandle> {
        let value = get_value(record, &column.field_path()?)?;
        Ok(EditorHandle::new(HeadlessEditor {
            component: self.name.clone(),
            value,
        }))
    }
}

pub struct HeadlessRenderer {
    components: ComponentRegistry,
}

impl HeadlessRenderer {
    /// Creates a renderer that knows the given component names.
    pub fn new(components: &[String]) -> Self {
        let mut registry = ComponentRegistry::new();
        for name in components {
            registry.register(Box::new(ValueComponent { name: name.clone() }));
        }
        Self {
            components: registry,
        }
    }

    /// Short text for a realized editor.
    pub fn describe(handle: &EditorHandle) -> String {
        if let Some(editor) = handle.downcast_ref::<HeadlessEditor>() {
            format!("({}) = {}", editor.component, editor.value)
        } else if let Some(grid) = handle.downcast_ref::<HeadlessGrid>() {
            format!("({}) where {}", grid.element_type, grid.filter)
        } else {
            String::new()
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn custom(
        &mut self,
        component: &str,
        column: &ColumnDescriptor,
        record: &dyn FieldAccess,
    ) -> anyhow::Result<EditorHandle> {
        Ok(self.components.instantiate(component, column, record)?)
    }

    fn grid(&mut self, child: &ChildGrid) -> anyhow::Result<EditorHandle> {
        let filter = child
            .context
            .fixed_values
            .iter()
            .map(|(column, value)| format!("{column} = {value}"))
            .collect::<Vec<_>>()
            .join(" and ");
        tracing::debug!(grid = %child.grid, %filter, "Rendering child grid");

        Ok(EditorHandle::new(HeadlessGrid {
            element_type: child.element_type.clone(),
            filter,
        }))
    }
}
