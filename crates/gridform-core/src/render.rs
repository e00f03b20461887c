//! Turning an editor plan into live editors.
//!
//! ## Learning: Type Erasure
//!
//! `Box<dyn EditorComponent>` lets components of unrelated types share one
//! `HashMap`, and `EditorHandle` erases whatever they create. The session
//! only needs to store and hand back instances, never to call into them.

use std::collections::HashMap;

use gridform_binding::FieldAccess;

use crate::column::ColumnDescriptor;
use crate::grid::ChildGrid;
use crate::planner::{EditorPlan, EditorSpec};
use crate::registry::EditorHandle;
use crate::{CoreError, CoreResult};

/// Instantiates planned editors.
pub trait Renderer {
    /// Creates a custom editor component bound to a column and record.
    fn custom(
        &mut self,
        component: &str,
        column: &ColumnDescriptor,
        record: &dyn FieldAccess,
    ) -> anyhow::Result<EditorHandle>;

    /// Creates a grid showing `child`.
    fn grid(&mut self, child: &ChildGrid) -> anyhow::Result<EditorHandle>;
}

/// A factory for one kind of custom editor.
pub trait EditorComponent: Send + Sync {
    /// Returns the component identifier used in column definitions.
    fn name(&self) -> &str;

    /// Creates an editor instance.
    fn create(
        &self,
        column: &ColumnDescriptor,
        record: &dyn FieldAccess,
    ) -> anyhow::Result<EditorHandle>;
}

/// Custom editor components by identifier.
pub struct ComponentRegistry {
    components: HashMap<String, Box<dyn EditorComponent>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Registers a component under its own name.
    pub fn register(&mut self, component: Box<dyn EditorComponent>) {
        let name = component.name().to_string();
        self.components.insert(name, component);
    }

    /// Returns a component by identifier.
    pub fn get(&self, name: &str) -> Option<&dyn EditorComponent> {
        self.components.get(name).map(|c| c.as_ref())
    }

    /// Creates an instance of `component` for a column.
    pub fn instantiate(
        &self,
        component: &str,
        column: &ColumnDescriptor,
        record: &dyn FieldAccess,
    ) -> CoreResult<EditorHandle> {
        let factory = self
            .get(component)
            .ok_or_else(|| CoreError::UnknownComponent {
                component: component.to_string(),
                column: column.name.clone(),
            })?;

        factory
            .create(column, record)
            .map_err(|source| CoreError::Render {
                column: column.name.clone(),
                source,
            })
    }

    /// Returns all registered component names.
    pub fn list(&self) -> Vec<&str> {
        self.components.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Instantiates every editor in `plan` and captures it into its slot.
///
/// Editors whose slot is already filled are skipped. Returns how many
/// editors were created.
pub fn realize(
    plan: &EditorPlan,
    columns: &[ColumnDescriptor],
    record: &dyn FieldAccess,
    renderer: &mut dyn Renderer,
) -> CoreResult<usize> {
    let mut created = 0;

    for descriptor in plan.editors.values() {
        if descriptor.slot.is_captured() {
            continue;
        }

        let handle = match &descriptor.spec {
            EditorSpec::Custom { component } => {
                let column = columns
                    .iter()
                    .find(|c| c.name == descriptor.column)
                    .ok_or_else(|| CoreError::ColumnNotFound(descriptor.column.clone()))?;
                renderer.custom(component, column, record)
            }
            EditorSpec::Nested(child) => renderer.grid(child),
        }
        .map_err(|e| match e.downcast::<CoreError>() {
            Ok(core) => core,
            Err(source) => CoreError::Render {
                column: descriptor.column.clone(),
                source,
            },
        })?;

        descriptor.slot.capture(handle);
        created += 1;
    }

    tracing::debug!(created, "Realized editors");
    Ok(created)
}
