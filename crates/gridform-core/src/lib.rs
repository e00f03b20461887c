//! # Gridform Core
//!
//! Editing session for one record inside a grid.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       EditSession                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌───────────────────┐  │
//! │  │    Record    │ │   Columns    │ │   UpdateLifecycle │  │
//! │  └──────────────┘ └──────────────┘ └───────────────────┘  │
//! │          │               │                   │            │
//! │  ┌───────┴───────────────┴──────┐   ┌────────┴─────────┐  │
//! │  │         EditorPlanner        │   │    Persistence   │  │
//! │  │  ┌─────────┐ ┌────────────┐  │   └──────────────────┘  │
//! │  │  │ Custom  │ │ NestedGrid │  │                         │
//! │  │  └─────────┘ └────────────┘  │                         │
//! │  └──────────────────────────────┘                         │
//! │          │                    │                           │
//! │  ┌───────┴────────┐   ┌───────┴────────┐                  │
//! │  │ ReferenceReg.  │   │ TabPartitioner │                  │
//! │  └────────────────┘   └────────────────┘                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Collaborators as Traits
//!
//! Everything this crate does not own (painting editors, building child
//! grids, saving the record, moving file bytes) sits behind a trait. The
//! session only decides *what* to render and *when* values move; the
//! implementations decide *how*.

pub mod column;
pub mod config;
pub mod event;
pub mod files;
pub mod grid;
pub mod lifecycle;
pub mod planner;
pub mod registry;
pub mod render;
pub mod session;
pub mod tabs;

pub use column::{ColumnDescriptor, EditorKind, FormDefinition, KeyMapping, NestedGridSpec};
pub use config::{Config, ConfigError, Strings};
pub use event::{EventBus, EventHandler, SessionEvent};
pub use files::{FileEntry, FileInputHandle, FileInputRegistry, FileSelections, FileTransfer};
pub use grid::{ChildGrid, Direction, GridCatalog, NestedGridContext, NestedGridProvider};
pub use lifecycle::{
    CommitOutcome, CommitState, CommitTicket, DomainFailure, ErrorState, Persistence,
    UpdateFailure,
};
pub use planner::{EditorDescriptor, EditorPlan, EditorPlanner, EditorSpec};
pub use registry::{EditorHandle, HandleSlot, ReferenceRegistry, Registry};
pub use render::{ComponentRegistry, EditorComponent, Renderer, realize};
pub use session::EditSession;

pub use gridform_binding as binding;

use gridform_binding::{BindingError, PathResolutionError};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Path error: {0}")]
    Path(#[from] PathResolutionError),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("Unknown editor component `{component}` for column `{column}`")]
    UnknownComponent { component: String, column: String },

    #[error("Could not build child grid for column `{column}`: {source}")]
    NestedGrid {
        column: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Could not render editor for column `{column}`: {source}")]
    Render {
        column: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No file input registered for `{0}`")]
    FileInputNotFound(String),

    #[error("File transfer failed: {0}")]
    FileTransfer(#[source] anyhow::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
