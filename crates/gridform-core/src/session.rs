//! The edit session: one record, its columns, and everything derived from them.
//!
//! ## Learning: Splitting an Await
//!
//! [`EditSession::commit`] is `begin_commit`, one `.await` on the backend,
//! then `complete_commit`. Callers that must keep handling input while the
//! save is in flight can call the two halves themselves and edit the record
//! in between; the failure path re-plans against whatever the record holds
//! when the answer arrives.

use gridform_binding::{FieldAccess, Value, bind_input, set_value};

use crate::column::ColumnDescriptor;
use crate::config::{MessagesConfig, Strings};
use crate::event::{EventBus, SessionEvent};
use crate::files::{FileEntry, FileInputHandle, FileInputRegistry, FileSelections, FileTransfer};
use crate::lifecycle::{
    CommitOutcome, CommitState, CommitTicket, ErrorState, Persistence, UpdateFailure,
};
use crate::planner::{EditorPlan, EditorPlanner};
use crate::registry::{EditorHandle, ReferenceRegistry};
use crate::render::{Renderer, realize};
use crate::{CoreError, CoreResult};

/// Editing state for a single record.
pub struct EditSession<R: FieldAccess> {
    record: R,
    columns: Vec<ColumnDescriptor>,
    planner: EditorPlanner,
    editors: ReferenceRegistry,
    file_inputs: FileInputRegistry,
    files: FileSelections,
    plan: EditorPlan,
    errors: ErrorState,
    state: CommitState,
    last_ticket: u64,
    strings: Box<dyn Strings>,
    events: EventBus,
}

impl<R: FieldAccess> EditSession<R> {
    /// Creates a session. Nothing is planned until [`render`](Self::render).
    pub fn new(record: R, columns: Vec<ColumnDescriptor>, planner: EditorPlanner) -> Self {
        Self {
            record,
            columns,
            planner,
            editors: ReferenceRegistry::new(),
            file_inputs: FileInputRegistry::new(),
            files: FileSelections::new(),
            plan: EditorPlan::default(),
            errors: ErrorState::default(),
            state: CommitState::Idle,
            last_ticket: 0,
            strings: Box::new(MessagesConfig::default()),
            events: EventBus::new(),
        }
    }

    /// Replaces the source of user-facing messages.
    pub fn with_strings(mut self, strings: Box<dyn Strings>) -> Self {
        self.strings = strings;
        self
    }

    // =========================================================================
    // Planning
    // =========================================================================

    /// Plans editors and tabs for the current record.
    pub async fn render(&mut self) -> CoreResult<&EditorPlan> {
        self.plan = self
            .planner
            .plan(&self.record, &mut self.columns, &mut self.editors)
            .await?;

        self.events.emit(SessionEvent::Planned {
            editors: self.plan.len(),
            tabs: self.plan.tabs.len(),
        });
        Ok(&self.plan)
    }

    /// Instantiates the planned editors that have not been realized yet.
    pub fn realize(&self, renderer: &mut dyn Renderer) -> CoreResult<usize> {
        realize(&self.plan, &self.columns, &self.record, renderer)
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Converts raw input for a column and writes it into the record.
    ///
    /// Calendar parse errors and path errors propagate; other malformed
    /// input clears the field.
    pub fn change_value(&mut self, column: &str, raw: &str) -> CoreResult<()> {
        let column = find_column(&self.columns, column)?;
        let path = column.field_path()?;

        bind_input(&mut self.record, &path, raw, column.input_type.as_deref())?;

        self.events.emit(SessionEvent::ValueChanged {
            column: column.name.clone(),
        });
        Ok(())
    }

    /// Writes an already typed value into a column's field.
    pub fn set_value(&mut self, column: &str, value: Value) -> CoreResult<()> {
        let column = find_column(&self.columns, column)?;
        let path = column.field_path()?;

        set_value(&mut self.record, &path, value)?;

        self.events.emit(SessionEvent::ValueChanged {
            column: column.name.clone(),
        });
        Ok(())
    }

    /// Replaces the files selected for a column.
    pub fn select_files(&mut self, column: &str, files: Vec<FileEntry>) -> CoreResult<&[FileEntry]> {
        let column = find_column(&self.columns, column)?;
        let stored = self.files.select(column, files);

        self.events.emit(SessionEvent::FilesSelected {
            field: column.field.clone(),
            count: stored.len(),
        });
        Ok(stored)
    }

    /// Registers the file input control of a field, replacing any previous one.
    pub fn register_file_input(
        &mut self,
        field: impl Into<String>,
        handle: FileInputHandle,
    ) -> Option<FileInputHandle> {
        self.file_inputs.set(field, handle)
    }

    /// Opens the file picker of a field.
    ///
    /// Returns false without calling `transfer` when the control is not
    /// mounted yet.
    pub async fn open_file_picker(
        &self,
        field: &str,
        transfer: &dyn FileTransfer,
    ) -> CoreResult<bool> {
        let handle = self
            .file_inputs
            .get(field)
            .ok_or_else(|| CoreError::FileInputNotFound(field.to_string()))?;

        let Some(element_id) = handle.element_id.as_deref() else {
            tracing::debug!(field, "File input not mounted, picker not opened");
            return Ok(false);
        };

        transfer
            .open_picker(element_id)
            .await
            .map_err(CoreError::FileTransfer)?;
        Ok(true)
    }

    /// Transfers the files selected for a field. Returns how many were sent.
    pub async fn upload_files(&self, field: &str, transfer: &dyn FileTransfer) -> CoreResult<usize> {
        let files = match self.files.get(field) {
            Some(files) if !files.is_empty() => files,
            _ => return Ok(0),
        };

        transfer
            .upload(field, files)
            .await
            .map_err(CoreError::FileTransfer)?;
        tracing::info!(field, count = files.len(), "Files uploaded");
        Ok(files.len())
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Starts a commit: clears the banners and the tab labels.
    ///
    /// Starting a second commit while one is in flight is allowed but logged.
    pub fn begin_commit(&mut self) -> CommitTicket {
        if self.state == CommitState::Committing {
            tracing::warn!(pending = self.last_ticket, "Commit started while another is in flight");
        }

        self.errors.clear();
        self.plan.tabs.clear();
        self.state = CommitState::Committing;
        self.last_ticket += 1;

        self.events.emit(SessionEvent::CommitStarted);
        CommitTicket(self.last_ticket)
    }

    /// Finishes a commit with the backend's answer.
    ///
    /// Failures re-plan against the current record so the form shows the
    /// edits made so far, then set the banners.
    pub async fn complete_commit(
        &mut self,
        ticket: CommitTicket,
        result: Result<(), UpdateFailure>,
    ) -> CommitOutcome {
        if ticket.number() != self.last_ticket {
            tracing::debug!(
                commit = ticket.number(),
                latest = self.last_ticket,
                "Completing a superseded commit"
            );
        }
        self.state = CommitState::Idle;

        let errors = match result {
            Ok(()) => {
                tracing::info!(commit = ticket.number(), "Record saved");
                self.events.emit(SessionEvent::CommitSucceeded);
                return CommitOutcome::Saved;
            }
            Err(UpdateFailure::Domain(failure)) => {
                tracing::info!(commit = ticket.number(), code = ?failure.code, "Record rejected");
                ErrorState::from_domain(&failure)
            }
            Err(UpdateFailure::Other(e)) => {
                tracing::error!(commit = ticket.number(), "Saving record failed: {:#}", e);
                ErrorState::generic(self.strings.update_error())
            }
        };

        if let Err(e) = self.render().await {
            tracing::warn!("Re-planning after a failed commit failed: {}", e);
        }

        self.errors = errors;
        let message = self.errors.record.clone();
        self.events.emit(SessionEvent::CommitFailed {
            message: message.clone(),
        });
        CommitOutcome::Rejected(message)
    }

    /// Saves the record through `persistence`.
    pub async fn commit<P>(&mut self, persistence: &P) -> CommitOutcome
    where
        P: Persistence<R> + ?Sized,
        R: Sync,
    {
        let ticket = self.begin_commit();
        let result = persistence.update(&self.record).await;
        self.complete_commit(ticket, result).await
    }

    /// Asks the surrounding grid to leave the form.
    pub fn back(&self) {
        tracing::debug!("Back requested");
        self.events.emit(SessionEvent::BackRequested);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the record.
    pub fn record(&self) -> &R {
        &self.record
    }

    /// Returns the record for direct edits.
    pub fn record_mut(&mut self) -> &mut R {
        &mut self.record
    }

    /// Consumes the session, returning the record.
    pub fn into_record(self) -> R {
        self.record
    }

    /// Returns the columns, with generated names once rendered.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns the current plan.
    pub fn plan(&self) -> &EditorPlan {
        &self.plan
    }

    /// Returns the editor slots by column name.
    pub fn editors(&self) -> &ReferenceRegistry {
        &self.editors
    }

    /// Returns the live editor of a column, once realized.
    pub fn editor(&self, column: &str) -> Option<&EditorHandle> {
        self.editors.get(column).and_then(|slot| slot.handle())
    }

    /// Returns the tab labels of the current plan.
    pub fn tabs(&self) -> &[String] {
        &self.plan.tabs
    }

    /// Returns the error banners.
    pub fn errors(&self) -> &ErrorState {
        &self.errors
    }

    /// Returns the file selections.
    pub fn files(&self) -> &FileSelections {
        &self.files
    }

    /// Returns the registered file input controls.
    pub fn file_inputs(&self) -> &FileInputRegistry {
        &self.file_inputs
    }

    /// Returns whether a commit is in flight.
    pub fn state(&self) -> CommitState {
        self.state
    }

    /// Returns the planner.
    pub fn planner_mut(&mut self) -> &mut EditorPlanner {
        &mut self.planner
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

fn find_column<'a>(columns: &'a [ColumnDescriptor], name: &str) -> CoreResult<&'a ColumnDescriptor> {
    columns
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| CoreError::ColumnNotFound(name.to_string()))
}
