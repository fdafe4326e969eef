//! Mutation dialogs: the create/edit form and the status-transition form.
//!
//! A dialog owns its draft until it is submitted or cancelled. Required-field checks run before
//! anything goes over the network. After a validation failure or a server rejection the dialog
//! stays open with the error text so the user can correct and retry. A transition whose record
//! has moved on or disappeared is aborted: the dialog closes and the notice carries the reason.

use crate::client::ResourceApi;
use crate::notice::Notice;
use crate::resource::{ActionSpec, Resource};
use crate::transition::run_transition;
use crate::view_model::ListViewModel;
use crate::{ErrorKind, OpsError, OpsResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Debug;

/// Editable fields of a resource, as held by a create/edit form.
pub trait Draft:
    Clone + Default + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Wire names of required fields that are still blank.
    fn missing_fields(&self) -> Vec<&'static str>;

    /// The request body sent on submit.
    fn payload(&self) -> OpsResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| OpsError::InvalidInput(format!("cannot serialize draft: {e}")))
    }
}

/// Copy the editable fields of `record` into a fresh draft.
pub fn draft_of<R: Resource>(record: &R) -> OpsResult<R::Draft> {
    let value = serde_json::to_value(record)
        .map_err(|e| OpsError::InvalidInput(format!("cannot serialize {}: {e}", R::LABEL)))?;
    serde_json::from_value(value)
        .map_err(|e| OpsError::InvalidInput(format!("cannot edit {}: {e}", R::LABEL)))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit(String),
}

#[derive(Debug, Default)]
pub struct MutationDialog<D: Draft> {
    mode: Option<DialogMode>,
    draft: D,
    error: Option<String>,
}

impl<D: Draft> MutationDialog<D> {
    pub fn new() -> Self {
        Self {
            mode: None,
            draft: D::default(),
            error: None,
        }
    }

    pub fn open_create(&mut self) {
        self.mode = Some(DialogMode::Create);
        self.draft = D::default();
        self.error = None;
    }

    pub fn open_edit(&mut self, id: impl Into<String>, draft: D) {
        self.mode = Some(DialogMode::Edit(id.into()));
        self.draft = draft;
        self.error = None;
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<&DialogMode> {
        self.mode.as_ref()
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    /// Inline error from the last failed submit.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Close the dialog and discard the draft.
    pub fn cancel(&mut self) {
        self.mode = None;
        self.draft = D::default();
        self.error = None;
    }

    pub async fn submit<R, C>(&mut self, model: &ListViewModel<R, C>) -> OpsResult<R>
    where
        R: Resource<Draft = D>,
        C: ResourceApi<R>,
    {
        let Some(mode) = self.mode.clone() else {
            return Err(OpsError::InvalidInput("dialog is not open".into()));
        };

        let missing = self.draft.missing_fields();
        if !missing.is_empty() {
            let err = OpsError::Validation {
                fields: missing.iter().map(|f| f.to_string()).collect(),
            };
            self.error = Some(Notice::from_error(&err, "").message);
            return Err(err);
        }

        let payload = self.draft.payload()?;
        let result = match &mode {
            DialogMode::Create => model.create(&payload).await,
            DialogMode::Edit(id) => model.update(id, &payload).await,
        };

        match result {
            Ok(record) => {
                self.cancel();
                Ok(record)
            }
            Err(err) => {
                self.error = Some(Notice::from_error(&err, &format!("Failed to save {}", R::LABEL)).message);
                Err(err)
            }
        }
    }
}

/// Form behind a status-transition button such as approve or dispatch.
#[derive(Debug)]
pub struct TransitionDialog<R: Resource> {
    target: Option<(String, &'static ActionSpec<R::Status>)>,
    fields: Map<String, Value>,
    error: Option<String>,
}

impl<R: Resource> Default for TransitionDialog<R> {
    fn default() -> Self {
        Self {
            target: None,
            fields: Map::new(),
            error: None,
        }
    }
}

impl<R: Resource> TransitionDialog<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the dialog for `action` on record `id`.
    pub fn open(&mut self, id: impl Into<String>, action: &str) -> OpsResult<()> {
        let spec = R::action(action)?;
        self.target = Some((id.into(), spec));
        self.fields.clear();
        self.error = None;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn action(&self) -> Option<&'static ActionSpec<R::Status>> {
        self.target.as_ref().map(|(_, spec)| *spec)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cancel(&mut self) {
        self.target = None;
        self.fields.clear();
        self.error = None;
    }

    pub async fn submit<C: ResourceApi<R>>(&mut self, model: &ListViewModel<R, C>) -> OpsResult<R> {
        let Some((id, action)) = self.target.clone() else {
            return Err(OpsError::InvalidInput("dialog is not open".into()));
        };

        let payload = Value::Object(self.fields.clone());
        match run_transition(model, &id, action, &payload).await {
            Ok(record) => {
                self.cancel();
                Ok(record)
            }
            Err(err) if aborts_transition(&err) => {
                self.cancel();
                Err(err)
            }
            Err(err) => {
                let fallback = format!("Failed to {} {}", action.name, R::LABEL);
                self.error = Some(Notice::from_error(&err, &fallback).message);
                Err(err)
            }
        }
    }
}

/// The record moved on or vanished, so there is nothing left to retry against.
fn aborts_transition(err: &OpsError) -> bool {
    err.kind() == ErrorKind::Conflict || matches!(err, OpsError::NotFound { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeApi;
    use crate::resource::fixtures::{request, Request, RequestDraft, RequestStatus};
    use std::sync::atomic::Ordering;

    async fn loaded(records: Vec<Request>) -> ListViewModel<Request, FakeApi> {
        let model = ListViewModel::new(FakeApi::with_records(records));
        model.refresh().await;
        model
    }

    #[tokio::test]
    async fn create_with_blank_required_field_makes_no_call() {
        let model = loaded(vec![]).await;
        let mut dialog = MutationDialog::<RequestDraft>::new();
        dialog.open_create();
        dialog.draft_mut().patient_name = "Ada Lovelace".into();

        let err = dialog.submit(&model).await.expect_err("diagnosis is blank");
        assert!(matches!(err, OpsError::Validation { ref fields } if fields == &["diagnosis"]));
        assert!(dialog.is_open());
        assert_eq!(dialog.error(), Some("Please fill in all required fields: diagnosis"));
        assert_eq!(model.client().mutating_calls(), 0);
    }

    #[tokio::test]
    async fn successful_create_closes_and_clears_draft() {
        let model = loaded(vec![]).await;
        let mut dialog = MutationDialog::<RequestDraft>::new();
        dialog.open_create();
        *dialog.draft_mut() = RequestDraft {
            patient_name: "Ada Lovelace".into(),
            diagnosis: "fracture".into(),
            urgency: "high".into(),
        };

        let created = dialog.submit(&model).await.expect("create");
        assert_eq!(created.patient_name, "Ada Lovelace");
        assert!(!dialog.is_open());
        assert_eq!(dialog.draft(), &RequestDraft::default());
        assert_eq!(model.records().len(), 1);
    }

    #[tokio::test]
    async fn edit_prefills_from_record_and_cancel_discards() {
        let record = request("AR-1", "John Carter", RequestStatus::Pending);
        let model = loaded(vec![record.clone()]).await;

        let mut dialog = MutationDialog::new();
        dialog.open_edit("AR-1", draft_of(&record).expect("draft"));
        assert_eq!(dialog.draft().patient_name, "John Carter");

        dialog.draft_mut().diagnosis = "pneumonia".into();
        dialog.cancel();
        assert!(!dialog.is_open());
        assert_eq!(model.record("AR-1").map(|r| r.diagnosis), Some("observation".into()));
        assert_eq!(model.client().update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_edit_keeps_dialog_open_with_server_message() {
        let model = loaded(vec![]).await;
        let mut dialog = MutationDialog::new();
        dialog.open_edit(
            "AR-9",
            RequestDraft {
                patient_name: "Ghost".into(),
                diagnosis: "unknown".into(),
                urgency: "low".into(),
            },
        );

        dialog.submit(&model).await.expect_err("record does not exist");
        assert!(dialog.is_open());
        assert_eq!(dialog.error(), Some("Request not found"));
    }

    #[tokio::test]
    async fn approve_with_empty_review_notes_never_reaches_client() {
        let model = loaded(vec![request("AR-1", "John Carter", RequestStatus::Pending)]).await;
        let mut dialog = TransitionDialog::<Request>::new();
        dialog.open("AR-1", "review").expect("open");
        dialog.set("status", "approved");
        dialog.set("reviewNotes", "");

        let err = dialog.submit(&model).await.expect_err("notes required");
        assert!(matches!(err, OpsError::Validation { .. }));
        assert_eq!(dialog.error(), Some("Please fill in all required fields: reviewNotes"));
        assert_eq!(model.client().fetch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(model.client().mutating_calls(), 0);
    }

    #[tokio::test]
    async fn transition_dialog_closes_on_success() {
        let model = loaded(vec![request("AR-1", "John Carter", RequestStatus::Pending)]).await;
        let mut dialog = TransitionDialog::<Request>::new();
        dialog.open("AR-1", "review").expect("open");
        dialog.set("status", "approved");
        dialog.set("reviewNotes", "bed available");

        let updated = dialog.submit(&model).await.expect("approve");
        assert_eq!(updated.status, RequestStatus::Approved);
        assert!(!dialog.is_open());
        assert_eq!(model.stats().get(RequestStatus::Approved), 1);
    }

    #[tokio::test]
    async fn transition_on_already_approved_record_closes_dialog() {
        let model = loaded(vec![request("AR-1", "John Carter", RequestStatus::Approved)]).await;
        let mut dialog = TransitionDialog::<Request>::new();
        dialog.open("AR-1", "review").expect("open");
        dialog.set("status", "approved");
        dialog.set("reviewNotes", "bed available");

        let err = dialog.submit(&model).await.expect_err("already approved");
        assert_eq!(err.to_string(), "This request has already been approved");
        assert!(!dialog.is_open());
        assert_eq!(dialog.error(), None);
        assert_eq!(model.client().mutating_calls(), 0);
        assert_eq!(model.take_notices()[0].message, "This request has already been approved");
    }

    #[tokio::test]
    async fn transition_on_missing_record_closes_dialog() {
        let model = loaded(vec![]).await;
        let mut dialog = TransitionDialog::<Request>::new();
        dialog.open("AR-9", "review").expect("open");
        dialog.set("status", "rejected");
        dialog.set("reviewNotes", "duplicate");

        let err = dialog.submit(&model).await.expect_err("gone");
        assert!(matches!(err, OpsError::NotFound { .. }));
        assert!(!dialog.is_open());
        assert_eq!(model.client().mutating_calls(), 0);
    }

    #[test]
    fn opening_unknown_action_fails() {
        let mut dialog = TransitionDialog::<Request>::new();
        assert!(dialog.open("AR-1", "teleport").is_err());
        assert!(!dialog.is_open());
    }
}
