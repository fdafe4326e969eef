//! Status-transition guard.
//!
//! Before an irreversible status change the current server copy of the record is read back
//! and its status checked against the action's accepted states. This is check-then-act, not a
//! lock: two operators can still both pass the check before either write lands.

use crate::client::ResourceApi;
use crate::notice::{sentence_case, Notice};
use crate::resource::{ActionSpec, Resource, StatusKind};
use crate::view_model::ListViewModel;
use crate::{OpsError, OpsResult};
use serde_json::Value;

/// Apply `action` to record `id`, guarded by a read-check of its current status.
///
/// Validation failures return before any network call. A record that is gone or has moved on
/// aborts the action without a mutating call and re-fetches the collection, as does a
/// rejection of the action itself.
pub async fn run_transition<R, C>(
    model: &ListViewModel<R, C>,
    id: &str,
    action: &'static ActionSpec<R::Status>,
    payload: &Value,
) -> OpsResult<R>
where
    R: Resource,
    C: ResourceApi<R>,
{
    let missing = action.missing_fields(payload);
    if !missing.is_empty() {
        return Err(OpsError::Validation {
            fields: missing.into_iter().map(str::to_string).collect(),
        });
    }
    let target = action.target(payload)?;

    let fallback = format!("Failed to {} {}", action.name, R::LABEL);

    let current = model.scoped(model.client().fetch(id)).await;
    let current = match model.settle(current, &fallback)? {
        Some(record) => record,
        None => {
            let err = OpsError::NotFound {
                label: R::LABEL,
                id: id.to_string(),
            };
            model.push_notice(Notice::from_error(&err, &fallback));
            model.reload().await;
            return Err(err);
        }
    };

    let actual = current.status();
    if !action.permits(actual) {
        let err = OpsError::StaleState {
            label: R::LABEL,
            expected: action.expected(),
            actual: actual.as_str(),
        };
        tracing::info!(
            "{} {} moved to {} before {}; refreshing",
            R::LABEL,
            id,
            actual.as_str(),
            action.name
        );
        model.push_notice(Notice::from_error(&err, &fallback));
        model.reload().await;
        return Err(err);
    }

    let result = model.scoped(model.client().perform(id, action, payload)).await;
    match model.settle(result, &fallback) {
        Ok(updated) => {
            tracing::debug!("{} {} now {}", R::LABEL, id, target.as_str());
            model.push_notice(Notice::success(format!(
                "{} {}",
                sentence_case(R::LABEL),
                updated.status().as_str()
            )));
            model.reload().await;
            Ok(updated)
        }
        Err(OpsError::Cancelled) => Err(OpsError::Cancelled),
        Err(err) => {
            model.reload().await;
            Err(err)
        }
    }
}
