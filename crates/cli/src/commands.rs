//! Subcommand bodies, generic over the resource they act on.

use crate::args;
use crate::render;
use anyhow::{bail, Context};
use async_trait::async_trait;
use hops_core::{
    draft_of, summary_csv, CancellationToken, CoreConfig, ExportBlob, ExportFormat, ExportQuery,
    HttpClient, HttpResourceClient, ListViewModel, MutationDialog, PollingRefresher, Refresh,
    RefreshOutcome, Resource, ResourceApi, StatusKind, TransitionDialog,
};
use hops_types::NonEmptyText;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Search term and selectors applied before a page is shown.
#[derive(Debug, Default)]
pub struct View {
    pub search: Option<String>,
    pub filters: Vec<String>,
}

#[derive(Debug)]
pub enum Action {
    List(View),
    Stats { by: Option<String> },
    Show { id: NonEmptyText },
    Create { fields: Vec<String>, json: Option<String> },
    Update { id: NonEmptyText, fields: Vec<String>, json: Option<String> },
    Delete { id: NonEmptyText },
    Transition { id: NonEmptyText, action: String, fields: Vec<String> },
    Export { view: View, format: ExportFormat, local: bool, out: PathBuf },
    Watch { view: View, interval: Option<u64> },
}

type Model<R> = ListViewModel<R, HttpResourceClient<R>>;

/// Run `action` against the collection behind `R`.
pub async fn run<R: Resource>(cfg: &CoreConfig, action: Action) -> anyhow::Result<()> {
    let client = HttpResourceClient::<R>::new(HttpClient::new(cfg)?);
    let model: Arc<Model<R>> = Arc::new(ListViewModel::new(client));

    let result = dispatch(cfg, &model, action).await;

    // A failure is reported once, by the caller, not again as a notice.
    let failure = result.as_ref().err().map(|e| e.to_string());
    let notices = model
        .take_notices()
        .into_iter()
        .filter(|n| !(n.is_error() && Some(&n.message) == failure.as_ref()))
        .collect();
    render::notices(notices);
    model.close();
    result
}

async fn dispatch<R: Resource>(
    cfg: &CoreConfig,
    shared: &Arc<Model<R>>,
    action: Action,
) -> anyhow::Result<()> {
    let model: &Model<R> = shared;
    match action {
        Action::List(view) => {
            load(model).await?;
            apply_view(model, &view)?;
            print!("{}", render::table(&model.filtered(), model.empty_state()));
        }
        Action::Stats { by } => {
            load(model).await?;
            print!("{}", render::stats(&model.stats()));
            if let Some(selector) = by {
                if !R::SELECTORS.contains(&selector.as_str()) {
                    bail!(
                        "{} has no {selector:?} selector (expected one of: {})",
                        R::LABEL,
                        R::SELECTORS.join(", ")
                    );
                }
                print!("{}", render::tally(&selector, &model.count_by(&selector)));
            }
        }
        Action::Show { id } => {
            let record = model
                .client()
                .fetch(id.as_str())
                .await?
                .with_context(|| format!("{} {} not found", R::LABEL, id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Action::Create { fields, json } => {
            let mut dialog = MutationDialog::<R::Draft>::new();
            dialog.open_create();
            *dialog.draft_mut() = draft_from::<R>(&args::payload(&fields, json.as_deref())?)?;
            let created = submit(&mut dialog, model).await?;
            println!("{}", created.id());
        }
        Action::Update { id, fields, json } => {
            let current = model
                .client()
                .fetch(id.as_str())
                .await?
                .with_context(|| format!("{} {} not found", R::LABEL, id))?;

            let mut merged = serde_json::to_value(draft_of(&current)?)?;
            if let (Value::Object(base), Value::Object(patch)) =
                (&mut merged, args::payload(&fields, json.as_deref())?)
            {
                base.extend(patch);
            }

            let mut dialog = MutationDialog::<R::Draft>::new();
            dialog.open_edit(id.as_str(), draft_from::<R>(&merged)?);
            submit(&mut dialog, model).await?;
        }
        Action::Delete { id } => {
            model.remove(id.as_str()).await?;
        }
        Action::Transition { id, action, fields } => {
            let mut dialog = TransitionDialog::<R>::new();
            dialog.open(id.as_str(), &action)?;
            if let Value::Object(payload) = args::payload(&fields, None)? {
                for (field, value) in payload {
                    dialog.set(field, value);
                }
            }
            let updated = dialog.submit(model).await?;
            println!("{} is now {}", updated.id(), updated.status().as_str());
        }
        Action::Export {
            view,
            format,
            local,
            out,
        } => {
            let blob = if local {
                if format != ExportFormat::Csv {
                    bail!("only csv can be rendered locally");
                }
                load(model).await?;
                apply_view(model, &view)?;
                let csv = summary_csv(&model.filtered());
                ExportBlob::new::<R>(format, format.content_type().to_string(), csv.into_bytes())
            } else {
                apply_view(model, &view)?;
                let query = ExportQuery::from_filters(format, &model.filters());
                model.client().export(&query).await?
            };
            let path = blob.write_to(&out)?;
            println!("{}", path.display());
        }
        Action::Watch { view, interval } => {
            apply_view(model, &view)?;
            let period = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| cfg.poll_interval());
            watch(Arc::clone(shared), period).await;
        }
    }

    Ok(())
}

/// Fetch the collection once, failing the command if the fetch failed.
async fn load<R: Resource>(model: &Model<R>) -> anyhow::Result<()> {
    match model.refresh().await {
        RefreshOutcome::Loaded(_) => Ok(()),
        RefreshOutcome::Failed(err) => Err(err.into()),
        RefreshOutcome::Skipped | RefreshOutcome::Cancelled => {
            bail!("{} list was not loaded", R::LABEL)
        }
    }
}

fn apply_view<R: Resource>(model: &Model<R>, view: &View) -> anyhow::Result<()> {
    if let Some(term) = &view.search {
        model.set_term(term.as_str());
    }
    for arg in &view.filters {
        let (name, value) = args::filter(arg)?;
        model.set_selector(name, value)?;
    }
    Ok(())
}

fn draft_from<R: Resource>(payload: &Value) -> anyhow::Result<R::Draft> {
    serde_json::from_value(payload.clone())
        .with_context(|| format!("fields do not describe a {}", R::LABEL))
}

async fn submit<R: Resource>(
    dialog: &mut MutationDialog<R::Draft>,
    model: &Model<R>,
) -> anyhow::Result<R> {
    match dialog.submit(model).await {
        Ok(record) => Ok(record),
        Err(err) => match dialog.error() {
            Some(message) => bail!("{message}"),
            None => Err(err.into()),
        },
    }
}

/// Prints the page after every refresh the poller triggers.
struct Printer<R: Resource> {
    model: Arc<Model<R>>,
}

#[async_trait]
impl<R: Resource> Refresh for Printer<R> {
    fn label(&self) -> &'static str {
        R::LABEL
    }

    async fn refresh(&self) -> RefreshOutcome {
        let outcome = self.model.refresh().await;
        if let RefreshOutcome::Loaded(_) = outcome {
            let at = self
                .model
                .fetched_at()
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default();
            println!("-- {} ({at})", R::LABEL);
            print!("{}", render::stats(&self.model.stats()));
            print!(
                "{}",
                render::table(&self.model.filtered(), self.model.empty_state())
            );
        }
        render::notices(self.model.take_notices());
        outcome
    }
}

async fn watch<R: Resource>(model: Arc<Model<R>>, period: Duration) {
    let token = CancellationToken::new();
    let printer: Arc<dyn Refresh> = Arc::new(Printer {
        model: Arc::clone(&model),
    });
    let poller = PollingRefresher::start(vec![printer], period, token.clone());

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {}", e);
    }
    poller.stop().await;
    model.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use hops_resources::EmergencyCall;
    use serde_json::json;

    #[test]
    fn draft_from_rejects_wrong_shapes() {
        assert!(draft_from::<EmergencyCall>(&json!({"patientName": 7})).is_err());
        let draft = draft_from::<EmergencyCall>(&json!({"patientName": "Ann"})).expect("draft");
        assert_eq!(draft.patient_name, "Ann");
    }
}
