//! # HOPS Core
//!
//! The list-resource pattern every hospital-operations page is built from:
//! - [`Resource`]: the contract a backend collection fulfils (status enumeration, selectors,
//!   status-transition actions)
//! - [`ResourceApi`] / [`HttpResourceClient`]: one HTTP call per operation, envelopes unwrapped
//! - [`ListViewModel`]: the in-memory collection, filters, statistics and notices of one page
//! - [`MutationDialog`] / [`TransitionDialog`]: create/edit forms and guarded status changes
//! - [`PollingRefresher`]: timed re-fetch for live pages
//!
//! **No presentation concerns**: rendering belongs in the CLI; serving the REST contract belongs
//! in `api-rest`.

pub mod client;
pub mod config;
pub mod constants;
pub mod dialog;
pub mod envelope;
pub mod error;
pub mod export;
pub mod filter;
pub mod notice;
pub mod polling;
pub mod resource;
pub mod stats;
pub mod transition;
pub mod view_model;

pub use client::{HttpClient, HttpResourceClient, ResourceApi};
pub use config::CoreConfig;
pub use dialog::{draft_of, DialogMode, Draft, MutationDialog, TransitionDialog};
pub use error::{ErrorKind, OpsError, OpsResult};
pub use export::{csv_table, summary_csv, ExportBlob, ExportFormat, ExportQuery};
pub use filter::{FilterSet, Selector};
pub use notice::{sentence_case, Notice, NoticeLevel};
pub use polling::{PollingRefresher, Refresh};
pub use resource::{parse_status, ActionMethod, ActionSpec, Resource, StatusKind};
pub use stats::StatusCounts;
pub use transition::run_transition;
pub use view_model::{EmptyState, ListViewModel, RefreshOutcome};

pub use tokio_util::sync::CancellationToken;
