mod args;
mod commands;
mod render;

use clap::{Args, Parser, Subcommand};
use commands::{Action, View};
use hops_core::config::{
    api_base_url_from_env_value, poll_interval_from_env_value, request_timeout_from_env_value,
};
use hops_core::{CoreConfig, ExportFormat};
use hops_resources::{with_resource_kind, ResourceKind};
use hops_types::NonEmptyText;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hops")]
#[command(about = "Hospital operations pages from the terminal")]
struct Cli {
    /// API base URL (overrides HOPS_API_BASE_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Free-text search over the page's searchable fields
    #[arg(short, long)]
    search: Option<String>,
    /// Selector as name=value, e.g. status=pending (repeatable; "all" clears it)
    #[arg(short, long = "filter")]
    filters: Vec<String>,
}

impl From<ViewArgs> for View {
    fn from(v: ViewArgs) -> Self {
        View {
            search: v.search,
            filters: v.filters,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the resource pages this tool knows about
    Kinds,
    /// List records
    List {
        resource: ResourceKind,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Per-status counts, optionally tallied by another selector
    Stats {
        resource: ResourceKind,
        /// Selector to tally values of, e.g. department
        #[arg(long)]
        by: Option<String>,
    },
    /// Show one record as JSON
    Show {
        resource: ResourceKind,
        id: NonEmptyText,
    },
    /// Create a record
    Create {
        resource: ResourceKind,
        /// Field as key=value, or key:=json for numbers and lists (repeatable)
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
        /// Whole payload as a JSON object; --field values win
        #[arg(long)]
        json: Option<String>,
    },
    /// Edit a record
    Update {
        resource: ResourceKind,
        id: NonEmptyText,
        /// Field as key=value, or key:=json (repeatable)
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
        #[arg(long)]
        json: Option<String>,
    },
    /// Delete a record
    Delete {
        resource: ResourceKind,
        id: NonEmptyText,
    },
    /// Run a status transition such as review, approve or dispatch
    Transition {
        resource: ResourceKind,
        id: NonEmptyText,
        action: String,
        /// Payload field as key=value, e.g. reviewNotes="Bed 4" (repeatable)
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
    },
    /// Download an export of the (filtered) page
    Export {
        resource: ResourceKind,
        #[command(flatten)]
        view: ViewArgs,
        /// csv or pdf
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Render the filtered view locally instead of asking the backend
        #[arg(long)]
        local: bool,
        /// Directory to write the file into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Keep refreshing a page until Ctrl-C
    Watch {
        resource: ResourceKind,
        #[command(flatten)]
        view: ViewArgs,
        /// Seconds between refreshes (default HOPS_POLL_INTERVAL_SECS)
        #[arg(long)]
        interval: Option<u64>,
    },
}

impl Commands {
    fn split(self) -> Option<(ResourceKind, Action)> {
        let pair = match self {
            Commands::Kinds => return None,
            Commands::List { resource, view } => (resource, Action::List(view.into())),
            Commands::Stats { resource, by } => (resource, Action::Stats { by }),
            Commands::Show { resource, id } => (resource, Action::Show { id }),
            Commands::Create {
                resource,
                fields,
                json,
            } => (resource, Action::Create { fields, json }),
            Commands::Update {
                resource,
                id,
                fields,
                json,
            } => (resource, Action::Update { id, fields, json }),
            Commands::Delete { resource, id } => (resource, Action::Delete { id }),
            Commands::Transition {
                resource,
                id,
                action,
                fields,
            } => (resource, Action::Transition { id, action, fields }),
            Commands::Export {
                resource,
                view,
                format,
                local,
                out,
            } => (
                resource,
                Action::Export {
                    view: view.into(),
                    format,
                    local,
                    out,
                },
            ),
            Commands::Watch {
                resource,
                view,
                interval,
            } => (
                resource,
                Action::Watch {
                    view: view.into(),
                    interval,
                },
            ),
        };
        Some(pair)
    }
}

fn config(api_url: Option<String>) -> anyhow::Result<CoreConfig> {
    let base_url =
        api_base_url_from_env_value(api_url.or_else(|| std::env::var("HOPS_API_BASE_URL").ok()));
    let token = std::env::var("HOPS_API_TOKEN").ok();
    let timeout =
        request_timeout_from_env_value(std::env::var("HOPS_REQUEST_TIMEOUT_SECS").ok())?;
    let poll = poll_interval_from_env_value(std::env::var("HOPS_POLL_INTERVAL_SECS").ok())?;
    Ok(CoreConfig::new(base_url, token, timeout, poll)?)
}

fn print_kinds() {
    for kind in ResourceKind::ALL {
        let path = with_resource_kind!(*kind, R => <R as hops_core::Resource>::COLLECTION_PATH);
        let live = if kind.is_polled() { "  (live)" } else { "" };
        println!("{:<20} /{}{}", kind.as_str(), path, live);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hops=warn".parse()?)
                .add_directive("hops_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some((kind, action)) = cli.command.split() else {
        print_kinds();
        return Ok(());
    };

    let cfg = config(cli.api_url)?;
    tracing::debug!("using {} for {}", cfg.api_base_url(), kind);

    with_resource_kind!(kind, R => commands::run::<R>(&cfg, action).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn transition_arguments_parse() {
        let cli = Cli::try_parse_from([
            "hops",
            "transition",
            "admission-requests",
            "665f",
            "review",
            "-F",
            "status=approved",
            "-F",
            "reviewNotes=Bed 4",
        ])
        .expect("parse");

        let (kind, action) = cli.command.split().expect("action");
        assert_eq!(kind, ResourceKind::AdmissionRequests);
        match action {
            Action::Transition { id, action, fields } => {
                assert_eq!(id.as_str(), "665f");
                assert_eq!(action, "review");
                assert_eq!(fields, vec!["status=approved", "reviewNotes=Bed 4"]);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn blank_ids_and_unknown_pages_are_refused() {
        assert!(Cli::try_parse_from(["hops", "show", "doctors", "  "]).is_err());
        assert!(Cli::try_parse_from(["hops", "list", "wards"]).is_err());
    }

    #[test]
    fn export_defaults_to_csv_in_current_directory() {
        let cli = Cli::try_parse_from(["hops", "export", "emergency-calls", "-f", "status=pending"])
            .expect("parse");
        match cli.command.split().expect("action").1 {
            Action::Export {
                view,
                format,
                local,
                out,
            } => {
                assert_eq!(format, ExportFormat::Csv);
                assert!(!local);
                assert_eq!(out, PathBuf::from("."));
                assert_eq!(view.filters, vec!["status=pending"]);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }
}
