//! The contract every page-level resource type fulfils.
//!
//! A resource is one backend collection (doctors, discharges, dispatch calls, ...). The view
//! model, the statistics reducer, the transition guard and the development backend only ever see
//! resources through this trait, so each page is an instantiation rather than a copy.

use crate::constants::STATUS_SELECTOR;
use crate::dialog::Draft;
use crate::{OpsError, OpsResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A small closed enumeration of states a record can be in.
///
/// Implementations are normally declared with [`status_kind!`](crate::status_kind).
pub trait StatusKind:
    Copy + Eq + Hash + Ord + Debug + Display + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Every status, in display order. The first entry is the state new records start in.
    const ALL: &'static [Self];

    /// Wire spelling of the status.
    fn as_str(self) -> &'static str;

    /// Terminal statuses admit no further transition.
    fn is_terminal(self) -> bool;

    /// Status assigned to a freshly created record.
    fn initial() -> Self {
        Self::ALL[0]
    }
}

/// Parse `text` as one of `S::ALL` by wire spelling.
pub fn parse_status<S: StatusKind>(text: &str) -> OpsResult<S> {
    let text = text.trim();
    S::ALL
        .iter()
        .copied()
        .find(|s| s.as_str() == text)
        .ok_or_else(|| {
            let known: Vec<&str> = S::ALL.iter().map(|s| s.as_str()).collect();
            OpsError::InvalidInput(format!(
                "unknown status {text:?} (expected one of: {})",
                known.join(", ")
            ))
        })
}

/// Declares a status enumeration and its [`StatusKind`] implementation.
///
/// ```ignore
/// status_kind! {
///     pub enum TrainingStatus {
///         Upcoming = "upcoming",
///         Completed = "completed",
///     }
///     terminal = [Completed];
/// }
/// ```
#[macro_export]
macro_rules! status_kind {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $text:literal ),+ $(,)?
        }
        terminal = [ $( $terminal:ident ),* $(,)? ];
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant, )+
        }

        impl $crate::StatusKind for $name {
            const ALL: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }

            fn is_terminal(self) -> bool {
                false $( || matches!(self, $name::$terminal) )*
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::StatusKind::as_str(*self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::OpsError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $crate::resource::parse_status(s)
            }
        }
    };
}

/// HTTP verb a domain action is issued with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionMethod {
    Post,
    Put,
}

/// A status-transition trigger such as `approve`, `dispatch` or `complete`.
///
/// The action is issued as `<method> <collection>/<id>/<name>`.
#[derive(Debug)]
pub struct ActionSpec<S: 'static> {
    pub name: &'static str,
    pub method: ActionMethod,
    /// Statuses the record must be in for the action to apply.
    pub from: &'static [S],
    /// Reachable statuses. With more than one, the payload's `status` field picks the target.
    pub to: &'static [S],
    /// Payload fields that must be filled in before the action is sent.
    pub required: &'static [&'static str],
}

impl<S: StatusKind> ActionSpec<S> {
    /// Whether a record currently in `current` may take this action.
    pub fn permits(&self, current: S) -> bool {
        self.from.contains(&current)
    }

    /// Spellings of the accepted pre-transition statuses.
    pub fn expected(&self) -> Vec<&'static str> {
        self.from.iter().map(|s| s.as_str()).collect()
    }

    /// Resolve the target status for `payload`.
    pub fn target(&self, payload: &Value) -> OpsResult<S> {
        if let [only] = self.to {
            return Ok(*only);
        }

        let requested = payload
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                OpsError::InvalidInput(format!("{} requires a status field", self.name))
            })?;

        self.to
            .iter()
            .copied()
            .find(|s| s.as_str() == requested)
            .ok_or_else(|| {
                let allowed: Vec<&str> = self.to.iter().map(|s| s.as_str()).collect();
                OpsError::InvalidInput(format!(
                    "{} cannot move a record to {requested:?} (allowed: {})",
                    self.name,
                    allowed.join(", ")
                ))
            })
    }

    /// Required fields that are absent, null, blank strings or empty arrays in `payload`.
    pub fn missing_fields(&self, payload: &Value) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|field| !value_is_filled(payload.get(*field)))
            .collect()
    }
}

pub(crate) fn value_is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => hops_types::is_filled(s),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// One backend collection as seen by the client.
pub trait Resource:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Status: StatusKind;
    type Draft: Draft;

    /// Human name used in messages, e.g. `admission request`.
    const LABEL: &'static str;
    /// Collection path relative to the API base, without leading slash.
    const COLLECTION_PATH: &'static str;
    /// Envelope key the backend uses for the list response.
    const LIST_KEY: &'static str;
    /// Envelope key the backend uses for single-record responses.
    const ITEM_KEY: &'static str;
    /// Categorical selectors understood by [`Resource::selector_value`], `status` first.
    const SELECTORS: &'static [&'static str] = &[STATUS_SELECTOR];
    /// Status-transition triggers beyond plain create/update/delete.
    const ACTIONS: &'static [ActionSpec<Self::Status>] = &[];
    /// Whether the backend offers `<collection>/export`.
    const SUPPORTS_EXPORT: bool = false;

    fn id(&self) -> &str;

    fn status(&self) -> Self::Status;

    /// Values the free-text term is matched against.
    fn search_fields(&self) -> Vec<&str>;

    /// Value of a categorical field other than `status`.
    fn category(&self, selector: &str) -> Option<&str>;

    /// Value of the named categorical field; `status` is always answered from [`Resource::status`].
    fn selector_value(&self, selector: &str) -> Option<&str> {
        if selector == STATUS_SELECTOR {
            return Some(self.status().as_str());
        }
        self.category(selector)
    }

    /// Adjusts a freshly decoded record to the canonical client shape.
    fn normalize(self) -> Self {
        self
    }

    /// Look up an action by name.
    fn action(name: &str) -> OpsResult<&'static ActionSpec<Self::Status>> {
        Self::ACTIONS
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| OpsError::UnknownAction {
                label: Self::LABEL,
                action: name.to_string(),
            })
    }
}
