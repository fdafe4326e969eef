//! Constants used throughout the hops core crate.

use std::time::Duration;

/// Base URL of the hospital backend when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Interval between refreshes on polled pages.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Upper bound on a single backend request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sentinel a categorical selector holds when it does not narrow the collection.
pub const ALL_SENTINEL: &str = "all";

/// Selector name every resource maps to its status field.
pub const STATUS_SELECTOR: &str = "status";

/// Keys tried, after the resource's own key, when unwrapping a list envelope.
pub const LIST_FALLBACK_KEYS: &[&str] = &["data", "resources"];

/// Keys tried, after the resource's own key, when unwrapping an item envelope.
pub const ITEM_FALLBACK_KEYS: &[&str] = &["data", "resource"];

/// Shown when the collection is empty and no filter is active.
pub const EMPTY_COLLECTION_MESSAGE: &str = "No records submitted yet";

/// Shown when filters narrow a non-empty collection down to nothing.
pub const NO_MATCHES_MESSAGE: &str = "No records match filters";
