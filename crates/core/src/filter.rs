//! Filter Predicate Set: free-text term plus categorical selectors.
//!
//! A record passes iff the term (case-insensitive) is a substring of at least one searchable
//! field and every active selector equals the record's value exactly. The filtered view is
//! recomputed from the full collection on demand; there is no ranking and no fuzzy matching.
//!
//! The term is trimmed before matching, so stray leading or trailing spaces typed into the
//! search box neither hide records nor count as an active filter.

use crate::constants::ALL_SENTINEL;
use crate::resource::Resource;
use crate::{OpsError, OpsResult};
use std::collections::BTreeMap;

/// One categorical selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selector {
    #[default]
    All,
    Is(String),
}

impl Selector {
    /// Parse a raw UI value; the `all` sentinel and blank values do not narrow.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_SENTINEL) {
            Selector::All
        } else {
            Selector::Is(value.to_string())
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Selector::Is(_))
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Selector::All => None,
            Selector::Is(v) => Some(v),
        }
    }
}

/// Transient filter state for one page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSet {
    term: String,
    selectors: BTreeMap<String, Selector>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    /// Set a selector for resource `R`, rejecting names the resource does not declare.
    pub fn select<R: Resource>(&mut self, name: &str, value: &str) -> OpsResult<()> {
        if !R::SELECTORS.contains(&name) {
            return Err(OpsError::InvalidInput(format!(
                "{} has no {name:?} filter (available: {})",
                R::LABEL,
                R::SELECTORS.join(", ")
            )));
        }
        self.selectors.insert(name.to_string(), Selector::parse(value));
        Ok(())
    }

    pub fn selector(&self, name: &str) -> &Selector {
        static ALL: Selector = Selector::All;
        self.selectors.get(name).unwrap_or(&ALL)
    }

    /// Active selectors as `(name, value)` pairs, in name order.
    pub fn active_selectors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.selectors
            .iter()
            .filter_map(|(name, sel)| sel.as_value().map(|v| (name.as_str(), v)))
    }

    /// True when the term is non-blank or any selector is off its sentinel.
    pub fn is_active(&self) -> bool {
        !self.term.trim().is_empty() || self.selectors.values().any(Selector::is_active)
    }

    /// Back to the "show everything" state.
    pub fn reset(&mut self) {
        self.term.clear();
        self.selectors.clear();
    }

    pub fn matches<R: Resource>(&self, record: &R) -> bool {
        self.matches_term(record) && self.matches_selectors(record)
    }

    /// Records passing every predicate, in collection order.
    pub fn apply<'a, R: Resource>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }

    fn matches_term<R: Resource>(&self, record: &R) -> bool {
        let needle = self.term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record
            .search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_selectors<R: Resource>(&self, record: &R) -> bool {
        self.active_selectors()
            .all(|(name, value)| record.selector_value(name) == Some(value))
    }
}
