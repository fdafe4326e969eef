//! Security incidents and access grants.

use crate::Timestamps;
use hops_core::{status_kind, ActionMethod, ActionSpec, Draft, Resource};
use serde::{Deserialize, Serialize};

status_kind! {
    pub enum IncidentStatus {
        Open = "open",
        Investigating = "investigating",
        Resolved = "resolved",
        Closed = "closed",
    }
    terminal = [Closed];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIncident {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub location: String,
    #[serde(default)]
    pub reported_by: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub status: IncidentStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityIncidentDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    pub location: String,
    pub reported_by: String,
    pub description: String,
}

impl Draft for SecurityIncidentDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("title", self.title.as_str()),
            ("type", self.kind.as_str()),
            ("severity", self.severity.as_str()),
            ("location", self.location.as_str()),
        ])
    }
}

impl Resource for SecurityIncident {
    type Status = IncidentStatus;
    type Draft = SecurityIncidentDraft;

    const LABEL: &'static str = "security incident";
    const COLLECTION_PATH: &'static str = "hospital/security/incidents";
    const LIST_KEY: &'static str = "incidents";
    const ITEM_KEY: &'static str = "incident";
    const SELECTORS: &'static [&'static str] = &["type", "severity", "status"];
    const ACTIONS: &'static [ActionSpec<IncidentStatus>] = &[
        ActionSpec {
            name: "investigate",
            method: ActionMethod::Post,
            from: &[IncidentStatus::Open],
            to: &[IncidentStatus::Investigating],
            required: &[],
        },
        ActionSpec {
            name: "resolve",
            method: ActionMethod::Post,
            from: &[IncidentStatus::Open, IncidentStatus::Investigating],
            to: &[IncidentStatus::Resolved],
            required: &["resolution"],
        },
        ActionSpec {
            name: "close",
            method: ActionMethod::Post,
            from: &[IncidentStatus::Resolved],
            to: &[IncidentStatus::Closed],
            required: &[],
        },
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> IncidentStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.location, &self.reported_by]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        match selector {
            "type" => Some(&self.kind),
            "severity" => Some(&self.severity),
            _ => None,
        }
    }
}

status_kind! {
    pub enum AccessStatus {
        Active = "active",
        Expired = "expired",
        Suspended = "suspended",
        Revoked = "revoked",
    }
    terminal = [Expired, Revoked];
}

/// A badge or system access grant held by one staff member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAccess {
    #[serde(alias = "_id")]
    pub id: String,
    pub user_name: String,
    #[serde(default)]
    pub role: String,
    pub access_level: String,
    pub area: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub status: AccessStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityAccessDraft {
    pub user_name: String,
    pub role: String,
    pub access_level: String,
    pub area: String,
    pub expires_at: Option<String>,
}

impl Draft for SecurityAccessDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("userName", self.user_name.as_str()),
            ("accessLevel", self.access_level.as_str()),
            ("area", self.area.as_str()),
        ])
    }
}

impl Resource for SecurityAccess {
    type Status = AccessStatus;
    type Draft = SecurityAccessDraft;

    const LABEL: &'static str = "access grant";
    const COLLECTION_PATH: &'static str = "hospital/security/access";
    const LIST_KEY: &'static str = "access";
    const ITEM_KEY: &'static str = "access";
    const SELECTORS: &'static [&'static str] = &["status", "accessLevel"];
    const ACTIONS: &'static [ActionSpec<AccessStatus>] = &[
        ActionSpec {
            name: "suspend",
            method: ActionMethod::Post,
            from: &[AccessStatus::Active],
            to: &[AccessStatus::Suspended],
            required: &["reason"],
        },
        ActionSpec {
            name: "reinstate",
            method: ActionMethod::Post,
            from: &[AccessStatus::Suspended],
            to: &[AccessStatus::Active],
            required: &[],
        },
        ActionSpec {
            name: "revoke",
            method: ActionMethod::Post,
            from: &[AccessStatus::Active, AccessStatus::Suspended],
            to: &[AccessStatus::Revoked],
            required: &["reason"],
        },
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> AccessStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.user_name, &self.role, &self.area]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        (selector == "accessLevel").then_some(self.access_level.as_str())
    }
}
