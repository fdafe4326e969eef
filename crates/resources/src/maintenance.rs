//! Equipment maintenance and facility management.

use crate::Timestamps;
use hops_core::{status_kind, Draft, Resource};
use serde::{Deserialize, Serialize};

status_kind! {
    pub enum AssetStatus {
        Operational = "operational",
        Maintenance = "maintenance",
        Repair = "repair",
        OutOfService = "out-of-service",
        Calibration = "calibration",
    }
    terminal = [];
}

status_kind! {
    pub enum FacilityStatus {
        Operational = "operational",
        Maintenance = "maintenance",
        Repair = "repair",
        OutOfService = "out-of-service",
        Upgrade = "upgrade",
    }
    terminal = [];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial_number: String,
    pub location: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_maintenance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_maintenance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_technician: Option<String>,
    pub status: AssetStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub model: String,
    pub serial_number: String,
    pub location: String,
    pub priority: String,
    pub next_maintenance: Option<String>,
}

impl Draft for EquipmentDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("name", self.name.as_str()),
            ("type", self.kind.as_str()),
            ("location", self.location.as_str()),
        ])
    }
}

impl Resource for Equipment {
    type Status = AssetStatus;
    type Draft = EquipmentDraft;

    const LABEL: &'static str = "equipment";
    const COLLECTION_PATH: &'static str = "hospital/equipment";
    const LIST_KEY: &'static str = "equipment";
    const ITEM_KEY: &'static str = "equipment";
    const SELECTORS: &'static [&'static str] = &["type", "status", "priority"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> AssetStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.model, &self.serial_number, &self.location]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        match selector {
            "type" => Some(&self.kind),
            "priority" => Some(&self.priority),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    #[serde(default)]
    pub floor: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_inspection: Option<String>,
    pub status: FacilityStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacilityDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub floor: String,
    pub capacity: u32,
    pub priority: String,
}

impl Draft for FacilityDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("name", self.name.as_str()),
            ("type", self.kind.as_str()),
            ("location", self.location.as_str()),
        ])
    }
}

impl Resource for Facility {
    type Status = FacilityStatus;
    type Draft = FacilityDraft;

    const LABEL: &'static str = "facility";
    const COLLECTION_PATH: &'static str = "hospital/facilities";
    const LIST_KEY: &'static str = "facilities";
    const ITEM_KEY: &'static str = "facility";
    const SELECTORS: &'static [&'static str] = &["type", "status", "priority"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> FacilityStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.location, &self.floor]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        match selector {
            "type" => Some(&self.kind),
            "priority" => Some(&self.priority),
            _ => None,
        }
    }
}
