//! Staff pages: doctors, nurses and training sessions.

use crate::Timestamps;
use hops_core::{status_kind, Draft, Resource};
use serde::{Deserialize, Serialize};

status_kind! {
    pub enum EmploymentStatus {
        Active = "active",
        Inactive = "inactive",
        OnLeave = "on_leave",
        Terminated = "terminated",
    }
    terminal = [Terminated];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(alias = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub license_number: String,
    pub specialty: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub experience: u32,
    pub status: EmploymentStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub specialty: String,
    pub department: String,
    pub experience: u32,
}

impl Draft for DoctorDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("firstName", self.first_name.as_str()),
            ("lastName", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("licenseNumber", self.license_number.as_str()),
            ("specialty", self.specialty.as_str()),
        ])
    }
}

impl Resource for Doctor {
    type Status = EmploymentStatus;
    type Draft = DoctorDraft;

    const LABEL: &'static str = "doctor";
    const COLLECTION_PATH: &'static str = "hospital/doctors";
    const LIST_KEY: &'static str = "doctors";
    const ITEM_KEY: &'static str = "doctor";
    const SELECTORS: &'static [&'static str] = &["status", "specialty"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> EmploymentStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.license_number,
            &self.specialty,
        ]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        (selector == "specialty").then_some(self.specialty.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nurse {
    #[serde(alias = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub license_number: String,
    pub unit: String,
    #[serde(default)]
    pub shift: String,
    pub status: EmploymentStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NurseDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub unit: String,
    pub shift: String,
}

impl Draft for NurseDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("firstName", self.first_name.as_str()),
            ("lastName", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("licenseNumber", self.license_number.as_str()),
            ("unit", self.unit.as_str()),
        ])
    }
}

impl Resource for Nurse {
    type Status = EmploymentStatus;
    type Draft = NurseDraft;

    const LABEL: &'static str = "nurse";
    const COLLECTION_PATH: &'static str = "hospital/nurses";
    const LIST_KEY: &'static str = "nurses";
    const ITEM_KEY: &'static str = "nurse";
    const SELECTORS: &'static [&'static str] = &["status", "unit", "shift"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> EmploymentStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.first_name, &self.last_name, &self.email, &self.license_number]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        match selector {
            "unit" => Some(&self.unit),
            "shift" => Some(&self.shift),
            _ => None,
        }
    }
}

status_kind! {
    pub enum TrainingStatus {
        Upcoming = "upcoming",
        Ongoing = "ongoing",
        Completed = "completed",
        Cancelled = "cancelled",
    }
    terminal = [Completed, Cancelled];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub duration_hours: u32,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub enrolled: u32,
    pub status: TrainingStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingDraft {
    pub title: String,
    pub category: String,
    pub instructor: String,
    pub start_date: String,
    pub duration_hours: u32,
    pub capacity: u32,
}

impl Draft for TrainingDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("title", self.title.as_str()),
            ("category", self.category.as_str()),
        ])
    }
}

impl Resource for Training {
    type Status = TrainingStatus;
    type Draft = TrainingDraft;

    const LABEL: &'static str = "training";
    const COLLECTION_PATH: &'static str = "hospital/trainings";
    const LIST_KEY: &'static str = "trainings";
    const ITEM_KEY: &'static str = "training";
    const SELECTORS: &'static [&'static str] = &["category", "status"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> TrainingStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.instructor]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        (selector == "category").then_some(self.category.as_str())
    }
}
