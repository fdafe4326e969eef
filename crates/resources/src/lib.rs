//! # HOPS Resources
//!
//! Concrete hospital-operations collections, one module per page family. Each type implements
//! [`hops_core::Resource`], so every page is the same generic view model over a different
//! record.

pub mod admissions;
pub mod ambulance;
pub mod discharges;
pub mod kind;
pub mod maintenance;
pub mod patients;
pub mod security;
pub mod staff;

pub use admissions::{AdmissionRequest, AdmissionRequestDraft, AdmissionStatus};
pub use ambulance::{
    AmbulanceRoute, CallStatus, DispatchCall, DispatchCallStatus, DispatchOperator,
    EmergencyCall, OperatorStatus, RouteStatus, Severity,
};
pub use discharges::{Discharge, DischargeDraft, DischargeStatus};
pub use kind::ResourceKind;
pub use maintenance::{AssetStatus, Equipment, Facility, FacilityStatus};
pub use patients::{PatientRecord, PatientTracking, RecordType, TrackingStatus};
pub use security::{AccessStatus, IncidentStatus, SecurityAccess, SecurityIncident};
pub use staff::{Doctor, EmploymentStatus, Nurse, Training, TrainingStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-set bookkeeping carried by every record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
