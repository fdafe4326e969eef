//! Ambulance service: emergency calls, the dispatch center and route planning.
//!
//! These pages are live: [`ResourceKind::is_polled`](crate::ResourceKind::is_polled) marks
//! which of them the CLI keeps refreshing.

use crate::Timestamps;
use hops_core::{status_kind, ActionMethod, ActionSpec, Draft, Resource};
use serde::{Deserialize, Serialize};

status_kind! {
    pub enum CallStatus {
        Pending = "pending",
        Assigned = "assigned",
        EnRoute = "en-route",
        Arrived = "arrived",
        Completed = "completed",
        Cancelled = "cancelled",
    }
    terminal = [Completed, Cancelled];
}

/// An emergency call as logged by the call center.
///
/// `severity` and `priority` are separate fields: severity is the clinical assessment,
/// priority the dispatch queue position. Neither is derived from the other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyCall {
    #[serde(alias = "_id")]
    pub id: String,
    pub patient_name: String,
    #[serde(default)]
    pub patient_id: String,
    pub phone: String,
    pub location: String,
    pub emergency_type: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub priority: String,
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyCallDraft {
    pub patient_name: String,
    pub patient_id: String,
    pub phone: String,
    pub emergency_type: String,
    pub severity: String,
    pub priority: String,
    pub location: String,
    pub symptoms: Vec<String>,
    pub notes: String,
}

impl Draft for EmergencyCallDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("patientName", self.patient_name.as_str()),
            ("phone", self.phone.as_str()),
            ("emergencyType", self.emergency_type.as_str()),
            ("location", self.location.as_str()),
        ])
    }
}

impl Resource for EmergencyCall {
    type Status = CallStatus;
    type Draft = EmergencyCallDraft;

    const LABEL: &'static str = "emergency call";
    const COLLECTION_PATH: &'static str = "hospital/ambulance/calls";
    const LIST_KEY: &'static str = "data";
    const ITEM_KEY: &'static str = "data";
    const SELECTORS: &'static [&'static str] = &["status", "priority", "type"];
    const ACTIONS: &'static [ActionSpec<CallStatus>] = &[
        ActionSpec {
            name: "dispatch",
            method: ActionMethod::Post,
            from: &[CallStatus::Pending],
            to: &[CallStatus::Assigned],
            required: &["driverId", "vehicleId"],
        },
        ActionSpec {
            name: "cancel",
            method: ActionMethod::Post,
            from: &[CallStatus::Pending, CallStatus::Assigned, CallStatus::EnRoute],
            to: &[CallStatus::Cancelled],
            required: &[],
        },
    ];
    const SUPPORTS_EXPORT: bool = true;

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> CallStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.patient_name, &self.patient_id, &self.location, &self.phone]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        match selector {
            "priority" => Some(&self.priority),
            "type" => Some(&self.emergency_type),
            _ => None,
        }
    }
}

status_kind! {
    pub enum DispatchCallStatus {
        Incoming = "incoming",
        Processing = "processing",
        Dispatched = "dispatched",
        EnRoute = "en-route",
        Arrived = "arrived",
        Completed = "completed",
    }
    terminal = [Completed];
}

/// Clinical severity on the dispatch board.
///
/// The dispatch backend reports `mild`, `moderate` and `severe`; anything else it sends is
/// treated as critical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "mild")]
    Low,
    #[serde(alias = "moderate")]
    Medium,
    #[serde(alias = "severe")]
    High,
    #[serde(other)]
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchCall {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub call_number: String,
    pub caller_name: String,
    pub caller_phone: String,
    #[serde(default)]
    pub emergency_type: String,
    pub severity: Severity,
    pub location: String,
    pub status: DispatchCallStatus,
    #[serde(default)]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_vehicle: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub dispatch_notes: Vec<String>,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchCallDraft {
    pub caller_name: String,
    pub caller_phone: String,
    pub emergency_type: String,
    pub severity: String,
    pub priority: String,
    pub location: String,
    pub symptoms: Vec<String>,
}

impl Draft for DispatchCallDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("callerName", self.caller_name.as_str()),
            ("callerPhone", self.caller_phone.as_str()),
            ("severity", self.severity.as_str()),
            ("location", self.location.as_str()),
        ])
    }
}

impl Resource for DispatchCall {
    type Status = DispatchCallStatus;
    type Draft = DispatchCallDraft;

    const LABEL: &'static str = "dispatch call";
    const COLLECTION_PATH: &'static str = "hospital/ambulance/dispatch/calls";
    const LIST_KEY: &'static str = "data";
    const ITEM_KEY: &'static str = "data";
    const SELECTORS: &'static [&'static str] = &["status", "severity"];
    const ACTIONS: &'static [ActionSpec<DispatchCallStatus>] = &[ActionSpec {
        name: "dispatch",
        method: ActionMethod::Post,
        from: &[DispatchCallStatus::Incoming, DispatchCallStatus::Processing],
        to: &[DispatchCallStatus::Dispatched],
        required: &["driverId", "vehicleId"],
    }];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> DispatchCallStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.call_number, &self.caller_name, &self.location]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        (selector == "severity").then_some(self.severity.as_str())
    }

    fn normalize(mut self) -> Self {
        if self.call_number.trim().is_empty() {
            let tail = self.id.len().saturating_sub(6);
            self.call_number = format!("CALL-{}", self.id.get(tail..).unwrap_or(&self.id).to_uppercase());
        }
        self
    }
}

status_kind! {
    pub enum OperatorStatus {
        Available = "available",
        Busy = "busy",
        Offline = "offline",
    }
    terminal = [];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOperator {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub status: OperatorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_call: Option<String>,
    #[serde(default)]
    pub calls_handled: u32,
    #[serde(default)]
    pub average_response_time: f64,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchOperatorDraft {
    pub name: String,
}

impl Draft for DispatchOperatorDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[("name", self.name.as_str())])
    }
}

impl Resource for DispatchOperator {
    type Status = OperatorStatus;
    type Draft = DispatchOperatorDraft;

    const LABEL: &'static str = "dispatch operator";
    const COLLECTION_PATH: &'static str = "hospital/ambulance/dispatch/operators";
    const LIST_KEY: &'static str = "data";
    const ITEM_KEY: &'static str = "data";

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> OperatorStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.current_call.as_deref());
        fields
    }

    fn category(&self, _selector: &str) -> Option<&str> {
        None
    }
}

status_kind! {
    pub enum RouteStatus {
        Planned = "planned",
        Active = "active",
        Completed = "completed",
        Cancelled = "cancelled",
    }
    terminal = [Completed, Cancelled];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbulanceRoute {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub estimated_minutes: u32,
    #[serde(default)]
    pub traffic: String,
    pub status: RouteStatus,
    #[serde(flatten)]
    pub stamps: Timestamps,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AmbulanceRouteDraft {
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub estimated_minutes: u32,
    pub traffic: String,
}

impl Draft for AmbulanceRouteDraft {
    fn missing_fields(&self) -> Vec<&'static str> {
        hops_types::missing_fields(&[
            ("name", self.name.as_str()),
            ("origin", self.origin.as_str()),
            ("destination", self.destination.as_str()),
        ])
    }
}

impl Resource for AmbulanceRoute {
    type Status = RouteStatus;
    type Draft = AmbulanceRouteDraft;

    const LABEL: &'static str = "route";
    const COLLECTION_PATH: &'static str = "hospital/ambulance/routes";
    const LIST_KEY: &'static str = "data";
    const ITEM_KEY: &'static str = "data";
    const SELECTORS: &'static [&'static str] = &["status", "traffic"];

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> RouteStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.origin, &self.destination]
    }

    fn category(&self, selector: &str) -> Option<&str> {
        (selector == "traffic").then_some(self.traffic.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hops_core::envelope::unwrap_list;
    use hops_core::FilterSet;
    use serde_json::json;

    #[test]
    fn dispatch_severity_is_normalized() {
        let body = json!({"success": true, "data": [
            {"id": "a1", "callerName": "A", "callerPhone": "1", "location": "Main St", "severity": "mild", "status": "incoming"},
            {"id": "a2", "callerName": "B", "callerPhone": "2", "location": "Elm St", "severity": "moderate", "status": "incoming"},
            {"id": "a3", "callerName": "C", "callerPhone": "3", "location": "Oak St", "severity": "severe", "status": "processing"},
            {"id": "a4", "callerName": "D", "callerPhone": "4", "location": "Pine St", "severity": "life-threatening", "status": "dispatched"},
        ]});
        let calls = unwrap_list::<DispatchCall>(body).expect("unwrap");
        let severities: Vec<&str> = calls.iter().map(|c| c.severity.as_str()).collect();
        assert_eq!(severities, vec!["low", "medium", "high", "critical"]);
    }

    #[test]
    fn dispatch_call_gets_a_call_number() {
        let body = json!({"data": [
            {"id": "64fa0c9e12ab", "callerName": "A", "callerPhone": "1", "location": "x", "severity": "low", "status": "incoming"},
        ]});
        let calls = unwrap_list::<DispatchCall>(body).expect("unwrap");
        assert_eq!(calls[0].call_number, "CALL-9E12AB");
    }

    #[test]
    fn emergency_priority_filter_ignores_severity() {
        let call: EmergencyCall = serde_json::from_value(json!({
            "id": "1",
            "patientName": "Ada",
            "phone": "555",
            "location": "Harbor",
            "emergencyType": "cardiac",
            "severity": "critical",
            "priority": "low",
            "status": "pending",
        }))
        .expect("decode");

        let mut filters = FilterSet::new();
        filters.select::<EmergencyCall>("priority", "critical").expect("select");
        assert!(!filters.matches(&call));
        filters.select::<EmergencyCall>("priority", "low").expect("select");
        assert!(filters.matches(&call));
    }

    #[test]
    fn dispatch_requires_driver_and_vehicle() {
        let dispatch = EmergencyCall::action("dispatch").expect("dispatch");
        assert_eq!(
            dispatch.missing_fields(&json!({"driverId": "D-1", "vehicleId": ""})),
            vec!["vehicleId"]
        );
        assert!(!dispatch.permits(CallStatus::Assigned));
    }
}
