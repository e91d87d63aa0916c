//! Request and response types for the DNS platform backend API.
//!
//! Field names follow the API's snake_case JSON. Response structs default
//! every field because the backend omits empty values.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Session ──────────────────────────────────────────────────────────────

/// Login request body sent to POST /api/v1/users/login.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

/// Login response data.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub name: String,
    pub jwt_token: String,
}

// ── System: APIs, roles, users, audit ────────────────────────────────────

/// A backend route registered for RBAC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Api {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    pub path: String,
    pub method: String,
    pub description: String,
    pub active: bool,
    pub audit: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Body for PUT /api/v1/apis. Unset flags are left unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateApiRequest {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
    pub name_cn: String,
    pub api_ids: Vec<u64>,
    /// Only filled by GET /api/v1/roles/{id}/apis.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub accessible_apis: Vec<Api>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_cn: Option<String>,
}

/// Body for POST /api/v1/roles.
#[derive(Debug, Clone, Serialize)]
pub struct NewRole {
    pub name: String,
    pub name_cn: String,
    pub api_ids: Vec<u64>,
}

/// Body for PUT /api/v1/roles.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRoleRequest {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_cn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_ids: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
    pub name_cn: String,
    pub email: String,
    pub active: bool,
    pub last_login: String,
    pub login_times: u64,
    pub role_ids: Vec<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_cn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
}

/// Body for POST /api/v1/users.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub name_cn: String,
    pub email: String,
    pub role_ids: Vec<u64>,
}

/// Body for PUT /api/v1/users.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserRequest {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_ids: Option<Vec<u64>>,
}

/// One audited API call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditLog {
    pub id: u64,
    pub created_at: String,
    pub user_name: String,
    pub request_id: String,
    pub client_ip: String,
    pub url: String,
    pub method: String,
    pub request_body: String,
    pub response_body: String,
    /// Milliseconds.
    pub time_cost: u64,
}

/// Times use the backend's `2006-01-02 15:04:05` layout.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

// ── DNS ──────────────────────────────────────────────────────────────────

/// Authoritative zone managed through dynamic updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    pub zone: String,
    pub ns_address: String,
    pub tsig_name: String,
    pub description: String,
    pub creator: String,
}

/// Body for POST /api/v1/dns/zones.
#[derive(Debug, Clone, Serialize)]
pub struct NewZone {
    pub zone: String,
    pub ns_address: String,
    pub tsig_name: String,
    pub tsig_secret: String,
    pub description: String,
}

/// Body for PUT /api/v1/dns/zones. Empty fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateZoneRequest {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ns_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsig_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsig_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A resource record as the backend models it (FQDN names).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRecord {
    pub record_name: String,
    pub record_ttl: u32,
    pub zone: String,
    pub record_type: String,
    pub record_content: String,
}

/// A stored record with bookkeeping fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsRecord {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub rr: ResourceRecord,
    pub creator: String,
    pub extra_info: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_content: Option<String>,
}

/// Body for POST /api/v1/dns/records. A/AAAA content may list several
/// addresses separated by `,`.
pub type NewRecord = ResourceRecord;

/// Body for PUT /api/v1/dns/records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateRecordRequest {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_content: Option<String>,
}

/// Query for DELETE /api/v1/dns/records.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteRecordQuery {
    pub id: u64,
    /// Also remove every other record of the same name and type.
    pub clean: bool,
}

/// Answers from one public resolver for an EDNS client-subnet query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdnsAnswer {
    pub isp: String,
    pub client_ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dns_rrs: Vec<ResourceRecord>,
}

/// A public resolver used for EDNS queries, labelled `{province}-{isp}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IspResolver {
    pub isp: String,
    pub dns_ip: String,
}

// ── Probes (scheduled jobs) ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskArgs {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub function_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskRun {
    pub uid: String,
    pub succeed: bool,
    pub call_at: String,
    pub error: String,
}

/// A scheduled probe job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cronjob {
    pub id: u64,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
    /// Cron expression with a seconds field.
    pub spec: String,
    pub creator: String,
    pub description: String,
    pub started: bool,
    pub last_succeed: bool,
    /// `http`, `function` or `shell`.
    pub task_type: String,
    pub task_args: TaskArgs,
    /// Most recent runs, newest last.
    #[serde(deserialize_with = "null_as_default")]
    pub history: Vec<TaskRun>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CronjobFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_succeed: Option<bool>,
}

/// Body for POST /api/v1/cronjobs.
#[derive(Debug, Clone, Serialize)]
pub struct NewCronjob {
    pub name: String,
    pub spec: String,
    pub description: String,
    pub task_type: String,
    pub task_args: TaskArgs,
}

/// Body for PUT /api/v1/cronjobs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateCronjobRequest {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_args: Option<TaskArgs>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_flattens_rr_fields() {
        let rec: DnsRecord = serde_json::from_value(json!({
            "id": 3,
            "record_name": "www.test.com.",
            "record_ttl": 60,
            "zone": "test.com.",
            "record_type": "A",
            "record_content": "10.0.0.1,10.0.0.2",
            "creator": "alice"
        }))
        .unwrap();
        assert_eq!(rec.id, 3);
        assert_eq!(rec.rr.record_name, "www.test.com.");
        assert_eq!(rec.rr.record_ttl, 60);
        assert_eq!(rec.creator, "alice");
        assert!(rec.extra_info.is_empty());
    }

    #[test]
    fn test_role_tolerates_omitted_fields() {
        let role: Role = serde_json::from_value(json!({"id": 1, "name": "guest"})).unwrap();
        assert_eq!(role.name, "guest");
        assert!(role.api_ids.is_empty());
        assert!(role.accessible_apis.is_empty());
    }

    #[test]
    fn test_update_requests_omit_unset_fields() {
        let req = UpdateApiRequest {
            id: 9,
            audit: None,
            active: Some(false),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"id": 9, "active": false})
        );

        let req = UpdateUserRequest {
            id: 2,
            email: Some("ops@example.com".into()),
            active: None,
            role_ids: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"id": 2, "email": "ops@example.com"})
        );
    }

    #[test]
    fn test_cronjob_with_history() {
        let job: Cronjob = serde_json::from_value(json!({
            "id": 4,
            "name": "probe-www",
            "spec": "0 */5 * * * *",
            "started": true,
            "last_succeed": false,
            "task_type": "function",
            "task_args": {"function_name": "DnsProbe"},
            "history": [{"uid": "u1", "succeed": false, "error": "mismatch"}]
        }))
        .unwrap();
        assert_eq!(job.task_args.function_name, "DnsProbe");
        assert_eq!(job.history.len(), 1);
        assert!(!job.history[0].succeed);
    }
}
