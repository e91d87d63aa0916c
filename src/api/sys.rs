//! System administration endpoints: login, RBAC (APIs, roles, users) and the
//! audit log.

use serde_json::Value;

use super::client::{ApiClient, NO_QUERY};
use super::envelope::Envelope;
use super::error::ApiError;
use super::pagination::{ListEndpoint, PageQuery};
use super::types::{
    Api, ApiFilter, AuditFilter, AuditLog, LoginRequest, LoginResponse, NewRole, NewUser, Role,
    RoleFilter, UpdateApiRequest, UpdateRoleRequest, UpdateUserRequest, User, UserFilter,
};

const PING: &str = "/api/v1/ping";
const LOGIN: &str = "/api/v1/users/login";
const APIS: &str = "/api/v1/apis";
const ROLES: &str = "/api/v1/roles";
const USERS: &str = "/api/v1/users";
const AUDIT_LOGS: &str = "/api/v1/audit_logs";

/// Unwrap the `data` of a mutation response (usually the affected id).
pub(crate) fn id_of(env: Envelope<Value>) -> Option<u64> {
    env.data.as_ref().and_then(Value::as_u64)
}

/// GET /api/v1/ping.
pub async fn ping(client: &ApiClient) -> Result<Value, ApiError> {
    let env: Envelope<Value> = client.get(PING, NO_QUERY).await?;
    Ok(env.data.unwrap_or(Value::Null))
}

/// POST /api/v1/users/login.
///
/// Returns the issued token; persisting it is the caller's business.
pub async fn login(client: &ApiClient, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
    let env: Envelope<LoginResponse> = client.post(LOGIN, request).await?;
    env.data.ok_or_else(|| ApiError::Application {
        request_id: env.request_id.clone(),
        message: Some("login response carried no token".to_string()),
    })
}

// ── APIs ─────────────────────────────────────────────────────────────────

pub async fn list_apis(
    client: &ApiClient,
    filter: &ApiFilter,
    page: PageQuery,
) -> Result<Envelope<Vec<Api>>, ApiError> {
    ListEndpoint::new(client, APIS, filter).page(page).await
}

/// Every registered API, across all pages.
pub async fn all_apis(
    client: &ApiClient,
    filter: &ApiFilter,
    page_size: u64,
) -> Result<Vec<Api>, ApiError> {
    ListEndpoint::new(client, APIS, filter).all(page_size).await
}

pub async fn update_api(
    client: &ApiClient,
    request: &UpdateApiRequest,
) -> Result<Option<u64>, ApiError> {
    client.put(APIS, request).await.map(id_of)
}

// ── Roles ────────────────────────────────────────────────────────────────

pub async fn list_roles(
    client: &ApiClient,
    filter: &RoleFilter,
    page: PageQuery,
) -> Result<Envelope<Vec<Role>>, ApiError> {
    ListEndpoint::new(client, ROLES, filter).page(page).await
}

pub async fn all_roles(
    client: &ApiClient,
    filter: &RoleFilter,
    page_size: u64,
) -> Result<Vec<Role>, ApiError> {
    ListEndpoint::new(client, ROLES, filter).all(page_size).await
}

/// GET /api/v1/roles/{id}/apis: the role with `accessible_apis` filled in.
pub async fn role_apis(client: &ApiClient, id: u64) -> Result<Role, ApiError> {
    let env: Envelope<Role> = client.get(&format!("{}/{}/apis", ROLES, id), NO_QUERY).await?;
    Ok(env.data.unwrap_or_default())
}

pub async fn add_role(client: &ApiClient, role: &NewRole) -> Result<Option<u64>, ApiError> {
    client.post(ROLES, role).await.map(id_of)
}

pub async fn update_role(
    client: &ApiClient,
    request: &UpdateRoleRequest,
) -> Result<Option<u64>, ApiError> {
    client.put(ROLES, request).await.map(id_of)
}

pub async fn delete_role(client: &ApiClient, id: u64) -> Result<Option<u64>, ApiError> {
    client
        .delete(&format!("{}/{}", ROLES, id), NO_QUERY)
        .await
        .map(id_of)
}

// ── Users ────────────────────────────────────────────────────────────────

pub async fn list_users(
    client: &ApiClient,
    filter: &UserFilter,
    page: PageQuery,
) -> Result<Envelope<Vec<User>>, ApiError> {
    ListEndpoint::new(client, USERS, filter).page(page).await
}

pub async fn all_users(
    client: &ApiClient,
    filter: &UserFilter,
    page_size: u64,
) -> Result<Vec<User>, ApiError> {
    ListEndpoint::new(client, USERS, filter).all(page_size).await
}

pub async fn add_user(client: &ApiClient, user: &NewUser) -> Result<Option<u64>, ApiError> {
    client.post(USERS, user).await.map(id_of)
}

pub async fn update_user(
    client: &ApiClient,
    request: &UpdateUserRequest,
) -> Result<Option<u64>, ApiError> {
    client.put(USERS, request).await.map(id_of)
}

pub async fn delete_user(client: &ApiClient, id: u64) -> Result<Option<u64>, ApiError> {
    client
        .delete(&format!("{}/{}", USERS, id), NO_QUERY)
        .await
        .map(id_of)
}

// ── Audit ────────────────────────────────────────────────────────────────

pub async fn list_audit_logs(
    client: &ApiClient,
    filter: &AuditFilter,
    page: PageQuery,
) -> Result<Envelope<Vec<AuditLog>>, ApiError> {
    ListEndpoint::new(client, AUDIT_LOGS, filter).page(page).await
}

pub async fn all_audit_logs(
    client: &ApiClient,
    filter: &AuditFilter,
    page_size: u64,
) -> Result<Vec<AuditLog>, ApiError> {
    ListEndpoint::new(client, AUDIT_LOGS, filter)
        .all(page_size)
        .await
}
