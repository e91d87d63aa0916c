//! Probe endpoints. Probes run on the backend as scheduled cron jobs.

use super::client::{ApiClient, NO_QUERY};
use super::envelope::Envelope;
use super::error::ApiError;
use super::pagination::{ListEndpoint, PageQuery};
use super::sys::id_of;
use super::types::{Cronjob, CronjobFilter, NewCronjob, UpdateCronjobRequest};

const CRONJOBS: &str = "/api/v1/cronjobs";
const FUNCTIONS: &str = "/api/v1/cronjobs/functions";

pub async fn list_jobs(
    client: &ApiClient,
    filter: &CronjobFilter,
    page: PageQuery,
) -> Result<Envelope<Vec<Cronjob>>, ApiError> {
    ListEndpoint::new(client, CRONJOBS, filter).page(page).await
}

pub async fn all_jobs(
    client: &ApiClient,
    filter: &CronjobFilter,
    page_size: u64,
) -> Result<Vec<Cronjob>, ApiError> {
    ListEndpoint::new(client, CRONJOBS, filter)
        .all(page_size)
        .await
}

pub async fn add_job(client: &ApiClient, job: &NewCronjob) -> Result<Option<u64>, ApiError> {
    client.post(CRONJOBS, job).await.map(id_of)
}

pub async fn update_job(
    client: &ApiClient,
    request: &UpdateCronjobRequest,
) -> Result<Option<u64>, ApiError> {
    client.put(CRONJOBS, request).await.map(id_of)
}

pub async fn delete_job(client: &ApiClient, id: u64) -> Result<Option<u64>, ApiError> {
    client
        .delete(&format!("{}/{}", CRONJOBS, id), NO_QUERY)
        .await
        .map(id_of)
}

/// Names of the built-in functions a `function` job may call.
pub async fn list_functions(client: &ApiClient) -> Result<Vec<String>, ApiError> {
    let env: Envelope<Vec<String>> = client.get(FUNCTIONS, NO_QUERY).await?;
    let mut names = env.data.unwrap_or_default();
    // Served from a map, so the order is arbitrary.
    names.sort();
    Ok(names)
}
