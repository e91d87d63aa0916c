//! DNS endpoints: zones, intranet records and resolution queries.

use serde_json::Value;

use super::client::{ApiClient, NO_QUERY};
use super::envelope::Envelope;
use super::error::ApiError;
use super::pagination::{ListEndpoint, NoFilter, PageQuery};
use super::sys::id_of;
use super::types::{
    DeleteRecordQuery, DnsRecord, EdnsAnswer, IspResolver, NewRecord, NewZone, RecordFilter,
    ResourceRecord, UpdateRecordRequest, UpdateZoneRequest, Zone,
};

const ZONES: &str = "/api/v1/dns/zones";
const RECORDS: &str = "/api/v1/dns/records";
const RRS: &str = "/api/v1/dns/rrs";
const EDNS: &str = "/api/v1/dns/edns";
const ISPS: &str = "/api/v1/dns/isps";

// ── Zones ────────────────────────────────────────────────────────────────

pub async fn list_zones(
    client: &ApiClient,
    page: PageQuery,
) -> Result<Envelope<Vec<Zone>>, ApiError> {
    ListEndpoint::new(client, ZONES, &NoFilter {}).page(page).await
}

pub async fn all_zones(client: &ApiClient, page_size: u64) -> Result<Vec<Zone>, ApiError> {
    ListEndpoint::new(client, ZONES, &NoFilter {})
        .all(page_size)
        .await
}

pub async fn add_zone(client: &ApiClient, zone: &NewZone) -> Result<Option<u64>, ApiError> {
    client.post(ZONES, zone).await.map(id_of)
}

pub async fn update_zone(
    client: &ApiClient,
    request: &UpdateZoneRequest,
) -> Result<Option<u64>, ApiError> {
    client.put(ZONES, request).await.map(id_of)
}

pub async fn delete_zone(client: &ApiClient, id: u64) -> Result<Option<u64>, ApiError> {
    client
        .delete(&format!("{}/{}", ZONES, id), NO_QUERY)
        .await
        .map(id_of)
}

// ── Records ──────────────────────────────────────────────────────────────

pub async fn list_records(
    client: &ApiClient,
    filter: &RecordFilter,
    page: PageQuery,
) -> Result<Envelope<Vec<DnsRecord>>, ApiError> {
    ListEndpoint::new(client, RECORDS, filter).page(page).await
}

pub async fn all_records(
    client: &ApiClient,
    filter: &RecordFilter,
    page_size: u64,
) -> Result<Vec<DnsRecord>, ApiError> {
    ListEndpoint::new(client, RECORDS, filter).all(page_size).await
}

/// Create a record. The backend answers with an empty `data`.
pub async fn add_record(client: &ApiClient, record: &NewRecord) -> Result<(), ApiError> {
    let _: Envelope<Value> = client.post(RECORDS, record).await?;
    Ok(())
}

pub async fn update_record(
    client: &ApiClient,
    request: &UpdateRecordRequest,
) -> Result<Option<u64>, ApiError> {
    client.put(RECORDS, request).await.map(id_of)
}

/// Delete a record; with `clean` every record sharing its name and type goes too.
pub async fn delete_record(
    client: &ApiClient,
    id: u64,
    clean: bool,
) -> Result<Option<u64>, ApiError> {
    client
        .delete(RECORDS, &DeleteRecordQuery { id, clean })
        .await
        .map(id_of)
}

// ── Queries ──────────────────────────────────────────────────────────────

/// Resolve `domain` against the intranet authoritative servers.
pub async fn query_rrs(client: &ApiClient, domain: &str) -> Result<Vec<ResourceRecord>, ApiError> {
    let env: Envelope<Vec<ResourceRecord>> =
        client.get(RRS, &[("domain", domain.trim())]).await?;
    Ok(env.data.unwrap_or_default())
}

/// Resolve `domain` through every public resolver with EDNS client-subnet.
pub async fn query_edns(client: &ApiClient, domain: &str) -> Result<Vec<EdnsAnswer>, ApiError> {
    let env: Envelope<Vec<EdnsAnswer>> =
        client.get(EDNS, &[("domain", domain.trim())]).await?;
    Ok(env.data.unwrap_or_default())
}

pub async fn list_isps(client: &ApiClient) -> Result<Vec<IspResolver>, ApiError> {
    let env: Envelope<Vec<IspResolver>> = client.get(ISPS, NO_QUERY).await?;
    Ok(env.data.unwrap_or_default())
}
