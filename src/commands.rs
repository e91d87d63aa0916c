//! Command handlers.
//!
//! Each handler runs one API call chain against the shared [`AppState`] and
//! prints the result as pretty JSON on stdout. Failures come back as a
//! human-readable `String`; API failures have already been reported to the
//! failure sink by the time they get here.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::envelope::{Envelope, Pages};
use crate::api::pagination::PageQuery;
use crate::api::types::{
    ApiFilter, AuditFilter, CronjobFilter, LoginRequest, NewCronjob, NewRecord, NewRole, NewUser,
    NewZone, RecordFilter, RoleFilter, TaskArgs, UpdateApiRequest, UpdateCronjobRequest,
    UpdateRecordRequest, UpdateRoleRequest, UpdateUserRequest, UpdateZoneRequest, UserFilter,
};
use crate::api::{dns, probe, sys, ApiError};
use crate::cli::{
    ApisCommand, AuditArgs, Command, LoginArgs, Paging, ProbesCommand, QueryArgs, RecordsCommand,
    RolesCommand, UsersCommand, ZonesCommand,
};
use crate::session::token::{self, decode_claims};
use crate::session::Session;
use crate::state::AppState;

/// Run one parsed subcommand. The session guard has already been applied.
pub async fn run(state: &AppState, command: Command) -> Result<(), String> {
    match command {
        Command::Login(args) => login(state, args).await,
        Command::Logout => logout(state),
        Command::Whoami => whoami(state),
        Command::Ping => {
            let pong = sys::ping(&state.api).await.map_err(context("ping"))?;
            print_json(&pong)
        }
        Command::Apis(cmd) => apis(state, cmd).await,
        Command::Roles(cmd) => roles(state, cmd).await,
        Command::Users(cmd) => users(state, cmd).await,
        Command::Audit(args) => audit(state, args).await,
        Command::Zones(cmd) => zones(state, cmd).await,
        Command::Records(cmd) => records(state, cmd).await,
        Command::Query(args) => query(state, args).await,
        Command::Isps => {
            let isps = dns::list_isps(&state.api)
                .await
                .map_err(context("listing resolvers"))?;
            print_json(&isps)
        }
        Command::Probes(cmd) => probes(state, cmd).await,
    }
}

// ── Session ──────────────────────────────────────────────────────────────

/// Exchange credentials for a token and persist the session.
async fn login(state: &AppState, args: LoginArgs) -> Result<(), String> {
    let password = match args.password {
        Some(p) => p,
        None => std::env::var("DNSCTL_PASSWORD")
            .map_err(|_| "no password given (use --password or DNSCTL_PASSWORD)".to_string())?,
    };

    log::info!("Logging in as {}", args.name);
    let request = LoginRequest {
        name: args.name,
        password,
    };
    let resp = sys::login(&state.api, &request)
        .await
        .map_err(context("login"))?;

    let session = Session::new(resp.name, resp.jwt_token);
    if !session.is_valid() {
        log::warn!("Backend issued a token that is already expired or unreadable");
    }
    state
        .sessions
        .save(&session)
        .map_err(|e| format!("Failed to store session: {}", e))?;

    log::info!("Login complete for {}", session.name);
    print_json(&profile(Some(&session), token::now_secs()))
}

fn logout(state: &AppState) -> Result<(), String> {
    log::info!("Logging out");
    state
        .sessions
        .clear()
        .map_err(|e| format!("Failed to clear session: {}", e))?;
    log::info!("Logout complete");
    Ok(())
}

fn whoami(state: &AppState) -> Result<(), String> {
    let session = state
        .sessions
        .load()
        .map_err(|e| format!("Failed to read session: {}", e))?;
    print_json(&profile(session.as_ref(), token::now_secs()))
}

/// What `whoami` reports about the stored session.
#[derive(Debug, PartialEq, Serialize)]
pub struct Profile {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Seconds until expiry; negative once expired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    pub valid: bool,
}

fn profile(session: Option<&Session>, now: i64) -> Profile {
    let Some(session) = session else {
        return Profile {
            logged_in: false,
            name: None,
            username: None,
            expires_at: None,
            expires_in: None,
            valid: false,
        };
    };

    let claims = decode_claims(&session.token).unwrap_or_default();
    Profile {
        logged_in: true,
        name: Some(session.name.clone()),
        username: claims.username,
        expires_at: claims.exp,
        expires_in: claims.exp.map(|exp| exp - now),
        valid: token::is_valid_at(Some(&session.token), now),
    }
}

// ── System ───────────────────────────────────────────────────────────────

async fn apis(state: &AppState, cmd: ApisCommand) -> Result<(), String> {
    let api = &state.api;
    match cmd {
        ApisCommand::List {
            path,
            method,
            active,
            paging,
        } => {
            let filter = ApiFilter {
                path,
                method,
                active,
            };
            if paging.all {
                let all = sys::all_apis(api, &filter, state.config.page_size).await;
                print_json(&all.map_err(context("listing APIs"))?)
            } else {
                let page = sys::list_apis(api, &filter, page_query(state, paging)).await;
                print_page(page.map_err(context("listing APIs"))?)
            }
        }
        ApisCommand::Update { id, audit, active } => {
            let request = UpdateApiRequest { id, audit, active };
            let id = sys::update_api(api, &request)
                .await
                .map_err(context("updating API"))?;
            print_id("updated", id)
        }
    }
}

async fn roles(state: &AppState, cmd: RolesCommand) -> Result<(), String> {
    let api = &state.api;
    match cmd {
        RolesCommand::List { name_cn, paging } => {
            let filter = RoleFilter { name_cn };
            if paging.all {
                let all = sys::all_roles(api, &filter, state.config.page_size).await;
                print_json(&all.map_err(context("listing roles"))?)
            } else {
                let page = sys::list_roles(api, &filter, page_query(state, paging)).await;
                print_page(page.map_err(context("listing roles"))?)
            }
        }
        RolesCommand::Apis { id } => {
            let role = sys::role_apis(api, id)
                .await
                .map_err(context("reading role"))?;
            print_json(&role)
        }
        RolesCommand::Add {
            name,
            name_cn,
            api_ids,
        } => {
            let role = NewRole {
                name,
                name_cn,
                api_ids,
            };
            let id = sys::add_role(api, &role)
                .await
                .map_err(context("adding role"))?;
            print_id("created", id)
        }
        RolesCommand::Update {
            id,
            name,
            name_cn,
            api_ids,
        } => {
            let request = UpdateRoleRequest {
                id,
                name,
                name_cn,
                api_ids,
            };
            let id = sys::update_role(api, &request)
                .await
                .map_err(context("updating role"))?;
            print_id("updated", id)
        }
        RolesCommand::Delete { id } => {
            let id = sys::delete_role(api, id)
                .await
                .map_err(context("deleting role"))?;
            print_id("deleted", id)
        }
    }
}

async fn users(state: &AppState, cmd: UsersCommand) -> Result<(), String> {
    let api = &state.api;
    match cmd {
        UsersCommand::List {
            name_cn,
            active,
            role_id,
            paging,
        } => {
            let filter = UserFilter {
                name_cn,
                active,
                role_id,
            };
            if paging.all {
                let all = sys::all_users(api, &filter, state.config.page_size).await;
                print_json(&all.map_err(context("listing users"))?)
            } else {
                let page = sys::list_users(api, &filter, page_query(state, paging)).await;
                print_page(page.map_err(context("listing users"))?)
            }
        }
        UsersCommand::Add {
            name,
            password,
            name_cn,
            email,
            role_ids,
        } => {
            let user = NewUser {
                name,
                password,
                name_cn,
                email,
                role_ids,
            };
            let id = sys::add_user(api, &user)
                .await
                .map_err(context("adding user"))?;
            print_id("created", id)
        }
        UsersCommand::Update {
            id,
            email,
            active,
            role_ids,
        } => {
            let request = UpdateUserRequest {
                id,
                email,
                active,
                role_ids,
            };
            let id = sys::update_user(api, &request)
                .await
                .map_err(context("updating user"))?;
            print_id("updated", id)
        }
        UsersCommand::Delete { id } => {
            let id = sys::delete_user(api, id)
                .await
                .map_err(context("deleting user"))?;
            print_id("deleted", id)
        }
    }
}

async fn audit(state: &AppState, args: AuditArgs) -> Result<(), String> {
    let filter = AuditFilter {
        user_name: args.user_name,
        request_id: args.request_id,
        client_ip: args.client_ip,
        start_time: args.start_time,
        end_time: args.end_time,
    };
    if args.paging.all {
        let all = sys::all_audit_logs(&state.api, &filter, state.config.page_size).await;
        print_json(&all.map_err(context("listing audit logs"))?)
    } else {
        let page = sys::list_audit_logs(&state.api, &filter, page_query(state, args.paging)).await;
        print_page(page.map_err(context("listing audit logs"))?)
    }
}

// ── DNS ──────────────────────────────────────────────────────────────────

async fn zones(state: &AppState, cmd: ZonesCommand) -> Result<(), String> {
    let api = &state.api;
    match cmd {
        ZonesCommand::List { paging } => {
            if paging.all {
                let all = dns::all_zones(api, state.config.page_size).await;
                print_json(&all.map_err(context("listing zones"))?)
            } else {
                let page = dns::list_zones(api, page_query(state, paging)).await;
                print_page(page.map_err(context("listing zones"))?)
            }
        }
        ZonesCommand::Add {
            zone,
            ns_address,
            tsig_name,
            tsig_secret,
            description,
        } => {
            let zone = NewZone {
                zone,
                ns_address,
                tsig_name,
                tsig_secret,
                description,
            };
            let id = dns::add_zone(api, &zone)
                .await
                .map_err(context("adding zone"))?;
            print_id("created", id)
        }
        ZonesCommand::Update {
            id,
            zone,
            ns_address,
            tsig_name,
            tsig_secret,
            description,
        } => {
            let request = UpdateZoneRequest {
                id,
                zone,
                ns_address,
                tsig_name,
                tsig_secret,
                description,
            };
            let id = dns::update_zone(api, &request)
                .await
                .map_err(context("updating zone"))?;
            print_id("updated", id)
        }
        ZonesCommand::Delete { id } => {
            let id = dns::delete_zone(api, id)
                .await
                .map_err(context("deleting zone"))?;
            print_id("deleted", id)
        }
    }
}

async fn records(state: &AppState, cmd: RecordsCommand) -> Result<(), String> {
    let api = &state.api;
    match cmd {
        RecordsCommand::List {
            name,
            zone,
            record_type,
            content,
            paging,
        } => {
            let filter = RecordFilter {
                record_name: name,
                zone,
                record_type,
                record_content: content,
            };
            if paging.all {
                let all = dns::all_records(api, &filter, state.config.page_size).await;
                print_json(&all.map_err(context("listing records"))?)
            } else {
                let page = dns::list_records(api, &filter, page_query(state, paging)).await;
                print_page(page.map_err(context("listing records"))?)
            }
        }
        RecordsCommand::Add {
            name,
            ttl,
            zone,
            record_type,
            content,
        } => {
            let record = NewRecord {
                record_name: name,
                record_ttl: ttl,
                zone,
                record_type: record_type.to_ascii_uppercase(),
                record_content: content,
            };
            dns::add_record(api, &record)
                .await
                .map_err(context("adding record"))?;
            log::info!("Record {} {} added", record.record_name, record.record_type);
            print_json(&record)
        }
        RecordsCommand::Update {
            id,
            name,
            ttl,
            content,
        } => {
            let request = UpdateRecordRequest {
                id,
                record_name: name,
                record_ttl: ttl,
                record_content: content,
            };
            let id = dns::update_record(api, &request)
                .await
                .map_err(context("updating record"))?;
            print_id("updated", id)
        }
        RecordsCommand::Delete { id, clean } => {
            let id = dns::delete_record(api, id, clean)
                .await
                .map_err(context("deleting record"))?;
            print_id("deleted", id)
        }
    }
}

async fn query(state: &AppState, args: QueryArgs) -> Result<(), String> {
    let domain = args.domain.trim();
    if domain.is_empty() {
        return Err("domain must not be empty".to_string());
    }
    if args.edns {
        let answers = dns::query_edns(&state.api, domain)
            .await
            .map_err(context("EDNS query"))?;
        print_json(&answers)
    } else {
        let rrs = dns::query_rrs(&state.api, domain)
            .await
            .map_err(context("DNS query"))?;
        print_json(&rrs)
    }
}

// ── Probes ───────────────────────────────────────────────────────────────

async fn probes(state: &AppState, cmd: ProbesCommand) -> Result<(), String> {
    let api = &state.api;
    match cmd {
        ProbesCommand::List {
            name,
            creator,
            task_type,
            started,
            last_succeed,
            paging,
        } => {
            let filter = CronjobFilter {
                name,
                creator,
                task_type,
                started,
                last_succeed,
            };
            if paging.all {
                let all = probe::all_jobs(api, &filter, state.config.page_size).await;
                print_json(&all.map_err(context("listing probes"))?)
            } else {
                let page = probe::list_jobs(api, &filter, page_query(state, paging)).await;
                print_page(page.map_err(context("listing probes"))?)
            }
        }
        ProbesCommand::Add {
            name,
            spec,
            description,
            task_type,
            url,
            function,
        } => {
            let job = NewCronjob {
                name,
                spec,
                description,
                task_type,
                task_args: task_args(url, function),
            };
            let id = probe::add_job(api, &job)
                .await
                .map_err(context("adding probe"))?;
            print_id("created", id)
        }
        ProbesCommand::Update {
            id,
            name,
            spec,
            started,
            description,
            url,
            function,
        } => {
            let task_args = (url.is_some() || function.is_some()).then(|| task_args(url, function));
            let request = UpdateCronjobRequest {
                id,
                name,
                spec,
                started,
                description,
                task_args,
            };
            let id = probe::update_job(api, &request)
                .await
                .map_err(context("updating probe"))?;
            print_id("updated", id)
        }
        ProbesCommand::Delete { id } => {
            let id = probe::delete_job(api, id)
                .await
                .map_err(context("deleting probe"))?;
            print_id("deleted", id)
        }
        ProbesCommand::Functions => {
            let names = probe::list_functions(api)
                .await
                .map_err(context("listing probe functions"))?;
            print_json(&names)
        }
    }
}

fn task_args(url: Option<String>, function: Option<String>) -> TaskArgs {
    TaskArgs {
        url: url.unwrap_or_default(),
        function_name: function.unwrap_or_default(),
    }
}

// ── Output ───────────────────────────────────────────────────────────────

fn page_query(state: &AppState, paging: Paging) -> PageQuery {
    PageQuery::new(paging.page.max(1), state.config.page_size)
}

fn context(action: &'static str) -> impl Fn(ApiError) -> String {
    move |e: ApiError| format!("{} failed: {}", action, e.detail())
}

/// A single page as printed: the items plus the backend's paging block.
#[derive(Serialize)]
struct PageOutput<T> {
    data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages: Option<Pages>,
}

impl<T> From<Envelope<Vec<T>>> for PageOutput<T> {
    fn from(env: Envelope<Vec<T>>) -> Self {
        Self {
            data: env.data.unwrap_or_default(),
            pages: env.pages,
        }
    }
}

fn print_page<T: Serialize>(env: Envelope<Vec<T>>) -> Result<(), String> {
    print_json(&PageOutput::from(env))
}

fn print_id(action: &str, id: Option<u64>) -> Result<(), String> {
    print_json(&BTreeMap::from([(action, id)]))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to format output: {}", e))?;
    println!("{}", text);
    Ok(())
}
