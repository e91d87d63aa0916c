//! Command-line interface.

use clap::{Args, Parser, Subcommand};

use crate::config::{Overrides, SessionBackend};
use crate::guard::Route;

#[derive(Parser, Debug)]
#[command(name = "dnsctl", version, about = "Operator console for the intranet DNS platform")]
pub struct Cli {
    /// Backend base URL (env: DNSCTL_API_URL, VITE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in milliseconds (env: DNSCTL_TIMEOUT_MS)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Page size used by --all listings (env: DNSCTL_PAGE_SIZE)
    #[arg(long, global = true)]
    pub page_size: Option<u64>,

    /// Where the session is stored (env: DNSCTL_SESSION_BACKEND)
    #[arg(long, global = true, value_enum)]
    pub session_backend: Option<SessionBackend>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            timeout_ms: self.timeout_ms,
            page_size: self.page_size,
            session_backend: self.session_backend,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session token
    Login(LoginArgs),
    /// Forget the stored session
    Logout,
    /// Show the stored session and whether it is still valid
    Whoami,
    /// Check that the backend is reachable
    Ping,
    /// Registered backend APIs
    #[command(subcommand)]
    Apis(ApisCommand),
    /// RBAC roles
    #[command(subcommand)]
    Roles(RolesCommand),
    /// Console users
    #[command(subcommand)]
    Users(UsersCommand),
    /// Audit log of API calls
    Audit(AuditArgs),
    /// Authoritative zones
    #[command(subcommand)]
    Zones(ZonesCommand),
    /// Intranet DNS records
    #[command(subcommand)]
    Records(RecordsCommand),
    /// Resolve a domain
    Query(QueryArgs),
    /// Public resolvers used for EDNS queries
    Isps,
    /// Scheduled probes
    #[command(subcommand)]
    Probes(ProbesCommand),
}

impl Command {
    /// Guarded route of this command; `None` for commands that only touch
    /// the local session.
    pub fn route(&self) -> Option<Route> {
        match self {
            Command::Login(_) => Some(Route::Login),
            Command::Logout | Command::Whoami => None,
            Command::Ping => Some(Route::Ping),
            Command::Apis(_) => Some(Route::Apis),
            Command::Roles(_) => Some(Route::Roles),
            Command::Users(_) => Some(Route::Users),
            Command::Audit(_) => Some(Route::Audit),
            Command::Zones(_) => Some(Route::Zones),
            Command::Records(_) => Some(Route::Records),
            Command::Query(_) | Command::Isps => Some(Route::DnsQuery),
            Command::Probes(_) => Some(Route::Probes),
        }
    }
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub name: String,
    /// Falls back to DNSCTL_PASSWORD
    #[arg(long)]
    pub password: Option<String>,
    /// Log in again even if the stored session is still valid
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct Paging {
    /// Page to fetch (from 1)
    #[arg(long, default_value_t = 1)]
    pub page: u64,
    /// Fetch every page
    #[arg(long, conflicts_with = "page")]
    pub all: bool,
}

// ── System ───────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum ApisCommand {
    List {
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[command(flatten)]
        paging: Paging,
    },
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        audit: Option<bool>,
        #[arg(long)]
        active: Option<bool>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RolesCommand {
    List {
        #[arg(long)]
        name_cn: Option<String>,
        #[command(flatten)]
        paging: Paging,
    },
    /// Show a role with the APIs it grants
    Apis { id: u64 },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        name_cn: String,
        #[arg(long, value_delimiter = ',')]
        api_ids: Vec<u64>,
    },
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        name_cn: Option<String>,
        #[arg(long, value_delimiter = ',')]
        api_ids: Option<Vec<u64>>,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List {
        #[arg(long)]
        name_cn: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        role_id: Option<u64>,
        #[command(flatten)]
        paging: Paging,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name_cn: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_delimiter = ',')]
        role_ids: Vec<u64>,
    },
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long, value_delimiter = ',')]
        role_ids: Option<Vec<u64>>,
    },
    Delete { id: u64 },
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    #[arg(long)]
    pub user_name: Option<String>,
    #[arg(long)]
    pub request_id: Option<String>,
    #[arg(long)]
    pub client_ip: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`
    #[arg(long)]
    pub start_time: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`
    #[arg(long)]
    pub end_time: Option<String>,
    #[command(flatten)]
    pub paging: Paging,
}

// ── DNS ──────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum ZonesCommand {
    List {
        #[command(flatten)]
        paging: Paging,
    },
    Add {
        #[arg(long)]
        zone: String,
        /// `ip:port` of the primary accepting dynamic updates
        #[arg(long)]
        ns_address: String,
        #[arg(long)]
        tsig_name: String,
        #[arg(long)]
        tsig_secret: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        zone: Option<String>,
        #[arg(long)]
        ns_address: Option<String>,
        #[arg(long)]
        tsig_name: Option<String>,
        #[arg(long)]
        tsig_secret: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum RecordsCommand {
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        zone: Option<String>,
        #[arg(long = "type")]
        record_type: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[command(flatten)]
        paging: Paging,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 600)]
        ttl: u32,
        #[arg(long)]
        zone: String,
        #[arg(long = "type")]
        record_type: String,
        /// Several A/AAAA addresses may be separated by `,`
        #[arg(long)]
        content: String,
    },
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        ttl: Option<u32>,
        #[arg(long)]
        content: Option<String>,
    },
    Delete {
        id: u64,
        /// Also delete every record with the same name and type
        #[arg(long)]
        clean: bool,
    },
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    pub domain: String,
    /// Resolve through the public resolvers with EDNS client-subnet
    #[arg(long)]
    pub edns: bool,
}

// ── Probes ───────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum ProbesCommand {
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        creator: Option<String>,
        #[arg(long)]
        task_type: Option<String>,
        #[arg(long)]
        started: Option<bool>,
        #[arg(long)]
        last_succeed: Option<bool>,
        #[command(flatten)]
        paging: Paging,
    },
    Add {
        #[arg(long)]
        name: String,
        /// Cron expression with a seconds field
        #[arg(long)]
        spec: String,
        #[arg(long, default_value = "")]
        description: String,
        /// `http` or `function`
        #[arg(long)]
        task_type: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        function: Option<String>,
    },
    Update {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        spec: Option<String>,
        #[arg(long)]
        started: Option<bool>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        function: Option<String>,
    },
    Delete { id: u64 },
    /// Built-in functions a `function` probe may call
    Functions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_and_paging() {
        let cli = Cli::parse_from([
            "dnsctl",
            "records",
            "list",
            "--zone",
            "test.com",
            "--all",
            "--page-size",
            "50",
        ]);
        assert_eq!(cli.overrides().page_size, Some(50));
        match cli.command {
            Command::Records(RecordsCommand::List { zone, paging, .. }) => {
                assert_eq!(zone.as_deref(), Some("test.com"));
                assert!(paging.all);
                assert_eq!(paging.page, 1);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_comma_separated_ids() {
        let cli = Cli::parse_from([
            "dnsctl", "roles", "add", "--name", "ops", "--name-cn", "运维", "--api-ids", "1,2,5",
        ]);
        match cli.command {
            Command::Roles(RolesCommand::Add { api_ids, .. }) => assert_eq!(api_ids, vec![1, 2, 5]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_routes() {
        let cli = Cli::parse_from(["dnsctl", "query", "www.test.com", "--edns"]);
        assert_eq!(cli.command.route(), Some(Route::DnsQuery));
        let cli = Cli::parse_from(["dnsctl", "logout"]);
        assert_eq!(cli.command.route(), None);
        let cli = Cli::parse_from(["dnsctl", "--session-backend", "keyring", "ping"]);
        assert_eq!(cli.session_backend, Some(SessionBackend::Keyring));
        assert_eq!(cli.command.route(), Some(Route::Ping));
    }

    #[test]
    fn test_page_and_all_conflict() {
        let result = Cli::try_parse_from(["dnsctl", "zones", "list", "--page", "2", "--all"]);
        assert!(result.is_err());
    }
}
