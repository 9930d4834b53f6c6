use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use helpup_types::{ApprovalStatus, CampaignId, OrganizationId, Role, UserId};
use rust_decimal::Decimal;

/// Journal used when neither `--journal` nor a config file names one.
pub const DEFAULT_JOURNAL: &str = "helpup.journal";

#[derive(Parser)]
#[command(
    name = "helpup",
    about = "HelpUp: wallet-funded donations for community campaigns",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Journal file holding all platform state [default: helpup.journal]
    #[arg(long, global = true)]
    pub journal: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Register or list users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Register or list organizations
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },
    /// Create, list, or inspect campaigns
    Campaign {
        #[command(subcommand)]
        action: CampaignAction,
    },
    /// Add funds to a user's wallet
    TopUp(TopUpArgs),
    /// Donate from a user's wallet to a campaign
    Donate(DonateArgs),
    /// Show a user's wallet balance
    Balance(BalanceArgs),
    /// List wallet transactions
    Transactions(TransactionsArgs),
    /// List donations
    Donations(DonationsArgs),
    /// Show donation statistics
    Stats,
    /// Replay the journal and audit campaign totals
    Verify,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides the config file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Keep all state in memory instead of the journal
    #[arg(long)]
    pub in_memory: bool,
}

#[derive(Subcommand)]
pub enum UserAction {
    Add(UserAddArgs),
    List,
}

#[derive(Args)]
pub struct UserAddArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub contact: Option<String>,
    /// admin, donor, or organization
    #[arg(long, default_value = "donor")]
    pub role: Role,
}

#[derive(Subcommand)]
pub enum OrgAction {
    Add(OrgAddArgs),
    List,
    /// Set an organization's approval status
    Status {
        id: OrganizationId,
        /// pending, approved, or rejected
        status: ApprovalStatus,
    },
}

#[derive(Args)]
pub struct OrgAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub contact: Option<String>,
    /// Owning user id
    #[arg(long)]
    pub owner: Option<UserId>,
}

#[derive(Subcommand)]
pub enum CampaignAction {
    Add(CampaignAddArgs),
    List {
        /// Only campaigns of this organization
        #[arg(long)]
        org: Option<OrganizationId>,
    },
    Show {
        id: CampaignId,
    },
    /// Edit a campaign's details; omitted fields are kept
    Update(CampaignUpdateArgs),
}

#[derive(Args)]
pub struct CampaignUpdateArgs {
    pub id: CampaignId,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub target: Option<Decimal>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Args)]
pub struct CampaignAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long)]
    pub target: Decimal,
    #[arg(long)]
    pub org: OrganizationId,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Args)]
pub struct TopUpArgs {
    pub user: UserId,
    pub amount: Decimal,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args)]
pub struct DonateArgs {
    pub user: UserId,
    pub campaign: CampaignId,
    pub amount: Decimal,
    #[arg(long)]
    pub note: Option<String>,
}

#[derive(Args)]
pub struct BalanceArgs {
    pub user: UserId,
}

#[derive(Args)]
pub struct TransactionsArgs {
    #[arg(long)]
    pub user: Option<UserId>,
}

#[derive(Args)]
pub struct DonationsArgs {
    #[arg(long, conflicts_with = "campaign")]
    pub user: Option<UserId>,
    #[arg(long)]
    pub campaign: Option<CampaignId>,
}
