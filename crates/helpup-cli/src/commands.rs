use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use helpup_server::{HelpupServer, ServerConfig};
use helpup_store::{JournalConfig, JournalStore};
use helpup_types::{
    Amount, ApprovalStatus, Campaign, CampaignUpdate, Donation, NewCampaign, NewOrganization,
    NewUser, Organization, OrganizationId, TransactionType, User, WalletTransaction,
};
use helpup_wallet::{Platform, WalletError};
use serde::Serialize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let journal = cli
        .journal
        .clone()
        .or_else(|| config.journal_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_JOURNAL));
    let format = cli.format;
    let open = || Session::open(&journal, &config, format);

    match cli.command {
        Command::Serve(args) => cmd_serve(config.clone(), journal.clone(), args),
        Command::User { action } => {
            let ctx = open()?;
            match action {
                UserAction::Add(args) => cmd_user_add(&ctx, args),
                UserAction::List => ctx.list(ctx.platform.directory.users(), print_user),
            }
        }
        Command::Org { action } => {
            let ctx = open()?;
            match action {
                OrgAction::Add(args) => cmd_org_add(&ctx, args),
                OrgAction::List => ctx.list(ctx.platform.directory.organizations(), print_org),
                OrgAction::Status { id, status } => cmd_org_status(&ctx, id, status),
            }
        }
        Command::Campaign { action } => {
            let ctx = open()?;
            match action {
                CampaignAction::Add(args) => cmd_campaign_add(&ctx, args),
                CampaignAction::List { org } => {
                    let campaigns = match org {
                        Some(org) => ctx.platform.directory.campaigns_for_organization(org),
                        None => ctx.platform.directory.campaigns(),
                    };
                    ctx.list(campaigns, |c| print_campaign(c, &ctx.currency))
                }
                CampaignAction::Show { id } => cmd_campaign_show(&ctx, id),
                CampaignAction::Update(args) => cmd_campaign_update(&ctx, args),
            }
        }
        Command::TopUp(args) => cmd_top_up(&open()?, args),
        Command::Donate(args) => cmd_donate(&open()?, args),
        Command::Balance(args) => cmd_balance(&open()?, args),
        Command::Transactions(args) => {
            let ctx = open()?;
            let transactions = match args.user {
                Some(user) => ctx.platform.query.transactions_for_user(user),
                None => ctx.platform.query.transactions(),
            };
            ctx.list(transactions, |t| print_transaction(t, &ctx.currency))
        }
        Command::Donations(args) => {
            let ctx = open()?;
            let donations = match (args.user, args.campaign) {
                (Some(user), _) => ctx.platform.query.donations_for_user(user),
                (None, Some(campaign)) => ctx.platform.query.donations_for_campaign(campaign),
                (None, None) => ctx.platform.query.donations(),
            };
            ctx.list(donations, |d| print_donation(d, &ctx.currency))
        }
        Command::Stats => cmd_stats(&open()?),
        Command::Verify => cmd_verify(&open()?),
    }
}

/// An opened journal plus the services over it.
struct Session {
    platform: Platform,
    store: Arc<JournalStore>,
    currency: String,
    format: OutputFormat,
}

impl Session {
    fn open(journal: &Path, config: &ServerConfig, format: OutputFormat) -> anyhow::Result<Self> {
        let store = JournalStore::open(
            journal,
            JournalConfig {
                sync_mode: config.sync_mode,
            },
        )
        .with_context(|| format!("opening journal {}", journal.display()))?;
        let store = Arc::new(store);
        Ok(Self {
            platform: Platform::new(store.clone(), config.wallet.clone()),
            store,
            currency: config.wallet.currency_symbol.clone(),
            format,
        })
    }

    fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn list<T: Serialize>(
        &self,
        items: Result<Vec<T>, WalletError>,
        print: impl Fn(&T),
    ) -> anyhow::Result<()> {
        let items = self.check(items)?;
        if self.format == OutputFormat::Json {
            return self.json(&items);
        }
        if items.is_empty() {
            println!("{}", "(none)".dimmed());
        }
        for item in &items {
            print(item);
        }
        Ok(())
    }

    /// Turn a wallet error into a user-facing failure.
    fn check<T>(&self, result: Result<T, WalletError>) -> anyhow::Result<T> {
        result.map_err(|e| {
            if e.is_internal() {
                anyhow::Error::new(e)
            } else {
                anyhow::anyhow!(e.public_message(&self.currency))
            }
        })
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => Ok(ServerConfig::load(path)?),
        None => Ok(ServerConfig::default()),
    }
}

fn cmd_serve(mut config: ServerConfig, journal: PathBuf, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.journal_path = if args.in_memory { None } else { Some(journal) };

    let server = HelpupServer::new(config)?;
    println!(
        "{} HelpUp server on {} ({})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        match &server.config().journal_path {
            Some(path) => format!("journal: {}", path.display()),
            None => "in memory".to_string(),
        }
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_user_add(ctx: &Session, args: UserAddArgs) -> anyhow::Result<()> {
    let user = ctx.check(ctx.platform.directory.register_user(NewUser {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        contact_number: args.contact,
        role: args.role,
    }))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&user);
    }
    println!("{} Registered user {}", "✓".green().bold(), user.id.to_string().yellow());
    print_user(&user);
    Ok(())
}

fn cmd_org_add(ctx: &Session, args: OrgAddArgs) -> anyhow::Result<()> {
    let org = ctx.check(ctx.platform.directory.register_organization(NewOrganization {
        name: args.name,
        contact_details: args.contact,
        owner: args.owner,
    }))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&org);
    }
    println!("{} Registered organization {}", "✓".green().bold(), org.id.to_string().yellow());
    print_org(&org);
    Ok(())
}

fn cmd_org_status(
    ctx: &Session,
    id: OrganizationId,
    status: ApprovalStatus,
) -> anyhow::Result<()> {
    let org = ctx.check(ctx.platform.directory.set_approval_status(id, status))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&org);
    }
    println!(
        "{} Organization {} is now {}",
        "✓".green().bold(),
        org.id.to_string().yellow(),
        org.approval_status.as_str().cyan()
    );
    Ok(())
}

fn cmd_campaign_add(ctx: &Session, args: CampaignAddArgs) -> anyhow::Result<()> {
    let target = ctx.check(Amount::new(args.target).map_err(WalletError::from))?;
    let campaign = ctx.check(ctx.platform.directory.create_campaign(NewCampaign {
        name: args.name,
        description: args.description,
        start_date: args.start,
        end_date: args.end,
        target_amount: target,
        organization_id: args.org,
    }))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&campaign);
    }
    println!("{} Created campaign {}", "✓".green().bold(), campaign.id.to_string().yellow());
    print_campaign(&campaign, &ctx.currency);
    Ok(())
}

fn cmd_campaign_update(ctx: &Session, args: CampaignUpdateArgs) -> anyhow::Result<()> {
    let target_amount = match args.target {
        Some(target) => Some(ctx.check(Amount::new(target).map_err(WalletError::from))?),
        None => None,
    };
    let campaign = ctx.check(ctx.platform.directory.update_campaign(
        args.id,
        CampaignUpdate {
            name: args.name,
            description: args.description,
            start_date: args.start,
            end_date: args.end,
            target_amount,
        },
    ))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&campaign);
    }
    println!("{} Updated campaign {}", "✓".green().bold(), campaign.id.to_string().yellow());
    print_campaign(&campaign, &ctx.currency);
    Ok(())
}

fn cmd_campaign_show(ctx: &Session, id: helpup_types::CampaignId) -> anyhow::Result<()> {
    let summary = ctx.check(ctx.platform.query.campaign_summary(id))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&summary);
    }
    let c = &summary.campaign;
    println!("Campaign {} {}", c.id.to_string().yellow().bold(), c.name.bold());
    if !c.description.is_empty() {
        println!("  {}", c.description);
    }
    println!("  Organization: {}", c.organization_id);
    if let (Some(start), Some(end)) = (c.start_date, c.end_date) {
        println!("  Runs: {start} to {end}");
    }
    println!(
        "  Raised: {}{} of {}{} ({}%)",
        ctx.currency, c.total_raised, ctx.currency, c.target_amount, summary.progress_percent
    );
    println!("  Donations: {}", summary.donation_count);
    if summary.funded {
        println!("  {}", "Fully funded".green().bold());
    }
    Ok(())
}

fn cmd_top_up(ctx: &Session, args: TopUpArgs) -> anyhow::Result<()> {
    let receipt = ctx.check(ctx.platform.wallet.credit(args.user, args.amount, args.note))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&serde_json::json!({
            "success": true,
            "transaction": receipt.transaction,
            "newBalance": receipt.new_balance,
            "message": "Top-up successful!",
        }));
    }
    println!("{} Top-up successful!", "✓".green().bold());
    print_transaction(&receipt.transaction, &ctx.currency);
    println!("  New balance: {}", format!("{}{}", ctx.currency, receipt.new_balance).bold());
    Ok(())
}

fn cmd_donate(ctx: &Session, args: DonateArgs) -> anyhow::Result<()> {
    let outcome = ctx.check(ctx.platform.donations.process_donation(
        args.user,
        args.campaign,
        args.amount,
        args.note,
    ))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&serde_json::json!({
            "success": true,
            "donation": outcome.donation,
            "newBalance": outcome.new_balance,
            "message": "Donation successful!",
        }));
    }
    println!("{} Donation successful!", "✓".green().bold());
    print_donation(&outcome.donation, &ctx.currency);
    println!("  New balance: {}", format!("{}{}", ctx.currency, outcome.new_balance).bold());
    Ok(())
}

fn cmd_balance(ctx: &Session, args: BalanceArgs) -> anyhow::Result<()> {
    let balance = ctx.check(ctx.platform.wallet.get_balance(args.user))?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&serde_json::json!({ "balance": balance, "userId": args.user }));
    }
    println!(
        "User {}: {}",
        args.user.to_string().yellow(),
        format!("{}{}", ctx.currency, balance).bold()
    );
    Ok(())
}

fn cmd_stats(ctx: &Session) -> anyhow::Result<()> {
    let stats = ctx.check(ctx.platform.query.donation_stats())?;
    if ctx.format == OutputFormat::Json {
        return ctx.json(&stats);
    }
    println!("Donations: {}", stats.total_count.to_string().bold());
    println!("  Total:   {}{}", ctx.currency, stats.total_amount);
    println!("  Average: {}{}", ctx.currency, stats.average_amount);
    Ok(())
}

fn cmd_verify(ctx: &Session) -> anyhow::Result<()> {
    let report = ctx.check(ctx.platform.query.audit())?;
    if ctx.format == OutputFormat::Json {
        ctx.json(&serde_json::json!({
            "journal": ctx.store.path(),
            "recordsReplayed": ctx.store.replayed(),
            "audit": report,
        }))?;
    } else {
        println!(
            "Journal {}: {} records replayed",
            ctx.store.path().display().to_string().bold(),
            ctx.store.replayed()
        );
        println!(
            "  Campaigns: {}, donations: {}",
            report.campaigns_checked, report.donations_checked
        );
        for drift in &report.drift {
            println!(
                "  {} campaign {} ({}): stored {}{}, donations sum {}{}",
                "✗".red().bold(),
                drift.campaign,
                drift.name,
                ctx.currency,
                drift.stored,
                ctx.currency,
                drift.computed
            );
        }
        if report.is_consistent() {
            println!("{} Campaign totals match their donations", "✓".green().bold());
        }
    }

    if !report.is_consistent() {
        anyhow::bail!("{} campaign total(s) drifted", report.drift.len());
    }
    Ok(())
}

fn print_user(u: &User) {
    println!(
        "{}  {} <{}>  {}  balance {}",
        u.id.to_string().yellow(),
        u.display_name().bold(),
        u.email,
        u.role.to_string().cyan(),
        u.wallet_balance
    );
}

fn print_org(o: &Organization) {
    println!(
        "{}  {}  {}",
        o.id.to_string().yellow(),
        o.name.bold(),
        o.approval_status.as_str().cyan()
    );
}

fn print_campaign(c: &Campaign, currency: &str) {
    println!(
        "{}  {}  {}{} / {}{}  ({}%)",
        c.id.to_string().yellow(),
        c.name.bold(),
        currency,
        c.total_raised,
        currency,
        c.target_amount,
        c.progress_percent()
    );
}

fn print_transaction(t: &WalletTransaction, currency: &str) {
    let amount = match t.transaction_type {
        TransactionType::TopUp => format!("+{currency}{}", t.amount).green(),
        TransactionType::Donation => format!("-{currency}{}", t.amount).red(),
    };
    println!(
        "  {}  {}  {}  {}  {}",
        t.id.to_string().yellow(),
        t.date.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        t.transaction_type.to_string().cyan(),
        amount,
        t.notes
    );
}

fn print_donation(d: &Donation, currency: &str) {
    let status = format!("{:?}", d.status).to_lowercase();
    println!(
        "  {}  {}  user {} → campaign {}  {}{}  {}{}",
        d.id.to_string().yellow(),
        d.date.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        d.user_id,
        d.campaign_id,
        currency,
        d.amount,
        status.green(),
        d.notes
            .as_deref()
            .map(|n| format!("  {n}"))
            .unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpup_types::Role;
    use rust_decimal_macros::dec;

    fn context(dir: &tempfile::TempDir) -> Session {
        Session::open(
            &dir.path().join("cli.journal"),
            &ServerConfig::default(),
            OutputFormat::Json,
        )
        .unwrap()
    }

    #[test]
    fn commands_persist_through_the_journal() {
        let dir = tempfile::tempdir().unwrap();
        {
            let ctx = context(&dir);
            cmd_user_add(
                &ctx,
                UserAddArgs {
                    first_name: "Ana".into(),
                    last_name: "Reyes".into(),
                    email: "ana@example.org".into(),
                    contact: None,
                    role: Role::Donor,
                },
            )
            .unwrap();
            cmd_org_add(
                &ctx,
                OrgAddArgs {
                    name: "Bayanihan".into(),
                    contact: None,
                    owner: None,
                },
            )
            .unwrap();
            cmd_campaign_add(
                &ctx,
                CampaignAddArgs {
                    name: "Relief".into(),
                    description: String::new(),
                    target: dec!(500),
                    org: helpup_types::OrganizationId::new(1),
                    start: None,
                    end: None,
                },
            )
            .unwrap();
            let user = helpup_types::UserId::new(1);
            cmd_top_up(&ctx, TopUpArgs { user, amount: dec!(100), note: None }).unwrap();
            cmd_donate(
                &ctx,
                DonateArgs {
                    user,
                    campaign: helpup_types::CampaignId::new(1),
                    amount: dec!(40),
                    note: None,
                },
            )
            .unwrap();
        }

        let ctx = context(&dir);
        assert_eq!(ctx.store.replayed(), 5);
        let balance = ctx
            .platform
            .wallet
            .get_balance(helpup_types::UserId::new(1))
            .unwrap();
        assert_eq!(balance.as_decimal(), dec!(60));
        cmd_verify(&ctx).unwrap();
    }

    #[test]
    fn directory_edits_persist_through_the_journal() {
        let dir = tempfile::tempdir().unwrap();
        let org = OrganizationId::new(1);
        let campaign = helpup_types::CampaignId::new(1);
        {
            let ctx = context(&dir);
            cmd_org_add(
                &ctx,
                OrgAddArgs {
                    name: "Bayanihan".into(),
                    contact: None,
                    owner: None,
                },
            )
            .unwrap();
            cmd_campaign_add(
                &ctx,
                CampaignAddArgs {
                    name: "Relief".into(),
                    description: String::new(),
                    target: dec!(500),
                    org,
                    start: None,
                    end: None,
                },
            )
            .unwrap();
            cmd_org_status(&ctx, org, ApprovalStatus::Approved).unwrap();
            cmd_campaign_update(
                &ctx,
                CampaignUpdateArgs {
                    id: campaign,
                    name: None,
                    description: Some("Rice and water".into()),
                    target: Some(dec!(750)),
                    start: None,
                    end: None,
                },
            )
            .unwrap();
            let err = cmd_campaign_update(
                &ctx,
                CampaignUpdateArgs {
                    id: campaign,
                    name: None,
                    description: None,
                    target: Some(dec!(-1)),
                    start: None,
                    end: None,
                },
            )
            .unwrap_err();
            assert!(err.to_string().contains("positive"), "{err}");
        }

        let ctx = context(&dir);
        assert_eq!(ctx.store.replayed(), 4);
        let stored = ctx.platform.directory.organization(org).unwrap();
        assert_eq!(stored.approval_status, ApprovalStatus::Approved);
        let stored = ctx.platform.directory.campaign(campaign).unwrap();
        assert_eq!(stored.description, "Rice and water");
        assert_eq!(stored.target_amount.as_decimal(), dec!(750));
    }

    #[test]
    fn business_failures_carry_the_message() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let err = cmd_balance(
            &ctx,
            BalanceArgs {
                user: helpup_types::UserId::new(9),
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "User not found with ID: 9");
    }
}
