pub mod contracts;
pub mod operations;
pub mod projects;
pub mod reports;
pub mod users;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::activity::{self, ActivityEvent};
use crate::config::Config;
use crate::db::Database;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "solar-epc", version, about = "Project and payment control for solar EPC contractors")]
pub struct Cli {
    /// Email of the user performing the command
    #[arg(long, global = true)]
    pub as_user: Option<String>,

    /// Display currency for dashboard figures (USD or COP)
    #[arg(long, global = true)]
    pub currency: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Convert a USD amount into a display currency
    Convert(reports::ConvertArgs),
    /// Portfolio totals in the display currency
    Dashboard,
    #[command(subcommand)]
    Project(projects::ProjectCommand),
    #[command(subcommand)]
    Progress(projects::ProgressCommand),
    #[command(subcommand)]
    Contract(contracts::ContractCommand),
    #[command(subcommand)]
    Milestone(contracts::MilestoneCommand),
    #[command(subcommand)]
    Inventory(operations::InventoryCommand),
    #[command(subcommand)]
    Supplier(operations::SupplierCommand),
    #[command(subcommand)]
    Equipment(operations::EquipmentCommand),
    #[command(subcommand)]
    Crew(operations::CrewCommand),
    #[command(subcommand)]
    Document(operations::DocumentCommand),
    #[command(subcommand)]
    User(users::UserCommand),
    #[command(subcommand)]
    Notification(users::NotificationCommand),
    /// Recent audit log entries
    Audit(users::AuditArgs),
}

/// Everything a command handler needs
pub struct AppState {
    pub db: Database,
    pub session: Session,
    pub config: Config,
}

impl AppState {
    pub async fn record(&self, event: ActivityEvent) {
        activity::record(&self.db, &self.session, event).await;
    }
}

pub async fn dispatch(app: &mut AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Migrate => app.db.migrate().await,
        Commands::Convert(args) => reports::convert(&args),
        Commands::Dashboard => reports::dashboard(app).await,
        Commands::Project(cmd) => projects::handle_project(app, cmd).await,
        Commands::Progress(cmd) => projects::handle_progress(app, cmd).await,
        Commands::Contract(cmd) => contracts::handle_contract(app, cmd).await,
        Commands::Milestone(cmd) => contracts::handle_milestone(app, cmd).await,
        Commands::Inventory(cmd) => operations::handle_inventory(app, cmd).await,
        Commands::Supplier(cmd) => operations::handle_supplier(app, cmd).await,
        Commands::Equipment(cmd) => operations::handle_equipment(app, cmd).await,
        Commands::Crew(cmd) => operations::handle_crew(app, cmd).await,
        Commands::Document(cmd) => operations::handle_document(app, cmd).await,
        Commands::User(cmd) => users::handle_user(app, cmd).await,
        Commands::Notification(cmd) => users::handle_notification(app, cmd).await,
        Commands::Audit(args) => users::audit(app, &args).await,
    }
}

/// Deletions need `--yes`
pub fn confirm_delete(what: &str, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("refusing to delete {what} without --yes");
    }
    Ok(())
}

pub fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// `Name:percentage` pairs used by milestone arguments
pub fn parse_name_percentage(text: &str) -> Result<(String, f64), String> {
    let (name, pct) = text
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:PERCENT, got '{text}'"))?;
    let pct: f64 = pct
        .trim()
        .parse()
        .map_err(|_| format!("'{pct}' is not a number"))?;
    if name.trim().is_empty() {
        return Err("milestone name cannot be empty".to_string());
    }
    Ok((name.trim().to_string(), pct))
}

/// `ORDER=percentage` pairs used by `contract plan --set`
pub fn parse_order_percentage(text: &str) -> Result<(i32, f64), String> {
    let (order, pct) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ORDER=PERCENT, got '{text}'"))?;
    let order: i32 = order
        .trim()
        .parse()
        .map_err(|_| format!("'{order}' is not a milestone number"))?;
    let pct: f64 = pct
        .trim()
        .parse()
        .map_err(|_| format!("'{pct}' is not a number"))?;
    Ok((order, pct))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_milestone_pairs() {
        assert_eq!(parse_name_percentage("Entrega Final:70").unwrap(), ("Entrega Final".into(), 70.0));
        assert_eq!(parse_name_percentage("Fase 1: inicio:12.5").unwrap(), ("Fase 1: inicio".into(), 12.5));
        assert!(parse_name_percentage("Anticipo").is_err());
        assert!(parse_name_percentage(":30").is_err());

        assert_eq!(parse_order_percentage("2=60").unwrap(), (2, 60.0));
        assert!(parse_order_percentage("x=60").is_err());
    }

    #[test]
    fn parses_contract_create() {
        let cli = Cli::try_parse_from([
            "solar-epc",
            "--as-user",
            "pm@epc.co",
            "contract",
            "create",
            "--project",
            "1",
            "--subcontractor",
            "Montajes SAS",
            "--service",
            "Installation",
            "--total",
            "10000",
            "--milestone",
            "Anticipo:30",
            "--milestone",
            "Entrega Final:70",
        ])
        .unwrap();

        assert_eq!(cli.as_user.as_deref(), Some("pm@epc.co"));
        match cli.command {
            Commands::Contract(contracts::ContractCommand::Create(args)) => {
                assert_eq!(args.milestones.len(), 2);
                assert_eq!(args.total, 10_000.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
