use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use super::{confirm_delete, parse_date, AppState};
use crate::activity::ActivityEvent;
use crate::currency::ProjectCurrency;
use crate::models::{ProgressMilestone, Project, ProjectStatus};
use crate::payments::PaymentControl;
use crate::progress;
use crate::session::Capability;

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    Create(CreateProjectArgs),
    List,
    /// Project details with payment control and progress
    Show { id: i32 },
    /// Change status, budget or dates. Currency settings never change.
    Update(UpdateProjectArgs),
    Delete {
        id: i32,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct CreateProjectArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub client: String,
    /// Country whose currency and rate the project keeps for its lifetime
    #[arg(long)]
    pub country: String,
    /// Override the table exchange rate (local units per USD)
    #[arg(long)]
    pub rate: Option<f64>,
    /// Budget in USD
    #[arg(long)]
    pub budget: f64,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct UpdateProjectArgs {
    pub id: i32,
    #[arg(long)]
    pub status: Option<ProjectStatus>,
    #[arg(long)]
    pub budget: Option<f64>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum ProgressCommand {
    /// Add a progress milestone to a project
    Add {
        #[arg(long)]
        project: i32,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },
    /// Set percent complete of a progress milestone
    Set { id: i32, percent: f64 },
    List { project: i32 },
    Delete {
        id: i32,
        #[arg(long)]
        yes: bool,
    },
}

pub async fn handle_project(app: &mut AppState, cmd: ProjectCommand) -> Result<()> {
    match cmd {
        ProjectCommand::Create(args) => {
            app.session.require(Capability::ManageFinances)?;

            let currency = match args.rate {
                Some(rate) => ProjectCurrency::with_rate(&args.country, rate)?,
                None => ProjectCurrency::from_country(&args.country)?,
            };
            let start = args.start.unwrap_or_else(|| Local::now().date_naive());
            let mut project = Project::new(&args.name, &args.client, args.budget, currency, start)?;
            project.location = args.location;
            project.end_date = args.end;

            let id = app.db.create_project(&project).await?;
            app.record(ActivityEvent::Created {
                entity: "project",
                id,
                name: project.name.clone(),
            })
            .await;

            println!(
                "Created project #{id} '{}' in {} at {} {} per USD",
                project.name, project.currency_country, project.exchange_rate, project.currency
            );
            Ok(())
        }
        ProjectCommand::List => {
            for p in app.db.get_projects().await? {
                let converter = p.converter()?;
                println!(
                    "#{:<4} {:<30} {:<20} {:<10} budget {}",
                    p.id,
                    p.name,
                    p.client,
                    p.status,
                    converter.label(p.budget_usd)
                );
            }
            Ok(())
        }
        ProjectCommand::Show { id } => show_project(app, id).await,
        ProjectCommand::Update(args) => {
            app.session.require(Capability::ManageFinances)?;

            let mut project = app.db.get_project(args.id).await?;
            if let Some(status) = args.status {
                project.status = status;
            }
            if let Some(budget) = args.budget {
                if !budget.is_finite() || budget < 0.0 {
                    return Err(crate::error::ValidationError::InvalidAmount(budget).into());
                }
                project.budget_usd = budget;
            }
            if args.location.is_some() {
                project.location = args.location;
            }
            if args.end.is_some() {
                project.end_date = args.end;
            }

            app.db.update_project(&project).await?;
            println!("Project #{} updated", project.id);
            Ok(())
        }
        ProjectCommand::Delete { id, yes } => {
            app.session.require(Capability::ManageFinances)?;
            confirm_delete(&format!("project {id} and all its contracts"), yes)?;
            app.db.delete_project(id).await?;
            app.record(ActivityEvent::Deleted { entity: "project", id }).await;
            println!("Project {id} deleted");
            Ok(())
        }
    }
}

async fn show_project(app: &AppState, id: i32) -> Result<()> {
    let project = app.db.get_project(id).await?;
    let converter = project.converter()?;
    let contracts = app.db.get_contracts_by_project(id).await?;
    let phases = app.db.get_progress_milestones(id).await?;
    let report = PaymentControl::for_project(&project, &contracts);

    println!("Project #{} {} ({})", project.id, project.name, project.status);
    println!("  client    {}", project.client);
    println!(
        "  currency  {} ({}), {} per USD",
        project.currency, project.currency_country, project.exchange_rate
    );
    if let Some(location) = &project.location {
        println!("  location  {location}");
    }
    println!(
        "  dates     {} .. {}",
        project.start_date,
        project.end_date.map(|d| d.to_string()).unwrap_or_else(|| "open".into())
    );
    println!("  progress  {:.1}%", progress::project_progress(&phases));
    if let Some(phase) = progress::current_phase(&phases) {
        println!("  phase     {} ({:.0}%)", phase.name, phase.percent_complete);
    }

    println!("Payment control");
    println!("  budget    {}", converter.label(report.budget_usd));
    println!("  committed {}", converter.label(report.committed_usd));
    println!("  paid      {} ({:.1}% of budget)", converter.label(report.paid_usd), report.execution_percentage());
    println!("  pending   {}", converter.label(report.pending_usd));
    println!("  available {}", converter.label(report.available_usd));
    if report.is_over_budget() {
        println!("  WARNING: contracts exceed the budget");
    }
    for line in &report.lines {
        println!(
            "    #{:<4} {:<28} {:>22} paid {:>22}",
            line.contract_id,
            line.subcontractor,
            converter.label(line.committed_usd),
            converter.label(line.paid_usd)
        );
    }
    Ok(())
}

pub async fn handle_progress(app: &mut AppState, cmd: ProgressCommand) -> Result<()> {
    match cmd {
        ProgressCommand::Add { project, name, due } => {
            app.session.require(Capability::EditOperations)?;
            let milestone = ProgressMilestone {
                id: 0,
                project_id: project,
                name,
                percent_complete: 0.0,
                order_index: 0,
                due_date: due,
            };
            let id = app.db.create_progress_milestone(&milestone).await?;
            app.record(ActivityEvent::Created {
                entity: "progress_milestone",
                id,
                name: milestone.name.clone(),
            })
            .await;
            println!("Added progress milestone #{id}");
            Ok(())
        }
        ProgressCommand::Set { id, percent } => {
            app.session.require(Capability::EditOperations)?;
            let mut milestone = app.db.get_progress_milestone(id).await?;
            progress::set_percent_complete(&mut milestone, percent)?;
            app.db.update_progress_milestone(&milestone).await?;
            app.record(ActivityEvent::ProgressUpdated { milestone_id: id, percent }).await;
            println!("'{}' is {:.0}% complete", milestone.name, percent);
            Ok(())
        }
        ProgressCommand::List { project } => {
            let phases = app.db.get_progress_milestones(project).await?;
            for p in &phases {
                println!(
                    "  {:>2}. #{:<4} {:<30} {:>5.1}%  {}",
                    p.order_index,
                    p.id,
                    p.name,
                    p.percent_complete,
                    p.due_date.map(|d| d.to_string()).unwrap_or_default()
                );
            }
            println!("  overall {:.1}%", progress::project_progress(&phases));
            Ok(())
        }
        ProgressCommand::Delete { id, yes } => {
            app.session.require(Capability::EditOperations)?;
            confirm_delete(&format!("progress milestone {id}"), yes)?;
            app.db.delete_progress_milestone(id).await?;
            app.record(ActivityEvent::Deleted { entity: "progress_milestone", id }).await;
            println!("Progress milestone {id} deleted");
            Ok(())
        }
    }
}
