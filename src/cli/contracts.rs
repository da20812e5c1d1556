use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use super::{confirm_delete, parse_date, parse_name_percentage, parse_order_percentage, AppState};
use crate::activity::ActivityEvent;
use crate::currency::CurrencyConverter;
use crate::models::{Contract, PaymentMilestone};
use crate::payments::MilestonePlan;
use crate::session::Capability;

#[derive(Subcommand, Debug)]
pub enum ContractCommand {
    /// Create a contract with its payment milestones
    Create(CreateContractArgs),
    /// List contracts, optionally for one project
    List {
        #[arg(long)]
        project: Option<i32>,
    },
    /// Show a contract and its milestone schedule
    Show { id: i32 },
    /// Edit the milestone schedule of a contract
    Plan(PlanArgs),
    Delete {
        id: i32,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct CreateContractArgs {
    #[arg(long)]
    pub project: i32,
    #[arg(long)]
    pub subcontractor: String,
    #[arg(long)]
    pub service: String,
    /// Contract value in USD
    #[arg(long)]
    pub total: f64,
    /// Milestone as NAME:PERCENT, repeatable
    #[arg(long = "milestone", value_parser = parse_name_percentage, required = true)]
    pub milestones: Vec<(String, f64)>,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    pub id: i32,
    /// New contract value in USD
    #[arg(long)]
    pub total: Option<f64>,
    /// Change a milestone's percentage, ORDER=PERCENT
    #[arg(long = "set", value_parser = parse_order_percentage)]
    pub set: Vec<(i32, f64)>,
    /// Append a milestone, NAME:PERCENT
    #[arg(long = "add", value_parser = parse_name_percentage)]
    pub add: Vec<(String, f64)>,
    /// Remove the milestone with this order number
    #[arg(long = "remove")]
    pub remove: Vec<i32>,
    /// Validate and print the result without saving
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum MilestoneCommand {
    /// Record payment of a milestone
    Pay {
        id: i32,
        /// Payment date, defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

pub async fn handle_contract(app: &mut AppState, cmd: ContractCommand) -> Result<()> {
    match cmd {
        ContractCommand::Create(args) => create_contract(app, args).await,
        ContractCommand::List { project } => {
            let contracts = match project {
                Some(project_id) => app.db.get_contracts_by_project(project_id).await?,
                None => app.db.get_contracts().await?,
            };
            for c in contracts {
                let converter = project_converter(app, c.project_id).await?;
                println!(
                    "#{:<4} {:<28} {:<18} total {:>22}  paid {:>22}",
                    c.id,
                    c.subcontractor,
                    c.service_type,
                    converter.label(c.total_value_usd),
                    converter.label(c.paid_amount_usd)
                );
            }
            Ok(())
        }
        ContractCommand::Show { id } => {
            let (contract, milestones) = app.db.get_contract_with_milestones(id).await?;
            let converter = project_converter(app, contract.project_id).await?;
            print_schedule(&contract, &milestones, &converter);
            Ok(())
        }
        ContractCommand::Plan(args) => edit_plan(app, args).await,
        ContractCommand::Delete { id, yes } => {
            app.session.require(Capability::ManageFinances)?;
            confirm_delete(&format!("contract {id}"), yes)?;
            app.db.delete_contract(id).await?;
            app.record(ActivityEvent::Deleted { entity: "contract", id }).await;
            println!("Contract {id} deleted");
            Ok(())
        }
    }
}

pub async fn handle_milestone(app: &mut AppState, cmd: MilestoneCommand) -> Result<()> {
    match cmd {
        MilestoneCommand::Pay { id, date } => {
            app.session.require(Capability::ManageFinances)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());

            let (contract, milestone) = app.db.mark_milestone_paid(id, date).await?;
            let converter = project_converter(app, contract.project_id).await?;
            let amount = converter.label(milestone.amount_usd);

            app.record(ActivityEvent::MilestonePaid {
                contract_id: contract.id,
                milestone_id: milestone.id,
                name: milestone.name.clone(),
                amount: amount.clone(),
            })
            .await;

            println!(
                "Milestone '{}' paid on {} ({}). Contract paid: {} of {}",
                milestone.name,
                date,
                amount,
                converter.label(contract.paid_amount_usd),
                converter.label(contract.total_value_usd)
            );
            Ok(())
        }
    }
}

async fn project_converter(app: &AppState, project_id: i32) -> Result<CurrencyConverter> {
    let project = app.db.get_project(project_id).await?;
    Ok(project.converter()?)
}

async fn create_contract(app: &mut AppState, args: CreateContractArgs) -> Result<()> {
    app.session.require(Capability::ManageFinances)?;
    let converter = project_converter(app, args.project).await?;

    let contract = Contract::new(args.project, &args.subcontractor, &args.service, args.total)?;
    let mut plan = MilestonePlan::new(contract, Vec::new()).with_tolerance(app.config.percentage_tolerance);
    for (name, pct) in &args.milestones {
        let index = plan.add(name);
        plan.set_percentage(index, *pct)?;
    }

    let saveable = plan.into_saveable()?;
    let id = app.db.create_contract(&saveable).await?;
    app.record(ActivityEvent::Created {
        entity: "contract",
        id,
        name: args.subcontractor.clone(),
    })
    .await;

    println!("Created contract #{id}");
    let (contract, milestones) = app.db.get_contract_with_milestones(id).await?;
    print_schedule(&contract, &milestones, &converter);
    Ok(())
}

async fn edit_plan(app: &mut AppState, args: PlanArgs) -> Result<()> {
    app.session.require(Capability::ManageFinances)?;

    let (contract, milestones) = app.db.get_contract_with_milestones(args.id).await?;
    let converter = project_converter(app, contract.project_id).await?;
    let mut plan = MilestonePlan::new(contract, milestones).with_tolerance(app.config.percentage_tolerance);

    if let Some(total) = args.total {
        plan.set_total(total)?;
    }

    // resolve order numbers before anything is removed
    for (order, pct) in &args.set {
        let index = plan
            .position_of(*order)
            .with_context(|| format!("no milestone number {order}"))?;
        plan.set_percentage(index, *pct)?;
    }

    let mut removals: Vec<i32> = args.remove.clone();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for order in removals {
        let index = plan
            .position_of(order)
            .with_context(|| format!("no milestone number {order}"))?;
        let removed = plan.remove(index)?;
        tracing::debug!(name = %removed.name, "milestone removed from plan");
    }

    for (name, pct) in &args.add {
        let index = plan.add(name);
        plan.set_percentage(index, *pct)?;
    }

    if let Err(err) = plan.validate() {
        print_schedule(plan.contract(), plan.milestones(), &converter);
        return Err(err.into());
    }

    let saveable = plan.into_saveable()?;
    if args.dry_run {
        println!("Plan is valid (not saved)");
        print_schedule(&saveable.contract, &saveable.milestones, &converter);
        return Ok(());
    }

    let contract = app.db.save_milestone_plan(&saveable).await?;
    app.record(ActivityEvent::MilestonePlanSaved {
        contract_id: contract.id,
        milestones: saveable.milestones.len(),
    })
    .await;

    let milestones = app.db.get_milestones_by_contract(contract.id).await?;
    println!("Milestone plan saved");
    print_schedule(&contract, &milestones, &converter);
    Ok(())
}

fn print_schedule(contract: &Contract, milestones: &[PaymentMilestone], converter: &CurrencyConverter) {
    println!(
        "Contract #{} {} ({})  total {}  paid {}  pending {}",
        contract.id,
        contract.subcontractor,
        contract.service_type,
        converter.label(contract.total_value_usd),
        converter.label(contract.paid_amount_usd),
        converter.label(contract.pending_amount_usd())
    );
    for m in milestones {
        println!(
            "  {:>2}. [{:<7}] {:<24} {:>6.2}%  {:>22}  {}",
            m.order_index,
            m.status,
            m.name,
            m.percentage,
            converter.label(m.amount_usd),
            m.paid_date.map(|d| d.to_string()).unwrap_or_default()
        );
    }
    let sum: f64 = milestones.iter().map(|m| m.percentage).sum();
    println!("  total {sum:.2}%");
}
