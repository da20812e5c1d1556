use anyhow::Result;
use clap::Subcommand;

use super::{confirm_delete, AppState};
use crate::activity::ActivityEvent;
use crate::currency::CurrencyConverter;
use crate::models::{Crew, Document, DocumentCategory, Equipment, EquipmentStatus, InventoryItem, Supplier};
use crate::session::Capability;

#[derive(Subcommand, Debug)]
pub enum InventoryCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        sku: String,
        #[arg(long, default_value_t = 0.0)]
        quantity: f64,
        #[arg(long, default_value = "unit")]
        unit: String,
        /// Unit cost in USD
        #[arg(long, default_value_t = 0.0)]
        unit_cost: f64,
        #[arg(long)]
        supplier: Option<i32>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Add stock (or remove it with a negative amount)
    Adjust {
        id: i32,
        #[arg(allow_hyphen_values = true)]
        delta: f64,
    },
    List,
    Delete {
        id: i32,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SupplierCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
    List,
    Delete {
        id: i32,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum EquipmentCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        serial: Option<String>,
        #[arg(long)]
        project: Option<i32>,
        /// Public URL of the uploaded manual
        #[arg(long)]
        manual_url: Option<String>,
    },
    /// Change status or project assignment
    Set {
        id: i32,
        #[arg(long)]
        status: Option<EquipmentStatus>,
        #[arg(long)]
        project: Option<i32>,
    },
    List,
    Delete {
        id: i32,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CrewCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        leader: Option<String>,
        #[arg(long, default_value_t = 1)]
        size: i32,
        #[arg(long)]
        project: Option<i32>,
    },
    /// Assign a crew to a project, or release it when no project is given
    Assign {
        id: i32,
        #[arg(long)]
        project: Option<i32>,
    },
    List,
    Delete {
        id: i32,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocumentCommand {
    /// Register an uploaded file by its public URL
    Add {
        #[arg(long)]
        project: i32,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "other")]
        category: DocumentCategory,
        #[arg(long)]
        url: String,
    },
    List { project: i32 },
    Delete {
        id: i32,
        #[arg(long)]
        yes: bool,
    },
}

pub async fn handle_inventory(app: &mut AppState, cmd: InventoryCommand) -> Result<()> {
    match cmd {
        InventoryCommand::Add { name, sku, quantity, unit, unit_cost, supplier, location } => {
            app.session.require(Capability::EditOperations)?;
            if !quantity.is_finite() || quantity < 0.0 {
                return Err(crate::error::ValidationError::InvalidAmount(quantity).into());
            }
            if !unit_cost.is_finite() || unit_cost < 0.0 {
                return Err(crate::error::ValidationError::InvalidAmount(unit_cost).into());
            }

            let item = InventoryItem {
                id: 0,
                name,
                sku,
                quantity,
                unit,
                unit_cost_usd: unit_cost,
                supplier_id: supplier,
                location,
            };
            let id = app.db.create_inventory_item(&item).await?;
            app.record(ActivityEvent::Created { entity: "inventory_item", id, name: item.sku.clone() }).await;
            println!("Added inventory item #{id}");
            Ok(())
        }
        InventoryCommand::Adjust { id, delta } => {
            app.session.require(Capability::EditOperations)?;
            let quantity = app.db.adjust_inventory(id, delta).await?;
            let item = app.db.get_inventory_item(id).await?;
            println!("{} now has {} {}", item.name, quantity, item.unit);
            Ok(())
        }
        InventoryCommand::List => {
            let usd = CurrencyConverter::usd();
            let items = app.db.get_inventory().await?;
            for i in &items {
                println!(
                    "#{:<4} {:<12} {:<30} {:>10} {:<6} {:>18}",
                    i.id,
                    i.sku,
                    i.name,
                    i.quantity,
                    i.unit,
                    usd.label(i.stock_value_usd())
                );
            }
            let total: f64 = items.iter().map(|i| i.stock_value_usd()).sum();
            println!("Stock value {}", usd.label(total));
            Ok(())
        }
        InventoryCommand::Delete { id, yes } => {
            app.session.require(Capability::EditOperations)?;
            confirm_delete(&format!("inventory item {id}"), yes)?;
            app.db.delete_inventory_item(id).await?;
            app.record(ActivityEvent::Deleted { entity: "inventory_item", id }).await;
            println!("Inventory item {id} deleted");
            Ok(())
        }
    }
}

pub async fn handle_supplier(app: &mut AppState, cmd: SupplierCommand) -> Result<()> {
    match cmd {
        SupplierCommand::Add { name, contact, email, phone, country } => {
            app.session.require(Capability::EditOperations)?;
            let supplier = Supplier {
                id: 0,
                name,
                contact_name: contact,
                email,
                phone,
                country,
            };
            let id = app.db.create_supplier(&supplier).await?;
            app.record(ActivityEvent::Created { entity: "supplier", id, name: supplier.name.clone() }).await;
            println!("Added supplier #{id}");
            Ok(())
        }
        SupplierCommand::List => {
            for s in app.db.get_suppliers().await? {
                println!(
                    "#{:<4} {:<30} {:<24} {:<28} {}",
                    s.id,
                    s.name,
                    s.contact_name.as_deref().unwrap_or("-"),
                    s.email.as_deref().unwrap_or("-"),
                    s.country.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        SupplierCommand::Delete { id, yes } => {
            app.session.require(Capability::EditOperations)?;
            confirm_delete(&format!("supplier {id}"), yes)?;
            app.db.delete_supplier(id).await?;
            app.record(ActivityEvent::Deleted { entity: "supplier", id }).await;
            println!("Supplier {id} deleted");
            Ok(())
        }
    }
}

pub async fn handle_equipment(app: &mut AppState, cmd: EquipmentCommand) -> Result<()> {
    match cmd {
        EquipmentCommand::Add { name, serial, project, manual_url } => {
            app.session.require(Capability::EditOperations)?;
            let equipment = Equipment {
                id: 0,
                name,
                serial_number: serial,
                status: if project.is_some() { EquipmentStatus::InUse } else { EquipmentStatus::Available },
                project_id: project,
                manual_url,
            };
            let id = app.db.create_equipment(&equipment).await?;
            app.record(ActivityEvent::Created { entity: "equipment", id, name: equipment.name.clone() }).await;
            println!("Added equipment #{id}");
            Ok(())
        }
        EquipmentCommand::Set { id, status, project } => {
            app.session.require(Capability::EditOperations)?;
            let mut equipment = app.db.get_equipment_item(id).await?;
            if let Some(status) = status {
                equipment.status = status;
            }
            if project.is_some() {
                equipment.project_id = project;
            }
            if equipment.status == EquipmentStatus::Retired {
                equipment.project_id = None;
            }
            app.db.update_equipment(&equipment).await?;
            println!("Equipment #{id} is {}", equipment.status);
            Ok(())
        }
        EquipmentCommand::List => {
            for e in app.db.get_equipment().await? {
                println!(
                    "#{:<4} {:<30} {:<16} {:<12} {}",
                    e.id,
                    e.name,
                    e.serial_number.as_deref().unwrap_or("-"),
                    e.status,
                    e.project_id.map(|p| format!("project #{p}")).unwrap_or_default()
                );
            }
            Ok(())
        }
        EquipmentCommand::Delete { id, yes } => {
            app.session.require(Capability::EditOperations)?;
            confirm_delete(&format!("equipment {id}"), yes)?;
            app.db.delete_equipment(id).await?;
            app.record(ActivityEvent::Deleted { entity: "equipment", id }).await;
            println!("Equipment {id} deleted");
            Ok(())
        }
    }
}

pub async fn handle_crew(app: &mut AppState, cmd: CrewCommand) -> Result<()> {
    match cmd {
        CrewCommand::Add { name, leader, size, project } => {
            app.session.require(Capability::EditOperations)?;
            if size < 1 {
                anyhow::bail!("a crew needs at least one member");
            }
            let crew = Crew {
                id: 0,
                name,
                leader,
                size,
                project_id: project,
            };
            let id = app.db.create_crew(&crew).await?;
            app.record(ActivityEvent::Created { entity: "crew", id, name: crew.name.clone() }).await;
            println!("Added crew #{id}");
            Ok(())
        }
        CrewCommand::Assign { id, project } => {
            app.session.require(Capability::EditOperations)?;
            app.db.assign_crew(id, project).await?;
            match project {
                Some(p) => println!("Crew #{id} assigned to project #{p}"),
                None => println!("Crew #{id} released"),
            }
            Ok(())
        }
        CrewCommand::List => {
            for c in app.db.get_crews().await? {
                println!(
                    "#{:<4} {:<24} {:<24} {:>3} people  {}",
                    c.id,
                    c.name,
                    c.leader.as_deref().unwrap_or("-"),
                    c.size,
                    c.project_id.map(|p| format!("project #{p}")).unwrap_or_default()
                );
            }
            Ok(())
        }
        CrewCommand::Delete { id, yes } => {
            app.session.require(Capability::EditOperations)?;
            confirm_delete(&format!("crew {id}"), yes)?;
            app.db.delete_crew(id).await?;
            app.record(ActivityEvent::Deleted { entity: "crew", id }).await;
            println!("Crew {id} deleted");
            Ok(())
        }
    }
}

pub async fn handle_document(app: &mut AppState, cmd: DocumentCommand) -> Result<()> {
    match cmd {
        DocumentCommand::Add { project, name, category, url } => {
            app.session.require(Capability::EditOperations)?;
            let document = Document {
                id: 0,
                project_id: project,
                name,
                category,
                url,
                uploaded_at: chrono::Utc::now(),
            };
            let id = app.db.create_document(&document).await?;
            app.record(ActivityEvent::Created { entity: "document", id, name: document.name.clone() }).await;
            println!("Registered document #{id}");
            Ok(())
        }
        DocumentCommand::List { project } => {
            for d in app.db.get_documents_by_project(project).await? {
                println!(
                    "#{:<4} {:<10} {:<30} {}  {}",
                    d.id,
                    d.category,
                    d.name,
                    d.uploaded_at.format("%Y-%m-%d"),
                    d.url
                );
            }
            Ok(())
        }
        DocumentCommand::Delete { id, yes } => {
            app.session.require(Capability::EditOperations)?;
            confirm_delete(&format!("document {id}"), yes)?;
            app.db.delete_document(id).await?;
            app.record(ActivityEvent::Deleted { entity: "document", id }).await;
            println!("Document {id} deleted");
            Ok(())
        }
    }
}
