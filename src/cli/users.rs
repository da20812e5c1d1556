use anyhow::Result;
use clap::{Args, Subcommand};

use super::{confirm_delete, AppState};
use crate::activity::ActivityEvent;
use crate::models::{Role, UserProfile};
use crate::session::Capability;

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "viewer")]
        role: Role,
    },
    /// Change a user's role
    SetRole { email: String, role: Role },
    List,
    Delete {
        email: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    /// Notifications for the session user plus broadcasts
    List {
        #[arg(long)]
        unread: bool,
    },
    Read { id: i32 },
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Only entries for this entity kind (contract, project, ...)
    #[arg(long)]
    pub entity: Option<String>,
    #[arg(long, default_value_t = 20)]
    pub limit: i64,
}

pub async fn handle_user(app: &mut AppState, cmd: UserCommand) -> Result<()> {
    match cmd {
        UserCommand::Add { email, name, role } => {
            // the very first user bootstraps the installation
            let first = app.db.get_users().await?.is_empty();
            if !first {
                app.session.require(Capability::ManageUsers)?;
            }
            let role = if first { Role::Admin } else { role };

            let user = UserProfile {
                id: 0,
                email,
                full_name: name,
                role,
            };
            let id = app.db.create_user(&user).await?;
            app.record(ActivityEvent::Created { entity: "user", id, name: user.email.clone() }).await;
            println!("Added user #{id} {} as {}", user.email, user.role);
            Ok(())
        }
        UserCommand::SetRole { email, role } => {
            app.session.require(Capability::ManageUsers)?;
            let mut user = find_user(app, &email).await?;
            user.role = role;
            app.db.update_user(&user).await?;
            println!("{} is now {}", user.email, user.role);
            Ok(())
        }
        UserCommand::List => {
            for u in app.db.get_users().await? {
                println!("#{:<4} {:<32} {:<28} {}", u.id, u.email, u.full_name, u.role);
            }
            Ok(())
        }
        UserCommand::Delete { email, yes } => {
            app.session.require(Capability::ManageUsers)?;
            confirm_delete(&format!("user {email}"), yes)?;
            let user = find_user(app, &email).await?;
            if app.session.user_id() == Some(user.id) {
                anyhow::bail!("you cannot delete your own account");
            }
            app.db.delete_user(user.id).await?;
            app.record(ActivityEvent::Deleted { entity: "user", id: user.id }).await;
            println!("User {email} deleted");
            Ok(())
        }
    }
}

async fn find_user(app: &AppState, email: &str) -> Result<UserProfile> {
    match app.db.find_user_by_email(email).await? {
        Some(user) => Ok(user),
        None => anyhow::bail!("no user with email {email}"),
    }
}

pub async fn handle_notification(app: &mut AppState, cmd: NotificationCommand) -> Result<()> {
    match cmd {
        NotificationCommand::List { unread } => {
            for n in app.db.get_notifications(app.session.user_id(), unread).await? {
                println!(
                    "#{:<4} {} {} {}: {}",
                    n.id,
                    if n.read { " " } else { "*" },
                    n.created_at.format("%Y-%m-%d %H:%M"),
                    n.title,
                    n.message
                );
            }
            Ok(())
        }
        NotificationCommand::Read { id } => {
            app.db.mark_notification_read(id).await?;
            Ok(())
        }
    }
}

pub async fn audit(app: &AppState, args: &AuditArgs) -> Result<()> {
    for e in app.db.get_audit_log(args.entity.as_deref(), args.limit).await? {
        println!(
            "{} {:<18} {:<20} #{:<5} user {:<5} {}",
            e.created_at.format("%Y-%m-%d %H:%M:%S"),
            e.action,
            e.entity,
            e.entity_id,
            e.user_id.map(|u| u.to_string()).unwrap_or_else(|| "-".into()),
            e.details.unwrap_or_default()
        );
    }
    Ok(())
}
