use anyhow::Result;
use clap::Parser;

use solar_epc_manager::cli::{self, AppState, Cli, Commands};
use solar_epc_manager::session::{DisplayCurrency, Session};
use solar_epc_manager::{config, db, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;
    logging::init(&config);

    // Pure conversion works without a database
    if let Commands::Convert(args) = &cli.command {
        return cli::reports::convert(args);
    }

    // Initialize database connection
    let db = db::init(&config).await?;
    tracing::debug!("database connection established");

    let user = match &cli.as_user {
        Some(email) => match db.find_user_by_email(email).await? {
            Some(user) => Some(user),
            None => anyhow::bail!("unknown user {email}"),
        },
        None => None,
    };
    let display_code = cli.currency.as_deref().unwrap_or(&config.display_currency);
    let display = DisplayCurrency::from_code(display_code, config.display_cop_rate)?;

    let mut app_state = AppState {
        db,
        session: Session::new(user, display),
        config,
    };

    if let Err(err) = cli::dispatch(&mut app_state, cli.command).await {
        tracing::error!(error = %err, "command failed");
        return Err(err);
    }

    Ok(())
}
