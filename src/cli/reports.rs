use anyhow::Result;
use clap::Args;

use super::AppState;
use crate::currency::{lookup_country, CurrencyConverter};
use crate::dashboard::DashboardSummary;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Amount in USD, or in the local currency with --to-usd
    #[arg(allow_hyphen_values = true)]
    pub amount: String,
    /// Currency code; the rate defaults to the country table
    #[arg(long = "to", default_value = "COP")]
    pub code: String,
    /// Local units per USD
    #[arg(long)]
    pub rate: Option<f64>,
    /// Read the amount as local currency and print USD
    #[arg(long)]
    pub to_usd: bool,
}

fn table_rate(code: &str) -> Option<f64> {
    crate::currency::countries::countries()
        .find(|c| c.currency.eq_ignore_ascii_case(code))
        .map(|c| c.exchange_rate)
}

/// Build the converter for `convert`, falling back to the country table rate
pub fn converter_for(args: &ConvertArgs) -> Result<CurrencyConverter> {
    let rate = match args.rate {
        Some(rate) => rate,
        None => match table_rate(&args.code) {
            Some(rate) => rate,
            None => match lookup_country(&args.code) {
                Ok(c) => return Ok(CurrencyConverter::new(c.currency, c.exchange_rate)?),
                Err(_) => anyhow::bail!("no known rate for {}, pass --rate", args.code),
            },
        },
    };
    Ok(CurrencyConverter::new(&args.code, rate)?)
}

pub fn convert(args: &ConvertArgs) -> Result<()> {
    let converter = converter_for(args)?;

    if args.to_usd {
        let usd = converter.parse_to_usd(&args.amount)?;
        println!("{}", CurrencyConverter::usd().label(usd));
    } else {
        let usd = CurrencyConverter::usd().currency().parse(&args.amount)?;
        println!("{}", converter.label(usd));
    }
    Ok(())
}

pub async fn dashboard(app: &AppState) -> Result<()> {
    let projects = app.db.get_projects().await?;
    let contracts = app.db.get_contracts().await?;
    let summary = DashboardSummary::build(&projects, &contracts);
    let display = app.session.display().converter();

    for (label, value) in summary.render(&display) {
        println!("{label:<22} {value}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(amount: &str, code: &str, rate: Option<f64>, to_usd: bool) -> ConvertArgs {
        ConvertArgs {
            amount: amount.to_string(),
            code: code.to_string(),
            rate,
            to_usd,
        }
    }

    #[test]
    fn table_rate_is_default() {
        let conv = converter_for(&args("100", "COP", None, false)).unwrap();
        assert_eq!(conv.exchange_rate(), 4000.0);

        let conv = converter_for(&args("100", "Mexico", None, false)).unwrap();
        assert_eq!(conv.code(), "MXN");
    }

    #[test]
    fn explicit_rate_wins_and_is_validated() {
        let conv = converter_for(&args("100", "COP", Some(3900.0), false)).unwrap();
        assert_eq!(conv.to_display(100.0), "390,000");

        assert!(converter_for(&args("100", "COP", Some(0.0), false)).is_err());
        assert!(converter_for(&args("100", "XYZ", None, false)).is_err());
        assert!(converter_for(&args("100", "XYZ", Some(2.0), false)).is_ok());
    }
}
