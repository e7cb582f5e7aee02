//! Calculator commands

use anyhow::bail;
use clap::{Args, Subcommand};

use crate::calc::{calculate_r_multiple, CalculationInputs, ForwardInputs, ReverseInputs};
use crate::cli::output::{print_calculations, print_entry, print_json, print_result};
use crate::cli::Context;
use crate::commands;
use crate::models::{
    CalculationFilters, CalculationMode, SaveCalculationInput, SetupType, TradeDetails,
    TradeDirection,
};

/// Where a finished calculation goes besides the terminal.
#[derive(Args, Debug)]
pub struct PersistArgs {
    /// Keep the calculation in the database
    #[arg(long)]
    pub save: bool,

    /// Journal the plan as an order under this ticker
    #[arg(long, requires = "setup")]
    pub ticker: Option<String>,

    /// Setup type of the journaled plan
    #[arg(long, requires = "ticker")]
    pub setup: Option<SetupType>,
}

#[derive(Args, Debug)]
pub struct ForwardArgs {
    /// Account size
    #[arg(long)]
    pub account: String,

    /// Percent of the account to risk (defaults to the configured value)
    #[arg(long)]
    pub risk: Option<String>,

    #[arg(long)]
    pub entry: String,

    #[arg(long)]
    pub stop: String,

    #[arg(long)]
    pub target: Option<String>,

    /// Excess liquidity available for margin
    #[arg(long)]
    pub liquidity: String,

    #[arg(long, default_value = "long")]
    pub direction: TradeDirection,

    #[command(flatten)]
    pub persist: PersistArgs,
}

#[derive(Args, Debug)]
pub struct ReverseArgs {
    /// Cash available for margin
    #[arg(long)]
    pub cash: String,

    /// Percent of the cash to use (defaults to the configured value)
    #[arg(long)]
    pub usage: Option<String>,

    #[arg(long)]
    pub entry: String,

    #[arg(long)]
    pub stop: Option<String>,

    /// Account size, used to judge the implied risk
    #[arg(long)]
    pub account: Option<String>,

    #[arg(long, default_value = "long")]
    pub direction: TradeDirection,

    #[command(flatten)]
    pub persist: PersistArgs,
}

#[derive(Args, Debug)]
pub struct RrArgs {
    #[arg(long)]
    pub entry: f64,

    #[arg(long)]
    pub stop: f64,

    #[arg(long)]
    pub target: f64,

    #[arg(long, default_value = "long")]
    pub direction: TradeDirection,
}

#[derive(Subcommand, Debug)]
pub enum CalcCommand {
    /// List saved calculations, newest first
    List {
        #[arg(long)]
        mode: Option<CalculationMode>,

        /// Number of calculations to show
        #[arg(long)]
        limit: Option<u32>,
    },
}

impl ForwardArgs {
    fn inputs(&self, ctx: &Context) -> CalculationInputs {
        CalculationInputs::Forward(ForwardInputs {
            account_size: self.account.clone(),
            risk_percentage: self
                .risk
                .clone()
                .unwrap_or_else(|| ctx.config.default_risk_percentage.to_string()),
            entry_price: self.entry.clone(),
            stop_loss_price: self.stop.clone(),
            target_price: self.target.clone().unwrap_or_default(),
            trade_direction: self.direction,
            excess_liquidity: self.liquidity.clone(),
        })
    }

    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        run_calculation(ctx, self.inputs(ctx), &self.persist).await
    }
}

impl ReverseArgs {
    fn inputs(&self, ctx: &Context) -> CalculationInputs {
        CalculationInputs::Reverse(ReverseInputs {
            available_cash: self.cash.clone(),
            cash_usage_percentage: self
                .usage
                .clone()
                .unwrap_or_else(|| ctx.config.default_cash_usage_percentage.to_string()),
            entry_price: self.entry.clone(),
            trade_direction: self.direction,
            stop_loss_price: self.stop.clone().unwrap_or_default(),
            account_size: self.account.clone().unwrap_or_default(),
        })
    }

    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        run_calculation(ctx, self.inputs(ctx), &self.persist).await
    }
}

async fn run_calculation(
    ctx: &Context,
    inputs: CalculationInputs,
    persist: &PersistArgs,
) -> anyhow::Result<()> {
    let Some(result) = commands::calculate(&inputs).into_ready() else {
        bail!("Calculation is incomplete: every required value must be a non-zero number");
    };

    if let (Some(ticker), Some(setup_type)) = (&persist.ticker, persist.setup) {
        let db = ctx.open_database()?;
        let details = TradeDetails {
            ticker: ticker.clone(),
            setup_type,
        };
        let entry = commands::journal_calculation(&db, &db, inputs, details).await?;
        if !ctx.json {
            print_result(ctx, &result)?;
            println!();
            println!("Journaled as order {}", entry.id);
            return Ok(());
        }
        return print_entry(ctx, &entry);
    }

    if persist.save {
        let db = ctx.open_database()?;
        let saved = commands::save_calculation(
            &db,
            SaveCalculationInput {
                inputs,
                result: Some(result.clone()),
            },
        )
        .await?;
        log::info!("Calculation saved as {}", saved.id);
    }

    print_result(ctx, &result)
}

impl RrArgs {
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        let Some(rr) = calculate_r_multiple(self.entry, self.stop, self.target, self.direction) else {
            bail!("No risk:reward: prices must be non-zero, the stop must differ from entry and the target must favour the position");
        };
        if ctx.json {
            return print_json(&rr);
        }
        println!("{}", rr.message);
        Ok(())
    }
}

impl CalcCommand {
    pub async fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        match self {
            CalcCommand::List { mode, limit } => {
                let db = ctx.open_database()?;
                let filters = CalculationFilters {
                    mode: *mode,
                    limit: *limit,
                };
                let calculations = commands::get_calculations(&db, Some(filters)).await?;
                print_calculations(ctx, &calculations)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::config::AppConfig;
    use clap::Parser;

    #[test]
    fn test_forward_uses_configured_risk() {
        let cli = Cli::parse_from([
            "position-journal", "forward", "--account", "10000", "--entry", "85", "--stop", "80",
            "--liquidity", "1600", "--direction", "short",
        ]);
        let config = AppConfig {
            default_risk_percentage: 2.0,
            ..Default::default()
        };
        let ctx = Context::new(config, None, false);
        let Commands::Forward(args) = cli.command else {
            panic!("expected forward command");
        };

        let CalculationInputs::Forward(inputs) = args.inputs(&ctx) else {
            panic!("expected forward inputs");
        };
        assert_eq!(inputs.risk_percentage, "2");
        assert_eq!(inputs.trade_direction, TradeDirection::Short);
        assert!(inputs.target_price.is_empty());
    }

    #[test]
    fn test_journal_flags_require_each_other() {
        let result = Cli::try_parse_from([
            "position-journal", "reverse", "--cash", "1600", "--entry", "85", "--ticker", "AAPL",
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_reverse_journals_plan() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(AppConfig::default(), Some(dir.path().join("j.db")), true);
        let cli = Cli::parse_from([
            "position-journal", "reverse", "--cash", "1600", "--entry", "85", "--stop", "80",
            "--account", "10000", "--ticker", "amd", "--setup", "gap-fill",
        ]);
        cli.command.execute(&ctx).await.unwrap();

        let db = ctx.open_database().unwrap();
        let entries = commands::get_journal_entries(&db, None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].setup_type, SetupType::GapFill);
        assert!(entries[0].calculation_id.is_some());
    }

    #[tokio::test]
    async fn test_incomplete_calculation_fails() {
        let ctx = Context::new(AppConfig::default(), None, false);
        let cli = Cli::parse_from([
            "position-journal", "forward", "--account", "abc", "--entry", "85", "--stop", "80",
            "--liquidity", "1600",
        ]);
        assert!(cli.command.execute(&ctx).await.is_err());
    }
}
