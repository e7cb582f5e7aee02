use serde::Serialize;

use crate::calc::format::{format_currency, format_percent, format_ratio, format_shares};
use crate::calc::CalculationResult;
use crate::cli::Context;
use crate::commands::AccountHeat;
use crate::models::{JournalEntry, SavedCalculation, UserSettings, WatchlistItem};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn money(ctx: &Context, value: f64) -> String {
    format_currency(value, &ctx.currency_symbol())
}

fn optional_money(ctx: &Context, value: Option<f64>) -> String {
    value.map(|v| money(ctx, v)).unwrap_or_else(|| "-".to_string())
}

pub fn print_result(ctx: &Context, result: &CalculationResult) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(result);
    }

    println!("Max loss:            {}", money(ctx, result.max_loss));
    println!("Risk per share:      {}", money(ctx, result.risk_per_share));
    println!("Max shares:          {}", format_shares(result.max_shares));
    println!("Trade value:         {}", money(ctx, result.trade_value));
    println!("Initial margin cost: {}", money(ctx, result.initial_margin_cost));
    println!("{}", result.affordability_message);

    if let Some(target) = result.target_price {
        println!("Target price:        {}", money(ctx, target));
    }
    if let Some(profit) = result.potential_profit {
        println!("Potential profit:    {}", money(ctx, profit));
    }
    if let Some(message) = &result.r_multiple_message {
        println!("{}", message);
    }
    Ok(())
}

pub fn print_entries(ctx: &Context, entries: &[JournalEntry]) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No journal entries");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {:<6} {:<15} {:<5} {:<6} entry {} stop {} size {} risk {} R {}",
            entry.id,
            entry.ticker,
            entry.setup_type,
            entry.direction,
            entry.status,
            money(ctx, entry.entry_price),
            optional_money(ctx, entry.stop_loss_price),
            format_shares(entry.position_size),
            optional_money(ctx, entry.risk_amount),
            entry.r_multiple.map(format_ratio).unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

pub fn print_entry(ctx: &Context, entry: &JournalEntry) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(entry);
    }

    println!("Id:               {}", entry.id);
    println!("Created:          {}", entry.timestamp.to_rfc3339());
    println!("Ticker:           {}", entry.ticker);
    println!("Setup:            {}", entry.setup_type);
    println!("Direction:        {}", entry.direction);
    println!("Status:           {}", entry.status);
    println!("Entry price:      {}", money(ctx, entry.entry_price));
    println!("Stop loss:        {}", optional_money(ctx, entry.stop_loss_price));
    println!("Target:           {}", optional_money(ctx, entry.target_price));
    println!("Position size:    {}", format_shares(entry.position_size));
    println!("Risk amount:      {}", optional_money(ctx, entry.risk_amount));
    println!("Trade value:      {}", optional_money(ctx, entry.trade_value));
    println!(
        "Risk:reward:      {}",
        entry.r_multiple.map(format_ratio).unwrap_or_else(|| "-".to_string())
    );
    println!("Potential profit: {}", optional_money(ctx, entry.potential_profit));
    Ok(())
}

pub fn print_calculations(ctx: &Context, calculations: &[SavedCalculation]) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(&calculations);
    }
    if calculations.is_empty() {
        println!("No saved calculations");
        return Ok(());
    }

    for calc in calculations {
        let s = &calc.snapshot;
        println!(
            "{}  {}  {:<7} {:<5} entry {} shares {} max loss {} margin {}",
            calc.created_at.format("%Y-%m-%d %H:%M"),
            calc.id,
            s.mode,
            s.trade_direction,
            money(ctx, s.entry_price),
            s.max_shares.map(format_shares).unwrap_or_else(|| "-".to_string()),
            optional_money(ctx, s.max_loss),
            optional_money(ctx, s.initial_margin_cost),
        );
    }
    Ok(())
}

pub fn print_heat(ctx: &Context, heat: &AccountHeat) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(heat);
    }

    println!(
        "Total heat:     {}",
        heat.total_heat
            .map(|h| format_percent(h, 2))
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!("Total risk:     {}", money(ctx, heat.total_risk));
    println!("Open positions: {}", heat.open_positions_count);
    println!("{}", heat.message);
    if heat.excluded_count > 0 {
        let noun = if heat.excluded_count == 1 { "trade" } else { "trades" };
        println!(
            "⚠️ {} {} excluded from heat calculation (no risk defined)",
            heat.excluded_count, noun
        );
    }
    Ok(())
}

pub fn print_settings(ctx: &Context, settings: &UserSettings) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(settings);
    }

    println!("Checklist gatekeeper: {}", settings.checklist_gatekeeper_enabled);
    println!("Drawdown simulator:   {}", settings.drawdown_simulator_enabled);
    println!(
        "Account balance:      {}",
        settings
            .account_balance
            .map(|b| format_currency(b, &settings.currency))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Currency:             {}", settings.currency);
    Ok(())
}

pub fn print_watchlist(ctx: &Context, items: &[WatchlistItem]) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("Watchlist is empty");
        return Ok(());
    }

    for item in items {
        println!(
            "{}  {:<6} {:<15} trigger {}  {}",
            item.id,
            item.ticker,
            item.setup_type,
            money(ctx, item.trigger_price),
            item.notes
        );
    }
    Ok(())
}
