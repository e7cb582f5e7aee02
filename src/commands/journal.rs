use serde_json::Value;

use crate::calc::CalculationInputs;
use crate::commands::{respond, CommandResult};
use crate::error::{AppError, AppResult};
use crate::models::{
    normalize_ticker, CreateJournalInput, JournalEntry, JournalFilters, JournalUpdate,
    SaveCalculationInput, TradeDetails,
};
use crate::store::{CalculationStore, JournalStore};

pub async fn create_journal_entry(
    store: &dyn JournalStore,
    input: CreateJournalInput,
) -> CommandResult<JournalEntry> {
    store.create_entry(input).await.map_err(respond)
}

pub async fn get_journal_entries(
    store: &dyn JournalStore,
    filters: Option<JournalFilters>,
) -> CommandResult<Vec<JournalEntry>> {
    store
        .list_entries(&filters.unwrap_or_default())
        .await
        .map_err(respond)
}

pub async fn get_journal_entry(store: &dyn JournalStore, id: &str) -> CommandResult<JournalEntry> {
    store.get_entry(id).await.map_err(respond)
}

/// Apply a JSON patch such as `{"status": "open", "targetPrice": null}`.
pub async fn update_journal_entry(
    store: &dyn JournalStore,
    id: &str,
    patch: Value,
) -> CommandResult<JournalEntry> {
    async {
        let update = JournalUpdate::from_json(&patch)?;
        store.update_entry(id, &update).await
    }
    .await
    .map_err(respond)
}

pub async fn delete_journal_entry(store: &dyn JournalStore, id: &str) -> CommandResult<()> {
    store.delete_entry(id).await.map_err(respond)
}

/// Whether the ticker already has an open position in the journal.
pub async fn has_similar_open_trade(store: &dyn JournalStore, ticker: &str) -> CommandResult<bool> {
    async {
        let ticker = normalize_ticker(ticker)?;
        let open = store.find_open_entries(&ticker).await?;
        if !open.is_empty() {
            log::info!("{} already has {} open position(s)", ticker, open.len());
        }
        Ok::<_, AppError>(!open.is_empty())
    }
    .await
    .map_err(respond)
}

async fn journal_calculation_inner(
    journal: &dyn JournalStore,
    calculations: &dyn CalculationStore,
    inputs: CalculationInputs,
    details: TradeDetails,
) -> AppResult<JournalEntry> {
    let Some(result) = inputs.calculate().into_ready() else {
        return Err(AppError::Validation(
            "Calculation is incomplete: fill in every required field first".to_string(),
        ));
    };

    let calculation = SaveCalculationInput {
        inputs,
        result: Some(result.clone()),
    };
    let snapshot = calculation.snapshot();
    let mut input = CreateJournalInput::from_calculation(
        &result,
        details,
        snapshot.entry_price,
        snapshot.stop_loss_price,
        snapshot.trade_direction,
    );
    // Nothing is stored unless the plan is journalable
    input.clone().validate()?;

    let saved = calculations.save_calculation(calculation).await?;
    input.calculation_id = Some(saved.id);

    journal.create_entry(input).await
}

/// Run the calculator, keep the calculation and journal the resulting plan as an order.
pub async fn journal_calculation(
    journal: &dyn JournalStore,
    calculations: &dyn CalculationStore,
    inputs: CalculationInputs,
    details: TradeDetails,
) -> CommandResult<JournalEntry> {
    journal_calculation_inner(journal, calculations, inputs, details)
        .await
        .map_err(respond)
}
