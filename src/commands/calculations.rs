use crate::calc::{CalcOutcome, CalculationInputs};
use crate::commands::{respond, CommandResult};
use crate::models::{CalculationFilters, SaveCalculationInput, SavedCalculation};
use crate::store::CalculationStore;

/// Pure calculator run. Never fails; unfinished input yields `Incomplete`.
pub fn calculate(inputs: &CalculationInputs) -> CalcOutcome {
    inputs.calculate()
}

pub async fn save_calculation(
    store: &dyn CalculationStore,
    input: SaveCalculationInput,
) -> CommandResult<SavedCalculation> {
    store.save_calculation(input).await.map_err(respond)
}

pub async fn get_calculations(
    store: &dyn CalculationStore,
    filters: Option<CalculationFilters>,
) -> CommandResult<Vec<SavedCalculation>> {
    store
        .list_calculations(&filters.unwrap_or_default())
        .await
        .map_err(respond)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::ReverseInputs;
    use crate::db::Database;
    use crate::models::CalculationMode;

    #[tokio::test]
    async fn test_save_and_list_from_json_payload() {
        let db = Database::open_in_memory().unwrap();
        let payload = serde_json::json!({
            "inputs": {
                "mode": "reverse",
                "availableCash": "1600",
                "cashUsagePercentage": "50",
                "entryPrice": "85",
                "tradeDirection": "long"
            }
        });
        let input: SaveCalculationInput = serde_json::from_value(payload).unwrap();

        let saved = save_calculation(&db, input).await.unwrap();
        assert_eq!(saved.snapshot.mode, CalculationMode::Reverse);
        assert_eq!(saved.snapshot.initial_margin_cost, Some(800.0));

        let listed = get_calculations(&db, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], saved);
    }

    #[test]
    fn test_calculate_reports_incomplete_input() {
        let inputs = CalculationInputs::Reverse(ReverseInputs::default());
        assert_eq!(calculate(&inputs), CalcOutcome::Incomplete);
    }
}
