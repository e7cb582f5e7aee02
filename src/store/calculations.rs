use async_trait::async_trait;

use crate::db::Database;
use crate::error::AppResult;
use crate::models::{
    CalculationFilters, CalculationSnapshot, SaveCalculationInput, SavedCalculation,
};
use crate::store::{datetime_from_millis, now_millis, CalculationStore};

const CALCULATION_COLUMNS: &str = "id, created_at, mode, trade_direction, entry_price, \
     account_size, risk_percentage, stop_loss_price, target_price, excess_liquidity, \
     available_cash, cash_usage_percentage, max_loss, risk_per_share, max_shares, trade_value, \
     initial_margin_cost, r_multiple, potential_profit, can_afford";

fn map_row_to_calculation(row: &rusqlite::Row) -> rusqlite::Result<SavedCalculation> {
    Ok(SavedCalculation {
        id: row.get(0)?,
        created_at: datetime_from_millis(1, row.get(1)?)?,
        snapshot: CalculationSnapshot {
            mode: row.get(2)?,
            trade_direction: row.get(3)?,
            entry_price: row.get(4)?,
            account_size: row.get(5)?,
            risk_percentage: row.get(6)?,
            stop_loss_price: row.get(7)?,
            target_price: row.get(8)?,
            excess_liquidity: row.get(9)?,
            available_cash: row.get(10)?,
            cash_usage_percentage: row.get(11)?,
            max_loss: row.get(12)?,
            risk_per_share: row.get(13)?,
            max_shares: row.get(14)?,
            trade_value: row.get(15)?,
            initial_margin_cost: row.get(16)?,
            r_multiple: row.get(17)?,
            potential_profit: row.get(18)?,
            can_afford: row.get(19)?,
        },
    })
}

#[async_trait]
impl CalculationStore for Database {
    async fn save_calculation(&self, mut input: SaveCalculationInput) -> AppResult<SavedCalculation> {
        if input.result.is_none() {
            input.result = input.inputs.calculate().into_ready();
        }
        let s = input.snapshot();

        let conn = self.conn.lock()?;
        let id = uuid::Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO calculations (
                id, mode, trade_direction, entry_price, account_size, risk_percentage,
                stop_loss_price, target_price, excess_liquidity, available_cash,
                cash_usage_percentage, max_loss, risk_per_share, max_shares, trade_value,
                initial_margin_cost, r_multiple, potential_profit, can_afford, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                id, s.mode, s.trade_direction, s.entry_price, s.account_size, s.risk_percentage,
                s.stop_loss_price, s.target_price, s.excess_liquidity, s.available_cash,
                s.cash_usage_percentage, s.max_loss, s.risk_per_share, s.max_shares, s.trade_value,
                s.initial_margin_cost, s.r_multiple, s.potential_profit, s.can_afford, now_millis()
            ],
        )?;

        log::info!("Saved {} calculation {}", s.mode, id);

        let saved = conn.query_row(
            &format!("SELECT {} FROM calculations WHERE id = ?", CALCULATION_COLUMNS),
            [&id],
            map_row_to_calculation,
        )?;
        Ok(saved)
    }

    async fn list_calculations(&self, filters: &CalculationFilters) -> AppResult<Vec<SavedCalculation>> {
        let conn = self.conn.lock()?;

        let mut query = format!("SELECT {} FROM calculations", CALCULATION_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(mode) = filters.mode {
            query.push_str(" WHERE mode = ?");
            params.push(Box::new(mode));
        }

        query.push_str(" ORDER BY created_at DESC, rowid DESC LIMIT ?");
        params.push(Box::new(filters.effective_limit()));

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&query)?;
        let calculations = stmt
            .query_map(param_refs.as_slice(), map_row_to_calculation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(calculations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::{CalculationInputs, ForwardInputs, ReverseInputs};
    use crate::models::{CalculationMode, TradeDirection};

    fn forward() -> SaveCalculationInput {
        SaveCalculationInput {
            inputs: CalculationInputs::Forward(ForwardInputs {
                account_size: "10000".into(),
                risk_percentage: "5".into(),
                entry_price: "85".into(),
                stop_loss_price: "80".into(),
                target_price: "95".into(),
                trade_direction: TradeDirection::Long,
                excess_liquidity: "1600".into(),
            }),
            result: None,
        }
    }

    fn reverse() -> SaveCalculationInput {
        SaveCalculationInput {
            inputs: CalculationInputs::Reverse(ReverseInputs {
                available_cash: "1600".into(),
                entry_price: "85".into(),
                ..Default::default()
            }),
            result: None,
        }
    }

    #[tokio::test]
    async fn test_save_computes_missing_result() {
        let db = Database::open_in_memory().unwrap();
        let saved = db.save_calculation(forward()).await.unwrap();

        let s = &saved.snapshot;
        assert_eq!(s.mode, CalculationMode::Forward);
        assert_eq!(s.max_loss, Some(500.0));
        assert_eq!(s.max_shares, Some(100.0));
        assert_eq!(s.r_multiple, Some(2.0));
        assert_eq!(s.potential_profit, Some(1000.0));
        assert_eq!(s.can_afford, Some(false));
    }

    #[tokio::test]
    async fn test_reverse_without_stop_keeps_nulls() {
        let db = Database::open_in_memory().unwrap();
        let saved = db.save_calculation(reverse()).await.unwrap();

        let s = &saved.snapshot;
        assert_eq!(s.mode, CalculationMode::Reverse);
        assert_eq!(s.available_cash, Some(1600.0));
        assert_eq!(s.cash_usage_percentage, Some(50.0));
        assert!(s.max_loss.is_none());
        assert!(s.stop_loss_price.is_none());
        assert_eq!(s.can_afford, Some(true));
    }

    #[tokio::test]
    async fn test_list_filters_by_mode_and_limits() {
        let db = Database::open_in_memory().unwrap();
        for _ in 0..12 {
            db.save_calculation(forward()).await.unwrap();
        }
        let latest_reverse = db.save_calculation(reverse()).await.unwrap();

        let all = db.list_calculations(&CalculationFilters::default()).await.unwrap();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].id, latest_reverse.id);

        let reverse_only = db
            .list_calculations(&CalculationFilters { mode: Some(CalculationMode::Reverse), limit: None })
            .await
            .unwrap();
        assert_eq!(reverse_only.len(), 1);

        let two = db
            .list_calculations(&CalculationFilters { mode: None, limit: Some(2) })
            .await
            .unwrap();
        assert_eq!(two.len(), 2);
    }
}
