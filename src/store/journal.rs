use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};

use crate::calc::recompute_derived;
use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{
    normalize_ticker, CreateJournalInput, JournalEntry, JournalFilters, JournalUpdate, TradeStatus,
};
use crate::store::{datetime_from_millis, now_millis, JournalStore};

const ENTRY_COLUMNS: &str = "id, created_at, ticker, setup_type, entry_price, stop_loss_price, \
     position_size, risk_amount, direction, status, trade_value, r_multiple, target_price, \
     potential_profit, calculation_id";

/// Helper function to map a database row to a JournalEntry struct
fn map_row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0)?,
        timestamp: datetime_from_millis(1, row.get(1)?)?,
        ticker: row.get(2)?,
        setup_type: row.get(3)?,
        entry_price: row.get(4)?,
        stop_loss_price: row.get(5)?,
        position_size: row.get(6)?,
        risk_amount: row.get(7)?,
        direction: row.get(8)?,
        status: row.get(9)?,
        trade_value: row.get(10)?,
        r_multiple: row.get(11)?,
        target_price: row.get(12)?,
        potential_profit: row.get(13)?,
        calculation_id: row.get(14)?,
    })
}

fn fetch_entry(conn: &Connection, id: &str) -> AppResult<JournalEntry> {
    conn.query_row(
        &format!("SELECT {} FROM journal_entries WHERE id = ?", ENTRY_COLUMNS),
        [id],
        map_row_to_entry,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound("Journal entry".to_string()))
}

#[async_trait]
impl JournalStore for Database {
    async fn create_entry(&self, input: CreateJournalInput) -> AppResult<JournalEntry> {
        let entry = input.validate()?;

        let conn = self.conn.lock()?;
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_millis();

        conn.execute(
            "INSERT INTO journal_entries (
                id, ticker, setup_type, entry_price, stop_loss_price, position_size,
                risk_amount, direction, status, trade_value, r_multiple, target_price,
                potential_profit, calculation_id, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                id, entry.ticker, entry.setup_type, entry.entry_price, entry.stop_loss_price,
                entry.position_size, entry.risk_amount, entry.direction, entry.status,
                entry.trade_value, entry.r_multiple, entry.target_price, entry.potential_profit,
                entry.calculation_id, now, now
            ],
        )?;

        log::info!("Created journal entry {} for {}", id, entry.ticker);
        fetch_entry(&conn, &id)
    }

    async fn list_entries(&self, filters: &JournalFilters) -> AppResult<Vec<JournalEntry>> {
        let conn = self.conn.lock()?;

        let mut query = format!("SELECT {} FROM journal_entries WHERE 1=1", ENTRY_COLUMNS);
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filters.status {
            conditions.push("status = ?");
            params.push(Box::new(status));
        }
        if let Some(ticker) = filters.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            // Literal substring match; `%` and `_` are not wildcards
            conditions.push("instr(ticker, ?) > 0");
            params.push(Box::new(ticker.to_uppercase()));
        }

        if !conditions.is_empty() {
            query.push_str(&format!(" AND {}", conditions.join(" AND ")));
        }

        // Same-millisecond inserts fall back to insertion order
        query.push_str(" ORDER BY created_at DESC, rowid DESC");

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&query)?;
        let entries = stmt
            .query_map(param_refs.as_slice(), map_row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    async fn get_entry(&self, id: &str) -> AppResult<JournalEntry> {
        let conn = self.conn.lock()?;
        fetch_entry(&conn, id)
    }

    async fn update_entry(&self, id: &str, update: &JournalUpdate) -> AppResult<JournalEntry> {
        if update.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let conn = self.conn.lock()?;
        let current = fetch_entry(&conn, id)?;

        // Build dynamic UPDATE query based on provided fields
        let mut updates = vec!["updated_at = ?"];
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(now_millis())];

        if let Some(status) = update.status {
            updates.push("status = ?");
            values.push(Box::new(status));
        }
        if let Some(ticker) = &update.ticker {
            updates.push("ticker = ?");
            values.push(Box::new(normalize_ticker(ticker)?));
        }
        if let Some(setup_type) = update.setup_type {
            updates.push("setup_type = ?");
            values.push(Box::new(setup_type));
        }
        if let Some(entry_price) = update.entry_price {
            updates.push("entry_price = ?");
            values.push(Box::new(entry_price));
        }
        if let Some(stop_loss_price) = update.stop_loss_price {
            updates.push("stop_loss_price = ?");
            values.push(Box::new(stop_loss_price));
        }
        if let Some(target_price) = update.target_price {
            updates.push("target_price = ?");
            values.push(Box::new(target_price));
        }
        if let Some(direction) = update.direction {
            updates.push("direction = ?");
            values.push(Box::new(direction));
        }
        if let Some(derived) = recompute_derived(&current, update) {
            updates.push("r_multiple = ?");
            values.push(Box::new(derived.r_multiple));
            updates.push("potential_profit = ?");
            values.push(Box::new(derived.potential_profit));
        }

        let query = format!("UPDATE journal_entries SET {} WHERE id = ?", updates.join(", "));
        values.push(Box::new(id.to_string()));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

        conn.execute(&query, params.as_slice())?;

        log::info!("Updated journal entry {}", id);
        fetch_entry(&conn, id)
    }

    async fn delete_entry(&self, id: &str) -> AppResult<()> {
        let conn = self.conn.lock()?;
        let deleted = conn.execute("DELETE FROM journal_entries WHERE id = ?", [id])?;
        if deleted == 0 {
            return Err(AppError::NotFound("Journal entry".to_string()));
        }
        log::info!("Deleted journal entry {}", id);
        Ok(())
    }

    async fn find_open_entries(&self, ticker: &str) -> AppResult<Vec<JournalEntry>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM journal_entries WHERE ticker = ? AND status = ? ORDER BY created_at DESC, rowid DESC",
            ENTRY_COLUMNS
        ))?;
        let entries = stmt
            .query_map(rusqlite::params![ticker, TradeStatus::Open], map_row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}
