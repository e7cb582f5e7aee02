use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::{AddWatchlistItemInput, UpdateSettingsInput, UserSettings, WatchlistItem};
use crate::store::{datetime_from_millis, now_millis, SettingsRepository};

fn clean_currency(currency: &str) -> AppResult<String> {
    let currency = currency.trim();
    if currency.is_empty() {
        return Err(AppError::Validation("Currency symbol cannot be empty".to_string()));
    }
    Ok(currency.to_string())
}

/// A non-positive balance clears the stored value.
fn clean_balance(balance: f64) -> AppResult<Option<f64>> {
    if !balance.is_finite() {
        return Err(AppError::Validation("Account balance must be a finite number".to_string()));
    }
    Ok((balance > 0.0).then_some(balance))
}

fn duplicate_ticker(err: AppError, ticker: &str) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::Conflict(format!("{} is already on the watchlist", ticker)),
        other => other,
    }
}

fn map_row_to_watchlist_item(row: &rusqlite::Row) -> rusqlite::Result<WatchlistItem> {
    Ok(WatchlistItem {
        id: row.get(0)?,
        ticker: row.get(1)?,
        setup_type: row.get(2)?,
        trigger_price: row.get(3)?,
        notes: row.get(4)?,
        created_at: datetime_from_millis(5, row.get(5)?)?,
    })
}

fn read_settings(conn: &rusqlite::Connection) -> AppResult<UserSettings> {
    let settings = conn.query_row(
        "SELECT checklist_gatekeeper_enabled, drawdown_simulator_enabled, account_balance, currency, updated_at FROM settings WHERE id = 1",
        [],
        |row| {
            Ok(UserSettings {
                checklist_gatekeeper_enabled: row.get::<_, i32>(0)? == 1,
                drawdown_simulator_enabled: row.get::<_, i32>(1)? == 1,
                account_balance: row.get(2)?,
                currency: row.get(3)?,
                updated_at: datetime_from_millis(4, row.get(4)?)?,
            })
        },
    )?;
    Ok(settings)
}

/// Currency symbol stored in the settings row, read without going through the async repository.
pub fn stored_currency(db: &Database) -> AppResult<String> {
    let conn = db.conn.lock()?;
    Ok(read_settings(&conn)?.currency)
}

#[async_trait]
impl SettingsRepository for Database {
    async fn get_settings(&self) -> AppResult<UserSettings> {
        let conn = self.conn.lock()?;
        read_settings(&conn)
    }

    async fn update_settings(&self, input: UpdateSettingsInput) -> AppResult<UserSettings> {
        let conn = self.conn.lock()?;

        // Build dynamic UPDATE query
        let mut updates = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(val) = input.checklist_gatekeeper_enabled {
            updates.push("checklist_gatekeeper_enabled = ?");
            values.push(Box::new(val as i32));
        }
        if let Some(val) = input.drawdown_simulator_enabled {
            updates.push("drawdown_simulator_enabled = ?");
            values.push(Box::new(val as i32));
        }
        if let Some(val) = input.account_balance {
            updates.push("account_balance = ?");
            values.push(Box::new(clean_balance(val)?));
        }
        if let Some(val) = &input.currency {
            updates.push("currency = ?");
            values.push(Box::new(clean_currency(val)?));
        }

        updates.push("updated_at = ?");
        values.push(Box::new(now_millis()));

        let query = format!("UPDATE settings SET {} WHERE id = 1", updates.join(", "));
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

        conn.execute(&query, params.as_slice())?;
        log::info!("Settings updated");

        read_settings(&conn)
    }

    async fn list_watchlist(&self) -> AppResult<Vec<WatchlistItem>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, ticker, setup_type, trigger_price, notes, created_at FROM watchlist_items ORDER BY created_at DESC, rowid DESC",
        )?;
        let items = stmt
            .query_map([], map_row_to_watchlist_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    async fn add_watchlist_item(&self, input: AddWatchlistItemInput) -> AppResult<WatchlistItem> {
        let item = input.validate()?;

        let conn = self.conn.lock()?;
        let id = uuid::Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO watchlist_items (id, ticker, setup_type, trigger_price, notes, created_at) VALUES (?, ?, ?, ?, ?, ?)",
            rusqlite::params![id, item.ticker, item.setup_type, item.trigger_price, item.notes, now_millis()],
        )
        .map_err(|e| duplicate_ticker(e.into(), &item.ticker))?;

        log::info!("Added {} to watchlist", item.ticker);

        let added = conn.query_row(
            "SELECT id, ticker, setup_type, trigger_price, notes, created_at FROM watchlist_items WHERE id = ?",
            [&id],
            map_row_to_watchlist_item,
        )?;
        Ok(added)
    }

    async fn remove_watchlist_item(&self, id: &str) -> AppResult<()> {
        let conn = self.conn.lock()?;
        let removed = conn.execute("DELETE FROM watchlist_items WHERE id = ?", [id])?;
        if removed == 0 {
            return Err(AppError::NotFound("Watchlist item".to_string()));
        }
        Ok(())
    }
}

/// Process-local repository, for callers that have no database.
#[derive(Default)]
pub struct InMemorySettings {
    state: Mutex<(UserSettings, Vec<WatchlistItem>)>,
}

impl InMemorySettings {
    pub fn new(settings: UserSettings) -> Self {
        Self {
            state: Mutex::new((settings, Vec::new())),
        }
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettings {
    async fn get_settings(&self) -> AppResult<UserSettings> {
        Ok(self.state.lock()?.0.clone())
    }

    async fn update_settings(&self, input: UpdateSettingsInput) -> AppResult<UserSettings> {
        let mut state = self.state.lock()?;
        let settings = &mut state.0;

        if let Some(val) = input.checklist_gatekeeper_enabled {
            settings.checklist_gatekeeper_enabled = val;
        }
        if let Some(val) = input.drawdown_simulator_enabled {
            settings.drawdown_simulator_enabled = val;
        }
        if let Some(val) = input.account_balance {
            settings.account_balance = clean_balance(val)?;
        }
        if let Some(val) = &input.currency {
            settings.currency = clean_currency(val)?;
        }
        settings.updated_at = Utc::now();

        Ok(settings.clone())
    }

    async fn list_watchlist(&self) -> AppResult<Vec<WatchlistItem>> {
        let mut items = self.state.lock()?.1.clone();
        items.reverse();
        Ok(items)
    }

    async fn add_watchlist_item(&self, input: AddWatchlistItemInput) -> AppResult<WatchlistItem> {
        let item = input.validate()?;
        let mut state = self.state.lock()?;

        if state.1.iter().any(|existing| existing.ticker == item.ticker) {
            return Err(duplicate_ticker(AppError::Conflict(String::new()), &item.ticker));
        }

        let added = WatchlistItem {
            id: uuid::Uuid::new_v4().to_string(),
            ticker: item.ticker,
            setup_type: item.setup_type,
            trigger_price: item.trigger_price,
            notes: item.notes,
            created_at: Utc::now(),
        };
        state.1.push(added.clone());
        Ok(added)
    }

    async fn remove_watchlist_item(&self, id: &str) -> AppResult<()> {
        let mut state = self.state.lock()?;
        let before = state.1.len();
        state.1.retain(|item| item.id != id);
        if state.1.len() == before {
            return Err(AppError::NotFound("Watchlist item".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SetupType;

    fn breakout(ticker: &str) -> AddWatchlistItemInput {
        AddWatchlistItemInput {
            ticker: ticker.to_string(),
            setup_type: SetupType::Breakout,
            trigger_price: 42.5,
            notes: String::new(),
        }
    }

    async fn exercise_settings(repo: &dyn SettingsRepository) {
        let defaults = repo.get_settings().await.unwrap();
        assert!(defaults.checklist_gatekeeper_enabled);
        assert!(!defaults.drawdown_simulator_enabled);
        assert!(defaults.account_balance.is_none());
        assert_eq!(defaults.currency, "€");

        let before = Utc::now().timestamp_millis();
        let updated = repo
            .update_settings(UpdateSettingsInput {
                account_balance: Some(25000.0),
                drawdown_simulator_enabled: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.account_balance, Some(25000.0));
        assert!(updated.drawdown_simulator_enabled);
        assert!(updated.checklist_gatekeeper_enabled, "Absent fields keep their value");
        assert!(updated.updated_at.timestamp_millis() >= before);
        assert!(updated.updated_at.timestamp_millis() <= Utc::now().timestamp_millis());

        let cleared = repo
            .update_settings(UpdateSettingsInput {
                account_balance: Some(0.0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(cleared.account_balance.is_none());
        assert!(cleared.drawdown_simulator_enabled);

        let err = repo
            .update_settings(UpdateSettingsInput {
                currency: Some("  ".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    async fn exercise_watchlist(repo: &dyn SettingsRepository) {
        let first = repo.add_watchlist_item(breakout("nvda")).await.unwrap();
        let second = repo.add_watchlist_item(breakout("amd")).await.unwrap();
        assert_eq!(first.ticker, "NVDA");

        let items = repo.list_watchlist().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);

        let dup = repo.add_watchlist_item(breakout("NVDA")).await.unwrap_err();
        assert_eq!(dup.status_code(), 409);
        assert_eq!(dup.to_string(), "NVDA is already on the watchlist");

        repo.remove_watchlist_item(&first.id).await.unwrap();
        let missing = repo.remove_watchlist_item(&first.id).await.unwrap_err();
        assert_eq!(missing.to_string(), "Watchlist item not found");
        assert_eq!(repo.list_watchlist().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_settings() {
        let db = Database::open_in_memory().unwrap();
        let seeded = db.get_settings().await.unwrap();
        assert!(seeded.updated_at.timestamp() > 1_600_000_000, "Seeded row is stored in millis");
        exercise_settings(&db).await;
    }

    #[tokio::test]
    async fn test_sqlite_watchlist() {
        let db = Database::open_in_memory().unwrap();
        exercise_watchlist(&db).await;
    }

    #[tokio::test]
    async fn test_in_memory_settings() {
        exercise_settings(&InMemorySettings::default()).await;
        exercise_watchlist(&InMemorySettings::default()).await;
    }

    #[tokio::test]
    async fn test_invalid_watchlist_item_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut item = breakout("NVDA");
        item.trigger_price = -1.0;
        assert!(matches!(db.add_watchlist_item(item).await, Err(AppError::Validation(_))));

        let err = db.add_watchlist_item(breakout("BRK.B")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
