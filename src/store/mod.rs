//! Persistence seams. Commands depend on these traits, never on SQLite directly;
//! `Database` implements all three.

mod calculations;
mod journal;
pub mod settings;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::{
    AddWatchlistItemInput, CalculationFilters, CreateJournalInput, JournalEntry, JournalFilters,
    JournalUpdate, SaveCalculationInput, SavedCalculation, UpdateSettingsInput, UserSettings,
    WatchlistItem,
};

pub use settings::InMemorySettings;

#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Validate and insert a new entry with a generated id and timestamp.
    async fn create_entry(&self, input: CreateJournalInput) -> AppResult<JournalEntry>;

    /// Entries matching the filters, newest first.
    async fn list_entries(&self, filters: &JournalFilters) -> AppResult<Vec<JournalEntry>>;

    async fn get_entry(&self, id: &str) -> AppResult<JournalEntry>;

    /// Apply a partial edit. Touching any price or the direction recomputes the
    /// R-multiple and potential profit from the merged values.
    async fn update_entry(&self, id: &str, update: &JournalUpdate) -> AppResult<JournalEntry>;

    async fn delete_entry(&self, id: &str) -> AppResult<()>;

    /// Open entries whose ticker equals `ticker` exactly.
    async fn find_open_entries(&self, ticker: &str) -> AppResult<Vec<JournalEntry>>;
}

#[async_trait]
pub trait CalculationStore: Send + Sync {
    async fn save_calculation(&self, input: SaveCalculationInput) -> AppResult<SavedCalculation>;

    async fn list_calculations(&self, filters: &CalculationFilters) -> AppResult<Vec<SavedCalculation>>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_settings(&self) -> AppResult<UserSettings>;

    async fn update_settings(&self, input: UpdateSettingsInput) -> AppResult<UserSettings>;

    async fn list_watchlist(&self) -> AppResult<Vec<WatchlistItem>>;

    async fn add_watchlist_item(&self, input: AddWatchlistItemInput) -> AppResult<WatchlistItem>;

    async fn remove_watchlist_item(&self, id: &str) -> AppResult<()>;
}

/// Read a millisecond timestamp column.
pub(crate) fn datetime_from_millis(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {}", millis).into(),
        )
    })
}

/// Millisecond clock used for every stored creation time.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
