use crate::commands::{respond, CommandResult};
use crate::models::{AddWatchlistItemInput, UpdateSettingsInput, UserSettings, WatchlistItem};
use crate::store::SettingsRepository;

pub async fn get_settings(repo: &dyn SettingsRepository) -> CommandResult<UserSettings> {
    repo.get_settings().await.map_err(respond)
}

pub async fn update_settings(
    repo: &dyn SettingsRepository,
    settings: UpdateSettingsInput,
) -> CommandResult<UserSettings> {
    repo.update_settings(settings).await.map_err(respond)
}

pub async fn get_watchlist(repo: &dyn SettingsRepository) -> CommandResult<Vec<WatchlistItem>> {
    repo.list_watchlist().await.map_err(respond)
}

pub async fn add_to_watchlist(
    repo: &dyn SettingsRepository,
    item: AddWatchlistItemInput,
) -> CommandResult<WatchlistItem> {
    repo.add_watchlist_item(item).await.map_err(respond)
}

pub async fn remove_from_watchlist(repo: &dyn SettingsRepository, id: &str) -> CommandResult<()> {
    repo.remove_watchlist_item(id).await.map_err(respond)
}
