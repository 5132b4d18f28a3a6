use anyhow::{Context, Result};
use shared::domain::Theme;
use storage::PreferenceStore;
use tracing::{info, warn};

pub const THEME_KEY: &str = "theme";

/// Reads the persisted theme once; anything unreadable falls back to the system default.
pub async fn load_theme(store: &dyn PreferenceStore, system_prefers_dark: bool) -> Theme {
    let system_default = Theme::from_dark_flag(system_prefers_dark);
    match store.get(THEME_KEY).await {
        Ok(Some(raw)) => match Theme::parse(&raw) {
            Some(theme) => {
                info!(theme = theme.as_str(), "loaded persisted theme");
                theme
            }
            None => {
                warn!(value = %raw, "ignoring unrecognized persisted theme");
                system_default
            }
        },
        Ok(None) => system_default,
        Err(err) => {
            warn!(error = %err, "failed to read theme preference; using system default");
            system_default
        }
    }
}

pub async fn persist_theme(store: &dyn PreferenceStore, theme: Theme) -> Result<()> {
    store
        .set(THEME_KEY, theme.as_str())
        .await
        .with_context(|| format!("failed to persist theme '{}'", theme.as_str()))
}
