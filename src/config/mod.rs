mod loader;
mod settings;

pub use loader::{load_config, LoadedConfig, ProfileConfig, ScreenplayConfig, CONFIG_FILE_NAME};
pub use settings::{RestSettings, SettingsBuilder};
