//! Global config file source: `$XDG_CONFIG_HOME/adkmap/config.toml`

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};

/// Add the user's global config file, if one exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg::global_config_path() {
        Some(path) if path.exists() => Ok(builder.add_source(
            File::from(path).format(FileFormat::Toml).required(false),
        )),
        _ => Ok(builder),
    }
}
