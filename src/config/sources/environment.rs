//! Environment variable source: ADKMAP__ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Keys whose environment values are comma-separated lists.
const LIST_KEYS: &[&str] = &[
    "constructors.agents",
    "constructors.tools",
    "constructors.wrappers",
    "scan.extensions",
    "scan.exclude_dirs",
];

/// Add environment variable overlay to builder.
/// Uses ADKMAP__ prefix and __ as separator for nested keys,
/// e.g. `ADKMAP__SCAN__PARALLEL=true`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut source = Environment::with_prefix("ADKMAP")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .try_parsing(true);
    for key in LIST_KEYS {
        source = source.with_list_parse_key(key);
    }
    Ok(builder.add_source(source))
}
