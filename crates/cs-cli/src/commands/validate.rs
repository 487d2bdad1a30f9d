use std::path::Path;

use anyhow::Context;
use cs_core::schema::{try_parse_plugin_locations, ConfigSchema};

/// Check a local configuration file against the plugin schema and print the
/// plugin locations it references.
pub fn run(path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let schema = ConfigSchema::new().context("failed to load configuration schema")?;

    let result = schema.validate_yaml(&text);
    if !result.is_valid() {
        anyhow::bail!(
            "{} is invalid: {}",
            path.display(),
            result.error.unwrap_or_default()
        );
    }

    let locations = try_parse_plugin_locations(&text)
        .with_context(|| format!("failed to read plugins from {}", path.display()))?;
    println!("{} is valid ({} plugins)", path.display(), locations.len());
    for location in &locations {
        println!("  {location}");
    }
    Ok(())
}
