pub mod sync;
pub mod validate;

/// Read a required secret from the environment variable named in settings.
pub fn secret_from_env(var: &str) -> anyhow::Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("environment variable {var} is not set"),
    }
}
