use super::{
    types::{Config, StoreBackend},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Database path is set when the SQLite backend is selected
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.store.backend == StoreBackend::Sqlite && config.database.path.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "database.path cannot be empty with the sqlite backend".to_string(),
        ));
    }

    Ok(())
}
