//! File persistence configuration

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    /// Directory holding the sqlite series store
    pub data_dir: &'static str,
    /// Filename of the sqlite series store inside `data_dir`
    pub series_db: &'static str,
    /// Directory holding fitted model artifacts
    pub model_dir: &'static str,
    /// Current version of the model artifact serialization format
    pub model_version: u32,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    data_dir: "data",
    series_db: "series.sqlite",
    model_dir: "models",
    model_version: 2,
};

/// Generate symbol-specific model filename
/// Example: "NFLX_model_v2.bin"
pub fn model_filename(symbol: &str) -> String {
    format!(
        "{}_model_v{}.bin",
        symbol.to_uppercase(),
        PERSISTENCE.model_version
    )
}
