use std::path::PathBuf;

pub const ENV_ORDERS_CSV: &str = "DESPATCH_ORDERS_CSV";
pub const ENV_LOADINGS_CSV: &str = "DESPATCH_LOADINGS_CSV";
pub const ENV_OUTPUT_DIR: &str = "DESPATCH_OUTPUT_DIR";
pub const ENV_PREVIEW_ROWS: &str = "DESPATCH_PREVIEW_ROWS";

/// Where the worksheet exports live and where reports go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub orders_path: PathBuf,
    pub loadings_path: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            orders_path: PathBuf::from("ordered.csv"),
            loadings_path: PathBuf::from("loaded.csv"),
            output_dir: PathBuf::from("."),
            preview_rows: 5,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DashboardConfig::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_ORDERS_CSV) {
            config.orders_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_LOADINGS_CSV) {
            config.loadings_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_PREVIEW_ROWS) {
            match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.preview_rows = n,
                _ => log::warn!(
                    "{}={:?} is not a positive integer, using {}",
                    ENV_PREVIEW_ROWS,
                    v,
                    config.preview_rows
                ),
            }
        }
        config
    }
}
