use std::path::PathBuf;

use once_cell::sync::OnceCell;

const DEFAULT_CSV_PATH: &str = "Brasileirao_Dataset/partidas_com_estatisticas_completas.csv";
const DEFAULT_EXPORT_PATH: &str = "brasileirao_report.xlsx";
const DEFAULT_POLL_SECS: u64 = 5;

/// Read from the environment once; the binaries load `.env` files beforehand.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub csv_path: PathBuf,
    pub demo: bool,
    pub poll_secs: u64,
    pub export_path: PathBuf,
}

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

pub fn app_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let csv_path = env_path("BRASILEIRAO_CSV").unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH));
        let demo = std::env::var("BRASILEIRAO_DEMO")
            .map(|raw| truthy(&raw))
            .unwrap_or(false);
        let poll_secs = std::env::var("DATASET_POLL_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_SECS)
            .max(1);
        let export_path =
            env_path("BRASILEIRAO_EXPORT").unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));
        Self {
            csv_path,
            demo,
            poll_secs,
            export_path,
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

fn truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
