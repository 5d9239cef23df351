// FICHIER : src-core/src/utils/config.rs

use crate::utils::env;
use crate::utils::error::{AppError, AppResult};
use crate::utils::json::{self, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Singleton global (réservé au CLI : la librairie prend sa configuration en argument)
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

pub const DEFAULT_SAMPLE_SIZE: usize = 200;
pub const DEFAULT_STALENESS_MONTHS: u32 = 24;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_RETRIES: u32 = 2;
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Configuration du pipeline QA.
/// Chaque champ a une valeur par défaut : un fichier vide `{}` est valide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub sample_size: usize,
    pub staleness_threshold_months: u32,
    pub request_timeout_secs: u64,
    // Nouvelles tentatives sur erreur transitoire (réseau, délai) avant "donnée absente"
    pub retries: u32,
    pub concurrency: usize,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            staleness_threshold_months: DEFAULT_STALENESS_MONTHS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            concurrency: DEFAULT_CONCURRENCY,
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Sous-ensemble de la configuration consommé par l'évaluateur de couche.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QaSettings {
    pub sample_size: usize,
    pub staleness_threshold_months: u32,
    pub request_timeout: Duration,
    pub retries: u32,
    /// Attente avant la première relance, doublée ensuite (plafond 10 s)
    pub retry_backoff: Duration,
}

impl Default for QaSettings {
    fn default() -> Self {
        AppConfig::default().qa_settings()
    }
}

/// Réglages du logger (voir `utils::logger`).
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Charge un fichier JSON par-dessus les valeurs par défaut (Deep Merge).
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Lecture de {} impossible : {}", path.display(), e))
        })?;
        let overlay: Value = json::parse(&content)?;

        let mut base = json::to_value(AppConfig::default())?;
        json::merge(&mut base, overlay);

        let config: AppConfig = json::from_value(base)?;
        config.validate()?;
        Ok(config)
    }

    /// Surcharges `GEOQA_*` issues de l'environnement.
    pub fn apply_env_overrides(mut self) -> AppResult<Self> {
        if let Some(v) = env::get_parsed::<usize>("GEOQA_SAMPLE_SIZE")? {
            self.sample_size = v;
        }
        if let Some(v) = env::get_parsed::<u32>("GEOQA_STALENESS_MONTHS")? {
            self.staleness_threshold_months = v;
        }
        if let Some(v) = env::get_parsed::<u64>("GEOQA_TIMEOUT_SECS")? {
            self.request_timeout_secs = v;
        }
        if let Some(v) = env::get_parsed::<u32>("GEOQA_RETRIES")? {
            self.retries = v;
        }
        if let Some(v) = env::get_parsed::<usize>("GEOQA_CONCURRENCY")? {
            self.concurrency = v;
        }
        if let Some(v) = env::get_optional("GEOQA_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = env::get_optional("GEOQA_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.sample_size == 0 {
            return Err(AppError::Config("sample_size doit être > 0".into()));
        }
        if self.concurrency == 0 {
            return Err(AppError::Config("concurrency doit être > 0".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config("request_timeout_secs doit être > 0".into()));
        }
        Ok(())
    }

    pub fn qa_settings(&self) -> QaSettings {
        QaSettings {
            sample_size: self.sample_size,
            staleness_threshold_months: self.staleness_threshold_months,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            retries: self.retries,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }

    /// Fige la configuration du processus. Un second appel est ignoré.
    pub fn init(config: AppConfig) -> &'static AppConfig {
        CONFIG.get_or_init(|| config)
    }
}

// --- TESTS UNITAIRES ---
