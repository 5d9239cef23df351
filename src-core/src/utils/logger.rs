// FICHIER : src-core/src/utils/logger.rs

use crate::utils::config::LogSettings;
use std::sync::Once;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Sécurité pour éviter la double initialisation (crash fréquent en tests)
static INIT: Once = Once::new();

pub const LOG_FILE_NAME: &str = "geoqa.log";

/// Installe le subscriber global. Appelé uniquement par les binaires :
/// la librairie se contente d'émettre des événements `tracing`.
pub fn init_logging(settings: &LogSettings) {
    INIT.call_once(|| {
        // =========================================================================
        // LAYER 1 : CONSOLE (Pour l'Humain)
        // =========================================================================
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let console_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter);

        // =========================================================================
        // LAYER 2 : FICHIER JSON (optionnel, tout en DEBUG)
        // =========================================================================
        let file_layer = settings.log_dir.as_ref().and_then(|dir| {
            if let Err(e) = std::fs::create_dir_all(dir) {
                eprintln!("⚠️ [Logger] Dossier de logs inutilisable {:?} : {}", dir, e);
                return None;
            }
            let appender = rolling::daily(dir, LOG_FILE_NAME);
            Some(
                fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        });

        let registry = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer);

        if registry.try_init().is_err() {
            tracing::warn!("[Logger] Tentative de ré-initialisation ignorée (subscriber déjà actif).");
            return;
        }

        tracing::debug!(level = %settings.level, log_dir = ?settings.log_dir, "Logger initialisé");
    });
}
