// FICHIER : src-core/src/utils/mod.rs

// =========================================================================
//  GEOQA UTILS - Foundation Layer
// =========================================================================

pub mod config;
pub mod env;
pub mod error;
pub mod json;
pub mod logger;

// --- FAÇADES SÉMANTIQUES ---

/// **Core Foundation** : Types de base et Erreurs.
pub mod core {
    pub use super::error::{AppError, AppResult};
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}

/// **Data Abstraction** : Manipulation JSON.
pub mod data {
    pub use super::json::{
        from_value, is_present, json, merge, parse, stringify_pretty, to_value, truncate_chars,
        Map, Value,
    };
    pub use serde::{Deserialize, Serialize};
    pub use std::collections::{BTreeMap, HashMap, HashSet};
}

/// **Application Context** : Config, Log, Env.
pub mod context {
    pub use super::config::{AppConfig, LogSettings, QaSettings};
    pub use super::logger::init_logging;
}

/// **Le Prélude** : À utiliser via `use crate::utils::prelude::*;`
pub mod prelude {
    pub use super::core::{AppError, AppResult, DateTime, Utc, Uuid};
    pub use super::data::{json, Deserialize, Map, Serialize, Value};
    pub use tracing::{debug, error, info, instrument, warn};
}

pub use async_trait::async_trait;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use logger::init_logging;
