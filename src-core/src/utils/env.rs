// FICHIER : src-core/src/utils/env.rs

use crate::utils::error::{AppError, AppResult};
use std::env;
use std::str::FromStr;

/// Récupère une variable d'environnement (Optionnel).
pub fn get_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Récupère et parse une variable optionnelle (ex: GEOQA_CONCURRENCY=8).
/// Absente => `Ok(None)`, présente mais illisible => erreur de configuration.
pub fn get_parsed<T: FromStr>(key: &str) -> AppResult<Option<T>> {
    match get_optional(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            AppError::Config(format!(
                "Impossible de parser la variable : {} = '{}'",
                key, raw
            ))
        }),
    }
}
