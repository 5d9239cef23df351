// FICHIER : src-core/src/utils/error.rs

use serde::Serialize;
use std::io;

use crate::source::SourceError;

// --- GESTION D'ERREUR STRICTE ---

/// Type de résultat standard pour le moteur QA.
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Enumération centrale des erreurs du moteur.
/// Aucune de ces erreurs n'est fatale : les règles et l'évaluateur les
/// convertissent en verdicts ou en entrées du journal d'erreurs de la couche.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Erreur de configuration : {0}")]
    Config(String),

    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] io::Error),

    #[error("Erreur de sérialisation : {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Métadonnées inexploitables : {0}")]
    Metadata(String),

    #[error("Géométrie inexploitable : {0}")]
    Geometry(String),

    #[error("Erreur du service amont : {0}")]
    Source(#[from] SourceError),

    #[error("Introuvable : {0}")]
    NotFound(String),

    #[error("Erreur Système : {0}")]
    System(#[from] anyhow::Error),
}

// Les rapports JSON embarquent l'erreur sous forme de simple chaîne.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

// Permet de faire : return Err("Mon erreur".into());
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::System(anyhow::anyhow!(s))
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::System(anyhow::anyhow!(s.to_string()))
    }
}
