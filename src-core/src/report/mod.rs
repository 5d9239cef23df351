// FICHIER : src-core/src/report/mod.rs

//! Rendu des résultats en mémoire : CSV, Markdown et documents JSON par couche.
//! Rien n'est écrit sur disque ici ; c'est à l'appelant de décider où va le texte.

pub mod csv;
pub mod issues;
pub mod markdown;

pub use self::csv::render_csv;
pub use issues::{issue_document, issue_documents, render_json};
pub use markdown::render_markdown;

use crate::utils::data::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format de sortie du rapport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Csv,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("format inconnu : '{}'", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        })
    }
}

/// Nom de fichier sûr : alphanumériques, `_`, `-` et espace conservés, le reste devient `_`.
pub fn safe_file_stem(layer_name: &str) -> String {
    layer_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Tronque à `max` caractères et ajoute `...` si la chaîne a été coupée.
pub(crate) fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let mut cut: String = s.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        s.to_string()
    }
}
