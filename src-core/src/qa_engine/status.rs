// FICHIER : src-core/src/qa_engine/status.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict d'une règle ou d'une couche.
/// Ordre de sévérité : `Fail > Warn > Pass` ; `Na` est informatif et hors classement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum QaStatus {
    Pass,
    Warn,
    Fail,
    #[default]
    Na,
}

impl QaStatus {
    /// Rang de sévérité, `None` pour `Na`.
    pub fn severity(self) -> Option<u8> {
        match self {
            QaStatus::Pass => Some(0),
            QaStatus::Warn => Some(1),
            QaStatus::Fail => Some(2),
            QaStatus::Na => None,
        }
    }

    pub fn is_issue(self) -> bool {
        matches!(self, QaStatus::Fail | QaStatus::Warn)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QaStatus::Pass => "PASS",
            QaStatus::Warn => "WARN",
            QaStatus::Fail => "FAIL",
            QaStatus::Na => "NA",
        }
    }

    /// Statut le plus sévère d'une séquence. Les `Na` sont ignorés ;
    /// une séquence vide (ou uniquement `Na`) agrège en `Pass`.
    pub fn aggregate<I>(statuses: I) -> QaStatus
    where
        I: IntoIterator<Item = QaStatus>,
    {
        statuses
            .into_iter()
            .filter(|s| s.severity().is_some())
            .max_by_key(|s| s.severity())
            .unwrap_or(QaStatus::Pass)
    }
}

impl fmt::Display for QaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
