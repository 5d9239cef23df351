// FICHIER : src-core/src/qa_engine/evidence.rs

use crate::utils::data::{Deserialize, Map, Serialize, Value};

/// Détail du score de complétude des métadonnées.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessBreakdown {
    pub description: bool,
    pub geometry_type: bool,
    pub extent: bool,
    /// Nombre de champs déclarés (20 pts à partir de 3)
    pub fields: usize,
    pub capabilities: bool,
    pub max_record_count: bool,
    pub pagination: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationEvidence {
    pub tested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_record_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_page_features: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEvidence {
    pub total_fields: usize,
    pub sample_size: usize,
    pub duplicate_fields: Vec<String>,
    pub has_objectid: bool,
    pub objectid_fields: Vec<String>,
    pub high_null_fields: Vec<String>,
    pub high_null_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryEvidence {
    pub total_features: usize,
    pub empty_count: usize,
    pub invalid_count: usize,
    pub type_mismatch_count: usize,
    pub pct_empty: f64,
    pub pct_invalid: f64,
    pub pct_mismatch: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecencyEvidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edit_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months_old: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_months: Option<u32>,
}

/// Preuve structurée attachée à un verdict : une forme par règle,
/// `Fault` pour les fautes internes et `Generic` comme repli ouvert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    Reachability {
        metadata_exists: bool,
    },
    Queryability {
        count: Option<u64>,
        queryable: bool,
    },
    MetadataCompleteness {
        score: u8,
        components: CompletenessBreakdown,
    },
    RecordAvailability {
        count: Option<u64>,
    },
    Pagination(PaginationEvidence),
    Schema(SchemaEvidence),
    Geometry(GeometryEvidence),
    Recency(RecencyEvidence),
    SpatialReference {
        wkid: Option<i64>,
        wkt: Option<String>,
    },
    Fault {
        error: String,
    },
    Generic(Map<String, Value>),
}

impl Evidence {
    pub fn empty() -> Self {
        Evidence::Generic(Map::new())
    }

    pub fn fault(error: impl ToString) -> Self {
        Evidence::Fault {
            error: error.to_string(),
        }
    }

    /// Message d'erreur porté par la preuve (faute interne ou échec de pagination).
    pub fn error(&self) -> Option<&str> {
        match self {
            Evidence::Fault { error } => Some(error),
            Evidence::Pagination(p) => p.error.as_deref(),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<u8> {
        match self {
            Evidence::MetadataCompleteness { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaEvidence> {
        match self {
            Evidence::Schema(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_geometry(&self) -> Option<&GeometryEvidence> {
        match self {
            Evidence::Geometry(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_recency(&self) -> Option<&RecencyEvidence> {
        match self {
            Evidence::Recency(r) => Some(r),
            _ => None,
        }
    }
}
