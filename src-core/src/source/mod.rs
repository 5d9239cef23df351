// FICHIER : src-core/src/source/mod.rs

pub mod fixture;

pub use fixture::{FixtureSource, LayerFixture, SourceCall};

use crate::qa_engine::model::FormatSupport;
use crate::utils::async_trait;
use crate::utils::data::{Deserialize, Map, Serialize, Value};

/// Filtre "toutes les entités" des requêtes ArcGIS.
pub const WHERE_ALL: &str = "1=1";

/// Erreurs levées par un collaborateur (par opposition à "pas de données", qui est `Ok(None)`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("erreur réseau : {0}")]
    Network(String),
    #[error("délai dépassé après {0} ms")]
    Timeout(u64),
    #[error("service inconnu : {0}")]
    NotFound(String),
}

impl SourceError {
    /// Erreurs qui justifient une nouvelle tentative.
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Network(_) | SourceError::Timeout(_))
    }
}

/// Une entité échantillonnée : attributs + géométrie esri-JSON optionnelle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

impl Feature {
    pub fn new(attributes: Map<String, Value>, geometry: Option<Value>) -> Self {
        Self {
            attributes,
            geometry,
        }
    }
}

/// Paramètres d'échantillonnage (équivalent des paramètres `query` ArcGIS).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRequest {
    pub max_items: usize,
    pub filter: String,
    pub fields: String,
    pub include_geometry: bool,
    /// Taille de page annoncée par le serveur (`maxRecordCount`)
    pub page_size_hint: Option<u64>,
}

impl SampleRequest {
    pub fn all_fields(max_items: usize, page_size_hint: Option<u64>) -> Self {
        Self {
            max_items,
            filter: WHERE_ALL.to_string(),
            fields: "*".to_string(),
            include_geometry: true,
            page_size_hint,
        }
    }
}

/// Contrat des collaborateurs amont consommés par l'évaluateur de couche.
///
/// `Ok(None)` signifie "donnée absente" et alimente les politiques des règles ;
/// `Err(_)` est une faute d'orchestration capturée à la frontière de l'évaluateur.
#[async_trait]
pub trait LayerSource: Send + Sync {
    async fn fetch_metadata(&self, service_url: &str)
        -> Result<Option<Map<String, Value>>, SourceError>;

    async fn fetch_count(&self, service_url: &str, filter: &str)
        -> Result<Option<u64>, SourceError>;

    /// Doit s'arrêter dès que `max_items` est atteint ou qu'une page revient incomplète.
    async fn fetch_sample(
        &self,
        service_url: &str,
        request: &SampleRequest,
    ) -> Result<Option<Vec<Feature>>, SourceError>;

    async fn fetch_page_at_offset(
        &self,
        service_url: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<Feature>, SourceError>;

    async fn probe_output_formats(&self, service_url: &str) -> FormatSupport;
}
