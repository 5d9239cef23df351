// FICHIER : src-core/src/source/fixture.rs

use super::{Feature, LayerSource, SampleRequest, SourceError};
use crate::qa_engine::model::FormatSupport;
use crate::utils::async_trait;
use crate::utils::data::{Deserialize, HashMap, Map, Serialize, Value};
use crate::utils::error::{AppError, AppResult};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Appel du contrat `LayerSource` ciblé par une panne simulée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCall {
    Metadata,
    Count,
    Sample,
}

/// Réponses capturées d'un service ArcGIS, rejouées hors-ligne.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerFixture {
    pub service_url: String,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub count: Option<u64>,
    /// Contenu complet du "serveur" ; `None` = l'échantillonnage échoue
    #[serde(default)]
    pub features: Option<Vec<Feature>>,
    #[serde(default)]
    pub formats: FormatSupport,
    /// Simule une erreur de transport sur la requête paginée
    #[serde(default)]
    pub page_error: Option<String>,
    /// Appels qui lèvent une erreur réseau au lieu de renvoyer "absent"
    #[serde(default)]
    pub failures: HashMap<SourceCall, String>,
}

impl LayerFixture {
    pub fn new(service_url: &str) -> Self {
        Self {
            service_url: service_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata.as_object().cloned();
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = Some(features);
        self
    }

    pub fn with_formats(mut self, formats: FormatSupport) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_page_error(mut self, message: &str) -> Self {
        self.page_error = Some(message.to_string());
        self
    }

    pub fn with_failure(mut self, call: SourceCall, message: &str) -> Self {
        self.failures.insert(call, message.to_string());
        self
    }

    /// Panne de transport sur tous les appels (métadonnées, comptage, échantillon).
    pub fn with_transport_error(self, message: &str) -> Self {
        self.with_failure(SourceCall::Metadata, message)
            .with_failure(SourceCall::Count, message)
            .with_failure(SourceCall::Sample, message)
    }

    fn check(&self, call: SourceCall) -> Result<(), SourceError> {
        match self.failures.get(&call) {
            Some(msg) => Err(SourceError::Network(msg.clone())),
            None => Ok(()),
        }
    }
}

/// Source en mémoire : aucune I/O réseau, lecture seule après construction.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    layers: HashMap<String, LayerFixture>,
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, fixture: LayerFixture) -> Self {
        self.insert(fixture);
        self
    }

    pub fn insert(&mut self, fixture: LayerFixture) {
        self.layers
            .insert(normalize_url(&fixture.service_url), fixture);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Charge tous les `*.json` d'un dossier (un `LayerFixture` par fichier).
    #[instrument(skip(dir), fields(dir = ?dir.as_ref()))]
    pub async fn from_dir(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            AppError::NotFound(format!("Dossier de fixtures {} : {}", dir.display(), e))
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        let reads = paths.iter().map(|path| async move {
            let raw = tokio::fs::read_to_string(path).await?;
            let fixture: LayerFixture = serde_json::from_str(&raw).map_err(|e| {
                AppError::Config(format!("Fixture invalide {} : {}", path.display(), e))
            })?;
            Ok::<_, AppError>(fixture)
        });
        let fixtures = futures::future::try_join_all(reads).await?;

        let mut source = Self::new();
        for fixture in fixtures {
            debug!(url = %fixture.service_url, "Fixture chargée");
            source.insert(fixture);
        }
        if source.is_empty() {
            warn!("Aucune fixture trouvée dans {}", dir.display());
        }
        Ok(source)
    }

    fn lookup(&self, service_url: &str) -> Option<&LayerFixture> {
        self.layers.get(&normalize_url(service_url))
    }
}

#[async_trait]
impl LayerSource for FixtureSource {
    async fn fetch_metadata(
        &self,
        service_url: &str,
    ) -> Result<Option<Map<String, Value>>, SourceError> {
        let Some(layer) = self.lookup(service_url) else {
            return Ok(None);
        };
        layer.check(SourceCall::Metadata)?;
        Ok(layer.metadata.clone())
    }

    async fn fetch_count(
        &self,
        service_url: &str,
        _filter: &str,
    ) -> Result<Option<u64>, SourceError> {
        let Some(layer) = self.lookup(service_url) else {
            return Ok(None);
        };
        layer.check(SourceCall::Count)?;
        Ok(layer.count)
    }

    async fn fetch_sample(
        &self,
        service_url: &str,
        request: &SampleRequest,
    ) -> Result<Option<Vec<Feature>>, SourceError> {
        let Some(layer) = self.lookup(service_url) else {
            return Ok(None);
        };
        layer.check(SourceCall::Sample)?;
        let Some(all) = layer.features.as_ref() else {
            return Ok(None);
        };

        // Même boucle qu'un serveur paginé : pages de `page_size_hint`, arrêt sur page courte
        let page_size = request
            .page_size_hint
            .filter(|p| *p > 0)
            .map(|p| p as usize)
            .unwrap_or(1000);
        let mut sample = Vec::new();
        let mut offset = 0usize;

        while sample.len() < request.max_items {
            let limit = (request.max_items - sample.len()).min(page_size);
            let end = (offset + limit).min(all.len());
            let batch = all.get(offset..end).unwrap_or(&[]);
            if batch.is_empty() {
                break;
            }
            sample.extend(batch.iter().map(|f| {
                if request.include_geometry {
                    f.clone()
                } else {
                    Feature::new(f.attributes.clone(), None)
                }
            }));
            offset += batch.len();
            if batch.len() < limit {
                break;
            }
        }

        Ok(Some(sample))
    }

    async fn fetch_page_at_offset(
        &self,
        service_url: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<Feature>, SourceError> {
        let Some(layer) = self.lookup(service_url) else {
            return Err(SourceError::NotFound(service_url.to_string()));
        };
        if let Some(msg) = &layer.page_error {
            return Err(SourceError::Network(msg.clone()));
        }
        let all = layer.features.as_deref().unwrap_or(&[]);
        let start = (offset as usize).min(all.len());
        let end = start.saturating_add(limit).min(all.len());
        Ok(all[start..end].to_vec())
    }

    async fn probe_output_formats(&self, service_url: &str) -> FormatSupport {
        self.lookup(service_url)
            .map(|l| l.formats)
            .unwrap_or_default()
    }
}
