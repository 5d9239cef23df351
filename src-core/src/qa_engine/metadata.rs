// FICHIER : src-core/src/qa_engine/metadata.rs

use crate::utils::data::{is_present, truncate_chars, Map, Value};
use crate::utils::error::{AppError, AppResult};

/// Longueur maximale conservée pour un WKT dans les preuves.
pub const WKT_MAX_CHARS: usize = 200;

/// Page serveur supposée quand `maxRecordCount` n'est pas annoncé.
pub const DEFAULT_MAX_RECORD_COUNT: u64 = 1000;

const ESRI_GEOMETRY_PREFIX: &str = "esriGeometry";

/// Vue typée (en lecture seule) sur le JSON de métadonnées d'une couche ArcGIS.
#[derive(Debug, Clone, Copy)]
pub struct LayerMetadata<'a> {
    raw: &'a Map<String, Value>,
}

impl<'a> LayerMetadata<'a> {
    pub fn new(raw: &'a Map<String, Value>) -> Self {
        Self { raw }
    }

    /// Présence "à la JSON" (voir `utils::json::is_present`).
    pub fn has(&self, key: &str) -> bool {
        is_present(self.raw.get(key))
    }

    pub fn name(&self) -> Option<&'a str> {
        self.raw.get("name").and_then(Value::as_str)
    }

    /// `geometryType` brut, ex. `esriGeometryPolygon`.
    pub fn geometry_type(&self) -> Option<&'a str> {
        self.raw
            .get("geometryType")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// `geometryType` sans le préfixe `esriGeometry`.
    pub fn geometry_type_short(&self) -> Option<String> {
        self.geometry_type().map(|g| {
            g.strip_prefix(ESRI_GEOMETRY_PREFIX)
                .unwrap_or(g)
                .to_string()
        })
    }

    pub fn max_record_count(&self) -> Option<u64> {
        self.raw.get("maxRecordCount").and_then(as_u64_lenient)
    }

    pub fn max_record_count_or_default(&self) -> u64 {
        self.max_record_count()
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_MAX_RECORD_COUNT)
    }

    /// Liste `fields`. Absente => `Ok(None)` ; présente mais pas un tableau => faute.
    pub fn fields(&self) -> AppResult<Option<&'a Vec<Value>>> {
        match self.raw.get("fields") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(AppError::Metadata(format!(
                "'fields' n'est pas un tableau ({})",
                json_kind(other)
            ))),
        }
    }

    pub fn supports_pagination(&self) -> bool {
        let Some(adv) = self
            .raw
            .get("advancedQueryCapabilities")
            .and_then(Value::as_object)
        else {
            return false;
        };
        is_present(adv.get("supportsPagination"))
            || is_present(adv.get("supportsQueryWithPagination"))
    }

    fn spatial_reference(&self) -> Option<&'a Map<String, Value>> {
        self.raw
            .get("extent")?
            .as_object()?
            .get("spatialReference")?
            .as_object()
    }

    /// WKID principal, puis `latestWkid`. Un `0` ou une valeur non numérique est ignoré.
    pub fn wkid(&self) -> Option<i64> {
        let sr = self.spatial_reference()?;
        ["wkid", "latestWkid"]
            .iter()
            .filter_map(|k| sr.get(*k).and_then(as_i64_lenient))
            .find(|w| *w != 0)
    }

    pub fn wkt(&self) -> Option<String> {
        self.spatial_reference()?
            .get("wkt")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| truncate_chars(s, WKT_MAX_CHARS))
    }

    /// `editingInfo.lastEditDate` en millisecondes epoch.
    pub fn last_edit_date_ms(&self) -> Option<i64> {
        self.raw
            .get("editingInfo")?
            .as_object()?
            .get("lastEditDate")
            .and_then(as_i64_lenient)
            .filter(|ms| *ms != 0)
    }

    pub fn edit_date_field(&self) -> Option<&'a str> {
        self.raw
            .get("editFieldsInfo")?
            .as_object()?
            .get("editDateField")?
            .as_str()
            .filter(|s| !s.is_empty())
    }
}

fn as_u64_lenient(v: &Value) -> Option<u64> {
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn as_i64_lenient(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

pub(crate) fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "booléen",
        Value::Number(_) => "nombre",
        Value::String(_) => "chaîne",
        Value::Array(_) => "tableau",
        Value::Object(_) => "objet",
    }
}
