// FICHIER : src-core/src/utils/json.rs

use crate::utils::error::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

// --- RE-EXPORTS (Single Source of Truth pour le JSON) ---
pub use serde_json::{json, Map, Value};

/// Parse une chaîne JSON en un type T.
/// L'erreur embarque un extrait du contenu pour aider au débogage.
pub fn parse<T: DeserializeOwned>(s: &str) -> AppResult<T> {
    serde_json::from_str(s).map_err(|e| {
        let snippet: String = s.chars().take(100).collect();
        AppError::System(anyhow::anyhow!("{} (extrait : {})", e, snippet))
    })
}

/// Convertit un type T en chaîne JSON formatée (pretty).
pub fn stringify_pretty<T: Serialize>(v: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(v)?)
}

/// Convertit un type T en `serde_json::Value`.
pub fn to_value<T: Serialize>(v: T) -> AppResult<Value> {
    Ok(serde_json::to_value(v)?)
}

/// Convertit un `serde_json::Value` en type T.
pub fn from_value<T: DeserializeOwned>(v: Value) -> AppResult<T> {
    Ok(serde_json::from_value(v)?)
}

/// Fusionne récursivement deux objets JSON (Deep Merge).
/// L'objet `b` écrase les valeurs de `a` en cas de conflit.
pub fn merge(a: &mut Value, b: Value) {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            for (k, v) in b {
                merge(a.entry(k).or_insert(Value::Null), v);
            }
        }
        (a, b) => *a = b,
    }
}

/// Vérité "à la JSON de service" : null, false, 0, "" , [] et {} sont absents.
/// Les métadonnées ArcGIS renvoient souvent des champs vides plutôt que de les omettre.
pub fn is_present(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Tronque une chaîne à `max` caractères (et non octets).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
