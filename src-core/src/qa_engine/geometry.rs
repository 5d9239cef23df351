// FICHIER : src-core/src/qa_engine/geometry.rs

//! Géométries esri-JSON (et GeoJSON) : lecture, vacuité, validité topologique.
//!
//! Les contrôles reprennent les cas usuels d'invalidité d'une couche publiée :
//! coordonnées non finies, lignes dégénérées, anneaux trop courts ou
//! auto-intersectants. Les anneaux non fermés sont refermés à la lecture.

use super::model::ExpectedGeometry;
use crate::utils::data::{is_present, Map, Value};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

pub type Path = Vec<Coord>;

/// Forme canonique après lecture.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Path),
    MultiLineString(Vec<Path>),
    /// Anneau extérieur puis trous
    Polygon(Vec<Path>),
    MultiPolygon(Vec<Vec<Path>>),
}

/// Famille de base (les variantes Multi* sont rattachées à leur famille).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFamily {
    Point,
    Line,
    Polygon,
}

impl Shape {
    pub fn family(&self) -> GeometryFamily {
        match self {
            Shape::Point(_) | Shape::MultiPoint(_) => GeometryFamily::Point,
            Shape::LineString(_) | Shape::MultiLineString(_) => GeometryFamily::Line,
            Shape::Polygon(_) | Shape::MultiPolygon(_) => GeometryFamily::Polygon,
        }
    }

    /// Vérifie la validité ; `Err(AppError::Geometry)` décrit le premier défaut trouvé.
    pub fn validate(&self) -> AppResult<()> {
        match self {
            Shape::Point(c) => check_finite(std::slice::from_ref(c)),
            Shape::MultiPoint(points) => {
                if points.is_empty() {
                    return Err(AppError::Geometry("multipoint sans point".into()));
                }
                check_finite(points)
            }
            Shape::LineString(path) => validate_line(path),
            Shape::MultiLineString(paths) => {
                if paths.is_empty() {
                    return Err(AppError::Geometry("polyligne sans chemin".into()));
                }
                paths.iter().try_for_each(validate_line)
            }
            Shape::Polygon(rings) => validate_polygon(rings),
            Shape::MultiPolygon(polys) => {
                if polys.is_empty() {
                    return Err(AppError::Geometry("multipolygone vide".into()));
                }
                polys.iter().try_for_each(|p| validate_polygon(p))
            }
        }
    }
}

impl ExpectedGeometry {
    /// `Unknown` ne produit jamais d'écart de type.
    pub fn matches(self, family: GeometryFamily) -> bool {
        match self {
            ExpectedGeometry::Unknown => true,
            ExpectedGeometry::Point => family == GeometryFamily::Point,
            ExpectedGeometry::Line => family == GeometryFamily::Line,
            ExpectedGeometry::Polygon => family == GeometryFamily::Polygon,
        }
    }
}

// --- VACUITÉ ---

/// Géométrie absente, nulle, ou dont tous les sous-champs sont vides.
/// `spatialReference` n'est pas une donnée géométrique et n'est pas pris en compte.
pub fn is_empty_geometry(geometry: Option<&Value>) -> bool {
    match geometry {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => !map
            .iter()
            .filter(|(k, _)| k.as_str() != "spatialReference")
            .any(|(_, v)| match v {
                // Un point esri vide porte `"x": null` ou `"x": "NaN"`
                Value::Number(_) => true,
                Value::String(s) => !s.is_empty() && !s.eq_ignore_ascii_case("nan"),
                _ => is_present(Some(v)),
            }),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

// --- LECTURE ---

/// Lit une géométrie esri-JSON (`x/y`, `points`, `paths`, `rings`) ou GeoJSON (`type` + `coordinates`).
pub fn parse_geometry(value: &Value) -> AppResult<Shape> {
    let obj = value
        .as_object()
        .ok_or_else(|| AppError::Geometry("la géométrie n'est pas un objet".into()))?;

    if obj.contains_key("type") && obj.contains_key("coordinates") {
        return parse_geojson(obj);
    }

    if let Some(rings) = obj.get("rings") {
        let rings = parse_paths(rings)?.into_iter().map(close_ring).collect();
        return Ok(Shape::Polygon(rings));
    }
    if let Some(paths) = obj.get("paths") {
        let mut paths = parse_paths(paths)?;
        return Ok(if paths.len() == 1 {
            Shape::LineString(paths.remove(0))
        } else {
            Shape::MultiLineString(paths)
        });
    }
    if let Some(points) = obj.get("points") {
        return Ok(Shape::MultiPoint(parse_path(points)?));
    }
    if obj.contains_key("x") || obj.contains_key("y") {
        let x = number(obj.get("x"), "x")?;
        let y = number(obj.get("y"), "y")?;
        return Ok(Shape::Point(Coord { x, y }));
    }
    if obj.contains_key("xmin") {
        return parse_envelope(obj);
    }

    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    Err(AppError::Geometry(format!(
        "type de géométrie non reconnu (clés : {:?})",
        keys
    )))
}

fn parse_geojson(obj: &Map<String, Value>) -> AppResult<Shape> {
    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let coords = obj.get("coordinates").unwrap_or(&Value::Null);

    match kind {
        "Point" => Ok(Shape::Point(parse_coord(coords)?)),
        "MultiPoint" => Ok(Shape::MultiPoint(parse_path(coords)?)),
        "LineString" => Ok(Shape::LineString(parse_path(coords)?)),
        "MultiLineString" => Ok(Shape::MultiLineString(parse_paths(coords)?)),
        "Polygon" => Ok(Shape::Polygon(
            parse_paths(coords)?.into_iter().map(close_ring).collect(),
        )),
        "MultiPolygon" => {
            let polys = as_array(coords, "coordinates")?
                .iter()
                .map(|p| -> AppResult<Vec<Path>> {
                    Ok(parse_paths(p)?.into_iter().map(close_ring).collect())
                })
                .collect::<AppResult<Vec<_>>>()?;
            Ok(Shape::MultiPolygon(polys))
        }
        other => Err(AppError::Geometry(format!(
            "type GeoJSON non supporté : '{}'",
            other
        ))),
    }
}

fn parse_envelope(obj: &Map<String, Value>) -> AppResult<Shape> {
    let xmin = number(obj.get("xmin"), "xmin")?;
    let ymin = number(obj.get("ymin"), "ymin")?;
    let xmax = number(obj.get("xmax"), "xmax")?;
    let ymax = number(obj.get("ymax"), "ymax")?;
    let ring = vec![
        Coord { x: xmin, y: ymin },
        Coord { x: xmax, y: ymin },
        Coord { x: xmax, y: ymax },
        Coord { x: xmin, y: ymax },
        Coord { x: xmin, y: ymin },
    ];
    Ok(Shape::Polygon(vec![ring]))
}

fn as_array<'a>(v: &'a Value, what: &str) -> AppResult<&'a Vec<Value>> {
    v.as_array()
        .ok_or_else(|| AppError::Geometry(format!("'{}' n'est pas un tableau", what)))
}

fn number(v: Option<&Value>, what: &str) -> AppResult<f64> {
    v.and_then(Value::as_f64)
        .ok_or_else(|| AppError::Geometry(format!("coordonnée '{}' manquante", what)))
}

/// `[x, y, (z, m)]` : seules les deux premières composantes sont lues.
fn parse_coord(v: &Value) -> AppResult<Coord> {
    let items = as_array(v, "coordonnée")?;
    if items.len() < 2 {
        return Err(AppError::Geometry(format!(
            "coordonnée à {} composante(s)",
            items.len()
        )));
    }
    Ok(Coord {
        x: number(items.first(), "x")?,
        y: number(items.get(1), "y")?,
    })
}

fn parse_path(v: &Value) -> AppResult<Path> {
    as_array(v, "chemin")?.iter().map(parse_coord).collect()
}

fn parse_paths(v: &Value) -> AppResult<Vec<Path>> {
    as_array(v, "chemins")?.iter().map(parse_path).collect()
}

fn close_ring(mut ring: Path) -> Path {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

// --- VALIDITÉ ---

fn check_finite(coords: &[Coord]) -> AppResult<()> {
    if coords.iter().all(|c| c.x.is_finite() && c.y.is_finite()) {
        Ok(())
    } else {
        Err(AppError::Geometry("coordonnée non finie".into()))
    }
}

fn distinct_count(coords: &[Coord]) -> usize {
    let mut count = 0;
    let mut prev: Option<Coord> = None;
    for c in coords {
        if prev != Some(*c) {
            count += 1;
        }
        prev = Some(*c);
    }
    count
}

fn validate_line(path: &Path) -> AppResult<()> {
    check_finite(path)?;
    if distinct_count(path) < 2 {
        return Err(AppError::Geometry(
            "ligne avec moins de deux points distincts".into(),
        ));
    }
    Ok(())
}

fn validate_polygon(rings: &[Path]) -> AppResult<()> {
    if rings.is_empty() {
        return Err(AppError::Geometry("polygone sans anneau".into()));
    }
    for (idx, ring) in rings.iter().enumerate() {
        check_finite(ring)?;
        if ring.len() < 4 || distinct_count(&ring[..ring.len() - 1]) < 3 {
            return Err(AppError::Geometry(format!(
                "anneau #{} avec moins de quatre points",
                idx
            )));
        }
        if signed_area(ring) == 0.0 {
            return Err(AppError::Geometry(format!("anneau #{} d'aire nulle", idx)));
        }
        if ring_self_intersects(ring) {
            return Err(AppError::Geometry(format!(
                "anneau #{} auto-intersectant",
                idx
            )));
        }
    }
    Ok(())
}

fn signed_area(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

/// Nombre de segments au-delà duquel l'auto-intersection n'est pas recherchée.
/// Le test par paires coûte au plus ~2 M comparaisons par anneau.
pub const MAX_CROSSING_CHECK_SEGMENTS: usize = 2048;

/// O(n²) sur les segments non adjacents d'un anneau fermé, borné par
/// `MAX_CROSSING_CHECK_SEGMENTS` : un anneau plus long est réputé simple.
fn ring_self_intersects(ring: &[Coord]) -> bool {
    if ring.len() > MAX_CROSSING_CHECK_SEGMENTS + 1 {
        return false;
    }
    let segments: Vec<(Coord, Coord)> = ring
        .windows(2)
        .map(|w| (w[0], w[1]))
        .filter(|(a, b)| a != b)
        .collect();
    let n = segments.len();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            let (a, b) = segments[i];
            let (c, d) = segments[j];
            if adjacent {
                // Deux segments consécutifs ne se touchent qu'en leur sommet commun,
                // sauf s'ils se replient l'un sur l'autre.
                if collinear_overlap(a, b, c, d) {
                    return true;
                }
                continue;
            }
            if segments_intersect(a, b, c, d) {
                return true;
            }
        }
    }
    false
}

fn orientation(p: Coord, q: Coord, r: Coord) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

fn on_segment(p: Coord, q: Coord, r: Coord) -> bool {
    r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
}

fn segments_intersect(a: Coord, b: Coord, c: Coord, d: Coord) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    if ((o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0))
        && ((o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0))
    {
        return true;
    }
    (o1 == 0.0 && on_segment(a, b, c))
        || (o2 == 0.0 && on_segment(a, b, d))
        || (o3 == 0.0 && on_segment(c, d, a))
        || (o4 == 0.0 && on_segment(c, d, b))
}

/// Segments consécutifs `a→b` puis `c→d` (b == c) colinéaires et repliés.
fn collinear_overlap(a: Coord, b: Coord, c: Coord, d: Coord) -> bool {
    let (shared, p, q) = if b == c {
        (b, a, d)
    } else if d == a {
        (a, b, c)
    } else {
        return false;
    };
    if orientation(p, shared, q) != 0.0 {
        return false;
    }
    // Retour en arrière : p et q du même côté du sommet partagé
    let dot = (p.x - shared.x) * (q.x - shared.x) + (p.y - shared.y) * (q.y - shared.y);
    dot > 0.0
}
