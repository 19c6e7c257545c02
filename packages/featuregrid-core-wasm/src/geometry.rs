use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::crs::{Crs, CrsTransform};

// GeoJSON-shaped geometry as it arrives from the WFS response. Coordinates
// stay untyped until we know the geometry type.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeatureGeometry {
    pub r#type: String,
    pub coordinates: serde_json::Value,
}

/// Project a raw feature geometry from `source` into `target`.
///
/// Only Polygon and MultiPolygon are renderable by the selection overlay;
/// every other type yields `Ok(None)` rather than an error. Ring order and
/// point order are preserved exactly. When the provider reports the two
/// systems as equivalent, coordinates pass through numerically unchanged and
/// the transform is never invoked. A transform failure aborts the whole call:
/// no partially projected geometry is ever returned.
pub fn project_geometry(
    geom: &FeatureGeometry,
    source: &Crs,
    target: &Crs,
    provider: &dyn CrsTransform,
) -> Result<Option<Geometry<f64>>, String> {
    let passthrough = provider.equivalent(source, target);

    match geom.r#type.as_str() {
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(geom.coordinates.clone())
                .map_err(|e| format!("Invalid Polygon coordinates: {}", e))?;
            let polygon = project_rings(&rings, source, target, provider, passthrough)?;
            Ok(Some(Geometry::Polygon(polygon)))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Vec<f64>>>> =
                serde_json::from_value(geom.coordinates.clone())
                    .map_err(|e| format!("Invalid MultiPolygon coordinates: {}", e))?;

            let mut projected = Vec::with_capacity(polygons.len());
            for rings in &polygons {
                projected.push(project_rings(rings, source, target, provider, passthrough)?);
            }
            Ok(Some(Geometry::MultiPolygon(MultiPolygon::new(projected))))
        }
        // Unsupported geometry type: a defined empty result, not an error
        _ => Ok(None),
    }
}

// Build a polygon from GeoJSON rings: first ring is the exterior, the rest
// are holes. Closure of each ring is the caller's responsibility.
fn project_rings(
    rings: &[Vec<Vec<f64>>],
    source: &Crs,
    target: &Crs,
    provider: &dyn CrsTransform,
    passthrough: bool,
) -> Result<Polygon<f64>, String> {
    let mut projected: Vec<LineString<f64>> = Vec::with_capacity(rings.len());
    for ring in rings {
        projected.push(project_ring(ring, source, target, provider, passthrough)?);
    }

    let mut iter = projected.into_iter();
    let exterior = iter.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, iter.collect()))
}

fn project_ring(
    ring: &[Vec<f64>],
    source: &Crs,
    target: &Crs,
    provider: &dyn CrsTransform,
    passthrough: bool,
) -> Result<LineString<f64>, String> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.len());
    for pair in ring {
        if pair.len() < 2 {
            return Err(format!(
                "Coordinate pair must have at least two components, got {}",
                pair.len()
            ));
        }
        let mut point = Coord {
            x: pair[0],
            y: pair[1],
        };
        if !passthrough {
            point = provider.transform_point(point, source, target)?;
        }
        coords.push(point);
    }
    Ok(LineString::new(coords))
}
