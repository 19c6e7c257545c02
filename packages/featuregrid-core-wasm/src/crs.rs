use geo_types::Coord;
use serde::{Deserialize, Serialize};

// Spherical mercator constants (EPSG:3857)
const EARTH_RADIUS: f64 = 6378137.0;
const MAX_LATITUDE: f64 = 85.051129;

/// A coordinate reference system identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
}

impl Crs {
    /// Parse an authority string like "EPSG:4326". The authority prefix is
    /// optional and case-insensitive; a bare numeric code is accepted too.
    pub fn parse(code: &str) -> Result<Crs, String> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err("Empty CRS code".to_string());
        }

        let numeric = match trimmed.split_once(':') {
            Some((authority, rest)) => {
                if !authority.eq_ignore_ascii_case("epsg") {
                    return Err(format!("Unsupported CRS authority: {}", authority));
                }
                rest
            }
            None => trimmed,
        };

        numeric
            .parse::<u32>()
            .map(|epsg| Crs { epsg })
            .map_err(|_| format!("Invalid CRS code: {}", code))
    }

    pub fn epsg_4326() -> Crs {
        Crs { epsg: 4326 }
    }

    pub fn epsg_3857() -> Crs {
        Crs { epsg: 3857 }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// External transform provider contract. The projector only ever calls
/// `transform_point` after `equivalent` returned false for the pair.
pub trait CrsTransform {
    fn equivalent(&self, a: &Crs, b: &Crs) -> bool;

    fn transform_point(&self, point: Coord<f64>, source: &Crs, target: &Crs)
        -> Result<Coord<f64>, String>;
}

/// Default provider: spherical web mercator, EPSG:4326 <-> EPSG:3857 in both
/// directions. Any other differing pair is an error, which callers propagate.
pub struct WebMercator;

impl WebMercator {
    fn forward(point: Coord<f64>) -> Coord<f64> {
        let lat = point.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = point.x.to_radians() * EARTH_RADIUS;
        let y = ((std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan()).ln() * EARTH_RADIUS;
        Coord { x, y }
    }

    fn inverse(point: Coord<f64>) -> Coord<f64> {
        let lng = (point.x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (point.y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        Coord { x: lng, y: lat }
    }
}

impl CrsTransform for WebMercator {
    fn equivalent(&self, a: &Crs, b: &Crs) -> bool {
        a.epsg == b.epsg
    }

    fn transform_point(
        &self,
        point: Coord<f64>,
        source: &Crs,
        target: &Crs,
    ) -> Result<Coord<f64>, String> {
        match (source.epsg, target.epsg) {
            (4326, 3857) => Ok(Self::forward(point)),
            (3857, 4326) => Ok(Self::inverse(point)),
            _ => Err(format!(
                "Unsupported CRS pair: {} -> {}",
                source, target
            )),
        }
    }
}
