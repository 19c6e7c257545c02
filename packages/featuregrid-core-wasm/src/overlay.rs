use std::collections::HashMap;

use geo::BoundingRect;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crs::{Crs, CrsTransform};
use crate::feature_store::FeatureRecord;
use crate::geometry::project_geometry;

/// Name of the vector layer that holds selection highlights.
pub const SELECTION_LAYER: &str = "selectedFeature";

// Highlight rendering style handed to the JS map when the layer is created.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HighlightStyle {
    pub stroke_color: String,
    pub stroke_width: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        HighlightStyle {
            stroke_color: "#FF00FF".to_string(),
            stroke_width: 2.0,
            fill_color: "#FF00FF".to_string(),
            fill_opacity: 0.8,
        }
    }
}

/// One highlighted feature on the overlay. `feature_id` ties it back to the
/// grid record; `instance_id` distinguishes repeated selects of the same id.
#[derive(Serialize, Clone, Debug)]
pub struct HighlightedFeature {
    pub instance_id: String,
    pub feature_id: String,
    pub geometry: Geometry<f64>,
}

/// A named overlay layer. Created lazily on first selection and never torn
/// down within the map view's lifetime.
#[derive(Serialize, Clone, Debug)]
pub struct SelectionOverlay {
    pub name: String,
    pub display_in_layer_switcher: bool,
    pub style: HighlightStyle,
    pub features: Vec<HighlightedFeature>,
}

impl SelectionOverlay {
    pub fn new(name: &str) -> Self {
        SelectionOverlay {
            name: name.to_string(),
            display_in_layer_switcher: false,
            style: HighlightStyle::default(),
            features: Vec::new(),
        }
    }

    pub fn add_highlight(&mut self, feature_id: &str, geometry: Geometry<f64>) -> String {
        let instance_id = Uuid::new_v4().to_string();
        self.features.push(HighlightedFeature {
            instance_id: instance_id.clone(),
            feature_id: feature_id.to_string(),
            geometry,
        });
        instance_id
    }

    /// Remove every highlight carrying the given feature id. Repeated selects
    /// are not guarded against, so one deselect may remove several entries.
    pub fn remove_highlights(&mut self, feature_id: &str) -> usize {
        let before = self.features.len();
        self.features.retain(|f| f.feature_id != feature_id);
        before - self.features.len()
    }

    pub fn count_for(&self, feature_id: &str) -> usize {
        self.features
            .iter()
            .filter(|f| f.feature_id == feature_id)
            .count()
    }
}

/// State held per registered map: its CRS and its overlay layers by name.
pub struct MapView {
    pub crs: Crs,
    pub overlays: HashMap<String, SelectionOverlay>,
}

impl MapView {
    pub fn new(crs: Crs) -> Self {
        MapView {
            crs,
            overlays: HashMap::new(),
        }
    }

    pub fn ensure_overlay(&mut self, name: &str) -> &mut SelectionOverlay {
        self.overlays
            .entry(name.to_string())
            .or_insert_with(|| SelectionOverlay::new(name))
    }

    pub fn overlay(&self, name: &str) -> Option<&SelectionOverlay> {
        self.overlays.get(name)
    }
}

/// Row-select handler: project the record's geometry into the map CRS and add
/// a highlight tagged with the record id. Returns false when the record has
/// no renderable geometry (silent no-op).
pub fn select_feature(
    view: &mut MapView,
    record: &FeatureRecord,
    source: &Crs,
    provider: &dyn CrsTransform,
) -> Result<bool, String> {
    let geom = match record.geometry {
        Some(ref g) => g,
        None => return Ok(false),
    };

    match project_geometry(geom, source, &view.crs, provider)? {
        Some(projected) => {
            let overlay = view.ensure_overlay(SELECTION_LAYER);
            overlay.add_highlight(&record.id, projected);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Row-deselect handler: drop all highlights for the record id. Returns the
/// number removed (zero when the layer was never created).
pub fn deselect_feature(view: &mut MapView, feature_id: &str) -> usize {
    match view.overlays.get_mut(SELECTION_LAYER) {
        Some(overlay) => overlay.remove_highlights(feature_id),
        None => 0,
    }
}

/// Zoom-to handler: project and return the bounding box the JS map should fit
/// to, as [min_x, min_y, max_x, max_y]. A record without renderable geometry
/// yields Ok(None).
pub fn zoom_to(
    view: &MapView,
    record: &FeatureRecord,
    source: &Crs,
    provider: &dyn CrsTransform,
) -> Result<Option<[f64; 4]>, String> {
    let geom = match record.geometry {
        Some(ref g) => g,
        None => return Ok(None),
    };

    let projected = match project_geometry(geom, source, &view.crs, provider)? {
        Some(g) => g,
        None => return Ok(None),
    };

    Ok(projected
        .bounding_rect()
        .map(|rect| [rect.min().x, rect.min().y, rect.max().x, rect.max().y]))
}
