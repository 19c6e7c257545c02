//! Row-level event handlers wired explicitly from the JS grid: select,
//! deselect, zoom-to, and the "add to download list" action column. Each
//! handler resolves the record from the grid's store by row index and
//! delegates to the overlay controller or the download list.

use crate::crs::{CrsTransform, WebMercator};
use crate::module_state::ModuleState;
use crate::overlay::{deselect_feature, select_feature, zoom_to};

static DEFAULT_PROVIDER: WebMercator = WebMercator;

pub fn default_provider() -> &'static dyn CrsTransform {
    &DEFAULT_PROVIDER
}

/// Row-select: highlight the record's geometry on the map's selection
/// overlay. Returns true when a highlight was added, false for records
/// without renderable geometry.
pub fn on_row_select(
    state: &mut ModuleState,
    grid_id: &str,
    map_id: &str,
    row_index: usize,
) -> Result<bool, String> {
    let (record, source) = {
        let store = state.feature_store(grid_id)?;
        (store.record_at(row_index)?.clone(), store.config.projection)
    };
    let view = state.map_view_mut(map_id)?;
    select_feature(view, &record, &source, default_provider())
}

/// Row-deselect: remove every highlight for the record's id.
pub fn on_row_deselect(
    state: &mut ModuleState,
    grid_id: &str,
    map_id: &str,
    row_index: usize,
) -> Result<usize, String> {
    let feature_id = state.feature_store(grid_id)?.record_at(row_index)?.id.clone();
    let view = state.map_view_mut(map_id)?;
    Ok(deselect_feature(view, &feature_id))
}

/// Zoom-to action: the bounding box the map should fit to, or None for a
/// record without renderable geometry.
pub fn zoom_to_row(
    state: &ModuleState,
    grid_id: &str,
    map_id: &str,
    row_index: usize,
) -> Result<Option<[f64; 4]>, String> {
    let store = state.feature_store(grid_id)?;
    let record = store.record_at(row_index)?;
    let view = state.map_view(map_id)?;
    zoom_to(view, record, &store.config.projection, default_provider())
}

/// Add-to-download-list action: queue the record's file. The filename comes
/// from the record's `location` property, falling back to the record id.
pub fn add_row_to_download_list(
    state: &mut ModuleState,
    grid_id: &str,
    list_id: &str,
    row_index: usize,
) -> Result<String, String> {
    let filename = {
        let record = state.feature_store(grid_id)?.record_at(row_index)?;
        record
            .properties
            .get("location")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| record.id.clone())
    };
    state.download_list_mut(list_id).add(&filename);
    Ok(filename)
}
