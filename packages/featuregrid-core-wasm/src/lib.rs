use wasm_bindgen::prelude::*;

use serde_wasm_bindgen::to_value;
use wasm_bindgen_futures::JsFuture;

// Create a console module for logging
pub mod console;
// CRS codes and the transform provider
mod crs;
// The geometry projector
mod geometry;
// Selection overlay layers and map views
mod overlay;
// WFS-backed feature record store
mod feature_store;
// Page cache key helpers
mod cache_keys;
// Download-list array store
mod download_list;
// Process-wide plugin registry
mod plugin_registry;
// Module state management
mod module_state;
// Row event handlers
mod grid_events;
// Shared data structures
mod models;
// Scenario tests for the selection flow
#[cfg(test)]
mod selection_test;

use crs::Crs;
use feature_store::{FeatureStore, FeatureStoreConfig};
use grid_events::{add_row_to_download_list, on_row_deselect, on_row_select, zoom_to_row};
use models::{GridStats, LoadResult};
use module_state::ModuleState;
use overlay::SELECTION_LAYER;
use plugin_registry::{with_registry, PluginKind};

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

#[wasm_bindgen]
extern "C" {
    // JavaScript helper to fetch a URL, resolving to the response body text
    #[wasm_bindgen(js_namespace = wasmJsHelpers, catch)]
    pub fn fetch(url: &str) -> Result<js_sys::Promise, JsValue>;
}

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("Feature grid core initialized successfully");
    });
}

/// Register a map view with its display CRS (e.g. "EPSG:3857"). Overlay
/// layers attach to this view lazily on first selection.
#[wasm_bindgen]
pub fn register_map_view(map_id: &str, crs_code: &str) -> Result<(), JsValue> {
    let crs = Crs::parse(crs_code).map_err(|e| JsValue::from_str(&e))?;
    ModuleState::with_mut(|state| state.register_map_view(map_id, crs));
    console_log!("Registered map view '{}' with {}", map_id, crs);
    Ok(())
}

/// Register a feature grid's backing WFS store. `projection` is the CRS the
/// WFS serves coordinates in.
#[wasm_bindgen]
pub fn register_feature_grid(
    grid_id: &str,
    wfs_url: &str,
    feature_type: &str,
    projection: &str,
) -> Result<(), JsValue> {
    let projection = Crs::parse(projection).map_err(|e| JsValue::from_str(&e))?;
    let config = FeatureStoreConfig {
        wfs_url: wfs_url.to_string(),
        feature_type: feature_type.to_string(),
        projection,
    };
    ModuleState::with_mut(|state| state.register_feature_store(grid_id, config));
    Ok(())
}

/// Load one page of features for a grid. Serves the page cache when it can,
/// otherwise fetches from the WFS through the JS fetch helper.
#[wasm_bindgen]
pub async fn load_features(
    grid_id: String,
    start: u32,
    limit: u32,
    sort: String,
) -> Result<JsValue, JsValue> {
    // Cache first
    let cached = ModuleState::with_mut(|state| -> Result<Option<LoadResult>, String> {
        let store = state.feature_store_mut(&grid_id)?;
        if store.restore_cached_page(start, limit, &sort) {
            let result = LoadResult {
                record_count: store.loaded_count(),
                total_features: store.total_features,
                from_cache: true,
            };
            state.cache_hits += 1;
            Ok(Some(result))
        } else {
            state.cache_misses += 1;
            Ok(None)
        }
    })
    .map_err(|e| JsValue::from_str(&e))?;

    if let Some(result) = cached {
        return Ok(to_value(&result)?);
    }

    let url = ModuleState::with(|state| {
        state
            .feature_store(&grid_id)
            .map(|store| store.build_request_url(start, limit, &sort))
    })
    .map_err(|e| JsValue::from_str(&e))?;

    console_log!("Loading features from {}", url);
    let fetch_promise = fetch(&url)?;
    let fetch_result = JsFuture::from(fetch_promise).await?;
    let body = fetch_result
        .as_string()
        .ok_or_else(|| JsValue::from_str("Fetch helper did not return a response body string"))?;

    let (records, total) =
        FeatureStore::parse_response(&body).map_err(|e| JsValue::from_str(&e))?;

    let result = ModuleState::with_mut(|state| -> Result<LoadResult, String> {
        let store = state.feature_store_mut(&grid_id)?;
        store.apply_page(records, start, limit, &sort, total);
        Ok(LoadResult {
            record_count: store.loaded_count(),
            total_features: store.total_features,
            from_cache: false,
        })
    })
    .map_err(|e| JsValue::from_str(&e))?;

    Ok(to_value(&result)?)
}

/// Install a page of records directly, bypassing the fetch helper. Used when
/// the host already holds the WFS response body.
#[wasm_bindgen]
pub fn store_feature_page(
    grid_id: &str,
    response_body: &str,
    start: u32,
    limit: u32,
    sort: &str,
) -> Result<usize, JsValue> {
    let (records, total) =
        FeatureStore::parse_response(response_body).map_err(|e| JsValue::from_str(&e))?;
    ModuleState::with_mut(|state| -> Result<usize, String> {
        let store = state.feature_store_mut(grid_id)?;
        store.apply_page(records, start, limit, sort, total);
        Ok(store.loaded_count())
    })
    .map_err(|e| JsValue::from_str(&e))
}

/// Clear a grid's store (reload semantics: current page and page cache).
#[wasm_bindgen]
pub fn clear_feature_store(grid_id: &str) -> Result<(), JsValue> {
    ModuleState::with_mut(|state| -> Result<(), String> {
        state.feature_store_mut(grid_id)?.clear();
        Ok(())
    })
    .map_err(|e| JsValue::from_str(&e))
}

// ========== Row events ==========

/// Row-select handler. Returns true when a highlight was added.
#[wasm_bindgen]
pub fn row_select(grid_id: &str, map_id: &str, row_index: usize) -> Result<bool, JsValue> {
    ModuleState::with_mut(|state| on_row_select(state, grid_id, map_id, row_index))
        .map_err(|e| JsValue::from_str(&e))
}

/// Row-deselect handler. Returns the number of highlights removed.
#[wasm_bindgen]
pub fn row_deselect(grid_id: &str, map_id: &str, row_index: usize) -> Result<usize, JsValue> {
    ModuleState::with_mut(|state| on_row_deselect(state, grid_id, map_id, row_index))
        .map_err(|e| JsValue::from_str(&e))
}

/// Zoom-to action: returns [minX, minY, maxX, maxY] in the map CRS for the
/// host to fit the view to, or null for a record without renderable geometry.
#[wasm_bindgen]
pub fn zoom_to_feature(grid_id: &str, map_id: &str, row_index: usize) -> Result<JsValue, JsValue> {
    let bbox = ModuleState::with(|state| zoom_to_row(state, grid_id, map_id, row_index))
        .map_err(|e| JsValue::from_str(&e))?;
    match bbox {
        Some(bbox) => Ok(to_value(&bbox)?),
        None => Ok(JsValue::NULL),
    }
}

/// Add-to-download-list action column. Returns the queued filename.
#[wasm_bindgen]
pub fn add_to_download_list(
    grid_id: &str,
    list_id: &str,
    row_index: usize,
) -> Result<String, JsValue> {
    ModuleState::with_mut(|state| add_row_to_download_list(state, grid_id, list_id, row_index))
        .map_err(|e| JsValue::from_str(&e))
}

// ========== Selection overlay queries ==========

/// The selection overlay of a map, with its style and highlighted features,
/// or null if no selection was ever made on that map.
#[wasm_bindgen]
pub fn get_selection_overlay(map_id: &str) -> Result<JsValue, JsValue> {
    ModuleState::with(|state| -> Result<JsValue, JsValue> {
        let view = state.map_view(map_id).map_err(|e| JsValue::from_str(&e))?;
        match view.overlay(SELECTION_LAYER) {
            Some(overlay) => Ok(to_value(overlay)?),
            None => Ok(JsValue::NULL),
        }
    })
}

/// Number of highlights currently shown for a feature id.
#[wasm_bindgen]
pub fn highlight_count(map_id: &str, feature_id: &str) -> Result<usize, JsValue> {
    ModuleState::with(|state| -> Result<usize, String> {
        let view = state.map_view(map_id)?;
        Ok(view
            .overlay(SELECTION_LAYER)
            .map(|o| o.count_for(feature_id))
            .unwrap_or(0))
    })
    .map_err(|e| JsValue::from_str(&e))
}

// ========== Download list ==========

#[wasm_bindgen]
pub fn download_list_add(list_id: &str, filename: &str) {
    ModuleState::with_mut(|state| state.download_list_mut(list_id).add(filename));
}

#[wasm_bindgen]
pub fn download_list_remove_at(list_id: &str, index: usize) -> Result<String, JsValue> {
    ModuleState::with_mut(|state| -> Result<String, String> {
        let entry = state.download_list_mut(list_id).remove_at(index)?;
        Ok(entry.filename)
    })
    .map_err(|e| JsValue::from_str(&e))
}

/// Entries currently queued, in insertion order.
#[wasm_bindgen]
pub fn download_list_entries(list_id: &str) -> Result<JsValue, JsValue> {
    ModuleState::with(|state| {
        let entries = state
            .download_list(list_id)
            .map(|l| l.entries().to_vec())
            .unwrap_or_default();
        Ok(to_value(&entries)?)
    })
}

/// "Start Download": drain the queue and hand the filenames to the host.
#[wasm_bindgen]
pub fn download_list_start(list_id: &str) -> Result<JsValue, JsValue> {
    ModuleState::with_mut(|state| {
        let drained = state.download_list_mut(list_id).drain();
        Ok(to_value(&drained)?)
    })
}

#[wasm_bindgen]
pub fn download_list_clear(list_id: &str) {
    ModuleState::with_mut(|state| state.download_list_mut(list_id).clear());
}

// ========== Plugin registry ==========

/// Register a plugin descriptor. Kind is "wfs_grid" or "download_list";
/// re-registering a ptype replaces its descriptor.
#[wasm_bindgen]
pub fn register_plugin(ptype: &str, kind: &str) -> Result<JsValue, JsValue> {
    let kind = PluginKind::parse(kind).map_err(|e| JsValue::from_str(&e))?;
    let descriptor = with_registry(|registry| registry.register(ptype, kind));
    Ok(to_value(&descriptor)?)
}

#[wasm_bindgen]
pub fn unregister_plugin(ptype: &str) -> bool {
    with_registry(|registry| registry.unregister(ptype))
}

#[wasm_bindgen]
pub fn registered_plugins() -> Result<JsValue, JsValue> {
    let plugins = with_registry(|registry| registry.registered());
    Ok(to_value(&plugins)?)
}

/// Shutdown hook: clears every registered plugin descriptor.
#[wasm_bindgen]
pub fn shutdown_plugins() {
    with_registry(|registry| registry.clear());
}

// ========== Stats and teardown ==========

// Function to get module statistics
#[wasm_bindgen]
pub fn get_grid_stats() -> Result<JsValue, JsValue> {
    let (store_count, record_count, hits, misses, overlay_count) =
        ModuleState::with(|state| state.get_stats());

    let total_requests = hits + misses;
    let hit_rate = if total_requests > 0 {
        hits as f64 / total_requests as f64
    } else {
        0.0
    };

    let stats = GridStats {
        feature_store_count: store_count,
        loaded_record_count: record_count,
        page_cache_hits: hits,
        page_cache_misses: misses,
        page_cache_hit_rate: hit_rate,
        overlay_feature_count: overlay_count,
    };

    Ok(to_value(&stats)?)
}

// Function to clear all module state
#[wasm_bindgen]
pub fn clear_module_state() -> bool {
    ModuleState::with_mut(|state| state.clear_all());
    true
}
