use std::cell::RefCell;
use std::collections::HashMap;

use lazy_static::lazy_static;
use parking_lot::ReentrantMutex;

use crate::crs::Crs;
use crate::download_list::DownloadList;
use crate::feature_store::{FeatureStore, FeatureStoreConfig};
use crate::overlay::MapView;

// Module state holding every store and view the JS host has registered
pub struct ModuleState {
    // One WFS-backed store per grid id
    pub feature_stores: HashMap<String, FeatureStore>,

    // One view per registered map, each owning its overlay layers
    pub map_views: HashMap<String, MapView>,

    // Download-list array stores by list id
    pub download_lists: HashMap<String, DownloadList>,

    // Page cache stats
    pub cache_hits: usize,
    pub cache_misses: usize,
}

lazy_static! {
    static ref MODULE_STATE: ReentrantMutex<RefCell<ModuleState>> =
        ReentrantMutex::new(RefCell::new(ModuleState::new()));
}

impl ModuleState {
    pub fn new() -> Self {
        ModuleState {
            feature_stores: HashMap::new(),
            map_views: HashMap::new(),
            download_lists: HashMap::new(),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    pub fn with_mut<F, R>(f: F) -> R
    where
        F: FnOnce(&mut ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        let mut borrow = guard.borrow_mut();
        f(&mut borrow)
    }

    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        let borrow = guard.borrow();
        f(&borrow)
    }

    /// Register (or replace) the store behind a grid.
    pub fn register_feature_store(&mut self, grid_id: &str, config: FeatureStoreConfig) {
        self.feature_stores
            .insert(grid_id.to_string(), FeatureStore::new(config));
    }

    pub fn feature_store(&self, grid_id: &str) -> Result<&FeatureStore, String> {
        self.feature_stores
            .get(grid_id)
            .ok_or_else(|| format!("No feature store registered for grid '{}'", grid_id))
    }

    pub fn feature_store_mut(&mut self, grid_id: &str) -> Result<&mut FeatureStore, String> {
        self.feature_stores
            .get_mut(grid_id)
            .ok_or_else(|| format!("No feature store registered for grid '{}'", grid_id))
    }

    /// Register (or replace) a map view with its display CRS.
    pub fn register_map_view(&mut self, map_id: &str, crs: Crs) {
        self.map_views.insert(map_id.to_string(), MapView::new(crs));
    }

    pub fn map_view(&self, map_id: &str) -> Result<&MapView, String> {
        self.map_views
            .get(map_id)
            .ok_or_else(|| format!("No map view registered for '{}'", map_id))
    }

    pub fn map_view_mut(&mut self, map_id: &str) -> Result<&mut MapView, String> {
        self.map_views
            .get_mut(map_id)
            .ok_or_else(|| format!("No map view registered for '{}'", map_id))
    }

    /// Download lists are created lazily on first use.
    pub fn download_list_mut(&mut self, list_id: &str) -> &mut DownloadList {
        self.download_lists
            .entry(list_id.to_string())
            .or_insert_with(DownloadList::new)
    }

    pub fn download_list(&self, list_id: &str) -> Option<&DownloadList> {
        self.download_lists.get(list_id)
    }

    // Get module statistics: stores, loaded records, cache behavior, overlays
    pub fn get_stats(&self) -> (usize, usize, usize, usize, usize) {
        let loaded_records: usize = self
            .feature_stores
            .values()
            .map(|s| s.loaded_count())
            .sum();
        let overlay_features: usize = self
            .map_views
            .values()
            .flat_map(|v| v.overlays.values())
            .map(|o| o.features.len())
            .sum();
        (
            self.feature_stores.len(),
            loaded_records,
            self.cache_hits,
            self.cache_misses,
            overlay_features,
        )
    }

    // Clear everything the host ever registered
    pub fn clear_all(&mut self) {
        self.feature_stores.clear();
        self.map_views.clear();
        self.download_lists.clear();
        self.cache_hits = 0;
        self.cache_misses = 0;
    }
}
