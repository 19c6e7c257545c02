// This is the models module containing shared data structures
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct GridStats {
    pub feature_store_count: usize,
    pub loaded_record_count: usize,
    pub page_cache_hits: usize,
    pub page_cache_misses: usize,
    pub page_cache_hit_rate: f64,
    pub overlay_feature_count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct LoadResult {
    pub record_count: usize,
    pub total_features: Option<u32>,
    pub from_cache: bool,
}
