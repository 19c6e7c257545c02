use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cache_keys::make_page_key;
use crate::crs::Crs;
use crate::geometry::FeatureGeometry;

/// One feature as served by the WFS GeoJSON output: a stable id, an optional
/// geometry, and whatever attribute fields the layer defines.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeatureRecord {
    pub id: String,
    pub geometry: Option<FeatureGeometry>,
    #[serde(default)]
    pub properties: serde_json::Value,
}

// Shape of the WFS GetFeature GeoJSON response we care about.
#[derive(Deserialize)]
struct WfsResponse {
    features: Vec<FeatureRecord>,
    #[serde(rename = "totalFeatures")]
    total_features: Option<u32>,
}

/// Configuration for one grid's backing store.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeatureStoreConfig {
    pub wfs_url: String,
    pub feature_type: String,
    /// CRS the WFS serves coordinates in (the grid's configured projection).
    pub projection: Crs,
}

/// Paged WFS-backed record store for a single grid. Holds the currently
/// displayed page plus a cache of previously fetched pages.
pub struct FeatureStore {
    pub config: FeatureStoreConfig,
    current_page: Vec<FeatureRecord>,
    page_cache: HashMap<String, Vec<FeatureRecord>>,
    pub total_features: Option<u32>,
}

impl FeatureStore {
    pub fn new(config: FeatureStoreConfig) -> Self {
        FeatureStore {
            config,
            current_page: Vec::new(),
            page_cache: HashMap::new(),
            total_features: None,
        }
    }

    /// Build the GetFeature query for a page. The host fetches this URL; the
    /// WFS request/response framing beyond the query string is its concern.
    pub fn build_request_url(&self, start: u32, limit: u32, sort: &str) -> String {
        let mut url = format!(
            "{}?service=WFS&version=1.1.0&request=GetFeature&typeName={}&outputFormat=application/json&startIndex={}&maxFeatures={}",
            self.config.wfs_url, self.config.feature_type, start, limit
        );
        let sort = sort.trim();
        if !sort.is_empty() {
            url.push_str("&sortBy=");
            url.push_str(sort);
        }
        url
    }

    /// Parse a GetFeature GeoJSON response body into records.
    pub fn parse_response(body: &str) -> Result<(Vec<FeatureRecord>, Option<u32>), String> {
        let response: WfsResponse = serde_json::from_str(body)
            .map_err(|e| format!("Invalid WFS response: {}", e))?;
        Ok((response.features, response.total_features))
    }

    /// Install a fetched page as the current one and remember it in the
    /// page cache.
    pub fn apply_page(
        &mut self,
        records: Vec<FeatureRecord>,
        start: u32,
        limit: u32,
        sort: &str,
        total: Option<u32>,
    ) {
        let key = make_page_key(start, limit, sort);
        self.page_cache.insert(key, records.clone());
        self.current_page = records;
        if total.is_some() {
            self.total_features = total;
        }
    }

    /// Serve a page from the cache if present. Returns true on a hit, with
    /// the cached page installed as current.
    pub fn restore_cached_page(&mut self, start: u32, limit: u32, sort: &str) -> bool {
        let key = make_page_key(start, limit, sort);
        match self.page_cache.get(&key) {
            Some(records) => {
                self.current_page = records.clone();
                true
            }
            None => false,
        }
    }

    /// Resolve a grid row index within the current page.
    pub fn record_at(&self, row_index: usize) -> Result<&FeatureRecord, String> {
        self.current_page.get(row_index).ok_or_else(|| {
            format!(
                "Row index {} out of range ({} records loaded)",
                row_index,
                self.current_page.len()
            )
        })
    }

    pub fn loaded_count(&self) -> usize {
        self.current_page.len()
    }

    /// Store reload: drop the current page and every cached page.
    pub fn clear(&mut self) {
        self.current_page.clear();
        self.page_cache.clear();
        self.total_features = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> FeatureStore {
        FeatureStore::new(FeatureStoreConfig {
            wfs_url: "http://example.org/geoserver/wfs".to_string(),
            feature_type: "mariss:granules".to_string(),
            projection: Crs::epsg_4326(),
        })
    }

    fn page(ids: &[&str]) -> Vec<FeatureRecord> {
        ids.iter()
            .map(|id| FeatureRecord {
                id: id.to_string(),
                geometry: None,
                properties: json!({}),
            })
            .collect()
    }

    #[test]
    fn request_url_encodes_paging_and_sort() {
        let url = store().build_request_url(20, 10, "location");
        assert!(url.starts_with("http://example.org/geoserver/wfs?service=WFS"));
        assert!(url.contains("typeName=mariss:granules"));
        assert!(url.contains("startIndex=20"));
        assert!(url.contains("maxFeatures=10"));
        assert!(url.contains("sortBy=location"));
    }

    #[test]
    fn empty_sort_is_omitted_from_url() {
        let url = store().build_request_url(0, 10, "");
        assert!(!url.contains("sortBy"));
    }

    #[test]
    fn parses_wfs_geojson_response() {
        let body = json!({
            "type": "FeatureCollection",
            "totalFeatures": 42,
            "features": [
                {
                    "id": "granules.1",
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]]},
                    "properties": {"location": "file_1.tif"}
                },
                {"id": "granules.2", "geometry": null, "properties": {}}
            ]
        })
        .to_string();

        let (records, total) = FeatureStore::parse_response(&body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(total, Some(42));
        assert_eq!(records[0].id, "granules.1");
        assert!(records[0].geometry.is_some());
        assert!(records[1].geometry.is_none());
    }

    #[test]
    fn cached_pages_are_restorable() {
        let mut s = store();
        s.apply_page(page(&["a", "b"]), 0, 10, "", Some(2));
        s.apply_page(page(&["c"]), 10, 10, "", Some(2));

        assert_eq!(s.record_at(0).unwrap().id, "c");
        assert!(s.restore_cached_page(0, 10, ""));
        assert_eq!(s.record_at(0).unwrap().id, "a");
        assert!(!s.restore_cached_page(20, 10, ""));
    }

    #[test]
    fn record_at_out_of_range_is_an_error() {
        let mut s = store();
        s.apply_page(page(&["a"]), 0, 10, "", None);
        assert!(s.record_at(0).is_ok());
        assert!(s.record_at(1).is_err());
    }

    #[test]
    fn clear_drops_pages_and_cache() {
        let mut s = store();
        s.apply_page(page(&["a"]), 0, 10, "", Some(1));
        s.clear();
        assert_eq!(s.loaded_count(), 0);
        assert!(!s.restore_cached_page(0, 10, ""));
        assert!(s.total_features.is_none());
    }
}
