#[cfg(test)]
mod tests {
    use crate::crs::Crs;
    use crate::feature_store::{FeatureRecord, FeatureStoreConfig};
    use crate::geometry::FeatureGeometry;
    use crate::grid_events::{
        add_row_to_download_list, on_row_deselect, on_row_select, zoom_to_row,
    };
    use crate::module_state::ModuleState;
    use crate::overlay::SELECTION_LAYER;
    use serde_json::json;

    fn state_with_grid_and_map() -> ModuleState {
        let mut state = ModuleState::new();
        state.register_feature_store(
            "featuregrid",
            FeatureStoreConfig {
                wfs_url: "http://example.org/wfs".to_string(),
                feature_type: "mariss:granules".to_string(),
                projection: Crs::epsg_4326(),
            },
        );
        state.register_map_view("map", Crs::epsg_3857());

        let records = vec![
            FeatureRecord {
                id: "granules.1".to_string(),
                geometry: Some(FeatureGeometry {
                    r#type: "Polygon".to_string(),
                    coordinates: json!([
                        [[9.0, 45.0], [9.0, 45.5], [9.5, 45.5], [9.5, 45.0], [9.0, 45.0]]
                    ]),
                }),
                properties: json!({"location": "scene_1.tif"}),
            },
            FeatureRecord {
                id: "granules.2".to_string(),
                geometry: None,
                properties: json!({}),
            },
        ];
        state
            .feature_store_mut("featuregrid")
            .unwrap()
            .apply_page(records, 0, 10, "location", Some(2));
        state
    }

    #[test]
    fn select_deselect_round_trip_through_module_state() {
        let mut state = state_with_grid_and_map();

        assert!(on_row_select(&mut state, "featuregrid", "map", 0).unwrap());
        let view = state.map_view("map").unwrap();
        assert_eq!(view.overlay(SELECTION_LAYER).unwrap().count_for("granules.1"), 1);

        assert_eq!(on_row_deselect(&mut state, "featuregrid", "map", 0).unwrap(), 1);
        let view = state.map_view("map").unwrap();
        assert_eq!(view.overlay(SELECTION_LAYER).unwrap().count_for("granules.1"), 0);
    }

    #[test]
    fn repeated_select_documents_duplicate_highlights() {
        let mut state = state_with_grid_and_map();

        on_row_select(&mut state, "featuregrid", "map", 0).unwrap();
        on_row_select(&mut state, "featuregrid", "map", 0).unwrap();
        assert_eq!(
            state
                .map_view("map")
                .unwrap()
                .overlay(SELECTION_LAYER)
                .unwrap()
                .count_for("granules.1"),
            2
        );

        // A single deselect removes both stacked highlights
        assert_eq!(on_row_deselect(&mut state, "featuregrid", "map", 0).unwrap(), 2);
    }

    #[test]
    fn selecting_a_record_without_geometry_is_a_no_op() {
        let mut state = state_with_grid_and_map();
        assert!(!on_row_select(&mut state, "featuregrid", "map", 1).unwrap());
        assert!(state
            .map_view("map")
            .unwrap()
            .overlay(SELECTION_LAYER)
            .is_none());
    }

    #[test]
    fn zoom_to_projects_into_the_map_crs() {
        let state = state_with_grid_and_map();
        let bbox = zoom_to_row(&state, "featuregrid", "map", 0)
            .unwrap()
            .unwrap();

        // Mercator easting of 9E is just over a million meters; the box must
        // be well-formed and in target units, not degrees
        assert!(bbox[0] > 900_000.0 && bbox[0] < 1_100_000.0);
        assert!(bbox[2] > bbox[0]);
        assert!(bbox[3] > bbox[1]);

        // Record without geometry: silent no-op
        assert!(zoom_to_row(&state, "featuregrid", "map", 1).unwrap().is_none());
    }

    #[test]
    fn unknown_grid_or_row_is_an_error() {
        let mut state = state_with_grid_and_map();
        assert!(on_row_select(&mut state, "othergrid", "map", 0).is_err());
        assert!(on_row_select(&mut state, "featuregrid", "map", 99).is_err());
        assert!(on_row_select(&mut state, "featuregrid", "othermap", 0).is_err());
    }

    #[test]
    fn add_to_download_list_uses_location_then_id() {
        let mut state = state_with_grid_and_map();

        let name = add_row_to_download_list(&mut state, "featuregrid", "downloadgrid", 0).unwrap();
        assert_eq!(name, "scene_1.tif");

        // No location property: fall back to the record id
        let name = add_row_to_download_list(&mut state, "featuregrid", "downloadgrid", 1).unwrap();
        assert_eq!(name, "granules.2");

        let list = state.download_list("downloadgrid").unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn stats_reflect_selection_activity() {
        let mut state = state_with_grid_and_map();
        on_row_select(&mut state, "featuregrid", "map", 0).unwrap();

        let (stores, records, _, _, overlay_features) = state.get_stats();
        assert_eq!(stores, 1);
        assert_eq!(records, 2);
        assert_eq!(overlay_features, 1);
    }
}
