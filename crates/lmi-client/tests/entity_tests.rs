//! Entity fetches and image operations against canned responses.

use lmi_client::{
    Classifier, Dataset, Geometry, Image, ImageKind, ImageParams, Layer, LmiError, ToHtml, Widget,
};
use lmi_common::Feature;
use serde_json::json;
use test_utils::{
    assert_approx_eq, carto_dataset_attributes, classifier_body, entity_body, footprint_feature, footprints, servers,
    thumbs_body, tiles_body, MockTransport,
};

fn madrid_params() -> ImageParams {
    let bbox: Feature = serde_json::from_value(footprint_feature(&footprints::MADRID)).unwrap();
    let mut params = ImageParams::new("COPERNICUS/S2/20190101T105441_T30TVK", bbox);
    params.instrument = Some("Sentinel-2".to_string());
    params.date_time = Some("2019-01-01 10:54:41Z".to_string());
    params.cloud_score = Some(1.5);
    params
}

fn gfw(path: &str) -> String {
    format!("{}{}", servers::GFW_PRODUCTION, path)
}

// ============================================================================
// Catalog entities
// ============================================================================

#[tokio::test]
async fn test_dataset_fetch() {
    let mock = MockTransport::new().on_get(
        &format!("{}/v1/dataset/d-1", servers::RESOURCE_WATCH),
        200,
        entity_body("dataset", "d-1", carto_dataset_attributes("Tree cover loss")),
    );
    let dataset = Dataset::fetch(&mock, "d-1", servers::RESOURCE_WATCH).await.unwrap();

    assert_eq!(dataset.name(), Some("Tree cover loss"));
    assert_eq!(dataset.attributes.provider.as_deref(), Some("cartodb"));
    assert_eq!(dataset.to_string(), "Dataset d-1");
    assert!(mock.requests()[0].url.contains("/v1/dataset/d-1?hash="));

    let html = dataset.to_html();
    assert!(html.contains("Carto table:"));
    assert!(html.contains("Dataset in RW, GFW."));
}

#[tokio::test]
async fn test_dataset_fetch_not_found() {
    let mock = MockTransport::new();
    let err = Dataset::fetch(&mock, "missing", servers::RESOURCE_WATCH)
        .await
        .unwrap_err();
    assert!(matches!(err, LmiError::NotFound(_)));
}

#[tokio::test]
async fn test_dataset_fetch_without_attributes_is_bad_response() {
    let mock = MockTransport::new().on_get(
        &format!("{}/v1/dataset/d-1", servers::RESOURCE_WATCH),
        200,
        r#"{"data": {"id": "d-1"}}"#,
    );
    let err = Dataset::fetch(&mock, "d-1", servers::RESOURCE_WATCH)
        .await
        .unwrap_err();
    assert!(matches!(err, LmiError::BadResponse { status: 200, .. }));
}

#[tokio::test]
async fn test_layer_fetch() {
    let mock = MockTransport::new().on_get(
        &format!("{}/v1/layer/l-1", servers::RESOURCE_WATCH),
        200,
        entity_body("layer", "l-1", json!({"name": "Loss year", "dataset": "d-1"})),
    );
    let layer = Layer::fetch(&mock, "l-1", servers::RESOURCE_WATCH).await.unwrap();
    assert_eq!(layer.dataset.as_deref(), Some("d-1"));
    assert!(layer.to_html().contains("/v1/layer/l-1?includes=vocabulary,metadata"));
}

#[tokio::test]
async fn test_widget_and_geometry_fetch() {
    let mock = MockTransport::new()
        .on_get(
            &format!("{}/v1/widget/w-1", servers::RESOURCE_WATCH),
            200,
            entity_body("widget", "w-1", json!({"name": "Loss chart", "dataset": "d-1"})),
        )
        .on_get(
            &format!("{}/v1/geostore/g-1", servers::RESOURCE_WATCH),
            200,
            entity_body("geoStore", "g-1", json!({"info": {"iso": "BRA", "simplifyThresh": 0.01}})),
        );

    let widget = Widget::fetch(&mock, "w-1", servers::RESOURCE_WATCH).await.unwrap();
    assert_eq!(widget.attributes.name.as_deref(), Some("Loss chart"));

    let geometry = Geometry::fetch(&mock, "g-1", servers::RESOURCE_WATCH).await.unwrap();
    let html = geometry.to_html();
    assert!(html.contains("<i>iso: BRA</i>"));
    assert!(!html.contains("simplifyThresh"));
}

// ============================================================================
// Images
// ============================================================================

#[tokio::test]
async fn test_load_fetches_thumbnail() {
    let mock = MockTransport::new().on_post(
        &gfw("/recent-tiles/thumbs"),
        200,
        thumbs_body("https://thumbs.example.org/madrid.png"),
    );
    let image = Image::load(&mock, madrid_params()).await.unwrap();

    assert_eq!(image.thumb_url.as_deref(), Some("https://thumbs.example.org/madrid.png"));
    let request = &mock.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.body,
        Some(json!({
            "source_data": [{"source": "COPERNICUS/S2/20190101T105441_T30TVK"}],
            "bands": ["B4", "B3", "B2"]
        }))
    );
}

#[tokio::test]
async fn test_load_keeps_given_thumbnail() {
    let mock = MockTransport::new();
    let mut params = madrid_params();
    params.thumb_url = Some("given.png".to_string());
    let image = Image::load(&mock, params).await.unwrap();

    assert_eq!(image.thumb_url.as_deref(), Some("given.png"));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_classify_returns_new_image() {
    let mock = MockTransport::new().on_get(
        &gfw("/recent-tiles-classifier"),
        200,
        classifier_body("https://tiles.example.org/classified/{z}/{x}/{y}"),
    );
    let mut params = madrid_params();
    params.thumb_url = Some("thumb.png".to_string());
    let original = Image::new(params).unwrap();
    let before = original.clone();

    let classified = original.classify(&mock, Classifier::RandomForest).await.unwrap();

    assert_eq!(classified.kind, ImageKind::Classified);
    assert_eq!(classified.kind.to_string(), "Classified Image");
    assert_eq!(classified.bbox, original.bbox);
    assert_eq!(classified.source, original.source);
    assert_eq!(classified.thumb_url.as_deref(), Some("thumb.png"));
    assert!(classified.band_viz.is_none());
    assert_eq!(
        classified.tile_url.as_deref(),
        Some("https://tiles.example.org/classified/{z}/{x}/{y}")
    );
    assert_eq!(original, before);

    let request = &mock.requests()[0];
    assert_eq!(
        request.query_param("img_id"),
        Some("COPERNICUS/S2/20190101T105441_T30TVK")
    );
}

#[tokio::test]
async fn test_classify_failure() {
    let mock = MockTransport::new().on_get(&gfw("/recent-tiles-classifier"), 500, "{}");
    let image = Image::new(madrid_params()).unwrap();
    let err = image.classify(&mock, Classifier::RandomForest).await.unwrap_err();
    assert_eq!(err.http_status_code(), Some(500));
}

#[tokio::test]
async fn test_classify_missing_image_is_not_found() {
    // nothing routed, so the classifier answers 404
    let mock = MockTransport::new();
    let image = Image::new(madrid_params()).unwrap();
    let err = image.classify(&mock, Classifier::RandomForest).await.unwrap_err();
    assert!(matches!(err, LmiError::NotFound(_)), "got {err:?}");
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn test_map_fetches_tile_url_once() {
    let mock = MockTransport::new().on_post(
        &gfw("/recent-tiles/tiles"),
        200,
        tiles_body("https://tiles.example.org/{z}/{x}/{y}"),
    );
    let mut image = Image::new(madrid_params()).unwrap();

    let view = image.map(&mock, None, None).await.unwrap();
    assert_eq!(view.tile_layer.url, "https://tiles.example.org/{z}/{x}/{y}");
    assert_eq!(view.tile_layer.attribution, "Sentinel-2 image");
    assert_eq!(view.overlay.style.color, "#64D1B8");
    assert_eq!(view.overlay.style.weight, 6);
    assert_eq!(view.fit_bounds, [[40.0, -4.0], [41.0, -3.0]]);
    assert_approx_eq!(view.center[0], 40.5, 1e-9);
    assert_approx_eq!(view.center[1], -3.5, 1e-9);

    let view = image.map(&mock, Some("#ff0000"), Some(2)).await.unwrap();
    assert_eq!(view.overlay.style.color, "#ff0000");
    assert_eq!(view.overlay.style.weight, 2);
    assert_eq!(mock.requests().len(), 1);

    let serialized = serde_json::to_value(&view).unwrap();
    assert_eq!(serialized["overlay"]["style"]["fillOpacity"], 0.0);
}
