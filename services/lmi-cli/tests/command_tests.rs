//! Command output against canned catalog and imagery responses.

use std::io::Write;

use lmi_cli::{image, search, ImageActions, Output};
use lmi_client::{CollectionQuery, Lmi};
use serde_json::json;
use test_utils::{
    catalog_item, classifier_body, footprint_feature, footprints, list_body, servers, thumbs_body,
    MockTransport,
};

fn catalog() -> Lmi<MockTransport> {
    let datasets = list_body(vec![
        catalog_item("dataset", "d-1", "Tree cover loss", None),
        catalog_item("dataset", "d-2", "Population density", None),
    ]);
    let transport = MockTransport::new().on_get(
        &format!("{}/v1/dataset", servers::RESOURCE_WATCH),
        200,
        datasets,
    );
    Lmi::with_transport(transport, servers::RESOURCE_WATCH)
}

fn dataset_query(search: &str) -> CollectionQuery {
    CollectionQuery {
        object_types: vec!["dataset".to_string()],
        ..CollectionQuery::new(search)
    }
}

fn gfw(path: &str) -> String {
    format!("{}{}", servers::GFW_PRODUCTION, path)
}

fn hit_file() -> tempfile::NamedTempFile {
    let hit = json!({
        "source": "COPERNICUS/S2/20190101T105441_T30TVK",
        "instrument": "Sentinel-2",
        "date_time": "2019-01-01 10:54:41Z",
        "cloud_score": 1.5,
        "bbox": footprint_feature(&footprints::MADRID),
    });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(hit.to_string().as_bytes()).unwrap();
    file
}

// ============================================================================
// search
// ============================================================================

#[tokio::test]
async fn test_search_text_lists_matches() {
    let lmi = catalog();
    let out = search(&lmi, &dataset_query("forest loss"), Output::Text)
        .await
        .unwrap();

    assert_eq!(out, "Dataset d-1\tTree cover loss\n");
    assert_eq!(lmi.transport().requests().len(), 1);
}

#[tokio::test]
async fn test_search_html_numbers_cards() {
    let lmi = catalog();
    let out = search(&lmi, &dataset_query("forest loss"), Output::Html)
        .await
        .unwrap();

    assert!(out.contains("<b>1. </b>"));
    assert!(out.contains("Tree cover loss"));
    assert!(!out.contains("<b>2. </b>"));
}

#[tokio::test]
async fn test_search_failure_names_the_query() {
    let lmi = Lmi::with_transport(MockTransport::new(), servers::RESOURCE_WATCH);
    let err = search(&lmi, &dataset_query("forest"), Output::Text)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Search for 'forest' failed"));
}

// ============================================================================
// image
// ============================================================================

#[tokio::test]
async fn test_image_loads_thumbnail() {
    let mock = MockTransport::new().on_post(
        &gfw("/recent-tiles/thumbs"),
        200,
        thumbs_body("https://thumbs.example.org/madrid.png"),
    );
    let file = hit_file();

    let out = image(&mock, file.path(), None, ImageActions::default())
        .await
        .unwrap();

    assert_eq!(out, "Image COPERNICUS/S2/20190101T105441_T30TVK (Image)\n");
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
}

#[tokio::test]
async fn test_image_classify_and_map() {
    let mock = MockTransport::new()
        .on_post(
            &gfw("/recent-tiles/thumbs"),
            200,
            thumbs_body("https://thumbs.example.org/madrid.png"),
        )
        .on_get(
            &gfw("/recent-tiles-classifier"),
            200,
            classifier_body("https://tiles.example.org/classified/{z}/{x}/{y}"),
        );
    let file = hit_file();
    let actions = ImageActions {
        classify: true,
        map: true,
        html: false,
    };

    let out = image(&mock, file.path(), None, actions).await.unwrap();

    let (header, view) = out.split_once('\n').unwrap();
    assert_eq!(
        header,
        "Image COPERNICUS/S2/20190101T105441_T30TVK (Classified Image)"
    );
    let view: serde_json::Value = serde_json::from_str(view).unwrap();
    assert_eq!(
        view["tile_layer"]["url"],
        "https://tiles.example.org/classified/{z}/{x}/{y}"
    );

    // the classified image already carries its tiles, so no tiles request
    let urls: Vec<_> = mock.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls[1].starts_with(&gfw("/recent-tiles-classifier")));
}

#[tokio::test]
async fn test_image_html_card() {
    let mock = MockTransport::new();
    let file = tempfile::NamedTempFile::new().unwrap();
    let hit = json!({
        "source": "LANDSAT/LC08/C01/T1_RT_TOA/LC08_044034_20140318",
        "instrument": "Landsat-8",
        "thumb_url": "https://thumbs.example.org/given.png",
        "bbox": footprint_feature(&footprints::MADRID),
    });
    std::fs::write(file.path(), hit.to_string()).unwrap();
    let actions = ImageActions {
        html: true,
        ..Default::default()
    };

    let out = image(&mock, file.path(), None, actions).await.unwrap();

    assert!(out.contains("https://thumbs.example.org/given.png"));
    assert!(out.contains("Landsat-8"));
    assert!(mock.requests().is_empty());
}
