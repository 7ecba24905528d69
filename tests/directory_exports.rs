mod common;

use std::path::Path;

use axum::{
    extract::Path as UrlPath,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pretty_assertions::assert_eq;
use radio_playlist::{
    config::{
        Config, LogoConfig, RadioBrowserConfig, RadioGardenConfig, ValidatorConfig,
    },
    jobs::{run_radio_browser_export, run_radio_garden_export},
    playlist::parse_playlist,
};
use serde_json::{json, Value};

use common::spawn_server;

fn test_config(base_url: &str, output_dir: &Path) -> Config {
    Config {
        target_country: "Romania".into(),
        output_dir: output_dir.to_path_buf(),
        allow_insecure_transports: true,
        validator: ValidatorConfig::default(),
        radio_browser: RadioBrowserConfig {
            default_base_url: base_url.to_string(),
            use_mirrors: false,
            user_agent: "radio-playlist-rs tests".into(),
            timeout_ms: 5000,
        },
        radio_garden: RadioGardenConfig {
            base_url: base_url.to_string(),
            places_timeout_ms: 5000,
            page_timeout_ms: 5000,
            resolve_timeout_ms: 5000,
            place_concurrency: 2,
        },
        logos: LogoConfig {
            logo_dev_token: Some("pk_test".into()),
        },
    }
}

async fn stations_by_country(UrlPath(country): UrlPath<String>) -> Json<Value> {
    if country != "Romania" {
        return Json(json!([]));
    }
    Json(json!([
        {
            "stationuuid": "low",
            "name": "Low Clicks",
            "url_resolved": "https://low.example/live",
            "favicon": "https://low.example/favicon.png",
            "homepage": "",
            "state": "",
            "clickcount": 1
        },
        {
            "stationuuid": "top",
            "name": " Top FM ",
            "url_resolved": "https://top.example/live",
            "favicon": "",
            "homepage": "https://www.topfm.ro/",
            "state": "Cluj",
            "clickcount": 90
        },
        {
            "stationuuid": "silent",
            "name": "No Stream",
            "url_resolved": "",
            "clickcount": 500
        },
        {
            "stationuuid": "mid",
            "name": "Mid Radio",
            "url_resolved": "https://mid.example/live",
            "favicon": null,
            "homepage": "https://facebook.com/midradio",
            "state": null,
            "clickcount": 10
        }
    ]))
}

#[tokio::test]
async fn radio_browser_export_orders_by_clicks() {
    let router = Router::new().route("/json/stations/bycountry/{country}", get(stations_by_country));
    let addr = spawn_server(router).await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&format!("http://{addr}"), dir.path());

    let result = run_radio_browser_export(&config)
        .await
        .unwrap()
        .expect("stations exported");
    assert_eq!(result.total, 3);
    assert_eq!(result.output_path, dir.path().join("Radio Browser - Romania.m3u"));

    let written = tokio::fs::read_to_string(&result.output_path).await.unwrap();
    assert_eq!(
        written,
        "#EXTM3U\n\
#EXTINF:-1 group-title=\"Romania\" radio=\"true\" tvg-logo=\"https://img.logo.dev/topfm.ro?token=pk_test\",Top FM - Cluj\n\
https://top.example/live\n\
#EXTINF:-1 group-title=\"Romania\" radio=\"true\" tvg-logo=\"https://ui-avatars.com/api/?name=Mid+Radio&background=random&color=fff&size=128\",Mid Radio\n\
https://mid.example/live\n\
#EXTINF:-1 group-title=\"Romania\" radio=\"true\" tvg-logo=\"https://low.example/favicon.png\",Low Clicks\n\
https://low.example/live\n"
    );
}

#[tokio::test]
async fn radio_browser_reports_upstream_failure() {
    let router = Router::new().route(
        "/json/stations/bycountry/{country}",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let addr = spawn_server(router).await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&format!("http://{addr}"), dir.path());

    assert!(run_radio_browser_export(&config).await.is_err());
    assert!(!dir.path().join("Radio Browser - Romania.m3u").exists());
}

async fn places() -> Json<Value> {
    Json(json!({
        "data": {
            "list": [
                { "id": "buc", "title": "Bucuresti", "country": "Romania" },
                { "id": "sof", "title": "Sofia", "country": "Bulgaria" },
                { "id": "clj", "title": "Cluj", "country": "Romania" },
                { "id": "iasi", "title": "Iasi", "country": "Romania" }
            ]
        }
    }))
}

fn channel(title: &str, id: &str, website: Option<&str>) -> Value {
    json!({
        "page": {
            "type": "channel",
            "title": title,
            "url": format!("/listen/{}/{id}", title.to_lowercase().replace(' ', "-")),
            "website": website,
            "place": { "title": "Somewhere" },
            "country": { "title": "Romania" }
        }
    })
}

async fn place_channels(UrlPath(place_id): UrlPath<String>) -> Response {
    let items = match place_id.as_str() {
        "buc" => vec![
            channel("Radio Zu", "zu1", Some("https://www.radiozu.ro")),
            channel("Kiss FM", "kiss1", None),
            channel("Radio Zu", "zu1", Some("https://www.radiozu.ro")),
            json!({ "page": { "type": "place", "title": "Bucuresti", "url": "/visit/bucuresti/buc" } }),
        ],
        "clj" => vec![channel("Digi FM", "digi1", None)],
        _ => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    Json(json!({ "data": { "content": [ { "items": items } ] } })).into_response()
}

async fn listen(UrlPath(channel_id): UrlPath<String>) -> Response {
    match channel_id.as_str() {
        "zu1" => (
            StatusCode::FOUND,
            [(header::LOCATION, "https://live.radiozu.example/zu.mp3")],
        )
            .into_response(),
        "kiss1" => StatusCode::FOUND.into_response(),
        _ => StatusCode::OK.into_response(),
    }
}

#[tokio::test]
async fn radio_garden_export_resolves_dedupes_and_sorts() {
    let router = Router::new()
        .route("/api/ara/content/places", get(places))
        .route("/api/ara/content/page/{place_id}/channels", get(place_channels))
        .route("/api/ara/content/listen/{channel_id}/channel.mp3", get(listen));
    let addr = spawn_server(router).await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&format!("http://{addr}"), dir.path());

    let result = run_radio_garden_export(&config)
        .await
        .unwrap()
        .expect("stations exported");
    assert_eq!(result.output_path, dir.path().join("Romania.m3u"));
    assert_eq!(result.total, 3);

    let written = tokio::fs::read_to_string(&result.output_path).await.unwrap();
    let entries = parse_playlist(&written);
    let summary: Vec<(&str, &str)> = entries
        .iter()
        .map(|entry| (entry.title(), entry.url.as_str()))
        .collect();
    let digi_url = format!("http://{addr}/api/ara/content/listen/digi1/channel.mp3");
    let kiss_url = format!("http://{addr}/api/ara/content/listen/kiss1/channel.mp3");
    assert_eq!(
        summary,
        vec![
            ("Digi FM", digi_url.as_str()),
            ("Kiss FM", kiss_url.as_str()),
            ("Radio Zu", "https://live.radiozu.example/zu.mp3"),
        ]
    );
    assert_eq!(
        entries[2].extinf,
        "#EXTINF:-1 group-title=\"Romania\" tvg-logo=\"https://img.logo.dev/radiozu.ro?token=pk_test\",Radio Zu"
    );
    assert_eq!(
        entries[0].extinf,
        "#EXTINF:-1 group-title=\"Romania\" tvg-logo=\"https://ui-avatars.com/api/?name=Digi+FM&background=random&color=fff&size=128\",Digi FM"
    );
}

#[tokio::test]
async fn radio_garden_without_places_writes_nothing() {
    let router = Router::new().route(
        "/api/ara/content/places",
        get(|| async { Json(json!({ "data": { "list": [] } })) }),
    );
    let addr = spawn_server(router).await;
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&format!("http://{addr}"), dir.path());

    assert!(run_radio_garden_export(&config).await.unwrap().is_none());
    assert!(!dir.path().join("Romania.m3u").exists());
}
