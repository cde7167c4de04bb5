//! Integration tests for the gazette facade

use gazette::prelude::*;
use gazette::config::FileFormat;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn portal() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locales/manifest.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"supportedLocales": ["ja", "en"], "defaultLocale": "ja"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locales/en.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "listing": {"title": "Articles", "count": "{n} results"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/locales/ja.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "listing": {"title": "記事", "count": "{n}件"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/configs/pageBackgrounds.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "default": {"type": "color", "value": "#111111"},
            "articles": {"type": "image", "src": "/img/articles.jpg", "alt": "Newsroom"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "articles": [
                {"id": 1, "title": "BoJ holds", "publishedAt": "2024-03-19T03:00:00Z"},
                {"id": 2, "title": "Yen slides", "createdAt": "2024-03-18T03:00:00Z"}
            ],
            "totalCount": 12,
            "totalPages": 3,
            "currentPage": 1,
            "hasNextPage": true,
            "hasPreviousPage": false
        })))
        .mount(&server)
        .await;

    server
}

fn settings_for(server: &MockServer) -> PortalSettings {
    PortalSettings {
        api_base_url: server.uri(),
        assets_base_url: server.uri(),
        page_size: 5,
        ..PortalSettings::default()
    }
}

#[tokio::test]
async fn test_session_over_http() {
    let server = portal().await;
    let session = PortalSession::new(settings_for(&server)).unwrap();

    assert_eq!(session.start(Some("en-GB,en;q=0.9,ja;q=0.5")).await, Locale::en());
    let translator = session.translator();
    assert_eq!(translator.t("listing.title"), "Articles");
    assert_eq!(translator.lookup("listing.count", &[("n", "12")]), "12 results");
    assert_eq!(translator.t("listing.missing"), "listing.missing");

    let engine = session.engine(ContentKind::Articles);
    assert_eq!(engine.execute(1, None).await, FetchOutcome::Committed);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.items[0].id, "1");
    assert!(snapshot.items[1].published_at.is_some());
    assert_eq!(snapshot.pagination.total_pages, 3);
    assert!(snapshot.pagination.has_next_page);

    let background = session.backgrounds().resolve("/articles").await;
    assert_eq!(
        background.render_hint(),
        RenderHint::Image {
            src: "/img/articles.jpg".to_string(),
            alt: "Newsroom".to_string()
        }
    );
    assert_eq!(
        session.backgrounds().resolve("/").await,
        Background::Color {
            value: "#111111".to_string()
        }
    );
}

#[tokio::test]
async fn test_locale_switch_uses_cache() {
    let server = portal().await;
    let session = PortalSession::new(settings_for(&server)).unwrap();
    let translator = session.translator();

    session.start(None).await;
    assert_eq!(translator.t("listing.title"), "記事");

    assert!(translator.set_locale(Locale::en()).await);
    assert!(translator.set_locale(Locale::ja()).await);
    assert_eq!(translator.state(), LocaleState::Ready);
    assert_eq!(session.translation_cache().len(), 2);
    assert_eq!(session.translation_cache().stats().hits, 1);
}

#[tokio::test]
async fn test_locale_preference_survives_sessions() {
    let server = portal().await;
    let dir = tempfile::tempdir().unwrap();
    let settings = PortalSettings {
        preference_file: Some(dir.path().join("prefs").join("locale.json")),
        ..settings_for(&server)
    };

    let first = PortalSession::new(settings.clone()).unwrap();
    first.start(None).await;
    first.translator().set_locale(Locale::en()).await;

    let second = PortalSession::new(settings).unwrap();
    assert_eq!(second.start(None).await, Locale::en());
}

#[test]
fn test_session_from_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
api_base_url = "https://api.example.com"
assets_base_url = "https://assets.example.com"
page_size = 20
"#
    )
    .unwrap();

    let config = ConfigService::builder()
        .add_file(file.path(), FileFormat::Toml)
        .build()
        .unwrap();
    let session = PortalSession::from_config(&config).unwrap();

    assert_eq!(session.settings().api_base_url, "https://api.example.com");
    assert_eq!(session.engine(ContentKind::Research).page_size(), 20);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"page_size": 0}}"#).unwrap();

    let config = ConfigService::builder()
        .add_file(file.path(), FileFormat::Json)
        .build()
        .unwrap();

    let err = PortalSession::from_config(&config).unwrap_err();
    assert!(matches!(err, SessionError::Config(_)));
}
