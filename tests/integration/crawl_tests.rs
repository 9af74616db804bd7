//! Integration tests for the crawler
//!
//! These tests use wiremock to serve municipal listing and article pages
//! and run the full crawl cycle end-to-end through the HTTP engine.

use muni_news_crawler::config::{parse_config, Config};
use muni_news_crawler::crawler::run_crawl;
use muni_news_crawler::output::SiteOutcome;
use muni_news_crawler::CrawlIndex;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a configuration for one site served by the mock server
fn create_test_config(base_url: &str, root: &Path) -> Config {
    let toml = format!(
        r#"
        [crawler]
        page-delay-ms = 0
        article-delay-ms = 0
        navigation-timeout-ms = 5000
        scroll-settle-ms = 0

        [browser]
        engine = "http"

        [[site]]
        name = "alboraya"
        domain = "alboraya.es"
        base-url = "{}"
        language = [
            {{ code = "VA", path = "va/noticias", name = "valenciano" }},
            {{ code = "ES", path = "es/noticias", name = "castellano" }},
        ]
        "#,
        base_url
    );

    let mut config = parse_config(&toml).expect("Failed to parse test config");
    config.output.root = root.to_path_buf();
    config
}

fn listing(links: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><div class=\"view-content\">");
    for (href, title) in links {
        html.push_str(&format!(
            r#"<div class="grupo-texto"><a href="{}">{}</a></div>"#,
            href, title
        ));
    }
    html.push_str("</div></body></html>");
    html
}

fn article(title: &str, subtitle: Option<&str>, paragraphs: &[&str]) -> String {
    let subtitle = subtitle
        .map(|s| {
            format!(
                r#"<div class="field-name-field-subtitulo"><div class="field__item">{}</div></div>"#,
                s
            )
        })
        .unwrap_or_default();
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();

    format!(
        r#"<html><body>
            <div class="grupo-titulares"><div class="field-name-node-title"><h2>{}</h2></div></div>
            {}
            <div class="field__item"><time>14/05/2024</time></div>
            <div class="node__content"><div class="field__item">{}</div></div>
        </body></html>"#,
        title, subtitle, body
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, listing_path: &str, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(listing_path))
        .and(query_param("page", page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Two VA listing pages then an empty one; the ES listing is missing
async fn mount_site(server: &MockServer) {
    mount_listing(
        server,
        "/va/noticias",
        "0",
        listing(&[
            ("/va/noticia/pressupost", "Ajuntament aprova el nou pressupost municipal"),
            ("/va/noticia/buida", "Notícia sense cos"),
            ("/va/noticia/concert", "Concert de primavera al parc"),
        ]),
    )
    .await;
    mount_listing(
        server,
        "/va/noticias",
        "1",
        listing(&[("/va/noticia/ple", "Sessió plenària ordinària de juny")]),
    )
    .await;
    mount_listing(server, "/va/noticias", "2", listing(&[])).await;

    Mock::given(method("GET"))
        .and(path("/es/noticias"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    mount_page(
        server,
        "/va/noticia/pressupost",
        article(
            "Ajuntament aprova el pressupost de 2024",
            Some("Inversions en escoles"),
            &["El ple ha aprovat el pressupost.", "Creix un 4%."],
        ),
    )
    .await;
    mount_page(
        server,
        "/va/noticia/buida",
        "<html><body><div class=\"node__content\"></div></body></html>".to_string(),
    )
    .await;
    mount_page(
        server,
        "/va/noticia/concert",
        article("Concert de primavera", None, &["Diumenge al parc."]),
    )
    .await;
    mount_page(
        server,
        "/va/noticia/ple",
        article("Ple ordinari", None, &["Ordre del dia publicat."]),
    )
    .await;
}

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn read_index(path: &Path) -> CrawlIndex {
    let json = std::fs::read_to_string(path).expect("Failed to read index");
    serde_json::from_str(&json).expect("Failed to parse index")
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), temp_dir.path());

    let summary = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.sites_completed(), 1);
    let SiteOutcome::Completed(stats) = &summary.sites[0].1 else {
        panic!("site did not complete: {:?}", summary.sites[0]);
    };
    assert_eq!(stats.articles_written, 3);
    assert_eq!(stats.articles_skipped, 1);
    assert_eq!(stats.listing_pages, 4);
    assert_eq!(stats.languages_cut_short, 1);

    let date = today();
    let site_dir = temp_dir.path().join("alboraya");
    let index = read_index(&site_dir.join("index.json"));

    let expected: Vec<String> = [
        "ajuntament-aprova-pressupost-municipal-1",
        "concert-primavera-parc-3",
        "sessio-plenaria-ordinaria-juny-4",
    ]
    .iter()
    .map(|slug| format!("VA/{}/{}", date, slug))
    .collect();
    assert_eq!(index.keys().collect::<Vec<_>>(), expected);

    let record = index.get(&expected[0]).unwrap();
    assert_eq!(record.title, "Ajuntament aprova el pressupost de 2024");
    assert_eq!(record.subtitle, "Inversions en escoles");
    assert_eq!(record.date, "14/05/2024");
    assert_eq!(
        record.url,
        format!("{}/va/noticia/pressupost", mock_server.uri())
    );
    assert_eq!(
        record.path_plain,
        format!("va/plain/{}/ajuntament-aprova-pressupost-municipal-1.txt", date)
    );

    let plain = std::fs::read_to_string(site_dir.join(&record.path_plain)).unwrap();
    assert_eq!(plain, "El ple ha aprovat el pressupost.\nCreix un 4%.");
    let markdown = std::fs::read_to_string(site_dir.join(&record.path_markdown)).unwrap();
    assert!(markdown.contains("El ple ha aprovat el pressupost."));
    let html = std::fs::read_to_string(site_dir.join(&record.path_html)).unwrap();
    assert!(html.contains("grupo-titulares"));

    let concert = index.get(&expected[1]).unwrap();
    assert_eq!(concert.subtitle, "Sin subtítulo");
}

#[tokio::test]
async fn test_language_indexes() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), temp_dir.path());
    run_crawl(config).await.expect("Crawl failed");

    let site_dir = temp_dir.path().join("alboraya");
    let va = read_index(&site_dir.join("va/index.json"));
    let es = read_index(&site_dir.join("es/index.json"));

    assert_eq!(va.len(), 3);
    assert!(es.is_empty());

    let raw = std::fs::read_to_string(site_dir.join("va/index.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = json.as_object().unwrap().values().next().unwrap();
    assert_eq!(first["language"], serde_json::json!(["VA"]));
    assert!(first["path2md"].as_str().unwrap().starts_with("va/markdown/"));
    assert!(raw.contains("\n    \""));
}

#[tokio::test]
async fn test_rerun_overwrites_artifacts() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    run_crawl(create_test_config(&mock_server.uri(), temp_dir.path()))
        .await
        .expect("First crawl failed");
    run_crawl(create_test_config(&mock_server.uri(), temp_dir.path()))
        .await
        .expect("Second crawl failed");

    let html_dir = temp_dir
        .path()
        .join("alboraya/va/html")
        .join(today());
    let files = std::fs::read_dir(&html_dir).unwrap().count();
    assert_eq!(files, 3);

    let index = read_index(&temp_dir.path().join("alboraya/index.json"));
    assert_eq!(index.len(), 3);
}

#[tokio::test]
async fn test_unreachable_site_does_not_stop_run() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&mock_server.uri(), temp_dir.path());

    let mut offline = config.sites[0].clone();
    offline.name = "betera".to_string();
    offline.domain = "betera.es".to_string();
    offline.base_url = Some("http://127.0.0.1:1".to_string());
    config.sites.insert(0, offline);

    let summary = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.sites.len(), 2);
    assert_eq!(summary.sites[0].0, "betera");
    assert_eq!(summary.sites_completed(), 2);
    assert!(read_index(&temp_dir.path().join("betera/index.json")).is_empty());
    assert_eq!(
        read_index(&temp_dir.path().join("alboraya/index.json")).len(),
        3
    );
}

#[tokio::test]
async fn test_article_pages_are_requested_once_each() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    run_crawl(create_test_config(&mock_server.uri(), temp_dir.path()))
        .await
        .expect("Crawl failed");

    let requests = mock_server.received_requests().await.unwrap();
    let article_requests = requests
        .iter()
        .filter(|r| r.url.path().starts_with("/va/noticia/"))
        .count();
    let listing_requests = requests
        .iter()
        .filter(|r| r.url.path() == "/va/noticias")
        .count();

    assert_eq!(article_requests, 4);
    assert_eq!(listing_requests, 3);
}
