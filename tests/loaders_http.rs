//! HTTP loader tests against a local mock server: no real network, no
//! retries, per-item failures skipped.

use std::time::Duration;

use httpmock::prelude::*;
use ragforge::loaders::{WebLoader, WikipediaLoader};
use ragforge::types::keys;
use tempfile::tempdir;
use url::Url;

const DOC_PAGE: &str = r#"<html>
<body>
  <nav><ul><li>Sidebar link</li></ul></nav>
  <main>
    <h1>Getting Started</h1>
    <p>Install the toolchain and create a project before running anything else here.</p>
    <p>The second paragraph explains configuration files in a little more detail.</p>
  </main>
  <footer><p>footer chrome</p></footer>
</body>
</html>"#;

#[tokio::test]
async fn web_loader_extracts_main_text_and_skips_failures() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/guides/getting-started");
            then.status(200).body(DOC_PAGE);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/guides/missing-page");
            then.status(404);
        })
        .await;

    let dir = tempdir().unwrap();
    let urls_file = dir.path().join("urls.txt");
    std::fs::write(
        &urls_file,
        format!(
            "# docs to index\n{}\n{}\n",
            server.url("/guides/getting-started"),
            server.url("/guides/missing-page"),
        ),
    )
    .unwrap();

    let loader = WebLoader::with_client(reqwest::Client::new()).with_delay(Duration::ZERO);
    let docs = loader.load(&urls_file).await.unwrap();

    assert_eq!(docs.len(), 1, "the 404 URL must be skipped, not fatal");
    let doc = &docs[0];
    assert_eq!(doc.meta_str(keys::TITLE), Some("Getting Started"));
    assert_eq!(doc.meta_str(keys::SOURCE_TYPE), Some("web"));
    assert!(doc.text.contains("Install the toolchain"));
    assert!(!doc.text.contains("Sidebar link"));
    assert!(!doc.text.contains("footer chrome"));
}

#[tokio::test]
async fn wiki_loader_skips_missing_pages_silently() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/w/api.php")
                .query_param("titles", "Rust (programming language)");
            then.status(200).json_body(serde_json::json!({
                "batchcomplete": true,
                "query": {"pages": [{
                    "pageid": 1,
                    "ns": 0,
                    "title": "Rust (programming language)",
                    "extract": "Rust is a systems programming language focused on safety and speed."
                }]}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/w/api.php")
                .query_param("titles", "No Such Article");
            then.status(200).json_body(serde_json::json!({
                "query": {"pages": [{"ns": 0, "title": "No Such Article", "missing": true}]}
            }));
        })
        .await;

    let dir = tempdir().unwrap();
    let titles_file = dir.path().join("titles.txt");
    std::fs::write(
        &titles_file,
        "Rust (programming language)\n# a comment\nNo Such Article\n",
    )
    .unwrap();

    let loader = WikipediaLoader::with_client(reqwest::Client::new(), "en")
        .with_api_endpoint(Url::parse(&server.url("/w/api.php")).unwrap());
    let docs = loader.load(&titles_file).await.unwrap();

    assert_eq!(docs.len(), 1);
    let doc = &docs[0];
    assert_eq!(doc.meta_str(keys::TITLE), Some("Rust (programming language)"));
    assert_eq!(
        doc.meta_str(keys::SOURCE_URL),
        Some("https://en.wikipedia.org/wiki/Rust_(programming_language)")
    );
    assert_eq!(doc.meta_str(keys::LICENSE), Some("CC BY-SA 4.0"));
    assert_eq!(doc.meta_str(keys::DOC_TYPE), Some("wikipedia"));
    assert!(doc.text.starts_with("Rust is a systems"));
}

#[tokio::test]
async fn wiki_loader_survives_server_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/w/api.php");
            then.status(500);
        })
        .await;

    let dir = tempdir().unwrap();
    let titles_file = dir.path().join("titles.txt");
    std::fs::write(&titles_file, "Anything\n").unwrap();

    let loader = WikipediaLoader::with_client(reqwest::Client::new(), "en")
        .with_api_endpoint(Url::parse(&server.url("/w/api.php")).unwrap());
    let docs = loader.load(&titles_file).await.unwrap();
    assert!(docs.is_empty(), "a failing endpoint skips items, not the run");
}
