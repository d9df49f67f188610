mod support;

use dirmirror_sync::listing::{PARENT_DIRECTORY_LABEL, parse_listing};
use dirmirror_sync::{HttpDirectory, SyncError};
use pretty_assertions::assert_eq;
use support::{listing_page, names};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn directory(server: &MockServer) -> HttpDirectory {
    HttpDirectory::new(format!("{}/pub/", server.uri()), "dirmirror-test/1.0 (ops@example.org)", None)
        .unwrap()
}

// --- Parsing ---

#[test]
fn subdirectory_entries_are_excluded() {
    let parsed = parse_listing(r#"<a href="sub/">sub/</a><a href="report.txt">report.txt</a>"#)
        .unwrap();
    assert_eq!(parsed, names(&["report.txt"]));
}

#[test]
fn parent_directory_link_is_excluded() {
    let html = format!(r#"<a href="/">{PARENT_DIRECTORY_LABEL}</a>"#);
    assert!(parse_listing(&html).unwrap().is_empty());
}

#[test]
fn empty_anchor_text_is_excluded() {
    let parsed = parse_listing(r#"<a href="x"></a><a name="top"></a><a href="y">y</a>"#).unwrap();
    assert_eq!(parsed, names(&["y"]));
}

#[test]
fn plain_file_name_is_included() {
    let parsed = parse_listing(r#"<a href="report.txt">report.txt</a>"#).unwrap();
    assert!(parsed.contains("report.txt"));
}

#[test]
fn duplicate_names_collapse() {
    let parsed = parse_listing(r#"<a href="a">a.txt</a><a href="b">a.txt</a>"#).unwrap();
    assert_eq!(parsed.len(), 1);
}

#[test]
fn full_listing_page() {
    let html = listing_page(&["pr.class", "pr.data.0.Current", "pr.txt", "archive/"]);
    assert_eq!(
        parse_listing(&html).unwrap(),
        names(&["pr.class", "pr.data.0.Current", "pr.txt"])
    );
}

#[test]
fn document_without_anchors_is_empty() {
    assert!(parse_listing("<html><body><p>nothing here</p></body></html>").unwrap().is_empty());
    assert!(parse_listing("").unwrap().is_empty());
}

#[test]
fn unclosed_markup_still_yields_names() {
    let parsed = parse_listing(r#"<pre><a href="a.txt">a.txt</a><br><a href="b.txt">b.txt"#).unwrap();
    assert_eq!(parsed, names(&["a.txt", "b.txt"]));
}

// --- Scraping ---

#[tokio::test]
async fn list_names_scrapes_listing_with_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub/"))
        .and(header("user-agent", "dirmirror-test/1.0 (ops@example.org)"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["a.txt", "b.csv"])))
        .expect(1)
        .mount(&server)
        .await;

    let listed = directory(&server).list_names().await.unwrap();
    assert_eq!(listed, names(&["a.txt", "b.csv"]));
}

#[tokio::test]
async fn listing_error_status_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = directory(&server).list_names().await.unwrap_err();
    assert!(matches!(err, SyncError::Fetch(_)));
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn declared_charset_is_honoured() {
    let server = MockServer::start().await;
    // "café.txt" in ISO-8859-1
    let mut body = b"<html><body><a href=\"x\">caf".to_vec();
    body.push(0xe9);
    body.extend_from_slice(b".txt</a></body></html>");
    Mock::given(method("GET"))
        .and(path("/pub/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "text/html; charset=iso-8859-1"),
        )
        .mount(&server)
        .await;

    let listed = directory(&server).list_names().await.unwrap();
    assert_eq!(listed, names(&["café.txt"]));
}

#[tokio::test]
async fn undecodable_bytes_do_not_abort_the_listing() {
    let server = MockServer::start().await;
    let mut body = br#"<a href="a.txt">a.txt</a>"#.to_vec();
    body.extend_from_slice(&[0xff, 0xc3]);
    body.extend_from_slice(br#"<a href="b.txt">b.txt</a>"#);
    Mock::given(method("GET"))
        .and(path("/pub/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&server)
        .await;

    let listed = directory(&server).list_names().await.unwrap();
    assert_eq!(listed, names(&["a.txt", "b.txt"]));
}

#[tokio::test]
async fn unreachable_listing_is_fetch_error() {
    let dir = HttpDirectory::new("http://127.0.0.1:9/pub/", "dirmirror-test", None).unwrap();
    let err = dir.list_names().await.unwrap_err();
    assert!(matches!(err, SyncError::Fetch(_)));
}
