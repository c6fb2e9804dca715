//! End-to-end capture: locate, list chapters, download into a document

use crate::common::{config_toml, context, html_page, mount_head_passthrough};
use shiori::capture::{capture_to_file, extract_chapter_list};
use shiori::config::load_config;
use shiori::crawler::{locate_contents, CrawlContext};
use shiori::output::CaptureProgress;
use shiori::ShioriError;
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TITLE: &str = "Night Road";

/// Serves a search page, a contents page listing two chapters, and the
/// chapter pages; the first chapter is the slowest to answer.
async fn mount_two_chapter_site(server: &MockServer, second_chapter: ResponseTemplate) {
    mount_head_passthrough(server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page(
            r#"<h3><a href="/book/index.html">Night Road - table of contents</a></h3>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book/index.html"))
        .respond_with(html_page(
            r#"<h1>Night Road</h1>
               <div class="list">
                 <a href="/">Home</a>
                 <a href="c/1.html">Chapter 1: Start</a>
                 <a href="c/2.html">Chapter 2: Middle</a>
               </div>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book/c/1.html"))
        .respond_with(
            html_page(
                r#"<div class="nav"><a href="/">Home page</a> | <a href="2.html">Next chapter</a></div>
                   <div id="content">
                     <p>It was a dark night.</p>
                     <p>ok</p>
                     <script>var advert = "buy now";</script>
                     <p>The road went on.</p>
                   </div>"#,
            )
            .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book/c/2.html"))
        .respond_with(second_chapter)
        .mount(server)
        .await;
}

/// Writes the configuration to a file and loads it back, as the CLI does
fn load_from_file(server: &MockServer, extra: &str) -> shiori::Config {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config_toml(server, extra).as_bytes()).unwrap();
    load_config(file.path()).unwrap()
}

async fn locate(ctx: &CrawlContext) -> shiori::ContentsCandidate {
    locate_contents(ctx)
        .await
        .unwrap()
        .expect("contents page should be found")
}

#[tokio::test]
async fn test_two_chapters_are_written_in_list_order() {
    let server = MockServer::start().await;
    mount_two_chapter_site(
        &server,
        html_page(r#"<div id="content"><p>Morning came.</p><span>..</span></div>"#),
    )
    .await;

    let config = load_from_file(&server, "[validator]\nchapter-threshold = 1");
    let ctx = context(&config, TITLE);
    let contents = locate(&ctx).await;

    let chapters = extract_chapter_list(&contents, &ctx);
    let titles: Vec<&str> = chapters.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Chapter 1: Start", "Chapter 2: Middle"]);

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("Night Road.txt");
    let report = capture_to_file(
        &ctx,
        chapters,
        &output,
        &CaptureProgress::hidden(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.chapters_written, 2);
    let document = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        document,
        "Chapter 1: Start\r\n\
         It was a dark night.\r\n\
         The road went on.\r\n\
         \r\n\
         Chapter 2: Middle\r\n\
         Morning came.\r\n\
         \r\n"
    );

    // No fragment shorter than four characters reaches the document
    for line in document.split("\r\n").filter(|line| !line.is_empty()) {
        assert!(line.chars().count() >= 4, "short fragment {line:?} written");
    }
}

#[tokio::test]
async fn test_failed_chapter_aborts_by_default() {
    let server = MockServer::start().await;
    mount_two_chapter_site(&server, ResponseTemplate::new(404)).await;

    let config = load_from_file(
        &server,
        "[validator]\nchapter-threshold = 1\n\n[pipeline]\nchapter-retries = 0",
    );
    let ctx = context(&config, TITLE);
    let contents = locate(&ctx).await;
    let chapters = extract_chapter_list(&contents, &ctx);

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    let result = capture_to_file(
        &ctx,
        chapters,
        &output,
        &CaptureProgress::hidden(),
        &CancellationToken::new(),
    )
    .await;

    match result {
        Err(ShioriError::ChapterFetch { index, reason, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(reason, "HTTP 404");
        }
        other => panic!("expected a chapter failure, got {other:?}"),
    }
    // The chapter before the failure stays on disk
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "Chapter 1: Start\r\nIt was a dark night.\r\nThe road went on.\r\n\r\n"
    );
}

#[tokio::test]
async fn test_placeholder_policy_marks_missing_chapter() {
    let server = MockServer::start().await;
    mount_two_chapter_site(&server, ResponseTemplate::new(500)).await;

    let config = load_from_file(
        &server,
        "[validator]\nchapter-threshold = 1\n\n\
         [pipeline]\nchapter-retries = 1\nretry-backoff-ms = 10\non-chapter-failure = \"placeholder\"",
    );
    let ctx = context(&config, TITLE);
    let contents = locate(&ctx).await;
    let chapters = extract_chapter_list(&contents, &ctx);
    let missing_url = chapters[1].url.to_string();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    let report = capture_to_file(
        &ctx,
        chapters,
        &output,
        &CaptureProgress::hidden(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.placeholders, vec![1]);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        format!(
            "Chapter 1: Start\r\nIt was a dark night.\r\nThe road went on.\r\n\r\n\
             Chapter 2: Middle\r\n[chapter unavailable: {}]\r\n\r\n",
            missing_url
        )
    );

    let attempts = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/book/c/2.html")
        .count();
    assert_eq!(attempts, 2);
}
