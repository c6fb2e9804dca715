//! Locating the contents page through a mock search engine and site

use crate::common::{chapter_links, config_for, context, html_page, mount_head_passthrough};
use shiori::crawler::{
    locate_contents, resolve_seed, search_query, validate_contents, Locator, VisitedSet,
};
use shiori::ShioriError;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TITLE: &str = "剑道真解";

#[tokio::test]
async fn test_seed_follows_search_redirect() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/s"))
        .and(query_param("wd", search_query(TITLE, "127.0.0.1").as_str()))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/results?page=1"))
        .expect(1)
        .mount(&server)
        .await;
    mount_head_passthrough(&server).await;

    let config = config_for(&server, "");
    let seed = resolve_seed(&context(&config, TITLE)).await.unwrap();

    assert_eq!(seed.path(), "/results");
    assert_eq!(seed.query(), Some("page=1"));
}

#[tokio::test]
async fn test_unreachable_search_engine_is_fatal() {
    let server = MockServer::start().await;
    let mut config = config_for(&server, "");
    config.search.endpoint = "http://127.0.0.1:1/s".to_string();

    let result = locate_contents(&context(&config, TITLE)).await;
    assert!(matches!(result, Err(ShioriError::SeedResolution { .. })));
}

#[tokio::test]
async fn test_locates_contents_behind_description_page() {
    let server = MockServer::start().await;
    mount_head_passthrough(&server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page(
            r#"<h3><a href="/book/1/">剑道真解 最新章节列表</a></h3>
               <h3><a href="/about">About us</a></h3>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book/1/"))
        .respond_with(html_page(&format!(
            r#"<h1>《剑道真解》</h1><p>A sword story.</p>{}
               <a href="/book/1/index.html">章节目录</a>"#,
            chapter_links("/book/1", 3)
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book/1/index.html"))
        .respond_with(html_page(&format!(
            "<h1>剑道真解</h1>{}",
            chapter_links("/book/1", 12)
        )))
        .expect(1)
        .mount(&server)
        .await;

    // A positive validation ends the search before the frontier is drained
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page("<p>About</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, "");
    let found = locate_contents(&context(&config, TITLE))
        .await
        .unwrap()
        .expect("contents page should be found");

    assert_eq!(found.url.path(), "/book/1/index.html");
    assert_eq!(found.resolved_url.path(), "/book/1/index.html");
    assert!(found.html.contains("第12章"));
}

#[tokio::test]
async fn test_search_never_goes_past_max_depth() {
    let server = MockServer::start().await;
    mount_head_passthrough(&server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page(r#"<h3><a href="/d1">Home</a></h3>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/d1"))
        .respond_with(html_page(r#"<a href="/d2">Next</a><a href="/d1">Reload</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    // Links back to depth 1 must not be queued again
    Mock::given(method("GET"))
        .and(path("/d2"))
        .respond_with(html_page(r#"<a href="/d3">Deeper</a><a href="/d1">Back</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/d3"))
        .respond_with(html_page("<p>Too deep</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, "[locator]\nmax-depth = 2");
    let ctx = context(&config, TITLE);
    let seed = resolve_seed(&ctx).await.unwrap();
    let mut locator = Locator::new(&ctx);
    let found = locator.locate(seed).await.unwrap();

    assert!(found.is_none());
    // The seed, /d1 and /d2; /d3 was never queued
    assert_eq!(locator.visited().len(), 3);
}

#[tokio::test]
async fn test_validator_does_not_loop_between_description_pages() {
    let server = MockServer::start().await;
    mount_head_passthrough(&server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page(r#"<h3><a href="/p">剑道真解</a></h3>"#))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p"))
        .respond_with(html_page(&format!(
            r#"<h1>剑道真解</h1>{}<a href="/x">目录</a>"#,
            chapter_links("/c", 3)
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html_page(&format!(
            r#"<h1>剑道真解</h1>{}<a href="/p">目录</a>"#,
            chapter_links("/c", 3)
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "");
    let found = locate_contents(&context(&config, TITLE)).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_non_html_pages_are_skipped() {
    let server = MockServer::start().await;
    mount_head_passthrough(&server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page(
            r#"<h3><a href="/file">Download</a></h3><h3><a href="/list">Home</a></h3>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/file"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<a href="/from-pdf">剑道真解</a>"#,
            "application/pdf",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/from-pdf"))
        .respond_with(html_page("<h1>剑道真解</h1>"))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html_page(r#"<a href="/book">剑道真解</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(html_page(&format!(
            "<h2>剑道真解</h2>{}",
            chapter_links("/book", 11)
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "");
    let found = locate_contents(&context(&config, TITLE)).await.unwrap();
    assert_eq!(found.map(|c| c.resolved_url.path().to_string()), Some("/book".to_string()));
}

#[tokio::test]
async fn test_no_results_means_not_found_after_depth_one() {
    let server = MockServer::start().await;
    mount_head_passthrough(&server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page("<p>No results for this query.</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "");
    let found = locate_contents(&context(&config, TITLE)).await.unwrap();
    assert!(found.is_none());

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| request.url.path() == "/s"));
}

#[tokio::test]
async fn test_title_link_after_cover_link_is_validated() {
    let server = MockServer::start().await;
    mount_head_passthrough(&server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page(r#"<h3><a href="/list">Home</a></h3>"#))
        .mount(&server)
        .await;

    // The cover image queues /book before the title link is seen
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html_page(
            r#"<a href="/book"><img src="/cover.jpg"></a><a href="/book">剑道真解</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(html_page(&format!(
            "<h2>剑道真解</h2>{}",
            chapter_links("/book", 11)
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "");
    let found = locate_contents(&context(&config, TITLE)).await.unwrap();
    assert_eq!(found.map(|c| c.resolved_url.path().to_string()), Some("/book".to_string()));
}

#[tokio::test]
async fn test_title_link_to_page_already_crawled_is_validated() {
    let server = MockServer::start().await;
    mount_head_passthrough(&server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page(
            r#"<h3><a href="/book">Latest update</a></h3><h3><a href="/list">Links</a></h3>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book"))
        .respond_with(html_page(&format!(
            "<h2>剑道真解</h2>{}",
            chapter_links("/book", 11)
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html_page(r#"<a href="/book">《剑道真解》</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "");
    let found = locate_contents(&context(&config, TITLE)).await.unwrap();
    assert_eq!(found.map(|c| c.resolved_url.path().to_string()), Some("/book".to_string()));
}

#[tokio::test]
async fn test_rejected_title_result_is_still_searched() {
    let server = MockServer::start().await;
    mount_head_passthrough(&server).await;

    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(html_page(r#"<h3><a href="/tag">剑道真解</a></h3>"#))
        .mount(&server)
        .await;

    // Names the work in a link only, so it is not a description page
    Mock::given(method("GET"))
        .and(path("/tag"))
        .respond_with(html_page(
            r#"<div>Tagged: wuxia</div><a href="/book/9">剑道真解</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/book/9"))
        .respond_with(html_page(&format!(
            "<h1>剑道真解</h1>{}",
            chapter_links("/book/9", 11)
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "");
    let found = locate_contents(&context(&config, TITLE)).await.unwrap();
    assert_eq!(found.map(|c| c.resolved_url.path().to_string()), Some("/book/9".to_string()));
}

#[tokio::test]
async fn test_validator_follows_contents_link_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page(&format!(
            r#"<h1>剑道真解</h1>{}<a href="/list">目录</a>"#,
            chapter_links("/c", 3)
        )))
        .expect(1)
        .mount(&server)
        .await;

    // Links back to the description page instead of listing chapters
    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html_page(r#"<h1>剑道真解</h1><a href="/about">目录</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "");
    let ctx = context(&config, TITLE);
    let mut visited = VisitedSet::new();
    let start = Url::parse(&format!("{}/about", server.uri())).unwrap();

    assert!(validate_contents(&ctx, &mut visited, start).await.is_none());
    assert_eq!(visited.len(), 2);
}
