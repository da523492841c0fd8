//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use cache_warmer::config::{Config, CrawlerConfig};
use cache_warmer::crawler::run_crawl;
use cache_warmer::output::StopReason;
use cache_warmer::state::PageState;
use cache_warmer::url::RejectReason;
use cache_warmer::{ConfigError, WarmerError};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no politeness delay
fn create_test_config(url: &str) -> Config {
    Config {
        url: url.to_string(),
        crawler: CrawlerConfig {
            delay: 0,
            random_delay: Some(0),
            request_timeout: 5,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <a href="/page1">Page 1</a>
        <a href="page2">Page 2</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><a href="/">Home</a><a href="/page2">Page 2</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/page2", "<html><body>Content 2</body></html>").await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 3);
    assert_eq!(stats.pages_warmed, 3);
    assert_eq!(stats.pages_failed(), 0);
    assert_eq!(stats.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(request_count(&mock_server).await, 3);
}

#[tokio::test]
async fn test_requests_go_to_address_with_public_host() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("host", "public.example"))
        .respond_with(html(r#"<a href="/about">About</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .and(header("host", "public.example"))
        .respond_with(html("<p>About us</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config("http://public.example/");
    config.address = Some(mock_server.uri());

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(stats.pages_warmed, 2);
    assert_eq!(stats.pages_failed(), 0);
}

#[tokio::test]
async fn test_headers_and_cookies_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("x-warm", "1"))
        .and(header("cookie", "session=abc; lang=en"))
        .respond_with(html("<p>Home</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.headers = vec!["x-warm:1".to_string()];
    config.cookies = vec!["session:abc".to_string(), "lang:en".to_string()];

    let stats = run_crawl(config).await.expect("Crawl should succeed");
    assert_eq!(stats.pages_warmed, 1);
}

#[tokio::test]
async fn test_user_agent_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "WarmBot/2.0"))
        .respond_with(html("<p>Home</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.user_agent = "WarmBot/2.0".to_string();

    run_crawl(config).await.expect("Crawl should succeed");
}

#[tokio::test]
async fn test_query_string_filter() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/a?tracking=1">A tracked</a><a href="/b">B</a>"#,
    )
    .await;
    mount_page(&mock_server, "/a", "<p>A</p>").await;
    mount_page(&mock_server, "/b", "<p>B</p>").await;

    let mut config = create_test_config(&mock_server.uri());
    config.filter_query_strings = true;

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    let requests = mock_server.received_requests().await.unwrap();
    let paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths, vec!["/", "/a", "/b"]);
    assert!(requests.iter().all(|r| r.url.query().is_none()));
    assert_eq!(stats.links_rejected[&RejectReason::QueryString], 1);
}

#[tokio::test]
async fn test_query_strings_followed_without_filter() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/a?page=2">Next</a>"#).await;
    mount_page(&mock_server, "/a", "<p>A</p>").await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url.query(), Some("page=2"));
    assert_eq!(stats.total_rejected(), 0);
}

#[tokio::test]
async fn test_start_url_query_fetched_with_filter() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/a?page=2">Next</a>"#).await;

    let mut config = create_test_config(&format!("{}/?lang=en", mock_server.uri()));
    config.filter_query_strings = true;

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("lang=en"));
    assert_eq!(stats.pages_warmed, 1);
    assert_eq!(stats.links_rejected[&RejectReason::QueryString], 1);
}

#[tokio::test]
async fn test_depth_cutoff() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/1">1</a>"#).await;
    mount_page(&mock_server, "/1", r#"<a href="/2">2</a>"#).await;
    mount_page(&mock_server, "/2", r#"<a href="/3">3</a>"#).await;
    mount_page(&mock_server, "/3", r#"<a href="/4">4</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/4"))
        .respond_with(html("<p>too deep</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 4);
    assert_eq!(stats.depth_exceeded, 1);
}

#[tokio::test]
async fn test_no_duplicate_fetches() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/shared">1</a><a href="/shared#top">2</a><a href="/other">3</a>"#,
    )
    .await;
    mount_page(&mock_server, "/other", r#"<a href="/shared">again</a><a href="/">home</a>"#)
        .await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html(r#"<a href="/other">back</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 3);
    assert!(stats.duplicate_links >= 4);
}

#[tokio::test]
async fn test_request_budget() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
    )
    .await;
    mount_page(&mock_server, "/a", "<p>A</p>").await;
    mount_page(&mock_server, "/b", "<p>B</p>").await;
    mount_page(&mock_server, "/c", "<p>C</p>").await;

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.max_requests = 2;

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 2);
    assert_eq!(stats.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(stats.frontier_discarded, 2);
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn test_error_isolation() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/broken">A</a><a href="/fine">B</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fine"))
        .respond_with(html("<p>fine</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed despite a failing page");

    assert_eq!(stats.pages_warmed, 2);
    assert_eq!(stats.failures[&PageState::HttpError], 1);
}

#[tokio::test]
async fn test_unreachable_start_url() {
    // Port 9 (discard) is not listening on test machines
    let stats = run_crawl(create_test_config("http://127.0.0.1:9/"))
        .await
        .expect("Fetch failures are not crawl errors");

    assert_eq!(stats.requests_issued, 1);
    assert_eq!(stats.pages_warmed, 0);
    assert_eq!(stats.pages_failed(), 1);
}

#[tokio::test]
async fn test_malformed_cookie_fails_before_any_request() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "<p>Home</p>").await;

    let mut config = create_test_config(&mock_server.uri());
    config.cookies = vec!["badcookie".to_string()];

    let result = run_crawl(config).await;

    assert!(matches!(
        result,
        Err(WarmerError::Config(ConfigError::MalformedCookie(_)))
    ));
    assert_eq!(request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_malformed_header_fails_before_any_request() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "<p>Home</p>").await;

    let mut config = create_test_config(&mock_server.uri());
    config.headers = vec!["no-separator".to_string()];

    let result = run_crawl(config).await;

    match result {
        Err(WarmerError::Config(e)) => {
            assert!(e.to_string().contains("problem with header 'no-separator'"));
        }
        other => panic!("expected a configuration error, got {:?}", other.map(|_| ())),
    }
    assert_eq!(request_count(&mock_server).await, 0);
}

#[tokio::test]
async fn test_foreign_domain_never_fetched() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="http://elsewhere.invalid/page">away</a>
           <a href="mailto:someone@example.com">mail</a>
           <a href="/local">local</a>"#,
    )
    .await;
    mount_page(&mock_server, "/local", "<p>local</p>").await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 2);
    assert_eq!(stats.pages_failed(), 0);
    assert_eq!(stats.links_rejected[&RejectReason::ForeignDomain], 1);
    assert_eq!(stats.links_rejected[&RejectReason::UnsupportedScheme], 1);
}

#[tokio::test]
async fn test_connect_host_links_deduplicated() {
    let mock_server = MockServer::start().await;
    let connect = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(r#"<a href="/a">public</a><a href="{}/a">direct</a>"#, connect),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .and(header("host", "public.example"))
        .respond_with(html("<p>A</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config("http://public.example/");
    config.address = Some(connect);

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 2);
    assert_eq!(stats.duplicate_links, 1);
}

#[tokio::test]
async fn test_base_href_resolution() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><base href="/docs/"></head><body><a href="intro">Intro</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(html("<p>intro</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");
}

#[tokio::test]
async fn test_redirect_target_not_refetched() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/old">old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html(r#"<a href="/new">self</a><a href="/old">old</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 2);
    assert_eq!(stats.pages_warmed, 2);
}

#[tokio::test]
async fn test_non_html_fetched_but_not_parsed() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/data.json">data</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"href": "<a href=\"/hidden\">x</a>"}"#, "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 2);
    assert_eq!(stats.links_found, 1);
}

#[tokio::test]
async fn test_politeness_delay_applied() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&mock_server, "/a", "<p>A</p>").await;
    mount_page(&mock_server, "/b", "<p>B</p>").await;

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.delay = 150;

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(stats.pages_warmed, 3);
    assert!(stats.elapsed >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_parallel_crawl_visits_everything_once() {
    let mock_server = MockServer::start().await;

    let links: String = (0..8)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", &links).await;
    for i in 0..8 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html(&links))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.parallelism = 4;

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 9);
    assert_eq!(stats.pages_warmed, 9);
}

#[tokio::test]
async fn test_redirect_to_public_host_fetched_through_address() {
    let public = MockServer::start().await;
    let backend = MockServer::start().await;

    mount_page(&backend, "/", r#"<a href="/dir">dir</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/dir"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/dir/", public.uri())),
        )
        .expect(1)
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/dir/"))
        .respond_with(html("<p>directory</p>"))
        .expect(1)
        .mount(&backend)
        .await;

    let mut config = create_test_config(&public.uri());
    config.address = Some(backend.uri());

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(request_count(&public).await, 0);
    assert_eq!(stats.requests_issued, 3);
    assert_eq!(stats.redirects, 1);
    assert_eq!(stats.pages_warmed, 2);
}

#[tokio::test]
async fn test_body_read_stops_at_limit() {
    let mock_server = MockServer::start().await;

    let page = format!(
        r#"<a href="/early">early</a>{}<a href="/late">late</a>"#,
        " ".repeat(4096)
    );
    mount_page(&mock_server, "/", &page).await;
    Mock::given(method("GET"))
        .and(path("/early"))
        .respond_with(html("<p>early</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/late"))
        .respond_with(html("<p>late</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.max_body_size = 256;

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(stats.links_found, 1);
    assert_eq!(stats.pages_warmed, 2);
}

#[tokio::test]
async fn test_timeout_isolated() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/slow">slow</a><a href="/ok">ok</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("<p>ok</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.request_timeout = 1;

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(stats.failures[&PageState::TimedOut], 1);
    assert_eq!(stats.pages_failed(), 1);
    assert_eq!(stats.pages_warmed, 2);
}

#[tokio::test]
async fn test_crawl_ends_without_waiting_for_cool_down() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "<p>single page</p>").await;

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.delay = 3000;
    config.crawler.random_delay = Some(0);

    let stats = run_crawl(config).await.expect("Crawl should succeed");

    assert_eq!(stats.pages_warmed, 1);
    assert!(stats.elapsed < Duration::from_millis(2000));
}

#[tokio::test]
async fn test_scheme_variants_fetched_once() {
    let mock_server = MockServer::start().await;
    let uri = url::Url::parse(&mock_server.uri()).unwrap();
    let https_variant = format!(
        "https://{}:{}/a",
        uri.host_str().unwrap(),
        uri.port().unwrap()
    );

    mount_page(
        &mock_server,
        "/",
        &format!(r#"<a href="/a">plain</a><a href="{}">https</a>"#, https_variant),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>A</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let stats = run_crawl(create_test_config(&mock_server.uri()))
        .await
        .expect("Crawl should succeed");

    assert_eq!(stats.requests_issued, 2);
    assert_eq!(stats.duplicate_links, 1);
}
