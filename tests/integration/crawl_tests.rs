//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog and run the full page
//! loop end-to-end: listing pages, detail pages, and the stop conditions.

use catalog_harvest::config::Config;
use catalog_harvest::crawler::{start_crawl, CrawlMode, CrawlProgress, CrawlRequest, CrawlStatus};
use catalog_harvest::model::{Rating, NOT_AVAILABLE};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const CATEGORY: &str = "/catalogue/category/books/science_22";

/// One listed item: (slug, title, rating word, price)
type Item<'a> = (&'a str, &'a str, &'a str, &'a str);

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn listing_page(items: &[Item<'_>]) -> String {
    let pods: String = items
        .iter()
        .map(|(slug, title, rating, price)| {
            format!(
                r#"<li><article class="product_pod">
                    <p class="star-rating {rating}"></p>
                    <h3><a href="../../../{slug}/index.html" title="{title}">{title}</a></h3>
                    <div class="product_price"><p class="price_color">{price}</p></div>
                </article></li>"#
            )
        })
        .collect();
    format!("<html><body><ol class=\"row\">{}</ol></body></html>", pods)
}

fn detail_page(availability: &str) -> String {
    format!(
        r#"<html><body><div class="product_main">
            <h1>Some Book</h1>
            <p class="price_color">£1.00</p>
            <p class="instock availability">
                <i class="icon-ok"></i>
                {availability}
            </p>
        </div></body></html>"#
    )
}

fn page_path(page: u32) -> String {
    if page == 1 {
        format!("{}/index.html", CATEGORY)
    } else {
        format!("{}/page-{}.html", CATEGORY, page)
    }
}

async fn mount_listing(server: &MockServer, page: u32, items: &[Item<'_>]) {
    Mock::given(method("GET"))
        .and(path(page_path(page)))
        .respond_with(html(listing_page(items)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str, availability: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/catalogue/{}/index.html", slug)))
        .respond_with(html(detail_page(availability)))
        .mount(server)
        .await;
}

fn start_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), page_path(1))
}

fn request(server: &MockServer, max_pages: Option<u32>) -> CrawlRequest {
    CrawlRequest::new(&start_url(server), max_pages).expect("valid request")
}

#[tokio::test]
async fn test_crawl_until_not_found() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        1,
        &[
            ("atoms_1", "Atoms", "Three", "£10.00"),
            ("cells_2", "Cells", "One", "£20.50"),
        ],
    )
    .await;
    mount_listing(&server, 2, &[("stars_3", "Stars", "Five", "£7.25")]).await;
    mount_detail(&server, "atoms_1", "In stock (5 available)").await;
    mount_detail(&server, "cells_2", "Out of stock").await;
    mount_detail(&server, "stars_3", "In stock (1 available)").await;
    // page-3.html is not mounted, so the server answers 404

    let handle = start_crawl(&Config::default(), request(&server, None), CrawlMode::Auto).unwrap();
    let result = handle.wait().await;

    assert_eq!(result.status, CrawlStatus::Completed);
    assert_eq!(result.records.len(), 3);

    let first = &result.records[0];
    assert_eq!(first.title(), "Atoms");
    assert_eq!(first.price(), "£10.00");
    assert_eq!(first.rating(), Some(Rating::Three));
    assert_eq!(first.availability(), "In stock (5 available)");
    assert_eq!(first.source_page(), 1);
    assert_eq!(
        first.link().as_str(),
        format!("{}/catalogue/atoms_1/index.html", server.uri())
    );

    assert_eq!(result.records[1].title(), "Cells");
    assert_eq!(result.records[1].availability(), "Out of stock");

    let last = &result.records[2];
    assert_eq!(last.title(), "Stars");
    assert_eq!(last.rating(), Some(Rating::Five));
    assert_eq!(last.source_page(), 2);
}

#[tokio::test]
async fn test_empty_page_ends_crawl() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &[("atoms_1", "Atoms", "Two", "£10.00")]).await;
    mount_listing(&server, 2, &[]).await;
    mount_detail(&server, "atoms_1", "In stock").await;

    Mock::given(method("GET"))
        .and(path(page_path(3)))
        .respond_with(html(listing_page(&[("late_9", "Late", "One", "£1.00")])))
        .expect(0)
        .mount(&server)
        .await;

    let handle = start_crawl(&Config::default(), request(&server, None), CrawlMode::Category).unwrap();
    let result = handle.wait().await;

    assert!(result.status.is_completed());
    assert_eq!(result.records.len(), 1);
}

#[tokio::test]
async fn test_max_pages_caps_crawl() {
    let server = MockServer::start().await;

    for page in 1..=2 {
        mount_listing(&server, page, &[("same_1", "Same", "Four", "£3.00")]).await;
    }
    for page in 3..=5 {
        Mock::given(method("GET"))
            .and(path(page_path(page)))
            .respond_with(html(listing_page(&[("same_1", "Same", "Four", "£3.00")])))
            .expect(0)
            .mount(&server)
            .await;
    }
    mount_detail(&server, "same_1", "In stock").await;

    let handle = start_crawl(&Config::default(), request(&server, Some(2)), CrawlMode::Auto).unwrap();
    let result = handle.wait().await;

    assert_eq!(result.status, CrawlStatus::Completed);
    let pages: Vec<u32> = result.records.iter().map(|r| r.source_page()).collect();
    assert_eq!(pages, vec![1, 2]);
}

#[tokio::test]
async fn test_unreachable_first_page_fails() {
    // Bind and release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = format!("http://127.0.0.1:{}{}", port, page_path(1));
    let request = CrawlRequest::new(&url, None).unwrap();

    let handle = start_crawl(&Config::default(), request, CrawlMode::Category).unwrap();
    let result = handle.wait().await;

    assert!(result.records.is_empty());
    match result.status {
        CrawlStatus::Failed(reason) => assert!(reason.contains("page 1")),
        other => panic!("expected a failed crawl, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_keeps_earlier_records() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &[("atoms_1", "Atoms", "Three", "£10.00")]).await;
    mount_detail(&server, "atoms_1", "In stock").await;
    Mock::given(method("GET"))
        .and(path(page_path(2)))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let handle = start_crawl(&Config::default(), request(&server, None), CrawlMode::Category).unwrap();
    let result = handle.wait().await;

    assert!(result.status.is_failed());
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].title(), "Atoms");
}

#[tokio::test]
async fn test_failed_detail_page_leaves_availability_empty() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        1,
        &[
            ("broken_1", "Broken", "Two", "£4.00"),
            ("fine_2", "Fine", "Two", "£5.00"),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/broken_1/index.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_detail(&server, "fine_2", "In stock").await;

    let handle = start_crawl(&Config::default(), request(&server, None), CrawlMode::Category).unwrap();
    let result = handle.wait().await;

    assert_eq!(result.status, CrawlStatus::Completed);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].availability(), "");
    assert_eq!(result.records[0].title(), "Broken");
    assert_eq!(result.records[1].availability(), "In stock");
}

#[tokio::test]
async fn test_item_without_link_uses_listing_page() {
    let server = MockServer::start().await;

    let body = r#"<html><body><article class="product_pod">
        <h3><a title="Orphan">Orphan</a></h3>
    </article></body></html>"#;
    Mock::given(method("GET"))
        .and(path(page_path(1)))
        .respond_with(html(body.to_string()))
        .mount(&server)
        .await;

    let handle = start_crawl(&Config::default(), request(&server, None), CrawlMode::Category).unwrap();
    let result = handle.wait().await;

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.title(), "Orphan");
    assert_eq!(record.price(), NOT_AVAILABLE);
    assert_eq!(record.rating(), None);
    assert_eq!(record.availability(), "");
    assert_eq!(record.link().as_str(), start_url(&server));
}

/// Serves a detail page and cancels the crawl while doing so
struct CancelOnDetail {
    token: CancellationToken,
}

impl Respond for CancelOnDetail {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.token.cancel();
        html(detail_page("In stock"))
    }
}

#[tokio::test]
async fn test_cancel_stops_at_page_boundary() {
    let server = MockServer::start().await;
    let token = CancellationToken::new();

    mount_listing(
        &server,
        1,
        &[
            ("atoms_1", "Atoms", "One", "£1.00"),
            ("cells_2", "Cells", "One", "£2.00"),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/atoms_1/index.html"))
        .respond_with(CancelOnDetail {
            token: token.clone(),
        })
        .mount(&server)
        .await;
    mount_detail(&server, "cells_2", "In stock").await;
    Mock::given(method("GET"))
        .and(path(page_path(2)))
        .respond_with(html(listing_page(&[("late_3", "Late", "One", "£3.00")])))
        .expect(0)
        .mount(&server)
        .await;

    let request = request(&server, None).with_cancel_token(token);
    let handle = start_crawl(&Config::default(), request, CrawlMode::Category).unwrap();
    let result = handle.wait().await;

    assert_eq!(result.status, CrawlStatus::Cancelled);
    // The page in progress is finished before stopping.
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[1].availability(), "In stock");
}

#[tokio::test]
async fn test_progress_reported_per_page() {
    let server = MockServer::start().await;

    mount_listing(
        &server,
        1,
        &[
            ("atoms_1", "Atoms", "One", "£1.00"),
            ("cells_2", "Cells", "One", "£2.00"),
        ],
    )
    .await;
    mount_listing(&server, 2, &[("stars_3", "Stars", "One", "£3.00")]).await;
    for slug in ["atoms_1", "cells_2", "stars_3"] {
        mount_detail(&server, slug, "In stock").await;
    }

    let handle = start_crawl(&Config::default(), request(&server, None), CrawlMode::Category).unwrap();
    let mut events = Vec::new();
    let result = handle.wait_with_progress(|p| events.push(p)).await;

    assert!(result.status.is_completed());
    assert_eq!(
        events,
        vec![
            CrawlProgress {
                page: 1,
                items_so_far: 2
            },
            CrawlProgress {
                page: 2,
                items_so_far: 3
            },
        ]
    );
}

#[tokio::test]
async fn test_progress_pulled_until_channel_closes() {
    let server = MockServer::start().await;

    mount_listing(&server, 1, &[("atoms_1", "Atoms", "One", "£1.00")]).await;
    mount_listing(
        &server,
        2,
        &[
            ("cells_2", "Cells", "One", "£2.00"),
            ("stars_3", "Stars", "One", "£3.00"),
        ],
    )
    .await;
    for slug in ["atoms_1", "cells_2", "stars_3"] {
        mount_detail(&server, slug, "In stock").await;
    }

    let mut handle =
        start_crawl(&Config::default(), request(&server, None), CrawlMode::Category).unwrap();
    let mut events = Vec::new();
    while let Some(progress) = handle.next_progress().await {
        events.push(progress);
    }
    let result = handle.wait().await;

    assert_eq!(result.status, CrawlStatus::Completed);
    assert_eq!(result.records.len(), 3);
    assert_eq!(
        events,
        vec![
            CrawlProgress {
                page: 1,
                items_so_far: 1
            },
            CrawlProgress {
                page: 2,
                items_so_far: 3
            },
        ]
    );
}

#[tokio::test]
async fn test_single_item_mode() {
    let server = MockServer::start().await;

    let body = r#"<html><body><div class="product_main">
        <h1>A Light in the Attic</h1>
        <p class="price_color">£51.77</p>
        <p class="instock availability">
            In stock (22 available)
        </p>
        <p class="star-rating Three"></p>
    </div></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/catalogue/a-light-in-the-attic_1000/index.html"))
        .respond_with(html(body.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!(
        "{}/catalogue/a-light-in-the-attic_1000/index.html",
        server.uri()
    );
    let request = CrawlRequest::new(&url, None).unwrap();
    let handle = start_crawl(&Config::default(), request, CrawlMode::Auto).unwrap();
    let result = handle.wait().await;

    assert_eq!(result.status, CrawlStatus::Completed);
    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.title(), "A Light in the Attic");
    assert_eq!(record.price(), "£51.77");
    assert_eq!(record.rating(), Some(Rating::Three));
    assert_eq!(record.availability(), "In stock (22 available)");
    assert_eq!(record.source_page(), 1);
    assert_eq!(record.link().as_str(), url);
}

#[tokio::test]
async fn test_single_item_not_found_fails() {
    let server = MockServer::start().await;

    let url = format!("{}/catalogue/missing_1/index.html", server.uri());
    let request = CrawlRequest::new(&url, None).unwrap();
    let handle = start_crawl(&Config::default(), request, CrawlMode::Item).unwrap();
    let result = handle.wait().await;

    assert!(result.status.is_failed());
    assert!(result.records.is_empty());
}
