// tests/exchange_binance.rs
use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use listing_watcher::exchange::binance::{extract, Binance};
use listing_watcher::exchange::Exchange;
use listing_watcher::fetch::HttpFetcher;

fn binance_at(base_url: &str) -> Binance {
    Binance::with_base_url(HttpFetcher::new().expect("client"), base_url)
}

#[test]
fn extracts_pair_and_utc_open_time() {
    let detail = "Trading will open for ABC/USDT trading pair at 2025-06-01 10:00 (UTC)";
    let listing = extract(detail).expect("well-formed announcement");
    assert_eq!(listing.symbol, "ABC-USDT");
    assert_eq!(
        listing.opens_at,
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    );
}

#[test]
fn lowercase_pair_is_normalized() {
    let detail = "trading will open for abc/usdt trading pair at 2025-06-01 10:00 (UTC)";
    assert_eq!(extract(detail).unwrap().symbol, "ABC-USDT");
}

#[test]
fn missing_open_time_is_not_parseable() {
    assert!(extract("Trading will open for ABC/USDT trading pair soon").is_none());
}

#[test]
fn missing_pair_is_not_parseable() {
    assert!(extract("Spot trading starts at 2025-06-01 10:00 (UTC)").is_none());
}

#[test]
fn out_of_range_date_is_not_parseable() {
    let detail = "Trading will open for ABC/USDT trading pair at 2025-13-45 27:69 (UTC)";
    assert!(extract(detail).is_none());
}

#[test]
fn parse_index_keeps_only_announcement_links() {
    let html =
        std::fs::read_to_string("tests/fixtures/binance_announcements.html").expect("fixture");
    let candidates = binance_at("https://example.test").parse_index(&html);

    assert_eq!(candidates.len(), 3);
    assert!(candidates
        .iter()
        .all(|c| c.url.starts_with("https://example.test/en/support/announcement/")));
    assert_eq!(candidates[0].title, "Binance Will List FooCoin (FOO)");
}

#[tokio::test]
async fn facade_returns_future_listing_and_is_idempotent() {
    let server = MockServer::start();
    let index = server.mock(|when, then| {
        when.method(GET).path("/en/support/announcement/c-48");
        then.status(200)
            .body(include_str!("fixtures/binance_announcements.html"));
    });
    let detail = server.mock(|when, then| {
        when.method(GET)
            .path("/en/support/announcement/binance-will-list-foocoin-foo-1a2b3c");
        then.status(200)
            .body(include_str!("fixtures/binance_detail.html"));
    });
    // Delisting notices fail the title trigger and must not cost a fetch.
    let skipped = server.mock(|when, then| {
        when.method(GET)
            .path("/en/support/announcement/notice-on-barcoin-delisting-9f8e7d");
        then.status(200).body("never fetched");
    });

    let binance = binance_at(&server.base_url());
    let listings = binance.upcoming_listings().await.expect("facade absorbs failures");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].symbol, "FOO-USDT");
    assert_eq!(
        listings[0].opens_at,
        Utc.with_ymd_and_hms(2099, 6, 1, 10, 0, 0).unwrap()
    );
    index.assert_hits(1);
    detail.assert_hits(1);
    skipped.assert_hits(0);

    let again = binance.upcoming_listings().await.expect("facade absorbs failures");
    assert_eq!(listings, again);
}

#[tokio::test]
async fn facade_drops_listings_already_open() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/support/announcement/c-48");
        then.status(200).body(
            r#"<a class="css-1ej4hfo" href="/en/support/announcement/old-coin">Binance Will List OldCoin (OLD)</a>"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/en/support/announcement/old-coin");
        then.status(200)
            .body("Trading will open for OLD/USDT trading pair at 2020-01-02 08:00 (UTC)");
    });

    let binance = binance_at(&server.base_url());
    assert!(binance.upcoming_listings().await.unwrap().is_empty());
}

#[tokio::test]
async fn index_fetch_failure_yields_empty_after_bounded_retries() {
    let server = MockServer::start();
    let index = server.mock(|when, then| {
        when.method(GET).path("/en/support/announcement/c-48");
        then.status(503);
    });

    let binance = binance_at(&server.base_url());
    assert!(binance.upcoming_listings().await.unwrap().is_empty());
    // Three attempts, never a fourth.
    index.assert_hits(3);
}

#[tokio::test]
async fn detail_failure_does_not_abort_other_candidates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/support/announcement/c-48");
        then.status(200).body(concat!(
            r#"<a class="css-1ej4hfo" href="/en/support/announcement/broken">Binance Will List BrokenCoin (BRK)</a>"#,
            r#"<a class="css-1ej4hfo" href="/en/support/announcement/good">Binance Will List GoodCoin (GOOD)</a>"#,
        ));
    });
    server.mock(|when, then| {
        when.method(GET).path("/en/support/announcement/broken");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/en/support/announcement/good");
        then.status(200)
            .body("Trading will open for GOOD/USDT trading pair at 2099-06-01 10:00 (UTC)");
    });

    let binance = binance_at(&server.base_url());
    let listings = binance.upcoming_listings().await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].symbol, "GOOD-USDT");
}

#[tokio::test]
async fn past_listings_capability_stays_callable() {
    let binance = binance_at("https://example.test");
    assert!(binance.past_listings().await.unwrap().is_empty());
}
