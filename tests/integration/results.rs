//! End-to-end behaviour of `ElectionResults` against a scripted upstream

use crate::support::{ok, status, ScriptedUpstream, BASE};
use tempfile::TempDir;
use volby::cache::{CacheStore, FreshnessPolicy};
use volby::extract::FeedFormat;
use volby::model::unix_now;
use volby::{ElectionResults, VolbyError};

fn service(upstream: ScriptedUpstream, temp: &TempDir) -> ElectionResults<ScriptedUpstream> {
    ElectionResults::new(upstream, CacheStore::new(temp.path())).with_base_url(BASE)
}

/// Rewind the stored snapshot's clock so the next request finds it stale
fn age_snapshot(results: &ElectionResults<ScriptedUpstream>, year: i32, secs: f64) {
    let store = results.store();
    let entry = store.load(year, "EN").expect("snapshot present");
    store
        .store(year, "EN", &entry.data, entry.etag.as_deref(), entry.checked_at - secs)
        .unwrap();
}

#[test]
fn first_fetch_assembles_and_caches() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.publish_html(2025, "\"v1\"", "57,00");
    let results = service(upstream, &temp);

    let data = results.gather(2025, None, "en").unwrap();
    assert_eq!(results.transport().request_count(), 3);

    assert_eq!(data.metadata.year, 2025);
    assert_eq!(data.metadata.lang, "EN");
    assert_eq!(data.metadata.source, "https://volby.test/ps2025/ps2?xjazyk=EN");
    assert_eq!(data.metadata.effective_year, Some(2025));
    assert!(!data.metadata.fallback_used);
    assert_eq!(data.summary.wards_processed_percent, Some(57.0));
    assert_eq!(data.summary.invalid_votes, Some(15_541));

    // canonical names from 2025 on
    let names: Vec<&str> = data.parties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["ANO 2011", "Spolu (ODS, KDU-ČSL, TOP 09)", "Motoristé sobě"]
    );
    assert_eq!(data.seats.len(), 3);
    assert_eq!(data.seats[1].party, "Spolu (ODS, KDU-ČSL, TOP 09)");
    assert_eq!(data.seats[1].mandates, 52);
    assert_eq!(data.seats[1].color.as_deref(), Some("#23238e"));

    let ids: Vec<u32> = data.regions.iter().map(|r| r.region_id).collect();
    assert_eq!(ids, vec![1, 7, 14]);
    assert_eq!(data.regions[2].leading_party, "ANO 2011");
    assert_eq!(data.regions[1].region_name, "Kraj Vysočina");
    assert_eq!(
        data.regions[0].detail_url,
        "https://volby.test/ps2025/ps311?xjazyk=EN&xkraj=1"
    );

    let cache = data.metadata.cache.clone().unwrap();
    assert!(!cache.hit);
    assert!(!cache.revalidated);
    assert_eq!(cache.etag.as_deref(), Some("\"v1\""));

    let stored = results.store().load(2025, "EN").unwrap();
    assert_eq!(stored.etag.as_deref(), Some("\"v1\""));
    assert!(stored.data.metadata.cache.is_none());
    assert_eq!(stored.data, {
        let mut expected = data.without_cache_info();
        expected.metadata.effective_year = None;
        expected.metadata.requested_year = None;
        expected
    });
}

#[test]
fn fresh_snapshot_makes_no_requests() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.publish_html(2025, "\"v1\"", "57,00");
    let results = service(upstream, &temp);

    let first = results.gather(2025, None, "EN").unwrap();
    age_snapshot(&results, 2025, 30.0);
    let second = results.gather(2025, None, "EN").unwrap();

    assert_eq!(results.transport().request_count(), 3);
    let cache = second.metadata.cache.clone().unwrap();
    assert!(cache.hit);
    assert!(!cache.revalidated);
    assert_eq!(second.parties, first.parties);
}

#[test]
fn not_modified_reuses_snapshot() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.publish_html(2025, "\"v1\"", "100,00");
    upstream.push(2025, "ps2?xjazyk=EN", status(304));
    let results = service(upstream, &temp);

    let first = results.gather(2025, None, "EN").unwrap();
    age_snapshot(&results, 2025, 3700.0);
    let before = results.store().load(2025, "EN").unwrap().checked_at;
    let second = results.gather(2025, None, "EN").unwrap();

    let requests = results.transport().requests.borrow();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].url, ScriptedUpstream::url(2025, "ps2?xjazyk=EN"));
    assert_eq!(requests[3].if_none_match.as_deref(), Some("\"v1\""));

    let cache = second.metadata.cache.clone().unwrap();
    assert!(cache.hit);
    assert!(cache.revalidated);
    assert_eq!(second.summary, first.summary);
    assert_eq!(second.parties, first.parties);
    assert_eq!(second.metadata.fetched_at, first.metadata.fetched_at);

    let after = results.store().load(2025, "EN").unwrap();
    assert!(after.checked_at > before);
    assert_eq!(after.etag.as_deref(), Some("\"v1\""));
}

#[test]
fn changed_content_is_refetched_once() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.publish_html(2025, "\"v1\"", "57,00");
    upstream.publish_html(2025, "\"v2\"", "99,10");
    let results = service(upstream, &temp);

    results.gather(2025, None, "EN").unwrap();
    age_snapshot(&results, 2025, 61.0);
    let data = results.gather(2025, None, "EN").unwrap();

    // conditional GET of the primary page is reused, charts fetched fresh
    let requests = results.transport().requests.borrow();
    assert_eq!(requests.len(), 6);
    assert_eq!(requests[3].if_none_match.as_deref(), Some("\"v1\""));
    assert!(requests[4].url.contains("d3_rects"));
    assert!(requests[5].url.contains("d3_mapa"));

    assert_eq!(data.summary.wards_processed_percent, Some(99.1));
    let cache = data.metadata.cache.clone().unwrap();
    assert!(!cache.hit);
    assert!(cache.revalidated);
    assert_eq!(cache.etag.as_deref(), Some("\"v2\""));
    assert_eq!(
        results.store().load(2025, "EN").unwrap().etag.as_deref(),
        Some("\"v2\"")
    );
}

#[test]
fn stale_snapshot_without_etag_is_refetched() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.publish_html(2025, "\"v1\"", "57,00");
    upstream.publish_html(2025, "\"v2\"", "60,00");
    let results = service(upstream, &temp);

    let first = results.gather(2025, None, "EN").unwrap();
    let stale_at = unix_now() - 120.0;
    results
        .store()
        .store(2025, "EN", &first, None, stale_at)
        .unwrap();

    let data = results.gather(2025, None, "EN").unwrap();
    let requests = results.transport().requests.borrow();
    assert_eq!(requests.len(), 6);
    assert!(requests[3].if_none_match.is_none());
    let cache = data.metadata.cache.clone().unwrap();
    assert!(!cache.hit && !cache.revalidated);
    assert_eq!(data.summary.wards_processed_percent, Some(60.0));
}

#[test]
fn revalidation_error_status_does_not_serve_stale_data() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.publish_html(2025, "\"v1\"", "57,00");
    upstream.push(2025, "ps2?xjazyk=EN", status(502));
    let results = service(upstream, &temp);

    results.gather(2025, None, "EN").unwrap();
    age_snapshot(&results, 2025, 600.0);
    let err = results.gather(2025, None, "EN").unwrap_err();
    match err {
        VolbyError::DataUnavailable { year, status, .. } => {
            assert_eq!(year, 2025);
            assert_eq!(status, Some(502));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unpublished_year_falls_back() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.push(
        2025,
        "ps2?xjazyk=EN",
        ok("<html><h1>Chyba 404</h1></html>", None),
    );
    upstream.publish_html(2021, "\"old\"", "100,00");
    let results = service(upstream, &temp);

    let data = results.gather(2025, Some(2021), "EN").unwrap();
    assert_eq!(data.metadata.year, 2021);
    assert_eq!(data.metadata.effective_year, Some(2021));
    assert_eq!(data.metadata.requested_year, Some(2025));
    assert!(data.metadata.fallback_used);
    // 2021 labels are kept as published
    assert!(data.parties.iter().any(|p| p.name == "ANO"));
    assert!(results.store().load(2025, "EN").is_none());
    assert!(results.store().load(2021, "EN").is_some());
}

#[test]
fn unpublished_year_without_fallback_fails() {
    let temp = TempDir::new().unwrap();
    let results = service(ScriptedUpstream::new(), &temp);
    let err = results.gather(2025, None, "EN").unwrap_err();
    assert!(err.is_data_unavailable());
    assert!(err.hint().is_some());
}

#[test]
fn placeholder_page_counts_as_unpublished() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.push(
        2025,
        "ps2?xjazyk=EN",
        ok("<table><tr><th>Wards</th></tr><tr><td>0</td></tr></table>", None),
    );
    let results = service(upstream, &temp);
    let err = results.gather(2025, None, "EN").unwrap_err();
    assert!(err.to_string().contains("multi-level"));
}

#[test]
fn custom_intervals_apply() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.publish_html(2025, "\"v1\"", "57,00");
    upstream.push(2025, "ps2?xjazyk=EN", status(304));
    let results = service(upstream, &temp).with_policy(FreshnessPolicy::new(
        std::time::Duration::from_secs(600),
        std::time::Duration::from_secs(7200),
    ));

    results.gather(2025, None, "EN").unwrap();
    age_snapshot(&results, 2025, 120.0);
    let served = results.gather(2025, None, "EN").unwrap();
    assert!(!served.metadata.cache.unwrap().revalidated);
    assert_eq!(results.transport().request_count(), 3);
}

#[test]
fn json_feed_generation() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    let document = serde_json::json!({
        "prehled": [14761, 14761, 100, 8275752, 5361914, 65.43, 5355014, 5348976, 99.89],
        "vysledky": [
            [17, "PIRATI a STAROSTOVE", 1099030, 15.62, 37, "#000000"],
            [20, "ANO 2011", 1458140, 27.12, 72, "#261060"],
            [13, "SPOLU", 1493905, 27.79, 71, "#23238e"],
            [4, "Volny blok", 69678]
        ],
        "kraje": {
            "2": ["Středočeský kraj", 13, 31.1, 400000, 100, "#23238e", "ps311?xkraj=2"],
            "1": ["Hlavní město Praha", 13, 40.2, 300000, 100]
        }
    });
    upstream.push(
        2021,
        "data.json?xjazyk=EN",
        ok(&document.to_string(), Some("\"j1\"")),
    );
    let results = service(upstream, &temp).with_format(FeedFormat::Json);

    let data = results.gather(2021, None, "EN").unwrap();
    assert_eq!(results.transport().request_count(), 1);
    assert_eq!(data.metadata.source, "https://volby.test/ps2021/data.json?xjazyk=EN");
    assert_eq!(data.summary.invalid_votes, Some(6_038));
    assert_eq!(data.parties[0].name, "SPOLU");
    assert_eq!(data.parties[3].vote_share, 0.0);
    assert_eq!(data.seats.len(), 3);
    assert_eq!(data.seats[0].mandates, 72);
    assert_eq!(data.regions[0].region_id, 1);
    assert_eq!(data.regions[0].leading_party, "SPOLU");
    assert_eq!(data.regions[0].color, None);
    assert_eq!(
        data.metadata.cache.unwrap().etag.as_deref(),
        Some("\"j1\"")
    );
}

fn json_document(processed_percent: f64, ano_votes: u64) -> String {
    serde_json::json!({
        "prehled": [14761, 8413, processed_percent, 8275752, 3106240, 37.53, 3104112, 3088571, 99.50],
        "vysledky": [
            [22, "ANO 2011", ano_votes, 34.69, 0],
            [11, "SPOLU", 734180, 23.77, 0]
        ],
        "kraje": {}
    })
    .to_string()
}

#[test]
fn json_feed_changed_content_is_refetched_once() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.push(
        2025,
        "data.json?xjazyk=EN",
        ok(&json_document(57.0, 1_071_440), Some("\"j1\"")),
    );
    upstream.push(
        2025,
        "data.json?xjazyk=EN",
        ok(&json_document(61.5, 1_190_002), Some("\"j2\"")),
    );
    let results = service(upstream, &temp).with_format(FeedFormat::Json);

    results.gather(2025, None, "EN").unwrap();
    age_snapshot(&results, 2025, 61.0);
    let data = results.gather(2025, None, "EN").unwrap();

    // the conditional response is parsed as the document, no second download
    let requests = results.transport().requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url, ScriptedUpstream::url(2025, "data.json?xjazyk=EN"));
    assert_eq!(requests[1].if_none_match.as_deref(), Some("\"j1\""));

    assert_eq!(data.summary.wards_processed_percent, Some(61.5));
    assert_eq!(data.parties[0].votes, 1_190_002);
    let cache = data.metadata.cache.clone().unwrap();
    assert!(!cache.hit);
    assert!(cache.revalidated);
    assert_eq!(cache.etag.as_deref(), Some("\"j2\""));
    assert_eq!(
        results.store().load(2025, "EN").unwrap().etag.as_deref(),
        Some("\"j2\"")
    );
}

#[test]
fn json_feed_not_modified_reuses_snapshot() {
    let temp = TempDir::new().unwrap();
    let upstream = ScriptedUpstream::new();
    upstream.push(
        2025,
        "data.json?xjazyk=EN",
        ok(&json_document(57.0, 1_071_440), Some("\"j1\"")),
    );
    upstream.push(2025, "data.json?xjazyk=EN", status(304));
    let results = service(upstream, &temp).with_format(FeedFormat::Json);

    let first = results.gather(2025, None, "EN").unwrap();
    age_snapshot(&results, 2025, 61.0);
    let second = results.gather(2025, None, "EN").unwrap();

    assert_eq!(results.transport().request_count(), 2);
    let cache = second.metadata.cache.clone().unwrap();
    assert!(cache.hit && cache.revalidated);
    assert_eq!(second.parties, first.parties);
}
