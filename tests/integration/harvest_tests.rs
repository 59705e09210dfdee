use serde_json::{json, Value};
use serp_harvester::config::{
    Config, HarvestConfig, OutputConfig, SearchConfig, UserAgentConfig,
};
use serp_harvester::harvest::{Coordinator, SearchClient, StopReason};
use serp_harvester::WriteOutcome;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

/// Creates a test configuration pointing at the mock search endpoint
fn create_test_config(endpoint: &str, directory: &Path) -> Config {
    Config {
        search: SearchConfig {
            endpoint: endpoint.to_string(),
            request_timeout_ms: 2_000,
            ..SearchConfig::default()
        },
        harvest: HarvestConfig {
            max_concurrent_queries: 4,
            empty_page_threshold: 2,
            max_pages: 10,
        },
        rate_limit: None,
        user_agent: UserAgentConfig {
            client_name: "TestHarvester".to_string(),
            client_version: "1.0".to_string(),
        },
        output: OutputConfig {
            directory: directory.to_string_lossy().to_string(),
        },
    }
}

fn organic(domains: &[&str]) -> Value {
    let entries: Vec<Value> = domains
        .iter()
        .enumerate()
        .map(|(i, domain)| {
            json!({
                "title": format!("{} home", domain),
                "link": format!("https://www.{}/", domain),
                "snippet": format!("About {}", domain),
                "position": i + 1,
            })
        })
        .collect();
    json!({ "searchParameters": {}, "organic": entries })
}

/// Serves one page of one query
async fn mount_page(server: &MockServer, query: &str, page: u32, body: Value) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", API_KEY))
        .and(body_partial_json(json!({ "q": query, "page": page })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Answers every other authorized request with an empty page
///
/// Mount after the specific pages so they take precedence.
async fn mount_empty_fallback(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(organic(&[])))
        .mount(server)
        .await;
}

async fn coordinator(server: &MockServer, dir: &TempDir) -> Coordinator<SearchClient> {
    let config = create_test_config(&format!("{}/search", server.uri()), dir.path());
    let client = SearchClient::new(&config.search, &config.user_agent, API_KEY)
        .expect("Failed to build search client");
    Coordinator::new(config, client).expect("Invalid test configuration")
}

fn queries(list: &[&str]) -> Vec<String> {
    list.iter().map(|q| q.to_string()).collect()
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open CSV");
    let headers = reader
        .headers()
        .expect("Failed to read header")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|row| {
            row.expect("Failed to read row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (headers, rows)
}

#[tokio::test]
async fn test_full_harvest_dedups_across_queries() {
    let server = MockServer::start().await;
    mount_page(&server, "coffee", 1, organic(&["acme.com", "beta.com"])).await;
    mount_page(&server, "coffee", 2, organic(&["cafe.co.uk"])).await;
    mount_page(&server, "tea", 1, organic(&["beta.com", "gamma.com"])).await;
    mount_empty_fallback(&server).await;

    let dir = TempDir::new().unwrap();
    let outcome = coordinator(&server, &dir)
        .await
        .run(queries(&["coffee", "tea"]))
        .await
        .expect("Harvest failed");

    assert_eq!(outcome.record_count, 4);
    assert_eq!(outcome.statistics.failed_queries, 0);

    let path = outcome.results.path().expect("Result table missing");
    let (headers, rows) = read_csv(path);
    assert_eq!(
        headers,
        vec!["link", "normalized_domain", "position", "query", "snippet", "title"]
    );
    assert_eq!(rows.len(), 4);

    let domain_col = headers.iter().position(|h| h == "normalized_domain").unwrap();
    let domains: BTreeSet<&str> = rows.iter().map(|r| r[domain_col].as_str()).collect();
    let expected: BTreeSet<&str> = ["acme.com", "beta.com", "cafe.co.uk", "gamma.com"]
        .into_iter()
        .collect();
    assert_eq!(domains, expected);
}

#[tokio::test]
async fn test_page_report_table() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "plumbers",
        1,
        organic(&["a.com", "b.com", "c.com", "d.com", "e.com"]),
    )
    .await;
    mount_page(&server, "roofers", 1, organic(&["f.com"])).await;
    mount_page(&server, "roofers", 2, organic(&["g.com", "h.com"])).await;
    mount_empty_fallback(&server).await;

    let dir = TempDir::new().unwrap();
    let outcome = coordinator(&server, &dir)
        .await
        .run(queries(&["plumbers", "roofers"]))
        .await
        .expect("Harvest failed");

    let path = outcome.diagnostics.path().expect("Page report missing");
    let (headers, rows) = read_csv(path);
    assert_eq!(headers, vec!["query", "Page1", "Page2", "Page3", "Page4"]);
    assert_eq!(rows[0], vec!["plumbers", "5", "0", "0", ""]);
    assert_eq!(rows[1], vec!["roofers", "1", "2", "0", "0"]);
}

#[tokio::test]
async fn test_http_error_isolated_to_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "q": "broken" })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "working", 1, organic(&["ok.com"])).await;
    mount_empty_fallback(&server).await;

    let dir = TempDir::new().unwrap();
    let report = coordinator(&server, &dir)
        .await
        .harvest(queries(&["broken", "working"]))
        .await
        .expect("Harvest failed");

    assert!(matches!(
        &report.outcomes[0].stop,
        StopReason::Failed { page: 1, .. }
    ));
    assert_eq!(report.outcomes[1].stop, StopReason::Exhausted);
    assert_eq!(report.statistics.failures["HTTP 500"], 1);
    let domains: Vec<_> = report.harvest.domains().into_iter().collect();
    assert_eq!(domains, vec!["ok.com"]);
    // The failed query requested page 1 only
    assert_eq!(report.harvest.pages.rows()[0].counts.len(), 0);
}

#[tokio::test]
async fn test_malformed_body_stops_query() {
    let server = MockServer::start().await;
    mount_page(&server, "odd", 1, organic(&["first.com"])).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "q": "odd", "page": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "q": "odd", "page": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(organic(&["never.com"])))
        .mount(&server)
        .await;
    mount_empty_fallback(&server).await;

    let dir = TempDir::new().unwrap();
    let report = coordinator(&server, &dir)
        .await
        .harvest(queries(&["odd"]))
        .await
        .expect("Harvest failed");

    assert!(matches!(
        &report.outcomes[0].stop,
        StopReason::Failed { page: 2, .. }
    ));
    let domains: Vec<_> = report.harvest.domains().into_iter().collect();
    assert_eq!(domains, vec!["first.com"]);
}

#[tokio::test]
async fn test_wrong_api_key_yields_no_records() {
    let server = MockServer::start().await;
    mount_page(&server, "coffee", 1, organic(&["acme.com"])).await;
    mount_empty_fallback(&server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/search", server.uri()), dir.path());
    let outcome = serp_harvester::run(config, queries(&["coffee"]), "wrong-key")
        .await
        .expect("Harvest failed");

    assert_eq!(outcome.record_count, 0);
    assert_eq!(outcome.results, WriteOutcome::Empty);
    assert_eq!(outcome.statistics.failed_queries, 1);
    assert!(matches!(outcome.diagnostics, WriteOutcome::Written { .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "q": "slow" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(organic(&["late.com"]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "fast", 1, organic(&["quick.com"])).await;
    mount_empty_fallback(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/search", server.uri()), dir.path());
    config.search.request_timeout_ms = 200;
    let client = SearchClient::new(&config.search, &config.user_agent, API_KEY).unwrap();

    let report = Coordinator::new(config, client)
        .unwrap()
        .harvest(queries(&["slow", "fast"]))
        .await
        .expect("Harvest failed");

    assert_eq!(report.statistics.failures["network"], 1);
    let domains: Vec<_> = report.harvest.domains().into_iter().collect();
    assert_eq!(domains, vec!["quick.com"]);
}

#[tokio::test]
async fn test_results_per_page_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "q": "coffee", "page": 1, "num": 20 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(organic(&["acme.com"])))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_fallback(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/search", server.uri()), dir.path());
    config.search.results_per_page = Some(20);

    let outcome = serp_harvester::run(config, queries(&["coffee"]), API_KEY)
        .await
        .expect("Harvest failed");

    assert_eq!(outcome.record_count, 1);
    server.verify().await;
}
