use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use wikibench::wiki::{PathFinder, WikiClient};

/// Serves a static link graph keyed by the requested title.
struct LinkGraphResponder {
    graph: HashMap<String, Vec<String>>,
}

impl LinkGraphResponder {
    fn new(edges: &[(&str, &[&str])]) -> Self {
        let graph = edges
            .iter()
            .map(|(from, tos)| {
                (
                    from.to_string(),
                    tos.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect();
        Self { graph }
    }
}

impl Respond for LinkGraphResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let title = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "titles")
            .map(|(_, v)| v.to_string())
            .unwrap_or_default();

        let links: Vec<serde_json::Value> = self
            .graph
            .get(&title)
            .map(|ls| ls.iter().map(|t| json!({ "title": t })).collect())
            .unwrap_or_default();

        ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": { "1": { "title": title, "links": links }}}
        }))
    }
}

async fn graph_server(edges: &[(&str, &[&str])]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("prop", "links"))
        .respond_with(LinkGraphResponder::new(edges))
        .mount(&server)
        .await;
    server
}

fn finder(server: &MockServer) -> PathFinder {
    let api = WikiClient::with_api_url(server.uri())
        .unwrap()
        .with_dispatch_delay(Duration::ZERO);
    PathFinder::new(api)
}

#[tokio::test]
async fn identical_endpoints_are_distance_zero_without_fetching() {
    let server = graph_server(&[]).await;
    let mut finder = finder(&server);

    let d = finder.shortest_path("Albert Einstein", "albert_einstein").await.unwrap();
    assert_eq!(d, Some(0));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn direct_link_is_one_click() {
    let server = graph_server(&[("A", &["B", "C"])]).await;
    let mut finder = finder(&server);

    assert_eq!(finder.shortest_path("A", "B").await.unwrap(), Some(1));
}

#[tokio::test]
async fn two_hop_path_is_found_breadth_first() {
    let server = graph_server(&[
        ("A", &["B", "C"]),
        ("B", &["D"]),
        ("C", &["E"]),
        ("D", &[]),
        ("E", &[]),
    ])
    .await;
    let mut finder = finder(&server);

    assert_eq!(finder.shortest_path("A", "E").await.unwrap(), Some(2));
}

#[tokio::test]
async fn goal_match_ignores_case_and_underscores() {
    let server = graph_server(&[("A", &["Deep learning"])]).await;
    let mut finder = finder(&server);

    assert_eq!(
        finder.shortest_path("A", "deep_learning").await.unwrap(),
        Some(1)
    );
}

#[tokio::test]
async fn depth_bound_stops_the_search() {
    let server = graph_server(&[("A", &["B"]), ("B", &["C"]), ("C", &["D"])]).await;
    let mut finder = finder(&server);

    assert_eq!(
        finder.shortest_path_bounded("A", "D", 2).await.unwrap(),
        None
    );
    // The same pair within a deeper bound is reachable.
    assert_eq!(
        finder.shortest_path_bounded("A", "D", 5).await.unwrap(),
        Some(3)
    );
}

#[tokio::test]
async fn unreachable_target_reports_none_not_error() {
    let server = graph_server(&[("A", &["B"]), ("B", &[])]).await;
    let mut finder = finder(&server);

    assert_eq!(finder.shortest_path("A", "Z").await.unwrap(), None);
}

#[tokio::test]
async fn link_sets_are_fetched_once_per_finder() {
    let server = graph_server(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]).await;
    let mut finder = finder(&server);

    assert_eq!(finder.shortest_path("A", "C").await.unwrap(), Some(2));
    let after_first = server.received_requests().await.unwrap().len();

    // Re-scoring from the same positions hits only the cache.
    assert_eq!(finder.remaining_distance("A", "C").await.unwrap(), Some(2));
    assert_eq!(finder.remaining_distance("B", "C").await.unwrap(), Some(1));

    let after_second = server.received_requests().await.unwrap().len();
    assert_eq!(after_first, after_second);
}
