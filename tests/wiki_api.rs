use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use wikibench::wiki::{WikiClient, WikiError};

fn client(server: &MockServer) -> WikiClient {
    WikiClient::with_api_url(server.uri())
        .unwrap()
        .with_dispatch_delay(Duration::ZERO)
}

/// Serves a fixed sequence of responses, then repeats the last one.
#[derive(Clone)]
struct SequenceResponder {
    calls: Arc<AtomicUsize>,
    responses: Vec<ResponseTemplate>,
}

impl SequenceResponder {
    fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            responses,
        }
    }
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses[n.min(self.responses.len() - 1)].clone()
    }
}

#[tokio::test]
async fn page_links_follows_continuation() {
    let server = MockServer::start().await;

    let first = ResponseTemplate::new(200).set_body_json(json!({
        "query": { "pages": { "1": {
            "title": "Start",
            "links": [ {"title": "Alpha"}, {"title": "Beta"} ]
        }}},
        "continue": { "plcontinue": "1|0|Gamma" }
    }));
    let second = ResponseTemplate::new(200).set_body_json(json!({
        "query": { "pages": { "1": {
            "title": "Start",
            "links": [ {"title": "Gamma"} ]
        }}}
    }));

    Mock::given(method("GET"))
        .and(query_param("prop", "links"))
        .respond_with(SequenceResponder::new(vec![first, second]))
        .mount(&server)
        .await;

    let links = client(&server).page_links("Start").await.unwrap();
    assert_eq!(links, vec!["Alpha", "Beta", "Gamma"]);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert!(received[1].url.query().unwrap().contains("plcontinue"));
}

#[tokio::test]
async fn three_consecutive_503s_exhaust_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).page_links("Start").await.unwrap_err();
    assert!(matches!(err, WikiError::Fetch { attempts: 3, .. }));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
}

#[tokio::test]
async fn transient_failures_recover_within_budget() {
    let server = MockServer::start().await;

    let ok = ResponseTemplate::new(200).set_body_json(json!({
        "query": { "pages": { "1": { "title": "Start", "links": [ {"title": "Alpha"} ] }}}
    }));

    Mock::given(method("GET"))
        .respond_with(SequenceResponder::new(vec![
            ResponseTemplate::new(503),
            ResponseTemplate::new(429),
            ok,
        ]))
        .mount(&server)
        .await;

    let links = client(&server).page_links("Start").await.unwrap();
    assert_eq!(links, vec!["Alpha"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn missing_page_is_not_found_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("action", "parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": "missingtitle", "info": "The page you specified doesn't exist." }
        })))
        .mount(&server)
        .await;

    let err = client(&server).page_html("Nope").await.unwrap_err();
    assert!(matches!(err, WikiError::NotFound { .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn page_html_returns_rendered_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("action", "parse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parse": { "text": { "*": "<p>hello</p>" } }
        })))
        .mount(&server)
        .await;

    let html = client(&server).page_html("Start").await.unwrap();
    assert_eq!(html, "<p>hello</p>");
}

#[tokio::test]
async fn disambiguation_flag_comes_from_pageprops() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("ppprop", "disambiguation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": { "1": { "title": "Mercury", "pageprops": { "disambiguation": "" } }}}
        })))
        .mount(&server)
        .await;

    assert!(client(&server).is_disambiguation("Mercury").await.unwrap());
}

#[tokio::test]
async fn creation_date_parses_and_missing_page_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("titles", "Old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": { "1": {
                "title": "Old",
                "revisions": [ { "timestamp": "2001-10-06T00:00:04Z" } ]
            }}}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("titles", "Ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": { "pages": { "-1": { "title": "Ghost", "missing": "" }}}
        })))
        .mount(&server)
        .await;

    let c = client(&server);
    let created = c.page_creation_date("Old").await.unwrap().unwrap();
    assert_eq!(created.to_rfc3339(), "2001-10-06T00:00:04+00:00");

    assert!(c.page_creation_date("Ghost").await.unwrap().is_none());
}
