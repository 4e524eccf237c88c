use std::sync::{Arc, Mutex};

#[cfg(test)]
use super::*;

use crate::response::ExperimentAssignment;

type Call = (String, Option<RequestOptions>);

#[derive(Clone)]
struct RecordingClient {
    calls: Arc<Mutex<Vec<Call>>>,
    body: Vec<u8>,
    fail: bool,
}

impl RecordingClient {
    fn with_body(body: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            body: body.as_bytes().to_vec(),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_body("{}")
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ExplatHttpClient for RecordingClient {
    fn new() -> Self {
        Self::with_body("{}")
    }

    fn get(
        &self,
        url: &str,
        options: Option<RequestOptions>,
    ) -> impl Future<Output = Result<Vec<u8>, ExplatError>> + Send {
        self.calls.lock().unwrap().push((url.to_string(), options));
        let result = if self.fail {
            Err(error!(ErrorKind::TransportFailure, "connection refused"))
        } else {
            Ok(self.body.clone())
        };
        async move { result }
    }
}

fn test_filter(mut args: RequestArgs) -> RequestArgs {
    args.insert("test", "test");
    args
}

fn client_with_test_filter(client: RecordingClient) -> ExplatClient<RecordingClient> {
    let mut explat = ExplatClientOpts::default().with_client(client);
    explat.filters_mut().add_filter("test", test_filter);
    explat
}

#[tokio::test]
async fn applies_request_args_filter_before_building_public_url() {
    let client = RecordingClient::new();
    let explat = client_with_test_filter(client.clone());

    let resp = explat
        .fetch_experiment_assignment(&AssignmentRequest::new("123", "abc"))
        .await
        .expect("fetch should succeed");

    assert_eq!(resp, serde_json::json!({}));
    assert_eq!(
        client.calls(),
        vec![(
            "https://public-api.wordpress.com/wpcom/v2/experiments/0.1.0/assignments/woocommerce?experiment_name=123&anon_id=abc&test=test".to_string(),
            None
        )]
    );
}

#[tokio::test]
async fn applies_request_args_filter_before_building_auth_url() {
    let client = RecordingClient::new();
    let explat = client_with_test_filter(client.clone());

    explat
        .fetch_experiment_assignment_with_auth(&AssignmentRequest::new("123", "abc"))
        .await
        .expect("fetch should succeed");

    let calls = client.calls();
    assert_eq!(calls.len(), 1);

    let (url, options) = &calls[0];
    assert_eq!(
        url,
        "/wc-admin/experiments/assignment?experiment_name=123&anon_id=abc&test=test&_locale=user"
    );

    let options = options.as_ref().expect("auth request carries options");
    assert_eq!(options.credentials, Credentials::Include);
    assert_eq!(options.body, None);
    assert_eq!(options.headers.len(), 1);
    assert_eq!(
        options.headers.get("Accept").map(String::as_str),
        Some("application/json, */*;q=0.1")
    );
}

#[tokio::test]
async fn public_url_without_filters() {
    let client = RecordingClient::new();
    let explat = ExplatClientOpts::default().with_client(client.clone());

    explat
        .fetch_experiment_assignment(&AssignmentRequest::new("woo banner", "a/b"))
        .await
        .unwrap();

    assert_eq!(
        client.calls()[0].0,
        format!("{ASSIGNMENT_URL}?experiment_name=woo%20banner&anon_id=a%2Fb")
    );
}

#[tokio::test]
async fn rejects_missing_anon_id_while_tracking_enabled() {
    let client = RecordingClient::new();
    let explat = client_with_test_filter(client.clone());

    let err = explat
        .fetch_experiment_assignment(&AssignmentRequest::anonymous("123"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn rejects_empty_anon_id_while_tracking_enabled() {
    let client = RecordingClient::new();
    let explat = ExplatClientOpts::default().with_client(client.clone());

    let err = explat
        .fetch_experiment_assignment_with_auth(&AssignmentRequest::new("123", ""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn rejects_empty_or_missing_experiment_name() {
    let client = RecordingClient::new();
    let explat = client_with_test_filter(client.clone());

    let empty = AssignmentRequest {
        experiment_name: Some(String::new()),
        anon_id: None,
    };
    let missing = AssignmentRequest::default();

    for request in [empty, missing] {
        let err = explat.fetch_experiment_assignment(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = explat
            .fetch_experiment_assignment_with_auth(&request)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn experiment_name_is_required_even_without_tracking() {
    let client = RecordingClient::new();
    let explat = ExplatClientOptsBuilder::default()
        .tracking_enabled(false)
        .build()
        .unwrap()
        .with_client(client.clone());

    let err = explat
        .fetch_experiment_assignment(&AssignmentRequest::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn missing_anon_id_is_omitted_when_tracking_disabled() {
    let client = RecordingClient::new();
    let explat = ExplatClientOptsBuilder::default()
        .tracking_enabled(false)
        .build()
        .unwrap()
        .with_client(client.clone());

    explat
        .fetch_experiment_assignment(&AssignmentRequest::anonymous("123"))
        .await
        .unwrap();

    assert_eq!(
        client.calls()[0].0,
        format!("{ASSIGNMENT_URL}?experiment_name=123")
    );
}

#[tokio::test]
async fn locale_survives_filter_mutation() {
    let client = RecordingClient::new();
    let mut explat = ExplatClientOpts::default().with_client(client.clone());
    explat
        .filters_mut()
        .add_filter("locale", |mut args: RequestArgs| {
            args.insert("_locale", "fr_FR");
            args.remove("anon_id");
            args
        });

    explat
        .fetch_experiment_assignment_with_auth(&AssignmentRequest::new("123", "abc"))
        .await
        .unwrap();

    assert_eq!(
        client.calls()[0].0,
        "/wc-admin/experiments/assignment?experiment_name=123&_locale=user"
    );
}

#[tokio::test]
async fn auth_request_resolves_against_admin_root_and_sends_cookie() {
    let client = RecordingClient::new();
    let explat = ExplatClientOptsBuilder::default()
        .admin_root("https://store.example/wp-json/")
        .admin_cookie("wordpress_logged_in=abc")
        .build()
        .unwrap()
        .with_client(client.clone());

    explat
        .fetch_experiment_assignment_with_auth(&AssignmentRequest::new("123", "abc"))
        .await
        .unwrap();

    let calls = client.calls();
    let (url, options) = &calls[0];
    assert_eq!(
        url,
        "https://store.example/wp-json/wc-admin/experiments/assignment?experiment_name=123&anon_id=abc&_locale=user"
    );
    let options = options.as_ref().unwrap();
    assert_eq!(
        options.headers.get("Cookie").map(String::as_str),
        Some("wordpress_logged_in=abc")
    );
}

#[tokio::test]
async fn transport_failure_propagates() {
    let client = RecordingClient::failing();
    let explat = ExplatClientOpts::default().with_client(client.clone());

    let err = explat
        .fetch_experiment_assignment(&AssignmentRequest::new("123", "abc"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportFailure);
    assert_eq!(err.message(), "connection refused");
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let client = RecordingClient::with_body("<html>502</html>");
    let explat = ExplatClientOpts::default().with_client(client);

    let err = explat
        .fetch_experiment_assignment(&AssignmentRequest::new("123", "abc"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn typed_assignment_response() {
    let client =
        RecordingClient::with_body(r#"{"variations":{"123":"treatment"},"ttl":60}"#);
    let explat = ExplatClientOpts::default().with_client(client);

    let assignment = explat
        .fetch_experiment_assignment_with_auth_as::<ExperimentAssignment>(
            &AssignmentRequest::new("123", "abc"),
        )
        .await
        .unwrap();

    assert_eq!(assignment.variation("123"), Some("treatment"));
    assert_eq!(assignment.ttl, 60);
}

#[tokio::test]
async fn free_functions_take_collaborators_explicitly() {
    let client = RecordingClient::new();
    let opts = ExplatClientOpts::default();
    let mut filters = FilterPipeline::default();
    filters.add_filter("test", test_filter);

    let request = AssignmentRequest::new("123", "abc");
    fetch_experiment_assignment(&client, &opts, &filters, &request)
        .await
        .unwrap();
    fetch_experiment_assignment_with_auth(&client, &opts, &filters, &request)
        .await
        .unwrap();

    let urls: Vec<String> = client.calls().into_iter().map(|(url, _)| url).collect();
    assert_eq!(
        urls,
        vec![
            format!("{ASSIGNMENT_URL}?experiment_name=123&anon_id=abc&test=test"),
            "/wc-admin/experiments/assignment?experiment_name=123&anon_id=abc&test=test&_locale=user"
                .to_string(),
        ]
    );
}

#[test]
fn build_urls_without_sending() {
    let explat = client_with_test_filter(RecordingClient::new());
    let request = AssignmentRequest::new("123", "abc");

    assert_eq!(
        explat.build_assignment_url(&request).unwrap(),
        format!("{ASSIGNMENT_URL}?experiment_name=123&anon_id=abc&test=test")
    );
    assert_eq!(
        explat.build_assignment_url_with_auth(&request).unwrap(),
        "/wc-admin/experiments/assignment?experiment_name=123&anon_id=abc&test=test&_locale=user"
    );
}

#[test]
fn validator_only_checks_emptiness() {
    let odd_name = AssignmentRequest::new("not a valid name!", "x");
    assert!(validate_assignment_request(&odd_name, true).is_ok());
    assert!(validate_assignment_request(&AssignmentRequest::anonymous("123"), false).is_ok());
    assert!(validate_assignment_request(&AssignmentRequest::anonymous("123"), true).is_err());
}

#[test]
fn default_opts_match_builder_defaults() {
    let built = ExplatClientOptsBuilder::default().build().unwrap();
    assert_eq!(ExplatClientOpts::default(), built);
    assert!(built.tracking_enabled());
    assert_eq!(built.locale, DEFAULT_LOCALE);
}

#[test]
fn base_urls_with_existing_query_continue_with_ampersand() {
    let explat = ExplatClientOptsBuilder::default()
        .assignment_url("https://proxy.example/explat?site=1")
        .admin_root("https://store.example/?rest_route=")
        .build()
        .unwrap()
        .with_client(RecordingClient::new());
    let request = AssignmentRequest::new("woo(banner)!", "abc");

    assert_eq!(
        explat.build_assignment_url(&request).unwrap(),
        "https://proxy.example/explat?site=1&experiment_name=woo(banner)!&anon_id=abc"
    );
    assert_eq!(
        explat.build_assignment_url_with_auth(&request).unwrap(),
        "https://store.example/?rest_route=/wc-admin/experiments/assignment&experiment_name=woo(banner)!&anon_id=abc&_locale=user"
    );
}
