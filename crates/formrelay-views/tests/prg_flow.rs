//! Post-Redirect-Get round trips through the submission handler and loader


use fixtures::*;
use formrelay_conf::RelaySettings;
use formrelay_core::{Error, FieldPath, FormValues, TransientRecord, ValidationOutcome};
use formrelay_http::{Handler, Method, Request, SUBMISSION_STATUS_HEADER, StatusCode};
use formrelay_store::{MemoryTransientStore, SessionToken, TransientStore};
use formrelay_views::product::{product_defaults, product_validator, product_view};
use formrelay_views::{FormRelayView, StateLoader, SubmissionHandler};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn handler(settings: &RelaySettings, store: Arc<dyn TransientStore>) -> SubmissionHandler {
	SubmissionHandler::new(
		Arc::new(settings.clone()),
		store,
		Arc::new(product_validator()),
	)
}

fn loader(settings: &RelaySettings, store: Arc<dyn TransientStore>) -> StateLoader {
	StateLoader::new(Arc::new(settings.clone()), store, product_defaults())
}

#[rstest]
#[tokio::test]
async fn test_happy_path(settings: RelaySettings, memory_store: Arc<MemoryTransientStore>) {
	// Arrange
	let view = product_view(settings, memory_store);

	// Act
	let redirect = view
		.handle(post_form(
			"name=Widget&metadata[0].name=color&metadata[0].value=red",
			None,
		))
		.await
		.unwrap();
	let token = token_from_cookies(&redirect.set_cookies()).unwrap();
	let page = view.handle(get_page(Some(&token))).await.unwrap();

	// Assert
	assert_eq!(redirect.status, StatusCode::SEE_OTHER);
	assert_eq!(redirect.headers.get("location").unwrap(), FORM_PATH);
	assert!(redirect.headers.get(SUBMISSION_STATUS_HEADER).is_none());
	assert!(redirect.body.is_empty());

	assert_eq!(page.status, StatusCode::OK);
	assert_eq!(
		json_body(&page),
		json!({
			"values": {"name": "Widget", "metadata": [{"name": "color", "value": "red"}]},
			"errors": []
		})
	);
}

#[rstest]
#[tokio::test]
async fn test_validation_failure(settings: RelaySettings, memory_store: Arc<MemoryTransientStore>) {
	// Arrange
	let view = product_view(settings, memory_store);

	// Act
	let redirect = view
		.handle(post_form("name=&metadata[0].name=&metadata[0].value=x", None))
		.await
		.unwrap();
	let token = token_from_cookies(&redirect.set_cookies()).unwrap();
	let page = view.handle(get_page(Some(&token))).await.unwrap();

	// Assert
	assert_eq!(redirect.status, StatusCode::SEE_OTHER);
	assert!(redirect.headers.get(SUBMISSION_STATUS_HEADER).is_none());
	assert_eq!(
		json_body(&page),
		json!({
			"values": {"name": "", "metadata": [{"name": "", "value": "x"}]},
			"errors": [
				{"field": "name", "message": "Server validation: Name is required"},
				{"field": "metadata[0].name", "message": "Server validation: Metadata name 0 is required"}
			]
		})
	);
}

#[rstest]
#[case::json_body("application/json", r#"{"name":"Widget"}"#)]
#[case::plain_text("text/plain", "name=Widget")]
#[case::bad_field_path("application/x-www-form-urlencoded", "metadata[x].name=a")]
#[case::multipart_without_boundary("multipart/form-data", "name=Widget")]
#[case::form_level_name("application/x-www-form-urlencoded", "name=Widget&_all=x")]
#[tokio::test]
async fn test_malformed_body_writes_nothing(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
	#[case] content_type: &str,
	#[case] body: &str,
) {
	// Arrange
	let handler = handler(&settings, memory_store.clone());
	let loader = loader(&settings, memory_store.clone());

	// Act
	let instruction = handler.handle(&post_raw(content_type, body)).await;
	let loaded = loader.load(&get_page(None)).await;

	// Assert
	assert_eq!(instruction.status, StatusCode::SEE_OTHER);
	assert_eq!(instruction.submission_status, StatusCode::BAD_REQUEST);
	assert!(instruction.cookies().is_empty());
	assert!(memory_store.is_empty());
	assert_eq!(loaded.view.values, product_defaults());
	assert!(loaded.view.errors.is_empty());
	assert!(loaded.clear_cookie.is_none());
}

#[rstest]
#[tokio::test]
async fn test_malformed_body_redirect_reports_bad_request(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	let view = product_view(settings, memory_store);

	let response = view
		.handle(post_raw("application/json", "{}"))
		.await
		.unwrap();

	assert_eq!(response.status, StatusCode::SEE_OTHER);
	assert_eq!(response.headers.get(SUBMISSION_STATUS_HEADER).unwrap(), "400");
	assert!(response.set_cookies().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_record_round_trip(settings: RelaySettings, memory_store: Arc<MemoryTransientStore>) {
	// Arrange
	let token = SessionToken::generate();
	let written = values(json!({"name": "Gadget", "metadata": []}));
	let record = TransientRecord::Valid {
		values: written.clone(),
	};
	memory_store
		.write(&token, record.encode().unwrap(), settings.record_ttl())
		.await
		.unwrap();

	// Act
	let loaded = loader(&settings, memory_store)
		.load(&get_page(Some(token.as_str())))
		.await;

	// Assert
	assert_eq!(loaded.view.values, written);
	assert!(loaded.view.errors.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_record_is_read_once(settings: RelaySettings, memory_store: Arc<MemoryTransientStore>) {
	// Arrange
	let handler = handler(&settings, memory_store.clone());
	let loader = loader(&settings, memory_store.clone());
	let instruction = handler.handle(&post_form("name=", None)).await;
	let token = token_from_cookies(&instruction.cookies()).unwrap();

	// Act
	let first = loader.load(&get_page(Some(&token))).await;
	let second = loader.load(&get_page(Some(&token))).await;

	// Assert
	assert!(first.view.has_errors());
	assert!(memory_store.is_empty());
	assert_eq!(second.view.values, product_defaults());
	assert!(second.view.errors.is_empty());
	assert!(second.clear_cookie.is_some());
}

#[rstest]
#[tokio::test]
async fn test_resubmission_overwrites_unread_record(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	// Arrange
	let handler = handler(&settings, memory_store.clone());
	let loader = loader(&settings, memory_store.clone());
	let first = handler.handle(&post_form("name=", None)).await;
	let token = token_from_cookies(&first.cookies()).unwrap();

	// Act
	let second = handler.handle(&post_form("name=Second", Some(&token))).await;
	let loaded = loader.load(&get_page(Some(&token))).await;

	// Assert
	assert_eq!(token_from_cookies(&second.cookies()), Some(token));
	assert_eq!(loaded.view.values, values(json!({"name": "Second"})));
	assert!(loaded.view.errors.is_empty());
	assert!(memory_store.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_malformed_token_cookie_is_replaced(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	let handler = handler(&settings, memory_store.clone());

	let instruction = handler.handle(&post_form("name=Widget", Some("not!valid"))).await;

	let token = token_from_cookies(&instruction.cookies()).unwrap();
	assert_ne!(token, "not!valid");
	assert!(SessionToken::parse(&token).is_some());
	assert_eq!(memory_store.len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_store_failure_redirects_with_server_error(settings: RelaySettings) {
	// Arrange
	let view = product_view(settings, Arc::new(FailingStore));

	// Act
	let response = view
		.handle(post_form("name=Widget", None))
		.await
		.unwrap();

	// Assert
	assert_eq!(response.status, StatusCode::SEE_OTHER);
	assert_eq!(response.headers.get("location").unwrap(), FORM_PATH);
	assert_eq!(response.headers.get(SUBMISSION_STATUS_HEADER).unwrap(), "500");
	assert!(response.set_cookies().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_validator_fault_redirects_with_server_error(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	// Arrange
	let faulty = |_: FormValues| -> formrelay_core::Result<ValidationOutcome> {
		Err(Error::Internal("rules unavailable".to_string()))
	};
	let handler = SubmissionHandler::new(Arc::new(settings), memory_store.clone(), Arc::new(faulty));

	// Act
	let instruction = handler.handle(&post_form("name=Widget", None)).await;

	// Assert
	assert_eq!(instruction.submission_status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(instruction.cookies().is_empty());
	assert!(memory_store.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_store_read_failure_loads_defaults(settings: RelaySettings) {
	let loader = loader(&settings, Arc::new(FailingStore));

	let loaded = loader.load(&get_page(Some("abc123"))).await;

	assert_eq!(loaded.view.values, product_defaults());
	assert!(loaded.view.errors.is_empty());
	assert!(loaded.clear_cookie.is_some());
}

#[rstest]
#[tokio::test]
async fn test_unparseable_record_is_discarded(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	// Arrange
	let token = SessionToken::generate();
	memory_store
		.write(&token, "{not json".to_string(), settings.record_ttl())
		.await
		.unwrap();

	// Act
	let loaded = loader(&settings, memory_store.clone())
		.load(&get_page(Some(token.as_str())))
		.await;

	// Assert
	assert_eq!(loaded.view.values, product_defaults());
	assert!(loaded.view.errors.is_empty());
	assert!(memory_store.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_expired_record_is_ignored(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	let token = SessionToken::generate();
	let record = TransientRecord::Valid {
		values: values(json!({"name": "Stale"})),
	};
	memory_store
		.write(&token, record.encode().unwrap(), Duration::ZERO)
		.await
		.unwrap();

	let loaded = loader(&settings, memory_store)
		.load(&get_page(Some(token.as_str())))
		.await;

	assert_eq!(loaded.view.values, product_defaults());
}

#[rstest]
#[tokio::test]
async fn test_query_string_prefills_defaults(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	let loader = loader(&settings, memory_store);

	let prefilled = loader
		.load(&get_uri("/server-integration?name=Prefilled", None))
		.await;
	let garbled = loader
		.load(&get_uri("/server-integration?metadata%5Boops%5D=1", None))
		.await;

	assert_eq!(
		prefilled.view.value_at(&FieldPath::key("name")),
		Some(&json!("Prefilled"))
	);
	assert_eq!(prefilled.view.values.get("metadata"), Some(&json!([])));
	assert_eq!(garbled.view.values, product_defaults());
}

#[rstest]
#[tokio::test]
async fn test_loaded_page_clears_token_cookie(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	let view = product_view(settings, memory_store);

	let with_token = view.handle(get_page(Some("abc123"))).await.unwrap();
	let without_token = view.handle(get_page(None)).await.unwrap();

	let cleared = with_token.set_cookies();
	assert_eq!(cleared.len(), 1);
	assert!(cleared[0].starts_with(&format!("{}=;", COOKIE_NAME)));
	assert!(cleared[0].contains("Max-Age=0"));
	assert!(without_token.set_cookies().is_empty());
}

#[rstest]
#[case(Method::PUT)]
#[case(Method::DELETE)]
#[tokio::test]
async fn test_other_methods_are_rejected(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
	#[case] method: Method,
) {
	let view = product_view(settings, memory_store);
	let request = Request::builder()
		.method(method)
		.uri(FORM_PATH)
		.build()
		.unwrap();

	let response = view.handle(request).await.unwrap();

	assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
	assert_eq!(response.headers.get("allow").unwrap(), "GET, HEAD, POST");
}

#[rstest]
#[tokio::test]
async fn test_head_has_no_body(settings: RelaySettings, memory_store: Arc<MemoryTransientStore>) {
	let view = product_view(settings, memory_store);
	let request = Request::builder()
		.method(Method::HEAD)
		.uri(FORM_PATH)
		.build()
		.unwrap();

	let response = view.handle(request).await.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert!(response.body.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_concurrent_submissions_leave_one_record(
	settings: RelaySettings,
	memory_store: Arc<MemoryTransientStore>,
) {
	// Arrange
	let view = Arc::new(product_view(settings, memory_store.clone()));
	let token = SessionToken::generate().to_string();

	// Act
	let tasks: Vec<_> = ["name=A", "name=B", "name=C"]
		.into_iter()
		.map(|body| {
			let view: Arc<FormRelayView> = Arc::clone(&view);
			let request = post_form(body, Some(&token));
			tokio::spawn(async move { view.handle(request).await })
		})
		.collect();
	for task in tasks {
		task.await.unwrap().unwrap();
	}
	let page = view.handle(get_page(Some(&token))).await.unwrap();

	// Assert
	let name = json_body(&page)["values"]["name"].clone();
	assert!(["A", "B", "C"].iter().any(|n| name == json!(n)));
	assert!(memory_store.is_empty());
}
