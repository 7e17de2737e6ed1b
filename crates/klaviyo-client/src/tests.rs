//! End-to-end tests against a local mock of the Klaviyo API.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use klaviyo_core::{Attributes, Consent, Profile};
use serde_json::json;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{any, body_json, header, method, path, query_param, query_param_is_missing},
};

use crate::{Client, ClientConfig, ContentKind, Error, ErrorKind, ListIdentifiers};

const PUBLIC_KEY: &str = "pk_public";
const PRIVATE_KEY: &str = "pk_private";

fn client_for(server: &MockServer) -> Client {
  Client::new(ClientConfig {
    base_url:    server.uri(),
    public_key:  Some(PUBLIC_KEY.into()),
    private_key: Some(PRIVATE_KEY.into()),
    timeout:     Duration::from_secs(5),
  })
  .expect("client")
}

fn keyless_client_for(server: &MockServer) -> Client {
  Client::new(ClientConfig {
    base_url: server.uri(),
    ..Default::default()
  })
  .expect("client")
}

/// Fails the test on drop if the server saw any request at all.
async fn expect_no_requests(server: &MockServer) {
  Mock::given(any())
    .respond_with(ResponseTemplate::new(500))
    .expect(0)
    .mount(server)
    .await;
}

fn kitty() -> Profile {
  Profile {
    email: "kitty@example.com".into(),
    first_name: "Kitty".into(),
    attributes: Attributes::from_iter([("IsTest", true)]),
    ..Default::default()
  }
}

fn person_body() -> serde_json::Value {
  json!({
    "object": "person",
    "id": "01ABC",
    "$email": "kitty@example.com",
    "$first_name": "Kitty",
    "$city": "Vancouver",
    "$consent": ["email", "sms"],
    "$latitude": 49.2827,
    "$not_yet_documented": "dropped",
    "LikesGold": "1",
    "IsTest": true,
  })
}

// ─── Identify ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn identify_sends_base64_payload_with_public_token() {
  let server = MockServer::start().await;
  let expected = B64.encode(
    serde_json::to_vec(&json!({
      "token": PUBLIC_KEY,
      "properties": {
        "$email": "kitty@example.com",
        "$first_name": "Kitty",
        "IsTest": true,
      },
    }))
    .unwrap(),
  );

  Mock::given(method("GET"))
    .and(path("/identify"))
    .and(query_param("data", expected.as_str()))
    .and(query_param_is_missing("api_key"))
    .and(header("accept", "text/html"))
    .respond_with(ResponseTemplate::new(200).set_body_raw("1", "text/html; charset=utf-8"))
    .expect(1)
    .mount(&server)
    .await;

  client_for(&server).identify(&kitty()).await.unwrap();
}

#[tokio::test]
async fn identify_sentinel_mismatch_is_a_logical_failure() {
  let server = MockServer::start().await;
  Mock::given(path("/identify"))
    .respond_with(ResponseTemplate::new(200).set_body_raw("0", "text/html"))
    .mount(&server)
    .await;

  let err = client_for(&server).identify(&kitty()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::LogicalFailure);
  assert!(matches!(err, Error::Rejected { operation: "identify", ref body } if body == "0"));
}

#[tokio::test]
async fn identify_accepts_a_json_labelled_sentinel() {
  let server = MockServer::start().await;
  Mock::given(path("/identify"))
    .respond_with(ResponseTemplate::new(200).set_body_raw("1", "application/json"))
    .expect(1)
    .mount(&server)
    .await;

  client_for(&server).identify(&kitty()).await.unwrap();
}

#[tokio::test]
async fn identify_requires_an_identifier() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let mut p = kitty();
  p.email = "  ".into();
  let err = client_for(&server).identify(&p).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);
  assert!(matches!(err, Error::MissingIdentifier));
}

#[tokio::test]
async fn identify_requires_the_public_key() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let err = keyless_client_for(&server).identify(&kitty()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Configuration);
  assert!(matches!(err, Error::MissingCredential("public key")));
}

// ─── Get profile ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_profile_splits_reserved_fields_from_attributes() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/v1/person/01ABC"))
    .and(query_param("api_key", PRIVATE_KEY))
    .and(header("accept", "application/json"))
    .respond_with(ResponseTemplate::new(200).set_body_json(person_body()))
    .expect(1)
    .mount(&server)
    .await;

  let p = client_for(&server).get_profile("01ABC").await.unwrap();
  assert_eq!(p.id, "01ABC");
  assert_eq!(p.object_kind, "person");
  assert_eq!(p.email, "kitty@example.com");
  assert_eq!(p.city, "Vancouver");
  assert_eq!(p.latitude, "49.2827");
  assert_eq!(p.consent, vec![Consent::Email, Consent::Sms]);
  assert_eq!(p.attributes.len(), 2);
  assert!(p.attributes.parse_bool("LikesGold"));
  assert!(p.attributes.parse_bool("IsTest"));
  assert!(!p.attributes.contains_key("$not_yet_documented"));
}

#[tokio::test]
async fn get_profile_requires_the_private_key() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let err = keyless_client_for(&server).get_profile("01ABC").await.unwrap_err();
  assert!(matches!(err, Error::MissingCredential("private key")));
}

#[tokio::test]
async fn get_profile_requires_an_id() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let err = client_for(&server).get_profile("").await.unwrap_err();
  assert!(matches!(err, Error::MissingProfileId));
}

#[tokio::test]
async fn missing_credential_is_reported_before_bad_input() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;
  let client = keyless_client_for(&server);

  let err = client.get_profile("").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Configuration);
  let err = client.update_profile(&kitty()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Configuration);
  let err = client
    .in_list(" ", &ListIdentifiers::default())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Configuration);
  let err = client.subscribe("", &[Profile::default()]).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Configuration);
  let err = client
    .unsubscribe("", &ListIdentifiers::default())
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn html_body_for_a_json_target_is_a_type_mismatch() {
  let server = MockServer::start().await;
  Mock::given(path("/v1/person/01ABC"))
    .respond_with(ResponseTemplate::new(200).set_body_raw("<p>hi</p>", "text/html"))
    .mount(&server)
    .await;

  let err = client_for(&server).get_profile("01ABC").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Decode);
  assert!(matches!(
    err,
    Error::ContentTypeMismatch {
      expected: ContentKind::Json,
      actual:   ContentKind::Text,
    }
  ));
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
  let server = MockServer::start().await;
  Mock::given(path("/v1/person/01ABC"))
    .respond_with(ResponseTemplate::new(200).set_body_raw("{\"$email\": ", "application/json"))
    .mount(&server)
    .await;

  let err = client_for(&server).get_profile("01ABC").await.unwrap_err();
  assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn mistyped_reserved_field_is_a_decode_error() {
  let server = MockServer::start().await;
  Mock::given(path("/v1/person/01ABC"))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(json!({ "id": "01ABC", "$consent": "email" })),
    )
    .mount(&server)
    .await;

  let err = client_for(&server).get_profile("01ABC").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Decode);
  assert!(err.to_string().contains("$consent"));
}

// ─── Remote errors ───────────────────────────────────────────────────────────

#[tokio::test]
async fn json_error_body_prefers_message() {
  let server = MockServer::start().await;
  Mock::given(path("/v1/person/missing"))
    .respond_with(
      ResponseTemplate::new(404)
        .set_body_json(json!({ "message": "Person not found", "detail": "no such id" })),
    )
    .mount(&server)
    .await;

  let err = client_for(&server).get_profile("missing").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Remote);
  let Error::Api(api) = err else { panic!("expected an API error") };
  assert_eq!(api.status, 404);
  assert_eq!(api.reason(), "Person not found");
  assert!(api.raw.contains("no such id"));
}

#[tokio::test]
async fn json_error_body_falls_back_to_detail() {
  let server = MockServer::start().await;
  Mock::given(path("/v1/person/missing"))
    .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "bad key" })))
    .mount(&server)
    .await;

  let Error::Api(api) = client_for(&server).get_profile("missing").await.unwrap_err() else {
    panic!("expected an API error")
  };
  assert_eq!(api.reason(), "bad key");
}

#[tokio::test]
async fn json_error_body_with_null_message_uses_detail() {
  let server = MockServer::start().await;
  Mock::given(path("/v1/person/missing"))
    .respond_with(
      ResponseTemplate::new(400)
        .set_body_json(json!({ "message": null, "detail": "bad key" })),
    )
    .mount(&server)
    .await;

  let Error::Api(api) = client_for(&server).get_profile("missing").await.unwrap_err() else {
    panic!("expected an API error")
  };
  assert_eq!(api.reason(), "bad key");
}

#[tokio::test]
async fn text_error_body_is_kept_whole() {
  let server = MockServer::start().await;
  Mock::given(path("/v1/person/missing"))
    .respond_with(ResponseTemplate::new(502).set_body_raw("<h1>Bad Gateway</h1>", "text/html"))
    .mount(&server)
    .await;

  let Error::Api(api) = client_for(&server).get_profile("missing").await.unwrap_err() else {
    panic!("expected an API error")
  };
  assert_eq!(api.status, 502);
  assert_eq!(api.reason(), "<h1>Bad Gateway</h1>");
  assert_eq!(api.raw, "<h1>Bad Gateway</h1>");
}

#[tokio::test]
async fn non_ok_success_status_is_still_an_error() {
  let server = MockServer::start().await;
  Mock::given(path("/v1/person/01ABC"))
    .respond_with(ResponseTemplate::new(202).set_body_json(person_body()))
    .mount(&server)
    .await;

  let err = client_for(&server).get_profile("01ABC").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Remote);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
  // Port 1 is reserved and nothing listens on it.
  let client = Client::new(ClientConfig {
    base_url: "http://127.0.0.1:1".into(),
    private_key: Some(PRIVATE_KEY.into()),
    timeout: Duration::from_secs(2),
    ..Default::default()
  })
  .unwrap();

  let err = client.get_profile("01ABC").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Transport);
  assert!(!err.to_string().contains(PRIVATE_KEY));
}

// ─── Update profile ──────────────────────────────────────────────────────────

#[tokio::test]
async fn update_profile_sends_properties_as_query_pairs() {
  let server = MockServer::start().await;
  Mock::given(method("PUT"))
    .and(path("/v1/person/01ABC"))
    .and(query_param("api_key", PRIVATE_KEY))
    .and(query_param("$email", "kitty@example.com"))
    .and(query_param("$consent", r#"["email"]"#))
    .and(query_param("LikesGold", "false"))
    .and(query_param_is_missing("id"))
    .and(query_param_is_missing("object"))
    .and(query_param_is_missing("$city"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "object": "person",
      "id": "01ABC",
      "$email": "kitty@example.com",
      "$consent": ["email"],
      "LikesGold": "false",
    })))
    .expect(1)
    .mount(&server)
    .await;

  let profile = Profile {
    id: "01ABC".into(),
    object_kind: "person".into(),
    email: "kitty@example.com".into(),
    consent: vec![Consent::Email],
    attributes: Attributes::from_iter([("LikesGold", false)]),
    ..Default::default()
  };
  let updated = client_for(&server).update_profile(&profile).await.unwrap();
  assert_eq!(updated.id, "01ABC");
  assert!(!updated.attributes.parse_bool("LikesGold"));
}

#[tokio::test]
async fn update_profile_requires_an_id() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let err = client_for(&server).update_profile(&kitty()).await.unwrap_err();
  assert!(matches!(err, Error::MissingProfileId));
}

// ─── Lists ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn in_list_with_no_identifiers_makes_no_request() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let members = client_for(&server)
    .in_list("LIST1", &ListIdentifiers::default())
    .await
    .unwrap();
  assert!(members.is_empty());
}

#[tokio::test]
async fn in_list_joins_identifiers() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/v2/list/LIST1/members"))
    .and(query_param("api_key", PRIVATE_KEY))
    .and(query_param("emails", "kitty@example.com,other@example.com"))
    .and(query_param("phone_numbers", "+1234567890"))
    .and(query_param_is_missing("push_tokens"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      { "id": "A1", "email": "kitty@example.com", "created": "2019-08-23 20:45:24" },
    ])))
    .expect(1)
    .mount(&server)
    .await;

  let who = ListIdentifiers {
    emails: vec!["kitty@example.com".into(), "other@example.com".into()],
    phone_numbers: vec!["+1234567890".into()],
    ..Default::default()
  };
  let members = client_for(&server).in_list("LIST1", &who).await.unwrap();
  assert_eq!(members.len(), 1);
  assert_eq!(members[0].email, "kitty@example.com");
  assert_eq!(members[0].phone_number, "");
}

#[tokio::test]
async fn subscribe_posts_outbound_profiles() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v2/list/LIST1/subscribe"))
    .and(query_param("api_key", PRIVATE_KEY))
    .and(body_json(json!({
      "profiles": [
        { "$email": "kitty@example.com", "$first_name": "Kitty", "IsTest": true },
      ],
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      { "id": "A1", "email": "kitty@example.com" },
    ])))
    .expect(1)
    .mount(&server)
    .await;

  let members = client_for(&server).subscribe("LIST1", &[kitty()]).await.unwrap();
  assert_eq!(members[0].id, "A1");
}

#[tokio::test]
async fn subscribe_with_no_profiles_makes_no_request() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let members = client_for(&server).subscribe("LIST1", &[]).await.unwrap();
  assert!(members.is_empty());
}

#[tokio::test]
async fn subscribe_rejects_profiles_without_identifiers() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let err = client_for(&server)
    .subscribe("LIST1", &[kitty(), Profile::default()])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingIdentifier));
}

#[tokio::test]
async fn unsubscribe_sends_identifier_arrays() {
  let server = MockServer::start().await;
  Mock::given(method("DELETE"))
    .and(path("/v2/list/LIST1/subscribe"))
    .and(query_param("api_key", PRIVATE_KEY))
    .and(body_json(json!({ "emails": ["kitty@example.com"] })))
    .respond_with(ResponseTemplate::new(200))
    .expect(1)
    .mount(&server)
    .await;

  client_for(&server)
    .unsubscribe("LIST1", &ListIdentifiers::emails(["kitty@example.com"]))
    .await
    .unwrap();
}

#[tokio::test]
async fn unsubscribe_with_no_identifiers_makes_no_request() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  client_for(&server)
    .unsubscribe("LIST1", &ListIdentifiers::default())
    .await
    .unwrap();
}

#[tokio::test]
async fn list_operations_require_a_list_id() {
  let server = MockServer::start().await;
  expect_no_requests(&server).await;

  let err = client_for(&server)
    .unsubscribe(" ", &ListIdentifiers::emails(["kitty@example.com"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingListId));
}
