//! Integration tests for the API façade against a mock backend

use joali_core::config::{ApiConfig, Config};
use joali_core::models::{CustomerRegistration, NewServiceOrder, ServiceFilter, UserRole};
use joali_core::{
    ApiError, FileStorage, JoaliClient, Session, SessionState, SignOutReason, TokenPair,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

fn client_for(server: &ServerGuard, session: Session) -> JoaliClient {
    let api = ApiConfig {
        base_url: server.url(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
    };
    JoaliClient::with_api_config(&api, session).expect("client should build")
}

fn signed_in(access: &str, refresh: &str) -> Session {
    let session = Session::in_memory();
    session.store_tokens(&TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        role: None,
    });
    session
}

#[tokio::test]
async fn login_stores_tokens_and_authenticates_later_calls() {
    //* Given
    let mut server = Server::new_async().await;
    let session = Session::in_memory();

    let login = server
        .mock("POST", "/api/Auth/Login")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({
            "email": "ana@joali.mv",
            "password": "hunter2",
            "apiKey": "test-key"
        })))
        .with_status(200)
        .with_body(
            json!({
                "token": {"accessToken": "AT1", "refreshToken": "RT1"},
                "userId": 17,
                "userName": "Ana",
                "role": "Admin"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let users = server
        .mock("GET", "/api/User/AllUsers")
        .match_query(Matcher::UrlEncoded("apiKey".into(), "test-key".into()))
        .match_header("authorization", "Bearer AT1")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, session.clone());
    let identity = client
        .login("ana@joali.mv", "hunter2")
        .await
        .expect("login should succeed");
    let listed = client.get_all_users().await;

    //* Then
    login.assert_async().await;
    users.assert_async().await;
    assert_eq!(identity.user_id.as_deref(), Some("17"));
    assert_eq!(identity.user_name.as_deref(), Some("Ana"));
    assert_eq!(identity.role, Some(UserRole::Admin));
    assert_eq!(session.access_token().as_deref(), Some("AT1"));
    assert_eq!(session.refresh_token().as_deref(), Some("RT1"));
    assert_eq!(session.role(), Some(UserRole::Admin));
    assert!(tokio_test::assert_ok!(listed).is_empty());
}

#[tokio::test]
async fn login_failure_uses_backend_message_and_keeps_session_empty() {
    //* Given
    let mut server = Server::new_async().await;
    let session = Session::in_memory();

    server
        .mock("POST", "/api/Auth/Login")
        .with_status(400)
        .with_body(r#"{"message": "Invalid credentials"}"#)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, session.clone());
    let err = tokio_test::assert_err!(client.login("ana@joali.mv", "wrong").await);

    //* Then
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn login_failure_without_message_uses_fallback() {
    //* Given
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/api/Auth/Login")
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    //* When
    let client = client_for(&server, Session::in_memory());
    let err = tokio_test::assert_err!(client.login("ana@joali.mv", "pw").await);

    //* Then
    assert_eq!(err.to_string(), "Login failed");
}

#[tokio::test]
async fn login_without_token_pair_is_malformed() {
    //* Given
    let mut server = Server::new_async().await;
    let session = Session::in_memory();

    server
        .mock("POST", "/api/Auth/Login")
        .with_status(200)
        .with_body(r#"{"token": {"accessToken": "AT1"}}"#)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, session.clone());
    let result = client.login("ana@joali.mv", "pw").await;

    //* Then
    assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    assert_eq!(session.access_token(), None);
}

#[tokio::test]
async fn logout_without_token_makes_no_request() {
    //* Given
    let mut server = Server::new_async().await;
    let logout = server
        .mock("POST", "/api/Auth/Logout")
        .expect(0)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, Session::in_memory());
    let result = client.logout().await;

    //* Then
    logout.assert_async().await;
    let err = tokio_test::assert_err!(result);
    assert!(matches!(err, ApiError::NoAccessToken));
    assert_eq!(err.to_string(), "No access token found");
}

#[tokio::test]
async fn logout_clears_session_and_publishes_sign_out() {
    //* Given
    let mut server = Server::new_async().await;
    let session = signed_in("AT1", "RT1");
    let events = session.subscribe();

    let logout = server
        .mock("POST", "/api/Auth/Logout")
        .match_header("authorization", "Bearer AT1")
        .with_status(200)
        .with_body(r#"{"message": "Logged out"}"#)
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, session.clone());
    let body = client.logout().await.expect("logout should succeed");

    //* Then
    logout.assert_async().await;
    assert_eq!(body, Some(json!({"message": "Logged out"})));
    assert!(!session.is_authenticated());
    assert_eq!(
        *events.borrow(),
        SessionState::SignedOut {
            reason: Some(SignOutReason::Logout)
        }
    );
}

#[tokio::test]
async fn empty_and_malformed_listings_yield_empty_lists() {
    //* Given
    let mut server = Server::new_async().await;
    let session = signed_in("AT1", "RT1");

    server
        .mock("GET", "/api/Organization")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;
    server
        .mock("GET", "/api/ServiceOrder/MyOrders")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;
    server
        .mock("GET", "/api/Service")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, session);
    let orgs = client.get_all_organizations(None).await;
    let orders = client.get_my_orders().await;
    let services = client.get_all_services(&ServiceFilter::default()).await;

    //* Then
    assert!(tokio_test::assert_ok!(orgs).is_empty());
    assert!(tokio_test::assert_ok!(orders).is_empty());
    assert!(tokio_test::assert_ok!(services).is_empty());
}

#[tokio::test]
async fn listing_error_status_is_surfaced_with_fallback() {
    //* Given
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/api/Organization")
        .with_status(503)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, signed_in("AT1", "RT1"));
    let err = tokio_test::assert_err!(client.get_all_organizations(None).await);

    //* Then
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.to_string(), "Failed to fetch organizations");
}

#[tokio::test]
async fn organization_type_filter_is_sent_as_query() {
    //* Given
    let mut server = Server::new_async().await;

    let orgs = server
        .mock("GET", "/api/Organization")
        .match_query(Matcher::UrlEncoded("orgtype".into(), "2".into()))
        .with_status(200)
        .with_body(
            r#"[{"id": 4, "name": "Island Ferries", "type": 2, "isActive": true, "extra": "ignored"}]"#,
        )
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, signed_in("AT1", "RT1"));
    let listed = client
        .get_all_organizations(Some(2))
        .await
        .expect("listing should succeed");

    //* Then
    orgs.assert_async().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].org_type, 2);
    assert!(listed[0].is_active);
}

#[tokio::test]
async fn single_record_with_empty_body_is_none() {
    //* Given
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/api/Organization/9")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;
    server
        .mock("GET", "/api/Organization/10")
        .with_status(404)
        .with_body(r#"{"message": "Organization not found"}"#)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, signed_in("AT1", "RT1"));
    let empty = client.get_organization_by_id(9).await;
    let missing = client.get_organization_by_id(10).await;

    //* Then
    assert_eq!(tokio_test::assert_ok!(empty), None);
    let err = tokio_test::assert_err!(missing);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Organization not found");
}

#[tokio::test]
async fn customer_registration_is_unauthenticated_and_carries_api_key() {
    //* Given
    let mut server = Server::new_async().await;

    let register = server
        .mock("POST", "/api/User/CustomerRegister")
        .match_query(Matcher::UrlEncoded("apiKey".into(), "test-key".into()))
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "email": "guest@mail.com",
            "passwordConfirm": "pw"
        })))
        .with_status(201)
        .with_body(r#"{"message": "Registered"}"#)
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, signed_in("AT1", "RT1"));
    let result = client
        .customer_register(&CustomerRegistration {
            name: "Guest".to_string(),
            email: "guest@mail.com".to_string(),
            phone: "+9607000000".to_string(),
            password: "pw".to_string(),
            password_confirm: "pw".to_string(),
        })
        .await;

    //* Then
    register.assert_async().await;
    assert!(tokio_test::assert_ok!(result).is_some());
}

#[tokio::test]
async fn toggle_user_sends_email_query() {
    //* Given
    let mut server = Server::new_async().await;

    let toggle = server
        .mock("PUT", "/api/User/ToggleUser")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("apiKey".into(), "test-key".into()),
            Matcher::UrlEncoded("Email".into(), "staff+1@joali.mv".into()),
        ]))
        .match_header("authorization", "Bearer AT1")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, signed_in("AT1", "RT1"));
    let result = client.toggle_user("staff+1@joali.mv").await;

    //* Then
    toggle.assert_async().await;
    assert_eq!(tokio_test::assert_ok!(result), None);
}

#[tokio::test]
async fn service_filter_is_sent_as_query() {
    //* Given
    let mut server = Server::new_async().await;

    let services = server
        .mock("GET", "/api/Service")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("apiKey".into(), "test-key".into()),
            Matcher::UrlEncoded("orgId".into(), "3".into()),
            Matcher::UrlEncoded("typeId".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"[{"id": 8, "name": "Water Villa", "price": 950.0, "orgId": 3, "serviceTypeId": 5, "serviceType": {"name": "Room"}}]"#,
        )
        .expect(1)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, signed_in("AT1", "RT1"));
    let listed = client
        .get_all_services(&ServiceFilter::for_organization(3).with_type(5))
        .await
        .expect("listing should succeed");

    //* Then
    services.assert_async().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Water Villa");
    assert_eq!(listed[0].service_type.as_ref().map(|t| t.name.as_str()), Some("Room"));
}

#[tokio::test]
async fn place_order_posts_booking_and_returns_order() {
    //* Given
    let mut server = Server::new_async().await;

    let create = server
        .mock("POST", "/api/ServiceOrder/Create")
        .match_header("authorization", "Bearer AT1")
        .match_body(Matcher::PartialJson(json!({"serviceId": 8, "quantity": 2})))
        .with_status(200)
        .with_body(r#"{"id": 31, "serviceId": 8, "quantity": 2, "status": "Pending"}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/api/ServiceOrder/Create")
        .match_body(Matcher::PartialJson(json!({"serviceId": 9})))
        .with_status(400)
        .create_async()
        .await;

    //* When
    let client = client_for(&server, signed_in("AT1", "RT1"));
    let placed = client.place_service_order(&NewServiceOrder::now(8, 2)).await;
    let rejected = client.place_service_order(&NewServiceOrder::now(9, 1)).await;

    //* Then
    create.assert_async().await;
    let order = tokio_test::assert_ok!(placed).expect("order should be returned");
    assert_eq!(order.id, 31);
    assert_eq!(order.service_id, 8);
    assert_eq!(tokio_test::assert_err!(rejected).to_string(), "Failed to place booking");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    //* Given
    let api = ApiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_key: "test-key".to_string(),
        timeout_secs: 2,
    };
    let client = JoaliClient::with_api_config(&api, signed_in("AT1", "RT1"))
        .expect("client should build");

    //* When
    let result = client.get_my_orders().await;

    //* Then
    let err = tokio_test::assert_err!(result);
    assert!(matches!(err, ApiError::Network { .. }), "got {:?}", err);
    assert_eq!(err.status(), None);
    // Transport failures do not end the session
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn session_persists_across_clients_with_file_storage() {
    //* Given
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    server
        .mock("POST", "/api/Auth/Login")
        .with_status(200)
        .with_body(
            json!({"token": {"accessToken": "AT1", "refreshToken": "RT1", "role": "Customer"}})
                .to_string(),
        )
        .create_async()
        .await;
    let orders = server
        .mock("GET", "/api/ServiceOrder/MyOrders")
        .match_header("authorization", "Bearer AT1")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let first = Session::new(Arc::new(FileStorage::open(&path).unwrap()));
    client_for(&server, first)
        .login("guest@mail.com", "pw")
        .await
        .expect("login should succeed");

    //* When
    let reopened = Session::new(Arc::new(FileStorage::open(&path).unwrap()));
    let client = client_for(&server, reopened.clone());
    let result = client.get_my_orders().await;

    //* Then
    orders.assert_async().await;
    tokio_test::assert_ok!(result);
    assert_eq!(reopened.role(), Some(UserRole::Customer));
    assert_eq!(
        reopened.state(),
        SessionState::SignedIn {
            role: Some(UserRole::Customer)
        }
    );
}
