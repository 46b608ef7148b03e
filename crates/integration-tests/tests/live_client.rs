//! End-to-end tests with `FairweatherClient` against a running server.
//!
//! These tests require:
//! - The server running (cargo run -p fairweather-server)
//! - `FAIRWEATHER_TEST_URL` pointing at it (default `http://localhost:8080`)
//!
//! Each run registers a fresh account.

#![allow(clippy::unwrap_used)]

use fairweather_client::{AuthState, ClientError, FairweatherClient};
use uuid::Uuid;

fn base_url() -> String {
    std::env::var("FAIRWEATHER_TEST_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

fn fresh_email() -> String {
    format!("test-{}@example.com", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_full_session() {
    let client = FairweatherClient::new(&base_url()).unwrap();
    let mut auth = client.subscribe();
    let email = fresh_email();

    assert!(client.register(&email, "correct horse battery").await.unwrap());
    assert!(matches!(*auth.borrow_and_update(), AuthState::SignedIn(_)));
    assert_eq!(client.user_email().await.unwrap(), Some(email.clone()));

    client.add_favorite("Paris").await.unwrap();
    assert!(matches!(
        client.add_favorite("Paris").await,
        Err(ClientError::Conflict(_))
    ));
    assert!(client.is_favorite("Paris").await.unwrap());

    client.set_home_city("Paris").await.unwrap();
    let home = client.get_home_city().await.unwrap().unwrap();
    assert_eq!(home.city.as_str(), "Paris");

    client.remove_home_city().await.unwrap();
    assert!(client.get_home_city().await.unwrap().is_none());

    client.remove_favorite("Paris").await.unwrap();
    assert!(client.list_favorites().await.unwrap().is_empty());

    client.logout().await.unwrap();
    assert_eq!(*auth.borrow_and_update(), AuthState::SignedOut);
    assert!(client.current_user().await.unwrap().is_none());
    assert!(matches!(
        client.list_favorites().await,
        Err(ClientError::Unauthorized)
    ));
}
