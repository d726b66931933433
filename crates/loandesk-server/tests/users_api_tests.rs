//! User endpoint integration tests
//!
//! Coverage:
//! - create, read, partial update and delete round trips
//! - required field reporting and payload decoding failures
//! - store constraint failures surfaced as 400 envelopes

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::TestApp;

#[tokio::test]
async fn test_create_user_then_get_by_id() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/users",
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "phone": "+441234567",
                "birth_date": "1815-12-10"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": true,
            "message": "User was successfully created!",
            "code": 200,
            "row_id": 1
        })
    );

    let (status, body) = app.get("/users/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(body["message"], "data got successfully");
    assert_eq!(
        body["details"],
        json!([{
            "id": 1,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "phone": "+441234567",
            "birth_date": "1815-12-10"
        }])
    );
}

#[tokio::test]
async fn test_create_user_reports_first_missing_field() {
    let app = TestApp::new();

    let (status, body) = app.post("/users", json!({"phone": "123"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": false, "message": "Param \"first_name\" is required!"})
    );

    let (status, body) = app.post("/users", json!({"first_name": "Ada"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Param \"last_name\" is required!");
}

#[tokio::test]
async fn test_malformed_json_is_rejected_on_every_mutation() {
    let app = TestApp::new();
    app.create_user("Ada", "Lovelace").await;

    for (method, uri) in [
        (Method::POST, "/users"),
        (Method::PUT, "/users/1"),
        (Method::POST, "/loans"),
        (Method::PUT, "/loans/1"),
    ] {
        for raw in ["{not json", "", "42", "\"text\""] {
            let (status, body) = app.send(method.clone(), uri, Some(raw)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri} {raw:?}");
            assert_eq!(
                body,
                json!({"status": false, "message": "Invalid JSON format"}),
                "{method} {uri} {raw:?}"
            );
        }
    }
}

#[tokio::test]
async fn test_form_encoded_create() {
    let app = TestApp::new();

    let (status, body) = app
        .send_form(Method::POST, "/users", "first_name=Grace&last_name=Hopper")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["row_id"], 1);

    let (_, body) = app.get("/users/1").await;
    assert_eq!(body["details"][0]["last_name"], "Hopper");
}

#[tokio::test]
async fn test_partial_update_changes_only_sent_fields() {
    let app = TestApp::new();
    let (_, created) = app
        .post(
            "/users",
            json!({"first_name": "Ada", "last_name": "Byron", "phone": "111"}),
        )
        .await;
    let id = created["row_id"].as_i64().unwrap();

    let (status, body) = app
        .put(&format!("/users/{id}"), json!({"last_name": "Lovelace", "id": 99}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": true, "message": "User was successfully updated!", "code": 200})
    );

    let (_, body) = app.get(&format!("/users/{id}")).await;
    let user = &body["details"][0];
    assert_eq!(user["id"], id);
    assert_eq!(user["first_name"], "Ada");
    assert_eq!(user["last_name"], "Lovelace");
    assert_eq!(user["phone"], "111");
}

#[tokio::test]
async fn test_update_without_updatable_fields() {
    let app = TestApp::new();
    let id = app.create_user("Ada", "Lovelace").await;

    let (status, body) = app
        .put(&format!("/users/{id}"), json!({"email": "ada@example.com"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"status": false, "message": "No valid parameters provided"})
    );

    let (_, body) = app.get(&format!("/users/{id}")).await;
    assert_eq!(body["details"][0]["first_name"], "Ada");
}

#[tokio::test]
async fn test_invalid_date_and_long_values() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/users",
            json!({"first_name": "A", "last_name": "B", "birth_date": "31/12/1999"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Incorrect date format!");

    let (status, body) = app
        .post(
            "/users",
            json!({"first_name": "A", "last_name": "B", "phone": "12345678901234567"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Value is too long!");

    let (_, body) = app.get("/users").await;
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_get_missing_user_is_200_without_details() {
    let app = TestApp::new();

    for uri in ["/users/42", "/users"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"status": false, "message": "can't get data by specified data"})
        );
    }
}

#[tokio::test]
async fn test_non_numeric_id_is_coerced() {
    let app = TestApp::new();
    app.create_user("Ada", "Lovelace").await;

    let (_, body) = app.get("/users/1abc").await;
    assert_eq!(body["details"][0]["id"], 1);

    let (status, body) = app.get("/users/abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_list_users_ordered_by_id() {
    let app = TestApp::new();
    app.create_user("Ada", "Lovelace").await;
    app.create_user("Alan", "Turing").await;
    app.create_user("Grace", "Hopper").await;

    let (_, body) = app.get("/users").await;
    let ids: Vec<i64> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_delete_user_with_and_without_loans() {
    let app = TestApp::new();
    let owner = app.create_user("Ada", "Lovelace").await;
    let free = app.create_user("Alan", "Turing").await;
    app.create_loan(owner, 1000, 1_700_000_000).await;

    let (status, body) = app.delete(&format!("/users/{owner}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "status": false,
            "message": "Impossible to delete a user because the user has loans"
        })
    );

    let (status, body) = app.delete(&format!("/users/{free}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": true,
            "message": format!("User with ID {free} was successfully deleted!"),
            "code": 200
        })
    );

    let (_, body) = app.get(&format!("/users/{free}")).await;
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_delete_missing_user_still_succeeds() {
    let app = TestApp::new();
    let (status, body) = app.delete("/users/77").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User with ID 77 was successfully deleted!");
}
