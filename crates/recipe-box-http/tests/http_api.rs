// crates/recipe-box-http/tests/http_api.rs
// ============================================================================
// Module: Recipe HTTP API Tests
// Description: End-to-end tests over a live server on an ephemeral port.
// Purpose: Validate routes, multipart decoding, status mapping, and files.
// Dependencies: recipe-box-http, recipe-box-config, reqwest, tempfile, tokio
// ============================================================================

//! ## Overview
//! Starts [`RecipeServer`] against a scratch directory and drives every route
//! with real multipart requests, plus urlencoded and non-form bodies.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;

use recipe_box_config::RecipeBoxConfig;
use recipe_box_http::RecipeServer;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

struct Harness {
    dir: TempDir,
    base: String,
    client: reqwest::Client,
}

impl Harness {
    fn url(&self, route: &str) -> String {
        format!("{}{route}", self.base)
    }

    fn upload_exists(&self, stored: &str) -> bool {
        self.dir.path().join(stored).is_file()
    }
}

fn config_for(dir: &Path, max_attachments: usize) -> RecipeBoxConfig {
    let toml = format!(
        "[store]\npath = \"{store}\"\n\n[attachments]\nbase_dir = \"{base}\"\nmax_attachments = \
         {max_attachments}\n\n[audit]\nenabled = false\n",
        store = dir.join("recipes.db").display(),
        base = dir.display(),
    );
    RecipeBoxConfig::from_toml(&toml).expect("config")
}

async fn start(max_attachments: usize) -> Harness {
    let dir = TempDir::new().expect("tempdir");
    let server = RecipeServer::from_config(&config_for(dir.path(), max_attachments)).expect("server");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr: SocketAddr = listener.local_addr().expect("addr");
    tokio::spawn(server.serve_on(listener));
    Harness {
        dir,
        base: format!("http://{addr}"),
        client: reqwest::Client::new(),
    }
}

fn file(name: &str, bytes: &'static [u8]) -> Part {
    Part::bytes(bytes).file_name(name.to_string())
}

fn create_form() -> Form {
    Form::new()
        .text("recipename", "Cake")
        .text("ingredients", "eggs, flour")
        .text("steps", "mix; bake")
        .text("recipeowner", "Jane Doe")
        .text("recipecategory", "Dessert")
        .part("rmedia[]", file("a.png", b"A"))
        .part("rmedia[]", file("b.png", b"B"))
}

async fn create(harness: &Harness, form: Form) -> (StatusCode, Value) {
    let response =
        harness.client.post(harness.url("/add-recipe")).multipart(form).send().await.expect("post");
    let status = response.status();
    (status, response.json().await.expect("json"))
}

async fn fetch(harness: &Harness, id: i64) -> (StatusCode, Value) {
    let response =
        harness.client.get(harness.url(&format!("/get-recipe/{id}"))).send().await.expect("get");
    let status = response.status();
    (status, response.json().await.expect("json"))
}

// ============================================================================
// SECTION: Routes
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn create_then_get_returns_ordered_attachments() {
    let harness = start(16).await;
    let (status, body) = create(&harness, create_form()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Recipe added successfully");
    let id = body["id"].as_i64().expect("id");

    let (status, recipe) = fetch(&harness, id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recipe["name"], "Cake");
    assert_eq!(recipe["owner_first_name"], "Jane");
    assert_eq!(recipe["owner_last_name"], "Doe");
    let attachments = recipe["attachments"].as_array().expect("attachments");
    assert_eq!(attachments.len(), 2);
    let first = attachments[0].as_str().expect("path");
    let second = attachments[1].as_str().expect("path");
    assert!(first.starts_with("uploads/") && first.ends_with("-a.png"));
    assert!(second.starts_with("uploads/") && second.ends_with("-b.png"));
    assert!(harness.upload_exists(first));
    assert!(harness.upload_exists(second));
}

#[tokio::test(flavor = "multi_thread")]
async fn listing_reports_primary_image() {
    let harness = start(16).await;
    create(&harness, create_form()).await;
    create(&harness, Form::new()
        .text("recipename", "Water")
        .text("ingredients", "water")
        .text("steps", "pour")
        .text("recipeowner", "Cher")
        .text("recipecategory", "Drinks"))
    .await;

    let listed: Value = harness
        .client
        .get(harness.url("/get-recipes"))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("json");
    let entries = listed.as_array().expect("array");
    assert_eq!(entries.len(), 2);
    assert!(entries[0]["image"].as_str().expect("image").ends_with("-a.png"));
    assert_eq!(entries[1]["name"], "Water");
    assert!(entries[1]["image"].is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn partial_update_changes_only_sent_fields() {
    let harness = start(16).await;
    let (_, body) = create(&harness, create_form()).await;
    let id = body["id"].as_i64().expect("id");
    let (_, before) = fetch(&harness, id).await;

    let response = harness
        .client
        .put(harness.url(&format!("/update-recipe/{id}")))
        .multipart(Form::new().text("updatedCategory", "Breakfast"))
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::OK);

    let (_, after) = fetch(&harness, id).await;
    assert_eq!(after["category"], "Breakfast");
    assert_eq!(after["name"], before["name"]);
    assert_eq!(after["ingredients"], before["ingredients"]);
    assert_eq!(after["steps"], before["steps"]);
    assert_eq!(after["attachments"], before["attachments"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn image_update_replaces_attachment_list() {
    let harness = start(16).await;
    let (_, body) = create(&harness, create_form()).await;
    let id = body["id"].as_i64().expect("id");

    let response = harness
        .client
        .put(harness.url(&format!("/update-recipe/{id}")))
        .multipart(Form::new().part("updatedImage", file("c.png", b"C")))
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::OK);

    let (_, recipe) = fetch(&harness, id).await;
    let attachments = recipe["attachments"].as_array().expect("attachments");
    assert_eq!(attachments.len(), 1);
    let stored = attachments[0].as_str().expect("path");
    assert!(stored.ends_with("-c.png"));
    assert!(harness.upload_exists(stored));
}

#[tokio::test(flavor = "multi_thread")]
async fn image_update_and_delete_remove_released_files() {
    let harness = start(16).await;
    let (_, body) = create(&harness, create_form()).await;
    let id = body["id"].as_i64().expect("id");
    let (_, before) = fetch(&harness, id).await;
    let original: Vec<String> = before["attachments"]
        .as_array()
        .expect("attachments")
        .iter()
        .map(|path| path.as_str().expect("path").to_string())
        .collect();

    harness
        .client
        .put(harness.url(&format!("/update-recipe/{id}")))
        .multipart(Form::new().part("updatedImage", file("c.png", b"C")))
        .send()
        .await
        .expect("put");
    assert!(original.iter().all(|path| !harness.upload_exists(path)));
    let (_, after) = fetch(&harness, id).await;
    let replacement = after["attachments"][0].as_str().expect("path").to_string();
    assert!(harness.upload_exists(&replacement));

    harness
        .client
        .delete(harness.url(&format!("/delete-recipe/{id}")))
        .send()
        .await
        .expect("delete");
    assert!(!harness.upload_exists(&replacement));
}

#[tokio::test(flavor = "multi_thread")]
async fn urlencoded_update_changes_text_fields() {
    let harness = start(16).await;
    let (_, body) = create(&harness, create_form()).await;
    let id = body["id"].as_i64().expect("id");

    let response = harness
        .client
        .put(harness.url(&format!("/update-recipe/{id}")))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("updatedCategory=Dessert&updatedSteps=chill+overnight")
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::OK);

    let (_, recipe) = fetch(&harness, id).await;
    assert_eq!(recipe["category"], "Dessert");
    assert_eq!(recipe["steps"], "chill overnight");
    assert_eq!(recipe["name"], "Cake");
    assert_eq!(recipe["attachments"].as_array().expect("attachments").len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn long_file_names_are_stored() {
    let harness = start(16).await;
    let long_name = format!("{}.png", "p".repeat(246));
    let form = Form::new()
        .text("recipename", "Cake")
        .text("ingredients", "eggs")
        .text("steps", "bake")
        .text("recipeowner", "Jane Doe")
        .text("recipecategory", "Dessert")
        .part("rmedia[]", file(&long_name, b"P"));
    let (status, body) = create(&harness, form).await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    let id = body["id"].as_i64().expect("id");

    let (_, recipe) = fetch(&harness, id).await;
    let stored = recipe["attachments"][0].as_str().expect("path");
    assert!(stored.ends_with(".png"));
    assert!(stored.rsplit('/').next().expect("segment").len() <= 255);
    assert!(harness.upload_exists(stored));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_then_get_is_not_found() {
    let harness = start(16).await;
    let (_, body) = create(&harness, create_form()).await;
    let id = body["id"].as_i64().expect("id");

    let response = harness
        .client
        .delete(harness.url(&format!("/delete-recipe/{id}")))
        .send()
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);

    let (status, error) = fetch(&harness, id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");
}

// ============================================================================
// SECTION: Failures
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn missing_ids_map_to_not_found() {
    let harness = start(16).await;
    let response = harness
        .client
        .put(harness.url("/update-recipe/999"))
        .multipart(Form::new().text("updatedName", "Ghost"))
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response =
        harness.client.delete(harness.url("/delete-recipe/999")).send().await.expect("delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_field_is_a_validation_gap() {
    let harness = start(16).await;
    let form = Form::new()
        .text("recipename", "Cake")
        .text("steps", "bake")
        .text("recipeowner", "Jane")
        .text("recipecategory", "Dessert")
        .part("rmedia[]", file("a.png", b"A"));
    let (status, body) = create(&harness, form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_gap");
    assert!(!harness.dir.path().join("uploads").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn attachment_count_limit_rejects_before_writing() {
    let harness = start(1).await;
    let (status, body) = create(&harness, create_form()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_gap");
    assert!(!harness.dir.path().join("uploads").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn non_numeric_id_is_rejected() {
    let harness = start(16).await;
    let (status, body) = {
        let response =
            harness.client.get(harness.url("/get-recipe/abc")).send().await.expect("get");
        let status = response.status();
        (status, response.json::<Value>().await.expect("json"))
    };
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test(flavor = "multi_thread")]
async fn non_form_bodies_get_json_errors() {
    let harness = start(16).await;
    let response = harness
        .client
        .post(harness.url("/add-recipe"))
        .header(CONTENT_TYPE, "application/json")
        .body(r#"{"recipename":"Cake"}"#)
        .send()
        .await
        .expect("post");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["error"], "invalid_form");

    let response = harness
        .client
        .put(harness.url("/update-recipe/1"))
        .header(CONTENT_TYPE, "text/plain")
        .body("updatedName=Ghost")
        .send()
        .await
        .expect("put");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["error"], "invalid_form");
}
