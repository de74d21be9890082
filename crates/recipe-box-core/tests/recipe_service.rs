// crates/recipe-box-core/tests/recipe_service.rs
// ============================================================================
// Module: Recipe Service Tests
// Description: End-to-end tests for the service over in-memory collaborators.
// Purpose: Validate attachment ordering, partial updates, and not-found paths.
// Dependencies: recipe-box-core, serde_json
// ============================================================================
//! ## Overview
//! Drives [`RecipeService`] through create, list, get, update, and delete with
//! clock-backed tokens, and checks that concurrent submissions never share an
//! attachment path.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use recipe_box_core::AttachmentPath;
use recipe_box_core::AttachmentResolver;
use recipe_box_core::InMemoryAttachmentSink;
use recipe_box_core::InMemoryRecipeStore;
use recipe_box_core::MonotonicTokenSource;
use recipe_box_core::MutationOutcome;
use recipe_box_core::NoopAuditSink;
use recipe_box_core::RecipeError;
use recipe_box_core::RecipeId;
use recipe_box_core::RecipeService;
use recipe_box_core::RecipeStore;
use recipe_box_core::ServiceLimits;
use recipe_box_core::SharedRecipeStore;
use recipe_box_core::Submission;
use recipe_box_core::UpdatePatch;
use recipe_box_core::UploadedPart;

fn build_service(store: &InMemoryRecipeStore, sink: &InMemoryAttachmentSink) -> RecipeService {
    let resolver = AttachmentResolver::new(
        "uploads",
        Arc::new(sink.clone()),
        Arc::new(MonotonicTokenSource::from_system_clock()),
    )
    .expect("resolver");
    RecipeService::new(
        SharedRecipeStore::from_store(store.clone()),
        resolver,
        Arc::new(NoopAuditSink),
        ServiceLimits::default(),
    )
}

fn submission(name: &str, attachments: Vec<UploadedPart>) -> Submission {
    Submission {
        name: Some(name.to_string()),
        ingredients: Some("eggs\nflour".to_string()),
        steps: Some("whisk then bake".to_string()),
        owner: Some("Mary Ann Smith".to_string()),
        category: Some("Baking".to_string()),
        attachments,
    }
}

/// Splits `uploads/<token>-<name>` into its token and name.
fn token_of(path: &AttachmentPath) -> (u64, String) {
    let file = path.as_str().strip_prefix("uploads/").expect("root prefix");
    let (token, name) = file.split_once('-').expect("token separator");
    (token.parse().expect("numeric token"), name.to_string())
}

#[test]
fn create_stores_comma_joined_paths_with_increasing_tokens() {
    let store = InMemoryRecipeStore::new();
    let sink = InMemoryAttachmentSink::new();
    let service = build_service(&store, &sink);

    let id = service
        .create_recipe(submission(
            "Cake",
            vec![UploadedPart::new("a.png", "first"), UploadedPart::new("b.png", "second")],
        ))
        .expect("create")
        .recipe_id();

    let row = store.get(id).expect("get").expect("row present");
    let stored: Vec<&str> = row.image.split(',').collect();
    assert_eq!(stored.len(), 2);
    let recipe = service.get_recipe(id).expect("recipe");
    let (first_token, first_name) = token_of(&recipe.attachments[0]);
    let (second_token, second_name) = token_of(&recipe.attachments[1]);
    assert_eq!(first_name, "a.png");
    assert_eq!(second_name, "b.png");
    assert!(first_token < second_token);
    assert_eq!(stored[0], recipe.attachments[0].as_str());
    assert_eq!(stored[1], recipe.attachments[1].as_str());
    assert_eq!(sink.read(&recipe.attachments[1]), Some(b"second".to_vec()));
    assert_eq!(recipe.owner_first_name, "Mary");
    assert_eq!(recipe.owner_last_name, "Ann Smith");
}

#[test]
fn listing_reports_primary_image_in_wire_shape() {
    let store = InMemoryRecipeStore::new();
    let sink = InMemoryAttachmentSink::new();
    let service = build_service(&store, &sink);
    service
        .create_recipe(submission(
            "Soup",
            vec![UploadedPart::new("x.jpg", "x"), UploadedPart::new("y.jpg", "y")],
        ))
        .expect("create");

    let listed = service.list_recipes().expect("list");
    let json = serde_json::to_value(&listed).expect("serialize");
    let entry = &json[0];
    assert_eq!(entry["name"], "Soup");
    assert!(entry["id"].is_i64());
    let image = entry["image"].as_str().expect("image string");
    assert!(image.ends_with("-x.jpg"));
}

#[test]
fn partial_update_leaves_absent_fields_untouched() {
    let store = InMemoryRecipeStore::new();
    let sink = InMemoryAttachmentSink::new();
    let service = build_service(&store, &sink);
    let id = service
        .create_recipe(submission("Bread", vec![UploadedPart::new("loaf.png", "l")]))
        .expect("create")
        .recipe_id();
    let before = service.get_recipe(id).expect("before");

    let outcome = service
        .update_recipe(
            id,
            UpdatePatch {
                category: Some("Dessert".to_string()),
                ..UpdatePatch::default()
            },
        )
        .expect("update");
    assert_eq!(outcome, MutationOutcome::Updated(id));

    let after = service.get_recipe(id).expect("after");
    assert_eq!(after.category, "Dessert");
    assert_eq!(after.name, before.name);
    assert_eq!(after.ingredients, before.ingredients);
    assert_eq!(after.steps, before.steps);
    assert_eq!(after.attachments, before.attachments);
}

#[test]
fn operations_on_missing_recipe_return_not_found() {
    let store = InMemoryRecipeStore::new();
    let sink = InMemoryAttachmentSink::new();
    let service = build_service(&store, &sink);
    let missing = RecipeId::from_raw(999).expect("nonzero id");

    assert!(matches!(service.get_recipe(missing), Err(RecipeError::NotFound(id)) if id == missing));
    assert!(matches!(service.delete_recipe(missing), Err(RecipeError::NotFound(_))));
    assert!(matches!(
        service.update_recipe(missing, UpdatePatch::default()),
        Err(RecipeError::NotFound(_))
    ));
}

#[test]
fn concurrent_submissions_never_share_paths() {
    let store = InMemoryRecipeStore::new();
    let sink = InMemoryAttachmentSink::new();
    let service = build_service(&store, &sink);

    let handles: Vec<_> = (0 .. 6)
        .map(|worker| {
            let service = service.clone();
            thread::spawn(move || {
                (0 .. 5)
                    .map(|round| {
                        let batch = vec![
                            UploadedPart::new("photo.png", format!("{worker}-{round}-a")),
                            UploadedPart::new("photo.png", format!("{worker}-{round}-b")),
                        ];
                        service.create_recipe(submission("Dish", batch)).expect("create").recipe_id()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        ids.extend(handle.join().expect("worker"));
    }
    assert_eq!(ids.len(), 30);

    let mut paths = BTreeSet::new();
    for id in ids {
        for path in service.get_recipe(id).expect("recipe").attachments {
            assert!(paths.insert(path.to_string()), "duplicate path {path}");
        }
    }
    assert_eq!(paths.len(), 60);
    assert_eq!(sink.len(), 60);
}
