// crates/recipe-box-http/src/form.rs
// ============================================================================
// Module: Form Decoding
// Description: Decode create and update forms into core request inputs.
// Purpose: Keep the public form field names in one place.
// Dependencies: axum (multipart, form), recipe-box-core, serde
// ============================================================================

//! ## Overview
//! The create form carries `recipename`, `ingredients`, `steps`,
//! `recipeowner`, `recipecategory` and any number of `rmedia[]` files. The
//! update form carries `updatedName`, `updatedIngredients`, `updatedSteps`,
//! `updatedCategory` and at most one `updatedImage` file. Unknown text fields
//! are ignored; unknown file fields are rejected. A file input submitted with
//! no file selected (empty name and body) counts as absent.
//!
//! The update route also accepts a text-only
//! `application/x-www-form-urlencoded` body with the same field names. Bodies
//! that are neither are rejected as [`FormError::Malformed`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Form;
use axum::extract::FromRequest;
use axum::extract::Multipart;
use axum::extract::Request;
use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use recipe_box_core::Submission;
use recipe_box_core::UpdatePatch;
use recipe_box_core::UploadedPart;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Field Names
// ============================================================================

/// File field of the create form.
pub const CREATE_FILE_FIELD: &str = "rmedia[]";
/// File field of the update form.
pub const UPDATE_FILE_FIELD: &str = "updatedImage";
/// Media type of a text-only update body.
const URLENCODED_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Form decoding errors.
#[derive(Debug, Error)]
pub enum FormError {
    /// The body could not be read as the expected form encoding.
    #[error("malformed form body: {0}")]
    Malformed(String),
    /// The body exceeded the configured size limit.
    #[error("request body too large: {0}")]
    TooLarge(String),
    /// A file arrived under a field that does not accept files.
    #[error("unexpected file field: {0}")]
    UnexpectedFile(String),
    /// A single-valued file field was sent more than once.
    #[error("duplicate file field: {0}")]
    DuplicateFile(String),
}

impl FormError {
    /// Classifies an extractor rejection by its status.
    fn rejected(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge(message)
        } else {
            Self::Malformed(message)
        }
    }
}

impl From<MultipartError> for FormError {
    fn from(err: MultipartError) -> Self {
        Self::rejected(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for FormError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for FormError {
    fn from(rejection: FormRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// One decoded multipart part.
enum FormPart {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File field; `None` when no file was selected.
    File {
        /// Field name.
        name: String,
        /// Uploaded file.
        part: Option<UploadedPart>,
    },
}

/// Reads the next part from the body.
async fn next_part(multipart: &mut Multipart) -> Result<Option<FormPart>, FormError> {
    let Some(field) = multipart.next_field().await? else {
        return Ok(None);
    };
    let name = field.name().unwrap_or_default().to_string();
    match field.file_name().map(str::to_string) {
        Some(file_name) => {
            let bytes = field.bytes().await?;
            let part = if file_name.is_empty() && bytes.is_empty() {
                None
            } else {
                Some(UploadedPart::new(file_name, bytes))
            };
            Ok(Some(FormPart::File {
                name,
                part,
            }))
        }
        None => {
            let value = field.text().await?;
            Ok(Some(FormPart::Text {
                name,
                value,
            }))
        }
    }
}

/// Decodes the create form into a [`Submission`].
///
/// # Errors
///
/// Returns [`FormError`] when the body is malformed or carries a file under
/// an unexpected field.
pub async fn read_submission(mut multipart: Multipart) -> Result<Submission, FormError> {
    let mut submission = Submission::default();
    while let Some(part) = next_part(&mut multipart).await? {
        match part {
            FormPart::Text {
                name,
                value,
            } => match name.as_str() {
                "recipename" => submission.name = Some(value),
                "ingredients" => submission.ingredients = Some(value),
                "steps" => submission.steps = Some(value),
                "recipeowner" => submission.owner = Some(value),
                "recipecategory" => submission.category = Some(value),
                _ => {}
            },
            FormPart::File {
                name,
                part,
            } => {
                if name != CREATE_FILE_FIELD {
                    return Err(FormError::UnexpectedFile(name));
                }
                submission.attachments.extend(part);
            }
        }
    }
    Ok(submission)
}

/// Decodes the update form into an [`UpdatePatch`].
///
/// # Errors
///
/// Returns [`FormError`] when the body is malformed, carries an unexpected
/// file field, or sends more than one replacement image.
pub async fn read_patch(mut multipart: Multipart) -> Result<UpdatePatch, FormError> {
    let mut patch = UpdatePatch::default();
    while let Some(part) = next_part(&mut multipart).await? {
        match part {
            FormPart::Text {
                name,
                value,
            } => match name.as_str() {
                "updatedName" => patch.name = Some(value),
                "updatedIngredients" => patch.ingredients = Some(value),
                "updatedSteps" => patch.steps = Some(value),
                "updatedCategory" => patch.category = Some(value),
                _ => {}
            },
            FormPart::File {
                name,
                part,
            } => {
                if name != UPDATE_FILE_FIELD {
                    return Err(FormError::UnexpectedFile(name));
                }
                if let Some(part) = part {
                    if patch.attachment.is_some() {
                        return Err(FormError::DuplicateFile(name));
                    }
                    patch.attachment = Some(part);
                }
            }
        }
    }
    Ok(patch)
}

/// Text-only update form.
#[derive(Debug, Default, Deserialize)]
struct UrlencodedPatch {
    /// `updatedName`.
    #[serde(rename = "updatedName")]
    name: Option<String>,
    /// `updatedIngredients`.
    #[serde(rename = "updatedIngredients")]
    ingredients: Option<String>,
    /// `updatedSteps`.
    #[serde(rename = "updatedSteps")]
    steps: Option<String>,
    /// `updatedCategory`.
    #[serde(rename = "updatedCategory")]
    category: Option<String>,
}

impl From<UrlencodedPatch> for UpdatePatch {
    fn from(fields: UrlencodedPatch) -> Self {
        Self {
            name: fields.name,
            ingredients: fields.ingredients,
            steps: fields.steps,
            category: fields.category,
            attachment: None,
        }
    }
}

/// Decodes an update request body, multipart or urlencoded.
///
/// # Errors
///
/// Returns [`FormError`] when the body is neither encoding, is malformed, or
/// breaks the multipart rules of [`read_patch`].
pub async fn read_update_request(request: Request) -> Result<UpdatePatch, FormError> {
    if is_urlencoded(&request) {
        let Form(fields) = Form::<UrlencodedPatch>::from_request(request, &()).await?;
        return Ok(fields.into());
    }
    let multipart = Multipart::from_request(request, &()).await?;
    read_patch(multipart).await
}

/// Returns true when the body declares the urlencoded media type.
fn is_urlencoded(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(URLENCODED_MEDIA_TYPE))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use axum::body::Body;

    use super::*;

    const BOUNDARY: &str = "recipe-boundary";

    fn text(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file(name: &str, file_name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
             filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{value}\r\n"
        )
    }

    fn raw_request(content_type: &str, body: &str) -> Request {
        Request::builder()
            .method("PUT")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn multipart(parts: &[String]) -> Multipart {
        let body = format!("{}--{BOUNDARY}--\r\n", parts.concat());
        let request = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .expect("request");
        Multipart::from_request(request, &()).await.expect("multipart")
    }

    #[tokio::test]
    async fn create_form_maps_fields_and_keeps_file_order() {
        let body = multipart(&[
            text("recipename", "Cake"),
            text("ingredients", "eggs"),
            text("steps", "bake"),
            text("recipeowner", "Jane Doe"),
            text("recipecategory", "Dessert"),
            text("unrelated", "ignored"),
            file("rmedia[]", "a.png", "A"),
            file("rmedia[]", "b.png", "B"),
            file("rmedia[]", "", ""),
        ])
        .await;
        let submission = read_submission(body).await.expect("submission");
        assert_eq!(submission.name.as_deref(), Some("Cake"));
        assert_eq!(submission.owner.as_deref(), Some("Jane Doe"));
        assert_eq!(submission.category.as_deref(), Some("Dessert"));
        let names: Vec<&str> =
            submission.attachments.iter().map(|part| part.original_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[tokio::test]
    async fn missing_text_fields_stay_absent() {
        let body = multipart(&[text("recipename", "Cake")]).await;
        let submission = read_submission(body).await.expect("submission");
        assert!(submission.ingredients.is_none());
        assert!(submission.attachments.is_empty());
    }

    #[tokio::test]
    async fn create_form_rejects_foreign_file_field() {
        let body = multipart(&[file("avatar", "x.png", "X")]).await;
        assert!(matches!(read_submission(body).await, Err(FormError::UnexpectedFile(name)) if name == "avatar"));
    }

    #[tokio::test]
    async fn update_form_reads_only_present_fields() {
        let body = multipart(&[
            text("updatedCategory", "Dessert"),
            file("updatedImage", "", ""),
        ])
        .await;
        let patch = read_patch(body).await.expect("patch");
        assert_eq!(patch.category.as_deref(), Some("Dessert"));
        assert!(patch.name.is_none());
        assert!(patch.attachment.is_none());
    }

    #[tokio::test]
    async fn update_form_rejects_two_images() {
        let body = multipart(&[
            file("updatedImage", "a.png", "A"),
            file("updatedImage", "b.png", "B"),
        ])
        .await;
        assert!(matches!(read_patch(body).await, Err(FormError::DuplicateFile(_))));
    }

    #[tokio::test]
    async fn urlencoded_update_maps_text_fields() {
        let request = raw_request(
            "application/x-www-form-urlencoded; charset=utf-8",
            "updatedCategory=Dessert&updatedName=Lemon+Tart&unrelated=1",
        );
        let patch = read_update_request(request).await.expect("patch");
        assert_eq!(patch.category.as_deref(), Some("Dessert"));
        assert_eq!(patch.name.as_deref(), Some("Lemon Tart"));
        assert!(patch.steps.is_none());
        assert!(patch.attachment.is_none());
    }

    #[tokio::test]
    async fn multipart_update_request_still_decodes() {
        let body = format!("{}--{BOUNDARY}--\r\n", text("updatedSteps", "stir"));
        let request =
            raw_request(&format!("multipart/form-data; boundary={BOUNDARY}"), &body);
        let patch = read_update_request(request).await.expect("patch");
        assert_eq!(patch.steps.as_deref(), Some("stir"));
    }

    #[tokio::test]
    async fn other_media_types_are_malformed() {
        let request = raw_request("application/json", "{\"updatedName\":\"x\"}");
        assert!(matches!(read_update_request(request).await, Err(FormError::Malformed(_))));
    }
}
