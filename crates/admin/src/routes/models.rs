//! Generic list, form and delete screens for registered models.
//!
//! Each handler is instantiated once per [`AdminModel`] by
//! [`routes`]; the model supplies fields, validation and persistence.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use tower_sessions::Session;
use tracing::instrument;

use eshop_core::{ImageError, validate_image};

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdminAuth, ensure_superuser, push_flash};
use crate::models::{CurrentAdmin, Flash, ImageUpdate};
use crate::registry::form::{
    CLEAR_SUFFIX, FieldView, FormData, NON_FIELD, RawForm, Upload, field_views,
};
use crate::registry::{AdminModel, FieldErrors, FormMode, FormValues, ModelMeta};
use crate::routes::PageContext;
use crate::state::AppState;

/// Request body cap for model forms. Larger than the per-image limit so an
/// oversized image reaches validation and gets a field error.
pub const FORM_BODY_LIMIT: usize = 8 * 1024 * 1024;

const INVALID_REFERENCE: &str =
    "A related record no longer exists. Select a valid choice and save again.";

// =============================================================================
// Templates
// =============================================================================

/// One row on a list screen.
#[derive(Debug, Clone)]
pub struct RowView {
    pub id: i32,
    pub label: String,
    pub cells: Vec<String>,
}

#[derive(Template)]
#[template(path = "models/list.html")]
pub struct ListTemplate {
    pub page: PageContext,
    pub meta: ModelMeta,
    pub columns: &'static [&'static str],
    pub rows: Vec<RowView>,
}

#[derive(Template)]
#[template(path = "models/form.html")]
pub struct FormTemplate {
    pub page: PageContext,
    pub meta: ModelMeta,
    pub title: String,
    pub action: String,
    pub delete_url: Option<String>,
    pub fields: Vec<FieldView>,
    pub non_field_errors: Vec<String>,
    pub has_errors: bool,
}

#[derive(Template)]
#[template(path = "models/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub page: PageContext,
    pub meta: ModelMeta,
    pub label: String,
    pub action: String,
    pub cancel_url: String,
}

// =============================================================================
// Router
// =============================================================================

/// CRUD routes for one model under `/{path}`.
pub fn routes<M: AdminModel>() -> Router<AppState> {
    let base = M::META.url();
    Router::new()
        .route(&base, get(list::<M>).post(create::<M>))
        .route(&format!("{base}/new"), get(new_form::<M>))
        .route(&format!("{base}/{{id}}"), axum::routing::post(update::<M>))
        .route(&format!("{base}/{{id}}/edit"), get(edit_form::<M>))
        .route(
            &format!("{base}/{{id}}/delete"),
            get(confirm_delete::<M>).post(delete::<M>),
        )
        .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT))
}

fn guard<M: AdminModel>(admin: &CurrentAdmin) -> Result<(), AppError> {
    if M::SUPERUSER_ONLY {
        ensure_superuser(admin, M::META.verbose_name_plural)
    } else {
        Ok(())
    }
}

async fn find<M: AdminModel>(state: &AppState, id: i32) -> Result<M::Record, AppError> {
    M::get(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {id}", M::META.verbose_name)))
}

fn edit_url(meta: &ModelMeta, id: i32) -> String {
    format!("{}/{id}/edit", meta.url())
}

// =============================================================================
// Submission handling
// =============================================================================

/// Result of processing a submitted form.
enum Submission {
    Saved(i32),
    Rejected(FormValues, FieldErrors),
}

/// Validate the image parts of a submission. Nothing is written yet.
fn check_uploads<M: AdminModel>(
    uploads: &mut HashMap<String, Upload>,
    errors: &mut FieldErrors,
) -> Vec<(&'static str, &'static str, Upload, eshop_core::ImageFormat)> {
    let mut accepted = Vec::new();
    for field in M::IMAGE_FIELDS {
        let Some(upload) = uploads.remove(field.name) else {
            continue;
        };
        match validate_image(&upload.bytes) {
            Ok(format) => accepted.push((field.name, field.upload_to, upload, format)),
            Err(e) => errors.add(field.name, e.to_string()),
        }
    }
    accepted
}

/// Translate a rejected write into form errors where the user can fix it.
fn write_errors<M: AdminModel>(err: RepositoryError) -> Result<FieldErrors, AppError> {
    match err {
        RepositoryError::Conflict(_) => {
            Ok(FieldErrors::single(M::CONFLICT_FIELD, M::CONFLICT_MESSAGE))
        }
        RepositoryError::InvalidReference(_) => Ok(FieldErrors::single(NON_FIELD, INVALID_REFERENCE)),
        RepositoryError::Invalid(message) => Ok(FieldErrors::single(NON_FIELD, message)),
        other => Err(other.into()),
    }
}

/// Validate, store uploads, and write the row.
///
/// Uploaded files are removed again if anything after storing them fails.
#[instrument(skip_all, fields(model = M::META.path, mode = ?mode, id = ?id))]
async fn submit<M: AdminModel>(
    state: &AppState,
    mode: FormMode,
    id: Option<i32>,
    raw: RawForm,
) -> Result<Submission, AppError> {
    let RawForm {
        values,
        mut uploads,
    } = raw;

    let mut errors = FieldErrors::new();
    let accepted = check_uploads::<M>(&mut uploads, &mut errors);

    let mut images = HashMap::new();
    for field in M::IMAGE_FIELDS {
        let clear_key = format!("{}{CLEAR_SUFFIX}", field.name);
        if values.get(&clear_key).is_some_and(|v| v == "on") {
            images.insert(field.name.to_owned(), ImageUpdate::Clear);
        }
    }

    if !errors.is_empty() {
        // Still run the model's own checks so every error is reported at once.
        if let Err(more) = M::parse(&FormData::new(values.clone(), images), mode) {
            errors.merge(more);
        }
        return Ok(Submission::Rejected(FormValues::from_submission(values), errors));
    }

    let mut written = Vec::with_capacity(accepted.len());
    for (name, upload_to, upload, format) in accepted {
        match state.media().save(upload_to, &upload.bytes, format).await {
            Ok(path) => {
                tracing::debug!(field = name, file = %upload.file_name, "Stored image");
                images.insert(name.to_owned(), ImageUpdate::Set(path.clone()));
                written.push(path);
            }
            Err(e) => {
                discard(state, &written).await;
                return Err(e.into());
            }
        }
    }

    let form = FormData::new(values.clone(), images);
    let input = match M::parse(&form, mode) {
        Ok(input) => input,
        Err(errors) => {
            discard(state, &written).await;
            return Ok(Submission::Rejected(FormValues::from_submission(values), errors));
        }
    };

    let result = match id {
        None => M::create(state.pool(), &input).await,
        Some(id) => M::update(state.pool(), id, &input).await.map(|()| id),
    };

    match result {
        Ok(id) => Ok(Submission::Saved(id)),
        Err(err) => {
            discard(state, &written).await;
            let errors = write_errors::<M>(err)?;
            Ok(Submission::Rejected(FormValues::from_submission(values), errors))
        }
    }
}

async fn discard(state: &AppState, written: &[String]) {
    for path in written {
        state.media().remove(path).await;
    }
}

/// A submitted multipart body.
enum Body {
    Form(RawForm),
    /// Longer than [`FORM_BODY_LIMIT`]; none of the fields are usable.
    TooLarge,
    Malformed(Response),
}

async fn read_form(multipart: Multipart) -> Body {
    match RawForm::read(multipart).await {
        Ok(raw) => Body::Form(raw),
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(error = %e, "Form body over the size limit");
            Body::TooLarge
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected multipart body");
            Body::Malformed((e.status(), e.body_text()).into_response())
        }
    }
}

/// Errors for a body too large to read. Only an image can get that big, so
/// each image field carries the upload size error.
fn oversized_body_errors<M: AdminModel>() -> FieldErrors {
    let message = ImageError::TooLarge {
        size_bytes: u64::try_from(FORM_BODY_LIMIT).unwrap_or(u64::MAX),
    }
    .to_string();
    let mut errors = FieldErrors::new();
    if M::IMAGE_FIELDS.is_empty() {
        errors.add(NON_FIELD, message);
    } else {
        for field in M::IMAGE_FIELDS {
            errors.add(field.name, message.clone());
        }
    }
    errors
}

// =============================================================================
// Rendering
// =============================================================================

struct FormScreen<'a> {
    admin: &'a CurrentAdmin,
    session: &'a Session,
    mode: FormMode,
    id: Option<i32>,
    label: Option<String>,
    values: FormValues,
    errors: FieldErrors,
}

async fn render_form<M: AdminModel>(
    state: &AppState,
    screen: FormScreen<'_>,
) -> Result<Response, AppError> {
    let meta = M::META;
    let fields = M::fields(state.pool(), screen.mode).await?;
    let (title, action, delete_url, current_path) = match screen.id {
        Some(id) => (
            format!(
                "Change {}: {}",
                meta.verbose_name,
                screen.label.unwrap_or_default()
            ),
            format!("{}/{id}", meta.url()),
            Some(format!("{}/{id}/delete", meta.url())),
            edit_url(&meta, id),
        ),
        None => (
            format!("Add {}", meta.verbose_name),
            meta.url(),
            None,
            format!("{}/new", meta.url()),
        ),
    };

    let has_errors = !screen.errors.is_empty();
    let template = FormTemplate {
        page: PageContext::load(screen.admin, screen.session, current_path).await,
        meta,
        title,
        action,
        delete_url,
        fields: field_views(fields, &screen.values, &screen.errors),
        non_field_errors: screen.errors.non_field().to_vec(),
        has_errors,
    };

    let status = if has_errors {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    Ok((status, Html(template.render()?)).into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /{model}
#[instrument(skip_all, fields(model = M::META.path))]
async fn list<M: AdminModel>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    guard::<M>(&admin)?;

    let rows = M::list(state.pool())
        .await?
        .iter()
        .map(|record| RowView {
            id: M::record_id(record),
            label: record.to_string(),
            cells: M::row(record),
        })
        .collect();

    let template = ListTemplate {
        page: PageContext::load(&admin, &session, M::META.url()).await,
        meta: M::META,
        columns: M::COLUMNS,
        rows,
    };
    Ok(Html(template.render()?))
}

/// GET /{model}/new
#[instrument(skip_all, fields(model = M::META.path))]
async fn new_form<M: AdminModel>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    guard::<M>(&admin)?;
    render_form::<M>(
        &state,
        FormScreen {
            admin: &admin,
            session: &session,
            mode: FormMode::Create,
            id: None,
            label: None,
            values: M::defaults(),
            errors: FieldErrors::new(),
        },
    )
    .await
}

/// POST /{model}
#[instrument(skip_all, fields(model = M::META.path))]
async fn create<M: AdminModel>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, AppError> {
    guard::<M>(&admin)?;
    let submission = match read_form(multipart).await {
        Body::Form(raw) => submit::<M>(&state, FormMode::Create, None, raw).await?,
        Body::TooLarge => Submission::Rejected(M::defaults(), oversized_body_errors::<M>()),
        Body::Malformed(response) => return Ok(response),
    };

    match submission {
        Submission::Saved(id) => {
            let label = M::get(state.pool(), id)
                .await?
                .map_or_else(|| id.to_string(), |r| r.to_string());
            tracing::info!(model = M::META.path, id, "Created");
            push_flash(
                &session,
                Flash::success(format!(
                    "The {} \"{label}\" was added successfully.",
                    M::META.verbose_name
                )),
            )
            .await;
            Ok(Redirect::to(&M::META.url()).into_response())
        }
        Submission::Rejected(values, errors) => {
            render_form::<M>(
                &state,
                FormScreen {
                    admin: &admin,
                    session: &session,
                    mode: FormMode::Create,
                    id: None,
                    label: None,
                    values,
                    errors,
                },
            )
            .await
        }
    }
}

/// GET /{model}/{id}/edit
#[instrument(skip_all, fields(model = M::META.path, id = %id))]
async fn edit_form<M: AdminModel>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    guard::<M>(&admin)?;
    let record = find::<M>(&state, id).await?;

    render_form::<M>(
        &state,
        FormScreen {
            admin: &admin,
            session: &session,
            mode: FormMode::Edit,
            id: Some(id),
            label: Some(record.to_string()),
            values: M::initial(&record),
            errors: FieldErrors::new(),
        },
    )
    .await
}

/// POST /{model}/{id}
#[instrument(skip_all, fields(model = M::META.path, id = %id))]
async fn update<M: AdminModel>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    guard::<M>(&admin)?;
    let current = find::<M>(&state, id).await?;
    let submission = match read_form(multipart).await {
        Body::Form(raw) => submit::<M>(&state, FormMode::Edit, Some(id), raw).await?,
        Body::TooLarge => Submission::Rejected(M::initial(&current), oversized_body_errors::<M>()),
        Body::Malformed(response) => return Ok(response),
    };

    match submission {
        Submission::Saved(id) => {
            let label = M::get(state.pool(), id)
                .await?
                .map_or_else(|| current.to_string(), |r| r.to_string());
            tracing::info!(model = M::META.path, id, "Updated");
            push_flash(
                &session,
                Flash::success(format!(
                    "The {} \"{label}\" was changed successfully.",
                    M::META.verbose_name
                )),
            )
            .await;
            Ok(Redirect::to(&M::META.url()).into_response())
        }
        Submission::Rejected(values, errors) => {
            let values = values.with_images_from(&M::initial(&current));
            render_form::<M>(
                &state,
                FormScreen {
                    admin: &admin,
                    session: &session,
                    mode: FormMode::Edit,
                    id: Some(id),
                    label: Some(current.to_string()),
                    values,
                    errors,
                },
            )
            .await
        }
    }
}

/// GET /{model}/{id}/delete
#[instrument(skip_all, fields(model = M::META.path, id = %id))]
async fn confirm_delete<M: AdminModel>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Html<String>, AppError> {
    guard::<M>(&admin)?;
    let record = find::<M>(&state, id).await?;
    let meta = M::META;

    let template = ConfirmDeleteTemplate {
        page: PageContext::load(&admin, &session, format!("{}/{id}/delete", meta.url())).await,
        meta,
        label: record.to_string(),
        action: format!("{}/{id}/delete", meta.url()),
        cancel_url: edit_url(&meta, id),
    };
    Ok(Html(template.render()?))
}

/// POST /{model}/{id}/delete
///
/// Dependent rows go with it through `ON DELETE CASCADE`.
#[instrument(skip_all, fields(model = M::META.path, id = %id))]
async fn delete<M: AdminModel>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    guard::<M>(&admin)?;
    if M::ACCOUNTS && admin.id.as_i32() == id {
        return Err(AppError::BadRequest(
            "you cannot delete your own account".to_owned(),
        ));
    }

    let label = find::<M>(&state, id).await?.to_string();
    if !M::delete(state.pool(), id).await? {
        return Err(AppError::NotFound(format!("{} {id}", M::META.verbose_name)));
    }

    tracing::info!(model = M::META.path, id, "Deleted");
    push_flash(
        &session,
        Flash::success(format!(
            "The {} \"{label}\" was deleted successfully.",
            M::META.verbose_name
        )),
    )
    .await;
    Ok(Redirect::to(&M::META.url()).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body as HttpBody, Bytes};
    use axum::extract::FromRequest;
    use axum::http::{Request, header};

    use crate::registry::{CategoryAdmin, ProductAdmin, SizeAdmin, UserAdmin};

    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn upload(bytes: Vec<u8>) -> Upload {
        Upload {
            file_name: "photo.png".to_owned(),
            bytes: Bytes::from(bytes),
        }
    }

    #[test]
    fn test_oversized_image_gets_field_error() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(usize::try_from(eshop_core::MAX_IMAGE_BYTES).unwrap() + 1, 0);
        let mut uploads = HashMap::from([("category_img".to_owned(), upload(bytes))]);
        let mut errors = FieldErrors::new();

        let accepted = check_uploads::<CategoryAdmin>(&mut uploads, &mut errors);
        assert!(accepted.is_empty());
        assert_eq!(errors.get("category_img"), ["Max size of file is 1 MB"]);
    }

    #[test]
    fn test_valid_image_is_accepted() {
        let mut uploads =
            HashMap::from([("avatar".to_owned(), upload(PNG_HEADER.to_vec()))]);
        let mut errors = FieldErrors::new();

        let accepted = check_uploads::<UserAdmin>(&mut uploads, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].1, "avatar");
    }

    #[test]
    fn test_uploads_for_unknown_fields_are_ignored() {
        let mut uploads =
            HashMap::from([("avatar".to_owned(), upload(PNG_HEADER.to_vec()))]);
        let mut errors = FieldErrors::new();

        let accepted = check_uploads::<SizeAdmin>(&mut uploads, &mut errors);
        assert!(accepted.is_empty());
        assert!(errors.is_empty());
    }

    fn multipart_request(file_len: usize) -> Request<HttpBody> {
        let mut body = b"--X\r\nContent-Disposition: form-data; name=\"category_img\"; \
                         filename=\"big.png\"\r\nContent-Type: image/png\r\n\r\n"
            .to_vec();
        body.extend(PNG_HEADER);
        body.resize(body.len() + file_len, 0);
        body.extend(b"\r\n--X--\r\n");
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=X")
            .body(HttpBody::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_body_over_limit_is_reported_as_too_large() {
        // No `DefaultBodyLimit` layer here, so axum's 2 MiB default applies.
        let multipart = Multipart::from_request(multipart_request(3 * 1024 * 1024), &())
            .await
            .unwrap();
        assert!(matches!(read_form(multipart).await, Body::TooLarge));

        let multipart = Multipart::from_request(multipart_request(16), &())
            .await
            .unwrap();
        let Body::Form(raw) = read_form(multipart).await else {
            panic!("small body should be read");
        };
        assert!(raw.uploads.contains_key("category_img"));
    }

    #[test]
    fn test_oversized_body_errors_land_on_image_fields() {
        let errors = oversized_body_errors::<ProductAdmin>();
        assert_eq!(errors.get("prod_img"), ["Max size of file is 1 MB"]);

        let errors = oversized_body_errors::<SizeAdmin>();
        assert_eq!(errors.non_field(), ["Max size of file is 1 MB"]);
    }

    #[test]
    fn test_write_errors_map_to_fields() {
        let errors =
            write_errors::<CategoryAdmin>(RepositoryError::Conflict("dup".to_owned())).unwrap();
        assert_eq!(
            errors.get("category_name"),
            ["Category with this Slug already exists."]
        );

        let errors = write_errors::<CategoryAdmin>(RepositoryError::InvalidReference(
            "sub_category_category_id_fkey".to_owned(),
        ))
        .unwrap();
        assert_eq!(errors.non_field(), [INVALID_REFERENCE]);

        assert!(write_errors::<CategoryAdmin>(RepositoryError::NotFound).is_err());
    }
}
