//! Campaign route handlers: banner upload and the active-campaign lookup.
//!
//! At most one campaign is active at a time. Uploading a new banner
//! atomically deactivates whatever was active before.

use std::path::Path;

use axum::{
    Json,
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    AppState, Error,
    models::{Campaign, CampaignDraft},
    stores::{CampaignStore, TransactionStore},
};

/// File extensions accepted for campaign banner images.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Handle the upload of a new campaign banner.
///
/// Expects a multipart form with a required `image` file field and
/// optional `starts_at`/`ends_at` RFC 3339 timestamp fields. The image is
/// written to the uploads directory under a timestamped file name, and the
/// new campaign replaces the currently active one in a single store
/// operation.
pub async fn create_campaign_endpoint<T, C>(
    State(mut state): State<AppState<T, C>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Campaign>), Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let mut image = None;
    let mut starts_at = None;
    let mut ends_at = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        match field.name() {
            Some("image") => image = Some(parse_image_field(field).await?),
            Some("starts_at") => starts_at = Some(parse_timestamp_field(field).await?),
            Some("ends_at") => ends_at = Some(parse_timestamp_field(field).await?),
            _ => {}
        }
    }

    let (file_name, data) = image.ok_or(Error::MissingImage)?;

    let stored_name = format!(
        "{}_{}",
        OffsetDateTime::now_utc().unix_timestamp(),
        file_name
    );
    let destination = state.uploads_dir.join(&stored_name);

    tokio::fs::create_dir_all(&state.uploads_dir)
        .await
        .map_err(|error| Error::FileSaveError(error.to_string()))?;
    tokio::fs::write(&destination, data)
        .await
        .map_err(|error| Error::FileSaveError(error.to_string()))?;

    tracing::debug!("Stored campaign banner at {}", destination.display());

    let campaign = state.campaign_store.replace_active(CampaignDraft {
        image_url: format!("/uploads/{stored_name}"),
        starts_at,
        ends_at,
    })?;

    Ok((StatusCode::CREATED, Json(campaign)))
}

/// Read the banner file out of a multipart field, rejecting anything that
/// is not a JPEG or PNG by file extension.
async fn parse_image_field(field: Field<'_>) -> Result<(String, Vec<u8>), Error> {
    let file_name = match field.file_name() {
        Some(file_name) => file_name.to_owned(),
        None => {
            return Err(Error::MultipartError(
                "Could not get file name from multipart form field".to_owned(),
            ));
        }
    };

    let extension = Path::new(&file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_lowercase);

    if !extension.is_some_and(|extension| IMAGE_EXTENSIONS.contains(&extension.as_str())) {
        return Err(Error::NotAnImage);
    }

    // Strip any client-supplied directory components.
    let base_name = Path::new(&file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("banner")
        .to_owned();

    let data = field
        .bytes()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?;

    tracing::debug!("Received file '{}' that is {} bytes", base_name, data.len());

    Ok((base_name, data.to_vec()))
}

async fn parse_timestamp_field(field: Field<'_>) -> Result<OffsetDateTime, Error> {
    let text = field
        .text()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?;

    OffsetDateTime::parse(&text, &Rfc3339).map_err(|_| Error::InvalidDate(text))
}

/// Handle the lookup of the currently active campaign.
///
/// Reports not-found when no campaign is active or the active campaign is
/// outside its display window.
pub async fn get_active_campaign_endpoint<T, C>(
    State(state): State<AppState<T, C>>,
) -> Result<Json<Campaign>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
    C: CampaignStore + Clone + Send + Sync,
{
    let campaign = state.campaign_store.get_active(OffsetDateTime::now_utc())?;

    Ok(Json(campaign))
}

#[cfg(test)]
mod campaign_route_tests {
    use axum::http::StatusCode;
    use axum_test::{
        TestServer,
        multipart::{MultipartForm, Part},
    };
    use rusqlite::Connection;
    use serde_json::Value;

    use crate::{build_router, pagination::PaginationConfig, stores::sqlite::create_app_state};

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        let state = create_app_state(
            connection,
            "Asia/Jakarta",
            std::env::temp_dir().as_path(),
            PaginationConfig::default(),
        )
        .unwrap();

        TestServer::new(build_router(state))
    }

    fn banner_form(file_name: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "image",
            Part::bytes(vec![0u8; 16])
                .file_name(file_name)
                .mime_type("image/png"),
        )
    }

    #[tokio::test]
    async fn create_campaign_stores_banner() {
        let server = get_test_server();

        let response = server
            .post("/api/campaigns")
            .multipart(banner_form("banner.png"))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let image_url = body["image_url"].as_str().unwrap();
        assert!(image_url.starts_with("/uploads/"));
        assert!(image_url.ends_with("_banner.png"));
    }

    #[tokio::test]
    async fn create_campaign_rejects_non_image() {
        let server = get_test_server();

        let response = server
            .post("/api/campaigns")
            .multipart(banner_form("notes.txt"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_campaign_without_image_field() {
        let server = get_test_server();

        let response = server
            .post("/api/campaigns")
            .multipart(MultipartForm::new().add_text("starts_at", "2025-01-01T00:00:00Z"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn active_campaign_is_most_recent_upload() {
        let server = get_test_server();

        server
            .post("/api/campaigns")
            .multipart(banner_form("first.png"))
            .await
            .assert_status(StatusCode::CREATED);
        let second = server
            .post("/api/campaigns")
            .multipart(banner_form("second.jpg"))
            .await;
        second.assert_status(StatusCode::CREATED);
        let second_body: Value = second.json();

        let response = server.get("/api/campaigns/active").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["image_url"], second_body["image_url"]);
    }

    #[tokio::test]
    async fn active_campaign_when_none_uploaded() {
        let server = get_test_server();

        let response = server.get("/api/campaigns/active").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
