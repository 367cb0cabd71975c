use axum::{
    extract::{
        multipart::{Field, MultipartError},
        FromRequest, Multipart, Request,
    },
    http::header,
    Json,
};
use chrono::NaiveDate;

use crate::{models::CreateDiaryInput, services::UploadedFile, AppError, AppResult};

/// Body of the create endpoint: JSON without a file, or multipart/form-data
/// with the same fields plus an optional `file`
#[derive(Debug)]
pub struct CreateDiaryForm {
    pub input: CreateDiaryInput,
    pub file: Option<UploadedFile>,
}

impl<S> FromRequest<S> for CreateDiaryForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart).await
        } else {
            let Json(input) = Json::<CreateDiaryInput>::from_request(req, state).await?;
            Ok(Self { input, file: None })
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

async fn field_text(field: Field<'_>) -> AppResult<String> {
    field.text().await.map_err(multipart_error)
}

/// Empty form values count as absent
fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<CreateDiaryForm> {
    let mut title = None;
    let mut content = None;
    let mut emotion = None;
    let mut weather = None;
    let mut is_public = false;
    let mut diary_date = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(AppError::BadRequest(
                        "Only one file may be uploaded per request".to_string(),
                    ));
                }
                let original_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !bytes.is_empty() {
                    file = Some(UploadedFile { original_name, bytes });
                }
            }
            "title" => title = Some(field_text(field).await?),
            "content" => content = Some(field_text(field).await?),
            "emotion" => emotion = non_empty(field_text(field).await?),
            "weather" => weather = non_empty(field_text(field).await?),
            "isPublic" => is_public = parse_bool(&field_text(field).await?)?,
            "diaryDate" => {
                if let Some(raw) = non_empty(field_text(field).await?) {
                    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                        .map_err(|e| AppError::BadRequest(format!("Invalid diaryDate: {}", e)))?;
                    diary_date = Some(date);
                }
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let input = CreateDiaryInput {
        title: title.ok_or_else(|| AppError::BadRequest("Missing required field: title".to_string()))?,
        content: content
            .ok_or_else(|| AppError::BadRequest("Missing required field: content".to_string()))?,
        emotion,
        weather,
        is_public,
        diary_date,
    };

    Ok(CreateDiaryForm { input, file })
}

fn parse_bool(raw: &str) -> AppResult<bool> {
    match raw.trim() {
        "" | "false" | "0" => Ok(false),
        "true" | "1" => Ok(true),
        other => Err(AppError::BadRequest(format!(
            "isPublic must be true or false, got {}",
            other
        ))),
    }
}
