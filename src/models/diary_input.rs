use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::{AppError, AppResult};

pub const TITLE_MAX_CHARS: usize = 100;
/// Column width of `emotion` and `weather`
pub const TAG_MAX_CHARS: usize = 50;

/// Input for creating a diary entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiaryInput {
    pub title: String,
    pub content: String,
    pub emotion: Option<String>,
    pub weather: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    /// Defaults to today when omitted
    pub diary_date: Option<NaiveDate>,
}

impl CreateDiaryInput {
    pub fn validate(&self) -> AppResult<()> {
        validate_title(&self.title)?;
        validate_content(&self.content)?;
        validate_tag("emotion", self.emotion.as_deref())?;
        validate_tag("weather", self.weather.as_deref())
    }
}

/// Input for updating a diary entry; absent fields are left unchanged.
///
/// `emotion` and `weather` distinguish an absent field (`None`) from an
/// explicit `null` (`Some(None)`), which clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiaryInput {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>)]
    pub emotion: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<String>)]
    pub weather: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub diary_date: Option<NaiveDate>,
}

/// Maps a present field to `Some`, keeping `null` as `Some(None)`
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateDiaryInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.is_empty() {
            return Err(AppError::BadRequest(
                "At least one field must be provided".to_string(),
            ));
        }
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            validate_content(content)?;
        }
        if let Some(emotion) = &self.emotion {
            validate_tag("emotion", emotion.as_deref())?;
        }
        if let Some(weather) = &self.weather {
            validate_tag("weather", weather.as_deref())?;
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.emotion.is_none()
            && self.weather.is_none()
            && self.is_public.is_none()
            && self.diary_date.is_none()
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at most {} characters",
            TITLE_MAX_CHARS
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    Ok(())
}

fn validate_tag(field: &str, value: Option<&str>) -> AppResult<()> {
    match value {
        Some(value) if value.chars().count() > TAG_MAX_CHARS => Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, TAG_MAX_CHARS
        ))),
        _ => Ok(()),
    }
}
