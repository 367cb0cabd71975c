use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use utoipa::ToSchema;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Diary {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub emotion: Option<String>,
    pub weather: Option<String>,
    /// Stored file name of the uploaded image, served under `/uploads`
    pub image: Option<String>,
    pub is_public: bool,
    pub diary_date: NaiveDate,
    #[serde(serialize_with = "serialize_naive_as_utc")]
    pub created_at: NaiveDateTime,
    #[serde(serialize_with = "serialize_naive_as_utc")]
    pub updated_at: NaiveDateTime,
}

impl Diary {
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }

    pub fn is_visible_to(&self, user_id: i32) -> bool {
        self.is_public || self.is_owned_by(user_id)
    }
}

/// Diary with the like state as seen by the requesting user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiaryDetail {
    #[serde(flatten)]
    pub diary: Diary,
    pub like_count: i64,
    pub liked: bool,
    pub is_mine: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiaryLikeInfo {
    pub diary_id: i32,
    pub like_count: i64,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyDiaries {
    pub year: i32,
    pub month: u32,
    pub diaries: Vec<Diary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyDiaries {
    pub year: i32,
    pub month: u32,
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub diaries: Vec<Diary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyDiaries {
    pub date: NaiveDate,
    pub diaries: Vec<Diary>,
}

fn serialize_naive_as_utc<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use chrono::SecondsFormat;
    let utc_dt = DateTime::<Utc>::from_naive_utc_and_offset(*dt, Utc);
    utc_dt.to_rfc3339_opts(SecondsFormat::Millis, true).serialize(serializer)
}
