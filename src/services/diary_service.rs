use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    calendar::{DateRange, MonthPeriod, WeekPeriod},
    models::{
        CreateDiaryInput, DailyDiaries, Diary, DiaryDetail, DiaryLikeInfo, MonthlyDiaries,
        UpdateDiaryInput, WeeklyDiaries,
    },
    AppError, AppResult,
};

/// Row values for a diary about to be inserted
#[derive(Debug, Clone)]
pub struct NewDiary {
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub emotion: Option<String>,
    pub weather: Option<String>,
    pub image: Option<String>,
    pub is_public: bool,
    pub diary_date: NaiveDate,
}

impl NewDiary {
    pub fn from_input(
        input: CreateDiaryInput,
        user_id: i32,
        image: Option<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            user_id,
            title: input.title.trim().to_string(),
            content: input.content,
            emotion: input.emotion,
            weather: input.weather,
            image,
            is_public: input.is_public,
            diary_date: input.diary_date.unwrap_or(today),
        }
    }
}

/// Diary persistence and rules.
///
/// Mutating operations run on a transaction handle owned by the request's
/// transaction scope; implementations never commit on their own.
#[async_trait]
pub trait DiaryService: Send + Sync + 'static {
    type Tx: Send + 'static;

    async fn begin(&self) -> AppResult<Self::Tx>;
    async fn commit(&self, tx: Self::Tx) -> AppResult<()>;
    async fn rollback(&self, tx: Self::Tx) -> AppResult<()>;

    async fn create_diary(&self, tx: &mut Self::Tx, diary: NewDiary) -> AppResult<Diary>;

    async fn update_diary(
        &self,
        tx: &mut Self::Tx,
        diary_id: i32,
        user_id: i32,
        input: UpdateDiaryInput,
    ) -> AppResult<()>;

    async fn delete_diary(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()>;

    async fn read_diary_detail(
        &self,
        tx: &mut Self::Tx,
        diary_id: i32,
        viewer_id: i32,
    ) -> AppResult<DiaryDetail>;

    async fn create_diary_like(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()>;

    async fn delete_diary_like(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()>;

    async fn get_diary_like(&self, diary_id: i32, user_id: i32) -> AppResult<DiaryLikeInfo>;

    /// The user's diaries with `diary_date` inside `range`, oldest first
    async fn list_user_diaries_between(&self, user_id: i32, range: DateRange) -> AppResult<Vec<Diary>>;

    /// All of the user's diaries, newest first
    async fn read_user_diary(&self, user_id: i32) -> AppResult<Vec<Diary>>;

    async fn read_user_diary_monthly(
        &self,
        user_id: i32,
        period: MonthPeriod,
    ) -> AppResult<MonthlyDiaries> {
        let diaries = self.list_user_diaries_between(user_id, period.range).await?;

        Ok(MonthlyDiaries {
            year: period.year,
            month: period.month,
            diaries,
        })
    }

    async fn read_user_diary_weekly(
        &self,
        user_id: i32,
        period: WeekPeriod,
    ) -> AppResult<WeeklyDiaries> {
        let diaries = self.list_user_diaries_between(user_id, period.range).await?;

        Ok(WeeklyDiaries {
            year: period.year,
            month: period.month,
            week: period.week,
            start_date: period.range.start,
            end_date: period.range.last_day(),
            diaries,
        })
    }

    async fn read_user_diary_daily(&self, user_id: i32, date: NaiveDate) -> AppResult<DailyDiaries> {
        let diaries = self
            .list_user_diaries_between(user_id, DateRange::single_day(date)?)
            .await?;

        Ok(DailyDiaries { date, diaries })
    }
}

pub fn diary_not_found(diary_id: i32) -> AppError {
    AppError::NotFound(format!("Diary {} not found", diary_id))
}

pub fn ensure_owner(diary: &Diary, user_id: i32) -> AppResult<()> {
    if diary.is_owned_by(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Diary {} belongs to another user",
            diary.id
        )))
    }
}

pub fn ensure_visible(diary: &Diary, user_id: i32) -> AppResult<()> {
    if diary.is_visible_to(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("Diary {} is private", diary.id)))
    }
}
