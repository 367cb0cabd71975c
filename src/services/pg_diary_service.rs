use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::diary_service::{diary_not_found, ensure_owner, ensure_visible, DiaryService, NewDiary};
use crate::{
    calendar::DateRange,
    models::{Diary, DiaryDetail, DiaryLikeInfo, UpdateDiaryInput},
    AppError, AppResult,
};

const DIARY_COLUMNS: &str = "id, user_id, title, content, emotion, weather, image, is_public, diary_date, created_at, updated_at";

pub struct PgDiaryService {
    db: PgPool,
}

impl PgDiaryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn find_diary<'e, E>(executor: E, diary_id: i32, for_update: bool) -> AppResult<Diary>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let mut sql = format!(
        r#"SELECT {} FROM "Diaries" WHERE id = $1 AND deleted = false"#,
        DIARY_COLUMNS
    );
    if for_update {
        sql.push_str(" FOR UPDATE");
    }

    sqlx::query_as::<_, Diary>(&sql)
        .bind(diary_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| diary_not_found(diary_id))
}

async fn like_info<'e, E>(executor: E, diary_id: i32, user_id: i32) -> AppResult<DiaryLikeInfo>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let (like_count, liked): (i64, bool) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(BOOL_OR(user_id = $2), false)
        FROM "DiaryLikes"
        WHERE diary_id = $1
        "#,
    )
    .bind(diary_id)
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    Ok(DiaryLikeInfo {
        diary_id,
        like_count,
        liked,
    })
}

#[async_trait]
impl DiaryService for PgDiaryService {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> AppResult<Self::Tx> {
        Ok(self.db.begin().await?)
    }

    async fn commit(&self, tx: Self::Tx) -> AppResult<()> {
        tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, "Transaction commit failed");
            AppError::Internal(format!("Failed to commit transaction: {}", e))
        })
    }

    async fn rollback(&self, tx: Self::Tx) -> AppResult<()> {
        Ok(tx.rollback().await?)
    }

    async fn create_diary(&self, tx: &mut Self::Tx, diary: NewDiary) -> AppResult<Diary> {
        let sql = format!(
            r#"
            INSERT INTO "Diaries" (
                user_id, title, content, emotion, weather, image, is_public, diary_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            DIARY_COLUMNS
        );

        let created = sqlx::query_as::<_, Diary>(&sql)
            .bind(diary.user_id)
            .bind(&diary.title)
            .bind(&diary.content)
            .bind(&diary.emotion)
            .bind(&diary.weather)
            .bind(&diary.image)
            .bind(diary.is_public)
            .bind(diary.diary_date)
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }

    async fn update_diary(
        &self,
        tx: &mut Self::Tx,
        diary_id: i32,
        user_id: i32,
        input: UpdateDiaryInput,
    ) -> AppResult<()> {
        let diary = find_diary(&mut **tx, diary_id, true).await?;
        ensure_owner(&diary, user_id)?;

        sqlx::query(
            r#"
            UPDATE "Diaries"
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                emotion = CASE WHEN $4 THEN $5 ELSE emotion END,
                weather = CASE WHEN $6 THEN $7 ELSE weather END,
                is_public = COALESCE($8, is_public),
                diary_date = COALESCE($9, diary_date),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(diary_id)
        .bind(input.title.as_deref().map(str::trim))
        .bind(&input.content)
        .bind(input.emotion.is_some())
        .bind(input.emotion.flatten())
        .bind(input.weather.is_some())
        .bind(input.weather.flatten())
        .bind(input.is_public)
        .bind(input.diary_date)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn delete_diary(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()> {
        let diary = find_diary(&mut **tx, diary_id, true).await?;
        ensure_owner(&diary, user_id)?;

        // Soft delete by setting deleted = true
        sqlx::query(r#"UPDATE "Diaries" SET deleted = true, updated_at = NOW() WHERE id = $1"#)
            .bind(diary_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn read_diary_detail(
        &self,
        tx: &mut Self::Tx,
        diary_id: i32,
        viewer_id: i32,
    ) -> AppResult<DiaryDetail> {
        let diary = find_diary(&mut **tx, diary_id, false).await?;
        ensure_visible(&diary, viewer_id)?;

        let likes = like_info(&mut **tx, diary_id, viewer_id).await?;
        let is_mine = diary.is_owned_by(viewer_id);

        Ok(DiaryDetail {
            diary,
            like_count: likes.like_count,
            liked: likes.liked,
            is_mine,
        })
    }

    async fn create_diary_like(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()> {
        let diary = find_diary(&mut **tx, diary_id, false).await?;
        ensure_visible(&diary, user_id)?;

        sqlx::query(
            r#"
            INSERT INTO "DiaryLikes" (diary_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (diary_id, user_id) DO NOTHING
            "#,
        )
        .bind(diary_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn delete_diary_like(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()> {
        find_diary(&mut **tx, diary_id, false).await?;

        sqlx::query(r#"DELETE FROM "DiaryLikes" WHERE diary_id = $1 AND user_id = $2"#)
            .bind(diary_id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn get_diary_like(&self, diary_id: i32, user_id: i32) -> AppResult<DiaryLikeInfo> {
        let diary = find_diary(&self.db, diary_id, false).await?;
        ensure_visible(&diary, user_id)?;

        like_info(&self.db, diary_id, user_id).await
    }

    async fn list_user_diaries_between(&self, user_id: i32, range: DateRange) -> AppResult<Vec<Diary>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM "Diaries"
            WHERE deleted = false AND user_id = $1 AND diary_date >= $2 AND diary_date < $3
            ORDER BY diary_date, id
            "#,
            DIARY_COLUMNS
        );

        let diaries = sqlx::query_as::<_, Diary>(&sql)
            .bind(user_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.db)
            .await?;

        Ok(diaries)
    }

    async fn read_user_diary(&self, user_id: i32) -> AppResult<Vec<Diary>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM "Diaries"
            WHERE deleted = false AND user_id = $1
            ORDER BY diary_date DESC, id DESC
            "#,
            DIARY_COLUMNS
        );

        let diaries = sqlx::query_as::<_, Diary>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await?;

        Ok(diaries)
    }
}
