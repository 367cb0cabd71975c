use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    calendar::{self, MonthPeriod, WeekPeriod},
    extractors::{
        ApiJson, ApiPath, ApiQuery, AuthenticatedUser, CreateDiaryForm, StagedUploads,
        TransactionHandle,
    },
    models::{
        messages, ApiMessage, ApiResponse, CreateDiaryInput, DailyDiaries, Diary, DiaryDetail,
        DiaryLikeInfo, MonthlyDiaries, UpdateDiaryInput, WeeklyDiaries,
    },
    services::{DiaryService, NewDiary},
    AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    /// Defaults to the current year
    pub year: Option<i32>,
    /// 1-12, defaults to the current month
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeekQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Sunday-started week of the month, starting at 1
    pub week: Option<u32>,
}

/// 다이어리 등록 API
///
/// POST /api/diary/create - JSON body, or multipart/form-data with an optional `file`
#[utoipa::path(
    post,
    path = "/api/diary/create",
    request_body(
        content = CreateDiaryInput,
        description = "JSON body; multipart/form-data with the same fields and an optional `file` is also accepted"
    ),
    responses(
        (status = 201, description = "Diary created", body = ApiResponse<Diary>),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 422, description = "Invalid title or content")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn create_diary<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthenticatedUser,
    tx: TransactionHandle<S::Tx>,
    staged: StagedUploads,
    form: CreateDiaryForm,
) -> AppResult<(StatusCode, Json<ApiResponse<Diary>>)> {
    let CreateDiaryForm { input, file } = form;
    input.validate()?;

    // Staged files are removed by the transaction scope unless it commits
    let image = match &file {
        Some(file) => {
            let name = state.uploads.save(file).await?;
            staged.push(name.clone()).await;
            Some(name)
        }
        None => None,
    };

    let today = calendar::today(state.config.calendar_offset);
    let new_diary = NewDiary::from_input(input, auth.user_id, image, today);

    let mut guard = tx.lock().await?;
    let diary = state.diary.create_diary(&mut *guard, new_diary).await?;

    tracing::info!(
        diary_id = diary.id,
        user_id = auth.user_id,
        has_image = diary.image.is_some(),
        "Diary created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(messages::CREATED, diary)),
    ))
}

/// 다이어리 수정 API
///
/// PUT /api/diary/update/{diaryId}
#[utoipa::path(
    put,
    path = "/api/diary/update/{diaryId}",
    params(
        ("diaryId" = i32, Path, description = "숫자로 입력해주세요")
    ),
    request_body = UpdateDiaryInput,
    responses(
        (status = 200, description = "Diary updated", body = ApiMessage),
        (status = 400, description = "Empty update or malformed body"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Diary belongs to another user"),
        (status = 404, description = "Diary not found")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn update_diary<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    ApiPath(diary_id): ApiPath<i32>,
    auth: AuthenticatedUser,
    tx: TransactionHandle<S::Tx>,
    ApiJson(input): ApiJson<UpdateDiaryInput>,
) -> AppResult<Json<ApiMessage>> {
    input.validate()?;

    let mut guard = tx.lock().await?;
    state
        .diary
        .update_diary(&mut *guard, diary_id, auth.user_id, input)
        .await?;

    tracing::info!(diary_id, user_id = auth.user_id, "Diary updated");
    Ok(Json(ApiMessage::new(messages::UPDATED)))
}

/// 다이어리 삭제 API
///
/// DELETE /api/diary/delete/{diaryId} (soft delete)
#[utoipa::path(
    delete,
    path = "/api/diary/delete/{diaryId}",
    params(
        ("diaryId" = i32, Path, description = "숫자로 입력해주세요")
    ),
    responses(
        (status = 200, description = "Diary deleted", body = ApiMessage),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Diary belongs to another user"),
        (status = 404, description = "Diary not found")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn delete_diary<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    ApiPath(diary_id): ApiPath<i32>,
    auth: AuthenticatedUser,
    tx: TransactionHandle<S::Tx>,
) -> AppResult<Json<ApiMessage>> {
    let mut guard = tx.lock().await?;
    state.diary.delete_diary(&mut *guard, diary_id, auth.user_id).await?;

    tracing::info!(diary_id, user_id = auth.user_id, "Diary deleted");
    Ok(Json(ApiMessage::new(messages::DELETED)))
}

/// 다이어리 상세 조회 API
///
/// GET /api/diary/read/{diaryId}
#[utoipa::path(
    get,
    path = "/api/diary/read/{diaryId}",
    params(
        ("diaryId" = i32, Path, description = "숫자로 입력해주세요")
    ),
    responses(
        (status = 200, description = "Diary with like state", body = ApiResponse<DiaryDetail>),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Diary is private"),
        (status = 404, description = "Diary not found")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn read_diary_detail<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    ApiPath(diary_id): ApiPath<i32>,
    auth: AuthenticatedUser,
    tx: TransactionHandle<S::Tx>,
) -> AppResult<Json<ApiResponse<DiaryDetail>>> {
    let mut guard = tx.lock().await?;
    let detail = state
        .diary
        .read_diary_detail(&mut *guard, diary_id, auth.user_id)
        .await?;

    Ok(Json(ApiResponse::new(messages::DETAIL, detail)))
}

/// 다이어리 좋아요 생성 API
///
/// POST /api/diary/uplike/{diaryId} - liking twice keeps a single like
#[utoipa::path(
    post,
    path = "/api/diary/uplike/{diaryId}",
    params(
        ("diaryId" = i32, Path, description = "숫자로 입력해주세요")
    ),
    responses(
        (status = 200, description = "Like recorded", body = ApiMessage),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Diary is private"),
        (status = 404, description = "Diary not found")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn create_diary_like<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    ApiPath(diary_id): ApiPath<i32>,
    auth: AuthenticatedUser,
    tx: TransactionHandle<S::Tx>,
) -> AppResult<Json<ApiMessage>> {
    let mut guard = tx.lock().await?;
    state
        .diary
        .create_diary_like(&mut *guard, diary_id, auth.user_id)
        .await?;

    tracing::debug!(diary_id, user_id = auth.user_id, "Diary liked");
    Ok(Json(ApiMessage::new(messages::LIKED)))
}

/// 다이어리 좋아요 취소 API
///
/// POST /api/diary/downlike/{diaryId} - no-op when the user has not liked it
#[utoipa::path(
    post,
    path = "/api/diary/downlike/{diaryId}",
    params(
        ("diaryId" = i32, Path, description = "숫자로 입력해주세요")
    ),
    responses(
        (status = 200, description = "Like removed", body = ApiMessage),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "Diary not found")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn delete_diary_like<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    ApiPath(diary_id): ApiPath<i32>,
    auth: AuthenticatedUser,
    tx: TransactionHandle<S::Tx>,
) -> AppResult<Json<ApiMessage>> {
    let mut guard = tx.lock().await?;
    state
        .diary
        .delete_diary_like(&mut *guard, diary_id, auth.user_id)
        .await?;

    tracing::debug!(diary_id, user_id = auth.user_id, "Diary like removed");
    Ok(Json(ApiMessage::new(messages::UNLIKED)))
}

/// 다이어리 좋아요 정보 조회 API
///
/// GET /api/diary/getlike/{diaryId}
#[utoipa::path(
    get,
    path = "/api/diary/getlike/{diaryId}",
    params(
        ("diaryId" = i32, Path, description = "숫자로 입력해주세요")
    ),
    responses(
        (status = 200, description = "Like count and caller's like state", body = ApiResponse<DiaryLikeInfo>),
        (status = 401, description = "Missing or invalid access token"),
        (status = 403, description = "Diary is private"),
        (status = 404, description = "Diary not found")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn get_diary_like<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    ApiPath(diary_id): ApiPath<i32>,
    auth: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<DiaryLikeInfo>>> {
    let info = state.diary.get_diary_like(diary_id, auth.user_id).await?;
    Ok(Json(ApiResponse::new(messages::LIKE_INFO, info)))
}

/// 사용자가 작성한 다이어리 조회(달력표시용 - 월별) API
///
/// GET /api/diary/my/calender/month?year=&month=
#[utoipa::path(
    get,
    path = "/api/diary/my/calender/month",
    params(MonthQuery),
    responses(
        (status = 200, description = "Caller's diaries in the month", body = ApiResponse<MonthlyDiaries>),
        (status = 400, description = "Invalid year or month"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn read_user_diary_monthly<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthenticatedUser,
    ApiQuery(query): ApiQuery<MonthQuery>,
) -> AppResult<Json<ApiResponse<MonthlyDiaries>>> {
    let today = calendar::today(state.config.calendar_offset);
    let period = MonthPeriod::resolve(query.year, query.month, today)?;

    let result = state.diary.read_user_diary_monthly(auth.user_id, period).await?;
    Ok(Json(ApiResponse::new(messages::LISTED, result)))
}

/// 사용자가 작성한 다이어리 조회(달력표시용 - 주별) API
///
/// GET /api/diary/my/calender/week?year=&month=&week=
#[utoipa::path(
    get,
    path = "/api/diary/my/calender/week",
    params(WeekQuery),
    responses(
        (status = 200, description = "Caller's diaries in the week", body = ApiResponse<WeeklyDiaries>),
        (status = 400, description = "Invalid year, month or week"),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn read_user_diary_weekly<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthenticatedUser,
    ApiQuery(query): ApiQuery<WeekQuery>,
) -> AppResult<Json<ApiResponse<WeeklyDiaries>>> {
    let today = calendar::today(state.config.calendar_offset);
    let period = WeekPeriod::resolve(query.year, query.month, query.week, today)?;

    let result = state.diary.read_user_diary_weekly(auth.user_id, period).await?;
    Ok(Json(ApiResponse::new(messages::LISTED, result)))
}

/// 사용자가 작성한 다이어리 조회(달력표시용 - 일별) API
///
/// GET /api/diary/my/calender/day
#[utoipa::path(
    get,
    path = "/api/diary/my/calender/day",
    responses(
        (status = 200, description = "Caller's diaries for today", body = ApiResponse<DailyDiaries>),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn read_user_diary_daily<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<DailyDiaries>>> {
    let today = calendar::today(state.config.calendar_offset);

    let result = state.diary.read_user_diary_daily(auth.user_id, today).await?;
    Ok(Json(ApiResponse::new(messages::LISTED, result)))
}

/// 사용자가 작성한 다이어리 전체 조회 API
///
/// GET /api/diary/my
#[utoipa::path(
    get,
    path = "/api/diary/my",
    responses(
        (status = 200, description = "All of the caller's diaries, newest first", body = ApiResponse<Vec<Diary>>),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "diary",
    security(("access-token" = []))
)]
pub async fn read_user_diary<S: DiaryService>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Diary>>>> {
    let diaries = state.diary.read_user_diary(auth.user_id).await?;
    Ok(Json(ApiResponse::new(messages::LISTED, diaries)))
}

/// 다이어리 신고하기 API
///
/// POST /api/diary/report - accepted and ignored; reporting is not implemented yet
#[utoipa::path(
    post,
    path = "/api/diary/report",
    responses(
        (status = 201, description = "Empty response")
    ),
    tag = "diary"
)]
pub async fn report_diary() -> StatusCode {
    StatusCode::CREATED
}
