use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Diary API",
        version = "1.0.0",
        description = "Backend API for writing, browsing and liking diaries"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Diary
        crate::handlers::diary_handler::create_diary,
        crate::handlers::diary_handler::update_diary,
        crate::handlers::diary_handler::delete_diary,
        crate::handlers::diary_handler::read_diary_detail,
        crate::handlers::diary_handler::create_diary_like,
        crate::handlers::diary_handler::delete_diary_like,
        crate::handlers::diary_handler::get_diary_like,

        // Calendar listings
        crate::handlers::diary_handler::read_user_diary_monthly,
        crate::handlers::diary_handler::read_user_diary_weekly,
        crate::handlers::diary_handler::read_user_diary_daily,
        crate::handlers::diary_handler::read_user_diary,

        crate::handlers::diary_handler::report_diary,
    ),
    components(
        schemas(
            crate::models::Diary,
            crate::models::DiaryDetail,
            crate::models::DiaryLikeInfo,
            crate::models::MonthlyDiaries,
            crate::models::WeeklyDiaries,
            crate::models::DailyDiaries,
            crate::models::CreateDiaryInput,
            crate::models::UpdateDiaryInput,
            crate::models::ApiMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "diary", description = "Diary management"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "access-token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
