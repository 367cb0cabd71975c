use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope carrying a typed result
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub result: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: &str, result: T) -> Self {
        Self {
            message: message.to_string(),
            result,
        }
    }
}

/// Envelope for endpoints that only report an outcome
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

pub mod messages {
    pub const CREATED: &str = "등록 성공";
    pub const UPDATED: &str = "수정 성공";
    pub const DELETED: &str = "삭제 성공";
    pub const DETAIL: &str = "상세 조회 성공";
    pub const LIKED: &str = "좋아요 생성 성공";
    pub const UNLIKED: &str = "좋아요 취소 성공";
    pub const LIKE_INFO: &str = "좋아요 정보 조회 성공";
    pub const LISTED: &str = "조회 성공";
}
