pub mod diary_service;
#[cfg(test)]
pub mod memory_diary_service;
pub mod pg_diary_service;
pub mod upload;

pub use diary_service::{DiaryService, NewDiary};
pub use pg_diary_service::PgDiaryService;
pub use upload::{FileStorage, UploadedFile};
