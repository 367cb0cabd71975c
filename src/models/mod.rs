pub mod diary;
pub mod diary_input;
pub mod response;

pub use diary::{DailyDiaries, Diary, DiaryDetail, DiaryLikeInfo, MonthlyDiaries, WeeklyDiaries};
pub use diary_input::{CreateDiaryInput, UpdateDiaryInput};
pub use response::{messages, ApiMessage, ApiResponse};
