pub mod auth;
pub mod diary_form;
pub mod rejection;
pub mod transaction;

pub use auth::AuthenticatedUser;
pub use diary_form::CreateDiaryForm;
pub use rejection::{ApiJson, ApiPath, ApiQuery};
pub use transaction::{StagedUploads, TransactionHandle};
