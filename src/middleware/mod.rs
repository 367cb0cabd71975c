pub mod auth_guard;
pub mod metrics;
pub mod request_id;
pub mod transaction;

pub use auth_guard::require_auth;
pub use metrics::metrics_middleware;
pub use request_id::request_id_middleware;
pub use transaction::transaction_scope;
