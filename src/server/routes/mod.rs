pub mod categories;
pub mod questions;
pub mod session;
pub mod users;
pub mod visits;

pub use categories::category_router;
pub use questions::questions_router;
pub use session::session_router;
pub use users::users_router;
pub use visits::visits_router;

pub type ApiResponse<T> = Result<T, super::error::ApiError>;
