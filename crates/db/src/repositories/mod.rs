//! Repository structs for database CRUD operations.
//!
//! Each repository is a zero-sized struct with async methods that accept
//! a `&PgPool` (or an open transaction) as the first argument.

pub mod comment_repo;
pub mod company_repo;
pub mod dashboard_repo;
pub mod favorite_repo;
pub mod notification_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use company_repo::CompanyRepo;
pub use dashboard_repo::DashboardRepo;
pub use favorite_repo::FavoriteRepo;
pub use notification_repo::NotificationRepo;
pub use user_repo::UserRepo;
