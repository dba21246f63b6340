//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside a caller-owned transaction take `&mut PgConnection` instead.

pub mod category_repo;
pub mod comment_repo;
pub mod genre_repo;
pub mod review_repo;
pub mod session_repo;
pub mod title_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use comment_repo::CommentRepo;
pub use genre_repo::GenreRepo;
pub use review_repo::ReviewRepo;
pub use session_repo::SessionRepo;
pub use title_repo::TitleRepo;
pub use user_repo::UserRepo;
