//! `sqlx` + PostgreSQL implementations. Schema lives in `migrations/`.

mod article;
mod article_image;
mod category;
mod comment;
mod like;
mod tag;
mod user;

pub use article::PgArticleRepository;
pub use article_image::PgArticleImageRepository;
pub use category::PgCategoryRepository;
pub use comment::PgCommentRepository;
pub use like::PgLikeRepository;
pub use tag::PgTagRepository;
pub use user::PgUserRepository;

/// `%keyword%` for ILIKE, with the LIKE wildcards in the input escaped.
pub(crate) fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
