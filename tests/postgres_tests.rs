// tests/postgres_tests.rs
//
// Exercises the Postgres repositories against a live database. Skipped
// unless DATABASE_URL is set.

use blog_backend::{
    config::{Config, StorageBackend},
    models::{
        article::{ArticleListParams, ArticleStatus, CreateArticleRequest},
        comment::CreateCommentRequest,
        common::PageParams,
        like::TargetType,
        user::RegisterRequest,
    },
    repository::Repositories,
    services::Services,
};
use sqlx::postgres::PgPoolOptions;

async fn services() -> Option<Services> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let config = Config {
        storage: StorageBackend::Postgres,
        database_url: Some(database_url),
        database_max_connections: 2,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        server_port: 0,
        cors_origins: vec![],
        admin_username: None,
        admin_email: None,
        admin_password: None,
    };
    Some(Services::new(Repositories::postgres(pool), &config))
}

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}

async fn register(services: &Services) -> i64 {
    let username = unique("pg");
    services
        .users
        .register(RegisterRequest {
            email: format!("{}@example.com", username),
            username,
            password: "password123".to_string(),
            nickname: None,
        })
        .await
        .expect("Failed to register")
        .id
}

#[tokio::test]
async fn counters_follow_comments_and_likes() {
    let Some(services) = services().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let author = register(&services).await;

    let article = services
        .articles
        .create(
            author,
            CreateArticleRequest {
                title: unique("Counted"),
                content: "body".to_string(),
                summary: None,
                cover_image_url: None,
                status: Some(ArticleStatus::Published),
                category_ids: Vec::new(),
                tag_ids: Vec::new(),
            },
        )
        .await
        .unwrap();

    let top = services
        .comments
        .create(
            article.id,
            author,
            CreateCommentRequest { content: "top".to_string(), parent_id: None },
        )
        .await
        .unwrap();
    services
        .comments
        .create(
            article.id,
            author,
            CreateCommentRequest { content: "reply".to_string(), parent_id: Some(top.id) },
        )
        .await
        .unwrap();

    let liked = services.likes.toggle(author, TargetType::Article, article.id).await.unwrap();
    assert!(liked.is_liked);

    let detail = services.articles.get(article.id, Some(author)).await.unwrap();
    assert_eq!(detail.comment_count, 2);
    assert_eq!(detail.like_count, 1);
    assert!(detail.is_liked);

    let page = services
        .comments
        .list_by_article(article.id, PageParams::default(), None)
        .await
        .unwrap();
    assert_eq!(page.items[0].reply_count, 1);

    services.comments.delete(top.id, author).await.unwrap();
    let unliked = services.likes.toggle(author, TargetType::Article, article.id).await.unwrap();
    assert!(!unliked.is_liked);

    let detail = services.articles.get(article.id, Some(author)).await.unwrap();
    assert_eq!(detail.comment_count, 0);
    assert_eq!(detail.like_count, 0);
}

#[tokio::test]
async fn drafts_are_hidden_from_anonymous_lists() {
    let Some(services) = services().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let author = register(&services).await;

    services
        .articles
        .create(
            author,
            CreateArticleRequest {
                title: unique("Draft"),
                content: "wip".to_string(),
                summary: None,
                cover_image_url: None,
                status: None,
                category_ids: Vec::new(),
                tag_ids: Vec::new(),
            },
        )
        .await
        .unwrap();

    let params = ArticleListParams { author_id: Some(author), ..Default::default() };
    let anonymous = services.articles.list(params.clone(), None).await.unwrap();
    assert_eq!(anonymous.pagination.total, 0);
    let own = services.articles.list(params, Some(author)).await.unwrap();
    assert_eq!(own.pagination.total, 1);
}
