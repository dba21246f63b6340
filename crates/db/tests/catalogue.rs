//! Integration tests for the catalogue and review repositories.
//!
//! - Title genre links and rating projection
//! - Title filters
//! - Unique review per (author, title)
//! - Cascade and SET NULL behaviour

use sqlx::PgPool;
use yamdb_core::pagination::PageRequest;
use yamdb_core::review::REVIEW_UNIQUE_CONSTRAINT;
use yamdb_db::models::category::CreateCategory;
use yamdb_db::models::comment::CreateComment;
use yamdb_db::models::genre::CreateGenre;
use yamdb_db::models::review::{CreateReview, UpdateReview};
use yamdb_db::models::title::{CreateTitle, TitleFilter, UpdateTitle};
use yamdb_db::models::user::CreateUser;
use yamdb_db::repositories::{
    CategoryRepo, CommentRepo, GenreRepo, ReviewRepo, TitleRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_title(name: &str, category_id: Option<i64>, genre_ids: Vec<i64>) -> CreateTitle {
    CreateTitle {
        name: name.to_string(),
        year: 1999,
        description: None,
        category_id,
        genre_ids,
    }
}

fn new_review(title_id: i64, author_id: i64, score: i32) -> CreateReview {
    CreateReview {
        title_id,
        author_id,
        text: "Worth it".to_string(),
        score,
    }
}

async fn create_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser::signup(username.to_string(), format!("{username}@example.com")),
    )
    .await
    .unwrap()
    .id
}

async fn insert_review(pool: &PgPool, input: &CreateReview) -> Result<i64, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    ReviewRepo::insert(&mut conn, input).await.map(|r| r.id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_detail_embeds_genres_category_and_rating(pool: PgPool) {
    let category = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "Film".to_string(),
            slug: "film".to_string(),
        },
    )
    .await
    .unwrap();
    let drama = GenreRepo::create(
        &pool,
        &CreateGenre {
            name: "Drama".to_string(),
            slug: "drama".to_string(),
        },
    )
    .await
    .unwrap();

    let title = TitleRepo::create(&pool, &new_title("Matrix", Some(category.id), vec![drama.id]))
        .await
        .unwrap();

    let detail = TitleRepo::find_detail(&pool, title.id).await.unwrap().unwrap();
    assert_eq!(detail.category.unwrap().slug, "film");
    assert_eq!(detail.genre.len(), 1);
    assert_eq!(detail.rating, None);

    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    insert_review(&pool, &new_review(title.id, alice, 7)).await.unwrap();
    insert_review(&pool, &new_review(title.id, bob, 10)).await.unwrap();

    let detail = TitleRepo::find_detail(&pool, title.id).await.unwrap().unwrap();
    // AVG(7, 10) = 8.5 rounds half away from zero.
    assert_eq!(detail.rating, Some(9));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_filters(pool: PgPool) {
    let comedy = GenreRepo::create(
        &pool,
        &CreateGenre {
            name: "Comedy".to_string(),
            slug: "comedy".to_string(),
        },
    )
    .await
    .unwrap();
    TitleRepo::create(&pool, &new_title("Airplane", None, vec![comedy.id]))
        .await
        .unwrap();
    TitleRepo::create(&pool, &new_title("Alien", None, vec![]))
        .await
        .unwrap();

    let page = PageRequest::default();

    let filter = TitleFilter {
        genre: Some("COM".to_string()),
        ..Default::default()
    };
    let found = TitleRepo::list(&pool, &filter, page).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Airplane");
    assert_eq!(TitleRepo::count(&pool, &filter).await.unwrap(), 1);

    let filter = TitleFilter {
        name: Some("al".to_string()),
        ..Default::default()
    };
    assert_eq!(TitleRepo::count(&pool, &filter).await.unwrap(), 1);

    let all = TitleRepo::list(&pool, &TitleFilter::default(), page).await.unwrap();
    let names: Vec<_> = all.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Alien", "Airplane"], "titles are ordered by name descending");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_title_replaces_genres(pool: PgPool) {
    let a = GenreRepo::create(&pool, &CreateGenre { name: "A".into(), slug: "a".into() })
        .await
        .unwrap();
    let b = GenreRepo::create(&pool, &CreateGenre { name: "B".into(), slug: "b".into() })
        .await
        .unwrap();
    let title = TitleRepo::create(&pool, &new_title("T", None, vec![a.id]))
        .await
        .unwrap();

    let update = UpdateTitle {
        genre_ids: Some(vec![b.id]),
        ..Default::default()
    };
    TitleRepo::update(&pool, title.id, &update).await.unwrap().unwrap();

    let detail = TitleRepo::find_detail(&pool, title.id).await.unwrap().unwrap();
    let slugs: Vec<_> = detail.genre.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, ["b"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_review_violates_named_constraint(pool: PgPool) {
    let title = TitleRepo::create(&pool, &new_title("Dune", None, vec![]))
        .await
        .unwrap();
    let author = create_user(&pool, "critic").await;

    let first = insert_review(&pool, &new_review(title.id, author, 5)).await.unwrap();
    let err = insert_review(&pool, &new_review(title.id, author, 6))
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some(REVIEW_UNIQUE_CONSTRAINT));

    // Updating the existing review is unaffected by the constraint.
    let update = UpdateReview {
        text: None,
        score: Some(8),
    };
    let updated = ReviewRepo::update(&pool, title.id, first, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.score, 8);
    assert_eq!(updated.author, "critic");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_review_score_check_constraint(pool: PgPool) {
    let title = TitleRepo::create(&pool, &new_title("Dune", None, vec![]))
        .await
        .unwrap();
    let author = create_user(&pool, "critic").await;

    let result = insert_review(&pool, &new_review(title.id, author, 11)).await;
    assert!(result.is_err(), "score above 10 should be rejected");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_delete_sets_null_and_title_delete_cascades(pool: PgPool) {
    let category = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "Book".to_string(),
            slug: "book".to_string(),
        },
    )
    .await
    .unwrap();
    let title = TitleRepo::create(&pool, &new_title("Emma", Some(category.id), vec![]))
        .await
        .unwrap();
    let author = create_user(&pool, "reader").await;
    let review_id = insert_review(&pool, &new_review(title.id, author, 4)).await.unwrap();
    CommentRepo::create(
        &pool,
        &CreateComment {
            review_id,
            author_id: author,
            text: "Agreed".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(CategoryRepo::delete_by_slug(&pool, "book").await.unwrap());
    let title_row = TitleRepo::find_by_id(&pool, title.id).await.unwrap().unwrap();
    assert_eq!(title_row.category_id, None);

    assert!(TitleRepo::delete(&pool, title.id).await.unwrap());
    assert_eq!(ReviewRepo::count_for_title(&pool, title.id).await.unwrap(), 0);
    assert_eq!(CommentRepo::count_for_review(&pool, review_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_search_and_login_stamp(pool: PgPool) {
    create_user(&pool, "alice").await;
    create_user(&pool, "bob").await;

    assert_eq!(UserRepo::count(&pool, Some("ali")).await.unwrap(), 1);
    assert_eq!(UserRepo::count(&pool, None).await.unwrap(), 2);

    let alice = UserRepo::find_by_username(&pool, "alice").await.unwrap().unwrap();
    assert!(alice.last_login_at.is_none());
    let stamped = UserRepo::record_login(&pool, alice.id).await.unwrap().unwrap();
    assert!(stamped.last_login_at.is_some());
}
