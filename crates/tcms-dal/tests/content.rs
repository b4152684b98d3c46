use futures::TryStreamExt as _;
use sqlx::Executor;
use tcms_dal::{
    Error, ListingParams, Order,
    page::{CreatePage, PageRepositoryImpl},
    content::Clear,
    story::{CreateStory, StoryRepositoryImpl, UpdateStory},
    user::{CreateUser, UserRepositoryImpl},
};

const TEST_DATA: &str = r#"
INSERT INTO story (id, title, slug, summary, body, published, cover_image, images, created_by, created_at, updated_at)
VALUES (1, 'Indra Jatra', 'indra-jatra', 'Festival of rain god', NULL, TRUE, 'covers/indra.jpg', '["g/indra1.jpg","g/indra2.jpg"]', 'editor@localhost', '2025-01-01T10:00:00Z', '2025-01-01T10:00:00Z');
INSERT INTO story (id, title, slug, summary, body, published, cover_image, images, created_by, created_at, updated_at)
VALUES (2, 'Bisket Jatra', 'bisket-jatra', NULL, NULL, FALSE, 'covers/bisket.jpg', NULL, 'editor@localhost', '2025-01-02T10:00:00Z', '2025-01-02T10:00:00Z');
INSERT INTO story (id, title, slug, summary, body, published, cover_image, images, created_by, created_at, updated_at)
VALUES (3, 'Patan Museum', 'patan-museum', NULL, NULL, TRUE, NULL, 'g/patan.jpg', 'editor@localhost', '2025-01-03T10:00:00Z', '2025-01-03T10:00:00Z');
"#;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    tcms_dal::migrate(&conn).await.unwrap();

    conn.execute_many(TEST_DATA)
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

    conn
}

fn new_story(title: &str, slug: &str) -> CreateStory {
    CreateStory {
        title: title.to_string(),
        slug: slug.to_string(),
        summary: None,
        body: None,
        published: None,
        cover_image: None,
        images: None,
        created_by: Some("editor@localhost".to_string()),
    }
}

#[tokio::test]
async fn test_story_images_normalized_on_read() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);

    let gallery = repo.get(1).await.unwrap();
    assert_eq!(gallery.images, vec!["g/indra1.jpg", "g/indra2.jpg"]);

    let cover_only = repo.get(2).await.unwrap();
    assert_eq!(cover_only.images, vec!["covers/bisket.jpg"]);
    assert!(!cover_only.published);

    let legacy_single = repo.get(3).await.unwrap();
    assert_eq!(legacy_single.images, vec!["g/patan.jpg"]);
}

#[tokio::test]
async fn test_story_create() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);

    let mut payload = new_story("Durbar Festival", "durbar-festival");
    payload.cover_image = Some("covers/durbar.jpg".to_string());
    let story = repo.create(payload).await.unwrap();

    assert_eq!(story.title, "Durbar Festival");
    assert_eq!(story.slug, "durbar-festival");
    assert!(story.id > 3);
    assert!(!story.published);
    assert_eq!(story.images, vec!["covers/durbar.jpg"]);
    assert_eq!(story.created_at, story.updated_at);

    let by_slug = repo.get_by_slug("durbar-festival").await.unwrap();
    assert_eq!(by_slug.id, story.id);
}

#[tokio::test]
async fn test_story_slug_conflict() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);

    let res = repo.create(new_story("Another Indra", "indra-jatra")).await;
    assert!(matches!(res, Err(Error::Conflict(_))));

    // slugs are compared case insensitively
    let res = repo.create(new_story("Another Indra", "Indra-Jatra")).await;
    assert!(matches!(res, Err(Error::Conflict(_))));
}

#[tokio::test]
async fn test_story_partial_update() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);

    let before = repo.get(1).await.unwrap();
    let update = UpdateStory {
        summary: Some("Eight days of masked dances".to_string()),
        ..Default::default()
    };
    let after = repo.update(1, update).await.unwrap();

    assert_eq!(after.summary.as_deref(), Some("Eight days of masked dances"));
    assert_eq!(after.title, before.title);
    assert_eq!(after.slug, before.slug);
    assert_eq!(after.images, before.images);
    assert_eq!(after.published, before.published);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);

    let update = UpdateStory {
        images: Some(vec!["g/new.jpg".to_string()]),
        published: Some(false),
        ..Default::default()
    };
    let after = repo.update(1, update).await.unwrap();
    assert_eq!(after.images, vec!["g/new.jpg"]);
    assert!(!after.published);
}

#[tokio::test]
async fn test_stored_images_exclude_cover() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);

    let cover_only = repo.get(2).await.unwrap();
    assert_eq!(cover_only.images, vec!["covers/bisket.jpg"]);
    assert!(cover_only.stored_images.is_empty());

    let gallery = repo.get(1).await.unwrap();
    assert_eq!(gallery.stored_images, gallery.images);

    let scalar = repo.get(3).await.unwrap();
    assert_eq!(scalar.stored_images, vec!["g/patan.jpg"]);
}

#[tokio::test]
async fn test_update_clears_optional_columns() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);

    let update = UpdateStory {
        clear: Clear {
            summary: true,
            images: true,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(!update.is_empty());
    let after = repo.update(1, update).await.unwrap();
    assert_eq!(after.summary, None);
    assert!(after.stored_images.is_empty());
    assert_eq!(after.images, vec!["covers/indra.jpg"]);

    // fallback follows cover again
    let update = UpdateStory {
        cover_image: Some("covers/indra-2025.jpg".to_string()),
        ..Default::default()
    };
    let after = repo.update(1, update).await.unwrap();
    assert_eq!(after.images, vec!["covers/indra-2025.jpg"]);

    // present value wins over clear
    let update = UpdateStory {
        summary: Some("Kumari chariot procession".to_string()),
        clear: Clear {
            summary: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let after = repo.update(1, update).await.unwrap();
    assert_eq!(after.summary.as_deref(), Some("Kumari chariot procession"));
}

#[tokio::test]
async fn test_update_missing() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);
    let update = UpdateStory {
        title: Some("Nothing".to_string()),
        ..Default::default()
    };
    let res = repo.update(999, update).await;
    assert!(matches!(res, Err(Error::RecordNotFound(_))));
}

#[tokio::test]
async fn test_story_listing() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);

    let all = repo.list(ListingParams::default()).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.rows.len(), 3);

    let published = repo
        .list(ListingParams::default().only_published())
        .await
        .unwrap();
    assert_eq!(published.total, 2);
    assert!(published.rows.iter().all(|s| s.published));

    let page = repo
        .list(ListingParams::new(1, 1).with_order(vec![Order::Desc("created_at".into())]))
        .await
        .unwrap();
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].slug, "bisket-jatra");
    assert_eq!(page.total, 3);

    let res = repo
        .list(ListingParams::default().with_order(vec![Order::Asc("created_by".into())]))
        .await;
    assert!(matches!(res, Err(Error::InvalidOrderByField(_))));

    let latest = repo.latest(2).await.unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].slug, "patan-museum");
}

#[tokio::test]
async fn test_story_delete() {
    let conn = init_db().await;
    let repo = StoryRepositoryImpl::new(conn);

    repo.delete(2).await.unwrap();
    assert!(matches!(repo.get(2).await, Err(Error::RecordNotFound(_))));
    assert!(matches!(repo.delete(2).await, Err(Error::RecordNotFound(_))));
    assert_eq!(repo.count(None).await.unwrap(), 2);
}

#[tokio::test]
async fn test_pages_are_separate() {
    let conn = init_db().await;
    let repo = PageRepositoryImpl::new(conn);

    // same slug as a story is fine for a page
    let page = repo
        .create(CreatePage {
            title: "About Us".to_string(),
            slug: "indra-jatra".to_string(),
            summary: Some("Who we are".to_string()),
            body: Some("We are a small team".to_string()),
            published: Some(true),
            cover_image: None,
            images: None,
            created_by: None,
        })
        .await
        .unwrap();
    assert!(page.published);
    assert!(page.images.is_empty());
    assert_eq!(repo.count(Some(true)).await.unwrap(), 1);
}

#[tokio::test]
async fn test_users() {
    let conn = init_db().await;
    let repo = UserRepositoryImpl::new(conn);

    let user = repo
        .create(CreateUser {
            email: "editor@example.com".parse().unwrap(),
            name: "Editor".to_string(),
            password: "kathmandu".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(user.email, "editor@example.com");

    let checked = repo
        .check_password("editor@example.com", "kathmandu")
        .await
        .unwrap();
    assert_eq!(checked, user);

    let res = repo.check_password("editor@example.com", "pokhara1").await;
    assert!(matches!(res, Err(Error::InvalidCredentials)));
    let res = repo.check_password("nobody@example.com", "kathmandu").await;
    assert!(matches!(res, Err(Error::InvalidCredentials)));

    repo.change_password("editor@example.com", "pokhara1")
        .await
        .unwrap();
    assert!(repo
        .check_password("editor@example.com", "pokhara1")
        .await
        .is_ok());

    let duplicate = repo
        .create(CreateUser {
            email: "editor@example.com".parse().unwrap(),
            name: "Other".to_string(),
            password: "password".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(Error::Conflict(_))));

    assert_eq!(repo.list(10).await.unwrap().len(), 1);
    repo.delete(user.id).await.unwrap();
    assert!(matches!(
        repo.find_by_email("editor@example.com").await,
        Err(Error::RecordNotFound(_))
    ));
}
