//! Unit tests for the local bookmark store.
//!
//! Exercises the `BookmarkStoreTrait` interface against an in-memory SQLite
//! database: creation, updates with server-side normalization, and tags.

use chrono::{TimeZone, Utc};

use bookmark_editor::database::Database;
use bookmark_editor::managers::bookmark_store::{BookmarkStore, BookmarkStoreTrait};
use bookmark_editor::types::bookmark::{
    AssetContent, AssetType, BookmarkContent, BookmarkRecord, LinkContent, TagUpdate, TextContent,
};
use bookmark_editor::types::errors::StoreError;
use bookmark_editor::types::form::{LinkPatch, UpdateBookmarkRequest};

fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

fn link_record(id: &str) -> BookmarkRecord {
    BookmarkRecord {
        id: id.to_string(),
        title: None,
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        tags: vec![],
        content: BookmarkContent::Link(LinkContent {
            url: "https://a.com".to_string(),
            title: Some("A".to_string()),
            description: Some("about a".to_string()),
            author: Some("X".to_string()),
            publisher: None,
            date_published: Some(Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap()),
            date_modified: None,
        }),
    }
}

/// Every content kind reads back as inserted.
#[test]
fn test_insert_and_get_round_trip_every_kind() {
    let db = setup();
    let mut store = BookmarkStore::new(db.connection());

    let records = vec![
        link_record("l1"),
        BookmarkRecord {
            id: "t1".to_string(),
            title: Some("Note".to_string()),
            created_at: None,
            tags: vec![],
            content: BookmarkContent::Text(TextContent {
                text: "hello".to_string(),
            }),
        },
        BookmarkRecord {
            id: "a1".to_string(),
            title: None,
            created_at: Some(Utc.with_ymd_and_hms(2022, 3, 4, 5, 6, 7).unwrap()),
            tags: vec![],
            content: BookmarkContent::Asset(AssetContent {
                asset_type: AssetType::Image,
                asset_id: "asset-9".to_string(),
                file_name: Some("cat.png".to_string()),
            }),
        },
        BookmarkRecord {
            id: "u1".to_string(),
            title: None,
            created_at: None,
            tags: vec![],
            content: BookmarkContent::Unknown,
        },
    ];

    for record in &records {
        store.insert_bookmark(record).unwrap();
    }
    for record in &records {
        assert_eq!(&store.get_bookmark(&record.id).unwrap(), record);
    }
    assert_eq!(store.list_bookmarks().unwrap().len(), 4);
}

/// New bookmarks get an id, a creation date and a trimmed title.
#[test]
fn test_create_bookmark_generates_id_and_date() {
    let db = setup();
    let mut store = BookmarkStore::new(db.connection());

    let created = store
        .create_bookmark(
            Some("  Rust  "),
            BookmarkContent::Link(LinkContent {
                url: "https://rust-lang.org".to_string(),
                ..Default::default()
            }),
        )
        .unwrap();

    assert!(!created.id.is_empty());
    assert!(created.created_at.is_some());
    assert_eq!(created.title.as_deref(), Some("Rust"));
    assert_eq!(store.get_bookmark(&created.id).unwrap().title.as_deref(), Some("Rust"));
}

/// Unknown ids report NotFound.
#[test]
fn test_get_missing_bookmark_is_not_found() {
    let db = setup();
    let store = BookmarkStore::new(db.connection());
    assert!(matches!(
        store.get_bookmark("nope"),
        Err(StoreError::NotFound(id)) if id == "nope"
    ));
}

/// Updates trim text and store empty text as NULL.
#[test]
fn test_apply_update_trims_and_nulls_empty_text() {
    let db = setup();
    let mut store = BookmarkStore::new(db.connection());
    store.insert_bookmark(&link_record("l1")).unwrap();

    let request = UpdateBookmarkRequest {
        bookmark_id: "l1".to_string(),
        title: Some("  Trimmed  ".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap(),
        link: Some(LinkPatch {
            url: " https://b.com ".to_string(),
            description: Some("   ".to_string()),
            author: Some(" Jane ".to_string()),
            publisher: None,
            date_published: None,
            date_modified: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        }),
    };
    let updated = store.apply_update(&request).unwrap();
    let link = updated.content.as_link().unwrap();

    assert_eq!(updated.title.as_deref(), Some("Trimmed"));
    assert_eq!(updated.created_at, Some(request.created_at));
    assert_eq!(link.url, "https://b.com");
    assert_eq!(link.description, None);
    assert_eq!(link.author.as_deref(), Some("Jane"));
    assert_eq!(link.date_published, None);
    assert_eq!(link.date_modified, request.link.as_ref().unwrap().date_modified);
    // The link's own title is not editable through the form.
    assert_eq!(link.title.as_deref(), Some("A"));
}

/// A null title clears the stored title.
#[test]
fn test_apply_update_with_null_title_clears_it() {
    let db = setup();
    let mut store = BookmarkStore::new(db.connection());
    let mut record = link_record("l1");
    record.title = Some("Old".to_string());
    store.insert_bookmark(&record).unwrap();

    let request = UpdateBookmarkRequest {
        bookmark_id: "l1".to_string(),
        title: None,
        created_at: record.created_at.unwrap(),
        link: None,
    };
    let updated = store.apply_update(&request).unwrap();
    assert_eq!(updated.title, None);
    assert_eq!(updated.content, record.content);
}

/// Link fields cannot be applied to a note.
#[test]
fn test_link_patch_on_note_is_rejected() {
    let db = setup();
    let mut store = BookmarkStore::new(db.connection());
    store
        .insert_bookmark(&BookmarkRecord {
            id: "t1".to_string(),
            title: None,
            created_at: None,
            tags: vec![],
            content: BookmarkContent::Text(TextContent {
                text: "x".to_string(),
            }),
        })
        .unwrap();

    let request = UpdateBookmarkRequest {
        bookmark_id: "t1".to_string(),
        title: None,
        created_at: Utc::now(),
        link: Some(LinkPatch {
            url: "https://a.com".to_string(),
            ..Default::default()
        }),
    };
    assert!(matches!(
        store.apply_update(&request),
        Err(StoreError::NotALink(_))
    ));
}

/// Tags attach and detach by name and are shared between bookmarks.
#[test]
fn test_update_tags_attach_and_detach() {
    let db = setup();
    let mut store = BookmarkStore::new(db.connection());
    store.insert_bookmark(&link_record("l1")).unwrap();
    store.insert_bookmark(&link_record("l2")).unwrap();

    let tagged = store
        .update_tags(
            "l1",
            &TagUpdate {
                attach: vec!["rust".to_string(), " web ".to_string(), "".to_string()],
                detach: vec![],
            },
        )
        .unwrap();
    let names: Vec<&str> = tagged.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["rust", "web"]);

    // Tags are shared by name across bookmarks.
    let other = store
        .update_tags(
            "l2",
            &TagUpdate {
                attach: vec!["rust".to_string()],
                detach: vec![],
            },
        )
        .unwrap();
    assert_eq!(other.tags[0].id, tagged.tags[0].id);

    let detached = store
        .update_tags(
            "l1",
            &TagUpdate {
                attach: vec![],
                detach: vec!["rust".to_string()],
            },
        )
        .unwrap();
    assert_eq!(detached.tags.len(), 1);
    assert_eq!(detached.tags[0].name, "web");
}

/// A failing attach rolls back the tags attached before it.
#[test]
fn test_update_tags_is_all_or_nothing() {
    let db = setup();
    db.connection()
        .execute_batch(
            "CREATE TRIGGER reject_broken_tag BEFORE INSERT ON tags
             WHEN NEW.name = 'broken'
             BEGIN SELECT RAISE(ABORT, 'tag rejected'); END;",
        )
        .unwrap();
    let mut store = BookmarkStore::new(db.connection());
    store.insert_bookmark(&link_record("l1")).unwrap();

    let result = store.update_tags(
        "l1",
        &TagUpdate {
            attach: vec!["rust".to_string(), "broken".to_string()],
            detach: vec![],
        },
    );
    assert!(matches!(result, Err(StoreError::DatabaseError(_))));

    assert!(store.get_bookmark("l1").unwrap().tags.is_empty());
    let tags: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tags, 0);
}

/// Tag updates on unknown bookmarks report NotFound.
#[test]
fn test_update_tags_unknown_bookmark() {
    let db = setup();
    let mut store = BookmarkStore::new(db.connection());
    assert!(matches!(
        store.update_tags("ghost", &TagUpdate::default()),
        Err(StoreError::NotFound(_))
    ));
}

/// Removing deletes the row; removing twice is NotFound.
#[test]
fn test_remove_bookmark() {
    let db = setup();
    let mut store = BookmarkStore::new(db.connection());
    store.insert_bookmark(&link_record("l1")).unwrap();
    store
        .update_tags(
            "l1",
            &TagUpdate {
                attach: vec!["rust".to_string()],
                detach: vec![],
            },
        )
        .unwrap();

    store.remove_bookmark("l1").unwrap();
    assert!(store.list_bookmarks().unwrap().is_empty());
    assert!(matches!(
        store.remove_bookmark("l1"),
        Err(StoreError::NotFound(_))
    ));
}
