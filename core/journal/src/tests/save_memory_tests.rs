use crate::adapter::HistoryRouter;
use crate::domain::draft::MSG_TITLE_AND_DATE;
use crate::domain::photo::{png_bytes, MAX_PHOTO_WIDTH};
use image::GenericImageView;
use crate::domain::{MemoryDraft, Route};
use crate::ports::outbound::Router;
use crate::usecase::post_detail::PostDetailUseCase;
use crate::usecase::save_memory::{SaveMemoryUseCase, MSG_NOT_SIGNED_IN};
use common::adapter::{FixedClock, InMemoryBackend, MemoryLog, Op, StdFileSystem};
use common::domain::TableName;
use common::error::Error;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use super::NOW_MS;

struct Fixture {
    backend: Arc<InMemoryBackend>,
    router: Arc<HistoryRouter>,
    log: Arc<MemoryLog>,
    uc: SaveMemoryUseCase,
}

fn fixture(start: Route) -> Fixture {
    let backend = Arc::new(InMemoryBackend::new());
    backend.set_session_for(Some("u1"));
    let router = Arc::new(HistoryRouter::new(start));
    let log = Arc::new(MemoryLog::new());
    let uc = SaveMemoryUseCase::new(
        backend.clone(),
        backend.clone(),
        backend.clone(),
        Arc::new(StdFileSystem),
        Arc::new(FixedClock(NOW_MS)),
        router.clone(),
        log.clone(),
        "photos",
    );
    Fixture {
        backend,
        router,
        log,
        uc,
    }
}

fn draft(title: &str) -> MemoryDraft {
    let mut d = MemoryDraft::new("2024-06-01");
    d.title = title.to_string();
    d
}

fn photos(dir: &tempfile::TempDir, n: usize) -> Vec<PathBuf> {
    (0..n)
        .map(|i| {
            let p = dir.path().join(format!("img{}.png", i));
            std::fs::write(&p, png_bytes(8 + i as u32, 6)).unwrap();
            p
        })
        .collect()
}

#[test]
fn test_create_inserts_with_author_and_lists() {
    let f = fixture(Route::to("/add"));
    let mut d = draft("Sunset at Oia");
    d.lat = "36.46".to_string();
    d.keyword = "sea".to_string();
    let id = f.uc.save(&d, &[]).unwrap();

    let rows = f.backend.rows(TableName::POSTS);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(id));
    assert_eq!(rows[0]["author_id"], json!("u1"));
    assert_eq!(rows[0]["lat"], json!(36.46));
    assert_eq!(rows[0]["lng"], json!(null));
    assert_eq!(rows[0]["body"], json!(null));
    assert_eq!(f.backend.rows(TableName::PROFILES).len(), 1);
    assert_eq!(f.router.current_path(), "/my-posts");
    assert_eq!(f.router.history().len(), 1);
}

#[test]
fn test_photos_upload_in_order_and_first_is_cover() {
    let f = fixture(Route::to("/add"));
    let dir = tempfile::tempdir().unwrap();
    let id = f.uc.save(&draft("Meteora"), &photos(&dir, 2)).unwrap();

    let first = format!("{}/{}_0.jpg", id, NOW_MS);
    let second = format!("{}/{}_1.jpg", id, NOW_MS);
    assert_eq!(
        f.backend.object_paths(),
        vec![format!("photos/{}", first), format!("photos/{}", second)]
    );
    let media = f.backend.rows(TableName::MEDIA);
    assert_eq!(media.len(), 2);
    assert_eq!(media[0]["url"], json!(first));
    assert_eq!(media[1]["post_id"], json!(id));
    assert_eq!(f.backend.rows(TableName::POSTS)[0]["cover_url"], json!(first));
}

#[test]
fn test_invalid_draft_touches_nothing_remote() {
    let f = fixture(Route::to("/add"));
    let mut d = draft("");
    assert_eq!(f.uc.save(&d, &[]), Err(Error::validation(MSG_TITLE_AND_DATE)));
    d.title = "Plaka".to_string();
    d.visited_at = "2024-13-01".to_string();
    assert!(matches!(f.uc.save(&d, &[]), Err(Error::Validation(_))));
    assert!(f.backend.rows(TableName::POSTS).is_empty());
    assert!(f.backend.rows(TableName::PROFILES).is_empty());
    assert_eq!(f.router.current_path(), "/add");
}

#[test]
fn test_missing_photo_fails_before_any_write() {
    let f = fixture(Route::to("/add"));
    let dir = tempfile::tempdir().unwrap();
    let err = f
        .uc
        .save(&draft("Hydra"), &[dir.path().join("nope.jpg")])
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(f.backend.rows(TableName::POSTS).is_empty());
}

#[test]
fn test_wide_photo_is_stored_as_1600px_jpeg() {
    let f = fixture(Route::to("/add"));
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("wide.png");
    std::fs::write(&p, png_bytes(3200, 1800)).unwrap();
    let id = f.uc.save(&draft("Santorini"), &[p]).unwrap();

    let stored = f
        .backend
        .object(&format!("photos/{}/{}_0.jpg", id, NOW_MS))
        .unwrap();
    assert_eq!(image::guess_format(&stored).unwrap(), image::ImageFormat::Jpeg);
    let img = image::load_from_memory(&stored).unwrap();
    assert_eq!((img.width(), img.height()), (MAX_PHOTO_WIDTH, 900));
}

#[test]
fn test_unreadable_photo_fails_before_any_write() {
    let f = fixture(Route::to("/add"));
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("broken.png");
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend(std::iter::repeat(0x5A).take(64 * 1024));
    std::fs::write(&p, bytes).unwrap();

    let err = f.uc.save(&draft("Chania"), &[p]).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(f.backend.object_paths().is_empty());
    assert!(f.backend.rows(TableName::POSTS).is_empty());
    assert!(f.backend.rows(TableName::PROFILES).is_empty());
}

#[test]
fn test_requires_current_user() {
    let f = fixture(Route::to("/add"));
    f.backend.set_session_for(None);
    assert_eq!(
        f.uc.save(&draft("Delphi"), &[]),
        Err(Error::session(MSG_NOT_SIGNED_IN))
    );
    assert!(f.backend.rows(TableName::POSTS).is_empty());
}

#[test]
fn test_upload_failure_keeps_saved_memory() {
    let f = fixture(Route::to("/add"));
    f.backend.fail(None, Op::Upload);
    let dir = tempfile::tempdir().unwrap();
    let err = f.uc.save(&draft("Nafplio"), &photos(&dir, 1)).unwrap_err();
    assert_eq!(err.exit_code(), 69);
    // 手順をまたいだ巻き戻しはしない
    assert_eq!(f.backend.rows(TableName::POSTS).len(), 1);
    assert!(f.backend.rows(TableName::MEDIA).is_empty());
    assert_eq!(f.router.current_path(), "/add");
    assert!(f
        .log
        .messages_of_kind("remote")
        .contains(&"upload photo failed".to_string()));
}

#[test]
fn test_edit_round_trips_through_add_screen() {
    let f = fixture(Route::post("p1"));
    f.backend.seed(
        TableName::POSTS,
        vec![json!({"id": "p1", "author_id": "u1", "title": "Old", "place_name": "Old Town", "visited_at": "2023-09-09", "keyword": "walk"})],
    );
    let detail = PostDetailUseCase::new(
        f.backend.clone(),
        f.backend.clone(),
        Arc::new(FixedClock(NOW_MS)),
        f.router.clone(),
        f.log.clone(),
        "photos",
    );
    let memory = detail.load("p1").unwrap().memory;
    detail.open_edit(&memory);
    assert_eq!(f.router.current_path(), "/add");

    let params = f.router.current().unwrap().params;
    let mut d = MemoryDraft::from_route_params(&params, "2024-06-01");
    assert_eq!(d.id.as_deref(), Some("p1"));
    assert_eq!(d.visited_at, "2023-09-09");
    d.title = "New".to_string();

    assert_eq!(f.uc.save(&d, &[]).unwrap(), "p1");
    let rows = f.backend.rows(TableName::POSTS);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], json!("New"));
    assert_eq!(rows[0]["keyword"], json!("walk"));
    assert_eq!(f.router.current_path(), "/post/p1");
    assert_eq!(f.router.history().len(), 2);
}

#[test]
fn test_edit_of_foreign_memory_is_rejected() {
    let f = fixture(Route::to("/add"));
    f.backend.seed(
        TableName::POSTS,
        vec![json!({"id": "p7", "author_id": "someone", "title": "Theirs", "visited_at": "2024-01-01"})],
    );
    let mut d = draft("Mine now");
    d.id = Some("p7".to_string());
    assert!(matches!(f.uc.save(&d, &[]), Err(Error::NotFound(_))));
    assert_eq!(f.backend.rows(TableName::POSTS)[0]["title"], json!("Theirs"));
}
