use crate::adapter::HistoryRouter;
use crate::domain::{Memory, PlaceEntry, Route};
use crate::ports::outbound::Router;
use crate::usecase::collection_view::{DreamsView, LoadOutcome, MemoriesView};
use crate::usecase::dreams::DreamsUseCase;
use common::adapter::{FixedClock, InMemoryBackend, MemoryLog, NoopLog, Op};
use common::domain::TableName;
use serde_json::json;
use std::sync::Arc;

use super::NOW_MS;

fn seeded() -> Arc<InMemoryBackend> {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed(
        TableName::POSTS,
        vec![
            json!({"id": "p1", "title": "Swim", "place_name": "Beach Crete", "keyword": "beach", "visited_at": "2024-05-01", "created_at": "2024-05-02"}),
            json!({"id": "p2", "title": "Walk", "place_name": "Beach Athens", "keyword": "beach", "visited_at": "2024-05-03", "created_at": "2024-05-03"}),
            json!({"id": "p3", "title": "Museum", "place_name": "Acropolis Museum", "keyword": "BEACH", "visited_at": "2024-05-03", "created_at": "2024-05-04"}),
            json!({"id": "p4", "title": "Lunch", "place_name": "Plaka", "keyword": "", "visited_at": null, "created_at": "2024-04-01"}),
            json!({"id": "p5", "title": "Ferry", "place_name": "Piraeus", "keyword": null, "visited_at": "2024-01-10", "created_at": "2024-01-10"}),
        ],
    );
    backend
}

fn ids(v: &[Memory]) -> Vec<&str> {
    v.iter().map(|m| m.id()).collect()
}

#[test]
fn test_memories_ordered_by_visit_then_creation() {
    let backend = seeded();
    let view = MemoriesView::memories(backend, Arc::new(NoopLog));
    let _active = view.activate();
    assert_eq!(view.load(), LoadOutcome::Applied);
    // visited_at が null の行は降順で先頭
    assert_eq!(ids(&view.entries()), vec!["p4", "p3", "p2", "p1", "p5"]);
    assert!(!view.is_loading());
}

#[test]
fn test_keyword_and_search_narrow_the_display() {
    let backend = seeded();
    let view = MemoriesView::memories(backend, Arc::new(NoopLog));
    let _active = view.activate();
    view.load();
    assert_eq!(view.available_keywords(), vec!["BEACH".to_string(), "beach".to_string()]);

    view.toggle_keyword_menu();
    view.select_keyword(Some("beach"));
    assert!(!view.filter_state().keyword_menu_open);
    view.set_search_query("crete");
    assert_eq!(ids(&view.displayed()), vec!["p1"]);

    // タイトルでも引ける
    view.select_keyword(None);
    view.set_search_query("MUSEUM");
    assert_eq!(ids(&view.displayed()), vec!["p3"]);
    assert_eq!(view.entries().len(), 5);
}

#[test]
fn test_reload_drops_keywords_of_removed_rows() {
    let backend = seeded();
    let view = MemoriesView::memories(backend.clone(), Arc::new(NoopLog));
    let _active = view.activate();
    view.load();
    view.delete("p3").unwrap();
    view.load();
    assert_eq!(view.available_keywords(), vec!["beach".to_string()]);
    assert!(backend.rows(TableName::POSTS).iter().all(|r| r["id"] != "p3"));
}

#[test]
fn test_failed_delete_still_hides_row_until_reload() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed(
        TableName::DREAMS,
        vec![
            json!({"id": "x", "place_name": "Santorini", "created_at": "2024-02-01"}),
            json!({"id": "y", "place_name": "Naxos", "created_at": "2024-01-01"}),
        ],
    );
    let log = Arc::new(MemoryLog::new());
    let view = DreamsView::dreams(backend.clone(), log.clone());
    let _active = view.activate();
    view.load();

    backend.fail(Some(TableName::DREAMS), Op::Delete);
    assert!(view.delete("x").is_err());
    let shown: Vec<String> = view.displayed().into_iter().map(|d| d.id).collect();
    assert_eq!(shown, vec!["y".to_string()]);
    assert!(log.messages_of_kind("remote").contains(&"delete dreams failed".to_string()));

    // 再フォーカスでサーバーの状態に戻る
    backend.clear_failures();
    view.load();
    assert_eq!(view.entries().len(), 2);
}

#[test]
fn test_failed_refocus_keeps_stale_rows_visible() {
    let backend = seeded();
    let view = MemoriesView::memories(backend.clone(), Arc::new(NoopLog));
    {
        let _first = view.activate();
        view.load();
    }
    let _second = view.activate();
    backend.fail(Some(TableName::POSTS), Op::Select);
    assert_eq!(view.load(), LoadOutcome::Failed);
    assert_eq!(view.entries().len(), 5);
    assert!(view.error().is_some());

    backend.clear_failures();
    assert_eq!(view.load(), LoadOutcome::Applied);
    assert_eq!(view.error(), None);
}

#[test]
fn test_promote_from_dreams_list_opens_prefilled_add_screen() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed(
        TableName::DREAMS,
        vec![json!({"id": "d9", "place_name": "Balos Lagoon", "address": "Kissamos", "lat": 35.58, "lng": 23.59, "keyword": " beach "})],
    );
    let view = DreamsView::dreams(backend.clone(), Arc::new(NoopLog));
    let _active = view.activate();
    view.load();
    let dream = view.find("d9").unwrap();

    let router = Arc::new(HistoryRouter::new(Route::dreams()));
    let uc = DreamsUseCase::new(
        backend.clone(),
        backend.clone(),
        Arc::new(FixedClock(NOW_MS)),
        router.clone(),
        Arc::new(NoopLog),
    );
    let draft = uc.promote(&dream);
    assert_eq!(draft.id, None);
    assert_eq!(draft.title, "Balos Lagoon");
    assert_eq!(draft.keyword, "beach");
    assert_eq!(router.current_path(), "/add");
    let params = router.current().unwrap().params;
    assert_eq!(params.get("address").map(String::as_str), Some("Kissamos"));
    assert_eq!(params.get("lng").map(String::as_str), Some("23.59"));
    assert_eq!(backend.rows(TableName::DREAMS).len(), 1);
}

#[test]
fn test_null_names_do_not_break_the_list() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed(
        TableName::DREAMS,
        vec![
            json!({"id": "d1", "place_name": "Balos", "keyword": "beach", "created_at": "2024-05-01"}),
            json!({"id": "d2", "place_name": null, "keyword": "beach", "created_at": "2024-05-02"}),
            json!({"id": 3, "place_name": "Meteora", "created_at": "2024-05-03"}),
        ],
    );
    let view = DreamsView::dreams(backend.clone(), Arc::new(NoopLog));
    let _active = view.activate();
    assert_eq!(view.load(), LoadOutcome::Applied);
    assert!(view.error().is_none());
    let loaded: Vec<String> = view.entries().iter().map(|d| d.id().to_string()).collect();
    assert_eq!(loaded, vec!["3", "d2", "d1"]);

    view.select_keyword(Some("beach"));
    view.set_search_query("bal");
    let shown: Vec<String> = view.displayed().iter().map(|d| d.id().to_string()).collect();
    assert_eq!(shown, vec!["d1"]);

    backend.seed(
        TableName::POSTS,
        vec![json!({"id": "p1", "title": null, "place_name": "Hydra", "visited_at": "2024-05-01"})],
    );
    let memories = MemoriesView::memories(backend, Arc::new(NoopLog));
    assert_eq!(memories.load(), LoadOutcome::Applied);
    assert_eq!(memories.entries()[0].name(), "Hydra");
}
