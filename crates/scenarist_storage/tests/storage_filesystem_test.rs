//! Tests for the filesystem artifact store and project layout.

use scenarist_core::{ChapterText, FactsAlgorithm, ScenarioStructure, ScriptStructureWithId};
use scenarist_error::StorageErrorKind;
use scenarist_storage::{
    ArtifactStore, ArtifactStoreExt, FileStage, FileSystemArtifactStore, ProjectLayout,
    project_path, read_stage_file, write_scenario_documents, write_stage_file,
};
use tempfile::TempDir;

async fn setup() -> (TempDir, ProjectLayout, FileSystemArtifactStore) {
    let temp_dir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(temp_dir.path().join("proj_1_Test"));
    layout.init().await.unwrap();
    (temp_dir, layout, FileSystemArtifactStore::new())
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let (_dir, layout, _store) = setup().await;
    layout.init().await.unwrap();

    for dir in ["DB", "FACTS", "STRUCTURE", "SCENARIO"] {
        assert!(layout.root().join(dir).is_dir(), "{dir} missing");
    }
}

#[test]
fn test_layout_paths() {
    let layout = ProjectLayout::new("/data/proj_3_Topic");

    assert_eq!(
        layout.lens_file(FactsAlgorithm::Main, 2),
        std::path::Path::new("/data/proj_3_Topic/FACTS/ALG_MAIN/HYP/lens_02.txt")
    );
    assert_eq!(
        layout.checked_file(FactsAlgorithm::BlindSpots),
        std::path::Path::new("/data/proj_3_Topic/FACTS/ALG_BLIND/CHECK/checked.txt")
    );
    assert_eq!(
        layout.serie_markdown(2, "The Return"),
        std::path::Path::new("/data/proj_3_Topic/SCENARIO/Serie_2_The_Return.md")
    );
    assert_eq!(
        project_path(std::path::Path::new("projects_root"), 5, 12, "Arctic convoys"),
        std::path::Path::new("projects_root/5/proj_12_Arctic_convoys")
    );
}

#[tokio::test]
async fn test_write_creates_parents_and_replaces() {
    let (_dir, layout, store) = setup().await;
    let path = layout.hypotheses_file(FactsAlgorithm::Main);

    store.write_text(&path, "first").await.unwrap();
    store.write_text(&path, "second").await.unwrap();

    assert_eq!(store.read_text(&path).await.unwrap(), "second");
    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_failed_rename_removes_temp_file() {
    let (_dir, layout, store) = setup().await;
    // A non-empty directory in the way makes the final rename fail.
    let path = layout.scenario_txt();
    std::fs::create_dir_all(path.join("blocker")).unwrap();

    let err = store.write_text(&path, "script").await.unwrap_err();
    assert!(matches!(
        err.as_storage().map(|e| &e.kind),
        Some(StorageErrorKind::FileWrite(_))
    ));
    assert!(!path.with_file_name(".scenario.txt.tmp").exists());
    assert!(path.join("blocker").is_dir());
}

#[tokio::test]
async fn test_read_missing_is_not_found() {
    let (_dir, layout, store) = setup().await;

    let err = store.read_text(&layout.db_extension()).await.unwrap_err();
    assert!(matches!(
        err.as_storage().map(|e| &e.kind),
        Some(StorageErrorKind::NotFound(_))
    ));
    assert_eq!(
        store.read_optional_text(&layout.db_extension()).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_json_keeps_non_ascii() {
    let (_dir, layout, store) = setup().await;
    let scenario = vec![ScenarioStructure {
        serie_number: 1,
        serie_name: "Северный конвой".to_string(),
        content: vec![],
    }];

    store
        .write_json(&layout.scenario_json(), &scenario)
        .await
        .unwrap();

    let raw = store.read_text(&layout.scenario_json()).await.unwrap();
    assert!(raw.contains("Северный конвой"));
    assert!(raw.contains('\n'));

    let back: Vec<ScenarioStructure> = store.read_json(&layout.scenario_json()).await.unwrap();
    assert_eq!(back, scenario);
}

#[tokio::test]
async fn test_read_json_malformed() {
    let (_dir, layout, store) = setup().await;
    store
        .write_text(&layout.scenario_json(), "{not json")
        .await
        .unwrap();

    let err = store
        .read_json::<Vec<ScenarioStructure>>(&layout.scenario_json())
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_storage().map(|e| &e.kind),
        Some(StorageErrorKind::Malformed { .. })
    ));
}

#[tokio::test]
async fn test_list_sources_sorted_files_only() {
    let (_dir, layout, store) = setup().await;
    std::fs::write(layout.db_dir().join("b_report.pdf"), b"%PDF").unwrap();
    std::fs::write(layout.db_dir().join("a_notes.txt"), "notes").unwrap();
    std::fs::create_dir(layout.db_dir().join("nested")).unwrap();

    let sources = store.list_sources(&layout).await.unwrap();
    let names: Vec<_> = sources
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a_notes.txt", "b_report.pdf"]);
}

#[tokio::test]
async fn test_list_sources_without_db_dir() {
    let temp_dir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(temp_dir.path().join("never_created"));
    let store = FileSystemArtifactStore::new();

    assert!(store.list_sources(&layout).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_project() {
    let (_dir, layout, store) = setup().await;
    store
        .write_text(&layout.db_extension(), "facts")
        .await
        .unwrap();

    store.remove_project(&layout).await.unwrap();
    assert!(!layout.root().exists());

    // Removing twice is fine.
    store.remove_project(&layout).await.unwrap();
}

#[tokio::test]
async fn test_stage_files() {
    let (_dir, layout, store) = setup().await;

    let stage = FileStage::parse("check_facts_blind").unwrap();
    assert_eq!(read_stage_file(&store, &layout, stage).await.unwrap(), "");

    let path = write_stage_file(&store, &layout, stage, "1. Edited")
        .await
        .unwrap();
    assert_eq!(path, layout.checked_file(FactsAlgorithm::BlindSpots));
    assert_eq!(
        read_stage_file(&store, &layout, stage).await.unwrap(),
        "1. Edited"
    );
}

#[test]
fn test_unknown_stage() {
    let err = FileStage::parse("scenario").unwrap_err();
    assert_eq!(err.kind, StorageErrorKind::UnknownStage("scenario".to_string()));
}

#[tokio::test]
async fn test_structure_stage_validates_and_assigns_ids() {
    let (_dir, layout, store) = setup().await;

    let edited = r#"[{"serie_number": 1, "serie_name": "Pilot", "content": [
        {"chapter_number": 1, "chapter_name": "Harbour", "chapter_description": "Ships gather"}
    ]}]"#;
    write_stage_file(&store, &layout, FileStage::Structure, edited)
        .await
        .unwrap();

    let saved: Vec<ScriptStructureWithId> =
        store.read_json(&layout.structure_json()).await.unwrap();
    assert_eq!(saved[0].serie_name, "Pilot");
    assert!(!saved[0].serie_id.is_empty());
    assert!(!saved[0].content[0].chapter_id.is_empty());

    let err = write_stage_file(&store, &layout, FileStage::Structure, "[{\"serie\": 1}]")
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_storage().map(|e| &e.kind),
        Some(StorageErrorKind::Malformed { .. })
    ));
    // The previous structure is untouched.
    let still: Vec<ScriptStructureWithId> =
        store.read_json(&layout.structure_json()).await.unwrap();
    assert_eq!(still, saved);
}

#[tokio::test]
async fn test_scenario_documents() {
    let (_dir, layout, store) = setup().await;
    let scenario = vec![ScenarioStructure {
        serie_number: 1,
        serie_name: "Pilot episode".to_string(),
        content: vec![ChapterText {
            chapter_number: 1,
            chapter_name: "Harbour".to_string(),
            chapter_description: "Ships gather".to_string(),
            text: "Grey water.\n".to_string(),
        }],
    }];

    let paths = write_scenario_documents(&store, &layout, &scenario)
        .await
        .unwrap();

    assert_eq!(paths, vec![layout.scenario_dir().join("Serie_1_Pilot_episode.md")]);
    let md = std::fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(
        md,
        "# 1. Pilot episode\n\n## 1. Harbour\n\n*Ships gather*\n\nGrey water.\n"
    );
}
