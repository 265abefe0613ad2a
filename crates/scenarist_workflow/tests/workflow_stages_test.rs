//! Stage-by-stage tests against a scripted driver and a temporary project.

mod test_utils;

use scenarist_core::{FactsAlgorithm, ScenarioStructure, ScriptStructureWithId};
use scenarist_error::{ScenaristError, StorageErrorKind, WorkflowErrorKind};
use scenarist_workflow::{WorkflowConfig, WriteOptions};
use test_utils::{MockReply, ScriptedDriver, config, engine, project};

const STRUCTURE_JSON: &str = r#"[
  {"serie_number": 2, "serie_name": "Aftermath", "content": [
    {"chapter_number": 5, "chapter_name": "Return", "chapter_description": "Survivors come home."}
  ]},
  {"serie_number": 1, "serie_name": "Origins", "content": [
    {"chapter_number": 1, "chapter_name": "Harbour", "chapter_description": "Ships gather."},
    {"chapter_number": 3, "chapter_name": "Departure", "chapter_description": "The convoy sails."}
  ]}
]"#;

fn workflow_kind(err: &ScenaristError) -> Option<&WorkflowErrorKind> {
    err.as_workflow().map(|e| &e.kind)
}

fn read(path: impl AsRef<std::path::Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn test_expand_attaches_all_sources_in_name_order() {
    let (_dir, layout) = project(&[("b_log.txt", "Ship log"), ("a_notes.txt", "Notes")]).await;
    let engine = engine(ScriptedDriver::new(["1. Fact one\n2. Fact two"]), config());

    let report = engine.expand_database(&layout).await.unwrap();

    assert_eq!(report.calls, 1);
    assert_eq!(report.usage.total_tokens, 15);
    assert_eq!(report.outputs, vec![layout.db_extension()]);
    assert_eq!(read(layout.db_extension()), "1. Fact one\n2. Fact two");

    let requests = engine.driver().requests();
    let names: Vec<&str> = requests[0]
        .attachments()
        .iter()
        .map(|a| a.filename().as_str())
        .collect();
    assert_eq!(names, vec!["a_notes.txt", "b_log.txt"]);
    assert_eq!(requests[0].model().as_deref(), Some("test-model"));
    assert!(!*requests[0].web_search());
}

#[tokio::test]
async fn test_expand_without_sources() {
    let (_dir, layout) = project(&[]).await;
    let engine = engine(ScriptedDriver::new(Vec::<String>::new()), config());

    let err = engine.expand_database(&layout).await.unwrap_err();
    assert!(matches!(workflow_kind(&err), Some(WorkflowErrorKind::NoSources(_))));
    assert!(engine.driver().requests().is_empty());
}

#[tokio::test]
async fn test_expand_rejects_unsupported_source() {
    let (_dir, layout) = project(&[("notes.txt", "ok"), ("scan.docx", "binary")]).await;
    let engine = engine(ScriptedDriver::new(["unused"]), config());

    let err = engine.expand_database(&layout).await.unwrap_err();
    assert!(matches!(
        err.as_storage().map(|e| &e.kind),
        Some(StorageErrorKind::UnsupportedFormat(_))
    ));
    assert_eq!(engine.driver().remaining(), 1);
}

#[tokio::test]
async fn test_search_requires_expanded_database() {
    let (_dir, layout) = project(&[("notes.txt", "ok")]).await;
    let engine = engine(ScriptedDriver::new(["unused"]), config());

    let err = engine
        .find_connections(&layout, FactsAlgorithm::Main)
        .await
        .unwrap_err();
    match workflow_kind(&err) {
        Some(WorkflowErrorKind::MissingInput { stage, producer, .. }) => {
            assert_eq!(stage, "search");
            assert_eq!(producer, "expand");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_search_seeds_each_lens_with_merged_findings() {
    let (_dir, layout) = project(&[("notes.txt", "ok")]).await;
    std::fs::write(layout.db_extension(), "expanded facts").unwrap();
    let driver = ScriptedDriver::new([
        "1. The convoy sailed early.\n\n2. The escort was recalled.",
        "1. The escort was  recalled.\n\n2. A report was ignored.",
        "- A weather station went silent.",
    ]);
    let engine = engine(driver, config());

    let report = engine
        .find_connections(&layout, FactsAlgorithm::Main)
        .await
        .unwrap();

    assert_eq!(report.calls, 3);
    assert_eq!(report.algorithm, Some(FactsAlgorithm::Main));
    assert_eq!(
        read(layout.hypotheses_file(FactsAlgorithm::Main)),
        "1. The convoy sailed early.\n\n2. The escort was recalled.\n\n\
         3. A report was ignored.\n\n4. A weather station went silent.\n"
    );
    for lens in 1..=3 {
        assert!(layout.lens_file(FactsAlgorithm::Main, lens).is_file());
    }

    let requests = engine.driver().requests();
    assert!(requests.iter().all(|r| *r.thinking()));
    assert!(requests[0].prompt().contains("lens 1 of 3"));
    assert!(requests[0].prompt().contains("None yet."));
    assert!(requests[1].prompt().contains("2. The escort was recalled."));
    assert!(!requests[1].prompt().contains("A report was ignored"));
    assert!(requests[2].prompt().contains("3. A report was ignored."));
    assert_eq!(requests[2].attachments()[0].filename(), "db_extension.txt");
}

#[tokio::test]
async fn test_search_resume_reuses_lens_files() {
    let (_dir, layout) = project(&[("notes.txt", "ok")]).await;
    std::fs::write(layout.db_extension(), "expanded facts").unwrap();
    std::fs::create_dir_all(layout.hyp_dir(FactsAlgorithm::BlindSpots)).unwrap();
    std::fs::write(
        layout.lens_file(FactsAlgorithm::BlindSpots, 1),
        "1. Nobody interviewed the stokers.",
    )
    .unwrap();

    let driver = ScriptedDriver::new(["1. The harbour master's diary is missing."]);
    let engine = engine(driver, config().with_resume(true));

    let report = engine
        .find_connections(&layout, FactsAlgorithm::BlindSpots)
        .await
        .unwrap();

    assert_eq!(report.calls, 1);
    let requests = engine.driver().requests();
    assert!(requests[0].prompt().contains("1. Nobody interviewed the stokers."));
    assert_eq!(
        read(layout.hypotheses_file(FactsAlgorithm::BlindSpots)),
        "1. Nobody interviewed the stokers.\n\n2. The harbour master's diary is missing.\n"
    );
}

#[tokio::test]
async fn test_failed_lens_keeps_earlier_lenses() {
    let (_dir, layout) = project(&[("notes.txt", "ok")]).await;
    std::fs::write(layout.db_extension(), "expanded facts").unwrap();
    let driver = ScriptedDriver::with_replies([
        MockReply::Text("1. First finding.".to_string()),
        MockReply::Fail,
    ]);
    let engine = engine(driver, config());

    assert!(
        engine
            .find_connections(&layout, FactsAlgorithm::Main)
            .await
            .is_err()
    );
    assert!(layout.lens_file(FactsAlgorithm::Main, 1).is_file());
    assert!(!layout.lens_file(FactsAlgorithm::Main, 2).exists());
    assert_eq!(
        read(layout.hypotheses_file(FactsAlgorithm::Main)),
        "1. First finding.\n"
    );
    // Lens 1 was billed even though the stage failed.
    assert_eq!(engine.spent().total_tokens, 15);
    assert_eq!(engine.take_spent().total_tokens, 15);
    assert_eq!(engine.spent().total_tokens, 0);
}

#[tokio::test]
async fn test_check_uses_web_search() {
    let (_dir, layout) = project(&[("notes.txt", "ok")]).await;
    let engine = engine(ScriptedDriver::new(["Confirmed: 1."]), config());

    let err = engine
        .check_hypotheses(&layout, FactsAlgorithm::Main)
        .await
        .unwrap_err();
    assert!(matches!(
        workflow_kind(&err),
        Some(WorkflowErrorKind::MissingInput { .. })
    ));

    std::fs::create_dir_all(layout.hyp_dir(FactsAlgorithm::Main)).unwrap();
    std::fs::write(layout.hypotheses_file(FactsAlgorithm::Main), "1. Claim.").unwrap();
    let report = engine
        .check_hypotheses(&layout, FactsAlgorithm::Main)
        .await
        .unwrap();

    assert_eq!(report.outputs, vec![layout.checked_file(FactsAlgorithm::Main)]);
    assert_eq!(read(layout.checked_file(FactsAlgorithm::Main)), "Confirmed: 1.");
    let request = &engine.driver().requests()[0];
    assert!(*request.web_search());
    assert!(*request.thinking());
    assert_eq!(request.attachments()[0].data(), b"1. Claim.");
}

async fn checked_project() -> (tempfile::TempDir, scenarist_storage::ProjectLayout) {
    let (dir, layout) = project(&[("notes.txt", "ok")]).await;
    for algorithm in [FactsAlgorithm::Main, FactsAlgorithm::BlindSpots] {
        std::fs::create_dir_all(layout.check_dir(algorithm)).unwrap();
        std::fs::write(layout.checked_file(algorithm), format!("checked {}", algorithm)).unwrap();
    }
    (dir, layout)
}

#[tokio::test]
async fn test_structure_rejects_series_count() {
    let (_dir, layout) = checked_project().await;
    let engine = engine(ScriptedDriver::new([STRUCTURE_JSON]), config());

    for requested in [0, 11] {
        let err = engine
            .build_script_structure(&layout, requested)
            .await
            .unwrap_err();
        assert_eq!(
            workflow_kind(&err),
            Some(&WorkflowErrorKind::InvalidSeriesCount { requested, max: 10 })
        );
    }
    assert!(engine.driver().requests().is_empty());
}

#[tokio::test]
async fn test_structure_normalizes_and_assigns_ids() {
    let (_dir, layout) = checked_project().await;
    let engine = engine(ScriptedDriver::new([STRUCTURE_JSON]), config());

    let report = engine.build_script_structure(&layout, 2).await.unwrap();
    assert_eq!(
        report.outputs,
        vec![layout.structure_txt(), layout.structure_json()]
    );

    let saved: Vec<ScriptStructureWithId> =
        serde_json::from_str(&read(layout.structure_json())).unwrap();
    assert_eq!(saved[0].serie_name, "Origins");
    assert_eq!(saved[0].content[1].chapter_number, 2);
    assert_eq!(saved[1].content[0].chapter_number, 1);
    assert!(!saved[0].serie_id.is_empty());
    assert_ne!(saved[0].content[0].chapter_id, saved[0].content[1].chapter_id);
    assert_eq!(read(layout.structure_txt()), STRUCTURE_JSON);

    let request = &engine.driver().requests()[0];
    let names: Vec<&str> = request
        .attachments()
        .iter()
        .map(|a| a.filename().as_str())
        .collect();
    assert_eq!(names, vec!["notes.txt", "checked_main.txt", "checked_blind.txt"]);
    assert!(request.prompt().contains("exactly 2 episodes"));
    assert_eq!(engine.driver().schemas()[0]["type"], "ARRAY");
}

#[tokio::test]
async fn test_structure_keeps_raw_text_on_parse_failure() {
    let (_dir, layout) = checked_project().await;
    let engine = engine(ScriptedDriver::new(["Here is your outline: episode one..."]), config());

    let err = engine.build_script_structure(&layout, 1).await.unwrap_err();
    assert!(matches!(
        workflow_kind(&err),
        Some(WorkflowErrorKind::StructuredOutputInvalid { .. })
    ));
    assert_eq!(
        read(layout.structure_txt()),
        "Here is your outline: episode one..."
    );
    assert!(!layout.structure_json().exists());
    assert_eq!(engine.spent().total_tokens, 15);
}

#[tokio::test]
async fn test_structure_requires_checked_facts() {
    let (_dir, layout) = project(&[("notes.txt", "ok")]).await;
    let engine = engine(ScriptedDriver::new([STRUCTURE_JSON]), config());

    let err = engine.build_script_structure(&layout, 2).await.unwrap_err();
    assert!(matches!(
        workflow_kind(&err),
        Some(WorkflowErrorKind::MissingInput { .. })
    ));
}

#[tokio::test]
async fn test_write_requires_structure() {
    let (_dir, layout) = project(&[]).await;
    let engine = engine(ScriptedDriver::new(["unused"]), config());

    let err = engine
        .write_script_text(&layout, &WriteOptions::default())
        .await
        .unwrap_err();
    match workflow_kind(&err) {
        Some(WorkflowErrorKind::MissingInput { stage, producer, .. }) => {
            assert_eq!(stage, "write");
            assert_eq!(producer, "structure");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

async fn structured_project() -> (tempfile::TempDir, scenarist_storage::ProjectLayout) {
    let (dir, layout) = checked_project().await;
    let engine = engine(ScriptedDriver::new([STRUCTURE_JSON]), config());
    engine.build_script_structure(&layout, 2).await.unwrap();
    (dir, layout)
}

#[tokio::test]
async fn test_write_all_chapters_with_continuity() {
    let (_dir, layout) = structured_project().await;
    let config = WorkflowConfig::builder()
        .model(Some("test-model".to_string()))
        .continuity_chars(8usize)
        .build()
        .unwrap();
    let engine = engine(
        ScriptedDriver::new(["Harbour text ENDING", "Departure text", "Return text"]),
        config,
    );
    let options = WriteOptions {
        temperature: Some(1.1),
        max_output_tokens: Some(2048),
        model: Some("writer-model".to_string()),
    };

    let report = engine.write_script_text(&layout, &options).await.unwrap();
    assert_eq!(report.calls, 3);

    let requests = engine.driver().requests();
    assert!(requests[0].prompt().contains("first chapter of the episode"));
    assert!(requests[1].prompt().contains(" ENDING"));
    assert!(!requests[1].prompt().contains("Harbour text"));
    // A new series starts without continuity text.
    assert!(requests[2].prompt().contains("first chapter of the episode"));
    assert!(requests[0].prompt().contains("2. Departure: The convoy sails."));
    for request in &requests {
        assert_eq!(*request.temperature(), 1.1);
        assert_eq!(*request.max_output_tokens(), 2048);
        assert_eq!(request.model().as_deref(), Some("writer-model"));
        assert_eq!(request.attachments().len(), 2);
    }

    let scenario: Vec<ScenarioStructure> =
        serde_json::from_str(&read(layout.scenario_json())).unwrap();
    assert!(scenario.iter().all(ScenarioStructure::is_complete));
    assert_eq!(scenario[1].content[0].text, "Return text");

    let markdown = read(layout.serie_markdown(1, "Origins"));
    assert!(markdown.starts_with("# 1. Origins\n"));
    assert!(markdown.contains("## 2. Departure"));
    assert!(read(layout.scenario_txt()).contains("Chapter 1. Return"));
    assert!(report.outputs.contains(&layout.serie_markdown(2, "Aftermath")));
}

#[tokio::test]
async fn test_write_resumes_after_failure() {
    let (_dir, layout) = structured_project().await;

    let failing = engine(
        ScriptedDriver::with_replies([
            MockReply::Text("Harbour text".to_string()),
            MockReply::Fail,
        ]),
        config(),
    );
    assert!(
        failing
            .write_script_text(&layout, &WriteOptions::default())
            .await
            .is_err()
    );
    let checkpoint: Vec<ScenarioStructure> =
        serde_json::from_str(&read(layout.scenario_json())).unwrap();
    assert_eq!(checkpoint[0].content[0].text, "Harbour text");
    assert!(checkpoint[0].content[1].text.is_empty());

    let resumed = engine(
        ScriptedDriver::new(["Departure text", "Return text"]),
        config(),
    );
    let report = resumed
        .write_script_text(&layout, &WriteOptions::default())
        .await
        .unwrap();

    assert_eq!(report.calls, 2);
    assert!(resumed.driver().requests()[0].prompt().contains("Harbour text"));
    let scenario: Vec<ScenarioStructure> =
        serde_json::from_str(&read(layout.scenario_json())).unwrap();
    assert_eq!(scenario[0].content[0].text, "Harbour text");
    assert_eq!(scenario[0].content[1].text, "Departure text");
}
