//! Argument parsing and project setup for the scenarist binary.

use clap::Parser;
use scenarist::cli::{
    AlgorithmArg, Cli, Commands, FileCommands, LevelArg, OutputFormat, ProjectCommands,
    ProjectHandle, init_project, parse_project_id, pipeline_options, render_reports,
};
use scenarist::{
    FactsAlgorithm, PermissionLevel, ProjectLayout, ScenaristConfig, Stage, StageReport,
    TokenUsage,
};
use tempfile::TempDir;

#[test]
fn test_parse_stage_commands_with_global_flags() {
    let cli = Cli::try_parse_from([
        "scenarist",
        "search",
        "--algorithm",
        "blind",
        "--resume",
        "--project",
        "projects_root/1/proj_1_Topic",
        "--model",
        "gemini-2.5-pro",
        "--no-retry",
        "-v",
    ])
    .unwrap();

    assert!(matches!(
        cli.command,
        Commands::Search {
            algorithm: AlgorithmArg::Blind,
            resume: true
        }
    ));
    assert_eq!(cli.project.as_deref(), Some("projects_root/1/proj_1_Topic"));
    assert_eq!(cli.model.as_deref(), Some("gemini-2.5-pro"));
    assert!(cli.no_retry);
    assert!(cli.verbose);
    assert_eq!(cli.max_retries, None);
}

#[test]
fn test_parse_write_and_structure_options() {
    let cli = Cli::try_parse_from([
        "scenarist",
        "write",
        "--temperature",
        "0.9",
        "--max-output-tokens",
        "2048",
        "--max-retries",
        "5",
    ])
    .unwrap();
    match cli.command {
        Commands::Write {
            temperature,
            max_output_tokens,
        } => {
            assert_eq!(temperature, Some(0.9));
            assert_eq!(max_output_tokens, Some(2048));
        }
        other => panic!("unexpected command: {:?}", other),
    }
    assert_eq!(cli.max_retries, Some(5));

    let cli = Cli::try_parse_from(["scenarist", "structure"]).unwrap();
    assert!(matches!(cli.command, Commands::Structure { num_series: 3 }));
}

#[test]
fn test_parse_file_and_project_subcommands() {
    let cli = Cli::try_parse_from(["scenarist", "file", "write", "structure", "--input", "s.json"])
        .unwrap();
    match cli.command {
        Commands::File(FileCommands::Write { stage, input }) => {
            assert_eq!(stage, "structure");
            assert_eq!(input.unwrap().to_str(), Some("s.json"));
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let cli = Cli::try_parse_from([
        "scenarist", "project", "share", "bob", "--level", "write", "--user", "alice", "-p", "7",
    ])
    .unwrap();
    match cli.command {
        Commands::Project(ProjectCommands::Share { username, level }) => {
            assert_eq!(username, "bob");
            assert_eq!(level, LevelArg::Write);
            assert_eq!(PermissionLevel::from(level), PermissionLevel::Write);
        }
        other => panic!("unexpected command: {:?}", other),
    }
    assert_eq!(cli.user.as_deref(), Some("alice"));
}

#[test]
fn test_structure_rejects_non_numeric_series() {
    assert!(Cli::try_parse_from(["scenarist", "structure", "--num-series", "many"]).is_err());
}

#[test]
fn test_pipeline_options_algorithms() {
    let both = pipeline_options(4, &[], None);
    assert_eq!(
        both.algorithms,
        vec![FactsAlgorithm::Main, FactsAlgorithm::BlindSpots]
    );
    assert_eq!(both.num_series, 4);

    let blind = pipeline_options(
        2,
        &[AlgorithmArg::Blind, AlgorithmArg::Blind],
        Some("writer".to_string()),
    );
    assert_eq!(blind.algorithms, vec![FactsAlgorithm::BlindSpots]);
    assert_eq!(blind.write.model.as_deref(), Some("writer"));
}

#[test]
fn test_parse_project_id() {
    assert_eq!(parse_project_id("42").unwrap(), 42);
    assert!(parse_project_id("proj_42").is_err());
}

#[tokio::test]
async fn test_init_project_copies_sources() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.txt");
    std::fs::write(&source, "Convoy notes").unwrap();
    let layout = ProjectLayout::new(dir.path().join("proj"));

    init_project(&layout, &[source]).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(layout.db_dir().join("notes.txt")).unwrap(),
        "Convoy notes"
    );
    assert!(layout.facts_dir().is_dir());
}

#[tokio::test]
async fn test_init_project_rejects_unsupported_sources() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.docx");
    std::fs::write(&source, "binary").unwrap();
    let layout = ProjectLayout::new(dir.path().join("proj"));

    let err = init_project(&layout, &[source]).await.unwrap_err();
    assert!(err.as_storage().is_some());
    assert!(!layout.db_dir().join("notes.docx").exists());
}

#[tokio::test]
async fn test_resolve_project_by_path() {
    let config = ScenaristConfig::bundled().unwrap();

    let cli = Cli::try_parse_from(["scenarist", "expand", "--project", "some/folder"]).unwrap();
    let handle = ProjectHandle::resolve(&cli, &config, PermissionLevel::Write)
        .await
        .unwrap();
    assert_eq!(handle.layout.root(), std::path::Path::new("some/folder"));
    handle.record_usage(100).await.unwrap();

    let cli = Cli::try_parse_from(["scenarist", "expand"]).unwrap();
    if std::env::var_os("SCENARIST_PROJECT").is_none() {
        assert!(
            ProjectHandle::resolve(&cli, &config, PermissionLevel::Write)
                .await
                .is_err()
        );
    }
}

fn search_report() -> StageReport {
    StageReport {
        stage: Stage::Search,
        algorithm: Some(FactsAlgorithm::BlindSpots),
        outputs: vec!["proj/FACTS/ALG_BLIND/HYP/lens_01.txt".into()],
        usage: TokenUsage::new(10, 5),
        calls: 1,
    }
}

#[test]
fn test_render_reports_human() {
    let out = render_reports(&[search_report()], OutputFormat::Human).unwrap();

    assert_eq!(
        out,
        "search (blind_spots)\n  calls: 1  tokens: 15 (prompt 10, completion 5)\n  wrote proj/FACTS/ALG_BLIND/HYP/lens_01.txt\n"
    );
}

#[test]
fn test_render_reports_json() {
    let cli = Cli::try_parse_from(["scenarist", "expand", "--format", "json"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Json);

    let out = render_reports(&[search_report()], cli.format).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(value[0]["stage"], "search");
    assert_eq!(value[0]["algorithm"], "blind_spots");
    assert_eq!(value[0]["usage"]["total_tokens"], 15);
    assert_eq!(value[0]["calls"], 1);
}
