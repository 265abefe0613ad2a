//! Prompt book loading and rendering.

use scenarist_core::FactsAlgorithm;
use scenarist_error::WorkflowErrorKind;
use scenarist_workflow::PromptBook;

#[test]
fn test_bundled_book_has_every_stage_prompt() {
    let book = PromptBook::bundled().unwrap();
    for key in [
        "expand",
        "search_main",
        "search_blind_spots",
        "check_main",
        "check_blind_spots",
        "structure",
        "write_chapter",
    ] {
        assert!(book.contains(key), "missing prompt {}", key);
    }
}

#[test]
fn test_render_is_single_pass() {
    let book: PromptBook = r#"
[prompts]
seed = "Before: {previous_findings} / lens {lens_number}"
"#
    .parse()
    .unwrap();

    let prompt = book
        .render("seed", &[("previous_findings", "{lens_number}"), ("lens_number", "2")])
        .unwrap();
    assert_eq!(prompt, "Before: {lens_number} / lens 2");
}

#[test]
fn test_missing_prompt_and_bad_toml() {
    let book = PromptBook::bundled().unwrap();
    let err = book.render("nope", &[]).unwrap_err();
    assert_eq!(err.kind, WorkflowErrorKind::MissingPrompt("nope".to_string()));

    let err = "prompts = 3".parse::<PromptBook>().unwrap_err();
    assert!(matches!(err.kind, WorkflowErrorKind::PromptBookParse(_)));
}

#[test]
fn test_lens_focus_cycles() {
    let book: PromptBook = r#"
[prompts]
expand = "x"

[lenses]
main = ["people", "time"]
"#
    .parse()
    .unwrap();

    assert_eq!(book.lens_focus(FactsAlgorithm::Main, 1), "people");
    assert_eq!(book.lens_focus(FactsAlgorithm::Main, 2), "time");
    assert_eq!(book.lens_focus(FactsAlgorithm::Main, 3), "people");
    assert_eq!(book.lens_focus(FactsAlgorithm::BlindSpots, 1), "");
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("prompts.toml");
    std::fs::write(&path, "[prompts]\nexpand = \"Custom {x}\"\n").unwrap();

    let book = PromptBook::load(Some(&path)).unwrap();
    assert_eq!(book.render("expand", &[]).unwrap(), "Custom {x}");

    let missing = PromptBook::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(missing.kind, WorkflowErrorKind::PromptBookParse(_)));
}
