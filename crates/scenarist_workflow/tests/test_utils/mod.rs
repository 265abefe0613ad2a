//! Shared helpers for workflow tests.

#![allow(dead_code)]

pub mod mock_driver;

use scenarist_storage::ProjectLayout;
use scenarist_workflow::{PromptBook, WorkflowConfig, WorkflowEngine};
use tempfile::TempDir;

pub use mock_driver::{MockReply, ScriptedDriver};

/// Fresh project layout with `DB/` seeded from `sources`.
pub async fn project(sources: &[(&str, &str)]) -> (TempDir, ProjectLayout) {
    let dir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(dir.path().join("proj_1_Topic"));
    layout.init().await.unwrap();
    for (name, content) in sources {
        std::fs::write(layout.db_dir().join(name), content).unwrap();
    }
    (dir, layout)
}

/// Engine with the bundled prompts and a fixed model override.
pub fn engine(driver: ScriptedDriver, config: WorkflowConfig) -> WorkflowEngine<ScriptedDriver> {
    WorkflowEngine::new(driver, PromptBook::bundled().unwrap(), config)
}

/// Default settings with the model pinned for assertions.
pub fn config() -> WorkflowConfig {
    WorkflowConfig::default().with_model(Some("test-model".to_string()))
}
