//! On-disk layout of a project folder.

use scenarist_core::FactsAlgorithm;
use scenarist_error::{StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};

const DB_DIR: &str = "DB";
const FACTS_DIR: &str = "FACTS";
const STRUCTURE_DIR: &str = "STRUCTURE";
const SCENARIO_DIR: &str = "SCENARIO";
const HYP_DIR: &str = "HYP";
const CHECK_DIR: &str = "CHECK";

/// Paths of every artifact inside one project folder.
///
/// The layout only computes paths; [`init`](Self::init) creates the top-level
/// directories and the store creates nested ones on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Layout rooted at an existing or future project folder.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Project folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates `DB`, `FACTS`, `STRUCTURE` and `SCENARIO`. Idempotent.
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn init(&self) -> Result<(), StorageError> {
        for dir in [
            self.db_dir(),
            self.facts_dir(),
            self.structure_dir(),
            self.scenario_dir(),
        ] {
            tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }
        tracing::debug!("Initialized project layout");
        Ok(())
    }

    /// Source documents.
    pub fn db_dir(&self) -> PathBuf {
        self.root.join(DB_DIR)
    }

    /// Fact-finding outputs.
    pub fn facts_dir(&self) -> PathBuf {
        self.root.join(FACTS_DIR)
    }

    /// Expanded knowledge base (stage 1).
    pub fn db_extension(&self) -> PathBuf {
        self.facts_dir().join("db_extension.txt")
    }

    /// `FACTS/ALG_*` for one algorithm.
    pub fn algorithm_dir(&self, algorithm: FactsAlgorithm) -> PathBuf {
        self.facts_dir().join(algorithm.dir_name())
    }

    /// Lens outputs and merged hypotheses.
    pub fn hyp_dir(&self, algorithm: FactsAlgorithm) -> PathBuf {
        self.algorithm_dir(algorithm).join(HYP_DIR)
    }

    /// Verified hypotheses.
    pub fn check_dir(&self, algorithm: FactsAlgorithm) -> PathBuf {
        self.algorithm_dir(algorithm).join(CHECK_DIR)
    }

    /// Output of lens `number` (1-based), e.g. `lens_03.txt`.
    pub fn lens_file(&self, algorithm: FactsAlgorithm, number: u32) -> PathBuf {
        self.hyp_dir(algorithm).join(format!("lens_{number:02}.txt"))
    }

    /// Merged hypotheses (stage 2).
    pub fn hypotheses_file(&self, algorithm: FactsAlgorithm) -> PathBuf {
        self.hyp_dir(algorithm).join("hypotheses.txt")
    }

    /// Checked hypotheses (stage 3).
    pub fn checked_file(&self, algorithm: FactsAlgorithm) -> PathBuf {
        self.check_dir(algorithm).join("checked.txt")
    }

    /// Script structure outputs.
    pub fn structure_dir(&self) -> PathBuf {
        self.root.join(STRUCTURE_DIR)
    }

    /// Structure with ids (stage 4).
    pub fn structure_json(&self) -> PathBuf {
        self.structure_dir().join("script_structure.json")
    }

    /// Raw model text of stage 4.
    pub fn structure_txt(&self) -> PathBuf {
        self.structure_dir().join("script_structure.txt")
    }

    /// Scenario outputs.
    pub fn scenario_dir(&self) -> PathBuf {
        self.root.join(SCENARIO_DIR)
    }

    /// Written chapters (stage 5), checkpointed per chapter.
    pub fn scenario_json(&self) -> PathBuf {
        self.scenario_dir().join("scenario.json")
    }

    /// Plain-text export of the finished script, written by stage 5.
    pub fn scenario_txt(&self) -> PathBuf {
        self.scenario_dir().join("scenario.txt")
    }

    /// Rendered document for one series.
    pub fn serie_markdown(&self, serie_number: u32, serie_name: &str) -> PathBuf {
        self.scenario_dir().join(format!(
            "Serie_{}_{}.md",
            serie_number,
            sanitize_component(serie_name)
        ))
    }
}

/// Folder name of a project: `proj_{id}_{topic}` with spaces turned into `_`.
///
/// ```
/// use scenarist_storage::project_folder_name;
///
/// assert_eq!(project_folder_name(7, "Arctic convoys"), "proj_7_Arctic_convoys");
/// ```
pub fn project_folder_name(project_id: i32, topic_name: &str) -> String {
    format!("proj_{}_{}", project_id, sanitize_component(topic_name))
}

/// `<projects_root>/<owner_id>/proj_{id}_{topic}`.
pub fn project_path(
    projects_root: &Path,
    owner_id: i32,
    project_id: i32,
    topic_name: &str,
) -> PathBuf {
    projects_root
        .join(owner_id.to_string())
        .join(project_folder_name(project_id, topic_name))
}

// Keeps names to a single path component.
fn sanitize_component(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            c if c.is_whitespace() => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_stay_single_component() {
        assert_eq!(sanitize_component(" a/b c "), "a_b_c");
        assert_eq!(sanitize_component("Серия пилот"), "Серия_пилот");
    }
}
