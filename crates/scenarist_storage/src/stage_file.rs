//! Stage files exposed for manual editing.

use crate::{ArtifactStore, ArtifactStoreExt, ProjectLayout};
use scenarist_core::{FactsAlgorithm, ScriptStructure, ScriptStructureWithId};
use scenarist_error::{ScenaristResult, StorageError, StorageErrorKind};
use std::path::PathBuf;
use std::str::FromStr;

/// Stage outputs a user may read and overwrite between runs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum FileStage {
    /// `FACTS/db_extension.txt`
    PlusFacts,
    /// Merged hypotheses of the main algorithm
    InterestingFactsMain,
    /// Checked hypotheses of the main algorithm
    CheckFactsMain,
    /// Merged hypotheses of the blind-spots algorithm
    InterestingFactsBlind,
    /// Checked hypotheses of the blind-spots algorithm
    CheckFactsBlind,
    /// `STRUCTURE/script_structure.json`
    Structure,
}

impl FileStage {
    /// Parse a stage name such as `check_facts_main`.
    ///
    /// # Errors
    ///
    /// `UnknownStage` for any other name.
    #[track_caller]
    pub fn parse(name: &str) -> Result<Self, StorageError> {
        Self::from_str(name)
            .map_err(|_| StorageError::new(StorageErrorKind::UnknownStage(name.to_string())))
    }

    /// File backing this stage.
    pub fn path(&self, layout: &ProjectLayout) -> PathBuf {
        match self {
            FileStage::PlusFacts => layout.db_extension(),
            FileStage::InterestingFactsMain => layout.hypotheses_file(FactsAlgorithm::Main),
            FileStage::CheckFactsMain => layout.checked_file(FactsAlgorithm::Main),
            FileStage::InterestingFactsBlind => {
                layout.hypotheses_file(FactsAlgorithm::BlindSpots)
            }
            FileStage::CheckFactsBlind => layout.checked_file(FactsAlgorithm::BlindSpots),
            FileStage::Structure => layout.structure_json(),
        }
    }
}

/// Content of a stage file; a file not produced yet reads as empty.
#[tracing::instrument(skip(store, layout), fields(root = %layout.root().display(), stage = %stage))]
pub async fn read_stage_file<S: ArtifactStore + ?Sized>(
    store: &S,
    layout: &ProjectLayout,
    stage: FileStage,
) -> ScenaristResult<String> {
    Ok(store
        .read_optional_text(&stage.path(layout))
        .await?
        .unwrap_or_default())
}

/// Overwrite a stage file with user-edited content.
///
/// `structure` content must be a JSON array of series. Entries without ids
/// are given fresh ones, and the file is stored pretty-printed.
///
/// # Errors
///
/// `Malformed` when structure content does not parse.
#[tracing::instrument(skip(store, layout, content), fields(root = %layout.root().display(), stage = %stage))]
pub async fn write_stage_file<S: ArtifactStore + ?Sized>(
    store: &S,
    layout: &ProjectLayout,
    stage: FileStage,
    content: &str,
) -> ScenaristResult<PathBuf> {
    let path = stage.path(layout);

    if stage == FileStage::Structure {
        let series = parse_structure(content).map_err(|message| {
            StorageError::new(StorageErrorKind::Malformed {
                path: path.display().to_string(),
                message,
            })
        })?;
        store.write_json(&path, &series).await?;
    } else {
        store.write_text(&path, content).await?;
    }

    tracing::info!("Stage file updated");
    Ok(path)
}

fn parse_structure(content: &str) -> Result<Vec<ScriptStructureWithId>, String> {
    match serde_json::from_str::<Vec<ScriptStructureWithId>>(content) {
        Ok(series) => Ok(series),
        Err(with_ids) => serde_json::from_str::<Vec<ScriptStructure>>(content)
            .map(|series| series.into_iter().map(ScriptStructure::with_ids).collect())
            .map_err(|_| with_ids.to_string()),
    }
}
