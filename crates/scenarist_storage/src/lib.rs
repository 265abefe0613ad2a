//! File-backed artifact store for Scenarist projects.
//!
//! Every project owns a folder whose layout is a stable contract shared with
//! the editing UI: source documents live in `DB/`, stage outputs in `FACTS/`,
//! `STRUCTURE/` and `SCENARIO/`.
//!
//! ```text
//! proj_7_Arctic_convoys/
//! ├── DB/                            user-supplied .txt / .pdf sources
//! ├── FACTS/
//! │   ├── db_extension.txt
//! │   ├── ALG_MAIN/HYP/lens_01.txt ... hypotheses.txt
//! │   ├── ALG_MAIN/CHECK/checked.txt
//! │   └── ALG_BLIND/...
//! ├── STRUCTURE/script_structure.{json,txt}
//! └── SCENARIO/scenario.{json,txt}, Serie_<n>_<name>.md
//! ```
//!
//! # Example
//!
//! ```rust
//! use scenarist_storage::{ArtifactStore, FileSystemArtifactStore, ProjectLayout};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let layout = ProjectLayout::new("/tmp/projects/1/proj_1_Arctic_convoys");
//! layout.init().await?;
//!
//! let store = FileSystemArtifactStore::new();
//! store.write_text(&layout.db_extension(), "1. PQ-17 scattered on 4 July 1942").await?;
//! let facts = store.read_text(&layout.db_extension()).await?;
//! assert!(facts.starts_with("1."));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod layout;
mod render;
mod stage_file;
mod store;

pub use filesystem::FileSystemArtifactStore;
pub use layout::{ProjectLayout, project_folder_name, project_path};
pub use render::{render_series_markdown, write_scenario_documents};
pub use stage_file::{FileStage, read_stage_file, write_stage_file};
pub use store::{ArtifactStore, ArtifactStoreExt};

pub use scenarist_error::{StorageError, StorageErrorKind};
