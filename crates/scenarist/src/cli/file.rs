//! Stage file command handlers.

use super::commands::{Cli, FileCommands};
use super::context::{ProjectHandle, load_config};
use scenarist_core::PermissionLevel;
use scenarist_error::{ScenaristResult, StorageError, StorageErrorKind};
use scenarist_storage::{FileStage, FileSystemArtifactStore, read_stage_file, write_stage_file};
use tokio::io::AsyncReadExt;

/// Handle `file read` and `file write`.
///
/// Reading needs `READ` on the project, writing needs `WRITE`.
pub async fn handle_file_command(cli: &Cli, cmd: &FileCommands) -> ScenaristResult<()> {
    let config = load_config(cli)?;
    let store = FileSystemArtifactStore::new();

    match cmd {
        FileCommands::Read { stage } => {
            let stage = FileStage::parse(stage)?;
            let project = ProjectHandle::resolve(cli, &config, PermissionLevel::Read).await?;
            let content = read_stage_file(&store, &project.layout, stage).await?;
            print!("{}", content);
        }
        FileCommands::Write { stage, input } => {
            let stage = FileStage::parse(stage)?;
            let project = ProjectHandle::resolve(cli, &config, PermissionLevel::Write).await?;
            let content = match input {
                Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                    StorageError::new(StorageErrorKind::FileRead(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )))
                })?,
                None => read_stdin().await?,
            };
            let path = write_stage_file(&store, &project.layout, stage, &content).await?;
            println!("Updated {}", path.display());
        }
    }
    Ok(())
}

async fn read_stdin() -> Result<String, StorageError> {
    let mut content = String::new();
    tokio::io::stdin()
        .read_to_string(&mut content)
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::FileRead(format!("stdin: {}", e))))?;
    Ok(content)
}
