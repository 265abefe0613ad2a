//! Project management command handlers.

use super::commands::{Cli, ProjectCommands};
use scenarist_error::ScenaristResult;

/// Handle `project` subcommands against PostgreSQL.
#[cfg(feature = "database")]
pub async fn handle_project_command(cli: &Cli, cmd: &ProjectCommands) -> ScenaristResult<()> {
    use super::commands::OutputFormat;
    use super::context::{load_config, open_service, parse_project_id};
    use scenarist_error::{ConfigError, JsonError};
    use scenarist_interface::AccessChange;

    let config = load_config(cli)?;
    let service = open_service(&config)?;

    if let ProjectCommands::Register {
        username,
        password_hash,
    } = cmd
    {
        let user = service.register_user(username, password_hash).await?;
        println!("Registered {} (id {})", user.username, user.user_id);
        return Ok(());
    }

    let username = cli
        .user
        .as_deref()
        .ok_or_else(|| ConfigError::new("--user is required for project commands"))?;
    let user = service.find_user(username).await?;
    let project_id = || {
        cli.project
            .as_deref()
            .ok_or_else(|| ConfigError::new("--project is required for this command"))
            .and_then(parse_project_id)
    };

    match cmd {
        ProjectCommands::Register { .. } => {}
        ProjectCommands::Create { topic } => {
            let project = service.create_project(user.user_id, topic).await?;
            println!("Created project {} at {}", project.project_id, project.file_path);
        }
        ProjectCommands::List => {
            let projects = service.list_accessible(user.user_id).await?;
            if cli.format == OutputFormat::Json {
                let json = serde_json::to_string_pretty(&projects).map_err(JsonError::from)?;
                println!("{}", json);
                return Ok(());
            }
            println!("{:>6}  {:<8}  {:<32}  PATH", "ID", "ACCESS", "TOPIC");
            for project in &projects {
                let access = if project.owner_id == user.user_id {
                    "OWNER".to_string()
                } else {
                    service
                        .access_level(project.project_id, user.user_id)
                        .await?
                        .map(|l| l.to_string())
                        .unwrap_or_default()
                };
                println!(
                    "{:>6}  {:<8}  {:<32}  {}",
                    project.project_id, access, project.topic_name, project.file_path
                );
            }
            println!("Total: {} projects", projects.len());
        }
        ProjectCommands::Share { username, level } => {
            let change = service
                .share(project_id()?, user.user_id, username, (*level).into())
                .await?;
            let verb = match change {
                AccessChange::Created(_) => "Granted",
                AccessChange::Updated(_) => "Updated",
            };
            println!(
                "{} {} access for {} on project {}",
                verb,
                change.record().permission_level,
                username,
                change.record().project_id
            );
        }
        ProjectCommands::Delete => {
            let id = project_id()?;
            service.delete_project(id, user.user_id).await?;
            println!("Deleted project {}", id);
        }
    }
    Ok(())
}

/// Project management needs the `database` feature.
#[cfg(not(feature = "database"))]
pub async fn handle_project_command(_cli: &Cli, _cmd: &ProjectCommands) -> ScenaristResult<()> {
    Err(scenarist_error::ConfigError::new(
        "Project management requires the `database` feature; rebuild with --features database",
    )
    .into())
}
