use crate::AppContext;
use crate::cli::{
    GroupArgs, GroupCommands, NewArgs, ProjectArgs, ProjectCommands, RemoveArgs, TemplateArgs,
    TemplateCommands,
};
use anyhow::{Context, Result, bail};
use dialoguer::Confirm;
use foldsmith_core::scaffold::create_project_folders;
use foldsmith_core::storage::{Project, ProjectGroup, Status};
use tracing::info;

// --- Handler Functions ---

pub async fn handle_new(args: NewArgs, cx: &AppContext) -> Result<()> {
    cx.templates
        .ensure_exists()
        .await
        .context("No usable structure template")?;
    cx.projects.ensure_exists().await;

    let template = cx.templates.load().await?;
    let parent_dir = cx.templates.parent_directory().await;
    let sync_dir = cx.templates.sync_directory().await;

    let project_path = parent_dir.join(&args.name);
    // The engine falls back to single-tree placement when the sync root is
    // not actually distinct from the parent root.
    let sync_path = sync_dir.join(&args.name);

    create_project_folders(&project_path, &template, Some(&sync_path)).await?;
    info!("Created project tree at {}", project_path.display());

    // Record the project only once the tree exists, so the registry never
    // names a project that failed to materialize.
    let project = cx
        .projects
        .add(&args.name, &args.description, Status::Active, args.group)
        .await?;

    println!("Project '{}' created at {}", project.name, project_path.display());
    Ok(())
}

pub async fn handle_project(args: ProjectArgs, cx: &AppContext) -> Result<()> {
    match args.command {
        ProjectCommands::List => {
            let projects = cx.projects.list().await;
            if projects.is_empty() {
                println!("No projects registered.");
                return Ok(());
            }
            let groups = cx.groups.list().await;
            for project in &projects {
                println!("{}", format_project(project, &groups));
            }
        }
        ProjectCommands::Add(add) => {
            let project = cx
                .projects
                .add(&add.name, &add.description, add.status, add.group)
                .await?;
            println!("Registered project '{}' (id {})", project.name, project.id);
        }
        ProjectCommands::Edit(edit) => {
            let projects = cx.projects.list().await;
            let Some(mut project) = projects.into_iter().find(|p| p.id == edit.id) else {
                bail!("No project with id {}", edit.id);
            };
            if let Some(name) = edit.name {
                project.name = name;
            }
            if let Some(description) = edit.description {
                project.description = description;
            }
            if let Some(status) = edit.status {
                project.status = status;
            }
            if let Some(start_date) = edit.start_date {
                project.start_date = start_date;
            }
            if let Some(end_date) = edit.end_date {
                project.end_date = end_date;
            }
            if let Some(group) = edit.group {
                project.group_id = group;
            }
            cx.projects.update(project).await?;
            println!("Project {} updated.", edit.id);
        }
        ProjectCommands::Remove(remove) => {
            if !confirm_removal("project", &remove)? {
                println!("Aborted.");
                return Ok(());
            }
            cx.projects.remove(remove.id).await?;
            println!("Project {} removed from the registry (directory left on disk).", remove.id);
        }
    }
    Ok(())
}

pub async fn handle_group(args: GroupArgs, cx: &AppContext) -> Result<()> {
    match args.command {
        GroupCommands::List => {
            let groups = cx.groups.list().await;
            if groups.is_empty() {
                println!("No groups registered.");
                return Ok(());
            }
            for group in &groups {
                println!("{}", format_group(group));
            }
        }
        GroupCommands::Add(add) => {
            let group = cx.groups.add(&add.name, &add.description, add.status).await?;
            println!("Registered group '{}' (id {})", group.name, group.id);
        }
        GroupCommands::Remove(remove) => {
            if !confirm_removal("group", &remove)? {
                println!("Aborted.");
                return Ok(());
            }
            cx.groups.remove(remove.id).await?;
            println!("Group {} removed.", remove.id);
        }
    }
    Ok(())
}

pub async fn handle_template(args: TemplateArgs, cx: &AppContext) -> Result<()> {
    match args.command {
        TemplateCommands::Show => {
            cx.templates
                .ensure_exists()
                .await
                .context("No usable structure template")?;
            let template = cx.templates.load().await?;
            println!("{}", serde_json::to_string_pretty(&template)?);
            println!();
            println!("Parent directory: {}", cx.templates.parent_directory().await.display());
            println!("Sync directory:   {}", cx.templates.sync_directory().await.display());
        }
        TemplateCommands::SetParent { path } => {
            cx.templates.set_parent_directory(&path).await?;
            println!("Parent directory set to {}", path.display());
        }
        TemplateCommands::SetSync { path } => {
            cx.templates.set_sync_directory(&path).await?;
            println!("Sync directory set to {}", path.display());
        }
    }
    Ok(())
}

fn confirm_removal(kind: &str, args: &RemoveArgs) -> Result<bool> {
    if args.yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(format!("Remove {} {}?", kind, args.id))
        .default(false)
        .interact()?)
}

fn format_project(project: &Project, groups: &[ProjectGroup]) -> String {
    let group = match groups.iter().find(|g| g.id == project.group_id) {
        Some(group) => group.name.as_str(),
        None if project.group_id == 0 => "-",
        None => "(deleted group)",
    };
    let end = if project.end_date.is_empty() { "..." } else { &project.end_date };
    format!(
        "[{}] {} ({}) {} -> {} | group: {} | {}",
        project.id, project.name, project.status, project.start_date, end, group, project.description
    )
}

fn format_group(group: &ProjectGroup) -> String {
    format!("[{}] {} ({}) {}", group.id, group.name, group.status, group.description)
}
