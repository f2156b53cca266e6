use clap::{Args, Parser, Subcommand};
use foldsmith_core::storage::Status;
use std::path::PathBuf;

/// Foldsmith: create project directories from a structure template.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the template and registry files.
    /// Defaults to the executable's own directory.
    #[arg(long, global = true, env = "FOLDSMITH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project directory from the template and register it.
    New(NewArgs),
    /// Manage the project registry.
    Project(ProjectArgs),
    /// Manage the project group registry.
    Group(GroupArgs),
    /// Inspect or configure the structure template.
    Template(TemplateArgs),
}

// --- Argument Structs for each Subcommand ---

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Name of the project (also the name of the created directory).
    pub name: String,

    /// Free-form project description stored in the registry.
    #[arg(long, short, default_value = "")]
    pub description: String,

    /// Id of the group to assign the project to (0 = unassigned).
    #[arg(long, default_value_t = 0)]
    pub group: u32,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List all registered projects.
    List,
    /// Register a project without creating any directories.
    Add(ProjectAddArgs),
    /// Edit fields of a registered project.
    Edit(ProjectEditArgs),
    /// Remove a project from the registry (leaves its directory on disk).
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct ProjectAddArgs {
    pub name: String,

    #[arg(long, short, default_value = "")]
    pub description: String,

    /// Project status: active or inactive.
    #[arg(long, default_value = "active")]
    pub status: Status,

    /// Id of the group to assign the project to (0 = unassigned).
    #[arg(long, default_value_t = 0)]
    pub group: u32,
}

#[derive(Args, Debug)]
pub struct ProjectEditArgs {
    /// Id of the project to edit.
    pub id: u32,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short)]
    pub description: Option<String>,

    /// Project status: active or inactive.
    #[arg(long)]
    pub status: Option<Status>,

    /// Start date in YYYY-MM-DD form.
    #[arg(long)]
    pub start_date: Option<String>,

    /// End date in YYYY-MM-DD form; pass an empty string to clear it.
    #[arg(long)]
    pub end_date: Option<String>,

    /// Id of the group to assign the project to (0 = unassigned).
    #[arg(long)]
    pub group: Option<u32>,
}

#[derive(Args, Debug)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub command: GroupCommands,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// List all groups.
    List,
    /// Add a new group.
    Add(GroupAddArgs),
    /// Remove a group (member projects keep their group id).
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct GroupAddArgs {
    pub name: String,

    #[arg(long, short, default_value = "")]
    pub description: String,

    /// Group status: active or inactive.
    #[arg(long, default_value = "active")]
    pub status: Status,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Id of the record to remove.
    pub id: u32,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub command: TemplateCommands,
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Print the current template document.
    Show,
    /// Set the parent directory new projects are created under.
    SetParent { path: PathBuf },
    /// Set the sync directory 'auto' template items are created in.
    SetSync { path: PathBuf },
}
