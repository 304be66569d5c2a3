//! Command-line interface for todocal
//!
//! Without a subcommand the interactive menu starts. The subcommands expose
//! the same operations for scripting, one operation per invocation, each
//! saving before it exits.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::session::Session;
use crate::storage::Storage;

mod calendar;
mod config;
pub mod menu;
mod project;
mod task;
pub mod view;

/// todocal - projects, nested tasks and a completion calendar
///
/// Tracks projects and their task trees and keeps a calendar of completed
/// tasks grouped by Sat-Sun-Mon / Tue-Wed / Thu-Fri runs.
#[derive(Parser, Debug)]
#[command(name = "todocal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (defaults to ~/.todocal)
    #[arg(long, global = true, env = "TODOCAL_HOME")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable priority colors
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Change the priority of a project or task
    Priority {
        /// Project or task id
        id: u64,

        /// high, medium or low (h/m/l)
        priority: String,
    },

    /// Show the completion calendar for a month
    Calendar {
        /// Year (requires --month)
        #[arg(long, requires = "month")]
        year: Option<i32>,

        /// Month 1-12 (requires --year)
        #[arg(long, requires = "year")]
        month: Option<u32>,

        /// Show the previous month
        #[arg(long, conflicts_with_all = ["year", "month"])]
        prev: bool,
    },

    /// Read or change settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Project subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    New {
        name: String,

        /// high, medium or low (h/m/l)
        #[arg(short, long, default_value = "medium")]
        priority: String,
    },

    /// List projects
    List,

    /// Delete a project and all of its tasks
    Rm {
        id: u64,

        /// Delete even when the project still has tasks
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename a project (tasks and calendar history follow)
    Rename { id: u64, name: String },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task under a project or an open task
    New {
        /// Id of the parent project or task
        parent: u64,

        name: String,

        /// high, medium or low (h/m/l)
        #[arg(short, long, default_value = "medium")]
        priority: String,

        /// none, daily, weekly or monthly (n/d/w/m)
        #[arg(short, long, default_value = "none")]
        repeat: String,
    },

    /// Show open tasks as a tree
    List,

    /// Mark a task as completed
    Done { id: u64 },

    /// Delete a task and its subtasks
    Rm {
        id: u64,

        /// Delete even when the task has subtasks
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename a task (calendar history follows)
    Rename { id: u64, name: String },

    /// Change the repeat setting of a task
    Repeat {
        id: u64,

        /// none, daily, weekly or monthly (n/d/w/m)
        repeat: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print one setting
    Get { key: String },

    /// Change one setting
    Set { key: String, value: String },

    /// Print all settings
    List,
}

/// Options shared by every subcommand
#[derive(Debug, Clone)]
pub struct Globals {
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
    pub color: bool,
}

impl Globals {
    pub fn output(&self) -> crate::output::OutputOptions {
        crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

pub(crate) fn open_session(data_dir: Option<PathBuf>) -> Result<Session> {
    let storage = match data_dir {
        Some(dir) => Storage::new(dir),
        None => Storage::in_home()?,
    };
    Session::open(storage)
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let globals = Globals {
            data_dir: self.data_dir,
            json: self.json,
            quiet: self.quiet,
            color: !self.no_color && std::io::stdout().is_terminal(),
        };

        match self.command.unwrap_or(Commands::Menu) {
            Commands::Menu => {
                let mut session = open_session(globals.data_dir.clone())?;
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                menu::Menu::new(&mut session, stdin.lock(), stdout.lock())
                    .with_color(globals.color)
                    .run()
            }
            Commands::Project(cmd) => match cmd {
                ProjectCommands::New { name, priority } => project::run_new(project::NewOptions {
                    name,
                    priority,
                    globals,
                }),
                ProjectCommands::List => project::run_list(globals),
                ProjectCommands::Rm { id, yes } => {
                    project::run_rm(project::RmOptions { id, yes, globals })
                }
                ProjectCommands::Rename { id, name } => {
                    project::run_rename(project::RenameOptions { id, name, globals })
                }
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::New {
                    parent,
                    name,
                    priority,
                    repeat,
                } => task::run_new(task::NewOptions {
                    parent,
                    name,
                    priority,
                    repeat,
                    globals,
                }),
                TaskCommands::List => task::run_list(globals),
                TaskCommands::Done { id } => task::run_done(globals, id),
                TaskCommands::Rm { id, yes } => task::run_rm(task::RmOptions { id, yes, globals }),
                TaskCommands::Rename { id, name } => {
                    task::run_rename(task::RenameOptions { id, name, globals })
                }
                TaskCommands::Repeat { id, repeat } => {
                    task::run_repeat(task::RepeatOptions { id, repeat, globals })
                }
            },
            Commands::Priority { id, priority } => task::run_priority(task::PriorityOptions {
                id,
                priority,
                globals,
            }),
            Commands::Calendar { year, month, prev } => {
                calendar::run(calendar::CalendarOptions {
                    month: year.zip(month),
                    prev,
                    globals,
                })
            }
            Commands::Config(cmd) => match cmd {
                ConfigCommands::Get { key } => config::run_get(globals, &key),
                ConfigCommands::Set { key, value } => config::run_set(globals, &key, &value),
                ConfigCommands::List => config::run_list(globals),
            },
        }
    }
}
