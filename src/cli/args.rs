//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::TraversalMode;

/// Bind child armature bones to a parent armature with Copy Transforms constraints
#[derive(Parser, Debug)]
#[command(name = "bonetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding a local .bonetree.toml (default: the scene file's directory)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub scene_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add Copy Transforms constraints from the parent armature to child armatures
    Apply {
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Remove all Copy Transforms constraints from child armatures
    Remove {
        /// Scene file
        #[arg(value_hint = ValueHint::FilePath)]
        scene: Option<PathBuf>,
        /// Child armature (repeatable; default: selected non-active armatures)
        #[arg(short, long = "target")]
        targets: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the bone pairs apply would bind, without changing anything
    Pairs {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Show bone hierarchies
    Tree {
        /// Scene file
        #[arg(value_hint = ValueHint::FilePath)]
        scene: Option<PathBuf>,
        /// Only this armature
        object: Option<String>,
    },

    /// Show parent/child armatures derived from the scene selection
    Selection {
        /// Scene file
        #[arg(value_hint = ValueHint::FilePath)]
        scene: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Inputs shared by apply and pairs.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Scene file
    #[arg(value_hint = ValueHint::FilePath)]
    pub scene: Option<PathBuf>,

    /// Parent armature (default: active armature of the selection)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Child armature (repeatable; default: selected non-active armatures)
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// Root bone in the parent armature (default: first bone of the first child)
    #[arg(short, long)]
    pub root: Option<String>,

    /// Traversal mode (default from settings)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Where mutated scenes go.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Save the scene back to its file
    #[arg(short, long)]
    pub write: bool,

    /// Save the scene to this file instead
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Walk the parent armature from the root bone
    ParentBased,
    /// Walk every bone of each child armature
    ChildBased,
}

impl From<ModeArg> for TraversalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ParentBased => TraversalMode::ParentBased,
            ModeArg::ChildBased => TraversalMode::ChildBased,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
