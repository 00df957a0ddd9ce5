use clap::{Parser, Subcommand};

/// git-stage: stage changes interactively, by file or hunk by hunk
#[derive(Parser, Debug)]
#[command(name = "git-stage", about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// list changed files and pick commands from a menu (the default)
    Interactive {
        /// limit to paths matching these pathspecs
        pathspec: Vec<String>,
    },
    /// walk each hunk of the diff, staging the ones you accept
    Patch {
        /// limit to paths matching these pathspecs
        pathspec: Vec<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
