mod chooser;
mod cli;
mod colors;
mod constants;
mod diff;
mod files;
mod git;
mod patch;
mod prefixes;
mod session;
mod ui;

use crate::chooser::{ListItem, ListOptions, Selection};
use crate::colors::Palette;
use crate::constants::COMMAND_COLUMNS;
use crate::files::FileItem;
use crate::session::Session;
use anyhow::Result;
use std::io::{BufRead, Write};

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse_args();

    let repo = git::sanity_check()?;
    let git = git::GitProcess::new(&repo)?;
    let colors = Palette::resolve(git.workdir())?;
    let s = Session { git: &git, colors };

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();
    let mut err = std::io::stderr();

    match cli.command {
        Some(cli::Command::Patch { pathspec }) => {
            patch::run_patch(&s, &pathspec, &mut input, &mut out, &mut err)
        }
        Some(cli::Command::Interactive { pathspec }) => {
            run_interactive(&s, &pathspec, &mut input, &mut out, &mut err)
        }
        None => run_interactive(&s, &[], &mut input, &mut out, &mut err),
    }
}

#[derive(Clone, Copy)]
enum CommandKind {
    Status,
    Patch,
    Quit,
    Help,
}

struct CommandItem {
    name: &'static str,
    description: &'static str,
    kind: CommandKind,
}

static COMMANDS: [CommandItem; 4] = [
    CommandItem {
        name: "status",
        description: "show paths with changes",
        kind: CommandKind::Status,
    },
    CommandItem {
        name: "patch",
        description: "pick hunks and update selectively",
        kind: CommandKind::Patch,
    },
    CommandItem {
        name: "quit",
        description: "quit; do not look at remaining paths",
        kind: CommandKind::Quit,
    },
    CommandItem {
        name: "help",
        description: "print this help",
        kind: CommandKind::Help,
    },
];

impl ListItem for CommandItem {
    fn name(&self) -> &str {
        self.name
    }

    fn print(
        &self,
        n: usize,
        prefix_len: usize,
        _colors: &Palette,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        if prefix_len == 0 {
            write!(out, " {n:2}: {}", self.name)
        } else {
            write!(
                out,
                " {n:2}: [{}]{}",
                &self.name[..prefix_len],
                &self.name[prefix_len..]
            )
        }
    }
}

/// the top loop: keep choosing commands until quit or end of input
fn run_interactive(
    s: &Session,
    pathspec: &[String],
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    s.git.refresh_index()?;

    let mut files = Vec::new();
    run_status(s, pathspec, &mut files, out)?;

    let items: Vec<&dyn ListItem> = COMMANDS.iter().map(|c| c as &dyn ListItem).collect();
    let opts = ListOptions {
        columns: COMMAND_COLUMNS,
        header: Some("*** Commands ***"),
    };

    loop {
        let selection = chooser::list_and_choose(&items, &s.colors, &opts, "What now", input, out)?;

        let kind = match selection {
            Selection::Quit => CommandKind::Quit,
            Selection::None => continue,
            Selection::Index(i) => COMMANDS[i].kind,
        };

        let result = match kind {
            CommandKind::Status => run_status(s, pathspec, &mut files, out),
            CommandKind::Patch => patch::run_patch(s, pathspec, input, out, err),
            CommandKind::Help => run_help(out),
            CommandKind::Quit => {
                writeln!(out, "Bye.")?;
                return Ok(());
            }
        };

        if let Err(e) = result {
            writeln!(err, "{}", s.colors.paint(&s.colors.error, &format!("{e:#}")))?;
        }
    }
}

/// collect the changed files afresh and list them with per-side counts
fn run_status(
    s: &Session,
    pathspec: &[String],
    files: &mut Vec<FileItem>,
    out: &mut dyn Write,
) -> Result<()> {
    *files = files::collect_changed_files(s.git, pathspec)?;

    if !files.is_empty() {
        let header = files::listing_header();
        let items: Vec<&dyn ListItem> = files.iter().map(|f| f as &dyn ListItem).collect();
        let prefix_lengths = vec![0; items.len()];
        let opts = ListOptions {
            columns: 0,
            header: Some(header.as_str()),
        };
        chooser::list(&items, &prefix_lengths, &s.colors, &opts, out)?;
    }
    writeln!(out)?;

    Ok(())
}

fn run_help(out: &mut dyn Write) -> Result<()> {
    for command in &COMMANDS {
        writeln!(out, "{:<6} - {}", command.name, command.description)?;
    }
    writeln!(out)?;
    Ok(())
}
