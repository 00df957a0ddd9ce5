use crate::chooser::ListItem;
use crate::colors::Palette;
use crate::git::Git;
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::io::Write;

/// per-side change statistics for one file
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeCounts {
    pub added: u64,
    pub deleted: u64,
    /// the diff reported this file on this side
    pub seen: bool,
    /// binary file; counts are meaningless
    pub binary: bool,
}

/// a changed path with its staged (index) and unstaged (worktree) counts
#[derive(Debug)]
pub struct FileItem {
    pub name: String,
    pub index: ChangeCounts,
    pub worktree: ChangeCounts,
}

impl FileItem {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            index: ChangeCounts::default(),
            worktree: ChangeCounts::default(),
        }
    }
}

/// gather the modified files from both diffs, worktree vs index and index vs
/// HEAD, merged per path and sorted by path
pub fn collect_changed_files(git: &dyn Git, pathspec: &[String]) -> Result<Vec<FileItem>> {
    let mut files: Vec<FileItem> = Vec::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for staged in [false, true] {
        let numstat = if staged {
            git.diff_index_numstat(pathspec)?
        } else {
            git.diff_files_numstat(pathspec)?
        };

        for line in numstat.lines() {
            if line.is_empty() {
                continue;
            }
            let (counts, path) = parse_numstat_line(line)?;

            let file_index = *by_path.entry(path.to_string()).or_insert_with(|| {
                files.push(FileItem::new(path));
                files.len() - 1
            });

            let side = if staged {
                &mut files[file_index].index
            } else {
                &mut files[file_index].worktree
            };
            side.seen = true;
            match counts {
                Some((added, deleted)) => {
                    side.added = added;
                    side.deleted = deleted;
                }
                None => side.binary = true,
            }
        }
    }

    // the diffs are each ordered already, but we ran two of them
    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(files)
}

/// split a numstat line into counts and path; binary files report "-" counts
fn parse_numstat_line(line: &str) -> Result<(Option<(u64, u64)>, &str)> {
    let mut fields = line.splitn(3, '\t');
    match (fields.next(), fields.next(), fields.next()) {
        (Some("-"), Some("-"), Some(path)) => Ok((None, path)),
        (Some(added), Some(deleted), Some(path)) => {
            let (Ok(added), Ok(deleted)) = (added.parse(), deleted.parse()) else {
                bail!("malformed numstat line: {line}");
            };
            Ok((Some((added, deleted)), path))
        }
        _ => bail!("malformed numstat line: {line}"),
    }
}

fn change_summary(counts: &ChangeCounts, no_changes: &str) -> String {
    if counts.binary {
        "binary".to_string()
    } else if counts.seen {
        format!("+{}/-{}", counts.added, counts.deleted)
    } else {
        no_changes.to_string()
    }
}

/// header line matching the file listing's columns
pub fn listing_header() -> String {
    format!("      {:>12} {:>12} {}", "staged", "unstaged", "path")
}

impl ListItem for FileItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn print(
        &self,
        n: usize,
        _prefix_len: usize,
        _colors: &Palette,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        write!(
            out,
            " {n:2}: {:>12} {:>12} {}",
            change_summary(&self.index, "unchanged"),
            change_summary(&self.worktree, "nothing"),
            self.name
        )
    }
}
