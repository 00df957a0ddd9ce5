use crate::constants::EMPTY_TREE_OID;
use anyhow::{Context, Result, bail};
use git2::{Repository, RepositoryState};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// the git operations the interactive session needs; narrow on purpose so
/// tests can substitute canned diff output and record applied patches
pub trait Git {
    /// `diff-files -p`, plain or colored
    fn capture_diff(&self, colored: bool, pathspec: &[String]) -> Result<Vec<u8>>;

    /// worktree vs index change counts
    fn diff_files_numstat(&self, pathspec: &[String]) -> Result<String>;

    /// index vs HEAD change counts
    fn diff_index_numstat(&self, pathspec: &[String]) -> Result<String>;

    /// pipe a patch into `apply --cached`
    fn apply_cached(&self, patch: &[u8]) -> Result<()>;

    /// `update-index -q --refresh`
    fn refresh_index(&self) -> Result<()>;
}

/// sanity check that we're in a git repository and in a good state
pub fn sanity_check() -> Result<Repository> {
    let repo = Repository::discover(".").context("not in a git repository")?;

    if repo.state() != RepositoryState::Clean {
        bail!("repository is in the middle of an operation (merge, rebase, etc)");
    }

    Ok(repo)
}

/// runs git as a child process from the repository's working tree, with the
/// index file exported so every child operates on the same index
pub struct GitProcess {
    workdir: PathBuf,
    index_file: PathBuf,
}

impl GitProcess {
    pub fn new(repo: &Repository) -> Result<Self> {
        let workdir = repo
            .workdir()
            .context("repository has no working tree")?
            .to_path_buf();
        let index_file = repo
            .index()
            .context("could not read index")?
            .path()
            .context("index has no backing file")?
            .to_path_buf();

        Ok(Self {
            workdir,
            index_file,
        })
    }

    pub fn workdir(&self) -> &std::path::Path {
        &self.workdir
    }

    fn git_command(&self) -> Command {
        let mut command = Command::new("git");
        command.current_dir(&self.workdir);
        command.env("GIT_INDEX_FILE", &self.index_file);
        command
    }

    fn capture(&self, args: &[&str], pathspec: &[String]) -> Result<Vec<u8>> {
        let output = self
            .git_command()
            .args(args)
            .arg("--")
            .args(pathspec)
            .output()
            .with_context(|| format!("failed to run git {}", args[0]))?;

        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args[0],
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(output.stdout)
    }

    /// the tree the staged side compares against: HEAD, or the empty tree
    /// on an unborn branch
    fn staged_reference(&self) -> Result<String> {
        let output = self
            .git_command()
            .args(["rev-parse", "--verify", "--quiet", "HEAD"])
            .output()
            .context("failed to run git rev-parse")?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            Ok(EMPTY_TREE_OID.to_string())
        }
    }
}

impl Git for GitProcess {
    fn capture_diff(&self, colored: bool, pathspec: &[String]) -> Result<Vec<u8>> {
        // pass the color choice explicitly, in case `diff.color = always`
        let color = if colored { "--color" } else { "--no-color" };
        self.capture(&["diff-files", "-p", color], pathspec)
    }

    fn diff_files_numstat(&self, pathspec: &[String]) -> Result<String> {
        let output = self.capture(&["diff-files", "--numstat"], pathspec)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    fn diff_index_numstat(&self, pathspec: &[String]) -> Result<String> {
        let reference = self.staged_reference()?;
        let output =
            self.capture(&["diff-index", "--cached", "--numstat", &reference], pathspec)?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    fn apply_cached(&self, patch: &[u8]) -> Result<()> {
        let mut child = self
            .git_command()
            .args(["apply", "--cached"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn git apply")?;

        child
            .stdin
            .take()
            .context("failed to open git apply stdin")?
            .write_all(patch)
            .context("failed to write patch to git apply")?;

        let output = child
            .wait_with_output()
            .context("failed to wait for git apply")?;

        if !output.status.success() {
            bail!(
                "'git apply --cached' failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }

    fn refresh_index(&self) -> Result<()> {
        let output = self
            .git_command()
            .args(["update-index", "-q", "--refresh"])
            .output()
            .context("failed to run git update-index")?;

        if !output.status.success() {
            bail!(
                "could not refresh index: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }
}
