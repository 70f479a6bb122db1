//! Version-control command table and output markers.
//!
//! The sync state machine only ever asks for a [`VcsCommand`] and checks a
//! [`Probe`]'s markers against the output. Everything that depends on a
//! particular tool's wording lives behind [`VcsAdapter`].

/// Commands the state machine issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsCommand {
    /// Download remote changes without touching the working copy.
    Fetch,
    /// Report working copy and branch status.
    Status,
    /// Stage every change, including untracked files.
    AddAll,
    /// Commit staged changes.
    Commit,
    /// Merge the remote branch into the local one.
    Merge,
    /// Abandon an in-progress merge.
    MergeAbort,
    /// Upload local commits.
    Push,
    /// Fetch and merge the remote branch.
    Pull,
}

/// Facts the state machine reads from command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// `Status` shows local commits not yet pushed.
    Ahead,
    /// `Status` shows nothing to commit.
    Clean,
    /// `Merge` completed or had nothing to do.
    MergeSucceeded,
    /// `Push` updated the remote branch.
    PushAccepted,
}

/// Maps commands and probes onto a concrete version-control tool.
pub trait VcsAdapter: Send + Sync + std::fmt::Debug {
    /// Shell command string for `command`.
    fn command(&self, command: VcsCommand) -> String;

    /// Output substrings that indicate `probe` holds; any one suffices.
    fn markers(&self, probe: Probe) -> Vec<String>;
}

/// Default commit and merge message.
pub const DEFAULT_MESSAGE: &str = "dotsync: automatic update";

/// [`VcsAdapter`] for git against the `origin` remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitAdapter {
    branch: String,
}

impl GitAdapter {
    /// Adapter for `branch`, committing and merging with [`DEFAULT_MESSAGE`].
    #[must_use]
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
        }
    }
}

impl VcsAdapter for GitAdapter {
    fn command(&self, command: VcsCommand) -> String {
        let branch = quote(&self.branch);
        let message = quote(DEFAULT_MESSAGE);
        match command {
            VcsCommand::Fetch => "git fetch".to_string(),
            VcsCommand::Status => "git status".to_string(),
            VcsCommand::AddAll => "git add .".to_string(),
            VcsCommand::Commit => format!("git commit -am {message}"),
            VcsCommand::Merge => format!(
                "git merge {} -m {message}",
                quote(&format!("origin/{}", self.branch))
            ),
            VcsCommand::MergeAbort => "git merge --abort".to_string(),
            VcsCommand::Push => format!("git push origin {branch}"),
            VcsCommand::Pull => format!("git pull origin {branch}"),
        }
    }

    fn markers(&self, probe: Probe) -> Vec<String> {
        match probe {
            Probe::Ahead => vec!["branch is ahead of".to_string()],
            Probe::Clean => vec!["nothing to commit, working tree clean".to_string()],
            Probe::MergeSucceeded => {
                vec!["Merge made by".to_string(), "Already up to date.".to_string()]
            }
            Probe::PushAccepted => vec![format!("{0} -> {0}", self.branch)],
        }
    }
}

/// Single-quote `s` for `sh`.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
