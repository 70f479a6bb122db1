//! Executor that replays canned responses, for driving the sync state
//! machine without a real repository.
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use super::{Executor, ShellOutput};
use crate::error::ExecError;

#[derive(Debug)]
struct Step {
    prefix: String,
    code: i32,
    output: String,
}

/// An [`Executor`] that answers each call with the next scripted response.
///
/// Every step names the command prefix it expects. A call that does not
/// match the next step, or arrives after the script is exhausted, fails with
/// [`ExecError::Launch`]. Commands are recorded in call order.
///
/// ```
/// use std::path::Path;
/// use dotsync::exec::Executor;
/// use dotsync::exec::scripted::ScriptedExecutor;
///
/// let exec = ScriptedExecutor::new()
///     .then("git fetch", 0, "")
///     .then("git status", 0, "nothing to commit, working tree clean");
/// assert!(exec.execute(Path::new("/repo"), "git fetch").is_ok());
/// assert_eq!(exec.calls(), vec!["git fetch".to_string()]);
/// assert_eq!(exec.remaining(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    /// Create an executor with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step: the next command must start with `prefix`, and it
    /// "exits" with `code` after printing `output`.
    #[must_use]
    pub fn then(mut self, prefix: &str, code: i32, output: &str) -> Self {
        if let Ok(steps) = self.steps.get_mut() {
            steps.push_back(Step {
                prefix: prefix.to_string(),
                code,
                output: output.to_string(),
            });
        }
        self
    }

    /// Commands received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of scripted steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.lock().map(|s| s.len()).unwrap_or_default()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, _dir: &Path, command: &str) -> Result<ShellOutput, ExecError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.to_string());
        }
        let launch_error = |msg: String| ExecError::Launch {
            command: command.to_string(),
            source: std::io::Error::other(msg),
        };
        let step = self
            .steps
            .lock()
            .map_err(|_| launch_error("script lock poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| launch_error("no scripted response left".to_string()))?;
        if !command.starts_with(&step.prefix) {
            return Err(launch_error(format!("expected `{}`", step.prefix)));
        }
        Ok(ShellOutput {
            command: command.to_string(),
            output: step.output,
            code: Some(step.code),
        })
    }
}
