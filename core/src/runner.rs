use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// What happens to the child's stdout and stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Discard,
    Capture,
}

/// A fully built external command: program, ordered arguments and the
/// environment changes applied on top of the inherited environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Inherited variables the child must not see. Applied before `envs`.
    pub env_removes: Vec<OsString>,
    pub envs: Vec<(OsString, OsString)>,
    pub output: OutputMode,
}

impl Invocation {
    pub fn new<P: Into<PathBuf>>(program: P, output: OutputMode) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env_removes: Vec::new(),
            envs: Vec::new(),
            output,
        }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn env<K: AsRef<OsStr>, V: AsRef<OsStr>>(mut self, key: K, value: V) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn env_remove<K: AsRef<OsStr>>(mut self, key: K) -> Self {
        self.env_removes.push(key.as_ref().to_os_string());
        self
    }

    pub fn removes_env(&self, key: &str) -> bool {
        self.env_removes.iter().any(|k| k == key)
    }

    /// Value of an extra environment variable set on this invocation.
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Program followed by its arguments, as they would appear in a process listing.
    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(self.program.clone().into_os_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Exit code and captured streams of a finished process. Streams are empty
/// when the invocation discarded them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Executes one external process to completion.
///
/// Launch failures (including a missing executable) surface as
/// `std::io::Error`; a process that ran but exited non-zero is an `Ok` output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;
}

/// Runs invocations as real child processes through `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        let mut cmd = Command::new(&invocation.program);
        for key in &invocation.env_removes {
            cmd.env_remove(key);
        }
        cmd.args(&invocation.args)
            .envs(invocation.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            "Spawning external command"
        );

        match invocation.output {
            OutputMode::Discard => {
                let status = cmd
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .await?;
                Ok(CommandOutput {
                    code: status.code(),
                    ..Default::default()
                })
            }
            OutputMode::Capture => {
                let output = cmd
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await?;
                Ok(CommandOutput {
                    code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
        }
    }
}
