use crate::config::BorgConfig;
use crate::encryption::EncryptionSelection;
use crate::passphrase::{PassphraseFile, PASSCOMMAND_ENV, PASSPHRASE_ENVS};
use crate::runner::{CommandRunner, Invocation, OutputMode, SystemRunner};
use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Handle on the external borg executable.
///
/// Every call spawns exactly one process through the configured
/// [`CommandRunner`] and waits for it to exit.
///
/// # Examples
///
/// ```no_run
/// use borgar_core::{Borg, BorgConfig, EncryptionScheme, EncryptionSelection};
///
/// #[tokio::main]
/// async fn main() -> borgar_core::Result<()> {
///     let borg = Borg::new(BorgConfig::from_env());
///     if borg.exists().await {
///         let encryption = EncryptionSelection::new(EncryptionScheme::Repokey, Some("secret"));
///         borg.init("photos", "/srv/backups", &encryption).await?;
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Borg {
    config: BorgConfig,
    runner: Arc<dyn CommandRunner>,
}

impl Borg {
    pub fn new(config: BorgConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    pub fn with_runner(config: BorgConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &BorgConfig {
        &self.config
    }

    /// Checks that borg is installed and runnable.
    ///
    /// Runs `borg --version` with its output discarded. A missing executable
    /// is reported as `false`, never as an error.
    pub async fn exists(&self) -> bool {
        let invocation =
            Invocation::new(&self.config.program, OutputMode::Discard).arg("--version");

        match self.runner.run(&invocation).await {
            Ok(output) => {
                debug!(
                    program = %self.config.program.display(),
                    code = ?output.code,
                    "borg version probe finished"
                );
                output.success()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(program = %self.config.program.display(), "borg not found on PATH");
                false
            }
            Err(e) => {
                warn!(
                    program = %self.config.program.display(),
                    error = %e,
                    "Failed to launch borg version probe"
                );
                false
            }
        }
    }

    /// Validates the request and builds the `borg init` invocation without
    /// running it. Inherited passphrase variables are stripped; no secret
    /// transport is attached here.
    pub fn init_invocation<N, P>(
        &self,
        name: N,
        root_path: P,
        encryption: &EncryptionSelection,
    ) -> Result<Invocation>
    where
        N: AsRef<Path>,
        P: AsRef<Path>,
    {
        encryption.validate()?;
        let target = repository_target(name.as_ref(), root_path.as_ref())?;

        let invocation = Invocation::new(&self.config.program, OutputMode::Capture)
            .arg("init")
            .arg(format!("--encryption={}", encryption.scheme().as_flag()))
            .arg(target);

        Ok(PASSPHRASE_ENVS
            .iter()
            .fold(invocation, |inv, key| inv.env_remove(key)))
    }

    /// Creates a new borg repository at `root_path/name`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedEncryption` or `Error::InvalidArgumentType`
    /// before anything is spawned, `Error::Io` if borg could not be launched,
    /// and `Error::ExternalToolFailure` with borg's stderr if it exited non-zero.
    pub async fn init<N, P>(
        &self,
        name: N,
        root_path: P,
        encryption: &EncryptionSelection,
    ) -> Result<()>
    where
        N: AsRef<Path>,
        P: AsRef<Path>,
    {
        let mut invocation = self.init_invocation(name, root_path, encryption)?;
        let target = invocation.args.last().cloned().unwrap_or_default();

        // Lives until the child has exited, then the file is deleted.
        let transport = match encryption.passphrase() {
            Some(passphrase) => Some(PassphraseFile::create(passphrase)?),
            None => None,
        };
        if let Some(ref transport) = transport {
            invocation = invocation.env(PASSCOMMAND_ENV, transport.passcommand());
        }

        info!(
            path = %target.to_string_lossy(),
            encryption = %encryption.scheme(),
            "Initializing borg repository"
        );

        let output = self.runner.run(&invocation).await.map_err(|e| {
            error!(
                program = %self.config.program.display(),
                error = %e,
                "Failed to launch borg"
            );
            Error::Io(e)
        })?;
        drop(transport);

        if !output.success() {
            let stderr = output.stderr_lossy();
            error!(code = ?output.code, stderr = %stderr.trim_end(), "borg init failed");
            return Err(Error::ExternalToolFailure {
                code: output.code,
                stderr,
            });
        }

        info!(path = %target.to_string_lossy(), "Repository initialized");
        Ok(())
    }
}

/// Joins `root_path` and `name` into the path handed to borg.
fn repository_target(name: &Path, root_path: &Path) -> Result<PathBuf> {
    check_segment("root_path", root_path)?;
    check_segment("name", name)?;
    Ok(root_path.join(name))
}

fn check_segment(argument: &'static str, value: &Path) -> Result<()> {
    if value.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(Error::InvalidArgumentType {
            argument,
            reason: "contains a NUL byte and cannot be passed to a process".to_string(),
        });
    }
    Ok(())
}

/// `Borg::exists` with the environment-derived config and real processes.
pub async fn exists() -> bool {
    Borg::new(BorgConfig::from_env()).exists().await
}

/// `Borg::init` with the environment-derived config and real processes.
pub async fn init<N, P>(name: N, root_path: P, encryption: &EncryptionSelection) -> Result<()>
where
    N: AsRef<Path>,
    P: AsRef<Path>,
{
    Borg::new(BorgConfig::from_env())
        .init(name, root_path, encryption)
        .await
}
