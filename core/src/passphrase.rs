use crate::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Borg runs the command in this variable and reads the passphrase from its stdout.
pub const PASSCOMMAND_ENV: &str = "BORG_PASSCOMMAND";

/// Every variable borg consults for a passphrase. `BORG_PASSPHRASE` wins over
/// `BORG_PASSCOMMAND`, so none of them may leak in from the caller's environment.
pub const PASSPHRASE_ENVS: [&str; 4] = [
    "BORG_PASSPHRASE",
    "BORG_NEW_PASSPHRASE",
    "BORG_PASSCOMMAND",
    "BORG_PASSPHRASE_FD",
];

/// Single-use file holding a passphrase for exactly one borg invocation.
///
/// The secret never appears on the command line; the child learns the file
/// location through [`PASSCOMMAND_ENV`]. The file is created owner-only and
/// removed when the value is dropped.
pub struct PassphraseFile {
    file: NamedTempFile,
}

impl PassphraseFile {
    pub fn create(passphrase: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("borgar-pass-")
            .tempfile()?;
        // Not synced: the child reads it back through the page cache.
        file.write_all(passphrase.as_bytes())?;
        file.flush()?;

        debug!(path = %file.path().display(), "Created passphrase transport file");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Value for [`PASSCOMMAND_ENV`]: a command that prints the file verbatim.
    pub fn passcommand(&self) -> String {
        format!("cat {}", shell_quote(&self.path().to_string_lossy()))
    }
}

/// POSIX single-quoting, also understood by borg's `shlex.split`.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
