//! Thin interface to the `borg` deduplicating backup tool.
//!
//! Borg does all the chunking, encryption and repository management; this
//! crate checks that it is installed, turns a typed encryption choice into
//! `borg init` arguments, and hands passphrases over without exposing them on
//! the command line.

pub mod borg;
pub mod config;
pub mod encryption;
pub mod error;
pub mod passphrase;
pub mod runner;

#[cfg(test)]
pub(crate) mod testutil;

pub use borg::{exists, init, Borg};
pub use config::BorgConfig;
pub use encryption::{EncryptionScheme, EncryptionSelection};
pub use error::{Error, Result};
pub use runner::{CommandOutput, CommandRunner, Invocation, OutputMode, SystemRunner};
