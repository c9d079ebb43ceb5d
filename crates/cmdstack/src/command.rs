#![forbid(unsafe_code)]

//! Reversible command contract.
//!
//! A [`Command`] is one reversible change against some backing store that the
//! command knows how to reach (usually through a setter closure handed to it by
//! the model layer). The [`CommandStack`](crate::CommandStack) never looks
//! inside a command: it calls [`execute`](Command::execute) and
//! [`undo`](Command::undo) and reacts to the result.
//!
//! # Invariants
//!
//! - A command is immutable once constructed. Both methods take `&self`.
//! - `execute()` always attempts to move the backing state to the "new" value,
//!   `undo()` always attempts to move it back to the "old" value.
//! - Either call may fail. A failure means the target state was not reached;
//!   the caller decides whether to retry.
//!
//! # Failure Modes
//!
//! - **Rejected write**: the backing store refused the value
//!   ([`CommandError::Rejected`]).
//! - **Invalid state**: the command cannot run against the current store
//!   ([`CommandError::InvalidState`]).

use std::fmt;

use thiserror::Error;

/// Result of command execution or undo.
pub type CommandResult = Result<(), CommandError>;

/// Errors a command reports when it could not reach its target state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The backing store refused the write.
    #[error("{target} rejected the change: {reason}")]
    Rejected {
        /// What was being written (e.g. `"text"`, `"bitmap 3:0:12"`).
        target: String,
        /// Why the store refused it.
        reason: String,
    },
    /// Command cannot run in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CommandError {
    /// Shorthand for [`CommandError::Rejected`].
    #[must_use]
    pub fn rejected(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

/// A reversible unit of work.
///
/// Implementors hold whatever they need to apply and revert one change.
/// There is no shared base: each concrete command is its own type.
pub trait Command {
    /// Apply the forward change.
    ///
    /// Called once by [`perform`](crate::CommandStack::perform) and again by
    /// every successful [`redo`](crate::CommandStack::redo).
    fn execute(&self) -> CommandResult;

    /// Apply the inverse change.
    fn undo(&self) -> CommandResult;

    /// Human-readable label for logs and UI menus ("Undo Set text").
    fn description(&self) -> &str {
        "Command"
    }
}

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("description", &self.description())
            .finish()
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn execute(&self) -> CommandResult {
        (**self).execute()
    }

    fn undo(&self) -> CommandResult {
        (**self).undo()
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
