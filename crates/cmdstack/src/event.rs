#![forbid(unsafe_code)]

//! Notifications emitted by a [`CommandStack`](crate::CommandStack).
//!
//! Observers are called after the stack has released its busy flag, so an
//! observer may query `can_undo()` / `can_redo()` to refresh menu state. It
//! may not call back into `perform`/`undo`/`redo` of the same stack from
//! inside a command, but it may do so from the observer itself.

use crate::command::CommandError;

/// What happened during one stack call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackEvent {
    /// A command executed and was recorded.
    Performed { description: String },
    /// A command failed to execute and was not recorded.
    PerformFailed {
        description: String,
        error: CommandError,
    },
    /// The top command was reverted and moved to the redo sequence.
    Undone { description: String },
    /// Reverting the top command failed; history is unchanged.
    UndoFailed {
        description: String,
        error: CommandError,
    },
    /// The top redo command executed again and moved back to the undo sequence.
    Redone { description: String },
    /// Replaying the top redo command failed; history is unchanged.
    RedoFailed {
        description: String,
        error: CommandError,
    },
    /// A successful perform dropped pending redo entries.
    RedoDiscarded { count: usize },
    /// The oldest undo entries were dropped to honor the depth limit.
    Evicted { count: usize },
}

impl StackEvent {
    /// Whether this event reports a command failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::PerformFailed { .. } | Self::UndoFailed { .. } | Self::RedoFailed { .. }
        )
    }

    /// The command error carried by a failure event.
    #[must_use]
    pub fn error(&self) -> Option<&CommandError> {
        match self {
            Self::PerformFailed { error, .. }
            | Self::UndoFailed { error, .. }
            | Self::RedoFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Callback receiving stack events.
pub type StackObserver = Box<dyn Fn(&StackEvent)>;
