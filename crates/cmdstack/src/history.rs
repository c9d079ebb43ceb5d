#![forbid(unsafe_code)]

//! History stack for undo/redo operations.
//!
//! [`CommandStack`] executes commands and records every successful one as an
//! undoable entry. It maintains two LIFO sequences:
//!
//! ```text
//! perform(c1), perform(c2), perform(c3)
//! ┌───────────────────────────────────────────────┐
//! │ Undo: [c1, c2, c3]                            │
//! │ Redo: []                                      │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo: [c1]                                    │
//! │ Redo: [c3, c2]                                │
//! └───────────────────────────────────────────────┘
//!
//! perform(c4)  <-- clears redo, c2 and c3 are dropped
//! ┌───────────────────────────────────────────────┐
//! │ Undo: [c1, c4]                                │
//! │ Redo: []                                      │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one of `perform`, `undo`, `redo`, `clear` runs at a time on one
//!    stack. A nested call made from inside a running command panics.
//! 2. A failed `execute`/`undo` leaves both sequences exactly as they were.
//!    The same command stays next in line, so retrying the same action
//!    retries the same command.
//! 3. A successful `perform` empties the redo sequence.
//! 4. Only a successful `undo` puts a command on the redo sequence.
//! 5. `undo_depth() <= config.max_depth` after every call, when a limit is set.
//!    The limit is at least 1, so a successful `perform` always leaves the
//!    command undoable.
//!
//! # Threading
//!
//! The stack is `!Send` and `!Sync`. Entry points take `&self` so that a
//! command which holds an `Rc` to its own stack can be caught calling back
//! into it; nothing else is shared.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace, warn};

use crate::command::{Command, CommandResult};
use crate::event::{StackEvent, StackObserver};
use crate::guard::BusyFlag;

/// Configuration for a [`CommandStack`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StackConfig {
    /// Maximum number of entries kept on the undo sequence.
    /// `None` keeps everything.
    pub max_depth: Option<NonZeroUsize>,
}

impl StackConfig {
    /// Configuration with a depth limit.
    ///
    /// A limit of 0 is raised to 1: the command just performed is never
    /// evicted by its own `perform`.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: Some(NonZeroUsize::new(max_depth).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Configuration without limits.
    #[must_use]
    pub fn unlimited() -> Self {
        Self { max_depth: None }
    }
}

type Entry = Rc<dyn Command>;

/// Undo/redo history that executes the commands it records.
pub struct CommandStack {
    /// Commands available for undo (newest at back).
    undo_stack: RefCell<VecDeque<Entry>>,
    /// Commands available for redo (newest at back).
    redo_stack: RefCell<VecDeque<Entry>>,
    config: StackConfig,
    busy: BusyFlag,
    observer: Option<StackObserver>,
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .field("busy", &self.busy.is_busy())
            .field("config", &self.config)
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(StackConfig::default())
    }
}

impl CommandStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new(config: StackConfig) -> Self {
        Self {
            undo_stack: RefCell::new(VecDeque::new()),
            redo_stack: RefCell::new(VecDeque::new()),
            config,
            busy: BusyFlag::new(),
            observer: None,
        }
    }

    /// Install a callback that receives a [`StackEvent`] after each call.
    #[must_use]
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&StackEvent) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Execute a command and record it for undo.
    ///
    /// On success the command goes on top of the undo sequence and the redo
    /// sequence is emptied. On failure the command is dropped, history is
    /// untouched, and the command's error is returned.
    ///
    /// # Panics
    ///
    /// Panics if called while another `perform`, `undo` or `redo` is running
    /// on this stack.
    pub fn perform(&self, cmd: Box<dyn Command>) -> CommandResult {
        let guard = self.busy.acquire("perform");
        let description = cmd.description().to_string();
        let _span = debug_span!(target: "cmdstack", "cmdstack.perform", command = %description)
            .entered();

        let mut events = Vec::with_capacity(3);
        let result = cmd.execute();
        match &result {
            Ok(()) => {
                let discarded = self.clear_redo();
                if discarded > 0 {
                    trace!(target: "cmdstack", count = discarded, "redo history discarded");
                    events.push(StackEvent::RedoDiscarded { count: discarded });
                }

                self.undo_stack.borrow_mut().push_back(Rc::from(cmd));
                let evicted = self.enforce_limits();
                if evicted > 0 {
                    events.push(StackEvent::Evicted { count: evicted });
                }

                debug!(
                    target: "cmdstack",
                    command = %description,
                    undo_depth = self.undo_depth(),
                    "command performed"
                );
                events.push(StackEvent::Performed { description });
            }
            Err(error) => {
                warn!(
                    target: "cmdstack",
                    command = %description,
                    error = %error,
                    "command failed to execute, not recorded"
                );
                events.push(StackEvent::PerformFailed {
                    description,
                    error: error.clone(),
                });
            }
        }

        drop(guard);
        self.notify(&events);
        result
    }

    /// Execute and record a concrete command.
    ///
    /// Convenience for [`perform`](Self::perform) without boxing at the call site.
    pub fn perform_cmd<C: Command + 'static>(&self, cmd: C) -> CommandResult {
        self.perform(Box::new(cmd))
    }

    /// Revert the most recent command.
    ///
    /// # Returns
    ///
    /// - `None` if there is nothing to undo
    /// - `Some(Ok(()))` if the command was reverted and moved to the redo sequence
    /// - `Some(Err(error))` if reverting failed; the command stays on top of
    ///   the undo sequence and the next `undo()` retries it
    ///
    /// # Panics
    ///
    /// Panics if called while another stack operation is running.
    pub fn undo(&self) -> Option<CommandResult> {
        let guard = self.busy.acquire("undo");
        let Some(cmd) = self.undo_stack.borrow().back().cloned() else {
            trace!(target: "cmdstack", "nothing to undo");
            return None;
        };
        let description = cmd.description().to_string();
        let _span =
            debug_span!(target: "cmdstack", "cmdstack.undo", command = %description).entered();

        let result = cmd.undo();
        let event = match &result {
            Ok(()) => {
                let moved = self.undo_stack.borrow_mut().pop_back();
                if let Some(moved) = moved {
                    debug_assert!(Rc::ptr_eq(&moved, &cmd));
                    self.redo_stack.borrow_mut().push_back(moved);
                }
                debug!(
                    target: "cmdstack",
                    command = %description,
                    undo_depth = self.undo_depth(),
                    redo_depth = self.redo_depth(),
                    "command undone"
                );
                StackEvent::Undone { description }
            }
            Err(error) => {
                warn!(
                    target: "cmdstack",
                    command = %description,
                    error = %error,
                    "undo failed, command kept in place"
                );
                StackEvent::UndoFailed {
                    description,
                    error: error.clone(),
                }
            }
        };

        drop(guard);
        self.notify(std::slice::from_ref(&event));
        Some(result)
    }

    /// Execute the most recently undone command again.
    ///
    /// # Returns
    ///
    /// - `None` if there is nothing to redo
    /// - `Some(Ok(()))` if the command executed and moved back to the undo sequence
    /// - `Some(Err(error))` if it failed; the command stays on top of the redo
    ///   sequence and the next `redo()` retries it
    ///
    /// # Panics
    ///
    /// Panics if called while another stack operation is running.
    pub fn redo(&self) -> Option<CommandResult> {
        let guard = self.busy.acquire("redo");
        let Some(cmd) = self.redo_stack.borrow().back().cloned() else {
            trace!(target: "cmdstack", "nothing to redo");
            return None;
        };
        let description = cmd.description().to_string();
        let _span =
            debug_span!(target: "cmdstack", "cmdstack.redo", command = %description).entered();

        let mut events = Vec::with_capacity(2);
        let result = cmd.execute();
        match &result {
            Ok(()) => {
                let moved = self.redo_stack.borrow_mut().pop_back();
                if let Some(moved) = moved {
                    debug_assert!(Rc::ptr_eq(&moved, &cmd));
                    self.undo_stack.borrow_mut().push_back(moved);
                }
                let evicted = self.enforce_limits();
                if evicted > 0 {
                    events.push(StackEvent::Evicted { count: evicted });
                }
                debug!(
                    target: "cmdstack",
                    command = %description,
                    undo_depth = self.undo_depth(),
                    redo_depth = self.redo_depth(),
                    "command redone"
                );
                events.push(StackEvent::Redone { description });
            }
            Err(error) => {
                warn!(
                    target: "cmdstack",
                    command = %description,
                    error = %error,
                    "redo failed, command kept in place"
                );
                events.push(StackEvent::RedoFailed {
                    description,
                    error: error.clone(),
                });
            }
        }

        drop(guard);
        self.notify(&events);
        Some(result)
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.borrow().is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.borrow().is_empty()
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of entries on the undo sequence.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.borrow().len()
    }

    /// Number of entries on the redo sequence.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.borrow().len()
    }

    /// Whether a stack operation is currently running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Descriptions of undo entries, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<String> {
        Self::descriptions(&self.undo_stack.borrow(), limit)
    }

    /// Descriptions of redo entries, next to redo first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<String> {
        Self::descriptions(&self.redo_stack.borrow(), limit)
    }

    /// Description of the command the next `undo()` would revert.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<String> {
        self.undo_stack
            .borrow()
            .back()
            .map(|c| c.description().to_string())
    }

    /// Description of the command the next `redo()` would replay.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<String> {
        self.redo_stack
            .borrow()
            .back()
            .map(|c| c.description().to_string())
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Drop all history without running any command.
    ///
    /// # Panics
    ///
    /// Panics if called while another stack operation is running.
    pub fn clear(&self) {
        let _guard = self.busy.acquire("clear");
        self.undo_stack.borrow_mut().clear();
        self.redo_stack.borrow_mut().clear();
        debug!(target: "cmdstack", "history cleared");
    }

    fn descriptions(entries: &VecDeque<Entry>, limit: usize) -> Vec<String> {
        entries
            .iter()
            .rev()
            .take(limit)
            .map(|c| c.description().to_string())
            .collect()
    }

    /// Empty the redo sequence, returning how many entries were dropped.
    fn clear_redo(&self) -> usize {
        let dropped: Vec<Entry> = self.redo_stack.borrow_mut().drain(..).collect();
        dropped.len()
    }

    /// Evict the oldest undo entries beyond the depth limit.
    fn enforce_limits(&self) -> usize {
        let Some(max_depth) = self.config.max_depth.map(NonZeroUsize::get) else {
            return 0;
        };
        let mut undo_stack = self.undo_stack.borrow_mut();
        let excess = undo_stack.len().saturating_sub(max_depth);
        let evicted: Vec<Entry> = undo_stack.drain(..excess).collect();
        drop(undo_stack);
        if !evicted.is_empty() {
            trace!(target: "cmdstack", count = evicted.len(), max_depth, "oldest history evicted");
        }
        evicted.len()
    }

    fn notify(&self, events: &[StackEvent]) {
        if let Some(observer) = &self.observer {
            for event in events {
                observer(event);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
