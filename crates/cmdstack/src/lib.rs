#![forbid(unsafe_code)]

//! Reversible command execution with undo/redo history.
//!
//! Every mutating edit in the editor (a text, a bitmap, a tile property) is
//! expressed as a [`Command`] and handed to a [`CommandStack`]. The stack runs
//! it, records it when it succeeds, and walks the record back and forth on
//! `undo()` / `redo()`.
//!
//! # Quick Start
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use cmdstack::{CommandResult, CommandStack, SetTextCmd};
//!
//! let title = Rc::new(RefCell::new(String::from("hello")));
//! let target = Rc::clone(&title);
//! let setter = move |value: &str| -> CommandResult {
//!     *target.borrow_mut() = value.to_string();
//!     Ok(())
//! };
//!
//! let stack = CommandStack::default();
//! stack.perform_cmd(SetTextCmd::new(setter, "hello", "world"))?;
//! assert_eq!(*title.borrow(), "world");
//!
//! stack.undo();
//! assert_eq!(*title.borrow(), "hello");
//! assert!(stack.can_redo());
//! # Ok::<(), cmdstack::CommandError>(())
//! ```
//!
//! # Module Structure
//!
//! - [`command`]: the [`Command`] trait and [`CommandError`]
//! - [`history`]: [`CommandStack`] and [`StackConfig`]
//! - [`guard`]: the busy flag that rejects reentrant calls
//! - [`event`]: notifications for UI state refresh
//! - [`adapters`]: [`SetTextCmd`] and [`SetBitmapCmd`]
//! - [`resource`]: resource keys and raw bitmaps
//!
//! # Failure Channels
//!
//! A command that cannot reach its target state returns a [`CommandError`].
//! The stack hands it back to the caller and keeps the history position, so
//! the user can retry. Calling into a stack from inside one of its own running
//! commands is a bug in the command; it panics.

pub mod adapters;
pub mod command;
pub mod event;
pub mod guard;
pub mod history;
pub mod resource;

pub use adapters::{BitmapSetFn, SetBitmapCmd, SetTextCmd, TextSetFn};
pub use command::{Command, CommandError, CommandResult};
pub use event::{StackEvent, StackObserver};
pub use guard::{BusyFlag, BusyGuard};
pub use history::{CommandStack, StackConfig};
pub use resource::{RawBitmap, ResourceKey, ResourceLanguage, ResourceType};
