#![forbid(unsafe_code)]

//! Built-in commands that write a value through a setter.
//!
//! Both commands close over a setter supplied by the model layer together
//! with the value before and after the edit. `execute` writes the new value,
//! `undo` writes the old one. Whatever the setter returns is the command's
//! result.

use std::fmt;
use std::rc::Rc;

use crate::command::{Command, CommandResult};
use crate::resource::{RawBitmap, ResourceKey};

/// Setter for a text value.
pub type TextSetFn = Box<dyn Fn(&str) -> CommandResult>;
/// Setter for a bitmap resource. `None` removes the bitmap.
pub type BitmapSetFn = Box<dyn Fn(ResourceKey, Option<&RawBitmap>) -> CommandResult>;

// ============================================================================
// Text
// ============================================================================

/// Command that changes a text value.
pub struct SetTextCmd {
    /// Value before the edit.
    pub old_value: String,
    /// Value after the edit.
    pub new_value: String,
    description: String,
    setter: TextSetFn,
}

impl fmt::Debug for SetTextCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetTextCmd")
            .field("old_value", &self.old_value)
            .field("new_value", &self.new_value)
            .field("description", &self.description)
            .field("has_setter", &true)
            .finish()
    }
}

impl SetTextCmd {
    /// Create a new text command.
    pub fn new<F>(setter: F, old_value: impl Into<String>, new_value: impl Into<String>) -> Self
    where
        F: Fn(&str) -> CommandResult + 'static,
    {
        Self {
            old_value: old_value.into(),
            new_value: new_value.into(),
            description: "Set text".to_string(),
            setter: Box::new(setter),
        }
    }

    /// Override the label shown in history menus.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Command for SetTextCmd {
    fn execute(&self) -> CommandResult {
        (self.setter)(&self.new_value)
    }

    fn undo(&self) -> CommandResult {
        (self.setter)(&self.old_value)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

// ============================================================================
// Bitmap
// ============================================================================

/// Command that replaces the bitmap stored under a resource key.
///
/// Either side may be `None`: the bitmap did not exist before, or the edit
/// removes it.
pub struct SetBitmapCmd {
    pub key: ResourceKey,
    pub old_value: Option<Rc<RawBitmap>>,
    pub new_value: Option<Rc<RawBitmap>>,
    description: String,
    setter: BitmapSetFn,
}

impl fmt::Debug for SetBitmapCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims = |bmp: &Option<Rc<RawBitmap>>| {
            bmp.as_ref()
                .map(|b| format!("{}x{}", b.width, b.height))
                .unwrap_or_else(|| "none".to_string())
        };
        f.debug_struct("SetBitmapCmd")
            .field("key", &self.key)
            .field("old_value", &dims(&self.old_value))
            .field("new_value", &dims(&self.new_value))
            .field("has_setter", &true)
            .finish()
    }
}

impl SetBitmapCmd {
    /// Create a new bitmap command.
    pub fn new<F>(
        setter: F,
        key: ResourceKey,
        old_value: Option<Rc<RawBitmap>>,
        new_value: Option<Rc<RawBitmap>>,
    ) -> Self
    where
        F: Fn(ResourceKey, Option<&RawBitmap>) -> CommandResult + 'static,
    {
        Self {
            key,
            old_value,
            new_value,
            description: format!("Set bitmap {key}"),
            setter: Box::new(setter),
        }
    }

    /// Size of the held bitmaps in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.old_value.as_ref().map_or(0, |b| b.size_bytes())
            + self.new_value.as_ref().map_or(0, |b| b.size_bytes())
    }
}

impl Command for SetBitmapCmd {
    fn execute(&self) -> CommandResult {
        (self.setter)(self.key, self.new_value.as_deref())
    }

    fn undo(&self) -> CommandResult {
        (self.setter)(self.key, self.old_value.as_deref())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
