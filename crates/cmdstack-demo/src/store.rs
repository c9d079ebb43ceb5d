#![forbid(unsafe_code)]

//! In-memory backing store edited by the demo session.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use cmdstack::{CommandError, CommandResult, RawBitmap, ResourceKey};

/// Text value plus a table of bitmaps keyed by resource.
///
/// Writes can be made to fail: `reject_empty` refuses empty text, and
/// [`Store::fail_next_write`] makes the next write of any kind fail once.
#[derive(Debug, Default)]
pub struct Store {
    text: RefCell<String>,
    bitmaps: RefCell<HashMap<ResourceKey, Rc<RawBitmap>>>,
    reject_empty: bool,
    fail_next: Cell<bool>,
}

impl Store {
    #[must_use]
    pub fn new(initial_text: impl Into<String>, reject_empty: bool) -> Self {
        Self {
            text: RefCell::new(initial_text.into()),
            reject_empty,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, value: &str) -> CommandResult {
        self.check_write()?;
        if self.reject_empty && value.is_empty() {
            return Err(CommandError::rejected("text", "empty text is not allowed"));
        }
        value.clone_into(&mut self.text.borrow_mut());
        Ok(())
    }

    #[must_use]
    pub fn bitmap(&self, key: ResourceKey) -> Option<Rc<RawBitmap>> {
        self.bitmaps.borrow().get(&key).cloned()
    }

    /// Store a copy of `bitmap` under `key`, or remove the entry for `None`.
    pub fn set_bitmap(&self, key: ResourceKey, bitmap: Option<&RawBitmap>) -> CommandResult {
        self.check_write()?;
        let mut bitmaps = self.bitmaps.borrow_mut();
        match bitmap {
            Some(bitmap) => {
                bitmaps.insert(key, Rc::new(bitmap.clone()));
            }
            None => {
                bitmaps.remove(&key);
            }
        }
        Ok(())
    }

    /// All bitmaps ordered by packed key.
    #[must_use]
    pub fn bitmaps(&self) -> Vec<(ResourceKey, Rc<RawBitmap>)> {
        let mut entries: Vec<_> = self
            .bitmaps
            .borrow()
            .iter()
            .map(|(key, bitmap)| (*key, Rc::clone(bitmap)))
            .collect();
        entries.sort_by_key(|(key, _)| key.to_int());
        entries
    }

    /// Make the next write fail once.
    pub fn fail_next_write(&self) {
        self.fail_next.set(true);
    }

    fn check_write(&self) -> CommandResult {
        if self.fail_next.replace(false) {
            tracing::debug!(target: "cmdstack_demo", "injected write failure");
            return Err(CommandError::rejected("store", "write failed"));
        }
        Ok(())
    }
}
