#![forbid(unsafe_code)]

//! Line commands bound to the store and the undo/redo stack.

use std::fmt::Write as _;
use std::rc::Rc;

use cmdstack::{
    CommandResult, CommandStack, RawBitmap, ResourceKey, ResourceType, SetBitmapCmd, SetTextCmd,
};

use crate::config::DemoConfig;
use crate::store::Store;

/// Resource type under which the demo stores bitmaps.
pub const BITMAP_TYPE: ResourceType = ResourceType(2);

const HISTORY_LIMIT: usize = 10;

const HELP: &str = "\
commands:
  set <text>                      replace the text value
  bitmap <index> <w>x<h> <fill>   store a bitmap filled with one palette index
  clear-bitmap <index>            remove a bitmap
  fail                            make the next store write fail
  undo | redo                     walk the history
  show                            print the store contents
  history                         list undo and redo entries
  help | quit";

/// Outcome of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Error(String),
    Silent,
    Quit,
}

/// One editing session: a store and the history of edits made to it.
#[derive(Debug)]
pub struct Session {
    store: Rc<Store>,
    stack: CommandStack,
}

impl Session {
    #[must_use]
    pub fn new(config: &DemoConfig) -> Self {
        Self {
            store: Rc::new(Store::new(config.initial_text.as_str(), config.reject_empty)),
            stack: CommandStack::new(config.stack.clone()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn stack(&self) -> &CommandStack {
        &self.stack
    }

    /// Run one input line.
    pub fn handle(&mut self, line: &str) -> Reply {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        match verb {
            "" => Reply::Silent,
            "set" => self.set_text(rest),
            "bitmap" => self.set_bitmap(rest),
            "clear-bitmap" => self.clear_bitmap(rest),
            "fail" => {
                self.store.fail_next_write();
                Reply::Text("next store write will fail".into())
            }
            "undo" => self.undo(),
            "redo" => self.redo(),
            "show" => Reply::Text(self.show()),
            "history" => Reply::Text(self.history()),
            "help" => Reply::Text(HELP.into()),
            "quit" | "exit" => Reply::Quit,
            other => Reply::Error(format!("unknown command {other:?}, try `help`")),
        }
    }

    fn set_text(&mut self, value: &str) -> Reply {
        let store = Rc::clone(&self.store);
        let cmd = SetTextCmd::new(move |v: &str| store.set_text(v), self.store.text(), value)
            .with_description(format!("Set text {value:?}"));
        self.perform(cmd, || format!("text = {value:?}"))
    }

    fn set_bitmap(&mut self, args: &str) -> Reply {
        let (index, bitmap) = match parse_bitmap_args(args) {
            Ok(parsed) => parsed,
            Err(message) => return Reply::Error(message),
        };
        let key = ResourceKey::new(BITMAP_TYPE, index);
        let summary = format!("bitmap {key} = {}x{}", bitmap.width, bitmap.height);
        let cmd = SetBitmapCmd::new(
            self.bitmap_setter(),
            key,
            self.store.bitmap(key),
            Some(Rc::new(bitmap)),
        );
        self.perform(cmd, || summary)
    }

    fn clear_bitmap(&mut self, args: &str) -> Reply {
        let Ok(index) = args.trim().parse::<u16>() else {
            return Reply::Error("usage: clear-bitmap <index>".into());
        };
        let key = ResourceKey::new(BITMAP_TYPE, index);
        let Some(old) = self.store.bitmap(key) else {
            return Reply::Error(format!("no bitmap at {key}"));
        };
        let cmd = SetBitmapCmd::new(self.bitmap_setter(), key, Some(old), None);
        self.perform(cmd, || format!("bitmap {key} removed"))
    }

    fn bitmap_setter(
        &self,
    ) -> impl Fn(ResourceKey, Option<&RawBitmap>) -> CommandResult + 'static {
        let store = Rc::clone(&self.store);
        move |key: ResourceKey, bitmap: Option<&RawBitmap>| store.set_bitmap(key, bitmap)
    }

    fn perform<C>(&mut self, cmd: C, summary: impl FnOnce() -> String) -> Reply
    where
        C: cmdstack::Command + 'static,
    {
        match self.stack.perform_cmd(cmd) {
            Ok(()) => Reply::Text(summary()),
            Err(error) => Reply::Error(format!("error: {error}")),
        }
    }

    fn undo(&mut self) -> Reply {
        let description = self.stack.next_undo_description().unwrap_or_default();
        match self.stack.undo() {
            None => Reply::Text("nothing to undo".into()),
            Some(Ok(())) => Reply::Text(format!("undid {description}")),
            Some(Err(error)) => Reply::Error(format!(
                "undo failed: {error} ({description} is still next to undo)"
            )),
        }
    }

    fn redo(&mut self) -> Reply {
        let description = self.stack.next_redo_description().unwrap_or_default();
        match self.stack.redo() {
            None => Reply::Text("nothing to redo".into()),
            Some(Ok(())) => Reply::Text(format!("redid {description}")),
            Some(Err(error)) => Reply::Error(format!(
                "redo failed: {error} ({description} is still next to redo)"
            )),
        }
    }

    fn show(&self) -> String {
        let mut out = format!("text = {:?}", self.store.text());
        for (key, bitmap) in self.store.bitmaps() {
            let _ = write!(
                out,
                "\nbitmap {key} = {}x{} ({} bytes)",
                bitmap.width,
                bitmap.height,
                bitmap.size_bytes()
            );
        }
        out
    }

    fn history(&self) -> String {
        let mut out = String::from("undo:");
        for description in self.stack.undo_descriptions(HISTORY_LIMIT) {
            let _ = write!(out, "\n  {description}");
        }
        out.push_str("\nredo:");
        for description in self.stack.redo_descriptions(HISTORY_LIMIT) {
            let _ = write!(out, "\n  {description}");
        }
        out
    }
}

/// Parse `<index> <w>x<h> <fill>`.
fn parse_bitmap_args(args: &str) -> Result<(u16, RawBitmap), String> {
    const USAGE: &str = "usage: bitmap <index> <w>x<h> <fill>";
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [index, size, fill] = parts.as_slice() else {
        return Err(USAGE.into());
    };
    let index: u16 = index.parse().map_err(|_| USAGE.to_string())?;
    if index > ResourceKey::INDEX_MASK {
        return Err(format!("index {index} out of range (max {})", ResourceKey::INDEX_MASK));
    }
    let (width, height) = size
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
        .ok_or_else(|| USAGE.to_string())?;
    let fill: u8 = fill.parse().map_err(|_| USAGE.to_string())?;
    if width == 0 || height == 0 {
        return Err("bitmap dimensions must be non-zero".into());
    }
    let bitmap = RawBitmap::filled(width, height, fill).map_err(|e| e.to_string())?;
    Ok((index, bitmap))
}
