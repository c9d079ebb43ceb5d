#![forbid(unsafe_code)]

//! Scenario tests for [`CommandStack`].
//!
//! Each test reads as given / when / then against a [`Fixture`] that owns the
//! stack and a set of named spy commands which count their calls.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use cmdstack::{Command, CommandError, CommandResult, CommandStack, SetTextCmd};

// ============================================================================
// Fixture
// ============================================================================

type Task = Box<dyn Fn()>;

#[derive(Default)]
struct Spy {
    name: String,
    executed: Cell<u32>,
    reverted: Cell<u32>,
    pending_error: RefCell<Option<CommandError>>,
    task: RefCell<Option<Task>>,
}

impl Spy {
    fn run(&self) -> CommandResult {
        if let Some(task) = self.task.borrow().as_ref() {
            task();
        }
        match self.pending_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct SpyCmd(Rc<Spy>);

impl Command for SpyCmd {
    fn execute(&self) -> CommandResult {
        self.0.executed.set(self.0.executed.get() + 1);
        self.0.run()
    }

    fn undo(&self) -> CommandResult {
        self.0.reverted.set(self.0.reverted.get() + 1);
        self.0.run()
    }

    fn description(&self) -> &str {
        &self.0.name
    }
}

struct Fixture {
    stack: Rc<CommandStack>,
    spies: HashMap<String, Rc<Spy>>,
}

impl Fixture {
    fn given_an_instance() -> Self {
        Self {
            stack: Rc::new(CommandStack::default()),
            spies: HashMap::new(),
        }
    }

    fn a_command(&mut self, name: &str) -> Box<dyn Command> {
        let spy = Rc::new(Spy {
            name: name.to_string(),
            ..Spy::default()
        });
        self.spies.insert(name.to_string(), Rc::clone(&spy));
        Box::new(SpyCmd(spy))
    }

    fn a_command_returning(&mut self, name: &str, err: CommandError) -> Box<dyn Command> {
        let cmd = self.a_command(name);
        *self.spy(name).pending_error.borrow_mut() = Some(err);
        cmd
    }

    fn spy(&self, name: &str) -> &Rc<Spy> {
        self.spies
            .get(name)
            .unwrap_or_else(|| panic!("command not found <{name}> - test is wrong"))
    }

    fn given_command_was_performed(&mut self, name: &str) {
        let cmd = self.a_command(name);
        self.stack.perform(cmd).expect("setup command should succeed");
    }

    fn given_undo_was_called_times(&self, times: usize) {
        for _ in 0..times {
            self.stack.undo();
        }
    }

    fn given_redo_was_called_times(&self, times: usize) {
        for _ in 0..times {
            self.stack.redo();
        }
    }

    fn given_command_will_fail(&self, name: &str) {
        let err = CommandError::Other("failing".into());
        *self.spy(name).pending_error.borrow_mut() = Some(err);
    }

    fn given_command_executes(&self, name: &str, task: Task) {
        *self.spy(name).task.borrow_mut() = Some(task);
    }

    fn when_undoing(&self) -> Option<CommandResult> {
        self.stack.undo()
    }

    fn when_redoing(&self) -> Option<CommandResult> {
        self.stack.redo()
    }

    fn executed(&self, name: &str) -> u32 {
        self.spy(name).executed.get()
    }

    fn reverted(&self, name: &str) -> u32 {
        self.spy(name).reverted.get()
    }

    fn weak_stack(&self) -> Weak<CommandStack> {
        Rc::downgrade(&self.stack)
    }
}

// ============================================================================
// Perform
// ============================================================================

#[test]
fn new_stack_cant_do_anything() {
    let fx = Fixture::given_an_instance();
    assert!(!fx.stack.can_undo(), "Stack should not be able to undo");
    assert!(!fx.stack.can_redo(), "Stack should not be able to redo");
}

#[test]
fn perform_executes_command() {
    let mut fx = Fixture::given_an_instance();
    let cmd = fx.a_command("cmd1");
    fx.stack.perform(cmd).unwrap();
    assert_eq!(fx.executed("cmd1"), 1);
}

#[test]
fn perform_allows_undo_if_successful() {
    let mut fx = Fixture::given_an_instance();
    let cmd = fx.a_command("cmd1");
    fx.stack.perform(cmd).unwrap();
    assert!(fx.stack.can_undo());
}

#[test]
fn perform_ignores_command_if_it_fails() {
    let mut fx = Fixture::given_an_instance();
    let cmd = fx.a_command_returning("unnamed", CommandError::Other("fail".into()));
    let _ = fx.stack.perform(cmd);
    assert!(!fx.stack.can_undo());
    assert!(!fx.stack.can_redo());
}

#[test]
fn perform_returns_error_of_command() {
    let mut fx = Fixture::given_an_instance();
    let err = CommandError::rejected("text", "fail first time");
    let cmd = fx.a_command_returning("unnamed", err.clone());
    assert_eq!(fx.stack.perform(cmd), Err(err));
}

#[test]
fn perform_drops_pending_redo_stack() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_undo_was_called_times(1);

    let cmd = fx.a_command("cmd2");
    fx.stack.perform(cmd).unwrap();
    assert!(!fx.stack.can_redo());

    assert!(fx.when_redoing().is_none());
    assert_eq!(fx.executed("cmd1"), 1);
}

// ============================================================================
// Undo
// ============================================================================

#[test]
fn undo_reverts_command() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    assert_eq!(fx.when_undoing(), Some(Ok(())));
    assert_eq!(fx.reverted("cmd1"), 1);
}

#[test]
fn undo_reverts_command_only_once() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_undo_was_called_times(1);
    assert!(fx.when_undoing().is_none());
    assert_eq!(fx.reverted("cmd1"), 1);
}

#[test]
fn undo_reverts_commands_in_sequence() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_command_was_performed("cmd2");

    fx.when_undoing();
    assert_eq!(fx.reverted("cmd2"), 1);
    assert_eq!(fx.reverted("cmd1"), 0);

    fx.when_undoing();
    assert_eq!(fx.reverted("cmd1"), 1);
}

#[test]
fn undo_leaves_stack_unchanged_if_command_fails() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_command_was_performed("cmd2");
    fx.given_command_will_fail("cmd2");

    let failed = fx.when_undoing();
    assert_eq!(failed, Some(Err(CommandError::Other("failing".into()))));
    assert!(fx.stack.can_undo());
    assert!(!fx.stack.can_redo());
    assert_eq!(fx.stack.undo_depth(), 2);

    fx.when_undoing();
    assert_eq!(fx.reverted("cmd2"), 2);
    assert_eq!(fx.reverted("cmd1"), 0);
    assert_eq!(fx.stack.redo_depth(), 1);
}

#[test]
fn undo_enables_redo() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.when_undoing();
    assert!(fx.stack.can_redo());
}

// ============================================================================
// Redo
// ============================================================================

#[test]
fn redo_executes_command_again() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_undo_was_called_times(1);
    assert_eq!(fx.when_redoing(), Some(Ok(())));
    assert_eq!(fx.executed("cmd1"), 2);
}

#[test]
fn redo_executes_command_only_once() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_undo_was_called_times(1);
    fx.given_redo_was_called_times(1);
    assert!(fx.when_redoing().is_none());
    assert_eq!(fx.executed("cmd1"), 2);
}

#[test]
fn redo_executes_commands_in_sequence() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_command_was_performed("cmd2");
    fx.given_undo_was_called_times(2);

    fx.when_redoing();
    assert_eq!(fx.executed("cmd1"), 2);
    assert_eq!(fx.executed("cmd2"), 1);

    fx.when_redoing();
    assert_eq!(fx.executed("cmd2"), 2);
}

#[test]
fn redo_leaves_stack_unchanged_if_command_fails() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_undo_was_called_times(1);
    fx.given_command_will_fail("cmd1");

    assert!(matches!(fx.when_redoing(), Some(Err(_))));
    assert!(!fx.stack.can_undo());
    assert!(fx.stack.can_redo());

    fx.when_redoing();
    assert_eq!(fx.executed("cmd1"), 3);
    assert!(fx.stack.can_undo());
}

#[test]
fn redo_makes_commands_undoable_again() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_undo_was_called_times(1);
    fx.given_redo_was_called_times(1);
    fx.when_undoing();
    assert_eq!(fx.reverted("cmd1"), 2);
}

#[test]
fn round_trip_restores_performed_state() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("a");
    fx.given_command_was_performed("b");
    fx.given_undo_was_called_times(2);
    fx.given_redo_was_called_times(2);

    for name in ["a", "b"] {
        assert_eq!(fx.executed(name), 2, "{name} executed");
        assert_eq!(fx.reverted(name), 1, "{name} reverted");
    }
    assert_eq!(fx.stack.undo_descriptions(2), vec!["b", "a"]);
    assert!(!fx.stack.can_redo());
}

// ============================================================================
// Reentrancy
// ============================================================================

/// Builds a task that calls into the stack and records whether it panicked.
fn nested_call(
    stack: Weak<CommandStack>,
    call: fn(&CommandStack),
    panicked: Rc<Cell<Option<bool>>>,
) -> Task {
    Box::new(move || {
        assert!(
            panicked.get().is_none(),
            "nested call ran twice; it should have panicked the first time"
        );
        let stack = stack.upgrade().expect("stack outlives its commands");
        let outcome = catch_unwind(AssertUnwindSafe(|| call(&stack)));
        panicked.set(Some(outcome.is_err()));
    })
}

fn nested_perform(stack: &CommandStack) {
    let _ = stack.perform(Box::new(SetTextCmd::new(|_: &str| Ok(()), "", "nested")));
}

fn nested_undo(stack: &CommandStack) {
    stack.undo();
}

fn nested_redo(stack: &CommandStack) {
    stack.redo();
}

fn nested_clear(stack: &CommandStack) {
    stack.clear();
}

/// Runs `call` from inside perform, undo and redo and checks all three panic.
fn assert_nested_call_panics(call: fn(&CommandStack)) {
    let mut fx = Fixture::given_an_instance();

    let during_perform = Rc::new(Cell::new(None));
    let cmd = fx.a_command("cmd1");
    fx.given_command_executes(
        "cmd1",
        nested_call(fx.weak_stack(), call, Rc::clone(&during_perform)),
    );
    fx.stack.perform(cmd).unwrap();
    assert_eq!(during_perform.get(), Some(true), "call during perform");

    let during_undo = Rc::new(Cell::new(None));
    fx.given_command_was_performed("cmd2");
    fx.given_command_executes(
        "cmd2",
        nested_call(fx.weak_stack(), call, Rc::clone(&during_undo)),
    );
    assert_eq!(fx.when_undoing(), Some(Ok(())));
    assert_eq!(during_undo.get(), Some(true), "call during undo");

    let during_redo = Rc::new(Cell::new(None));
    fx.given_command_was_performed("cmd3");
    fx.given_undo_was_called_times(1);
    fx.given_command_executes(
        "cmd3",
        nested_call(fx.weak_stack(), call, Rc::clone(&during_redo)),
    );
    assert_eq!(fx.when_redoing(), Some(Ok(())));
    assert_eq!(during_redo.get(), Some(true), "call during redo");

    assert!(!fx.stack.is_busy());
}

#[test]
fn perform_panics_if_stack_is_in_use() {
    assert_nested_call_panics(nested_perform);
}

#[test]
fn undo_panics_if_stack_is_in_use() {
    assert_nested_call_panics(nested_undo);
}

#[test]
fn redo_panics_if_stack_is_in_use() {
    assert_nested_call_panics(nested_redo);
}

#[test]
fn clear_panics_if_stack_is_in_use() {
    assert_nested_call_panics(nested_clear);
}

#[test]
fn nested_clear_leaves_history_intact() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    fx.given_command_was_performed("cmd2");
    fx.given_undo_was_called_times(1);

    let panicked = Rc::new(Cell::new(None));
    fx.given_command_executes(
        "cmd1",
        nested_call(fx.weak_stack(), nested_clear, Rc::clone(&panicked)),
    );
    assert_eq!(fx.when_undoing(), Some(Ok(())));
    assert_eq!(panicked.get(), Some(true));
    assert_eq!(fx.stack.undo_depth(), 0);
    assert_eq!(fx.stack.redo_depth(), 2);
}

#[test]
#[should_panic(expected = "reentrant call to perform while perform")]
fn reentrant_perform_propagates_to_caller() {
    let mut fx = Fixture::given_an_instance();
    let cmd = fx.a_command("outer");
    let stack = fx.weak_stack();
    fx.given_command_executes(
        "outer",
        Box::new(move || {
            if let Some(stack) = stack.upgrade() {
                nested_perform(&stack);
            }
        }),
    );
    let _ = fx.stack.perform(cmd);
}

#[test]
fn stack_is_usable_after_reentrancy_panic_unwinds() {
    let mut fx = Fixture::given_an_instance();
    fx.given_command_was_performed("cmd1");
    let stack = fx.weak_stack();
    fx.given_command_executes(
        "cmd1",
        Box::new(move || {
            if let Some(stack) = stack.upgrade() {
                stack.redo();
            }
        }),
    );

    let outcome = catch_unwind(AssertUnwindSafe(|| fx.stack.undo()));
    assert!(outcome.is_err());
    assert!(!fx.stack.is_busy());
    assert!(fx.stack.can_undo(), "unwound undo must not move the command");
    assert!(!fx.stack.can_redo());
}

// ============================================================================
// Text edit
// ============================================================================

#[test]
fn text_edit_round_trip() {
    let applied = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&applied);
    let cmd = SetTextCmd::new(
        move |value: &str| {
            sink.borrow_mut().push(value.to_string());
            Ok(())
        },
        "hello",
        "world",
    );
    let stack = CommandStack::default();
    let last = || applied.borrow().last().cloned();

    stack.perform(Box::new(cmd)).unwrap();
    assert_eq!(last().as_deref(), Some("world"));
    assert!(stack.can_undo());

    assert_eq!(stack.undo(), Some(Ok(())));
    assert_eq!(last().as_deref(), Some("hello"));
    assert!(!stack.can_undo());
    assert!(stack.can_redo());

    assert_eq!(stack.redo(), Some(Ok(())));
    assert_eq!(last().as_deref(), Some("world"));
    assert!(stack.can_undo());
    assert!(!stack.can_redo());

    assert_eq!(*applied.borrow(), vec!["world", "hello", "world"]);
}

#[test]
fn text_edit_rejected_by_store_is_not_recorded() {
    let value = Rc::new(RefCell::new(String::from("hello")));
    let target = Rc::clone(&value);
    let setter = move |v: &str| -> CommandResult {
        if v.is_empty() {
            return Err(CommandError::rejected("text", "must not be empty"));
        }
        *target.borrow_mut() = v.to_string();
        Ok(())
    };

    let stack = CommandStack::default();
    let result = stack.perform_cmd(SetTextCmd::new(setter, "hello", ""));
    assert_eq!(
        result,
        Err(CommandError::rejected("text", "must not be empty"))
    );
    assert_eq!(*value.borrow(), "hello");
    assert!(!stack.can_undo());
}
