//! A generic hierarchical state machine.
//!
//! Active states form a stack from the root to the leaf. Events are fed to the leaf first
//! and escalate towards the root while they stay unhandled. A state that handles an event may
//! replace itself, and everything below it, with a new state.
//!
//! States receive a mutable context `C` in every callback, the machine itself owns nothing but the stack.


/// A boxed state, as stored on the stack.
pub type BoxedState<E, C> = Box<dyn State<E, C>>;

/// The outcome of feeding an event to a single state.
pub enum HandleResult<E, C> {
    /// Not handled, try the parent.
    Unhandled,
    /// Handled, the state stays active.
    Handled,
    /// Handled, replace this state (and its descendants) with a new one.
    Transition(BoxedState<E, C>),
}

impl<E, C> HandleResult<E, C> {
    /// Transition to `state`.
    pub fn transition<S: State<E, C> + 'static>(state: S) -> Self {
        Self::Transition(Box::new(state))
    }
}

impl<E, C> core::fmt::Debug for HandleResult<E, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unhandled => f.write_str("Unhandled"),
            Self::Handled => f.write_str("Handled"),
            Self::Transition(state) => write!(f, "Transition({})", state.id()),
        }
    }
}

/// The outcome of feeding an event to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedResult {
    /// No state handled the event, it was dropped.
    Unhandled,
    /// A state handled the event without changing the stack.
    Handled,
    /// A state handled the event and the stack was changed.
    Transitioned,
}

/// A state of the hierarchical state machine.
pub trait State<E, C> {
    /// A name for diagnostics.
    fn id(&self) -> &'static str;

    /// Called once, when the state becomes active.
    fn enter(&mut self, _context: &mut C) {}

    /// Handle one event.
    fn feed(&mut self, context: &mut C, event: E) -> HandleResult<E, C>;

    /// Called once, when the state is removed from the stack.
    fn leave(&mut self, _context: &mut C) {}

    /// The default child of a compound state, entered right after this state.
    ///
    /// Simple states have none.
    fn initial_child(&mut self, _context: &mut C) -> Option<BoxedState<E, C>> {
        None
    }
}

/// The state machine, holding the stack of active states.
pub struct Fsm<E, C> {
    stack: Vec<BoxedState<E, C>>,
}

impl<E, C> Default for Fsm<E, C> {
    fn default() -> Self {
        Self { stack: Vec::new() }
    }
}

impl<E, C> core::fmt::Debug for Fsm<E, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.stack.iter().map(|state| state.id())).finish()
    }
}

impl<E: Copy, C> Fsm<E, C> {
    /// Create a machine with `root` as its only state.
    pub fn new<S: State<E, C> + 'static>(context: &mut C, root: S) -> Self {
        let mut fsm = Self::default();
        fsm.reset(context, root);
        fsm
    }

    /// Discard the stack, without leaving its states, and enter `root`.
    pub fn reset<S: State<E, C> + 'static>(&mut self, context: &mut C, root: S) {
        self.stack.clear();
        self.push(context, Box::new(root));
    }

    /// Feed an event, starting at the leaf.
    pub fn feed(&mut self, context: &mut C, event: E) -> FeedResult {
        let Some(mut level) = self.stack.len().checked_sub(1) else {
            unreachable!("event fed to a state machine without states");
        };

        loop {
            match self.stack[level].feed(context, event) {
                HandleResult::Handled => return FeedResult::Handled,
                HandleResult::Transition(state) => {
                    self.unwind(context, level);
                    self.push(context, state);
                    return FeedResult::Transitioned;
                }
                HandleResult::Unhandled if level == 0 => return FeedResult::Unhandled,
                HandleResult::Unhandled => level -= 1,
            }
        }
    }

    /// The id of the leaf state.
    pub fn current_id(&self) -> Option<&'static str> {
        self.stack.last().map(|state| state.id())
    }

    /// Ids of all active states, from the root to the leaf.
    pub fn active_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stack.iter().map(|state| state.id())
    }

    /// Number of active states.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Leave and pop states, leaf first, until `level` is the stack length.
    fn unwind(&mut self, context: &mut C, level: usize) {
        while self.stack.len() > level {
            if let Some(mut state) = self.stack.pop() {
                state.leave(context);
            }
        }
    }

    /// Enter and push `state`, then unroll its initial children.
    fn push(&mut self, context: &mut C, mut state: BoxedState<E, C>) {
        loop {
            state.enter(context);
            let child = state.initial_child(context);
            self.stack.push(state);

            match child {
                Some(next) => state = next,
                None => return,
            }
        }
    }
}
