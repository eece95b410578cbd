//! Event bus between the conversation controller and the UI.
//!
//! Single-threaded (WASM) with interior mutability via RefCell. The
//! controller pushes events; the UI drains them once per frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use assistant_types::event::AssistantEvent;

/// Shared event bus, clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<AssistantEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn emit(&self, event: AssistantEvent) {
        self.inner.borrow_mut().push_back(event);
    }

    /// Drain all pending events, oldest first.
    pub fn drain(&self) -> Vec<AssistantEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
