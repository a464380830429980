use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u32);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Tracks which execution context is currently entered. The bottom of the
/// stack is the root context, active whenever nothing else is entered.
pub struct ContextStack {
    root: ContextId,
    active: RefCell<Vec<ContextId>>,
    next_id: Cell<u32>,
    enters: Cell<u64>,
    leaves: Cell<u64>,
}

impl ContextStack {
    fn new() -> Self {
        ContextStack {
            root: ContextId(0),
            active: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            enters: Cell::new(0),
            leaves: Cell::new(0),
        }
    }

    fn allocate_id(&self) -> ContextId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ContextId(id)
    }

    pub fn current(&self) -> ContextId {
        self.active.borrow().last().copied().unwrap_or(self.root)
    }

    /// Number of explicit enters not yet left.
    pub fn depth(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn enter_count(&self) -> u64 {
        self.enters.get()
    }

    pub fn leave_count(&self) -> u64 {
        self.leaves.get()
    }

    fn push(&self, id: ContextId) {
        self.active.borrow_mut().push(id);
        self.enters.set(self.enters.get() + 1);
    }

    fn pop(&self, id: ContextId) {
        let popped = self.active.borrow_mut().pop();
        self.leaves.set(self.leaves.get() + 1);
        if popped != Some(id) && !std::thread::panicking() {
            panic!(
                "Context {} left out of order (top of stack was {:?})",
                id, popped
            );
        }
    }
}

struct ContextData {
    id: ContextId,
    language: Rc<str>,
    parent: Option<ExecutionContext>,
    stack: Rc<ContextStack>,
}

/// A handle to an isolated evaluation environment. Cloning the handle
/// shares the context.
#[derive(Clone)]
pub struct ExecutionContext {
    data: Rc<ContextData>,
}

impl ExecutionContext {
    pub fn root(language: &str) -> Self {
        let stack = Rc::new(ContextStack::new());
        ExecutionContext {
            data: Rc::new(ContextData {
                id: stack.root,
                language: Rc::from(language),
                parent: None,
                stack,
            }),
        }
    }

    /// Creates a context nested under this one, sharing its stack.
    pub fn child(&self, language: &str) -> Self {
        let stack = self.data.stack.clone();
        ExecutionContext {
            data: Rc::new(ContextData {
                id: stack.allocate_id(),
                language: Rc::from(language),
                parent: Some(self.clone()),
                stack,
            }),
        }
    }

    pub fn id(&self) -> ContextId {
        self.data.id
    }

    pub fn language(&self) -> &str {
        &self.data.language
    }

    pub fn parent(&self) -> Option<&ExecutionContext> {
        self.data.parent.as_ref()
    }

    pub fn stack(&self) -> &ContextStack {
        &self.data.stack
    }

    pub fn is_active(&self) -> bool {
        self.data.stack.current() == self.data.id
    }

    /// Makes this context current until the returned guard is dropped.
    /// Entering an already active context is allowed and nests.
    pub fn enter(&self) -> ContextGuard {
        trace!(context = %self.data.id, language = %self.data.language, "enter");
        self.data.stack.push(self.data.id);
        ContextGuard {
            context: self.clone(),
        }
    }
}

impl PartialEq for ExecutionContext {
    fn eq(&self, other: &Self) -> bool {
        self.data.id == other.data.id && Rc::ptr_eq(&self.data.stack, &other.data.stack)
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionContext({} {})", self.data.id, self.data.language)
    }
}

/// Leaves the context on drop, including on early returns and unwinding.
pub struct ContextGuard {
    context: ExecutionContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        trace!(context = %self.context.data.id, "leave");
        self.context.data.stack.pop(self.context.data.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_active_by_default() {
        let root = ExecutionContext::root("vesper");
        let inner = root.child("calc");
        assert!(root.is_active());
        assert!(!inner.is_active());
        assert_eq!(inner.parent(), Some(&root));
    }

    #[test]
    fn test_guard_restores_previous_context() {
        let root = ExecutionContext::root("vesper");
        let inner = root.child("calc");
        {
            let _inner = inner.enter();
            assert!(inner.is_active());
            {
                let _outer = root.enter();
                assert!(root.is_active());
            }
            assert!(inner.is_active());
        }
        assert!(root.is_active());
        assert_eq!(root.stack().enter_count(), root.stack().leave_count());
        assert_eq!(root.stack().depth(), 0);
    }
}
