use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::value::Value;

/// The linear monadic state threaded through every call. Updates produce a
/// new state; previously handed-out states keep their contents.
#[derive(Clone, Debug, Default)]
pub struct State {
    slots: Rc<HashMap<Rc<str>, Value>>,
}

impl State {
    pub fn empty() -> Self {
        State::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.slots.get(key)
    }

    pub fn put(&self, key: &str, value: Value) -> State {
        let mut slots = (*self.slots).clone();
        slots.insert(Rc::from(key), value);
        State {
            slots: Rc::new(slots),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when both handles are the very same state, not just equal ones.
    pub fn ptr_eq(&self, other: &State) -> bool {
        Rc::ptr_eq(&self.slots, &other.slots)
    }
}

/// The pair returned by every invocation: the updated state and the result.
#[derive(Clone, Debug)]
pub struct Stateful {
    pub state: State,
    pub value: Value,
}

impl Stateful {
    pub fn new(state: State, value: Value) -> Self {
        Stateful { state, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_leaves_old_state_untouched() {
        let s0 = State::empty();
        let s1 = s0.put("counter", Value::Integer(1));
        assert_eq!(s0.get("counter"), None);
        assert_eq!(s1.get("counter"), Some(&Value::Integer(1)));
        assert!(!s0.ptr_eq(&s1));
        assert!(s1.ptr_eq(&s1.clone()));
    }
}
