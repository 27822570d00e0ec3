//! Defines `HandlerRegistry`, which hands out the numeric ids stored in route trees.

use std::fmt;

/// Identifies a handler registered with a `Router`. Ids start at `1`; `0` never identifies a
/// handler since trees use it for "no route".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    /// The key stored in route trees for this id.
    pub fn key(self) -> u64 {
        self.0
    }
}

impl From<u64> for HandlerId {
    fn from(key: u64) -> Self {
        HandlerId(key)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Slots of handlers addressed by `HandlerId`. Released ids are handed out again, most recently
/// released first.
#[derive(Debug, Clone)]
pub(crate) struct HandlerRegistry<H> {
    // Index 0 stays vacant.
    slots: Vec<Option<H>>,
    free: Vec<HandlerId>,
}

impl<H> HandlerRegistry<H> {
    pub(crate) fn new() -> Self {
        HandlerRegistry {
            slots: vec![None],
            free: vec![],
        }
    }

    pub(crate) fn add(&mut self, handler: H) -> HandlerId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0 as usize] = Some(handler);
            return id;
        }

        self.slots.push(Some(handler));
        HandlerId((self.slots.len() - 1) as u64)
    }

    /// Empties the slot of `id`, returning what it held. Unknown or already released ids are
    /// ignored.
    pub(crate) fn remove(&mut self, id: HandlerId) -> Option<H> {
        let handler = self.slots.get_mut(id.0 as usize)?.take()?;
        self.free.push(id);
        Some(handler)
    }

    pub(crate) fn get(&self, id: HandlerId) -> Option<&H> {
        self.slots.get(id.0 as usize)?.as_ref()
    }
}
