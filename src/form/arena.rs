//! Generational arena holding form records
//!
//! Parent/child links are stored as [`FormId`]s so the tree has no reference
//! cycles. A removed slot bumps its generation, so ids held by in-flight
//! operations never alias a form created later in the same slot.

use super::node::FormNode;
use std::fmt;

/// Stable identifier of a form in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId {
    index: u32,
    generation: u32,
}

impl FormId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form#{}v{}", self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    node: Option<FormNode>,
}

#[derive(Default)]
pub(crate) struct FormArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl FormArena {
    pub fn insert(&mut self, node: FormNode) -> FormId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return FormId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        FormId::new(index, 0)
    }

    pub fn get(&self, id: FormId) -> Option<&FormNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: FormId) -> Option<&mut FormNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn remove(&mut self, id: FormId) -> Option<FormNode> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    pub fn contains(&self, id: FormId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }
}
