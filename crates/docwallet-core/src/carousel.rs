// ── Carousel snapshot ──
//
// The ordered entries a collection or stack presents, the flip
// controller of each entry's representative card and the centered
// index. Shared by `CollectionState` and `StackState`.

use std::sync::Arc;

use tracing::debug;

use crate::config::RecordComparison;
use crate::context::WalletContext;
use crate::flip::FlipController;
use crate::model::{CardGroup, DocTypeCode, same_card};

struct Slot {
    group: CardGroup,
    flip: Arc<FlipController>,
}

/// Same entries in the same order: equal member counts per index and
/// matching member snapshots under `comparison`.
pub fn groups_equal(a: &[CardGroup], b: &[CardGroup], comparison: RecordComparison) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(ga, gb)| {
            ga.count() == gb.count()
                && ga
                    .values()
                    .iter()
                    .zip(gb.values())
                    .all(|(ca, cb)| same_card(ca.as_ref(), cb.as_ref(), comparison))
        })
}

pub struct Carousel {
    slots: Vec<Slot>,
    centered: Option<usize>,
    context: WalletContext,
}

impl Carousel {
    pub fn new(context: WalletContext) -> Self {
        Self {
            slots: Vec::new(),
            centered: None,
            context,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn group(&self, index: usize) -> Option<&CardGroup> {
        self.slots.get(index).map(|s| &s.group)
    }

    pub fn flip(&self, index: usize) -> Option<&Arc<FlipController>> {
        self.slots.get(index).map(|s| &s.flip)
    }

    pub fn groups(&self) -> Vec<CardGroup> {
        self.slots.iter().map(|s| s.group.clone()).collect()
    }

    pub fn centered(&self) -> Option<usize> {
        self.centered
    }

    /// Replace the entries unless they are equal to the current ones.
    /// Returns whether anything changed. The centered index is clamped
    /// into the new bounds.
    pub fn replace(&mut self, groups: Vec<CardGroup>) -> bool {
        let current: Vec<CardGroup> = self.groups();
        if groups_equal(&current, &groups, self.context.config().record_comparison) {
            return false;
        }

        debug!(before = self.slots.len(), after = groups.len(), "carousel entries changed");
        self.slots = groups
            .into_iter()
            .map(|group| {
                let flip = FlipController::new(group.representative(), self.context.clone());
                Slot { group, flip }
            })
            .collect();

        self.centered = match (self.centered, self.slots.len()) {
            (_, 0) => None,
            (Some(index), len) => Some(index.min(len - 1)),
            (None, _) => Some(0),
        };
        if let Some(slot) = self.centered.and_then(|i| self.slots.get(i)) {
            slot.flip.set_focused(true);
        }
        true
    }

    /// Center `index`. Returns `false` when out of bounds or unchanged.
    pub fn settle(&mut self, index: usize) -> bool {
        if index >= self.slots.len() || self.centered == Some(index) {
            return false;
        }
        if let Some(prev) = self.centered.and_then(|i| self.slots.get(i)) {
            prev.flip.set_focused(false);
        }
        if let Some(next) = self.slots.get(index) {
            next.flip.set_focused(true);
        }
        self.centered = Some(index);
        true
    }

    /// Index of the first entry whose type matches `code` or one of its
    /// aliases.
    pub fn position_of(&self, code: &str) -> Option<usize> {
        self.slots.iter().position(|s| {
            s.group
                .representative()
                .document_type()
                .is_some_and(|t| t.is_same_as(code))
        })
    }

    pub fn position_of_type(&self, code: &DocTypeCode) -> Option<usize> {
        self.position_of(code.as_str())
    }

    /// Turn every card to its front, ending all sessions.
    pub fn hide_all(&self) {
        for slot in &self.slots {
            slot.flip.show_front();
        }
    }
}
