// src/core/cursor.rs
use crate::core::types::MaterialItem;

/// A forward-only position over the presented material.
///
/// `completed() ++ [current()] ++ remaining()` is always the whole sequence.
/// There is no way back; a new lesson setup builds a new cursor.
#[derive(Debug, Clone, Default)]
pub struct PresentationCursor {
    sequence: Vec<MaterialItem>,
    position: usize,
    empty: MaterialItem,
}

impl PresentationCursor {
    pub fn new(sequence: Vec<MaterialItem>) -> Self {
        Self { sequence, position: 0, empty: MaterialItem::empty() }
    }

    /// The active item, or an empty item once the sequence is exhausted.
    pub fn current(&self) -> &MaterialItem {
        self.sequence.get(self.position).unwrap_or(&self.empty)
    }

    /// Moves one item forward. Does nothing once finished.
    pub fn advance(&mut self) {
        if self.position < self.sequence.len() {
            self.position += 1;
        }
    }

    /// Moves forward past every remaining item.
    pub fn finish(&mut self) {
        self.position = self.sequence.len();
    }

    pub fn completed(&self) -> &[MaterialItem] {
        &self.sequence[..self.position]
    }

    /// Items after the current one.
    pub fn remaining(&self) -> &[MaterialItem] {
        self.sequence.get(self.position + 1..).unwrap_or(&[])
    }

    /// Up to `n` items after the current one, for look-ahead display.
    pub fn upcoming(&self, n: usize) -> &[MaterialItem] {
        let remaining = self.remaining();
        &remaining[..n.min(remaining.len())]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.position == self.sequence.len()
    }

    pub fn sequence(&self) -> &[MaterialItem] {
        &self.sequence
    }
}
