use std::time::Duration;

use crate::game::animation::Tween;
use crate::game::entity::card::{Card, CardId};
use crate::game::sink::VisualSink;
use crate::models::view::{Transform, VisualUpdate};
use crate::utils::errors::HandError;

/// The container a card was last settled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Deck,
    Hand,
}

/// A card in the hand together with where it is drawn.
#[derive(Debug)]
pub struct HandSlot {
    card: Card,
    transform: Transform,
    motion: Option<Tween>,
    origin: Origin,
}

impl HandSlot {
    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn card_mut(&mut self) -> &mut Card {
        &mut self.card
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// Where the card is heading, or where it rests.
    #[cfg(test)]
    pub fn destination(&self) -> Transform {
        self.motion
            .as_ref()
            .map_or(self.transform, |motion| motion.target())
    }

    /// Starts a move from the current transform, replacing any move in progress.
    pub fn move_to(&mut self, target: Transform, duration: Duration) {
        self.motion = Some(Tween::new(self.transform, target, duration));
    }

    fn advance(&mut self, dt: Duration, sink: &mut dyn VisualSink) {
        let Some(motion) = self.motion.as_mut() else {
            return;
        };

        self.transform = motion.advance(dt);
        sink.apply(
            self.card.id(),
            VisualUpdate::Transform {
                transform: self.transform,
            },
        );

        if motion.is_finished() {
            self.motion = None;
            self.origin = Origin::Hand;
        }
    }
}

/// Cards held by the player, in arrival order.
#[derive(Debug)]
pub struct Hand {
    capacity: usize,
    slots: Vec<HandSlot>,
}

impl Hand {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Appends a card arriving from the deck, drawn at `at` until it is moved.
    pub fn push(&mut self, card: Card, at: Transform) -> Result<(), HandError> {
        if self.slots.len() >= self.capacity {
            return Err(HandError::Full(self.capacity));
        }
        if self.position(card.id()).is_some() {
            return Err(HandError::Duplicate(card.id()));
        }

        self.slots.push(HandSlot {
            card,
            transform: at,
            motion: None,
            origin: Origin::Deck,
        });
        Ok(())
    }

    /// Removes the card at `index`; later cards shift left by one.
    pub fn remove(&mut self, index: usize) -> Option<HandSlot> {
        if index >= self.slots.len() {
            return None;
        }
        Some(self.slots.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&HandSlot> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut HandSlot> {
        self.slots.get_mut(index)
    }

    pub fn position(&self, id: CardId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.card.id() == id)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &HandSlot> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut HandSlot> {
        self.slots.iter_mut()
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<CardId> {
        self.slots.iter().map(|slot| slot.card.id()).collect()
    }

    /// True when no card is still moving.
    pub fn is_settled(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_moving())
    }

    pub fn advance_motions(&mut self, dt: Duration, sink: &mut dyn VisualSink) {
        for slot in &mut self.slots {
            slot.advance(dt, sink);
        }
    }
}
