use std::time::Duration;

use rand::Rng;

use crate::game::entity::card::{CardId, StatRoll};
use crate::game::entity::deck::CardSource;
use crate::game::entity::hand::{Hand, Origin};
use crate::game::layout::{HandLayoutEngine, LayoutFrame};
use crate::game::sink::VisualSink;
use crate::logger;
use crate::models::settings::Settings;
use crate::models::view::{Transform, Vec2, VisualUpdate};

#[derive(Debug, Clone)]
pub struct HandConfig {
    /// Number of cards to deal before the hand counts as retrieved.
    pub target: usize,
    pub capacity: usize,
    pub card_spacing: f32,
    pub deck_position: Vec2,
    pub arrival: Duration,
    pub settle: Duration,
    pub stat_step: Duration,
}

impl HandConfig {
    /// Reads the layout and timing settings and draws the hand target once.
    pub fn from_settings<R: Rng>(settings: &Settings, rng: &mut R) -> Self {
        Self {
            target: rng.gen_range(settings.hand_min..=settings.hand_max),
            capacity: settings.hand_max,
            card_spacing: settings.card_spacing,
            deck_position: settings.deck_position(),
            arrival: settings.arrival_duration(),
            settle: settings.settle_duration(),
            stat_step: settings.stat_step(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeState {
    Idle,
    /// A card was dealt and the hand is still moving into place.
    Taking,
    /// The deck ran out or the target was reached. Terminal.
    Retrieved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationState {
    Disabled,
    Ready,
    Iterating { card: CardId, stopping: bool },
    /// A card died and the hand is closing the gap.
    Settling { stopping: bool },
}

/// Round-robin position over the hand. `None` until the first step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationCursor(Option<usize>);

impl IterationCursor {
    pub fn get(&self) -> Option<usize> {
        self.0
    }

    pub fn advance(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            self.0 = None;
            return None;
        }
        let next = self.0.map_or(0, |current| (current + 1) % len);
        self.0 = Some(next);
        self.0
    }

    /// Keeps the cursor behind the next unvisited card after `index` was removed.
    pub fn on_removed(&mut self, index: usize) {
        if let Some(current) = self.0 {
            if index <= current {
                self.0 = Some(current.saturating_sub(1));
            }
        }
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }
}

/// Deals cards into the hand, lays them out as a fan and cycles stat changes over them.
pub struct HandFlowOrchestrator {
    config: HandConfig,
    layout: HandLayoutEngine,
    hand: Hand,
    take: TakeState,
    iteration: IterationState,
    cursor: IterationCursor,
    taken: usize,
}

impl HandFlowOrchestrator {
    pub fn new(config: HandConfig, layout: HandLayoutEngine) -> Self {
        logger!(INFO, "[HAND] Dealing up to {} cards", config.target);
        Self {
            hand: Hand::new(config.capacity),
            config,
            layout,
            take: TakeState::Idle,
            iteration: IterationState::Disabled,
            cursor: IterationCursor::default(),
            taken: 0,
        }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn take_state(&self) -> TakeState {
        self.take
    }

    pub fn iteration_state(&self) -> IterationState {
        self.iteration
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor.get()
    }

    /// Number of cards received from the source so far.
    pub fn taken(&self) -> usize {
        self.taken
    }

    pub fn is_retrieved(&self) -> bool {
        self.take == TakeState::Retrieved
    }

    /// Nothing left to deal, nothing left to iterate and nothing moving.
    pub fn is_finished(&self) -> bool {
        self.is_retrieved()
            && self.iteration == IterationState::Disabled
            && self.hand.is_settled()
    }

    /// Enables the stat cycle; the first step runs on the next tick.
    pub fn start_iteration(&mut self) {
        self.iteration = match self.iteration {
            IterationState::Disabled => {
                logger!(INFO, "[HAND] Stat iteration started");
                IterationState::Ready
            }
            IterationState::Iterating { card, .. } => IterationState::Iterating {
                card,
                stopping: false,
            },
            IterationState::Settling { .. } => IterationState::Settling { stopping: false },
            state => state,
        };
    }

    /// Disables the stat cycle once the step in flight, if any, has finished.
    pub fn stop_iteration(&mut self) {
        self.iteration = match self.iteration {
            IterationState::Ready => IterationState::Disabled,
            IterationState::Iterating { card, .. } => IterationState::Iterating {
                card,
                stopping: true,
            },
            IterationState::Settling { .. } => IterationState::Settling { stopping: true },
            state => state,
        };
    }

    /// Advances everything by one frame of `dt`.
    pub fn tick(
        &mut self,
        dt: Duration,
        source: &mut dyn CardSource,
        roll: &mut dyn StatRoll,
        sink: &mut dyn VisualSink,
    ) {
        self.hand.advance_motions(dt, sink);
        for slot in self.hand.iter_mut() {
            slot.card_mut().tick(dt, sink);
        }

        self.step_take(source, sink);
        self.reap_dead(sink);
        self.step_iteration(roll, sink);
    }

    fn step_take(&mut self, source: &mut dyn CardSource, sink: &mut dyn VisualSink) {
        match self.take {
            TakeState::Retrieved => {}
            TakeState::Taking => {
                if self.hand.is_settled() {
                    self.take = self.next_take_state();
                }
            }
            TakeState::Idle => {
                if self.hand.len() >= self.config.target {
                    self.take = self.next_take_state();
                    return;
                }
                if !source.is_ready() {
                    return;
                }

                let Some(mut card) = source.take_one() else {
                    logger!(INFO, "[HAND] Deck exhausted after {} cards", self.taken);
                    self.take = TakeState::Retrieved;
                    return;
                };

                self.taken += 1;
                card.flip(sink);
                card.present(sink);
                let id = card.id();
                let stats = card.stats();
                logger!(
                    DEBUG,
                    "[HAND] Dealt `{}` ({}/{}/{})",
                    card.title(),
                    stats.mana,
                    stats.attack,
                    stats.health
                );
                if let Err(error) = self.hand.push(card, Transform::at(self.config.deck_position)) {
                    logger!(ERROR, "[HAND] Dropping dealt card `{id}` ({error})");
                    self.take = TakeState::Retrieved;
                    return;
                }

                logger!(DEBUG, "[HAND] Took `{id}`, {} in hand", self.hand.len());
                sink.apply(id, VisualUpdate::Visible { visible: true });
                self.reposition();
                self.take = TakeState::Taking;
            }
        }
    }

    fn next_take_state(&self) -> TakeState {
        if self.hand.len() >= self.config.target {
            logger!(INFO, "[HAND] All {} cards retrieved", self.hand.len());
            TakeState::Retrieved
        } else {
            TakeState::Idle
        }
    }

    /// Removes dead cards the stat cycle is not currently holding.
    fn reap_dead(&mut self, sink: &mut dyn VisualSink) {
        let held = match self.iteration {
            IterationState::Iterating { card, .. } => Some(card),
            _ => None,
        };

        let mut removed = false;
        for index in (0..self.hand.len()).rev() {
            let Some(slot) = self.hand.get(index) else {
                continue;
            };
            let card = slot.card();
            if card.is_destroyed() && Some(card.id()) != held {
                self.remove_card(index, sink);
                removed = true;
            }
        }

        if removed {
            self.reposition();
        }
    }

    fn remove_card(&mut self, index: usize, sink: &mut dyn VisualSink) {
        if let Some(slot) = self.hand.remove(index) {
            self.cursor.on_removed(index);
            let card = slot.card();
            sink.apply(card.id(), VisualUpdate::Removed);
            logger!(
                INFO,
                "[HAND] `{}` ({}) destroyed, {} cards left",
                card.title(),
                card.id(),
                self.hand.len()
            );
        }
    }

    /// Retargets every card in the hand at its fan frame for the current size.
    fn reposition(&mut self) {
        let size = self.hand.len();
        let spacing = self.config.card_spacing;
        let left = self.layout.baseline().x - spacing * size.saturating_sub(1) as f32 / 2.0;
        let frames: Vec<LayoutFrame> = (0..size)
            .map(|index| {
                self.layout
                    .compute_frame(index, size, left + spacing * index as f32)
            })
            .collect();

        for (slot, frame) in self.hand.iter_mut().zip(frames) {
            let target = Transform::from(frame);
            if !slot.is_moving() && slot.transform() == target {
                continue;
            }
            let duration = match slot.origin() {
                Origin::Deck => self.config.arrival,
                Origin::Hand => self.config.settle,
            };
            slot.move_to(target, duration);
        }
    }

    fn step_iteration(&mut self, roll: &mut dyn StatRoll, sink: &mut dyn VisualSink) {
        match self.iteration {
            IterationState::Disabled => {}
            IterationState::Ready => self.begin_iteration_step(roll, sink),
            IterationState::Iterating { card, stopping } => {
                self.poll_iteration_step(card, stopping, sink)
            }
            IterationState::Settling { stopping } => {
                if self.hand.is_settled() {
                    self.iteration = HandFlowOrchestrator::after_step(stopping);
                }
            }
        }
    }

    fn begin_iteration_step(&mut self, roll: &mut dyn StatRoll, sink: &mut dyn VisualSink) {
        if self.hand.is_empty() {
            if self.is_retrieved() {
                logger!(INFO, "[HAND] No cards left to iterate");
                self.cursor.reset();
                self.iteration = IterationState::Disabled;
            }
            return;
        }

        let Some(index) = self.cursor.advance(self.hand.len()) else {
            return;
        };
        let Some(slot) = self.hand.get_mut(index) else {
            return;
        };

        let card = slot.card_mut();
        let id = card.id();
        match card.animate_random_stat_change(roll, self.config.stat_step, sink) {
            Ok(change) => logger!(
                DEBUG,
                "[HAND] Card {index} `{id}` moving {} to {}",
                change.kind,
                change.target
            ),
            Err(error) => {
                logger!(WARN, "[HAND] Skipping card {index} ({error})");
                return;
            }
        }

        self.iteration = IterationState::Iterating {
            card: id,
            stopping: false,
        };
        self.poll_iteration_step(id, false, sink);
    }

    fn poll_iteration_step(&mut self, id: CardId, stopping: bool, sink: &mut dyn VisualSink) {
        let Some(index) = self.hand.position(id) else {
            self.iteration = HandFlowOrchestrator::after_step(stopping);
            return;
        };
        let Some(slot) = self.hand.get(index) else {
            return;
        };

        let card = slot.card();
        if card.is_destroyed() {
            self.remove_card(index, sink);
            self.reposition();
            self.iteration = if self.hand.is_settled() {
                HandFlowOrchestrator::after_step(stopping)
            } else {
                IterationState::Settling { stopping }
            };
        } else if !card.is_mutating() {
            self.iteration = HandFlowOrchestrator::after_step(stopping);
        }
    }

    fn after_step(stopping: bool) -> IterationState {
        if stopping {
            IterationState::Disabled
        } else {
            IterationState::Ready
        }
    }
}
