use std::fmt::Display;
use std::time::Duration;

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assets::images::ImageHandle;
use crate::game::sink::VisualSink;
use crate::logger;
use crate::models::view::{Face, StatKind, VisualUpdate};
use crate::utils::errors::CardError;

/// Opaque identity of a card, stable for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub mana: i32,
    pub attack: i32,
    pub health: i32,
}

impl Stats {
    pub fn new(mana: i32, attack: i32, health: i32) -> Self {
        Self {
            mana,
            attack,
            health,
        }
    }

    pub fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::Mana => self.mana,
            StatKind::Attack => self.attack,
            StatKind::Health => self.health,
        }
    }

    fn slot(&mut self, kind: StatKind) -> &mut i32 {
        match kind {
            StatKind::Mana => &mut self.mana,
            StatKind::Attack => &mut self.attack,
            StatKind::Health => &mut self.health,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// Which stat to move and where it should end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatChange {
    pub kind: StatKind,
    pub target: i32,
}

impl StatChange {
    pub fn new(kind: StatKind, target: i32) -> Self {
        Self { kind, target }
    }
}

impl Distribution<StatKind> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> StatKind {
        match rng.gen_range(0..3) {
            0 => StatKind::Mana,
            1 => StatKind::Attack,
            _ => StatKind::Health,
        }
    }
}

/// Picks the next stat change for a card.
pub trait StatRoll {
    fn roll(&mut self) -> StatChange;
}

/// Uniform stat kind, uniform target in `min..=max`.
pub struct RandomRoll<R: Rng> {
    rng: R,
    min: i32,
    max: i32,
}

impl<R: Rng> RandomRoll<R> {
    pub fn new(rng: R, min: i32, max: i32) -> Self {
        Self { rng, min, max }
    }
}

impl<R: Rng> StatRoll for RandomRoll<R> {
    fn roll(&mut self) -> StatChange {
        let kind: StatKind = self.rng.gen();
        let target = self.rng.gen_range(self.min..=self.max);
        StatChange::new(kind, target)
    }
}

/// A count-up/down in progress: one ±1 step per `step` of elapsed time.
#[derive(Debug, Clone)]
pub struct StatMutation {
    change: StatChange,
    direction: i32,
    step: Duration,
    waited: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardStatus {
    Idle,
    Animating,
    Destroyed,
}

#[derive(Debug, Clone)]
pub struct Card {
    id: CardId,
    title: String,
    description: String,
    image: Option<ImageHandle>,
    stats: Stats,
    face: Face,
    mutation: Option<StatMutation>,
}

impl Default for Card {
    fn default() -> Self {
        Self {
            id: CardId::new(),
            title: "Title".to_string(),
            description: "Description".to_string(),
            image: None,
            stats: Stats::default(),
            face: Face::Back,
            mutation: None,
        }
    }
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an undrawn card with the given stats, without touching any display.
    #[cfg(test)]
    pub fn with_stats(mana: i32, attack: i32, health: i32) -> Self {
        Self {
            stats: Stats::new(mana, attack, health),
            ..Self::default()
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[cfg(test)]
    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn stat(&self, kind: StatKind) -> i32 {
        self.stats.get(kind)
    }

    #[cfg(test)]
    pub fn face(&self) -> Face {
        self.face
    }

    pub fn is_destroyed(&self) -> bool {
        self.stats.health <= 0
    }

    pub fn is_mutating(&self) -> bool {
        self.mutation.is_some()
    }

    /// Pushes the whole card state to the display, as on its first draw.
    pub fn present(&self, sink: &mut dyn VisualSink) {
        sink.apply(self.id, VisualUpdate::Title { text: self.title.clone() });
        sink.apply(
            self.id,
            VisualUpdate::Description {
                text: self.description.clone(),
            },
        );
        if let Some(image) = &self.image {
            sink.apply(self.id, VisualUpdate::Image { image: image.id() });
        }
        for kind in StatKind::ALL {
            sink.apply(
                self.id,
                VisualUpdate::Stat {
                    kind,
                    value: self.stats.get(kind),
                },
            );
        }
        sink.apply(self.id, VisualUpdate::Face { face: self.face });
    }

    pub fn set_title(&mut self, title: impl Into<String>, sink: &mut dyn VisualSink) {
        self.title = title.into();
        sink.apply(self.id, VisualUpdate::Title { text: self.title.clone() });
    }

    pub fn set_description(&mut self, description: impl Into<String>, sink: &mut dyn VisualSink) {
        self.description = description.into();
        sink.apply(
            self.id,
            VisualUpdate::Description {
                text: self.description.clone(),
            },
        );
    }

    pub fn set_image(&mut self, image: ImageHandle, sink: &mut dyn VisualSink) {
        sink.apply(self.id, VisualUpdate::Image { image: image.id() });
        self.image = Some(image);
    }

    pub fn set_stat(&mut self, kind: StatKind, value: i32, sink: &mut dyn VisualSink) {
        *self.stats.slot(kind) = value;
        sink.apply(self.id, VisualUpdate::Stat { kind, value });
    }

    /// Turns the card over. Exactly one face is showing at any time.
    pub fn flip(&mut self, sink: &mut dyn VisualSink) {
        self.face = self.face.flipped();
        sink.apply(self.id, VisualUpdate::Face { face: self.face });
    }

    /// Rolls a stat and a target, then starts counting towards it.
    pub fn animate_random_stat_change(
        &mut self,
        roll: &mut dyn StatRoll,
        step: Duration,
        sink: &mut dyn VisualSink,
    ) -> Result<StatChange, CardError> {
        let change = roll.roll();
        self.begin_stat_change(change, step, sink)?;
        Ok(change)
    }

    /// Starts counting `change.kind` towards `change.target`.
    ///
    /// The first step is shown immediately; every following step waits `step`.
    /// A change to the value the stat already holds finishes without a single step.
    pub fn begin_stat_change(
        &mut self,
        change: StatChange,
        step: Duration,
        sink: &mut dyn VisualSink,
    ) -> Result<(), CardError> {
        if self.mutation.is_some() {
            return Err(CardError::MutationInFlight(self.id));
        }

        let current = self.stat(change.kind);
        if current == change.target {
            return Ok(());
        }

        logger!(
            DEBUG,
            "[CARD] `{}` {} {} -> {}",
            self.id,
            change.kind,
            current,
            change.target
        );

        let direction = (change.target - current).signum();
        self.set_stat(change.kind, current + direction, sink);
        if change.kind == StatKind::Health && self.is_destroyed() {
            return Ok(());
        }

        self.mutation = Some(StatMutation {
            change,
            direction,
            step,
            waited: Duration::ZERO,
        });
        Ok(())
    }

    /// Advances the running stat change and applies the death rule.
    pub fn tick(&mut self, dt: Duration, sink: &mut dyn VisualSink) -> CardStatus {
        if self.is_destroyed() {
            if self.mutation.take().is_some() {
                logger!(DEBUG, "[CARD] `{}` died mid-change, abandoning it", self.id);
            }
            return CardStatus::Destroyed;
        }

        let Some(mut mutation) = self.mutation.take() else {
            return CardStatus::Idle;
        };

        mutation.waited += dt;
        while mutation.step.is_zero() || mutation.waited >= mutation.step {
            mutation.waited -= mutation.step;

            let kind = mutation.change.kind;
            let current = self.stat(kind);
            if current == mutation.change.target {
                return CardStatus::Idle;
            }

            self.set_stat(kind, current + mutation.direction, sink);
            if self.is_destroyed() {
                return CardStatus::Destroyed;
            }
        }

        self.mutation = Some(mutation);
        CardStatus::Animating
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::sink::{NullSink, RecordingSink};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const STEP: Duration = Duration::from_millis(250);

    fn stat_values(sink: &RecordingSink, kind: StatKind) -> Vec<i32> {
        sink.updates
            .iter()
            .filter_map(|(_, update)| match update {
                VisualUpdate::Stat { kind: k, value } if *k == kind => Some(*value),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn set_stat_updates_value_and_display() {
        let mut card = Card::new();
        let mut sink = RecordingSink::default();
        card.set_stat(StatKind::Attack, 7, &mut sink);

        assert_eq!(card.stat(StatKind::Attack), 7);
        assert_eq!(
            sink.updates,
            vec![(
                card.id(),
                VisualUpdate::Stat {
                    kind: StatKind::Attack,
                    value: 7
                }
            )]
        );
    }

    #[test]
    fn flip_alternates_faces() {
        let mut card = Card::new();
        assert_eq!(card.face(), Face::Back);
        card.flip(&mut NullSink);
        assert_eq!(card.face(), Face::Front);
        card.flip(&mut NullSink);
        assert_eq!(card.face(), Face::Back);
    }

    #[test]
    fn change_to_current_value_takes_no_steps() {
        let mut card = Card::with_stats(4, 4, 4);
        let mut sink = RecordingSink::default();
        card.begin_stat_change(StatChange::new(StatKind::Mana, 4), STEP, &mut sink)
            .unwrap();

        assert!(!card.is_mutating());
        assert!(sink.updates.is_empty());
        assert_eq!(card.tick(STEP, &mut sink), CardStatus::Idle);
        assert!(sink.updates.is_empty());
    }

    #[test]
    fn counts_up_one_step_per_interval() {
        let mut card = Card::with_stats(1, 1, 10);
        let mut sink = RecordingSink::default();
        card.begin_stat_change(StatChange::new(StatKind::Mana, 4), STEP, &mut sink)
            .unwrap();
        assert_eq!(card.stat(StatKind::Mana), 2);

        assert_eq!(card.tick(Duration::from_millis(100), &mut sink), CardStatus::Animating);
        assert_eq!(card.stat(StatKind::Mana), 2);
        assert_eq!(card.tick(Duration::from_millis(150), &mut sink), CardStatus::Animating);
        assert_eq!(card.stat(StatKind::Mana), 3);
        assert_eq!(card.tick(STEP, &mut sink), CardStatus::Animating);
        assert_eq!(card.stat(StatKind::Mana), 4);
        assert_eq!(card.tick(STEP, &mut sink), CardStatus::Idle);

        assert!(!card.is_mutating());
        assert_eq!(stat_values(&sink, StatKind::Mana), vec![2, 3, 4]);
    }

    #[test]
    fn counts_down_through_negative_values() {
        let mut card = Card::with_stats(1, 0, 10);
        let mut sink = RecordingSink::default();
        card.begin_stat_change(StatChange::new(StatKind::Attack, -2), STEP, &mut sink)
            .unwrap();
        while card.tick(STEP, &mut sink) == CardStatus::Animating {}

        assert_eq!(card.stat(StatKind::Attack), -2);
        assert_eq!(stat_values(&sink, StatKind::Attack), vec![-1, -2]);
    }

    #[test]
    fn health_reaching_zero_abandons_remaining_steps() {
        let mut card = Card::with_stats(1, 1, 2);
        let mut sink = RecordingSink::default();
        card.begin_stat_change(StatChange::new(StatKind::Health, -2), STEP, &mut sink)
            .unwrap();
        assert_eq!(card.stat(StatKind::Health), 1);

        assert_eq!(card.tick(STEP, &mut sink), CardStatus::Destroyed);
        assert!(!card.is_mutating());
        assert_eq!(card.tick(STEP, &mut sink), CardStatus::Destroyed);
        assert_eq!(stat_values(&sink, StatKind::Health), vec![1, 0]);
    }

    #[test]
    fn first_step_can_kill_immediately() {
        let mut card = Card::with_stats(1, 1, 1);
        card.begin_stat_change(StatChange::new(StatKind::Health, -1), STEP, &mut NullSink)
            .unwrap();

        assert!(card.is_destroyed());
        assert!(!card.is_mutating());
    }

    #[test]
    fn stale_health_kills_during_other_stat_change() {
        let mut card = Card::with_stats(1, 1, 5);
        let mut sink = NullSink;
        card.begin_stat_change(StatChange::new(StatKind::Mana, 9), STEP, &mut sink)
            .unwrap();
        card.set_stat(StatKind::Health, 0, &mut sink);

        assert_eq!(card.tick(STEP, &mut sink), CardStatus::Destroyed);
        assert!(!card.is_mutating());
        assert_eq!(card.stat(StatKind::Mana), 2);
    }

    #[test]
    fn second_change_while_running_is_rejected() {
        let mut card = Card::with_stats(0, 0, 5);
        let mut sink = NullSink;
        card.begin_stat_change(StatChange::new(StatKind::Mana, 5), STEP, &mut sink)
            .unwrap();

        let result = card.begin_stat_change(StatChange::new(StatKind::Attack, 5), STEP, &mut sink);
        assert_eq!(result, Err(CardError::MutationInFlight(card.id())));
    }

    #[test]
    fn random_roll_stays_in_range_and_hits_every_stat() {
        let mut roll = RandomRoll::new(StdRng::seed_from_u64(7), -2, 9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            let change = roll.roll();
            assert!((-2..=9).contains(&change.target));
            seen.insert(change.kind);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn present_draws_full_state() {
        let card = Card::with_stats(2, 3, 4);
        let mut sink = RecordingSink::default();
        card.present(&mut sink);

        assert_eq!(stat_values(&sink, StatKind::Mana), vec![2]);
        assert_eq!(stat_values(&sink, StatKind::Attack), vec![3]);
        assert_eq!(stat_values(&sink, StatKind::Health), vec![4]);
        assert!(sink
            .updates
            .contains(&(card.id(), VisualUpdate::Face { face: Face::Back })));
    }
}
