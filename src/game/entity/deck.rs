use rand::seq::SliceRandom;
use rand::Rng;

use crate::assets::images::{ImageHandle, ImageSource};
use crate::game::entity::card::Card;
use crate::game::sink::VisualSink;
use crate::logger;
use crate::models::view::StatKind;

const MAX_RANDOM_MANA: i32 = 10;
const MAX_RANDOM_ATTACK: i32 = 10;
const MAX_RANDOM_HEALTH: i32 = 30;

const CARD_TITLES: [&str; 15] = [
    "Irondeep Trogg",
    "Murloc Tidecaller",
    "Northshire Cleric",
    "Worgen Infiltrator",
    "Knight of Anointment",
    "Vibrant Squirrel",
    "Voidwalker",
    "Peasant",
    "Voodoo Doctor",
    "Elven Archer",
    "Stockades Guard",
    "Flame Imp",
    "Battlefiend",
    "Abusive Sergeant",
    "Loot Hoarder",
];

const CARD_DESCRIPTIONS: [&str; 15] = [
    "After your opponent casts a spell, summon another Irondeep Trogg",
    "Whenever you summon a Murloc, gain +1 Attack",
    "Whenever a minion is healed, draw a card",
    "Stealth",
    "Battlecry: Draw a Holy spell",
    "Deathrattle: Shuffle 4 Acorns into your deck. When drawn, summon a 2/1 Squirrel",
    "Taunt",
    "At the start of your turn, draw a card",
    "Battlecry: Restore 2 Health",
    "Battlecry: Deal 1 damage",
    "Battlecry: Give a friendly minion Taunt",
    "Battlecry: Deal 3 damage to your hero",
    "After your hero attacks, gain +1 Attack",
    "Battlecry: Give a minion +2 Attack this turn",
    "Deathrattle: Draw a card",
];

/// Anything that deals cards into a hand.
pub trait CardSource {
    /// True once cards may be taken.
    fn is_ready(&self) -> bool;

    /// Removes and returns the next card, or `None` when there is nothing to give.
    fn take_one(&mut self) -> Option<Card>;
}

/// A pool of generated cards, dealt last-in first-out.
#[derive(Debug)]
pub struct Deck {
    capacity: usize,
    cards: Vec<Card>,
    ready: bool,
}

impl Deck {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cards: Vec::with_capacity(capacity),
            ready: false,
        }
    }

    /// A ready deck holding `cards`; the last one is dealt first.
    #[cfg(test)]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            capacity: cards.len(),
            cards,
            ready: true,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Generates one more card once the images are in. Returns whether the deck is ready.
    pub async fn populate<S: ImageSource, R: Rng>(
        &mut self,
        images: &S,
        rng: &mut R,
        sink: &mut dyn VisualSink,
    ) -> bool {
        if self.ready {
            return true;
        }

        if self.cards.len() < self.capacity {
            if !images.is_fully_supplied().await {
                return false;
            }

            let image = images.random_item(rng).await;
            let card = Deck::random_card(image, rng, sink);
            self.cards.push(card);
        }

        if self.cards.len() >= self.capacity {
            logger!(INFO, "[DECK] {} cards ready to be dealt", self.cards.len());
            self.ready = true;
        }

        self.ready
    }

    fn random_card<R: Rng>(
        image: Option<ImageHandle>,
        rng: &mut R,
        sink: &mut dyn VisualSink,
    ) -> Card {
        let mut card = Card::new();
        if let Some(title) = CARD_TITLES.choose(rng) {
            card.set_title(*title, sink);
        }
        if let Some(description) = CARD_DESCRIPTIONS.choose(rng) {
            card.set_description(*description, sink);
        }
        match image {
            Some(image) => card.set_image(image, sink),
            None => logger!(WARN, "[DECK] No image available for `{}`", card.id()),
        }
        card.set_stat(StatKind::Mana, rng.gen_range(1..MAX_RANDOM_MANA), sink);
        card.set_stat(StatKind::Attack, rng.gen_range(1..MAX_RANDOM_ATTACK), sink);
        card.set_stat(StatKind::Health, rng.gen_range(1..MAX_RANDOM_HEALTH), sink);
        card
    }
}

impl CardSource for Deck {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn take_one(&mut self) -> Option<Card> {
        if !self.ready {
            return None;
        }
        self.cards.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::images::StaticImageSource;
    use crate::game::sink::NullSink;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn deals_most_recent_card_first() {
        let (a, b, c) = (Card::new(), Card::new(), Card::new());
        let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());
        let mut deck = Deck::from_cards(vec![a, b, c]);

        assert_eq!(deck.take_one().map(|card| card.id()), Some(c_id));
        assert_eq!(deck.take_one().map(|card| card.id()), Some(b_id));
        assert_eq!(deck.take_one().map(|card| card.id()), Some(a_id));
        assert!(deck.take_one().is_none());
    }

    #[test]
    fn empty_deck_gives_nothing() {
        let mut deck = Deck::from_cards(Vec::new());
        assert!(deck.is_ready());
        assert!(deck.take_one().is_none());
    }

    #[test]
    fn unpopulated_deck_is_not_ready() {
        let mut deck = Deck::new(3);
        assert!(!deck.is_ready());
        assert!(deck.take_one().is_none());
    }

    #[tokio::test]
    async fn populates_one_card_per_call_until_full() {
        let images = StaticImageSource {
            images: vec![ImageHandle::new(vec![9, 9])],
        };
        let mut rng = StdRng::seed_from_u64(11);
        let mut deck = Deck::new(4);

        for _ in 0..3 {
            assert!(!deck.populate(&images, &mut rng, &mut NullSink).await);
        }
        assert!(deck.populate(&images, &mut rng, &mut NullSink).await);
        assert_eq!(deck.len(), 4);

        while let Some(card) = deck.take_one() {
            let stats = card.stats();
            assert!((1..MAX_RANDOM_MANA).contains(&stats.mana));
            assert!((1..MAX_RANDOM_ATTACK).contains(&stats.attack));
            assert!((1..MAX_RANDOM_HEALTH).contains(&stats.health));
            assert!(CARD_TITLES.iter().any(|title| *title == card.title()));
            assert!(CARD_DESCRIPTIONS
                .iter()
                .any(|description| *description == card.description()));
            assert!(card.image().is_some());
        }
    }

    #[tokio::test]
    async fn missing_images_still_produce_cards() {
        let images = StaticImageSource { images: Vec::new() };
        let mut deck = Deck::new(1);
        assert!(
            deck.populate(&images, &mut StdRng::seed_from_u64(2), &mut NullSink)
                .await
        );
        assert!(deck.take_one().unwrap().image().is_none());
    }
}
