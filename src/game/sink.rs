use std::io::Write;

use serde::Serialize;

use crate::game::entity::card::CardId;
use crate::logger;
use crate::models::view::VisualUpdate;

/// The display surface cards draw themselves on.
///
/// Updates are fire-and-forget: a sink never reports failure back to the game.
pub trait VisualSink {
    fn apply(&mut self, card: CardId, update: VisualUpdate);
}

/// Discards every update.
#[derive(Debug, Default)]
pub struct NullSink;

impl VisualSink for NullSink {
    fn apply(&mut self, _card: CardId, _update: VisualUpdate) {}
}

/// Logs every update at DEBUG, except transforms which are too chatty.
#[derive(Debug, Default)]
pub struct LogSink;

impl VisualSink for LogSink {
    fn apply(&mut self, card: CardId, update: VisualUpdate) {
        match update {
            VisualUpdate::Transform { .. } => {}
            VisualUpdate::Removed => logger!(DEBUG, "[SINK] `{card}` removed from display"),
            update => logger!(DEBUG, "[SINK] `{card}` {update:?}"),
        }
    }
}

#[derive(Serialize)]
struct Frame<'a> {
    card: CardId,
    #[serde(flatten)]
    update: &'a VisualUpdate,
}

/// Writes one JSON object per update, one per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> VisualSink for JsonLinesSink<W> {
    fn apply(&mut self, card: CardId, update: VisualUpdate) {
        if self.failed {
            return;
        }

        let frame = Frame {
            card,
            update: &update,
        };
        let written = serde_json::to_writer(&mut self.writer, &frame)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"));

        if let Err(error) = written {
            logger!(ERROR, "[SINK] Unable to write frame, dropping further updates ({error})");
            self.failed = true;
        }
    }
}

/// Keeps every update in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub updates: Vec<(CardId, VisualUpdate)>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn for_card(&self, card: CardId) -> Vec<&VisualUpdate> {
        self.updates
            .iter()
            .filter(|(id, _)| *id == card)
            .map(|(_, update)| update)
            .collect()
    }
}

#[cfg(test)]
impl VisualSink for RecordingSink {
    fn apply(&mut self, card: CardId, update: VisualUpdate) {
        self.updates.push((card, update));
    }
}
