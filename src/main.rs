use std::fs::File;
use std::io::BufWriter;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{self, Instant};

use crate::assets::images::{ImageSource, RemoteImageSource};
use crate::game::entity::card::RandomRoll;
use crate::game::entity::deck::{CardSource, Deck};
use crate::game::layout::HandLayoutEngine;
use crate::game::orchestrator::{HandConfig, HandFlowOrchestrator, IterationState};
use crate::game::sink::{JsonLinesSink, LogSink, NullSink, VisualSink};
use crate::models::settings::{Settings, SinkKind};
use crate::utils::errors::AppError;
use crate::utils::logger::Logger;

mod assets;
mod game;
mod models;
mod utils;

fn build_sink(settings: &Settings) -> Result<Box<dyn VisualSink>, AppError> {
    let sink: Box<dyn VisualSink> = match settings.sink {
        SinkKind::None => Box::new(NullSink),
        SinkKind::Log => Box::new(LogSink),
        SinkKind::Json => {
            let file = File::create(&settings.sink_path)?;
            logger!(INFO, "[MAIN] Writing frames to `{}`", settings.sink_path.display());
            Box::new(JsonLinesSink::new(BufWriter::new(file)))
        }
    };
    Ok(sink)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load()?;
    Logger::set_level(settings.log_level);
    logger!(
        INFO,
        "[SETTINGS] Deck of {}, hand of {} to {}, {} images",
        settings.deck_size,
        settings.hand_min,
        settings.hand_max,
        settings.image_count
    );

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut sink = build_sink(&settings)?;

    let images = RemoteImageSource::from_settings(&settings);
    images.fetch_all();

    let mut deck = Deck::new(settings.deck_size);
    let mut roll = RandomRoll::new(
        StdRng::seed_from_u64(rng.gen()),
        settings.stat_min,
        settings.stat_max,
    );
    let mut orchestrator = HandFlowOrchestrator::new(
        HandConfig::from_settings(&settings, &mut rng),
        HandLayoutEngine::from_settings(&settings),
    );
    orchestrator.start_iteration();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut interval = time::interval(settings.frame_interval());
    let mut last_frame = Instant::now();
    let mut interrupted = false;
    loop {
        tokio::select! {
            _ = &mut shutdown, if !interrupted => {
                interrupted = true;
                logger!(
                    INFO,
                    "[MAIN] Interrupted while {:?} at card {:?}, finishing the running step",
                    orchestrator.take_state(),
                    orchestrator.cursor()
                );
                orchestrator.stop_iteration();
            }
            _ = interval.tick() => {}
        }

        let now = Instant::now();
        let dt = now - last_frame;
        last_frame = now;

        if !deck.is_ready() {
            deck.populate(&images, &mut rng, sink.as_mut()).await;
        }
        orchestrator.tick(dt, &mut deck, &mut roll, sink.as_mut());

        if interrupted
            && orchestrator.iteration_state() == IterationState::Disabled
            && orchestrator.hand().is_settled()
        {
            logger!(INFO, "[MAIN] Stopped with {} cards left in hand", orchestrator.hand().len());
            break;
        }

        if orchestrator.is_finished() {
            logger!(
                INFO,
                "[MAIN] Hand emptied after dealing {} cards, {} left in deck",
                orchestrator.taken(),
                deck.len()
            );
            break;
        }
    }

    Ok(())
}
