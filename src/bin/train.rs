//! Entry point: parses [`Config`], builds a [`Driver`] for the chosen game, and runs the worker
//! pool until interrupted or a time budget expires.

use anyhow::Context;
use clap::Parser;
use mccfr::config::{Config, GameKind, SamplerKindArg};
use mccfr::mccfr::driver::Driver;
use mccfr::mccfr::games::{kuhn::Kuhn, rps::Rps};
use mccfr::mccfr::sampler::SamplerKind;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn run<G: mccfr::mccfr::game::Game>(config: &Config, kind: SamplerKind, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let driver = Arc::new(Driver::<G>::new(kind));
    if config.resume {
        driver.load_checkpoint(&config.checkpoint).context("loading checkpoint to resume training")?;
    }
    driver.run_workers(config.worker_count(), &config.checkpoint, running);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    mccfr::init();
    let config = Config::parse();
    let kind = match config.sampler {
        SamplerKindArg::Outcome => SamplerKind::OutcomeSampling,
        SamplerKindArg::External => SamplerKind::ExternalSampling,
    };
    log::info!("training {:?} with {} workers, {kind:?} sampling", config.game, config.worker_count());

    let running = Arc::new(AtomicBool::new(true));
    if let Some(seconds) = config.seconds {
        let running = Arc::clone(&running);
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_secs(seconds));
            running.store(false, std::sync::atomic::Ordering::Relaxed);
        });
    }

    match config.game {
        GameKind::Rps => run::<Rps>(&config, kind, running),
        GameKind::Kuhn => run::<Kuhn>(&config, kind, running),
    }
}
