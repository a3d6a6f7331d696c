//! Orchestration: a worker thread pool running MCCFR iterations plus one logger thread that
//! periodically computes exploitability and writes a checkpoint.
//!
//! Every worker thread mutates the shared [`RegretTable`] directly and concurrently through its
//! per-infoset mutexes, so a thread pool of raw `std::thread` workers plus one dedicated logger
//! thread is the fit here, not a batch-then-reduce parallel pool. The logger's checkpoint gate and
//! summary line come from [`crate::mccfr::metrics`].

use crate::error::McrResult;
use crate::mccfr::eval::{Eval, EvalFast, HistoryTree};
use crate::mccfr::game::Game;
use crate::mccfr::metrics::Metrics;
use crate::mccfr::persist;
use crate::mccfr::regret::RegretTable;
use crate::mccfr::sampler::{run_iteration, SamplerKind};
use crate::mccfr::strategy::Strategy;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Owns the shared regret table and drives MCCFR iterations, either inline (`iteration()`, useful
/// for tests) or via a worker pool (`run_workers`).
pub struct Driver<G: Game> {
    table: Arc<RegretTable>,
    metrics: Arc<Metrics>,
    kind: SamplerKind,
    _phantom: std::marker::PhantomData<G>,
}

impl<G: Game> Driver<G> {
    pub fn new(kind: SamplerKind) -> Self {
        Self {
            table: Arc::new(RegretTable::new(G::NUM_INFO_SETS, G::ACTION_MAX)),
            metrics: Arc::new(Metrics::default()),
            kind,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Runs a single MCCFR iteration (one episode per player) on the calling thread.
    pub fn iteration(&self) {
        let mut rng = SmallRng::from_rng(&mut rand::rng());
        run_iteration::<G>(self.kind, &self.table, &mut rng);
        self.metrics.inc_epoch();
        self.metrics.add_episodes(G::players().len());
    }

    pub fn get_strategy(&self) -> Strategy {
        let rows: Vec<Vec<f64>> =
            (0..G::NUM_INFO_SETS).map(|i| self.table.get(i).get_average_policy()).collect();
        G::get_strategy(&rows)
    }

    /// Writes `<name>_state.npy` (raw regret) and one `<name>_p<playerIdx>.npy` per player
    /// (average policy, restricted to the infosets that player controls).
    pub fn save_checkpoint(&self, name: &str) -> McrResult<()> {
        let regret_rows: Vec<Vec<f64>> = (0..G::NUM_INFO_SETS).map(|i| self.table.get(i).get_regret()).collect();
        let regret_flat = pad_and_flatten(&regret_rows, G::ACTION_MAX);
        persist::save_array(format!("{name}_state.npy"), G::NUM_INFO_SETS, G::ACTION_MAX, &regret_flat)?;

        let owners = infoset_owners::<G>();
        let policy_rows: Vec<Vec<f64>> =
            (0..G::NUM_INFO_SETS).map(|i| self.table.get(i).get_average_policy()).collect();
        for (p_idx, _) in G::players().iter().enumerate() {
            let masked: Vec<Vec<f64>> = policy_rows
                .iter()
                .zip(owners.iter())
                .map(|(row, &owner)| if owner == p_idx { row.clone() } else { vec![0.0; row.len()] })
                .collect();
            let flat = pad_and_flatten(&masked, G::ACTION_MAX);
            persist::save_array(
                format!("{name}_p{p_idx}.npy"),
                G::NUM_INFO_SETS,
                G::ACTION_MAX,
                &flat,
            )?;
        }
        Ok(())
    }

    /// Loads a previously saved regret table and average-policy split files back into `self`.
    pub fn load_checkpoint(&self, name: &str) -> McrResult<()> {
        let (rows, cols, flat) = persist::load_array(format!("{name}_state.npy"))?;
        assert_eq!((rows, cols), (G::NUM_INFO_SETS, G::ACTION_MAX), "checkpoint shape mismatch");
        for i in 0..rows {
            self.table.get(i).set_regret(flat[i * cols..(i + 1) * cols].to_vec());
        }

        let mut combined = vec![0.0f64; G::NUM_INFO_SETS * G::ACTION_MAX];
        for p_idx in 0..G::players().len() {
            let (rows, cols, flat) = persist::load_array(format!("{name}_p{p_idx}.npy"))?;
            assert_eq!((rows, cols), (G::NUM_INFO_SETS, G::ACTION_MAX), "checkpoint shape mismatch");
            for i in 0..combined.len() {
                combined[i] += flat[i];
            }
        }
        for i in 0..G::NUM_INFO_SETS {
            self.table.get(i).set_average_policy(combined[i * G::ACTION_MAX..(i + 1) * G::ACTION_MAX].to_vec());
        }
        Ok(())
    }

    /// Launches `workers` iteration threads plus one logger thread; blocks until `running` is
    /// cleared (e.g. from a signal handler installed by the caller).
    pub fn run_workers(self: Arc<Self>, workers: usize, checkpoint_path: &str, running: Arc<AtomicBool>) {
        let mut handles = Vec::with_capacity(workers + 1);
        for _ in 0..workers {
            let driver = Arc::clone(&self);
            let running = Arc::clone(&running);
            handles.push(thread::spawn(move || {
                while running.load(Ordering::Relaxed) {
                    driver.iteration();
                }
            }));
        }

        let driver = Arc::clone(&self);
        let running_for_logger = Arc::clone(&running);
        let checkpoint_path = checkpoint_path.to_string();
        handles.push(thread::spawn(move || {
            while running_for_logger.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(200));
                if let Some(line) = driver.metrics.checkpoint() {
                    let strategy = driver.get_strategy();
                    let tree = HistoryTree::<G>::build();
                    let gap_full = Eval::new(&tree).nash_gap(&strategy);
                    let gap_fast = EvalFast::new(&tree).nash_gap(&strategy);
                    log::info!("{line}  nash_gap(full)={gap_full:.6}  nash_gap(fast)={gap_fast:.6}");
                    if let Err(e) = driver.save_checkpoint(&checkpoint_path) {
                        log::error!("checkpoint write failed: {e}");
                    }
                }
            }
        }));

        for h in handles {
            h.join().expect("a driver thread panicked");
        }
    }
}

fn pad_and_flatten(rows: &[Vec<f64>], width: usize) -> Vec<f64> {
    let mut flat = Vec::with_capacity(rows.len() * width);
    for row in rows {
        flat.extend(row.iter().copied());
        flat.extend(std::iter::repeat(0.0).take(width.saturating_sub(row.len())));
    }
    flat
}

/// Returns, for each infoset, the index into `G::players()` of the player who controls it.
/// Built once from a full history-tree walk, since the split checkpoint files need to know which
/// infosets belong to which player.
fn infoset_owners<G: Game>() -> Vec<usize> {
    let tree = HistoryTree::<G>::build();
    let players = G::players();
    (0..G::NUM_INFO_SETS)
        .map(|infoset| {
            let mover = tree.owner_of(infoset);
            players.iter().position(|&p| p == mover).expect("mover is one of G::players()")
        })
        .collect()
}
