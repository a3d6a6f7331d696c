criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        running_rps_episode,
        running_kuhn_episode,
        computing_rps_policy_vector,
        computing_rps_nash_gap,
}

use mccfr::mccfr::driver::Driver;
use mccfr::mccfr::eval::{Eval, HistoryTree};
use mccfr::mccfr::games::{kuhn::Kuhn, rps::Rps};
use mccfr::mccfr::regret::RegretTable;
use mccfr::mccfr::sampler::SamplerKind;

fn running_rps_episode(c: &mut criterion::Criterion) {
    let driver = Driver::<Rps>::new(SamplerKind::OutcomeSampling);
    c.bench_function("run one outcome-sampling episode (RPS)", |b| {
        b.iter(|| driver.iteration())
    });
}

fn running_kuhn_episode(c: &mut criterion::Criterion) {
    let driver = Driver::<Kuhn>::new(SamplerKind::OutcomeSampling);
    c.bench_function("run one outcome-sampling episode (Kuhn)", |b| {
        b.iter(|| driver.iteration())
    });
}

fn computing_rps_policy_vector(c: &mut criterion::Criterion) {
    let table = RegretTable::new(2, 3);
    table.get(0).set_dim(0, 3).unwrap();
    table.get(0).observe_utility(&[1.0, 3.0, 0.5], &[1.0 / 3.0; 3]);
    c.bench_function("regret matching policy vector (RPS infoset)", |b| {
        b.iter(|| table.get(0).next_policy(3))
    });
}

fn computing_rps_nash_gap(c: &mut criterion::Criterion) {
    let driver = Driver::<Rps>::new(SamplerKind::OutcomeSampling);
    for _ in 0..200 {
        driver.iteration();
    }
    let strategy = driver.get_strategy();
    let tree = HistoryTree::<Rps>::build();
    c.bench_function("compute Nash gap (RPS)", |b| {
        b.iter(|| Eval::new(&tree).nash_gap(&strategy))
    });
}
