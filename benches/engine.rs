use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fairodds::games::dice::DiceParams;
use fairodds::games::mines::MinesParams;
use fairodds::games::plinko::{self, PlinkoParams};
use fairodds::games::simulation::{simulate, Strategy};
use fairodds::games::InstantGame;
use fairodds::probability::mines_multiplier;
use fairodds::{
    EngineConfig, FairnessEngine, GameConfig, GameKind, GameParams, GameProcessor, GameRules,
    InMemoryAccounts, RiskTier, StdRandom,
};
use std::sync::Arc;
use uuid::Uuid;

fn dice_config() -> GameConfig {
    GameConfig::new(
        1.0,
        GameParams::Dice(DiceParams {
            target: 50.0,
            roll_over: true,
        }),
    )
}

fn processor_play(c: &mut Criterion) {
    let accounts = Arc::new(InMemoryAccounts::new(f64::MAX / 4.0));
    let mut processor = GameProcessor::new(&EngineConfig::default(), accounts.clone()).expect("default config");
    accounts.ensure("bench");
    let mut rng = StdRandom::seeded(7);

    c.bench_function("processor_play_dice", |b| {
        b.iter(|| black_box(processor.play("bench", dice_config(), &mut rng)))
    });
}

fn mines_table(c: &mut Criterion) {
    let rules = GameRules::default();
    let mut group = c.benchmark_group("mines_multiplier");
    for mines in [1usize, 5, 24] {
        group.bench_function(BenchmarkId::from_parameter(mines), |b| {
            b.iter(|| {
                for gems in 0..=(rules.mines_tiles - mines) {
                    let _ = black_box(mines_multiplier(
                        rules.mines_tiles,
                        mines,
                        gems,
                        rules.mines_payout_factor,
                    ));
                }
            })
        });
    }
    group.finish();
}

fn plinko_generate(c: &mut Criterion) {
    let rules = GameRules::default();
    let mut rng = StdRandom::seeded(11);
    let mut group = c.benchmark_group("plinko_generate");
    for rows in [8u8, 12, 16] {
        let params = PlinkoParams {
            rows,
            risk: RiskTier::High,
        };
        group.bench_function(BenchmarkId::from_parameter(rows), |b| {
            b.iter(|| black_box(plinko::Plinko::generate(&params, &rules, &mut rng)))
        });
    }
    group.finish();
}

fn fairness_proof(c: &mut Criterion) {
    let engine = FairnessEngine::from_seed(&[42u8; 32]).expect("seeded engine");
    let round_id = Uuid::new_v4();

    c.bench_function("prove_round", |b| {
        b.iter(|| black_box(engine.prove_round(&round_id, GameKind::Dice, "bench", "seed")))
    });
}

fn rtp_simulation(c: &mut Criterion) {
    let rules = GameRules::default();
    let mut rng = StdRandom::seeded(3);
    let mines = GameConfig::new(1.0, GameParams::Mines(MinesParams { mines: 3 }));

    let mut group = c.benchmark_group("simulate_1000");
    group.bench_function("dice", |b| {
        b.iter(|| black_box(simulate(&dice_config(), Strategy::Instant, 1_000, &rules, &mut rng)))
    });
    group.bench_function("mines_reveal_3", |b| {
        b.iter(|| black_box(simulate(&mines, Strategy::RevealTiles(3), 1_000, &rules, &mut rng)))
    });
    group.finish();
}

criterion_group!(
    benches,
    processor_play,
    mines_table,
    plinko_generate,
    fairness_proof,
    rtp_simulation
);
criterion_main!(benches);
