/// End-to-end generation tests: framing, referential integrity, replayability

use std::collections::HashSet;
use std::fs;

use order_workload::{
    generate_into, generate_to_path, validate_workload, ConfigError, Decoder, Event, Expectations,
    GenerateError, GeneratorConfig, OrderBook, OrderGenerator, Side, Symbol,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn config(n_symbols: usize, n_threads: u32, n_lines: usize) -> GeneratorConfig {
    GeneratorConfig {
        n_symbols,
        n_threads,
        n_lines,
        ..Default::default()
    }
}

fn generate(config: &GeneratorConfig, seed: u64) -> String {
    let (out, _) = generate_into(config, ChaCha8Rng::seed_from_u64(seed), Vec::new()).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_framing() {
    let cfg = config(20, 6, 500);
    let text = generate(&cfg, 1);
    let lines: Vec<&str> = text.split('\n').collect();

    assert_eq!(lines[0].parse::<u32>().unwrap(), 6);
    assert_eq!(lines[1], "o");
    assert_eq!(*lines.last().unwrap(), "x");
    assert!(!text.ends_with('\n'));
    assert_eq!(lines.len(), 2 + 500 + 1);
}

#[test]
fn test_cancels_reference_live_orders() {
    let cfg = config(10, 5, 2000);
    let workload = Decoder::decode_workload(&generate(&cfg, 2)).unwrap();

    let mut live: HashSet<(u32, u64)> = HashSet::new();
    let mut cancelled: HashSet<(u32, u64)> = HashSet::new();
    for event in &workload.events {
        match event {
            Event::Order(o) => {
                assert!(live.insert((o.actor, o.order_id)));
            }
            Event::Cancel(c) => {
                assert!(live.remove(&(c.actor, c.order_id)), "cancel of unknown order {:?}", c);
                assert!(cancelled.insert((c.actor, c.order_id)), "double cancel {:?}", c);
            }
        }
    }
}

#[test]
fn test_order_ids_contiguous_from_base() {
    let cfg = GeneratorConfig {
        first_order_id: 5000,
        ..config(4, 3, 1000)
    };
    let workload = Decoder::decode_workload(&generate(&cfg, 3)).unwrap();

    let ids: Vec<u64> = workload
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Order(o) => Some(o.order_id),
            Event::Cancel(_) => None,
        })
        .collect();

    let expected: Vec<u64> = (5000..5000 + ids.len() as u64).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_prices_and_quantities_in_range() {
    let cfg = GeneratorConfig {
        min_count: 3,
        max_count: 9,
        ..config(12, 4, 3000)
    };
    let rng = ChaCha8Rng::seed_from_u64(4);
    let mut generator = OrderGenerator::new(&cfg, rng).unwrap();

    for _ in 0..3000 {
        if let Some(Event::Order(o)) = generator.step() {
            assert!(generator.universe().admits(&o.symbol, o.price));
            assert!((3..=9).contains(&o.quantity));
            assert!(o.actor < 4);
        }
    }
}

#[test]
fn test_single_actor_single_symbol() {
    let cfg = GeneratorConfig {
        n_threads: 1,
        n_symbols: 1,
        n_lines: 3,
        min_count: 5,
        max_count: 5,
        ..Default::default()
    };

    for seed in 0..50 {
        let workload = Decoder::decode_workload(&generate(&cfg, seed)).unwrap();
        assert_eq!(workload.events.len(), 3);

        // nothing is outstanding before the first order, so it cannot be a cancel
        assert!(matches!(workload.events[0], Event::Order(_)));

        let mut symbols: HashSet<Symbol> = HashSet::new();
        let mut emitted: Vec<u64> = Vec::new();
        for event in &workload.events {
            assert_eq!(event.actor(), 0);
            match event {
                Event::Order(o) => {
                    assert_eq!(o.quantity, 5);
                    symbols.insert(o.symbol);
                    emitted.push(o.order_id);
                }
                Event::Cancel(c) => assert!(emitted.contains(&c.order_id)),
            }
        }
        assert_eq!(symbols.len(), 1);
    }
}

#[test]
fn test_same_seed_same_output() {
    let cfg = config(30, 8, 1500);
    assert_eq!(generate(&cfg, 99), generate(&cfg, 99));
    assert_ne!(generate(&cfg, 99), generate(&cfg, 100));
}

#[test]
fn test_replay_against_book() {
    let cfg = config(25, 10, 5000);
    let workload = Decoder::decode_workload(&generate(&cfg, 5)).unwrap();

    let mut book = OrderBook::new();
    for event in &workload.events {
        book.apply_event(event).unwrap();
    }
}

#[test]
fn test_validate_generated_workload() {
    let cfg = config(50, 40, 4000);
    let report = validate_workload(&generate(&cfg, 6), &Expectations::from_config(&cfg)).unwrap();

    assert_eq!(report.total_events(), 4000);
    assert_eq!(report.n_threads, 40);
    assert_eq!(report.outstanding, report.buys + report.sells - report.cancels);
    assert!(report.id_gaps.is_empty());
}

#[test]
fn test_zero_lines() {
    let text = generate(&config(5, 2, 0), 7);
    assert_eq!(text, "2\no\nx");
}

#[test]
fn test_generate_to_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.in");
    let cfg = GeneratorConfig {
        filename: path.clone(),
        seed: Some(42),
        ..config(10, 4, 250)
    };

    let stats = generate_to_path(&cfg).unwrap();
    assert_eq!(stats.total_events(), 250);

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, generate(&cfg, 42));
    validate_workload(&text, &Expectations::from_config(&cfg)).unwrap();
}

#[test]
fn test_generate_to_path_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.in");
    let cfg = GeneratorConfig {
        filename: path.clone(),
        n_symbols: 0,
        ..Default::default()
    };

    assert!(generate_to_path(&cfg).is_err());
    assert!(!path.exists());
}

#[test]
fn test_selection_is_uniform_over_kinds() {
    let mut generator =
        OrderGenerator::new(&config(16, 8, 10), ChaCha8Rng::seed_from_u64(8)).unwrap();

    const STEPS: usize = 300_000;
    let (mut buys, mut sells, mut cancel_attempts) = (0usize, 0usize, 0usize);
    for _ in 0..STEPS {
        match generator.step() {
            Some(Event::Order(o)) if o.side == Side::Buy => buys += 1,
            Some(Event::Order(_)) => sells += 1,
            // a None is a cancel attempt with nothing outstanding
            Some(Event::Cancel(_)) | None => cancel_attempts += 1,
        }
    }

    let expected = STEPS / 3;
    for count in [buys, sells, cancel_attempts] {
        assert!(
            count.abs_diff(expected) < STEPS / 100,
            "buys {} sells {} cancel attempts {}",
            buys,
            sells,
            cancel_attempts
        );
    }
}

#[test]
fn test_rejects_first_order_id_at_end_of_space() {
    let cfg = GeneratorConfig::from_json_str(
        r#"{"first_order_id": 18446744073709551615, "n_lines": 5, "n_symbols": 2}"#,
    )
    .unwrap();
    let result = generate_into(&cfg, ChaCha8Rng::seed_from_u64(9), Vec::new());
    assert!(matches!(
        result,
        Err(GenerateError::Config(ConfigError::IdSpaceExhausted { .. }))
    ));
}

#[test]
fn test_last_ids_of_space_are_used() {
    let cfg = GeneratorConfig {
        first_order_id: u64::MAX - 50,
        ..config(3, 2, 50)
    };
    let report = validate_workload(&generate(&cfg, 10), &Expectations::from_config(&cfg)).unwrap();
    assert_eq!(report.total_events(), 50);
    assert!(report.id_gaps.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_generated_workload_replays(
        seed in any::<u64>(),
        n_symbols in 1usize..20,
        n_threads in 1u32..16,
        n_lines in 0usize..400,
    ) {
        let cfg = config(n_symbols, n_threads, n_lines);
        let text = generate(&cfg, seed);
        let report = validate_workload(&text, &Expectations::from_config(&cfg));
        prop_assert!(report.is_ok(), "{:?}", report);
        prop_assert_eq!(report.unwrap().total_events(), n_lines);
    }
}
