//! Global subscriber installation.
//!
//! Kept in its own test binary: the subscriber is process-wide, so the first
//! install here is guaranteed to be the only one.

use hs_core::logging::{init_default_logging, init_logging, LogConfig, LogFormat};
use hs_core::{build_bank, Corpus, GaussianHmmEngine, ModelSelector, SelectionConfig, Strategy};
use tracing::level_filters::LevelFilter;

#[test]
fn jsonl_subscriber_installs_once_and_receives_events() {
    let config = LogConfig::from_lookup(|_| None, None, None)
        .with_format(LogFormat::Jsonl)
        .with_level(LevelFilter::DEBUG);
    init_logging(&config).unwrap();

    let corpus = Corpus::from_sequences([
        ("CAT", vec![vec![vec![0.0], vec![0.2], vec![0.4]], vec![vec![0.1], vec![0.3], vec![0.5]]]),
        ("DOG", vec![vec![vec![5.0], vec![5.4], vec![5.8]], vec![vec![5.1], vec![5.5], vec![5.9]]]),
    ])
    .unwrap();
    let engine = GaussianHmmEngine::default();
    let selection = SelectionConfig::default().with_state_range(1, 2);
    let build = build_bank(&ModelSelector::new(&corpus, &engine, &selection), Strategy::Bic);
    assert_eq!(build.bank.len(), 2, "{:?}", build.failures);

    let human = LogConfig::from_lookup(|_| None, None, None)
        .with_format(LogFormat::Human)
        .with_timestamps(false);
    assert!(init_logging(&human).is_err());
    assert!(init_default_logging().is_err());
}
