//! Loads a train/test CSV pair and reports what a model would be built around.
//!
//! Usage: `uav-ids-inspect <train.csv> <test.csv> [batch_size] [seed]`

use std::process::ExitCode;

use uav_ids_prep::{LoaderConfig, build_loaders};

fn parse_arg<T: std::str::FromStr>(value: Option<&String>, name: &str) -> Result<Option<T>, String> {
    match value {
        Some(v) => v.parse::<T>().map(Some).map_err(|_| format!("invalid {}: {:?}", name, v)),
        None => Ok(None),
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let (train, test) = match args {
        [train, test, ..] => (train, test),
        _ => return Err("usage: uav-ids-inspect <train.csv> <test.csv> [batch_size] [seed]".to_string()),
    };
    let batch_size = parse_arg::<usize>(args.get(2), "batch size")?.unwrap_or(32);
    let mut config = LoaderConfig::new(batch_size);
    config.seed = parse_arg::<u64>(args.get(3), "seed")?;

    let mut loaders = build_loaders(train, test, &config).map_err(|e| e.to_string())?;

    log::info!("input_dim={} num_classes={}", loaders.input_dim, loaders.num_classes);
    for (code, label) in loaders.label_encoder.classes().iter().enumerate() {
        log::info!("class {} -> {:?}", code, label);
    }
    let dropped = loaders.train.dataset().dropped_columns();
    if !dropped.is_empty() {
        log::info!("unused train columns: {:?}", dropped);
    }

    let train_batches = loaders.train.iter().count();
    let test_batches = loaders.test.iter().count();
    log::info!(
        "train: {} samples in {} batches, test: {} samples in {} batches",
        loaders.train.dataset().len(),
        train_batches,
        loaders.test.dataset().len(),
        test_batches
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
