// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Network builder.
//!
//! Loads a config file (or a preset), builds every pathway and prints a
//! per-pathway report: shape, total weight, yield and mean efferent
//! anisotropy. Exits 1 when the build fails.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use anisonet::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, AnisonetConfig, PresetConfig,
};
use anisonet::observability::{debug_flags_help, init_logging, parse_debug_flags, LogFormat, LoggingConfig};
use anyhow::Result;
use tracing::error;

struct Args {
    config: Option<PathBuf>,
    preset: Option<String>,
    scalar: f64,
    json: bool,
    log_json: bool,
    overrides: HashMap<String, String>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: build_network [--config <path>] [--preset <name>] [--scalar <f>]\n\
         \x20                    [--seed <n>] [--log-level <level>] [--sequential]\n\
         \x20                    [--json] [--log-json] [--debug-<crate>]\n\n\
         Without --config or --preset, anisonet.toml is searched for.\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        preset: None,
        scalar: 3.0,
        json: false,
        log_json: false,
        overrides: HashMap::new(),
    };

    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().unwrap_or_else(|| usage_and_exit());
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(value())),
            "--preset" => args.preset = Some(value()),
            "--scalar" => {
                let v = value();
                args.scalar = v.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid --scalar: {v}");
                    usage_and_exit()
                });
            }
            "--seed" => {
                args.overrides.insert("seed".to_string(), value());
            }
            "--log-level" => {
                args.overrides.insert("log_level".to_string(), value());
            }
            "--sequential" => {
                args.overrides.insert("parallel".to_string(), "false".to_string());
            }
            "--json" => args.json = true,
            "--log-json" => args.log_json = true,
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }
    args
}

fn resolve_config(args: &Args) -> Result<AnisonetConfig> {
    let mut config = match (&args.preset, &args.config) {
        (Some(name), None) => {
            let mut config = AnisonetConfig {
                preset: Some(PresetConfig {
                    name: name.clone(),
                    scalar: args.scalar,
                }),
                ..Default::default()
            };
            apply_environment_overrides(&mut config);
            config
        }
        (None, path) => load_config(path.as_deref(), None)?,
        (Some(_), Some(_)) => anyhow::bail!("--preset and --config are mutually exclusive"),
    };
    apply_cli_overrides(&mut config, &args.overrides);
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = resolve_config(args)?;

    let logging = LoggingConfig::default()
        .with_level(config.system.log_level.clone())
        .with_format(if args.log_json { LogFormat::Json } else { LogFormat::Text });
    let _guard = init_logging(&logging, &parse_debug_flags())?;

    let network = anisonet::build_from_config(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&network.summary())?);
        return Ok(());
    }

    println!("seed {}", network.seed);
    println!(
        "{:<8} {:>12} {:>10} {:>10} {:>8} {:>10}",
        "pathway", "shape", "weight", "requested", "yield", "anisotropy"
    );
    for (name, pathway) in &network.pathways {
        let spec = &network.specs[name];
        let (rows, cols) = pathway.matrix.shape();
        let anisotropy = network
            .mean_efferent_anisotropy(name)
            .map_or_else(|| "-".to_string(), |a| format!("{a:.3}"));
        println!(
            "{:<8} {:>12} {:>10} {:>10} {:>7.1}% {:>10}",
            name,
            format!("{rows}x{cols}"),
            pathway.matrix.total_weight(),
            spec.requested(),
            100.0 * pathway.yield_fraction(spec),
            anisotropy
        );
    }
    println!("total synapses {}", network.total_synapses());
    Ok(())
}

fn main() {
    let args = parse_args();
    if let Err(err) = run(&args) {
        error!(target: "build_network", "{err:#}");
        eprintln!("build_network: {err:#}");
        process::exit(1);
    }
}
