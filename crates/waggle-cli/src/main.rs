// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod service;

use anyhow::{Context, Result};
use config::Config;
use service::ApiService;
use std::env;
use std::path::PathBuf;
use waggle_app::AppState;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `waggle --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    // Credentials are required before the interactive UI is entered.
    let credentials = config.credentials()?;
    let client =
        waggle_api::Client::new(config.base_url(), &credentials.auth_token, config.timeout()?)
            .with_context(|| {
                format!("invalid [api] config in {}", options.config_path.display())
            })?;
    if options.check_only {
        return Ok(());
    }

    let mut state = AppState::default();
    let mut service = ApiService::new(client, credentials.username);
    waggle_tui::run_app(&mut state, &mut service)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("waggle - a terminal UI for Beeminder goals");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and credentials, then exit");
    println!("  --help                   Show this help");
    println!();
    println!(
        "Credentials come from {} and {} (or the [api] config section).",
        config::AUTH_TOKEN_ENV,
        config::USERNAME_ENV
    );
}
