// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

use anyhow::Context;
use clap::Parser;
use hafas_model::{
    configuration::{parse_file_mapping, read_config, Configuration},
    gtfs::CsvFeedWriter,
    hafas,
    utils::zip_to,
    Result,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

#[derive(Debug, Parser)]
#[command(name = "hafas2gtfs", about = "Convert HAFAS raw data to a GTFS.", version)]
struct Opt {
    /// Input directory or zip archive.
    #[arg(short = 'i', long = "input", default_value = ".")]
    input: PathBuf,

    /// Output directory, or zip archive if the name ends with `.zip`.
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// JSON file containing the agency, projection and file names.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Actual names of the HAFAS files (`fplan:FPLAN,bahnhof:BAHNHOF`).
    #[arg(short = 'm', long = "mapping")]
    mapping: Option<String>,

    /// Projection of the stop coordinates: `utm`, `gk_cologne` or a proj
    /// definition. Coordinates are longitude and latitude if not set.
    #[arg(short = 'p', long = "projection")]
    projection: Option<String>,
}

fn convert(input: &Path, output: &Path, configuration: Configuration) -> Result<()> {
    let writer = CsvFeedWriter::new(output)?;
    let mut writer = match input.extension() {
        Some(ext) if ext == "zip" => hafas::read_from_zip(input, configuration, writer)?,
        _ => hafas::read_from_path(input, configuration, writer)?,
    };
    writer.flush()
}

fn run(opt: Opt) -> Result<()> {
    info!("Launching hafas2gtfs...");

    let mut configuration = read_config(opt.config)?;
    if let Some(mapping) = opt.mapping {
        configuration.file_names.extend(parse_file_mapping(&mapping)?);
    }
    if let Some(projection) = opt.projection {
        configuration.projection = Some(projection);
    }

    match opt.output.extension() {
        Some(ext) if ext == "zip" => {
            let output_dir = tempfile::tempdir()?;
            convert(&opt.input, output_dir.path(), configuration)?;
            zip_to(output_dir.path(), &opt.output)?;
            info!("Writing {:?}", opt.output);
        }
        _ => {
            fs::create_dir_all(&opt.output)
                .with_context(|| format!("Error creating {:?}", opt.output))?;
            convert(&opt.input, &opt.output, configuration)?;
        }
    };
    Ok(())
}

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter_subscriber = EnvFilter::try_new(rust_log).unwrap_or_else(|e| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            e,
        );
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter_subscriber)
        .init();
}

fn main() {
    init_logger();
    if let Err(err) = run(Opt::parse()) {
        for cause in err.chain() {
            eprintln!("{}", cause);
        }
        std::process::exit(1);
    }
}
