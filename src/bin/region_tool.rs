//! region-tool
//!
//! Inspects region files and reads or writes single entries of a data
//! directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use regionstore::{
    Config, Engine, EntryKey, EntryKey2D, EntryKey3D, RegionKey, RegionKey2D, RegionKey3D,
    RegionError, RegionStore, Result,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Region storage tool
#[derive(Parser, Debug)]
#[command(name = "region-tool")]
#[command(about = "Inspect and edit region-file storage")]
#[command(version)]
struct Args {
    /// Sector size in bytes
    #[arg(short, long, global = true, default_value = "512")]
    sector_size: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the allocation table of one region file
    Info {
        /// Region file (*.2dr or *.3dr)
        file: PathBuf,
    },

    /// Write the entry at a coordinate to stdout
    Get {
        /// Data directory
        #[arg(short, long, default_value = "./region_data")]
        data_dir: PathBuf,

        /// x z (2D) or x y z (3D)
        #[arg(num_args = 2..=3, allow_negative_numbers = true, required = true)]
        coords: Vec<i32>,
    },

    /// Store a file's contents at a coordinate
    Put {
        /// Data directory
        #[arg(short, long, default_value = "./region_data")]
        data_dir: PathBuf,

        /// File whose bytes become the entry
        #[arg(short, long)]
        input: PathBuf,

        /// x z (2D) or x y z (3D)
        #[arg(num_args = 2..=3, allow_negative_numbers = true, required = true)]
        coords: Vec<i32>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,regionstore=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Info { file } => info(&file, args.sector_size),
        Command::Get { data_dir, coords } => get(&data_dir, args.sector_size, &coords),
        Command::Put {
            data_dir,
            input,
            coords,
        } => put(&data_dir, args.sector_size, &input, &coords),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn info(file: &Path, sector_size: u32) -> Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    if let Some(region) = RegionKey3D::from_file_name(&name) {
        print_table::<EntryKey3D>(file, sector_size, Some(region))
    } else {
        print_table::<EntryKey2D>(file, sector_size, RegionKey2D::from_file_name(&name))
    }
}

fn print_table<K: EntryKey>(
    file: &Path,
    sector_size: u32,
    region: Option<K::Region>,
) -> Result<()> {
    let store = RegionStore::open(file, K::ENTRIES_PER_REGION, sector_size)?;
    let header = store.header()?;

    println!("file:           {}", file.display());
    println!("slots:          {}", store.entries_per_region());
    println!("header sectors: {}", store.header_sectors());
    println!("used sectors:   {}", store.used_sectors()?);
    println!("entries:        {}", store.entry_count()?);

    for (id, location) in header.allocated() {
        match region {
            Some(region) => println!(
                "  slot {:>5} {:?} offset {:>8} count {:>3}",
                id,
                K::from_region(region, id),
                location.offset(),
                location.count()
            ),
            None => println!(
                "  slot {:>5} offset {:>8} count {:>3}",
                id,
                location.offset(),
                location.count()
            ),
        }
    }

    store.close()
}

fn open_engine(data_dir: &Path, sector_size: u32) -> Result<Engine> {
    let config = Config::builder()
        .data_dir(data_dir)
        .sector_size(sector_size)
        .build();
    Engine::open(config)
}

fn get(data_dir: &Path, sector_size: u32, coords: &[i32]) -> Result<()> {
    let engine = open_engine(data_dir, sector_size)?;

    let entry = match *coords {
        [x, z] => engine.load_2d(EntryKey2D::new(x, z))?,
        [x, y, z] => engine.load_3d(EntryKey3D::new(x, y, z))?,
        _ => return Err(bad_coords(coords)),
    };

    match entry {
        Some(data) => std::io::stdout().write_all(&data)?,
        None => tracing::warn!("No entry at {:?}", coords),
    }

    engine.close()
}

fn put(data_dir: &Path, sector_size: u32, input: &Path, coords: &[i32]) -> Result<()> {
    let engine = open_engine(data_dir, sector_size)?;
    let data = fs::read(input)?;

    match *coords {
        [x, z] => engine.save_2d(EntryKey2D::new(x, z), &data)?,
        [x, y, z] => engine.save_3d(EntryKey3D::new(x, y, z), &data)?,
        _ => return Err(bad_coords(coords)),
    }

    tracing::info!("Stored {} bytes at {:?}", data.len(), coords);
    engine.close()
}

fn bad_coords(coords: &[i32]) -> RegionError {
    RegionError::Config(format!("expected 2 or 3 coordinates, got {:?}", coords))
}
