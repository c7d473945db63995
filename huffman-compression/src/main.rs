use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use huffman_compression::{container, CompressionStats};
use log::info;

const COMPRESSED_EXTENSION: &str = "huff";
const DECOMPRESSED_EXTENSION: &str = "out";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Print the size statistics as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file, writing <INPUT>.huff unless -o is given
    Compress {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decompress a .huff file
    Decompress {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let stats = match args.command {
        Command::Compress { input, output } => {
            let output = output.unwrap_or_else(|| compressed_file_name(&input));
            let content = read(&input)?;
            let compressed = container::compress(&content)
                .with_context(|| format!("Failed to compress {}", input.display()))?;
            write(&output, &compressed)?;

            info!("compressed {} into {}", input.display(), output.display());
            CompressionStats::new(content.len() as u64, compressed.len() as u64)
        }
        Command::Decompress { input, output } => {
            let output = output.unwrap_or_else(|| decompressed_file_name(&input));
            let content = read(&input)?;
            let decompressed = container::decompress(&content)
                .with_context(|| format!("Failed to decompress {}", input.display()))?;
            write(&output, &decompressed)?;

            info!("decompressed {} into {}", input.display(), output.display());
            CompressionStats::new(decompressed.len() as u64, content.len() as u64)
        }
    };

    if args.json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!("{stats}");
    }

    Ok(())
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn compressed_file_name(input: &Path) -> PathBuf {
    append_extension(input, COMPRESSED_EXTENSION)
}

fn decompressed_file_name(input: &Path) -> PathBuf {
    if input.extension() == Some(OsStr::new(COMPRESSED_EXTENSION)) {
        input.with_extension("")
    } else {
        append_extension(input, DECOMPRESSED_EXTENSION)
    }
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
