use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;

use qm_core::{message_hash, Catalog, CatalogManifest, LoadOptions, MessageRecord};

#[derive(Parser)]
#[command(name = "qm", about = "QM catalog tool: inspect, query and compile translation catalogs")]
struct Cli {
    /// Log catalog loading at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Language, section sizes and dependencies of a catalog
    Info {
        file: PathBuf,
        /// Directory used to resolve the file and its dependencies
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Translate one message
    Lookup {
        file: PathBuf,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long, default_value = "")]
        context: String,
        #[arg(long)]
        source: String,
        /// Disambiguation comment
        #[arg(long)]
        comment: Option<String>,
        /// Count selecting the plural form
        #[arg(short = 'n', long = "count", allow_negative_numbers = true)]
        n: Option<i32>,
    },

    /// Print every record reachable from the hash table
    Dump {
        file: PathBuf,
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Decode every record and check its stored hash
    Verify {
        file: PathBuf,
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Build a .qm file from a JSON manifest
    Compile {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_catalog(file: &Path, dir: Option<PathBuf>) -> Result<Catalog> {
    let options = LoadOptions::new(dir.unwrap_or_default());
    let name = file
        .to_str()
        .ok_or_else(|| anyhow!("non UTF-8 path: {}", file.display()))?;
    let mut catalog = Catalog::new();
    catalog
        .load_file(name, &options)
        .with_context(|| format!("loading {}", file.display()))?;
    Ok(catalog)
}

fn lossy(field: &Option<Vec<u8>>) -> String {
    field
        .as_deref()
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default()
}

fn print_record(hash: u32, offset: u32, rec: &MessageRecord) {
    let comment = lossy(&rec.comment);
    let comment = if comment.is_empty() {
        String::new()
    } else {
        format!(" ({comment})")
    };
    println!(
        "{hash:08x} @{offset} [{}] {:?}{comment} => {:?}",
        lossy(&rec.context),
        lossy(&rec.source_text),
        rec.translation_strings()
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Cmd::Info { file, dir, json } => {
            let catalog = open_catalog(&file, dir)?;
            let stats = catalog.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                let path = stats
                    .file_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("file: {path}");
                println!("language: {}", stats.language);
                println!("entries: {}", stats.entry_count);
                println!(
                    "sections: messages={} hashes={} contexts={} numerus_rules={}",
                    stats.messages_len, stats.hashes_len, stats.contexts_len, stats.numerus_rules_len
                );
                println!("dependencies: {}", stats.dependencies.join(", "));
            }
        }
        Cmd::Lookup {
            file,
            dir,
            context,
            source,
            comment,
            n,
        } => {
            let catalog = open_catalog(&file, dir)?;
            match catalog.translate(&context, &source, comment.as_deref(), n) {
                Some(t) => println!("{t}"),
                None => return Err(anyhow!("no translation for {source:?} in context {context:?}")),
            }
        }
        Cmd::Dump { file, dir } => {
            let catalog = open_catalog(&file, dir)?;
            for e in catalog.entries() {
                match catalog.record_at(e.offset) {
                    Some(rec) => print_record(e.hash, e.offset, &rec),
                    None => println!("{:08x} @{} <malformed>", e.hash, e.offset),
                }
            }
        }
        Cmd::Verify { file, dir } => {
            let catalog = open_catalog(&file, dir)?;
            let mut ok = 0usize;
            let mut bad_record = 0usize;
            let mut bad_hash = 0usize;
            for e in catalog.entries() {
                let Some(rec) = catalog.record_at(e.offset) else {
                    bad_record += 1;
                    continue;
                };
                let source = rec.source_text.as_deref().unwrap_or_default();
                let comment = rec.comment.as_deref().unwrap_or_default();
                if message_hash(source, comment) != e.hash {
                    bad_hash += 1;
                    continue;
                }
                ok += 1;
            }
            println!("verify: ok={ok} bad_records={bad_record} hash_mismatch={bad_hash}");
            if bad_record + bad_hash > 0 {
                return Err(anyhow!("verify failed for {}", file.display()));
            }
        }
        Cmd::Compile { input, output } => {
            let manifest = CatalogManifest::load(&input)
                .with_context(|| format!("reading manifest {}", input.display()))?;
            let count = manifest.messages.len();
            let path = manifest.into_writer()?.write_to(&output)?;
            println!("compiled: {} ({count} messages)", path.display());
        }
    }
    Ok(())
}
