//! linksort CLI
//!
//! Sort, search and verify fixed-size record files from the command line.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use linksort::compare::{self, KeyKind, KeySpec};
use linksort::record::{Date, SaleRecord, SALE_RECORD_SIZE};
use linksort::{sorted_file_name, Config, ExternalSorter, Result, SortAlgorithm, SortError};
use tracing_subscriber::{fmt, EnvFilter};

type Comparator = Box<dyn Fn(&[u8], &[u8]) -> Ordering>;

/// linksort
#[derive(Parser, Debug)]
#[command(name = "linksort")]
#[command(about = "Out-of-core sort and search for fixed-size record files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort a record file into a new file
    Sort {
        /// Record file to sort
        input: PathBuf,

        /// Output path (default: "<Algorithm>Sorted<name> <time>.dat" next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sort algorithm (merge or bubble)
        #[arg(short, long, default_value = "merge")]
        algorithm: SortAlgorithm,

        /// Directory for the temporary list file
        #[arg(long)]
        temp_dir: Option<PathBuf>,

        /// Fail if the flattened record count differs from the list
        #[arg(long)]
        strict: bool,

        /// Skip fsync of the output
        #[arg(long)]
        no_sync: bool,

        #[command(flatten)]
        ordering: OrderArgs,
    },

    /// Binary search a sorted record file
    Search {
        /// Sorted record file
        file: PathBuf,

        /// Key to look for (a number, text, or DD/MM/YYYY for sales dates)
        key: String,

        /// Report every matching record instead of one
        #[arg(short, long)]
        range: bool,

        #[command(flatten)]
        ordering: OrderArgs,
    },

    /// Check that a record file is sorted
    Verify {
        /// Record file to check
        file: PathBuf,

        #[command(flatten)]
        ordering: OrderArgs,
    },
}

/// Record layout and ordering shared by every subcommand
#[derive(Args, Debug)]
struct OrderArgs {
    /// Record size in bytes (default depends on --order)
    #[arg(short = 's', long)]
    record_size: Option<usize>,

    /// Preset ordering
    #[arg(long, value_enum, default_value = "u32")]
    order: Order,

    /// Custom key type (u32, i32, u64, i64, f64, bytes); overrides --order
    #[arg(long)]
    key_type: Option<KeyKind>,

    /// Byte offset of the custom key
    #[arg(long, default_value = "0")]
    key_offset: usize,

    /// Length of a `bytes` key
    #[arg(long, default_value = "0")]
    key_len: usize,

    /// Sort descending
    #[arg(long)]
    descending: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Order {
    Bytes,
    U32,
    I32,
    U64,
    I64,
    F64,
    /// Sales records by order date
    SalesDate,
    /// Sales records by product key
    SalesProduct,
    /// Sales records by order date, then product key
    SalesDateProduct,
}

impl OrderArgs {
    fn custom_key(&self) -> Option<KeySpec> {
        self.key_type.map(|kind| {
            let spec = match kind {
                KeyKind::Bytes => KeySpec::bytes(self.key_offset, self.key_len),
                numeric => KeySpec::numeric(numeric, self.key_offset),
            };
            spec.descending(self.descending)
        })
    }

    fn record_size(&self) -> usize {
        if let Some(size) = self.record_size {
            return size;
        }
        if let Some(key) = self.custom_key() {
            return key.offset.saturating_add(key.width()).max(1);
        }
        match self.order {
            Order::SalesDate | Order::SalesProduct | Order::SalesDateProduct => SALE_RECORD_SIZE,
            Order::U64 | Order::I64 | Order::F64 => 8,
            Order::Bytes | Order::U32 | Order::I32 => 4,
        }
    }

    fn comparator(&self) -> Comparator {
        if let Some(key) = self.custom_key() {
            return Box::new(key.comparator());
        }
        let base: Comparator = match self.order {
            Order::Bytes => Box::new(compare::compare_bytes),
            Order::U32 => Box::new(compare::compare_u32_le),
            Order::I32 => Box::new(compare::compare_i32_le),
            Order::U64 => Box::new(compare::compare_u64_le),
            Order::I64 => Box::new(compare::compare_i64_le),
            Order::F64 => Box::new(compare::compare_f64_le),
            Order::SalesDate => Box::new(compare::compare_sales_by_order_date),
            Order::SalesProduct => Box::new(compare::compare_sales_by_product_key),
            Order::SalesDateProduct => Box::new(compare::compare_sales_by_date_then_product),
        };
        if self.descending {
            Box::new(compare::reversed(base))
        } else {
            base
        }
    }

    /// Build a record that compares equal to matches of `value`
    fn probe(&self, value: &str) -> Result<Vec<u8>> {
        let record_size = self.record_size();
        if let Some(key) = self.custom_key() {
            return key.encode_key(value, record_size);
        }

        let numeric = |kind| KeySpec::numeric(kind, 0).encode_key(value, record_size);
        match self.order {
            Order::Bytes => {
                let mut record = vec![0u8; record_size];
                let n = value.len().min(record_size);
                record[..n].copy_from_slice(&value.as_bytes()[..n]);
                Ok(record)
            }
            Order::U32 => numeric(KeyKind::U32),
            Order::I32 => numeric(KeyKind::I32),
            Order::U64 => numeric(KeyKind::U64),
            Order::I64 => numeric(KeyKind::I64),
            Order::F64 => numeric(KeyKind::F64),
            Order::SalesDate => sale_probe(Some(value.parse()?), None),
            Order::SalesProduct => sale_probe(None, Some(parse_product(value)?)),
            Order::SalesDateProduct => {
                let (date, product) = value.split_once(',').ok_or_else(|| {
                    SortError::Config(format!("expected DD/MM/YYYY,PRODUCT, got {:?}", value))
                })?;
                sale_probe(Some(date.trim().parse()?), Some(parse_product(product)?))
            }
        }
    }
}

fn parse_product(value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|e| SortError::Config(format!("invalid product key {:?}: {}", value, e)))
}

fn sale_probe(order_date: Option<Date>, product_key: Option<u16>) -> Result<Vec<u8>> {
    let mut sale = SaleRecord::default();
    if let Some(date) = order_date {
        sale.order_date = date;
    }
    if let Some(key) = product_key {
        sale.product_key = key;
    }
    sale.encode()
}

fn default_output(input: &Path, algorithm: SortAlgorithm) -> PathBuf {
    let base = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(sorted_file_name(&base, algorithm))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sort {
            input,
            output,
            algorithm,
            temp_dir,
            strict,
            no_sync,
            ordering,
        } => {
            let mut builder = Config::builder()
                .record_size(ordering.record_size())
                .algorithm(algorithm)
                .strict_flatten(strict)
                .sync_output(!no_sync);
            if let Some(dir) = temp_dir {
                builder = builder.temp_dir(dir);
            }

            let sorter = ExternalSorter::new(builder.build())?;
            let output = output.unwrap_or_else(|| default_output(&input, algorithm));
            let report = sorter.sort_file(&input, &output, ordering.comparator().as_ref())?;

            println!(
                "Sorted {} records with {} sort in {:.3}s ({} rounds/passes, {} comparisons)",
                report.records,
                report.algorithm,
                report.elapsed.as_secs_f64(),
                report.rounds_or_passes,
                report.comparisons
            );
            println!("Output: {}", output.display());
        }

        Commands::Search {
            file,
            key,
            range,
            ordering,
        } => {
            let config = Config::builder().record_size(ordering.record_size()).build();
            let sorter = ExternalSorter::new(config)?;
            let probe = ordering.probe(&key)?;
            let comparator = ordering.comparator();

            if range {
                match sorter.search_range(&file, &probe, comparator.as_ref())? {
                    Some(found) => println!(
                        "Found {} record(s) at indices {}..={}",
                        found.len(),
                        found.start,
                        found.end
                    ),
                    None => println!("Not found"),
                }
            } else {
                match sorter.search(&file, &probe, comparator.as_ref())? {
                    Some(index) => println!("Found at index {}", index),
                    None => println!("Not found"),
                }
            }
        }

        Commands::Verify { file, ordering } => {
            let config = Config::builder().record_size(ordering.record_size()).build();
            let sorter = ExternalSorter::new(config)?;
            match sorter.verify(&file, ordering.comparator().as_ref())? {
                None => println!("Sorted"),
                Some(index) => {
                    println!("Not sorted: record {} is smaller than its predecessor", index);
                    std::process::exit(2);
                }
            }
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,linksort=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("linksort v{}", linksort::VERSION);

    if let Err(e) = run(cli) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
