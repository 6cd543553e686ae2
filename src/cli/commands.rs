//! Command handlers for the `satcat` binary.

use crate::cli::args::{Args, Command, parse_byte_filter};
use crate::config::CatalogConfig;
use crate::constants::{APP_TITLE, TYPE_CODE_LEN, columns};
use crate::decoder::{
    DateInterpretation, coarse_type_label, decode_type_code, interpret_date_input, position_name,
};
use crate::models::CatalogTable;
use crate::query::{
    CatalogFilter, launches_per_year, numeric_summary, size_class_by_year, value_counts,
    with_size_class,
};
use crate::store::{CatalogStore, RefreshOutcome, is_up_to_date};
use crate::writer::ParquetExporter;
use anyhow::{Context, Result, bail};
use colored::*;
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::debug;

/// Set up structured logging
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("satcat_explorer={}", log_level)));

    // try_init: tests may have installed a subscriber already
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();

    debug!("Logging initialized at level: {}", log_level);
}

/// Dispatch a parsed command line
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);

    let config = args
        .resolve_config()
        .context("Failed to resolve configuration")?;

    let Some(command) = args.command else {
        bail!("No command given; run with --help for usage");
    };

    match command {
        Command::Decode { code } => {
            print_decoded(&code);
            Ok(())
        }
        Command::Date { input } => print_date(&input),
        Command::Info => {
            let store = CatalogStore::new(config)?;
            let table = load_table(&store)?;
            print_info(&table);
            Ok(())
        }
        Command::Refresh { force } => {
            let store = CatalogStore::new(config)?;
            refresh(&store, force).await
        }
        Command::Summary => {
            let df = load_frame(&config)?;
            print_summary(&df)
        }
        Command::Bytes { position } => {
            let df = load_frame(&config)?;
            print_bytes(&df, position.map(usize::from))
        }
        Command::Filter {
            coarse,
            from,
            to,
            bytes,
            limit,
        } => {
            let mut filter = CatalogFilter::new()
                .with_coarse_types(coarse)
                .with_year_range(from, to);
            for raw in &bytes {
                let Some((position, values)) = parse_byte_filter(raw) else {
                    bail!("Invalid byte filter '{}', expected POSITION=VALUES", raw);
                };
                filter = filter.with_byte(position, values);
            }
            let df = load_frame(&config)?;
            let filtered = filter.apply(&df)?;
            println!(
                "{} {} of {} rows",
                "Matched".bright_green(),
                filtered.height().to_string().bright_white().bold(),
                df.height()
            );
            println!("{}", filtered.head(Some(limit)));
            Ok(())
        }
        Command::Export { output, .. } => {
            let df = load_frame(&config)?;
            export(&df, &output, &config)
        }
    }
}

/// Load the local snapshot or explain why nothing can be shown
fn load_table<F: crate::store::SourceFetcher>(store: &CatalogStore<F>) -> Result<CatalogTable> {
    let loaded = store
        .load()
        .with_context(|| format!("Could not open {}", store.data_file().display()))?;

    match loaded.table {
        Some(table) if !table.is_empty() => Ok(table),
        Some(_) => bail!("No data loaded from {}", store.data_file().display()),
        None => {
            let reason = loaded
                .failure
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            bail!("No data available: {}", reason)
        }
    }
}

fn load_frame(config: &CatalogConfig) -> Result<DataFrame> {
    let store = CatalogStore::new(config.clone())?;
    let table = load_table(&store)?;
    Ok(table.to_dataframe()?)
}

async fn refresh(store: &CatalogStore, force: bool) -> Result<()> {
    let current = store.current_revision().unwrap_or(None);
    println!(
        "{} {}",
        "Current SATCAT file update date:".bright_cyan(),
        current.as_deref().unwrap_or("Unknown")
    );

    let today = chrono::Local::now().date_naive();
    if !force && is_up_to_date(current.as_deref(), today) {
        println!(
            "{}",
            "The SATCAT file is already up-to-date for today. Use --force to download again."
                .yellow()
        );
        return Ok(());
    }

    let outcome = store
        .refresh()
        .await
        .context("Failed to update SATCAT data from the web")?;

    match &outcome {
        RefreshOutcome::Updated { table } => {
            println!(
                "{} {} rows, update date {}",
                "SATCAT data updated and loaded:".bright_green(),
                table.len(),
                table.revision().unwrap_or("Unknown")
            );
        }
        RefreshOutcome::Stale { table, reason } => {
            println!(
                "{} {}",
                "Download failed, using local file; data may be stale:".bright_red(),
                reason
            );
            println!(
                "  {} {} rows, update date {}",
                "Local copy:".bright_cyan(),
                table.len(),
                table.revision().unwrap_or("Unknown")
            );
        }
    }
    Ok(())
}

fn print_info(table: &CatalogTable) {
    println!("{}", APP_TITLE.bright_green().bold());
    println!(
        "  {} {}",
        "Update date:".bright_cyan(),
        table.revision().unwrap_or("Unknown")
    );
    println!(
        "  {} {}",
        "Rows:".bright_cyan(),
        table.len().to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Columns:".bright_cyan(),
        table.column_names().join(", ")
    );
    let duplicates = table.duplicate_columns();
    if !duplicates.is_empty() {
        println!(
            "  {} {}",
            "Duplicate columns (later wins):".yellow(),
            duplicates.join(", ")
        );
    }
}

fn print_section(title: &str, frame: Option<DataFrame>) {
    println!("\n{}", title.bright_yellow().bold());
    match frame {
        Some(frame) if frame.height() > 0 => println!("{}", frame),
        _ => println!("  {}", "No data available.".bright_black()),
    }
}

fn print_summary(df: &DataFrame) -> Result<()> {
    print_section(
        "Satellite Type Distribution",
        value_counts(df, columns::COARSE_TYPE)?,
    );
    print_section("Launches per Year", launches_per_year(df)?);
    print_section(
        "Launch Date Confidence",
        value_counts(df, columns::DATE_CONFIDENCE)?,
    );

    let size_counts = match with_size_class(df)? {
        Some(sized) => value_counts(&sized, columns::SIZE_CLASS)?,
        None => None,
    };
    print_section("Size Classes", size_counts);
    print_section("Size Classes per Year", size_class_by_year(df)?);

    println!("\n{}", "Numeric Fields".bright_yellow().bold());
    let summaries = numeric_summary(df)?;
    if summaries.is_empty() {
        println!("  {}", "No data available.".bright_black());
    }
    for summary in summaries {
        println!(
            "  {:<8} count={} missing={} min={} max={} mean={}",
            summary.column.bright_cyan(),
            summary.count,
            summary.missing,
            format_optional(summary.min),
            format_optional(summary.max),
            format_optional(summary.mean)
        );
    }
    Ok(())
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn print_bytes(df: &DataFrame, position: Option<usize>) -> Result<()> {
    let positions: Vec<usize> = match position {
        Some(position) => vec![position],
        None => (1..=TYPE_CODE_LEN).collect(),
    };

    for position in positions {
        let title = format!(
            "Byte {}: {}",
            position,
            position_name(position).unwrap_or("Unknown")
        );
        print_section(&title, value_counts(df, &columns::sat_type(position))?);
        if position == 2 {
            print_section(
                "Combined Byte 1/2",
                value_counts(df, columns::SAT_TYPE_1_2)?,
            );
        }
    }
    Ok(())
}

fn print_decoded(code: &str) {
    let decoded = decode_type_code(code);
    println!("{} {:?}", "Type code:".bright_green().bold(), code);
    if let Some(coarse) = decoded.coarse {
        println!(
            "  {} {} ({})",
            "Coarse type:".bright_cyan(),
            coarse,
            coarse_type_label(coarse).unwrap_or("unrecognised")
        );
    }
    println!("  {} {:?}", "Bytes 1-2:".bright_cyan(), decoded.prefix2);
    for position in 1..=TYPE_CODE_LEN {
        let value = decoded.position(position).unwrap_or_default();
        println!(
            "  {:>2}. {:<22} {}",
            position,
            position_name(position).unwrap_or_default(),
            value.to_string().bright_white().bold()
        );
    }
}

fn print_date(input: &str) -> Result<()> {
    match interpret_date_input(input)? {
        DateInterpretation::Julian { jd, utc } => {
            println!(
                "Julian Date {} = {} UTC",
                jd,
                utc.format("%Y-%m-%d %H:%M:%S")
            );
        }
        DateInterpretation::Vague { input, confidence } => {
            println!("Vague Date '{}' interpreted as: {}", input, confidence);
        }
    }
    Ok(())
}

fn export(df: &DataFrame, output: &Path, config: &CatalogConfig) -> Result<()> {
    let exporter = ParquetExporter::new(output, config.compression);
    let rows = exporter
        .write(df)
        .with_context(|| format!("Failed to export to {}", output.display()))?;
    println!(
        "{} {} rows to {}",
        "Exported".bright_green(),
        rows.to_string().bright_white().bold(),
        output.display()
    );
    Ok(())
}
