use anyhow::Context;
use clap::Parser;
use colored::*;
use mpl_processor::cli::{Args, setup_logging};
use mpl_processor::constants::{PREVIEW_ROWS, columns};
use mpl_processor::{CaptureProcessor, CsvTableWriter, source};
use std::process;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(args)) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.to_config();
    let source = source::default_source()?;

    let processor = CaptureProcessor::new(args.input_dir.clone(), source)?
        .with_config(config)
        .with_progress(!args.quiet);

    println!("{}", "Extracting capture data...".bright_yellow());
    let (table, mut stats) = processor.process().await?;
    println!(
        "{} {} {}",
        "Directory".bright_cyan(),
        args.input_dir.display(),
        format!("has {} files", stats.directory_entries)
            .bright_white()
            .bold()
    );
    println!(
        "  {} {}",
        "Rows extracted:".bright_cyan(),
        table.len().to_string().bright_white().bold()
    );

    let df = table.to_dataframe()?;
    let preview = df
        .select(columns::PREVIEW)
        .context("Failed to build preview")?
        .head(Some(PREVIEW_ROWS));
    println!("{}", preview);

    let writer = CsvTableWriter::new(args.output_path.clone());
    stats.total_rows = writer.write(&table).await?;
    stats.output_path = args.output_path;

    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files skipped:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
        for failure in &stats.failures {
            println!(
                "    {} [{}] {}",
                failure.path.display(),
                failure.kind,
                failure.reason.bright_black()
            );
        }
    }
    println!(
        "  {} {}",
        "CSV written to:".bright_cyan(),
        stats.output_path.display().to_string().bright_white().bold()
    );
    println!("{}", "Done.".bright_green());

    Ok(())
}
