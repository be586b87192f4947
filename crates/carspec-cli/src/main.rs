//! carspec: turn scraped vehicle pages into canonical specification records.

use std::path::PathBuf;

use carspec_core::Error;
use carspec_extract::{classify_label, SpecEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod page;
mod report;

struct ExtractArgs {
    page: PathBuf,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
    report: bool,
}

fn parse_extract_args(args: &[String]) -> Option<ExtractArgs> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut report = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => config = Some(PathBuf::from(iter.next()?)),
            "--report" | "-r" => report = true,
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    let page = positional.next()?;
    let out = positional.next();
    if positional.next().is_some() {
        return None;
    }
    Some(ExtractArgs {
        page,
        out,
        config,
        report,
    })
}

fn run_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let config = page::load_config(args.config.as_deref())?;
    info!(
        "Policies: table={}, text={}, scan_text_blocks={}",
        config.table_policy, config.text_policy, config.scan_text_blocks
    );

    let source = page::load_page(&args.page)?;
    let engine = SpecEngine::new(config);
    let extraction = match engine.extract(&source) {
        Ok(ext) => ext,
        Err(Error::Unparsable(reason)) => {
            eprintln!("No record for {}: {}", args.page.display(), reason);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    page::write_spec(&extraction.spec, args.out.as_deref())?;
    if args.report {
        report::print_report(&extraction);
    }
    Ok(())
}

fn print_usage() {
    println!("carspec: vehicle specification extraction");
    println!();
    println!("Usage: carspec <command>");
    println!();
    println!("Commands:");
    println!("  extract <page.json> [out.json] [--config <file>] [--report]");
    println!("                           Extract a canonical record from a page dump");
    println!("  classify <label> <value> Show which slot a label/value pair lands in");
    println!("  help                     Show this help message");
    println!();
    println!("Environment:");
    println!("  CARSPEC_TABLE_POLICY     last-write-wins | first-write-wins (default: last)");
    println!("  CARSPEC_TEXT_POLICY      last-write-wins | first-write-wins (default: first)");
    println!("  CARSPEC_SCAN_TEXT        true | false (default: true)");
    println!("  RUST_LOG                 Log filter (default: info)");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "extract" => {
            let Some(extract_args) = parse_extract_args(&args[2..]) else {
                eprintln!("Usage: carspec extract <page.json> [out.json] [--config <file>] [--report]");
                std::process::exit(1);
            };
            run_extract(extract_args)
        }
        "classify" => {
            if args.len() < 4 {
                eprintln!("Usage: carspec classify <label> <value>");
                std::process::exit(1);
            }
            let result = classify_label(&args[2], &args[3]);
            report::print_classification(&args[2], &args[3], result.as_ref());
            Ok(())
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}. Use 'carspec help' for usage.", other);
            std::process::exit(1);
        }
    }
}
