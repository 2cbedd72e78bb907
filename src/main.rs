use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kube_api_migrate::driver::{FileReport, Migrator};
use kube_api_migrate::reporter::{MigrationReporter, ReportFormat};

#[derive(Parser, Debug)]
#[command(name = "kube-api-migrate")]
#[command(about = "Migrate deprecated Kubernetes API versions in YAML manifests")]
struct Args {
    /// Input manifest file or directory
    input: String,

    /// Output directory for migrated manifests
    #[arg(long, short = 'o', default_value = "output")]
    output_dir: String,

    /// Print the full migration summary
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "console")]
    report_format: ReportFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let input = Path::new(&args.input);
    let mut migrator = Migrator::new(&args.output_dir);

    let reports: Vec<FileReport> = if input.is_file() {
        match migrator.migrate_file(input) {
            Ok(outcome) => vec![FileReport {
                input: outcome.input,
                output: outcome.output,
                results: outcome.results,
                error: None,
            }],
            Err(e) => {
                eprintln!("❌ Error: {e}");
                process::exit(1);
            }
        }
    } else if input.is_dir() {
        match migrator.migrate_directory(input) {
            Ok(reports) => reports,
            Err(e) => {
                eprintln!("❌ Error: {e}");
                process::exit(1);
            }
        }
    } else {
        eprintln!("❌ Error: {} is not a valid file or directory", args.input);
        process::exit(1);
    };

    let reporter = MigrationReporter::new().with_format(args.report_format);
    let report = reporter.generate_report(reports);
    match reporter.format_report(&report) {
        Ok(formatted) => println!("{formatted}"),
        Err(e) => {
            eprintln!("❌ Error: {e}");
            process::exit(1);
        }
    }

    if args.verbose {
        println!("\n=== Migration Summary ===");
        println!("{}", migrator.summary());
    }

    if report.files_failed > 0 {
        process::exit(1);
    }
}
