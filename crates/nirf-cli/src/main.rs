mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "nirf",
    version,
    about = "Extract NIRF institute report tables into structured records"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one report (PDF, XLSX workbook or JSON page dump)
    Extract {
        /// Path to the source document
        input_file: PathBuf,

        /// Output format: table (default), json, xml or pages
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the output to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Pipeline config (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Extract every supported document in a directory to XML
    Batch {
        /// Directory of source documents
        input_dir: PathBuf,

        /// Where to write <stem>.xml files (default: next to the sources)
        #[arg(long = "xml-dir", value_name = "DIR")]
        xml_dir: Option<PathBuf>,

        /// Pipeline config (JSON)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Load serialized XML documents into the aggregate store
    Load {
        /// Directory of .xml files
        input_dir: PathBuf,

        /// Store file (created if missing)
        #[arg(long, value_name = "FILE")]
        store: PathBuf,

        /// Parse and merge without writing the store
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            input_file,
            output,
            out,
            config,
        } => commands::extract::run(input_file, &output, out, config).map(|()| 0),
        Commands::Batch {
            input_dir,
            xml_dir,
            config,
        } => commands::batch::run(&input_dir, xml_dir, config),
        Commands::Load {
            input_dir,
            store,
            dry_run,
        } => commands::load::run(&input_dir, &store, dry_run),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
