mod app;
mod barcode;
mod catalog;
mod document;
mod error;
mod metrics;
mod pdf;
mod reader;
mod shell;
mod writer;

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    European,
}

impl OutputFormat {
    pub fn delimiter(&self) -> u8 {
        match self {
            OutputFormat::Csv => b',',
            OutputFormat::Tsv => b'\t',
            OutputFormat::European => b';',
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    pub fn setup(&self) -> pdf::PageSetup {
        match self {
            PageSize::Letter => pdf::PageSetup::letter(),
            PageSize::A4 => pdf::PageSetup::a4(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "barcode-labels")]
#[command(version, about = "Generate printable EAN-13 barcode label sheets from Excel product lists")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Print detailed progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the product listing, optionally filtered by reference
    List {
        /// Spreadsheet with ref, produtoDesc and codigoBarras columns (.xlsx)
        input: PathBuf,

        /// Only show products with this reference
        #[arg(short, long = "ref")]
        reference: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the distinct references in the spreadsheet
    Refs {
        /// Spreadsheet with ref, produtoDesc and codigoBarras columns (.xlsx)
        input: PathBuf,
    },

    /// Generate the barcode PDF
    Export {
        /// Spreadsheet with ref, produtoDesc and codigoBarras columns (.xlsx)
        input: PathBuf,

        /// Destination PDF (".pdf" is appended when there is no extension)
        #[arg(short, long)]
        output: PathBuf,

        /// Only export products with this reference
        #[arg(short, long = "ref")]
        reference: Option<String>,

        /// Page size
        #[arg(long, value_enum, default_value_t = PageSize::Letter)]
        page_size: PageSize,
    },

    /// Start an interactive session
    Shell {
        /// Spreadsheet to load on start
        input: Option<PathBuf>,

        /// Page size for exports
        #[arg(long, value_enum, default_value_t = PageSize::Letter)]
        page_size: PageSize,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> error::Result<()> {
    match args.command {
        Command::List {
            input,
            reference,
            format,
            output,
        } => {
            let mut state = app::AppState::with_file(Some(&input));
            let view = state.set_selection(reference.as_deref());
            let config = writer::ListingConfig { format };

            match output {
                None => {
                    let stdout = io::stdout();
                    let handle = stdout.lock();
                    writer::write_listing(&view, handle, &config)?;
                }
                Some(path) => {
                    let file = std::fs::File::create(&path)?;
                    writer::write_listing(&view, file, &config)?;
                }
            }
        }
        Command::Refs { input } => {
            let state = app::AppState::with_file(Some(&input));
            writer::write_references(&state.references(), io::stdout().lock())?;
        }
        Command::Export {
            input,
            output,
            reference,
            page_size,
        } => {
            let mut state = app::AppState::with_file(Some(&input));
            state.set_selection(reference.as_deref());
            let settings = app::ExportSettings {
                page: page_size.setup(),
                ..Default::default()
            };

            let outcome = state.export(&settings, || Ok(Some(output)))?;
            if let Some(notice) = outcome.notice() {
                eprintln!("{}", notice);
            }
        }
        Command::Shell { input, page_size } => {
            let state = app::AppState::with_file(input.as_deref());
            let settings = app::ExportSettings {
                page: page_size.setup(),
                ..Default::default()
            };
            let stdin = io::stdin();
            let mut session = shell::Session::new(state, settings, stdin.lock(), io::stdout());
            session.run()?;
        }
    }

    Ok(())
}
