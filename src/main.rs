// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use company_registry::{
    import_drafts, load_drafts_csv, mask_cep, mask_cnpj, validate_cnpj, CompanyRegistry,
    DEFAULT_PER_PAGE,
};

#[derive(Parser)]
#[command(name = "company-registry", version, about = "Brazilian company directory: CNPJ validation, masks, search and paging")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a CNPJ (exit status 1 when invalid)
    Validate { cnpj: String },
    /// Apply a display mask to raw or partial input
    Mask {
        #[command(subcommand)]
        kind: MaskKind,
    },
    /// Import companies from a CSV file and report rejected rows
    Import { csv: PathBuf },
    /// Search companies loaded from a CSV file
    Search {
        csv: PathBuf,
        term: String,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,
    },
    /// Browse companies loaded from a CSV file in the terminal
    Browse { csv: PathBuf },
}

#[derive(Subcommand)]
enum MaskKind {
    Cnpj { value: String },
    Cep { value: String },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { cnpj } => return Ok(run_validate(&cnpj)),
        Command::Mask { kind } => match kind {
            MaskKind::Cnpj { value } => println!("{}", mask_cnpj(&value)),
            MaskKind::Cep { value } => println!("{}", mask_cep(&value)),
        },
        Command::Import { csv } => run_import(&csv)?,
        Command::Search {
            csv,
            term,
            page,
            per_page,
        } => run_search(&csv, &term, page, per_page)?,
        Command::Browse { csv } => run_browse(&csv)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn run_validate(cnpj: &str) -> ExitCode {
    match validate_cnpj(cnpj) {
        Ok(()) => {
            println!("✓ {} válido", mask_cnpj(cnpj));
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load a CSV into a fresh directory
fn load_registry(csv: &Path) -> Result<(CompanyRegistry, company_registry::ImportSummary)> {
    let registry = CompanyRegistry::new();
    let drafts = load_drafts_csv(csv)?;
    let summary = import_drafts(&registry, drafts);
    Ok((registry, summary))
}

fn run_import(csv: &Path) -> Result<()> {
    println!("📂 Importando {}", csv.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let (_, summary) = load_registry(csv)?;

    for row in &summary.rejected {
        println!("✗ linha {} ({}): {}", row.line, row.cnpj, row.reasons.join("; "));
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ {} importada(s)", summary.imported);
    println!("✗ {} rejeitada(s)", summary.rejected.len());
    println!("  {} linha(s) lidas", summary.total());

    Ok(())
}

fn run_search(csv: &Path, term: &str, page: i64, per_page: usize) -> Result<()> {
    let (registry, _) = load_registry(csv)?;
    let results = registry.search(term, page, per_page);

    for company in &results.items {
        println!(
            "{:<20} {:<30} {}",
            company.cnpj.formatted(),
            company.name,
            company.legal_name
        );
    }

    let info = &results.info;
    println!(
        "\nPágina {}/{} ({} empresa(s))",
        info.current_page, info.total_pages, info.total_items
    );

    Ok(())
}

#[cfg(feature = "tui")]
fn run_browse(csv: &Path) -> Result<()> {
    let (registry, summary) = load_registry(csv)?;
    if !summary.rejected.is_empty() {
        tracing::warn!(rejected = summary.rejected.len(), "some rows were not imported");
    }

    let mut app = ui::App::new(registry.all_companies(), DEFAULT_PER_PAGE);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_browse(_csv: &Path) -> Result<()> {
    anyhow::bail!("TUI not enabled. Build with --features tui")
}
