mod cli;

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use cli::{CliArgs, Command};
use forms_core::{ExportConfig, QuestionCatalog, logging};
use forms_export::{ExportRequest, FormsCsvHandler, utc_offset};
use forms_store::SqliteFormStore;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse_args();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ExportConfig::load_from_path(path)?,
        None => ExportConfig::load()?,
    };
    let _guard = logging::init_logging(&config)?;

    execute(&config, args.command).await
}

async fn execute(config: &ExportConfig, command: Command) -> Result<()> {
    let store = open_store(config)?;

    match command {
        Command::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read forms file: {}", file.display()))?;
            let count = store.import_json(&config.forms_table, &json)?;
            println!("Imported {count} forms into {}", config.forms_table);
        }
        Command::Export {
            report,
            from,
            to,
            out,
        } => {
            let catalog = QuestionCatalog::load_from_path(&config.resolved_catalog_path()?)?;
            let handler = FormsCsvHandler::new(
                Arc::new(catalog),
                store,
                config.forms_table.clone(),
                utc_offset(config.report_utc_offset_hours)?,
            );

            let request = ExportRequest::new(report).with_range(from, to);
            let response = handler.handle(&request).await;
            if !response.is_success() {
                bail!("Export failed with status {} (see logs)", response.status);
            }

            let out = out.unwrap_or_else(|| PathBuf::from(request.filename()));
            write_report(&out, &response.body)?;
            info!("Wrote {} bytes to {}", response.body.len(), out.display());
            println!("Wrote {}", out.display());
        }
    }
    Ok(())
}

fn open_store(config: &ExportConfig) -> Result<Arc<SqliteFormStore>> {
    let db_path = config.resolved_database_path()?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let store = SqliteFormStore::open(&db_path, config.scan_page_size)
        .with_context(|| format!("Failed to open forms database: {}", db_path.display()))?;
    Ok(Arc::new(store))
}

fn write_report(path: &Path, body: &str) -> Result<()> {
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}
