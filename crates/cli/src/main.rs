//! # sheetlog-cli
//!
//! Command-line exporter for collaborative sheet change logs.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use sheetlog_client::{
    fetch_all_deltas, load_credential, save_credential, wait_for_credential, LoginClient,
    SheetClient,
};
use sheetlog_engine::{enrich, scan_changes, OwnerMap};
use sheetlog_types::Credential;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// sheetlog - export sheets and their edit histories to CSV/JSON
#[derive(Parser)]
#[command(name = "sheetlog")]
#[command(author, version, about = "Export collaborative sheets and their change logs", long_about = None)]
struct Cli {
    /// One-time login code
    #[arg(short = 'c', long = "code", value_name = "CODE")]
    code: Option<String>,

    /// Persisted credential file (JSON with AuthToken and SheetId)
    #[arg(long = "auth", value_name = "KEYFILE")]
    auth: Option<PathBuf>,

    /// Target sheet id (overrides the credential file's sheet)
    #[arg(long = "sheet", value_name = "SHEET_ID")]
    sheet: Option<String>,

    /// Sheet service URL
    #[arg(long, default_value = "https://api.sheetlog.dev")]
    service_url: String,

    /// Login service URL
    #[arg(long, default_value = "https://login.sheetlog.dev")]
    login_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Quick, gets info about the sheet
    Info,
    /// Slow, downloads the latest contents to a local CSV file
    Getall { file: PathBuf },
    /// Downloads the contents enriched with aggregated edit metadata
    Getall2 { file: PathBuf },
    /// Downloads all commits (but not contents) to a local CSV file
    History { file: PathBuf },
    /// Dumps the raw delta stream as one JSON document
    Changelog { file: PathBuf },
    /// Triggers a server-side recompute and waits for it to finish
    Refresh,
    /// Maps each record to its deepest-owning child sheet
    Getchildmap { file: PathBuf },
    /// Prints the server-side rebase log
    Rebaselog,
    /// Prints the child-sheet tree
    Topology,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        eprintln!();
        let _ = Cli::command().print_help();
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let credential = resolve_credential(&cli).await?;
    let client = SheetClient::new(&cli.service_url, &credential)?;

    match &cli.command {
        Command::Info => info(&client).await,
        Command::Getall { file } => getall(&client, file).await,
        Command::Getall2 { file } => getall2(&client, file).await,
        Command::History { file } => history(&client, file).await,
        Command::Changelog { file } => changelog(&client, file).await,
        Command::Refresh => refresh(&client).await,
        Command::Getchildmap { file } => getchildmap(&client, file).await,
        Command::Rebaselog => rebaselog(&client).await,
        Command::Topology => topology(&client).await,
    }
}

/// Resolve a credential from the auth selector.
///
/// `--code` exchanges a one-time code (persisting the result when
/// `--auth` also names a file); `--auth` alone reads the file, waiting
/// for the interactive login flow to create it when missing. `--sheet`
/// overrides the credential's sheet either way.
async fn resolve_credential(cli: &Cli) -> Result<Credential> {
    let mut credential = if let Some(code) = &cli.code {
        let login = LoginClient::new(&cli.login_url)?;
        let credential = login.login_with_code(code).await?;
        println!("Login successful...");
        if let Some(path) = &cli.auth {
            save_credential(path, &credential)
                .with_context(|| format!("Failed to write credential file: {}", path.display()))?;
        }
        credential
    } else if let Some(path) = &cli.auth {
        if path.exists() {
            load_credential(path)
                .with_context(|| format!("Failed to read credential file: {}", path.display()))?
        } else {
            println!(
                "Credential file {} not found; complete the login at {} (waiting...)",
                path.display(),
                cli.login_url
            );
            wait_for_credential(path).await?
        }
    } else {
        bail!("no auth selector: pass --code <login-code> or --auth <keyfile>");
    };

    if let Some(sheet) = &cli.sheet {
        credential.sheet_id = sheet.clone();
    }
    if credential.sheet_id.is_empty() {
        bail!("no sheet selected: credential has no SheetId and --sheet was not given");
    }
    Ok(credential)
}

/// Print sheet and user-visible metadata.
async fn info(client: &SheetClient) -> Result<()> {
    let info = client.get_info().await?;
    println!("Name:    {}", info.name);
    println!("PName:   {}", info.parent_name);
    println!("SheetId: {}", client.sheet_id());
    println!("ver:     {}", info.latest_version);
    println!("records: {}", info.count_records);
    Ok(())
}

/// Download the raw snapshot to a CSV file.
async fn getall(client: &SheetClient, file: &Path) -> Result<()> {
    println!("Downloading contents to file: {}", file.display());
    let info = client.get_info().await?;
    println!("Sheet has {} rows.", info.count_records);

    let contents = client.get_contents().await?;
    contents
        .save_as_csv(file)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    Ok(())
}

/// Download the snapshot joined with aggregated edit metadata.
async fn getall2(client: &SheetClient, file: &Path) -> Result<()> {
    println!("Downloading enriched contents to file: {}", file.display());
    let contents = client.get_contents().await?;

    let scan = scan_changes(client).await?;
    if scan.skipped > 0 {
        tracing::warn!(skipped = scan.skipped, "some deltas were malformed");
    }

    let enriched = enrich(&contents, &scan.summaries)?;
    enriched
        .save_as_csv(file)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    println!(
        "Wrote {} rows ({} with edit history).",
        enriched.row_count(),
        scan.summaries.len()
    );
    Ok(())
}

/// Download the flattened change log to a CSV file.
///
/// Each delta can be an arbitrary rectangle (commonly 1x1), so it is
/// flattened for CSV viewing; multiple rows may share one version number.
async fn history(client: &SheetClient, file: &Path) -> Result<()> {
    println!("Downloading change log to file: {}", file.display());
    let info = client.get_info().await?;
    println!("Sheet has {} changes.", info.latest_version);

    let scan = scan_changes(client).await?;
    scan.history
        .save_as_csv(file)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    println!("Wrote {} change rows.", scan.history.row_count());
    Ok(())
}

/// Dump the raw delta stream as one JSON array document.
async fn changelog(client: &SheetClient, file: &Path) -> Result<()> {
    println!("Downloading raw change log to file: {}", file.display());
    let deltas = fetch_all_deltas(client).await?;
    let json = serde_json::to_string_pretty(&deltas)?;
    std::fs::write(file, json).with_context(|| format!("Failed to write {}", file.display()))?;
    println!("Wrote {} deltas.", deltas.len());
    Ok(())
}

/// Trigger a server-side recompute and wait for completion.
async fn refresh(client: &SheetClient) -> Result<()> {
    println!("Refreshing sheet {}...", client.sheet_id());
    client.refresh().await?;
    println!("Refresh complete.");
    Ok(())
}

/// Map every record to the deepest child sheet that owns it.
///
/// Walks the child-sheet tree depth-first; a deeper sheet containing a
/// record replaces a shallower owner, ties at equal depth keep the
/// first-visited sheet.
async fn getchildmap(client: &SheetClient, file: &Path) -> Result<()> {
    println!("Building child map to file: {}", file.display());

    let mut owners = OwnerMap::new();
    let mut stack: Vec<(String, String, usize)> = Vec::new();
    for child in client.get_children().await?.into_iter().rev() {
        stack.push((child.sheet_id, child.name, 1));
    }

    while let Some((sheet_id, name, depth)) = stack.pop() {
        let child = client.for_sheet(&sheet_id);
        let contents = child.get_contents().await?;
        if let Some(record_ids) = contents.column("RecId") {
            owners.claim(depth, &sheet_id, &name, record_ids.iter().map(String::as_str));
        }
        for grandchild in child.get_children().await?.into_iter().rev() {
            stack.push((grandchild.sheet_id, grandchild.name, depth + 1));
        }
    }

    let table = owners.into_table();
    table
        .save_as_csv(file)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    println!("Mapped {} records.", table.row_count());
    Ok(())
}

/// Print the server-side rebase log.
async fn rebaselog(client: &SheetClient) -> Result<()> {
    let entries = client.get_rebase_log().await?;
    if entries.is_empty() {
        println!("(no rebase entries)");
        return Ok(());
    }
    for entry in entries {
        println!("v{:<8} {}  {}", entry.version, entry.timestamp, entry.comment);
    }
    Ok(())
}

/// Print the child-sheet tree.
async fn topology(client: &SheetClient) -> Result<()> {
    let info = client.get_info().await?;
    println!("{} ({})", info.name, client.sheet_id());

    let mut stack: Vec<(String, String, usize)> = Vec::new();
    for child in client.get_children().await?.into_iter().rev() {
        stack.push((child.sheet_id, child.name, 1));
    }
    while let Some((sheet_id, name, depth)) = stack.pop() {
        println!("{}{} ({})", "  ".repeat(depth), name, sheet_id);
        let child = client.for_sheet(&sheet_id);
        for grandchild in child.get_children().await?.into_iter().rev() {
            stack.push((grandchild.sheet_id, grandchild.name, depth + 1));
        }
    }
    Ok(())
}
