//! PageDesk command-line tool
//!
//! Page editing runs entirely locally with pdfedit-core. The `expense`
//! commands talk to the hosted service configured by `EXPENSE_SERVICE_URL`
//! and `EXPENSE_SERVICE_ANON_KEY` (a `.env` file is honored).

mod edits;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use expense_core::tracker::{EXPENSE_ADDED, SIGN_UP_OK};
use expense_core::{ExpenseForm, ExpenseTracker, HostedClient, ReqwestTransport, ServiceConfig};
use pdfedit_core::{
    get_page_count, merge_documents, parse_ranges_within, split_document, validate_pdf,
    EditorWorkspace, ExportResult,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pagedesk")]
#[command(version, about = "Reorder, delete, rotate and merge PDF pages; record expenses")]
struct Args {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show page count, version and metadata
    Info {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Combine files, edit the page order and write the result
    Edit {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// New order as 1-based positions, e.g. 3,1,2
        #[arg(long)]
        order: Option<String>,

        /// Positions to delete, e.g. 2,4-5
        #[arg(long)]
        delete: Option<String>,

        /// POSITION:DEGREES, repeatable
        #[arg(long)]
        rotate: Vec<String>,

        /// JSON array of page commands
        #[arg(long)]
        commands: Option<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Concatenate files in the given order
    Merge {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract pages, e.g. --pages 1-3,7
    Split {
        file: PathBuf,

        #[arg(long)]
        pages: String,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Hosted expense tracker
    Expense {
        #[command(subcommand)]
        command: ExpenseCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long, env = "EXPENSE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and record one expense
    Add {
        #[arg(long)]
        email: String,

        #[arg(long, env = "EXPENSE_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        amount: String,

        #[arg(long)]
        category: String,

        #[arg(long, default_value = "")]
        note: String,

        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        date: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Info { files, json } => info_command(&files, json),
        Command::Edit {
            files,
            order,
            delete,
            rotate,
            commands,
            output,
        } => {
            let commands = edits::build_commands(
                order.as_deref(),
                &rotate,
                delete.as_deref(),
                commands.as_deref(),
            )?;
            let mut workspace = load_workspace(&files)?;
            workspace.apply_commands(&commands)?;
            let ExportResult { bytes, metrics } = workspace.export()?;
            write_output(&output, &bytes)?;
            println!(
                "Wrote {} pages ({} bytes) to {}",
                metrics.page_count,
                metrics.output_size_bytes,
                output.display()
            );
            Ok(())
        }
        Command::Merge { files, output } => {
            let documents = files.iter().map(read_file).collect::<Result<Vec<_>>>()?;
            let bytes = merge_documents(documents)?;
            write_output(&output, &bytes)?;
            println!("Merged {} files into {}", files.len(), output.display());
            Ok(())
        }
        Command::Split {
            file,
            pages,
            output,
        } => {
            let bytes = read_file(&file)?;
            let pages = parse_ranges_within(&pages, get_page_count(&bytes)?)?;
            let count = pages.len();
            let result = split_document(&bytes, pages)?;
            write_output(&output, &result)?;
            println!("Extracted {} pages to {}", count, output.display());
            Ok(())
        }
        Command::Expense { command } => expense_command(command).await,
    }
}

fn info_command(files: &[PathBuf], json: bool) -> Result<()> {
    for path in files {
        let info = validate_pdf(&read_file(path)?)
            .with_context(|| format!("{} is not a readable PDF", path.display()))?;
        if json {
            println!("{}", serde_json::to_string(&info)?);
        } else {
            println!(
                "{}: {} pages, PDF {}, {} bytes{}{}",
                path.display(),
                info.page_count,
                info.version,
                info.size_bytes,
                if info.encrypted { ", encrypted" } else { "" },
                info.title
                    .as_deref()
                    .map(|t| format!(", \"{}\"", t))
                    .unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn load_workspace(files: &[PathBuf]) -> Result<EditorWorkspace> {
    let mut workspace = EditorWorkspace::new();
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        workspace
            .add_document(&name, &read_file(path)?)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    info!(
        documents = workspace.document_count(),
        pages = workspace.page_count(),
        "workspace ready"
    );
    Ok(workspace)
}

async fn expense_command(command: ExpenseCommand) -> Result<()> {
    let config = ServiceConfig::from_env()?;
    let tracker = ExpenseTracker::new(HostedClient::new(config, ReqwestTransport::new()));

    match command {
        ExpenseCommand::Signup { email, password } => {
            let feedback = tracker.sign_up(&email, &password).await;
            if feedback.message != SIGN_UP_OK {
                bail!(feedback.message);
            }
            println!("{}", feedback.message);
        }
        ExpenseCommand::Add {
            email,
            password,
            amount,
            category,
            note,
            date,
        } => {
            let feedback = tracker.sign_in(&email, &password).await;
            if !feedback.tracker_visible {
                bail!(feedback.message);
            }

            let form = ExpenseForm::new(&amount, &category, &note, &date);
            let feedback = tracker.add_expense(&form).await;
            // Best effort; the token is short-lived either way
            tracker.sign_out().await;
            if feedback.message != EXPENSE_ADDED {
                bail!(feedback.message);
            }
            println!("{}", feedback.message);
        }
    }
    Ok(())
}

fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}
