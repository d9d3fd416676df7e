//! Notes Client - CLI
//!
//! Thin terminal driver for the note list view-model.

use anyhow::Result;
use clap::{Parser, Subcommand};
use notes_client::events::connect_nats;
use notes_client::notes::{CompletionFilter, FormField};
use notes_client::session::SessionContext;
use notes_client::store::HttpNoteStore;
use notes_client::view::{NoteListViewModel, RemoteSync, ViewState};
use notes_client::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "notes")]
#[command(about = "Create, toggle and watch notes on a remote note store")]
struct Cli {
    /// Path to a YAML config file (defaults to ./notes.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote note store URL (overrides config)
    #[arg(long, env = "NOTES_STORE_URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes
    List {
        /// all, incomplete or complete
        #[arg(short, long, default_value = "all")]
        filter: CompletionFilter,
    },

    /// Create a note
    Create {
        #[arg(short, long, default_value = "")]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete a note by id
    Delete { id: String },

    /// Toggle a note between complete and incomplete
    Toggle { id: String },

    /// Print the list on every change until Ctrl-C
    Watch {
        /// all, incomplete or complete
        #[arg(short, long, default_value = "all")]
        filter: CompletionFilter,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,notes_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.store_url = server;
    }

    let vm = Arc::new(build_view_model(&config).await?);

    match cli.command {
        Commands::List { filter } => {
            vm.fetch_notes(filter).await;
            render(&vm.state());
        }
        Commands::Create { name, description } => {
            vm.set_input(FormField::Name, name);
            vm.set_input(FormField::Description, description);
            let outcome = vm.create_note().await?;
            report(outcome, "create");
            render(&vm.state());
        }
        Commands::Delete { id } => {
            vm.fetch_notes(CompletionFilter::All).await;
            report(vm.delete_note(&id).await, "delete");
            render(&vm.state());
        }
        Commands::Toggle { id } => {
            vm.fetch_notes(CompletionFilter::All).await;
            report(vm.update_note(&id).await, "toggle");
            render(&vm.state());
        }
        Commands::Watch { filter } => run_watch(vm, filter).await?,
    }

    Ok(())
}

async fn build_view_model(config: &Config) -> Result<NoteListViewModel> {
    let mut store = HttpNoteStore::new(&config.store_url, config.request_timeout)?;
    if let Some(url) = &config.nats_url {
        let client = connect_nats(url).await?;
        store = store.with_nats(client, config.subject_prefix.clone());
    }

    let session = SessionContext::new(Arc::new(store));
    tracing::info!(
        client_id = %session.client_id(),
        store = %config.store_url,
        "Session started"
    );
    Ok(NoteListViewModel::new(session).with_policy(config.sync_policy()))
}

async fn run_watch(vm: Arc<NoteListViewModel>, filter: CompletionFilter) -> Result<()> {
    let mut changes = vm.subscribe();
    let feed = vm.start(filter).await;
    render(&vm.state());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = changes.borrow_and_update().clone();
                render(&state);
            }
        }
    }

    feed.close().await;
    Ok(())
}

fn report(outcome: RemoteSync, what: &str) {
    match outcome {
        RemoteSync::Confirmed => {}
        RemoteSync::Diverged => {
            eprintln!("warning: {} failed remotely, local list may be stale", what)
        }
        RemoteSync::RolledBack => {
            eprintln!("warning: {} failed remotely and was undone", what)
        }
        RemoteSync::Skipped => eprintln!("warning: nothing to {}", what),
    }
}

fn render(state: &ViewState) {
    if state.error {
        eprintln!("error: failed to load notes");
    }
    if state.notes.is_empty() {
        println!("(no notes)");
        return;
    }
    for note in &state.notes {
        let mark = if note.completed { "x" } else { " " };
        println!("[{}] {}  {}: {}", mark, note.id, note.name, note.description);
    }
    println!();
}
