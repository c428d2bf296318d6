use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use modelshelf::config::Settings;
use modelshelf::i18n::Translations;
use modelshelf::models::{CreateLibraryInput, CreateModelInput};
use modelshelf::{api, db, jobs};

#[derive(Parser)]
#[command(name = "mshelf")]
#[command(about = "Library manager for 3D-printable model files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API (overrides the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Scan a model directory and register its mesh files as parts
    Scan {
        /// Model id
        model: Uuid,
    },
    /// Manage libraries
    #[command(subcommand)]
    Library(LibraryCommands),
    /// Manage models
    #[command(subcommand)]
    Model(ModelCommands),
}

#[derive(Subcommand)]
enum LibraryCommands {
    /// Register a library rooted at an absolute path
    Add {
        name: String,
        path: PathBuf,
    },
    /// List registered libraries
    List,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Register a model in a library and scan it
    Add {
        /// Library id
        library: Uuid,
        /// Model directory, relative to the library root
        path: String,
        /// Display name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "modelshelf=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(settings: &Settings) -> anyhow::Result<db::Database> {
    let db = match &settings.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let db = open_database(&settings)?;
    let translations = Translations::load(settings.locale_file.as_deref())?;
    let port = settings.port;

    let app = api::create_router(api::AppState::new(db, settings, translations));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("ModelShelf server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut settings = Settings::load()?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                settings.port = port;
            }
            serve(settings).await?;
        }
        None => serve(settings).await?,
        Some(Commands::Scan { model }) => {
            let db = open_database(&settings)?;
            let summary = jobs::scan_model(&db, &settings, model)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Some(Commands::Library(LibraryCommands::Add { name, path })) => {
            let db = open_database(&settings)?;
            let path = std::fs::canonicalize(&path)?;
            let library = db.create_library(CreateLibraryInput {
                name,
                path: path.to_string_lossy().into_owned(),
            })?;
            println!("{}", serde_json::to_string_pretty(&library)?);
        }
        Some(Commands::Library(LibraryCommands::List)) => {
            let db = open_database(&settings)?;
            for library in db.get_all_libraries()? {
                println!("{}  {}  {}", library.id, library.name, library.path);
            }
        }
        Some(Commands::Model(ModelCommands::Add {
            library,
            path,
            name,
        })) => {
            let db = open_database(&settings)?;
            let model = db.create_model(
                library,
                CreateModelInput {
                    name,
                    path,
                    license: None,
                },
            )?;
            let summary = jobs::scan_model(&db, &settings, model.id)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
