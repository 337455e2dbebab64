use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sentiboard::app::App;
use sentiboard::config::{ClientConfig, ConfigError, normalize_api_url};
use sentiboard::net::api::HttpApi;
use sentiboard::net::error::ApiError;
use sentiboard::net::types::{CsvFile, FilterState};
use sentiboard::render;
use sentiboard::state::route::{Route, View};
use sentiboard::state::view::ViewContext;
use sentiboard::util::storage::FileStorage;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Client(#[from] ApiError),
    #[error("could not read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("not signed in; run `sentiboard login` first")]
    SignedOut,
    #[error("already signed in; run `sentiboard logout` first")]
    AlreadySignedIn,
    #[error("{0} is not available to this account")]
    Denied(&'static str),
    #[error("{0} failed")]
    Failed(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "sentiboard", about = "Sentiment analysis dashboard client")]
struct Cli {
    #[arg(long, env = "SENTIBOARD_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "SENTIBOARD_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        email: String,
        #[arg(long, env = "SENTIBOARD_PASSWORD")]
        password: String,
    },
    Register {
        name: String,
        email: String,
        #[arg(long, env = "SENTIBOARD_PASSWORD")]
        password: String,
    },
    Logout,
    /// Confirm the stored session with the server.
    Whoami,
    Dashboard,
    Analyze(AnalyzeCommand),
    Results(ResultsCommand),
    Admin,
}

#[derive(Args, Debug)]
struct AnalyzeCommand {
    #[command(subcommand)]
    command: AnalyzeSubcommand,
}

#[derive(Subcommand, Debug)]
enum AnalyzeSubcommand {
    Text { text: String },
    Csv { path: PathBuf },
}

#[derive(Args, Debug)]
struct ResultsCommand {
    #[command(subcommand)]
    command: ResultsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ResultsSubcommand {
    List {
        #[arg(long, default_value = "all")]
        filter: FilterState,
    },
    Delete {
        id: String,
    },
    Export {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = normalize_api_url(url)?;
    }
    if let Some(dir) = cli.state_dir {
        config.state_dir = dir;
    }

    let api = Arc::new(HttpApi::new(&config)?);
    let storage = Arc::new(FileStorage::new(config.state_dir.clone()));
    let app = App::new(config, api, storage);
    app.start().await;

    let result = run(&app, cli.command).await;
    app.handle_expiry().await;
    for notice in app.notices().drain() {
        eprintln!("{}", render::render_notice(&notice));
    }
    result
}

async fn run(app: &App, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            enter(app, Route::Login, View::Login, "login").await?;
            app.login(&email, &password).await.ok_or(CliError::Failed("login"))?;
            print_menu(app).await;
            Ok(())
        }
        Command::Register { name, email, password } => {
            enter(app, Route::Register, View::Register, "registration").await?;
            app.register(&name, &email, &password).await.ok_or(CliError::Failed("registration"))?;
            print_menu(app).await;
            Ok(())
        }
        Command::Logout => {
            app.logout().await;
            println!("Signed out");
            Ok(())
        }
        Command::Whoami => {
            let session = app.revalidate().await.ok_or(CliError::SignedOut)?;
            let role = if session.user.is_admin { "admin" } else { "user" };
            println!("{} <{}> ({role})", session.user.name, session.user.email);
            print_menu(app).await;
            Ok(())
        }
        Command::Dashboard => {
            let ctx = authorized(app, Route::Dashboard, View::Dashboard, "dashboard").await?;
            let mut dashboard = app.dashboard(ctx);
            println!("{}", render::render_dashboard(dashboard.load().await));
            Ok(())
        }
        Command::Analyze(analyze) => run_analyze(app, analyze).await,
        Command::Results(results) => run_results(app, results).await,
        Command::Admin => {
            let ctx = authorized(app, Route::Admin, View::Admin, "admin").await?;
            let mut admin = app.admin(ctx);
            println!("{}", render::render_admin(admin.load().await));
            Ok(())
        }
    }
}

async fn run_analyze(app: &App, analyze: AnalyzeCommand) -> Result<(), CliError> {
    let ctx = authorized(app, Route::Upload, View::Upload, "upload").await?;
    let ingest = app.ingestion(ctx);
    match analyze.command {
        AnalyzeSubcommand::Text { text } => {
            ingest.set_text(text).await;
            let record = ingest.submit_text().await.map_err(|_| CliError::Failed("analysis"))?;
            println!("{}", render::render_record(&record));
        }
        AnalyzeSubcommand::Csv { path } => {
            let file = CsvFile::open(&path).await.map_err(|source| CliError::ReadFile { path, source })?;
            ingest.select_file(Some(file)).await;
            let response = ingest.submit_csv().await.map_err(|_| CliError::Failed("upload"))?;
            if let Some(message) = response.message {
                println!("{message}");
            }
        }
    }

    // Follow the scheduled move to the analysis view.
    tokio::time::sleep(app.config().nav_delay + Duration::from_millis(10)).await;
    if app.render().await.1 == View::Analysis {
        let ctx = app.view_context().await.ok_or(CliError::SignedOut)?;
        let results = app.results(ctx);
        results.refresh().await;
        let state = results.snapshot().await;
        println!("\n{}", render::render_results(state.filter, &state.records));
    }
    Ok(())
}

async fn run_results(app: &App, results: ResultsCommand) -> Result<(), CliError> {
    let ctx = authorized(app, Route::Analysis, View::Analysis, "analysis").await?;
    let manager = app.results(ctx);
    match results.command {
        ResultsSubcommand::List { filter } => {
            manager.list(filter).await;
            let state = manager.snapshot().await;
            println!("{}", render::render_results(state.filter, &state.records));
        }
        ResultsSubcommand::Delete { id } => {
            if !manager.delete(&id).await {
                return Err(CliError::Failed("delete"));
            }
        }
        ResultsSubcommand::Export { out_dir } => {
            let dir = out_dir.unwrap_or_else(|| app.config().download_dir.clone());
            let path = manager.export(&dir).await.ok_or(CliError::Failed("export"))?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

/// Navigate to `route` and fail unless the guard renders `expected`.
async fn enter(app: &App, route: Route, expected: View, name: &'static str) -> Result<(), CliError> {
    let (_, view) = app.navigate(route.path()).await;
    if view == expected {
        return Ok(());
    }
    Err(match view {
        View::Login => CliError::SignedOut,
        _ if route.is_auth_view() => CliError::AlreadySignedIn,
        _ => CliError::Denied(name),
    })
}

async fn authorized(app: &App, route: Route, expected: View, name: &'static str) -> Result<ViewContext, CliError> {
    enter(app, route, expected, name).await?;
    app.view_context().await.ok_or(CliError::SignedOut)
}

async fn print_menu(app: &App) {
    let items = app.menu().await;
    if !items.is_empty() {
        println!("{}", render::render_menu(&items, &app.navigator().current()));
    }
}
