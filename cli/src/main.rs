//! CLI entrypoint for roundtable
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use roundtable_application::{
    AttachDocumentUseCase, ConversationLogger, RunRoundUseCase, SessionService,
};
use roundtable_domain::SessionCommand;
use roundtable_infrastructure::{
    ConfigLoader, FileConfig, JsonFileSessionStorage, JsonlConversationLogger, OpenAiGateway,
    OpenAiGatewayConfig, TextFileIngestor,
};
use roundtable_presentation::{ChatRepl, Cli, ConsoleFormatter, ReplConfig, resolve_session_id};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Stderr logging by verbosity. With `-v` or more, also a daily log file in
/// `log_dir`. The guard must live until exit.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let appender = log_dir.filter(|_| verbose > 0).and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("roundtable")
            .filename_suffix("log")
            .build(dir)
            .ok()
    });
    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    if cli.no_config {
        return Ok(ConfigLoader::load_defaults());
    }
    ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let _log_guard = init_logging(cli.verbose, config.logging.resolve_log_dir().as_deref());
    info!("Starting roundtable");

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config: {}", issue);
        }
        bail!("Invalid configuration ({} issue(s))", issues.len());
    }

    // === Dependency Injection ===
    let roster = Arc::new(config.roster.to_roster()?);

    let sessions_path = config
        .storage
        .resolve_sessions_path()
        .context("Could not determine where to store sessions; set [storage] sessions_path")?;
    let storage = Arc::new(JsonFileSessionStorage::new(sessions_path));
    let sessions = Arc::new(SessionService::open(storage, &roster)?);

    if cli.list_sessions {
        println!("{}", ConsoleFormatter::format_session_list(&sessions.snapshot()));
        return Ok(());
    }

    if let Some(needle) = &cli.session {
        let Some(id) = resolve_session_id(&sessions.snapshot(), needle) else {
            bail!("No session matches '{}'", needle);
        };
        sessions.apply(SessionCommand::SwitchActive(id))?;
    } else if cli.new_session {
        sessions.create_session("")?;
    }

    let gateway_config = OpenAiGatewayConfig::from_file(&config.gateway);
    if gateway_config.api_key.is_none() {
        warn!(
            "No API key found (checked {} and [gateway] api_key)",
            config.gateway.api_key_env
        );
    }
    let gateway = Arc::new(OpenAiGateway::new(gateway_config, roster.clone()));

    let mut rounds = RunRoundUseCase::new(gateway, sessions.clone(), roster.clone())
        .with_config(config.behavior.to_behavior_config());

    if config.logging.conversation_log
        && let Some(dir) = config.logging.resolve_log_dir()
        && let Some(logger) = JsonlConversationLogger::in_dir(&dir, chrono::Local::now())
    {
        info!("Conversation log: {}", logger.path().display());
        let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
        rounds = rounds.with_conversation_logger(logger);
    }

    let attach = AttachDocumentUseCase::new(Arc::new(TextFileIngestor::new()), sessions.clone());

    let repl_config = ReplConfig {
        show_progress: config.repl.show_progress && !cli.quiet,
        history_file: config.repl.resolve_history_file(),
    };
    let repl = ChatRepl::new(rounds, attach, roster).with_config(repl_config);

    repl.attach_all(&cli.attach);
    if cli.new_session {
        repl.start_active().await;
    }

    repl.run().await?;
    Ok(())
}
