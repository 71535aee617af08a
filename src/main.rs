use anyhow::{bail, Context};
use clap::Parser;
use contact_intake::adapters::http::{self, AppState};
use contact_intake::config::LogFormat;
use contact_intake::utils::error::ErrorSeverity;
use contact_intake::utils::{logger, validation::Validate};
use contact_intake::{
    AppConfig, CliArgs, Command, ContactStore, CsvSource, ImportEngine, Ingestor, IntakeError,
    MemoryStore, MySqlStore,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = CliArgs::parse();

    let mut config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    args.apply_overrides(&mut config);

    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("Starting contact-intake");

    if let Err(e) = run(args.command, config).await {
        let intake = e.downcast_ref::<IntakeError>();
        tracing::error!("❌ {:#}", e);
        if let Some(intake) = intake {
            tracing::error!(
                "Category: {:?}, Severity: {:?}",
                intake.category(),
                intake.severity()
            );
            eprintln!("❌ {}", intake.user_friendly_message());
            eprintln!("💡 Suggestion: {}", intake.recovery_suggestion());
        } else {
            eprintln!("❌ {:#}", e);
        }

        let exit_code = match intake.map(IntakeError::severity) {
            Some(ErrorSeverity::Low) => 0,
            Some(ErrorSeverity::Medium) => 2,
            Some(ErrorSeverity::High) | None => 1,
            Some(ErrorSeverity::Critical) => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(command: Command, config: AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Serve { .. } => {
            config.validate()?;
            serve(&config).await
        }
        Command::Import { dry_run, .. } => {
            if dry_run {
                contact_intake::utils::validation::validate_path(
                    "import.csv_path",
                    &config.import.csv_path,
                )?;
            } else {
                config.validate()?;
            }
            import(&config, dry_run).await
        }
        Command::CheckDb => {
            config.validate()?;
            check_db(&config).await
        }
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<MySqlStore> {
    let store = MySqlStore::connect(&config.database)
        .await
        .context("Database connection failed")?;
    if !store.check_connection().await? {
        bail!("Database check failed.");
    }
    tracing::info!("Database connection: OK");
    Ok(store)
}

async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let store = connect(config).await?;
    store
        .ensure_schema()
        .await
        .context("Database schema check failed")?;

    let addr = config.server.socket_addr()?;
    http::serve(addr, AppState::new(Arc::new(store))).await?;
    Ok(())
}

async fn import(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let source = CsvSource::open(&config.import.csv_path)?;

    let result = if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written to the database");
        let engine = ImportEngine::new(Ingestor::new(Arc::new(MemoryStore::new())));
        engine.run(source).await?
    } else {
        let store = Arc::new(connect(config).await?);
        store
            .ensure_schema()
            .await
            .context("Database schema check failed")?;

        let engine = ImportEngine::new(Ingestor::new(store.clone()));
        let result = engine.run(source).await;
        store.close().await;
        result.context("Import failed")?
    };

    println!("✅ CSV import complete.");
    println!("Valid rows: {}", result.valid_count);
    println!("Invalid rows: {}", result.invalid_count);
    println!("Inserted rows: {}", result.inserted_count);
    Ok(())
}

async fn check_db(config: &AppConfig) -> anyhow::Result<()> {
    let store = connect(config).await?;
    store.close().await;
    println!("✅ DB connected: table `{}`", store.table());
    Ok(())
}
