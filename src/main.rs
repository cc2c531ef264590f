use clap::Parser;
use std::io;
use warehouse_admin::app::commands::{self, ProblemsRequest};
use warehouse_admin::config::Command;
use warehouse_admin::utils::error::{ErrorSeverity, Result};
use warehouse_admin::utils::logger;
use warehouse_admin::{AdminConfig, CliConfig, EntityKind, HttpApi, LogNotifier};

async fn run(command: Command, config: &AdminConfig) -> Result<()> {
    let api = HttpApi::new(&config.api)?;
    let notifier = LogNotifier;
    let out = io::stdout().lock();

    match command {
        Command::Problems {
            page,
            page_size,
            title,
            difficulty,
            has_checker,
            format,
        } => {
            let request = ProblemsRequest {
                page,
                page_size,
                title,
                difficulty,
                has_checker,
            };
            commands::problems(&api, &config.table, &request, format, out).await
        }
        Command::Resources => commands::resources(out),
        Command::Search {
            resource,
            term,
            format,
        } => {
            let kind = EntityKind::parse(&resource)?;
            commands::search(&api, kind, &term, format, out).await
        }
        Command::Show {
            resource,
            id,
            format,
        } => {
            let kind = EntityKind::parse(&resource)?;
            commands::show(&api, kind, id, format, out).await
        }
        Command::Create {
            resource,
            set,
            format,
        } => {
            let kind = EntityKind::parse(&resource)?;
            let assignments = parse_assignments(&set)?;
            commands::create(&api, &notifier, kind, &assignments, format, out).await?;
            Ok(())
        }
        Command::Update {
            resource,
            id,
            set,
            format,
        } => {
            let kind = EntityKind::parse(&resource)?;
            let assignments = parse_assignments(&set)?;
            commands::update(&api, &notifier, kind, id, &assignments, format, out).await?;
            Ok(())
        }
    }
}

fn parse_assignments(set: &[String]) -> Result<Vec<(String, serde_json::Value)>> {
    set.iter().map(|s| commands::parse_assignment(s)).collect()
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("Command: {:?}", cli.command);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::debug!("📡 Using API at {}", config.api.base_url);

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }
}
