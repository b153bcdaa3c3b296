mod cli;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use cli::{Cli, Command, TargetCommand};
use uptrack::UptimeService;
use uptrack::app::{SchedulerHandle, build_service};
use uptrack::config::Config;
use uptrack::database::NewTarget;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref())?;

    let command = match cli.command.unwrap_or(Command::Run) {
        Command::Config => {
            print!("{config}");
            return Ok(());
        }
        command => command,
    };

    let service = build_service(&config).await?;

    match command {
        Command::Run => run(&service, &config).await?,
        Command::Check { url } => print_json(&service.check_now(&url).await?)?,
        Command::Target { action } => target_command(&service, action).await?,
        Command::History { id } => print_json(&service.get_history(id).await?)?,
        Command::Stats { id } => print_json(&service.get_stats(id).await?)?,
        Command::Status { id } => print_json(&service.current_status(id).await?)?,
        Command::Log { id } => print_json(&service.raw_log(id).await?)?,
        Command::Telemetry { id, status } => service.record_telemetry(id, status).await?,
        Command::Config => print!("{config}"),
    }

    Ok(())
}

async fn run(service: &UptimeService, config: &Config) -> Result<()> {
    info!("{config}");
    let scheduler = SchedulerHandle::spawn(service, config);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    scheduler.shutdown().await
}

async fn target_command(service: &UptimeService, action: TargetCommand) -> Result<()> {
    match action {
        TargetCommand::Add { url, name, usage, interval, private } => {
            let target = service
                .add_target(NewTarget { url, name, usage, interval_minutes: interval, is_private: private })
                .await?;
            print_json(&target)
        }
        TargetCommand::List => print_json(&service.overview().await?),
        TargetCommand::Update { id, url, name, usage, interval, private } => {
            let mut target = service.get_target(id).await?;
            if let Some(url) = url {
                target.url = url;
            }
            if let Some(name) = name {
                target.name = name;
            }
            if let Some(usage) = usage {
                target.usage = usage;
            }
            if let Some(interval) = interval {
                target.interval_minutes = interval;
            }
            if let Some(private) = private {
                target.is_private = private;
            }
            service.update_target(&target).await?;
            print_json(&target)
        }
        TargetCommand::Remove { id } => Ok(service.remove_target(id).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
