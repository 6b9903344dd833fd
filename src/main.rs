use anyhow::{Result, anyhow, bail};
use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use clap::{Parser, Subcommand};
use herald::VERSION;
use herald::config::{get_config_path, load_config};
use herald::events::StatusBus;
use herald::schedule::{
    JsonTaskStore, RepeatRule, RunStatus, ScheduleManager, ScheduleTask, TaskStatus, TaskStore,
};
use herald::session::ConsoleSession;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "herald",
    about = "herald: scheduled chat-room announcements with humanized pacing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the scheduler daemon (console transport stands in for a live session)
    Run {
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    Status,
    Version,
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ScheduleCommand {
    List {
        #[arg(short, long, default_value_t = false)]
        all: bool,
    },
    Add {
        /// Target rooms, comma separated, in send order
        #[arg(short, long, value_delimiter = ',')]
        rooms: Vec<String>,
        #[arg(short, long)]
        message: String,
        /// Raw 5-field rule, e.g. "30 9 * * 1,5"
        #[arg(long)]
        rule: Option<String>,
        /// Every day at HH:MM
        #[arg(long)]
        daily: Option<String>,
        /// Listed weekdays at HH:MM (requires --days)
        #[arg(long)]
        weekly: Option<String>,
        /// Weekday numbers for --weekly, 0 = Sunday
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Day of month at HH:MM (requires --day)
        #[arg(long)]
        monthly: Option<String>,
        #[arg(long)]
        day: Option<u32>,
        /// One time, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        once: Option<String>,
        #[arg(long, default_value_t = false)]
        disabled: bool,
    },
    Remove {
        task_id: String,
    },
    Enable {
        task_id: String,
        #[arg(long, default_value_t = false)]
        disable: bool,
    },
    /// Fire a task immediately, bypassing its schedule
    Run {
        task_id: String,
    },
    /// Send a message to a single room right now
    Test {
        room: String,
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { verbose } => cmd_run(verbose).await?,
        Commands::Status => cmd_status()?,
        Commands::Version => println!("herald v{VERSION}"),
        Commands::Schedule { command } => cmd_schedule(command).await?,
    }
    Ok(())
}

fn open_store() -> Result<Arc<JsonTaskStore>> {
    let config = load_config(None)?;
    Ok(Arc::new(JsonTaskStore::new(
        config.schedule.resolved_store_path()?,
    )))
}

async fn cmd_run(verbose: bool) -> Result<()> {
    let default_filter = if verbose { "herald=debug" } else { "herald=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = load_config(None)?;
    let store_path = config.schedule.resolved_store_path()?;
    let store = Arc::new(JsonTaskStore::new(store_path.clone()));

    // the console transport resolves every room the stored tasks reference;
    // a real deployment injects its chat session here instead
    let mut topics: Vec<String> = store
        .get_all()?
        .iter()
        .flat_map(|task| task.room_names.clone())
        .collect();
    topics.sort();
    topics.dedup();

    let bus = StatusBus::new(config.event_capacity());
    let session = Arc::new(ConsoleSession::new(topics));
    let manager = ScheduleManager::new(store, session, bus.sender());
    manager.init_from_store().await?;

    let summary = manager.status_summary().await;
    println!("herald scheduler running (store: {})", store_path.display());
    println!(
        "Tasks: {} total, {} armed, {} archived",
        summary["tasks"], summary["armed"], summary["archived"]
    );
    println!("Press Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = bus.consume() => {
                if let Some(update) = update {
                    match update.message {
                        Some(message) => println!("[{}] {:?}: {message}", update.task_id, update.status),
                        None => println!("[{}] {:?}", update.task_id, update.status),
                    }
                }
            }
        }
    }
    println!("Shutting down...");
    manager.shutdown().await;
    Ok(())
}

fn cmd_status() -> Result<()> {
    let config = load_config(None)?;
    let store_path = config.schedule.resolved_store_path()?;
    let store = JsonTaskStore::new(store_path.clone());
    let tasks = store.get_all()?;
    let archived = tasks.iter().filter(|t| t.archived).count();
    let enabled = tasks.iter().filter(|t| t.enabled && !t.archived).count();

    println!("herald v{VERSION}");
    println!("Config: {}", get_config_path()?.display());
    println!("Store: {}", store_path.display());
    println!(
        "Tasks: {} total, {enabled} enabled, {archived} archived",
        tasks.len()
    );
    Ok(())
}

async fn cmd_schedule(command: ScheduleCommand) -> Result<()> {
    let store = open_store()?;
    match command {
        ScheduleCommand::List { all } => {
            let mut tasks = store.get_all()?;
            tasks.retain(|t| all || !t.archived);
            tasks.sort_by_key(|t| t.created_at);
            if tasks.is_empty() {
                println!("No scheduled tasks");
                return Ok(());
            }
            for task in tasks {
                print_task(&task);
            }
        }
        ScheduleCommand::Add {
            rooms,
            message,
            rule,
            daily,
            weekly,
            days,
            monthly,
            day,
            once,
            disabled,
        } => {
            if rooms.is_empty() {
                bail!("at least one room is required");
            }
            let rule = build_rule(rule, daily, weekly, days, monthly, day, once)?;
            let mut task = ScheduleTask::new(rooms, message, &rule);
            task.enabled = !disabled;

            let mut tasks = store.get_all()?;
            println!("Added task {} ({})", task.id, task.repeat_rule);
            if let Some(next) = rule.next_occurrence(Local::now()) {
                println!("Next occurrence: {}", next.format("%Y-%m-%d %H:%M"));
            }
            tasks.push(task);
            store.replace_all(&tasks)?;
        }
        ScheduleCommand::Remove { task_id } => {
            let mut tasks = store.get_all()?;
            let before = tasks.len();
            tasks.retain(|t| t.id != task_id);
            if tasks.len() == before {
                println!("No task {task_id}");
            } else {
                store.replace_all(&tasks)?;
                println!("Removed task {task_id}");
            }
        }
        ScheduleCommand::Enable { task_id, disable } => {
            let enabled = !disable;
            let mut tasks = store.get_all()?;
            let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
                println!("No task {task_id}");
                return Ok(());
            };
            task.enabled = enabled;
            if enabled && !task.archived {
                task.status = TaskStatus::Pending;
            }
            store.replace_all(&tasks)?;
            println!(
                "{} task {task_id}",
                if enabled { "Enabled" } else { "Disabled" }
            );
        }
        ScheduleCommand::Run { task_id } => {
            let tasks = store.get_all()?;
            let Some(task) = tasks.iter().find(|t| t.id == task_id) else {
                println!("No task {task_id}");
                return Ok(());
            };
            let bus = StatusBus::new(8);
            let session = Arc::new(ConsoleSession::new(task.room_names.clone()));
            let manager = ScheduleManager::new(store.clone(), session, bus.sender());
            manager.load_from_store().await?;
            manager.run_task_now(&task_id).await?;

            let after = manager
                .get_tasks(true)
                .await
                .into_iter()
                .find(|t| t.id == task_id);
            match after {
                Some(task) if task.last_status == Some(RunStatus::Success) => {
                    println!("Task {task_id} delivered");
                }
                Some(task) => {
                    println!("Task {task_id} failed: {}", task.error.unwrap_or_default());
                }
                None => println!("Task {task_id} no longer exists"),
            }
            manager.shutdown().await;
        }
        ScheduleCommand::Test { room, message } => {
            let bus = StatusBus::new(8);
            let session = Arc::new(ConsoleSession::new(vec![room.clone()]));
            let manager = ScheduleManager::new(store, session, bus.sender());
            let outcome = manager.test_direct_send(&room, &message).await;
            if outcome.success {
                println!("Sent to {room}");
            } else {
                println!("Send failed: {}", outcome.error.unwrap_or_default());
            }
        }
    }
    Ok(())
}

fn print_task(task: &ScheduleTask) {
    let state = if task.archived {
        "archived"
    } else {
        match task.status {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    };
    let toggle = if task.enabled { "on " } else { "off" };
    println!(
        "{}  [{toggle}] [{state}]  {}  -> {}",
        task.id,
        task.repeat_rule,
        task.room_names.join(", ")
    );
    if let Some(last) = task.last_run {
        let outcome = match task.last_status {
            Some(RunStatus::Success) => "success",
            Some(RunStatus::Failed) => "failed",
            None => "unknown",
        };
        println!("    last run {} ({outcome})", last.format("%Y-%m-%d %H:%M"));
    }
    if let Some(error) = &task.error {
        println!("    error: {error}");
    }
    if task.enabled && !task.archived && task.status == TaskStatus::Pending {
        if let Ok(rule) = task.repeat_rule.parse::<RepeatRule>() {
            if let Some(next) = rule.next_occurrence(Local::now()) {
                println!("    next {}", next.format("%Y-%m-%d %H:%M"));
            }
        }
    }
}

fn build_rule(
    rule: Option<String>,
    daily: Option<String>,
    weekly: Option<String>,
    days: Vec<u8>,
    monthly: Option<String>,
    day: Option<u32>,
    once: Option<String>,
) -> Result<RepeatRule> {
    if let Some(raw) = rule {
        return raw.parse();
    }
    if let Some(time) = daily {
        let (hour, minute) = parse_time(&time)?;
        return Ok(RepeatRule::daily(hour, minute));
    }
    if let Some(time) = weekly {
        if days.is_empty() {
            bail!("--weekly requires --days");
        }
        let (hour, minute) = parse_time(&time)?;
        return Ok(RepeatRule::weekly(days, hour, minute));
    }
    if let Some(time) = monthly {
        let day = day.ok_or_else(|| anyhow!("--monthly requires --day"))?;
        let (hour, minute) = parse_time(&time)?;
        return Ok(RepeatRule::monthly_day(day, hour, minute));
    }
    if let Some(datetime) = once {
        let parsed = NaiveDateTime::parse_from_str(&datetime, "%Y-%m-%d %H:%M")
            .map_err(|err| anyhow!("expected \"YYYY-MM-DD HH:MM\": {err}"))?;
        return Ok(RepeatRule::once(
            parsed.month(),
            parsed.day(),
            parsed.hour(),
            parsed.minute(),
        ));
    }
    bail!("one of --rule, --daily, --weekly, --monthly, --once is required")
}

fn parse_time(raw: &str) -> Result<(u32, u32)> {
    let (hour, minute) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("expected HH:MM, got {raw:?}"))?;
    Ok((hour.parse()?, minute.parse()?))
}
