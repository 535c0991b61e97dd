//! Command-line front end for the schedule Mini App client.
//!
//! Runs the same bootstrap as the embedded app. The session is kept in the
//! configured `storage_dir`, so init data is only needed for the first run.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use schedule_miniapp::{
    api::{HomeworkQuery, HomeworkStatus},
    bootstrap::{LaunchContext, LaunchParams},
    gate::Screen,
    screens::{ScreenState, SlotEntry},
    ClientConfig, ClientError, MiniApp, Result,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schedule-cli")]
#[command(about = "University schedule from the terminal")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/schedule.toml")]
    config: PathBuf,

    /// Raw init data issued by the host, used when no session is stored
    #[arg(long, env = "SCHEDULE_INIT_DATA")]
    init_data: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the signed-in user
    Whoami,
    /// Show the lessons of one day
    Day {
        /// Date as YYYY-MM-DD, today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List homework
    Homework {
        #[arg(long, value_enum, default_value_t = StatusArg::Actual)]
        status: StatusArg,
        /// Subject filter, at least three characters
        #[arg(long)]
        search: Option<String>,
    },
    /// Forget the stored session
    Logout,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Actual,
    Expired,
}

impl From<StatusArg> for HomeworkStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Actual => HomeworkStatus::Actual,
            StatusArg::Expired => HomeworkStatus::Expired,
        }
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = ClientConfig::load(Some(&args.config))?;
    let app = MiniApp::from_config(config)?;

    if let Command::Logout = args.command {
        app.clear_local_data();
        println!("Session cleared.");
        return Ok(());
    }

    sign_in(&app, args.init_data).await?;

    match args.command {
        Command::Whoami => whoami(&app),
        Command::Day { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            day(&app, date).await
        }
        Command::Homework { status, search } => {
            let query = HomeworkQuery {
                status: Some(status.into()),
                week: None,
                subject_search: search.unwrap_or_default(),
            };
            homework(&app, query).await
        }
        Command::Logout => Ok(()),
    }?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn sign_in(app: &MiniApp, init_data: Option<String>) -> Result<()> {
    let launch = match init_data {
        Some(raw) => LaunchContext::Present(LaunchParams::with_init_data(raw)),
        // A stored token needs no init data.
        None if app.session().is_authenticated() => LaunchContext::Present(LaunchParams::default()),
        None => LaunchContext::Missing,
    };
    app.launch(launch).await;

    match app.screen() {
        Screen::Content => Ok(()),
        Screen::InvalidEnvironment => Err(ClientError::environment(
            "no valid session; pass fresh --init-data from the Mini App",
        )),
        Screen::Blocked => Err(ClientError::auth(
            "this account is blocked; run `schedule-cli logout` to clear local data",
        )),
        Screen::Onboarding => Err(ClientError::environment(
            "no group selected; choose one in the Mini App first",
        )),
        Screen::Loading => Err(ClientError::auth("sign-in did not complete")),
    }
}

fn whoami(app: &MiniApp) -> Result<()> {
    let user = app
        .session()
        .user()
        .ok_or_else(|| ClientError::internal("no profile loaded"))?;
    println!("{} ({})", user.display_name(), user.telegram_id);
    if let Some(group) = user.group_name.as_deref() {
        println!("group: {group}");
    }
    if user.is_admin {
        println!("role: admin");
    }
    Ok(())
}

async fn day(app: &MiniApp, date: NaiveDate) -> Result<()> {
    let slots = match app.schedule(date).load().await {
        ScreenState::Ready(slots) => slots,
        ScreenState::Failed { message } => return Err(ClientError::internal(message)),
        ScreenState::Loading => return Ok(()),
    };

    println!("{date}");
    if slots.is_empty() {
        println!("  no lessons");
    }
    for slot in slots {
        match &slot.entry {
            SlotEntry::Single(lesson) => println!(
                "  {}  {} ({}) {}, {}",
                slot.label,
                lesson.subject_name,
                lesson.lesson_type,
                lesson.tutor.name,
                lesson.auditory.name
            ),
            SlotEntry::Options(lessons) => {
                println!("  {}  one of:", slot.label);
                for lesson in lessons {
                    println!(
                        "      {} {}, {}",
                        lesson.subject_name, lesson.tutor.name, lesson.auditory.name
                    );
                }
            }
        }
    }
    Ok(())
}

async fn homework(app: &MiniApp, query: HomeworkQuery) -> Result<()> {
    let mut feed = app.homework_feed();
    if let ScreenState::Failed { message } = feed.apply(query).await {
        return Err(ClientError::internal(message));
    }
    while feed.has_more() {
        feed.on_sentinel_visible().await?;
    }

    let mut empty = true;
    for item in feed.items() {
        empty = false;
        println!(
            "{} {}: {} ({})",
            item.lesson.date,
            item.lesson.subject_name,
            item.content,
            item.author.display_name()
        );
    }
    if empty {
        println!("no homework");
    }
    Ok(())
}
