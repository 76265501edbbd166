use clap::Parser;
use kas_hima::args::{Args, Command};
use kas_hima::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().kas_home().path();

    // This allows for running the program without a network connection. When
    // KAS_HIMA_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.endpoint(),
            init_args.secret_key(),
            init_args.pin(),
            init_args.history_limit(),
        )
        .await?
        .print(),

        Command::Login(login_args) => commands::login(Config::load(home).await?, login_args.pin())
            .await?
            .print(),

        Command::Logout => commands::logout(Config::load(home).await?).await?.print(),

        Command::Theme(theme_args) => commands::theme(Config::load(home).await?, theme_args.choice())
            .await?
            .print(),

        Command::Ping => commands::ping(Config::load(home).await?, mode).await?.print(),

        Command::Classes => commands::classes(Config::load(home).await?, mode).await?.print(),

        Command::Members(members_args) => {
            commands::members(Config::load(home).await?, mode, members_args.clone())
                .await?
                .print()
        }

        Command::History(history_args) => {
            commands::history(Config::load(home).await?, mode, history_args.clone())
                .await?
                .print()
        }

        Command::Dues(dues_args) => commands::dues(Config::load(home).await?, mode, dues_args.clone())
            .await?
            .print(),

        Command::Expense(expense_args) => {
            commands::expense(Config::load(home).await?, mode, expense_args.clone())
                .await?
                .print()
        }

        Command::OtherIncome(other_args) => {
            commands::other_income(Config::load(home).await?, mode, other_args.clone())
                .await?
                .print()
        }

        Command::Edit(edit_args) => commands::edit(Config::load(home).await?, mode, edit_args.clone())
            .await?
            .print(),

        Command::Delete(delete_args) => {
            commands::delete(Config::load(home).await?, mode, delete_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "kas_hima={},{}={}",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
