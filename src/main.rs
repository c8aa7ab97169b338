use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

mod chat;
mod error;
mod flow;
mod goal;
mod group;
mod gui;
mod layout;
mod mentor;
mod plan;
mod resources;
mod settings;
mod theme;

use flow::{Outcome, View};
use goal::{parse_level, GoalForm, LEVEL_OPTIONS};
use layout::{DashboardLayout, Panel};
use mentor::Mentor;
use settings::{default_base_path, ensure_base_folders, load_or_init_settings, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "study-mentor",
    version,
    about = "Study Mentor shell (local-first, offline)"
)]
struct CliArgs {
    /// Choose GUI (default) or CLI mode
    #[arg(long, value_enum, default_value = "gui")]
    mode: RunMode,
    /// Override data base path (defaults to ./data next to the exe)
    #[arg(long)]
    base_path: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RunMode {
    Gui,
    Cli,
}

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(args) {
        eprintln!("study-mentor error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    init_tracing(args.verbose)?;

    let base_path = args.base_path.unwrap_or_else(default_base_path);
    ensure_base_folders(&base_path)
        .with_context(|| format!("failed to create base folders at {}", base_path.display()))?;

    let mut settings = load_or_init_settings(&base_path).context("failed to load settings")?;
    settings.base_path = base_path.to_string_lossy().to_string();
    settings.mode = match args.mode {
        RunMode::Gui => "gui".to_string(),
        RunMode::Cli => "cli".to_string(),
    };
    info!(path = %base_path.display(), mode = %settings.mode, "starting study mentor");

    let layout = DashboardLayout::bind(&settings.ui.dashboard_panels)
        .context("failed to bind dashboard views")?;
    let mentor = Mentor::from_config(&settings.mentor).context("failed to start mentor")?;

    match args.mode {
        RunMode::Gui => gui::launch_gui(base_path, settings, mentor, layout)
            .map_err(|e| anyhow::anyhow!("failed to start GUI: {e}")),
        RunMode::Cli => {
            run_cli(&settings, mentor, &layout, &base_path);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("STUDY_MENTOR_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

fn run_cli(settings: &Settings, mut mentor: Mentor, layout: &DashboardLayout, base_path: &Path) {
    println!("Study Mentor CLI starting up");
    println!("Base path: {}", base_path.display());
    println!("Type 'exit' at any prompt to quit.\n");

    if !run_onboarding(&mut mentor) {
        println!("Goodbye");
        return;
    }

    print_dashboard(&mentor, layout);
    print_help();

    // pending replies and searches finish on their own; never wait longer than this
    let patience = Duration::from_millis(
        settings
            .mentor
            .reply_delay_ms
            .max(settings.mentor.group_search_delay_ms)
            + 5_000,
    );

    loop {
        print!("You (or command): ");
        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Error reading input. Exiting.");
            break;
        }

        // late results from an earlier timed-out wait come out first
        print_pending(&mut mentor);

        let input = input.trim();
        match input.to_lowercase().as_str() {
            "exit" => {
                println!("Goodbye");
                break;
            }
            "help" => print_help(),
            "plan" => print_panel(&mentor, Panel::Plan),
            "resources" => print_panel(&mentor, Panel::Resources),
            "group" => print_panel(&mentor, Panel::Group),
            "find" => match mentor.find_group() {
                Ok(()) => {
                    println!("Looking for a study group...");
                    wait_and_print(&mut mentor, patience);
                }
                Err(e) => println!("{}", e.user_message()),
            },
            "create" => match mentor.create_group() {
                Ok(group) => {
                    println!("\n{group}\n");
                    if let Some(alert) = mentor.controller_mut().take_alert() {
                        println!("{}\n", alert.message);
                    }
                }
                Err(e) => println!("{}", e.user_message()),
            },
            "" => continue,
            _ => {
                if mentor.send_chat(input) {
                    wait_and_print(&mut mentor, patience);
                }
            }
        }
    }
}

/// Prompts until a goal is accepted. Returns false if the user quit.
fn run_onboarding(mentor: &mut Mentor) -> bool {
    println!("Let's set your study goal.");
    while mentor.controller().view() == View::Onboarding {
        let Some(subject) = prompt("Subject", "") else {
            return false;
        };
        let Some(target_grade) = prompt("Target grade", "") else {
            return false;
        };
        let current_level = loop {
            let Some(raw) = prompt(
                &format!("Current level ({})", LEVEL_OPTIONS.join("/")),
                "",
            ) else {
                return false;
            };
            match parse_level(&raw) {
                Some(level) => break level.to_string(),
                None => println!("Please pick one of: {}", LEVEL_OPTIONS.join(", ")),
            }
        };

        let form = GoalForm::new(subject, target_grade, current_level);
        if mentor.submit_goal(&form).is_err() {
            if let Some(alert) = mentor.controller_mut().take_alert() {
                println!("{}\n", alert.message);
            }
        }
    }
    true
}

fn wait_and_print(mentor: &mut Mentor, patience: Duration) {
    match mentor.wait_event(patience) {
        Some(outcome) => print_outcome(mentor, outcome),
        None => warn!("timed out waiting for the mentor"),
    }
}

fn print_pending(mentor: &mut Mentor) {
    for outcome in mentor.pump() {
        print_outcome(mentor, outcome);
    }
}

fn print_outcome(mentor: &mut Mentor, outcome: Outcome) {
    match outcome {
        Outcome::BotReplied(reply) => println!("Mentor: {reply}\n"),
        Outcome::GroupMatched(group) => println!("\nMatched a study group!\n{group}\n"),
        Outcome::Failed(err) => {
            warn!(%err, "mentor task failed");
            let message = mentor
                .controller_mut()
                .take_alert()
                .map(|alert| alert.message)
                .unwrap_or_else(|| err.user_message());
            println!("{message}\n");
        }
    }
}

fn print_dashboard(mentor: &Mentor, layout: &DashboardLayout) {
    if let Some(session) = mentor.controller().session() {
        println!(
            "\n=== {} study plan (target {}, level {}) ===\n",
            session.goal.subject(),
            session.goal.target_grade(),
            session.goal.current_level()
        );
    }
    for panel in layout.panels() {
        print_panel(mentor, *panel);
    }
}

fn print_panel(mentor: &Mentor, panel: Panel) {
    let Some(session) = mentor.controller().session() else {
        return;
    };
    println!("--- {} ---", panel.title());
    match panel {
        Panel::Plan => print!("{}", session.plan),
        Panel::Resources => {
            for resource in &session.resources {
                println!("{resource}");
            }
        }
        Panel::Group => match &session.group {
            Some(group) => println!("{group}"),
            None => println!("No group yet. Type 'find' or 'create'."),
        },
        Panel::Chat => println!("Type any question to ask your mentor."),
    }
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  plan        show the study plan");
    println!("  resources   show study resources");
    println!("  group       show your study group");
    println!("  find        find a study group");
    println!("  create      create a new study group");
    println!("  help        show this list");
    println!("  exit");
    println!("Anything else is sent to your mentor.\n");
}

/// Reads one line. `None` on EOF, read error or `exit`.
fn prompt(field: &str, default_val: &str) -> Option<String> {
    if default_val.is_empty() {
        print!("{field}: ");
    } else {
        print!("{field} [{default_val}]: ");
    }
    io::stdout().flush().ok();

    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => return None,
        Ok(_) => {}
    }
    let trimmed = buf.trim();
    if trimmed.eq_ignore_ascii_case("exit") {
        None
    } else if trimmed.is_empty() {
        Some(default_val.to_string())
    } else {
        Some(trimmed.to_string())
    }
}
