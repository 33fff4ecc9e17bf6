//! Pong Club entry point
//!
//! Menus run on the plain terminal; a match takes over the screen until the
//! players press Escape.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use std::rc::Rc;
use std::time::Duration;

use pong_club::history::{HistoryReporter, format_when};
use pong_club::platform::prompt::{LineShell, choose, prompt_line, prompt_password};
use pong_club::platform::{MessageKind, Presenter, TerminalShell, report_auth, run_match};
use pong_club::{CredentialStore, MatchEngine, Session, Settings};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    if !Settings::default_path().exists() {
        if let Err(err) = Settings::default().save() {
            warn!("Cannot write default settings: {}", err);
        }
    }
    let settings = Settings::load();
    info!(
        "Pong Club starting, database at {}",
        settings.database_path.display()
    );

    let store = CredentialStore::open(&settings.database_path).with_context(|| {
        format!(
            "cannot open database {}",
            settings.database_path.display()
        )
    })?;
    let mut session = Session::new(Rc::new(store), settings.rules(), settings.labels());
    let mut ui = LineShell;

    loop {
        let keep_going = if session.is_logged_in() {
            account_menu(&mut ui, &mut session, &settings)?
        } else {
            main_menu(&mut ui, &mut session, &settings)?
        };
        if !keep_going {
            break;
        }
    }

    info!("Pong Club exiting");
    Ok(())
}

/// Returns false when the player quits
fn main_menu(ui: &mut LineShell, session: &mut Session, settings: &Settings) -> Result<bool> {
    match choose("Pong Club", &["Login", "Register", "Guest match", "Quit"])? {
        Some(0) => login(ui, session)?,
        Some(1) => register(ui, session)?,
        Some(2) => {
            let mut engine = MatchEngine::guest(settings.rules(), settings.labels());
            play(&mut engine, settings)?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn account_menu(
    ui: &mut LineShell,
    session: &mut Session,
    settings: &Settings,
) -> Result<bool> {
    let title = format!("Logged in as {}", session.username().unwrap_or_default());
    match choose(&title, &["Play", "History", "Logout"])? {
        Some(0) => {
            if let Some(engine) = session.engine_mut() {
                play(engine, settings)?;
            }
        }
        Some(1) => {
            if let Some(history) = session.history() {
                show_history(&history)?;
            }
        }
        Some(2) => {
            session.logout();
            ui.show_message(MessageKind::Info, "Logged out.")?;
        }
        _ => {
            session.logout();
            return Ok(false);
        }
    }
    Ok(true)
}

fn login(ui: &mut LineShell, session: &mut Session) -> Result<()> {
    let Some(username) = prompt_line("Username: ")? else {
        return Ok(());
    };
    let Some(password) = prompt_password("Password: ")? else {
        return Ok(());
    };
    if report_auth(ui, session.login(&username, &password))? {
        ui.show_message(MessageKind::Info, &format!("Welcome, {}!", username.trim()))?;
    }
    Ok(())
}

fn register(ui: &mut LineShell, session: &Session) -> Result<()> {
    let Some(username) = prompt_line("Choose a username: ")? else {
        return Ok(());
    };
    let Some(password) = prompt_password("Password: ")? else {
        return Ok(());
    };
    let Some(confirm) = prompt_password("Confirm password: ")? else {
        return Ok(());
    };
    if report_auth(ui, session.register(&username, &password, &confirm))? {
        ui.show_message(
            MessageKind::Info,
            "Registration successful! You can now log in.",
        )?;
    }
    Ok(())
}

fn play(engine: &mut MatchEngine, settings: &Settings) -> Result<()> {
    {
        let mut shell = TerminalShell::enter(engine.labels().clone(), settings.keys)?;
        run_match(
            engine,
            &mut shell,
            &settings.keys,
            Duration::from_millis(settings.tick_ms),
        )?;
    }
    // Leaving mid-rally freezes the match; Space resumes it on the next visit
    engine.pause();
    Ok(())
}

fn show_history(history: &HistoryReporter) -> Result<()> {
    let matches = history.list_matches()?;
    println!();
    println!("Match history for {}", history.username());
    if matches.is_empty() {
        println!("  No matches played yet.");
        return Ok(());
    }

    let now = Utc::now();
    println!("  {:<12} {:>7}  Winner", "When", "Score");
    for m in &matches {
        println!(
            "  {:<12} {:>3}-{:<3}  {}",
            format_when(m.when, now),
            m.score1,
            m.score2,
            m.winner
        );
    }

    let totals = history.totals()?;
    println!(
        "  Played {}  Won {}  Lost {}",
        totals.played, totals.wins, totals.losses
    );
    Ok(())
}
