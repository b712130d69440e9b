//! Line-oriented planner shell.
//!
//! Reads commands from stdin, drives a `PlannerSession`, and ticks its
//! deferred actions while waiting for input. The database, settings and logs
//! live next to the executable.

mod command;
mod shell;

use log::info;
use planner_core::settings::{app_folder, db_path, log_dir};
use planner_core::{core_version, init_logging, PlannerSession, PlannerSettings, SqliteStore};
use shell::{run_shell, spawn_stdin_reader};
use std::error::Error;
use std::io;

fn main() -> Result<(), Box<dyn Error>> {
    let app_dir = app_folder()?;
    let settings = PlannerSettings::load(&app_dir)?;
    if let Err(err) = init_logging(&settings.log_level, &log_dir(&app_dir)) {
        eprintln!("logging disabled: {err}");
    }

    let store = SqliteStore::open(db_path(&app_dir, &settings))?;
    let mut session = PlannerSession::with_settings(store, &settings)?;
    println!("planner {} - type `help` for commands", core_version());

    let lines = spawn_stdin_reader();
    run_shell(&mut session, &lines, &mut io::stdout())?;

    session.shutdown()?.close()?;
    info!("event=app_exit module=cli status=ok");
    Ok(())
}
