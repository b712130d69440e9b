//! Command loop over a channel of input lines.
//!
//! Stdin is read on its own thread so the loop can wait for input and for
//! the session's next deadline at the same time. A debounced edit is written
//! when its delay passes even if no further line arrives.

use crate::command::{parse, Command, HELP};
use log::debug;
use planner_core::{PlannerSession, SqliteStore};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

pub type Session = PlannerSession<SqliteStore>;

/// What the loop woke up for.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellEvent {
    Line(String),
    DeadlineReached,
    InputClosed,
}

/// Forwards stdin lines to the returned channel until EOF.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Waits for the next line, or until the session's earliest deadline.
pub fn next_event(lines: &Receiver<String>, session: &Session, now: Instant) -> ShellEvent {
    match session.next_deadline_in(now) {
        Some(wait) => match lines.recv_timeout(wait) {
            Ok(line) => ShellEvent::Line(line),
            Err(RecvTimeoutError::Timeout) => ShellEvent::DeadlineReached,
            Err(RecvTimeoutError::Disconnected) => ShellEvent::InputClosed,
        },
        None => match lines.recv() {
            Ok(line) => ShellEvent::Line(line),
            Err(_) => ShellEvent::InputClosed,
        },
    }
}

/// Runs commands until `quit` is confirmed or input ends.
pub fn run_shell(
    session: &mut Session,
    lines: &Receiver<String>,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let mut show_prompt = true;
    loop {
        if show_prompt {
            write!(out, "> ")?;
            out.flush()?;
            show_prompt = false;
        }

        let line = match next_event(lines, session, Instant::now()) {
            ShellEvent::Line(line) => line,
            ShellEvent::DeadlineReached => {
                show_prompt = report_tick(session, out)?;
                continue;
            }
            ShellEvent::InputClosed => return Ok(()),
        };
        show_prompt = true;
        report_tick(session, out)?;

        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };

        if command == Command::Quit {
            if confirm_exit(session, lines, out)? {
                return Ok(());
            }
            continue;
        }
        run(session, command, lines, out)?;
    }
}

fn run(
    session: &mut Session,
    command: Command,
    lines: &Receiver<String>,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List => print_tree(session, out)?,
        Command::AddCategory => {
            let id = session.add_category()?;
            writeln!(out, "added category {id}")?;
        }
        Command::AddTask(category_id) => {
            let id = session.add_task(category_id)?;
            writeln!(out, "added task {id}")?;
        }
        Command::RenameCategory(id, name) => {
            if !session.rename_category(id, &name)? {
                writeln!(out, "name unchanged")?;
            }
        }
        Command::RenameTask(id, name) => {
            if !session.rename_task(id, &name)? {
                writeln!(out, "name unchanged")?;
            }
        }
        Command::SelectCategory(id) => {
            session.select_category(id)?;
            print_editor(session, out)?;
        }
        Command::SelectTask(id) => {
            session.select_task(id)?;
            print_editor(session, out)?;
        }
        Command::Edit(text) => {
            if session.selected_task().is_none() {
                writeln!(out, "no task selected")?;
            } else {
                session.edit_content(text, Instant::now());
            }
        }
        Command::Star(id) => {
            let important = session.toggle_important(id)?;
            let state = if important { "starred" } else { "unstarred" };
            writeln!(out, "task {id} {state}")?;
        }
        Command::DeleteTask => match session.delete_selected_task()? {
            Some(id) => writeln!(out, "deleted task {id}")?,
            None => writeln!(out, "no task selected")?,
        },
        Command::DeleteCategory(id) => {
            let prompt = "This will delete the category and ALL tasks under it. Continue? [y/N] ";
            if ask(prompt, lines, out)?.eq_ignore_ascii_case("y") {
                session.delete_category(id)?;
                writeln!(out, "deleted category {id}")?;
            }
        }
        Command::Show => print_editor(session, out)?,
        Command::Save => {
            session.save_all(Instant::now())?;
            if let Some(notice) = session.saved_notice() {
                writeln!(out, "{notice}")?;
            }
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

/// Returns `true` when the shell should exit.
fn confirm_exit(
    session: &mut Session,
    lines: &Receiver<String>,
    out: &mut impl Write,
) -> Result<bool, Box<dyn Error>> {
    if !session.needs_exit_prompt() {
        return Ok(true);
    }
    let answer = ask(
        "You have unsaved changes. [s]ave and exit, [e]xit anyway, or [c]ancel? ",
        lines,
        out,
    )?;
    match answer.to_ascii_lowercase().as_str() {
        "s" | "save" | "" => {
            session.save_all(Instant::now())?;
            Ok(true)
        }
        "e" | "exit" => Ok(true),
        _ => Ok(false),
    }
}

/// Closed input reads as an empty answer.
fn ask(prompt: &str, lines: &Receiver<String>, out: &mut impl Write) -> io::Result<String> {
    write!(out, "{prompt}")?;
    out.flush()?;
    let answer = lines.recv().unwrap_or_default();
    Ok(answer.trim().to_string())
}

/// Fires due deferred actions; returns `true` when something was printed.
fn report_tick(session: &mut Session, out: &mut impl Write) -> Result<bool, Box<dyn Error>> {
    let events = session.tick(Instant::now())?;
    if events.content_saved {
        if let Some(stamp) = &session.editor().last_modified {
            writeln!(out, "(content saved, last modified {stamp})")?;
            return Ok(true);
        }
    }
    Ok(false)
}

fn print_tree(session: &Session, out: &mut impl Write) -> io::Result<()> {
    if session.categories().is_empty() {
        return writeln!(out, "no categories yet; `add-category` creates one");
    }
    for category in session.categories() {
        let marker = if session.selected_category() == Some(category.category_id) {
            ">"
        } else {
            " "
        };
        writeln!(out, "{marker}[{}] {}", category.category_id, category.category_name)?;
        for task in &category.tasks {
            let marker = if session.selected_task() == Some(task.id) {
                ">"
            } else {
                " "
            };
            let star = if task.important { "*" } else { " " };
            writeln!(out, "{marker}    {star} ({}) {}", task.id, task.name)?;
        }
    }
    Ok(())
}

fn print_editor(session: &Session, out: &mut impl Write) -> io::Result<()> {
    let Some(task_id) = session.selected_task() else {
        return match session.selected_category() {
            Some(id) => writeln!(out, "category {id} selected (`delete-category {id}` removes it)"),
            None => writeln!(out, "nothing selected"),
        };
    };
    let editor = session.editor();
    writeln!(out, "== {} (task {task_id}) ==", editor.title)?;
    if editor.content.is_empty() {
        writeln!(out, "(empty)")?;
    } else {
        writeln!(out, "{}", editor.content)?;
    }
    if let Some(stamp) = &editor.last_modified {
        writeln!(out, "Last modified: {stamp}")?;
    }
    if session.has_pending_content_save() {
        debug!("event=editor_show module=cli status=pending_save task_id={task_id}");
        writeln!(out, "(unsaved edit pending)")?;
    }
    Ok(())
}
