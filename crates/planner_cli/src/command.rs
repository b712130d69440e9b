//! Line command parsing for the planner shell.

use planner_core::{CategoryId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    AddCategory,
    AddTask(CategoryId),
    RenameCategory(CategoryId, String),
    RenameTask(TaskId, String),
    SelectCategory(CategoryId),
    SelectTask(TaskId),
    Edit(String),
    Star(TaskId),
    DeleteTask,
    DeleteCategory(CategoryId),
    Show,
    Save,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  list                         show categories and tasks
  add-category                 create a category
  add-task <category>          create a task in a category
  rename-category <id> <name>  rename a category
  rename-task <id> <name>      rename a task
  select-category <id>         select a category
  select-task <id>             open a task in the editor
  edit <text>                  replace the open task's content (\\n for newline)
  star <task>                  toggle a task's importance
  delete-task                  delete the open task
  delete-category <id>         delete a category and all of its tasks
  show                         print the editor
  save                         save everything
  quit                         exit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "list" | "ls" => Command::List,
        "add-category" => Command::AddCategory,
        "add-task" => Command::AddTask(parse_id(rest)?),
        "rename-category" => {
            let (id, name) = split_id_and_text(rest)?;
            Command::RenameCategory(id, name)
        }
        "rename-task" => {
            let (id, name) = split_id_and_text(rest)?;
            Command::RenameTask(id, name)
        }
        "select-category" => Command::SelectCategory(parse_id(rest)?),
        "select-task" | "open" => Command::SelectTask(parse_id(rest)?),
        "edit" => Command::Edit(unescape_newlines(rest)),
        "star" => Command::Star(parse_id(rest)?),
        "delete-task" => Command::DeleteTask,
        "delete-category" => Command::DeleteCategory(parse_id(rest)?),
        "show" => Command::Show,
        "save" => Command::Save,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Some(command))
}

fn parse_id(value: &str) -> Result<i64, String> {
    value
        .parse::<i64>()
        .map_err(|_| format!("expected a numeric id, got `{value}`"))
}

fn split_id_and_text(rest: &str) -> Result<(i64, String), String> {
    let (id, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Ok((parse_id(id)?, text.to_string()))
}

fn unescape_newlines(value: &str) -> String {
    value.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::{parse, Command};

    #[test]
    fn parses_id_commands() {
        assert_eq!(parse("add-task 3").unwrap(), Some(Command::AddTask(3)));
        assert_eq!(parse(" select-task 12 ").unwrap(), Some(Command::SelectTask(12)));
        assert_eq!(parse("star 4").unwrap(), Some(Command::Star(4)));
    }

    #[test]
    fn rename_keeps_the_rest_of_the_line() {
        assert_eq!(
            parse("rename-task 2 Write the report").unwrap(),
            Some(Command::RenameTask(2, "Write the report".to_string()))
        );
        assert_eq!(
            parse("rename-category 1").unwrap(),
            Some(Command::RenameCategory(1, String::new()))
        );
    }

    #[test]
    fn edit_expands_newline_escapes() {
        assert_eq!(
            parse(r"edit first\nsecond").unwrap(),
            Some(Command::Edit("first\nsecond".to_string()))
        );
        assert_eq!(parse("edit").unwrap(), Some(Command::Edit(String::new())));
    }

    #[test]
    fn blank_and_invalid_input() {
        assert_eq!(parse("   ").unwrap(), None);
        assert!(parse("add-task x").unwrap_err().contains("numeric id"));
        assert!(parse("frobnicate").unwrap_err().contains("unknown command"));
    }
}
