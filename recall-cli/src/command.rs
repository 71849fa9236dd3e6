//! Command line parsing and execution.

use std::io::Write;
use std::path::PathBuf;

use recall_lib::{
    DEFAULT_MAX_HISTORY_ITEMS, FieldHistory, HistoryError, HistoryManager, StorageMode,
};

pub const USAGE: &str = "\
usage: recall [--db PATH] <command>

commands:
  fields                       list fields with a stored history
  show <field>                 print a field's history, most recent first
  add <field> <entry> [--max N]
                               record an entry as if it had been submitted
  remove <field> <entry>       forget one entry
  clear <field>                forget a field's history
  clear-all                    forget every stored history";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}\n\n{usage}", usage = USAGE)]
    Usage(String),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// What to do with the history database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fields,
    Show { field: String },
    Add { field: String, entry: String, max_items: usize },
    Remove { field: String, entry: String },
    Clear { field: String },
    ClearAll,
    Help,
}

/// Parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Database to open instead of the default one.
    pub db: Option<PathBuf>,
    pub command: Command,
}

/// Parse arguments (without the program name).
pub fn parse<I, S>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut db = None;
    let mut max_items = DEFAULT_MAX_HISTORY_ITEMS;
    let mut positional = Vec::new();

    let mut args = args.into_iter().map(Into::into);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let path = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--db needs a path".into()))?;
                db = Some(PathBuf::from(path));
            }
            "--max" => {
                let value = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--max needs a number".into()))?;
                max_items = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(CliError::Usage(format!("invalid --max value '{}'", value))),
                };
            }
            "-h" | "--help" => positional.push("help".to_string()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let name = positional.next();
    let mut next = |what: &str| {
        positional
            .next()
            .ok_or_else(|| CliError::Usage(format!("missing {}", what)))
    };

    let command = match name.as_deref() {
        None | Some("help") => Command::Help,
        Some("fields") => Command::Fields,
        Some("show") => Command::Show { field: next("field")? },
        Some("add") => Command::Add {
            field: next("field")?,
            entry: next("entry")?,
            max_items,
        },
        Some("remove") => Command::Remove {
            field: next("field")?,
            entry: next("entry")?,
        },
        Some("clear") => Command::Clear { field: next("field")? },
        Some("clear-all") => Command::ClearAll,
        Some(other) => return Err(CliError::Usage(format!("unknown command '{}'", other))),
    };

    if let Some(extra) = positional.next() {
        return Err(CliError::Usage(format!("unexpected argument '{}'", extra)));
    }

    Ok(Invocation { db, command })
}

/// Run `command` against `manager`, writing results to `out`.
pub async fn run(
    command: &Command,
    manager: &HistoryManager,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mode = StorageMode::Persistent;
    match command {
        Command::Help => writeln!(out, "{}", USAGE)?,
        Command::Fields => {
            for field in manager.fields(mode).await? {
                writeln!(out, "{}", field)?;
            }
        }
        Command::Show { field } => {
            for entry in manager.get_history(field, mode).await {
                writeln!(out, "{}", entry)?;
            }
        }
        Command::Add {
            field,
            entry,
            max_items,
        } => {
            let stored = manager.get_history(field, mode).await;
            let mut history = FieldHistory::from_entries(stored, *max_items);
            if history.insert_or_promote(entry) {
                manager.save_history(field, history.to_vec(), mode).await?;
                log::info!("Added entry to '{}'", field);
            }
        }
        Command::Remove { field, entry } => {
            let stored = manager.get_history(field, mode).await;
            let mut history = FieldHistory::from_entries(stored, usize::MAX);
            if history.remove(entry) {
                manager.save_history(field, history.to_vec(), mode).await?;
                log::info!("Removed entry from '{}'", field);
            } else {
                writeln!(out, "'{}' is not in the history of '{}'", entry, field)?;
            }
        }
        Command::Clear { field } => {
            manager.clear_history(field, mode).await?;
            log::info!("Cleared '{}'", field);
        }
        Command::ClearAll => {
            manager.clear_all_histories(mode).await?;
            log::info!("Cleared all histories");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_lib::store::MemoryBackend;

    fn cmd(args: &[&str]) -> Command {
        parse(args.iter().copied()).unwrap().command
    }

    async fn output(command: Command, manager: &HistoryManager) -> String {
        let mut out = Vec::new();
        run(&command, manager, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(cmd(&[]), Command::Help);
        assert_eq!(cmd(&["fields"]), Command::Fields);
        assert_eq!(
            cmd(&["show", "search"]),
            Command::Show {
                field: "search".into()
            }
        );
        assert_eq!(
            cmd(&["add", "search", "apples", "--max", "5"]),
            Command::Add {
                field: "search".into(),
                entry: "apples".into(),
                max_items: 5
            }
        );
        assert_eq!(cmd(&["clear-all"]), Command::ClearAll);
    }

    #[test]
    fn test_parse_db_anywhere() {
        let invocation = parse(["clear", "--db", "/tmp/h.db", "search"]).unwrap();
        assert_eq!(invocation.db, Some(PathBuf::from("/tmp/h.db")));
        assert_eq!(
            invocation.command,
            Command::Clear {
                field: "search".into()
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(["show"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(["frobnicate"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(["fields", "extra"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(["add", "a", "b", "--max", "0"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(["--db"]), Err(CliError::Usage(_))));
    }

    #[tokio::test]
    async fn test_add_show_remove() {
        let manager = HistoryManager::new(MemoryBackend::new());
        for entry in ["apples", "bananas", "apples"] {
            output(
                Command::Add {
                    field: "search".into(),
                    entry: entry.into(),
                    max_items: 50,
                },
                &manager,
            )
            .await;
        }

        let shown = output(Command::Show { field: "search".into() }, &manager).await;
        assert_eq!(shown, "apples\nbananas\n");

        let missing = output(
            Command::Remove {
                field: "search".into(),
                entry: "kiwi".into(),
            },
            &manager,
        )
        .await;
        assert!(missing.contains("not in the history"));

        output(
            Command::Remove {
                field: "search".into(),
                entry: "apples".into(),
            },
            &manager,
        )
        .await;
        let shown = output(Command::Show { field: "search".into() }, &manager).await;
        assert_eq!(shown, "bananas\n");
    }

    #[tokio::test]
    async fn test_fields_and_clear_all() {
        let manager = HistoryManager::new(MemoryBackend::new());
        for field in ["orders", "customers"] {
            manager
                .save_history(field, vec!["x".into()], StorageMode::Persistent)
                .await
                .unwrap();
        }

        assert_eq!(output(Command::Fields, &manager).await, "customers\norders\n");
        output(Command::ClearAll, &manager).await;
        assert_eq!(output(Command::Fields, &manager).await, "");
    }
}
