//! Line-oriented command interpreter over a [`FileStorage`].
//!
//! Commands:
//! - `create <Kind>`: create and save an instance, print its id
//! - `show <Kind> <id>` / `destroy <Kind> <id>`
//! - `all [<Kind>]` / `count <Kind>`
//! - `update <Kind> <id> <attribute> <value>`
//! - `help [<command>]`, `quit`, `EOF`
//!
//! `<Kind>.all()`, `<Kind>.show("<id>")`, `<Kind>.update("<id>", {...})` and
//! friends are accepted as aliases. Mistakes in a command are reported on the
//! output and never end the session.

pub mod coerce;
pub mod parse;

use std::io::{self, BufRead, Write};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Kind, RESERVED_KEYS};
use crate::storage::{FileStorage, StorageError};

pub const PROMPT: &str = "(hbnb) ";

/// Whether the interpreter should keep reading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Problems with a command, printed back to the user.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("** class name missing **")]
    ClassNameMissing,

    #[error("** class doesn't exist **")]
    ClassDoesNotExist,

    #[error("** instance id missing **")]
    InstanceIdMissing,

    #[error("** no instance found **")]
    NoInstanceFound,

    #[error("** attribute name missing **")]
    AttributeNameMissing,

    #[error("** value missing **")]
    ValueMissing,

    #[error("** attribute can't be updated **")]
    AttributeReadOnly,

    #[error("** invalid dictionary **")]
    InvalidDictionary,

    #[error("** storage error: {0} **")]
    Storage(#[from] StorageError),
}

const HELP: &[(&str, &str)] = &[
    ("EOF", "Exit the console"),
    ("all", "Print all instances, or all of one kind\nUsage: all [<Kind>]"),
    ("count", "Print the number of instances of a kind\nUsage: count <Kind>"),
    ("create", "Create an instance, save it, and print its id\nUsage: create <Kind>"),
    ("destroy", "Delete an instance and save the change\nUsage: destroy <Kind> <id>"),
    ("help", "List commands, or describe one\nUsage: help [<command>]"),
    ("quit", "Exit the console"),
    ("show", "Print an instance\nUsage: show <Kind> <id>"),
    (
        "update",
        "Set an attribute and save the instance\nUsage: update <Kind> <id> <attribute> <value>\n       <Kind>.update(\"<id>\", {\"<attribute>\": <value>, ...})",
    ),
];

pub struct Console {
    storage: FileStorage,
}

impl Console {
    pub fn new(storage: FileStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Read and execute lines until `quit`, `EOF`, or end of input.
    ///
    /// The prompt is only written when `interactive` is set.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        out: &mut W,
        interactive: bool,
    ) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            if interactive {
                write!(out, "{}", PROMPT)?;
                out.flush()?;
            }

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                if interactive {
                    writeln!(out)?;
                }
                return Ok(());
            }

            // Invalid UTF-8 becomes U+FFFD and fails as an ordinary command.
            let line = String::from_utf8_lossy(&buf);
            if self.execute(&line, out)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Execute one command line, writing its output (or error) to `out`.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        let tokens = parse::tokenize(line);
        let Some((command, args)) = tokens.split_first() else {
            return Ok(Flow::Continue);
        };

        tracing::trace!(command = %command, args = ?args, "executing");

        let result = match command.as_str() {
            "quit" | "EOF" => return Ok(Flow::Quit),
            "help" => Ok(self.help(args)),
            "create" => self.create(args),
            "show" => self.show(args),
            "destroy" => self.destroy(args),
            "all" => self.all(args),
            "count" => self.count(args),
            "update" => self.update(args),
            _ => Ok(Some(format!("*** Unknown syntax: {}", line))),
        };

        match result {
            Ok(Some(output)) => writeln!(out, "{}", output)?,
            Ok(None) => {}
            Err(e) => {
                if let CommandError::Storage(ref source) = e {
                    tracing::error!(error = %source, "failed to persist object store");
                }
                writeln!(out, "{}", e)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn help(&self, args: &[String]) -> Option<String> {
        match args.first() {
            Some(topic) => Some(
                HELP.iter()
                    .find(|(name, _)| *name == topic.as_str())
                    .map(|(_, text)| text.to_string())
                    .unwrap_or_else(|| format!("*** No help on {}", topic)),
            ),
            None => {
                let names: Vec<&str> = HELP.iter().map(|(name, _)| *name).collect();
                let kinds: Vec<&str> = Kind::all().map(|kind| kind.as_str()).collect();
                Some(format!(
                    "Documented commands (type help <topic>):\n========================================\n{}\n\nKinds: {}",
                    names.join("  "),
                    kinds.join(", ")
                ))
            }
        }
    }

    fn create(&mut self, args: &[String]) -> Result<Option<String>, CommandError> {
        let kind = kind_arg(args)?;
        let id = self.storage.new_instance(kind).id().to_string();
        self.storage.save()?;
        tracing::info!(%kind, %id, "created instance");
        Ok(Some(id))
    }

    fn show(&self, args: &[String]) -> Result<Option<String>, CommandError> {
        let kind = kind_arg(args)?;
        let id = id_arg(args)?;
        let instance = self
            .storage
            .get(kind, id)
            .ok_or(CommandError::NoInstanceFound)?;
        Ok(Some(instance.to_string()))
    }

    fn destroy(&mut self, args: &[String]) -> Result<Option<String>, CommandError> {
        let kind = kind_arg(args)?;
        let id = id_arg(args)?;
        self.storage
            .remove(kind, id)
            .ok_or(CommandError::NoInstanceFound)?;
        self.storage.save()?;
        tracing::info!(%kind, %id, "destroyed instance");
        Ok(None)
    }

    fn all(&self, args: &[String]) -> Result<Option<String>, CommandError> {
        let kind = match args.first() {
            Some(name) => Some(parse_kind(name)?),
            None => None,
        };
        let rendered: Vec<String> = self
            .storage
            .iter_kind(kind)
            .map(|instance| instance.to_string())
            .collect();
        Ok(Some(format!("[{}]", rendered.join(", "))))
    }

    fn count(&self, args: &[String]) -> Result<Option<String>, CommandError> {
        let kind = kind_arg(args)?;
        Ok(Some(self.storage.count(Some(kind)).to_string()))
    }

    fn update(&mut self, args: &[String]) -> Result<Option<String>, CommandError> {
        let kind = kind_arg(args)?;
        let id = id_arg(args)?;
        if self.storage.get(kind, id).is_none() {
            return Err(CommandError::NoInstanceFound);
        }

        let attribute = args.get(2).ok_or(CommandError::AttributeNameMissing)?;
        let assignments = if attribute.starts_with('{') {
            parse_dictionary(attribute)?
        } else {
            let value = args.get(3).ok_or(CommandError::ValueMissing)?;
            vec![(unquote(attribute).to_string(), coerce::parse_value(value))]
        };

        if assignments
            .iter()
            .any(|(name, _)| RESERVED_KEYS.contains(&name.as_str()))
        {
            return Err(CommandError::AttributeReadOnly);
        }

        let instance = self
            .storage
            .get_mut(kind, id)
            .ok_or(CommandError::NoInstanceFound)?;
        for (name, value) in assignments {
            instance
                .set(name, value)
                .map_err(|_| CommandError::AttributeReadOnly)?;
        }
        self.storage.save_instance(kind, id)?;
        tracing::info!(%kind, %id, "updated instance");
        Ok(None)
    }
}

fn parse_kind(raw: &str) -> Result<Kind, CommandError> {
    unquote(raw)
        .parse()
        .map_err(|_| CommandError::ClassDoesNotExist)
}

fn kind_arg(args: &[String]) -> Result<Kind, CommandError> {
    let name = args.first().ok_or(CommandError::ClassNameMissing)?;
    parse_kind(name)
}

fn id_arg(args: &[String]) -> Result<&str, CommandError> {
    args.get(1)
        .map(|id| unquote(id))
        .ok_or(CommandError::InstanceIdMissing)
}

fn unquote(raw: &str) -> &str {
    coerce::strip_quotes(raw).unwrap_or(raw)
}

/// Parse `{"name": value, ...}`. Single-quoted keys and strings are accepted
/// when the text is not valid JSON as written.
fn parse_dictionary(raw: &str) -> Result<Vec<(String, Value)>, CommandError> {
    let object: Map<String, Value> = serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(&parse::single_to_double_quotes(raw)))
        .map_err(|_| CommandError::InvalidDictionary)?;
    Ok(object.into_iter().collect())
}
