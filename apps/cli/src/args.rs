//! # Command-Line Arguments
//!
//! ```text
//! stockpile [--config <path>] list
//! stockpile [--config <path>] save <name> <price_cents> <quantity> [--id <id>]
//! ```

use std::path::PathBuf;

use stockpile_core::Product;
use thiserror::Error;

/// Usage text printed on argument errors.
pub const USAGE: &str = "\
Usage:
  stockpile [--config <path>] list
  stockpile [--config <path>] save <name> <price_cents> <quantity> [--id <id>]";

/// Argument errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("invalid {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unexpected argument: {0}")]
    Unexpected(String),
}

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the collection, local snapshot first.
    List,

    /// Submit one product.
    Save(Product),
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub command: Command,
}

/// Parses arguments, excluding the program name.
pub fn parse<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = None;
    let mut id = None;
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(PathBuf::from(
                    args.next().ok_or(ArgsError::MissingValue("--config"))?,
                ));
            }
            "--id" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--id"))?;
                id = Some(number("id", value)?);
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None => return Err(ArgsError::MissingCommand),
        Some("list") => Command::List,
        Some("save") => {
            let name = positional.next().ok_or(ArgsError::MissingValue("save"))?;
            let price_cents = number(
                "price_cents",
                positional.next().ok_or(ArgsError::MissingValue("save"))?,
            )?;
            let quantity = number(
                "quantity",
                positional.next().ok_or(ArgsError::MissingValue("save"))?,
            )?;

            let product = Product::new(name, price_cents, quantity);
            Command::Save(match id {
                Some(id) => product.with_id(id),
                None => product,
            })
        }
        Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = positional.next() {
        return Err(ArgsError::Unexpected(extra));
    }

    Ok(Args { config, command })
}

fn number(field: &'static str, value: String) -> Result<i64, ArgsError> {
    value
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { field, value })
}
