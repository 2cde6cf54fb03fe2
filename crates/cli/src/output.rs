//! Terminal output. Results go to stdout as pretty JSON; logs go to stderr.

use serde::Serialize;

/// Print `value` as pretty JSON.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn emit<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a one-line status message.
#[allow(clippy::print_stdout)]
pub fn status(message: &str) {
    println!("{message}");
}
