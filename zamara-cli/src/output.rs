use crate::{OutputFormat, GLOBAL_OPTS};
use colored::*;
use serde::Serialize;
use std::io;

/// Print output according to the global format settings
///
/// Text output is handled by the individual commands.
pub fn print_output<T: Serialize>(data: &T) -> Result<(), io::Error> {
    let opts = GLOBAL_OPTS.get().expect("Global options not initialized");

    if opts.quiet {
        return Ok(());
    }

    match opts.output {
        OutputFormat::Json => print_json(data),
        OutputFormat::Text => Ok(()),
    }
}

/// Print JSON output
pub fn print_json<T: Serialize>(data: &T) -> Result<(), io::Error> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

/// Whether text output should be produced
pub fn text_mode() -> bool {
    let opts = GLOBAL_OPTS.get().expect("Global options not initialized");
    !opts.quiet && opts.output == OutputFormat::Text
}

/// Print verbose message (only if verbose mode is on)
pub fn verbose_println(level: u8, message: &str) {
    let opts = GLOBAL_OPTS.get().expect("Global options not initialized");

    if !opts.quiet && opts.verbose >= level {
        eprintln!("{} {}", "[VERBOSE]".dimmed(), message);
    }
}

/// Print a bold section heading
pub fn heading(title: &str) {
    if use_color() {
        println!("{}", title.bold());
    } else {
        println!("{}", title);
    }
}

/// Check if we should use color
pub fn use_color() -> bool {
    let opts = GLOBAL_OPTS.get().expect("Global options not initialized");
    !opts.no_color && opts.output == OutputFormat::Text
}
