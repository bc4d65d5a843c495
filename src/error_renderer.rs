//! Error rendering using miette
//!
//! This module renders load-time errors with their diagnostic code, the
//! chain of causes and a help line where one applies.

use crate::Error;
use miette::{GraphicalReportHandler, GraphicalTheme};
use std::io::Write;

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use rtti::{Error, RegistryBuilder, TypeCtorInfo, TypeCtorKey, TypeCtorRep, render_error};
///
/// let key = TypeCtorKey::new("demo", "color", 0);
/// let mut builder = RegistryBuilder::new();
/// builder.register(TypeCtorInfo::new(key.clone(), TypeCtorRep::enumeration(["red"]))).unwrap();
/// if let Err(e) = builder.register(TypeCtorInfo::new(key, TypeCtorRep::enumeration(["red"]))) {
///     render_error(&Error::from(e));
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs, UIs, etc.)
pub fn render_error_to_string(error: &Error) -> String {
    render(error, true)
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    render(error, false)
}

fn render(error: &Error, use_color: bool) -> String {
    let theme = if use_color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let mut out = String::new();
    if GraphicalReportHandler::new_themed(theme)
        .render_report(&mut out, error)
        .is_err()
    {
        // The handler only fails on writer errors; fall back to the message.
        out = format!("error[{}]: {}\n", error.code(), error);
    }
    out
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    writer.write_all(render(error, use_color).as_bytes())
}
