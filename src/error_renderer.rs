//! Error rendering using ariadne
//!
//! Parse errors and semantic diagnostics carry source locations, so they are
//! rendered as annotated snippets of the program. Runtime and bytecode errors
//! have no source position and are printed as a single line.

use crate::{Diagnostic, Error, ParseError};
use ariadne::{ColorGenerator, Config, IndexType, Label, Report, ReportKind, Source};
use std::io::Write;
use std::ops::Range;

/// Render an error for `source` to stderr.
///
/// # Example
/// ```no_run
/// use bumpalo::Bump;
/// use pila::{compile, render_error};
///
/// let arena = Bump::new();
/// let source = "int x; x = true + 1;";
/// if let Err(e) = compile(&arena, source) {
///     render_error(&e, "main.pila", source);
/// }
/// ```
pub fn render_error(error: &Error, filename: &str, source: &str) {
    render_error_to_writer(error, filename, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer.
pub fn render_error_to(
    error: &Error,
    filename: &str,
    source: &str,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_error_to_writer(error, filename, source, writer, true)
}

/// Render an error to a String.
pub fn render_error_to_string(error: &Error, filename: &str, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, filename, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Same as [`render_error_to_string`] without ANSI color codes.
pub fn render_error_to_string_no_color(error: &Error, filename: &str, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, filename, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    filename: &str,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let snippet = Snippet {
        filename,
        source,
        use_color,
    };
    match error {
        Error::Parse(err) => snippet.parse_error(err, writer),
        Error::Compilation { diagnostics } => {
            for diagnostic in diagnostics {
                snippet.diagnostic(diagnostic, writer)?;
            }
            writeln!(writer, "{error}")
        }
        Error::Runtime(err) => writeln!(writer, "Runtime error: {err}"),
        Error::Decode(err) => writeln!(writer, "Invalid bytecode: {err}"),
    }
}

struct Snippet<'s> {
    filename: &'s str,
    source: &'s str,
    use_color: bool,
}

impl Snippet<'_> {
    fn parse_error(&self, err: &ParseError, writer: &mut dyn Write) -> std::io::Result<()> {
        let message = err.kind.to_string();
        self.write(
            err.location.span.0.clone(),
            err.code(),
            "Syntax error",
            &message,
            err.help(),
            writer,
        )
    }

    fn diagnostic(&self, diagnostic: &Diagnostic, writer: &mut dyn Write) -> std::io::Result<()> {
        let message = diagnostic.message();
        self.write(
            diagnostic.location.span.0.clone(),
            diagnostic.code(),
            &message,
            &message,
            diagnostic.error.help(),
            writer,
        )
    }

    fn write(
        &self,
        span: Range<usize>,
        code: &str,
        title: &str,
        label: &str,
        help: Option<&str>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let span = self.clamp(span);
        let config = Config::default()
            .with_color(self.use_color)
            .with_index_type(IndexType::Byte);
        let mut report = Report::build(ReportKind::Error, (self.filename, span.clone()))
            .with_config(config)
            .with_code(code)
            .with_message(title)
            .with_label(
                Label::new((self.filename, span))
                    .with_message(label)
                    .with_color(colors.next()),
            );
        if let Some(help) = help {
            report = report.with_help(help);
        }
        report
            .finish()
            .write((self.filename, Source::from(self.source)), &mut *writer)
    }

    /// Keep spans inside the source; errors at end of input have an empty one.
    fn clamp(&self, span: Range<usize>) -> Range<usize> {
        let end = self.source.len();
        let start = span.start.min(end);
        start..span.end.clamp(start, end)
    }
}
