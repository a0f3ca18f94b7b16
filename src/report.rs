//! Diagnostic rendering using ariadne
//!
//! Diagnostics whose file is part of the snapshot are rendered with a source
//! snippet. The others fall back to a single
//! `path:line:column: severity[code]: message` line.

use std::io::Write;
use std::ops::Range;

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use trampoline_core::diagnostics::{Diagnostic, Severity};
use trampoline_core::host::{Compilation, SourceLocation};

/// Render diagnostics to stderr
pub fn render_diagnostics(diagnostics: &[Diagnostic], compilation: &Compilation) {
    render_diagnostics_to_writer(diagnostics, compilation, &mut std::io::stderr(), true).ok();
}

/// Render diagnostics to a specific writer
pub fn render_diagnostics_to(
    diagnostics: &[Diagnostic],
    compilation: &Compilation,
    writer: &mut dyn Write,
) -> std::io::Result<()> {
    render_diagnostics_to_writer(diagnostics, compilation, writer, true)
}

/// Render diagnostics to a String
pub fn render_diagnostics_to_string(diagnostics: &[Diagnostic], compilation: &Compilation) -> String {
    let mut buf = Vec::new();
    render_diagnostics_to_writer(diagnostics, compilation, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render diagnostics to a String without color codes (useful for tests)
pub fn render_diagnostics_to_string_no_color(
    diagnostics: &[Diagnostic],
    compilation: &Compilation,
) -> String {
    let mut buf = Vec::new();
    render_diagnostics_to_writer(diagnostics, compilation, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_diagnostics_to_writer(
    diagnostics: &[Diagnostic],
    compilation: &Compilation,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    for diag in diagnostics {
        let path = diag.location.path.as_str();
        let Some(text) = compilation.source(path) else {
            writeln!(writer, "{}", diag)?;
            continue;
        };
        let span = token_span(text, &diag.location);

        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
            Severity::Info => ReportKind::Advice,
        };

        let mut colors = ColorGenerator::new();
        colors.next(); // Skip the first color.

        let mut report = Report::build(kind, (path, span.clone()))
            .with_code(diag.code)
            .with_message(&diag.message)
            .with_config(ariadne::Config::default().with_color(use_color))
            .with_label(
                Label::new((path, span))
                    .with_message(&diag.message)
                    .with_color(colors.next()),
            );
        if let Some(help) = &diag.help {
            report = report.with_help(help);
        }

        report.finish().write((path, Source::from(text)), &mut *writer)?;
    }

    Ok(())
}

/// Character range of the token starting at a 1-based line and column.
///
/// Positions outside the text clamp to its end.
fn token_span(text: &str, location: &SourceLocation) -> Range<usize> {
    let total = text.chars().count();
    let mut start = 0;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        if index + 1 == location.line as usize {
            let column = (location.column as usize).saturating_sub(1);
            start += column.min(line.trim_end_matches(['\r', '\n']).chars().count());
            let len = line
                .chars()
                .skip(column)
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .count();
            return start..(start + len.max(1)).min(total);
        }
        start += line.chars().count();
    }
    start..start
}
