use color_print::cprintln;
use xse::{Diagnostic, Severity};

/// Prints one diagnostic with the source line it points at.
fn print(diagnostic: &Diagnostic, path: &str, lines: &[&str]) {
    match diagnostic.severity {
        Severity::Error => cprintln!("<red,bold>error</>: {}", diagnostic.error),
        Severity::Warning => cprintln!("<yellow,bold>warn</>: {}", diagnostic.error),
        Severity::Info => cprintln!("<green,bold>note</>: {}", diagnostic.error),
    }
    let span = diagnostic.span;
    cprintln!("     <blue>--></> <underline>{}:{}</>", path, span);
    cprintln!("      <blue>|</>");
    let raw = lines.get(span.start.row).copied().unwrap_or("");
    cprintln!(" <blue>{:>4} |</> {}", span.line(), raw);
    let width = if span.end.row == span.start.row {
        span.end.col.saturating_sub(span.start.col).max(1)
    } else {
        raw.chars().count().saturating_sub(span.start.col).max(1)
    };
    cprintln!(
        "      <blue>|</> {}<red,bold>{}</>",
        " ".repeat(span.start.col),
        "^".repeat(width)
    );
}

pub fn dump(diagnostics: &[Diagnostic], path: &str, source: &str) {
    let lines: Vec<&str> = source.lines().collect();
    for diagnostic in diagnostics {
        print(diagnostic, path, &lines);
    }
}
