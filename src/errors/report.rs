// src/errors/report.rs
//! Rendering of collected findings via miette's graphical handler.

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, ThemeCharacters, ThemeStyles};

use crate::errors::DiagnosticBag;

fn handler(unicode: bool) -> GraphicalReportHandler {
    let theme = if unicode {
        GraphicalTheme {
            characters: ThemeCharacters::unicode(),
            styles: ThemeStyles::ansi(),
        }
    } else {
        // Ascii + no colors, for snapshots and log files.
        GraphicalTheme {
            characters: ThemeCharacters::ascii(),
            styles: ThemeStyles::none(),
        }
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Render a single finding without colors.
pub fn render_to_string(report: &dyn Diagnostic) -> String {
    let mut output = String::new();
    let _ = handler(false).render_report(&mut output, report);
    output
}

/// Render a single finding to stderr with unicode and colors.
pub fn render_to_stderr(report: &dyn Diagnostic) {
    let mut output = String::new();
    if handler(true).render_report(&mut output, report).is_ok() {
        eprint!("{}", output);
    }
}

/// Render every finding in a bag, errors first, without colors.
pub fn render_bag(bag: &DiagnosticBag) -> String {
    let mut output = String::new();
    let handler = handler(false);
    for error in &bag.errors {
        let _ = handler.render_report(&mut output, &error.error);
    }
    for warning in &bag.warnings {
        let _ = handler.render_report(&mut output, &warning.warning);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DiagnosticSink, GenError, GenWarning};
    use crate::syntax::Span;

    #[test]
    fn render_includes_code_and_message() {
        let error = GenError::AlreadyGenerated {
            span: (0, 1).into(),
        };
        let rendered = render_to_string(&error);
        assert!(rendered.contains("E3005"));
        assert!(rendered.contains("produced by the generator"));
    }

    #[test]
    fn bag_renders_errors_before_warnings() {
        let mut bag = DiagnosticBag::new();
        bag.warning(
            GenWarning::ConfigurationHasNoEffect { span: (0, 1).into() },
            Span::dummy(),
        );
        bag.error(
            GenError::OverrideOfGenerated { span: (0, 1).into() },
            Span::dummy(),
        );

        let rendered = render_bag(&bag);
        let error_at = rendered.find("E5002").expect("error rendered");
        let warning_at = rendered.find("W3004").expect("warning rendered");
        assert!(error_at < warning_at);
    }
}
