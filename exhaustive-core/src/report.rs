//! Output formatting - plaintext and JSON.

use serde_json::json;

use crate::diagnostic::Diagnostic;

/// Renders diagnostics one per line as `file:line:col: message`.
pub fn render_plain(diagnostics: &[Diagnostic]) -> String {
    if diagnostics.is_empty() {
        return "No missing cases found.\n".to_string();
    }
    let mut out = String::new();
    for d in diagnostics {
        out.push_str(&d.to_string());
        out.push('\n');
    }
    out
}

/// Prints diagnostics in plain text format.
pub fn print_plain(diagnostics: &[Diagnostic]) {
    print!("{}", render_plain(diagnostics));
}

/// Prints diagnostics as a JSON document.
///
/// Falls back to the plain format if serialization fails.
pub fn print_json(diagnostics: &[Diagnostic]) {
    match serde_json::to_string_pretty(&json!({ "diagnostics": diagnostics })) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed");
            print_plain(diagnostics);
        }
    }
}
