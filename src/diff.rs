use crossterm::style::Stylize;
use similar::TextDiff;

/// Unified diff between the rendered base document and the document resolved
/// for `environment`. Only the header is emitted when the override changes nothing.
pub fn format_environment_diff(base: &str, resolved: &str, environment: Option<&str>) -> String {
    let diff = TextDiff::from_lines(base, resolved);
    let mut output = format!(
        "--- base\n+++ env: {}\n",
        environment.unwrap_or("<unset>")
    );
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        output.push_str(&hunk.to_string());
    }
    output
}

/// Color added, removed and hunk-header lines of a unified diff.
pub fn colorize_diff(diff: &str) -> String {
    let mut output = String::new();
    for line in diff.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            line.bold().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else {
            line.to_string()
        };
        output.push_str(&styled);
        output.push('\n');
    }
    output
}
