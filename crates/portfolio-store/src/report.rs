//! CSV export of the project list.

use chrono::SecondsFormat;
use pp_types::Project;

/// Name offered for the downloaded file.
pub const REPORT_FILE_NAME: &str = "projects.csv";
pub const REPORT_CONTENT_TYPE: &str = "text/csv;charset=utf-8;";
const HEADER: [&str; 4] = ["Name", "Status", "Progress", "Created At"];

/// Render projects as CSV. Every cell is quoted, rows are joined by `\n`
/// and timestamps are UTC with millisecond precision.
pub fn projects_csv(projects: &[Project]) -> String {
    let mut lines = Vec::with_capacity(projects.len() + 1);
    lines.push(csv_line(HEADER.iter().map(|h| h.to_string())));
    for project in projects {
        lines.push(csv_line([
            project.name.clone(),
            project.status.as_str().to_string(),
            project.progress.to_string(),
            project.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ]));
    }
    lines.join("\n")
}

fn csv_line(cells: impl IntoIterator<Item = String>) -> String {
    cells
        .into_iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}
