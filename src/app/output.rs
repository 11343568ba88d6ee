//! Rendering of scan results for the terminal (table), scripts (JSON) and
//! spreadsheets (CSV)

use crate::core::styles::StyleRole;
use crate::scanner::query::ListPage;
use prettytable::{format, Cell, Row, Table};
use serde::Serialize;
use std::str::FromStr;
use unicode_width::UnicodeWidthChar;

/// Marker text wider than this is cut in the table view
const MAX_TEXT_WIDTH: usize = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "Unknown output format '{}' (expected text, json or csv)",
                other
            )),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Query result for one scanned location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReport {
    pub location: String,
    #[serde(flatten)]
    pub page: ListPage,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow<'a> {
    location: &'a str,
    tag: &'a str,
    author: &'a str,
    file_path: &'a str,
    line_number: usize,
    text: &'a str,
    view_url: &'a str,
}

pub fn render(
    reports: &[LocationReport],
    format: OutputFormat,
    color: bool,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Text => Ok(render_text(reports, color)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)? + "\n"),
        OutputFormat::Csv => render_csv(reports),
    }
}

fn render_text(reports: &[LocationReport], color: bool) -> String {
    let mut out = String::new();

    for report in reports {
        let page = &report.page;
        let heading = format!(
            "{} ({} of {} markers)",
            report.location,
            page.items.len(),
            page.total_count
        );
        out.push_str(&StyleRole::Header.paint(&heading, color));
        out.push('\n');

        if page.items.is_empty() {
            out.push_str(&StyleRole::Dim.paint("  no markers", color));
            out.push_str("\n\n");
            continue;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.set_titles(Row::new(
            ["TAG", "AUTHOR", "LOCATION", "TEXT"]
                .iter()
                .map(|title| Cell::new(&StyleRole::Header.paint(title, color)))
                .collect(),
        ));

        for marker in &page.items {
            let location = format!("{}:{}", marker.file_path, marker.line_number);
            table.add_row(Row::new(vec![
                Cell::new(&StyleRole::Tag.paint(&marker.tag, color)),
                Cell::new(&StyleRole::Author.paint(marker.author.as_deref().unwrap_or("-"), color)),
                Cell::new(&StyleRole::Location.paint(&location, color)),
                Cell::new(&StyleRole::Text.paint(&truncate(&marker.text, MAX_TEXT_WIDTH), color)),
            ]));
        }

        out.push_str(&table.to_string());
        out.push('\n');
    }

    out
}

fn render_csv(reports: &[LocationReport]) -> Result<String, OutputError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for report in reports {
        for marker in &report.page.items {
            writer.serialize(CsvRow {
                location: &report.location,
                tag: &marker.tag,
                author: marker.author.as_deref().unwrap_or(""),
                file_path: &marker.file_path,
                line_number: marker.line_number,
                text: &marker.text,
                view_url: &marker.view_url,
            })?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Cut `text` to at most `max_width` display columns, ending in `…` when cut
fn truncate(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for (idx, c) in text.char_indices() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            let rest_fits = text[idx..]
                .chars()
                .map(|c| c.width().unwrap_or(0))
                .sum::<usize>()
                + width
                <= max_width;
            if rest_fits {
                return text.to_string();
            }
            out.push('…');
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}
