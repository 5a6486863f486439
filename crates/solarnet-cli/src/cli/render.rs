//! Plain-text rendering for terminal output.
//!
//! Column widths are measured with `unicode-width` so catalogue values with
//! non-ASCII characters still line up.

use super::styles::{COUNT, HEADER, KEY, MUTED, SECTION};
use serde_json::Value;
use solarnet::attr::Params;
use solarnet::dataretriever::QueryResponse;
use solarnet::hek::HekTable;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_CELL: usize = 40;
const ELLIPSIS: char = '…';

/// Columns shown for HEK rows when none were requested.
pub const DEFAULT_HEK_COLUMNS: &[&str] = &[
    "event_type",
    "event_starttime",
    "event_endtime",
    "obs_observatory",
    "frm_name",
];

/// Truncate to `width` display columns, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push(ELLIPSIS);
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// An aligned table with a styled header row.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| truncate(c, MAX_CELL)).collect())
        .collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.width())
                .chain(std::iter::once(h.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| HEADER.apply_to(pad(h, *w)).to_string())
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(header.trim_end());
    out.push('\n');
    for row in &cells {
        let line = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(row.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn hek_table(rows: &HekTable, columns: &[String]) -> String {
    let headers: Vec<&str> = if columns.is_empty() {
        DEFAULT_HEK_COLUMNS.to_vec()
    } else {
        columns.iter().map(String::as_str).collect()
    };
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| headers.iter().map(|h| cell(row.get(h))).collect())
        .collect();
    let mut out = table(&headers, &body);
    out.push_str(&summary(rows.len(), "event"));
    out
}

/// Compiled request mappings, one section per request.
pub fn mappings(url: &str, requests: &[Params]) -> String {
    let mut out = format!("{} {}\n", MUTED.apply_to("POST"), url);
    for (i, params) in requests.iter().enumerate() {
        out.push('\n');
        out.push_str(&SECTION.apply_to(format!("Request {}", i + 1)).to_string());
        out.push('\n');
        let width = params.keys().map(|k| k.width()).max().unwrap_or(0);
        for (key, value) in params {
            out.push_str(&format!(
                "  {} = {}\n",
                KEY.apply_to(pad(key, width)),
                value
            ));
        }
    }
    out
}

pub fn query_response(response: &QueryResponse) -> String {
    let body: Vec<Vec<String>> = response
        .iter()
        .map(|block| {
            vec![
                block.client.clone(),
                block.start.format("%Y-%m-%d %H:%M:%S").to_string(),
                block.end.format("%Y-%m-%d %H:%M:%S").to_string(),
                block.url.clone(),
            ]
        })
        .collect();
    // urls are never truncated
    let client_width = body
        .iter()
        .map(|r| r[0].width())
        .chain(std::iter::once("client".width()))
        .max()
        .unwrap_or(0);
    let stamp = "YYYY-MM-DD HH:MM:SS".width();
    let widths = [client_width, stamp, stamp];
    let mut out = [
        HEADER.apply_to(pad("client", widths[0])).to_string(),
        HEADER.apply_to(pad("start", widths[1])).to_string(),
        HEADER.apply_to(pad("end", widths[2])).to_string(),
        HEADER.apply_to("url").to_string(),
    ]
    .join("  ");
    out.push('\n');
    for row in &body {
        out.push_str(&format!(
            "{}  {}  {}  {}\n",
            pad(&row[0], widths[0]),
            pad(&row[1], widths[1]),
            pad(&row[2], widths[2]),
            row[3]
        ));
    }
    out.push_str(&summary(response.len(), "file"));
    out
}

pub fn summary(count: usize, noun: &str) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{}\n", MUTED.apply_to(format!("{} {}{}", COUNT.apply_to(count), noun, plural)))
}
