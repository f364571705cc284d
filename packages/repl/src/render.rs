//! Terminal presentation of engine output.
//!
//! Output arrives as the fixed-width text the session rendered. Tables are
//! recovered with [`parse_rendered`] and redrawn with box-drawing borders;
//! anything else is shown as-is.

use nu_ansi_term::{Color, Style};
use sqlpad_core::{parse_rendered, Block, ParsedTable};

/// Text for one normal output entry.
pub fn present(text: &str, color: bool) -> String {
    match parse_rendered(text) {
        Block::Table(table) if !is_wrapped(&table) => draw_table(&table, color),
        _ => text.to_string(),
    }
}

/// A table whose rows were split by the line width no longer has one line
/// per row; its footer count gives it away.
fn is_wrapped(table: &ParsedTable) -> bool {
    let Some(footer) = &table.footer else {
        return false;
    };
    let count = footer
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<usize>().ok());
    count != Some(table.rows.len())
}

fn draw_table(table: &ParsedTable, color: bool) -> String {
    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            table
                .rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .fold(h.chars().count(), usize::max)
        })
        .collect();

    let header_style = if color {
        Style::new().bold()
    } else {
        Style::new()
    };

    let mut lines = vec![border(&widths, '┌', '┬', '┐')];
    lines.push(row(&table.headers, &widths, header_style));
    lines.push(border(&widths, '├', '┼', '┤'));
    for cells in &table.rows {
        lines.push(row(cells, &widths, Style::new()));
    }
    lines.push(border(&widths, '└', '┴', '┘'));

    if let Some(footer) = &table.footer {
        lines.push(String::new());
        if color {
            lines.push(Color::DarkGray.paint(footer).to_string());
        } else {
            lines.push(footer.clone());
        }
    }
    lines.join("\n")
}

fn border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}", left, segments.join(&middle.to_string()), right)
}

fn row(cells: &[String], widths: &[usize], style: Style) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = " ".repeat(w - cell.chars().count().min(*w));
            format!(" {}{} ", style.paint(cell), pad)
        })
        .collect();
    format!("│{}│", padded.join("│"))
}
