//! Fixed-width result rendering and its reverse parser.
//!
//! Rendered text is the only thing that reaches the transcript. Front ends
//! that want real table structure recover it with [`parse_rendered`], which
//! keys off the dash separator line and nothing else.
//!
//! ```text
//! EMPLOYEE_ID  LAST_NAME
//! -----------  ---------
//! 100          King
//! 101          Kochhar
//!
//! 2 row(s) selected.
//! ```

use crate::engine::QueryOutput;

/// Column gap in rendered tables.
const GAP: &str = "  ";

/// Render a header, dash separator and rows. No footer.
///
/// Each column is as wide as its longest displayed header or cell (at least
/// one character). Control characters are shown escaped (`\n`, `\t`) so a
/// row always stays on one line. A row wider than `line_width` is cut once at
/// the limit and continues on the next line.
pub fn render_table<S: AsRef<str>>(
    headers: &[S],
    rows: &[Vec<String>],
    line_width: usize,
) -> String {
    let headers: Vec<String> = headers
        .iter()
        .map(|h| display(&h.as_ref().to_uppercase()))
        .collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| display(c)).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .fold(h.chars().count(), usize::max)
                .max(1)
        })
        .collect();

    let header = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect::<Vec<_>>()
        .join(GAP);
    let separator = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join(GAP);

    let mut lines = vec![header, separator];
    for row in &rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(row.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect::<Vec<_>>()
            .join(GAP);

        if line_width > 0 && line.chars().count() > line_width {
            let head: String = line.chars().take(line_width).collect();
            let tail: String = line.chars().skip(line_width).collect();
            lines.push(head);
            lines.push(tail);
        } else {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Render a query result with its `<n> row(s) selected.` footer.
pub fn render_result(output: &QueryOutput, line_width: usize) -> String {
    let rows: Vec<Vec<String>> = output
        .rows
        .iter()
        .map(|r| r.iter().map(ToString::to_string).collect())
        .collect();
    format!(
        "{}\n\n{} row(s) selected.",
        render_table(output.columns.as_slice(), &rows, line_width),
        rows.len()
    )
}

/// Message for a statement that returned no result set.
///
/// The statement's first word picks the verb; for `create`, `drop` and
/// `alter` the object kind (`TABLE`, `INDEX`, `VIEW`, `TRIGGER`) is taken
/// from the words that follow, defaulting to a table.
pub fn summary(statement: &str, rows_modified: u64) -> String {
    let verb = statement
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();
    let kind = || {
        statement
            .split_whitespace()
            .skip(1)
            .take(4)
            .map(str::to_lowercase)
            .find_map(|w| match w.as_str() {
                "table" => Some("Table"),
                "index" => Some("Index"),
                "view" => Some("View"),
                "trigger" => Some("Trigger"),
                _ => None,
            })
            .unwrap_or("Table")
    };

    match verb.as_str() {
        "insert" => format!("{} row(s) inserted.", rows_modified),
        "update" => format!("{} row(s) updated.", rows_modified),
        "delete" => format!("{} row(s) deleted.", rows_modified),
        "create" => format!("{} created.", kind()),
        "drop" => format!("{} dropped.", kind()),
        "alter" => format!("{} altered.", kind()),
        _ => "Statement executed.".to_string(),
    }
}

/// Structure recovered from rendered output text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Table(ParsedTable),
    Plain(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Option<String>,
}

/// Detect a rendered table in `text`.
///
/// The text is tabular when its second line is made only of dashes and
/// whitespace and contains at least one dash run. Each maximal dash run is a
/// column span; header and data lines are cut by those spans and trimmed.
/// Anything else comes back as plain lines.
pub fn parse_rendered(text: &str) -> Block {
    let plain = || Block::Plain(text.split('\n').map(str::to_string).collect());

    let trimmed = text.trim_start_matches(['\n', '\r']).trim_end();
    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() < 2 || !is_separator(lines[1]) {
        return plain();
    }

    let spans = dash_runs(lines[1]);
    if spans.is_empty() {
        return plain();
    }

    let headers = cut(lines[0], &spans);
    let mut rows = Vec::new();
    let mut footer = None;
    for line in &lines[2..] {
        let t = line.trim();
        if is_footer(t) {
            footer = Some(t.to_string());
        } else if !t.is_empty() {
            rows.push(cut(line, &spans));
        }
    }

    Block::Table(ParsedTable {
        headers,
        rows,
        footer,
    })
}

/// Cell text as shown: control characters escaped.
fn display(s: &str) -> String {
    if !s.chars().any(char::is_control) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

fn is_separator(line: &str) -> bool {
    let line = line.trim_end_matches('\r');
    !line.is_empty() && line.chars().all(|c| c == '-' || c.is_whitespace())
}

/// Char-index spans `[start, end)` of every maximal run of `-`.
fn dash_runs(line: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in line.chars().enumerate() {
        match (c == '-', start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, line.chars().count()));
    }
    spans
}

fn cut(line: &str, spans: &[(usize, usize)]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    spans
        .iter()
        .map(|&(start, end)| {
            let start = start.min(chars.len());
            let end = end.min(chars.len());
            chars[start..end].iter().collect::<String>().trim().to_string()
        })
        .collect()
}

/// `<digits> row(s) selected.` with any run of whitespace between words.
fn is_footer(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return false;
    }
    let mut rest = line[digits..].split_whitespace();
    matches!(
        (rest.next(), rest.next(), rest.next()),
        (Some("row(s)"), Some("selected."), None)
    ) && line[digits..].starts_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Value;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn employees() -> QueryOutput {
        QueryOutput::rows(
            strings(&["employee_id", "last_name", "salary"]),
            vec![
                vec![Value::Integer(100), Value::from("King"), Value::Real(24000.0)],
                vec![Value::Integer(101), Value::from("Kochhar"), Value::Null],
            ],
        )
    }

    #[test]
    fn renders_header_separator_rows_and_footer() {
        let text = render_result(&employees(), 1000);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[0], "EMPLOYEE_ID  LAST_NAME  SALARY");
        assert_eq!(lines[1], "-----------  ---------  ------");
        assert_eq!(lines[2], "100          King       24000 ");
        assert_eq!(lines[3], "101          Kochhar    NULL  ");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "2 row(s) selected.");
    }

    #[test]
    fn column_is_as_wide_as_its_longest_cell() {
        let text = render_table(&["id"], &[strings(&["12345"])], 1000);
        assert_eq!(text, "ID   \n-----\n12345");
    }

    #[test]
    fn empty_header_still_gets_a_dash_run() {
        let text = render_table(&[""], &[strings(&[""])], 1000);
        assert_eq!(text.split('\n').nth(1), Some("-"));
    }

    #[test]
    fn zero_rows_render_header_and_zero_footer() {
        let out = QueryOutput::rows(strings(&["a"]), Vec::new());
        assert_eq!(render_result(&out, 80), "A\n-\n\n0 row(s) selected.");
    }

    #[test]
    fn long_row_is_cut_in_two_at_line_width() {
        let text = render_table(&["c"], &[strings(&["abcdefghijklmno"])], 10);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "abcdefghij");
        assert_eq!(lines[3], "klmno");
    }

    #[test]
    fn width_counts_characters_not_bytes() {
        let text = render_table(&["n"], &[strings(&["Zoë"]), strings(&["Al"])], 1000);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[1], "---");
        assert_eq!(lines[3], "Al ");
    }

    #[test]
    fn summaries_for_data_changes() {
        assert_eq!(summary("INSERT INTO t VALUES (1)", 1), "1 row(s) inserted.");
        assert_eq!(summary("update t set a = 1", 3), "3 row(s) updated.");
        assert_eq!(summary("Delete from t", 0), "0 row(s) deleted.");
    }

    #[test]
    fn summaries_for_structure_changes() {
        assert_eq!(summary("CREATE TABLE t (id INT)", 0), "Table created.");
        assert_eq!(summary("create unique index i on t(a)", 0), "Index created.");
        assert_eq!(summary("DROP VIEW v", 0), "View dropped.");
        assert_eq!(summary("alter table t add b", 0), "Table altered.");
        assert_eq!(summary("PRAGMA foreign_keys = ON", 0), "Statement executed.");
    }

    #[test]
    fn parses_rendered_result_back_into_cells() {
        let text = render_result(&employees(), 1000);
        let Block::Table(table) = parse_rendered(&text) else {
            panic!("expected a table");
        };
        assert_eq!(table.headers, strings(&["EMPLOYEE_ID", "LAST_NAME", "SALARY"]));
        assert_eq!(
            table.rows,
            vec![
                strings(&["100", "King", "24000"]),
                strings(&["101", "Kochhar", "NULL"]),
            ]
        );
        assert_eq!(table.footer.as_deref(), Some("2 row(s) selected."));
    }

    #[test]
    fn header_width_follows_upper_case_form() {
        let text = render_table(&["straße", "id"], &[strings(&["x", "7"])], 1000);
        assert_eq!(text.split('\n').nth(1), Some("-------  --"));

        let Block::Table(table) = parse_rendered(&text) else {
            panic!("expected a table");
        };
        assert_eq!(table.headers, ["STRASSE", "ID"]);
        assert_eq!(table.rows, vec![strings(&["x", "7"])]);
    }

    #[test]
    fn control_characters_keep_rows_on_one_line() {
        let rows = vec![strings(&["x\ny", "1"]), strings(&["a\tb", "2"])];
        let text = render_table(&["note", "n"], &rows, 1000);
        assert_eq!(text.lines().count(), 4);

        let Block::Table(table) = parse_rendered(&text) else {
            panic!("expected a table");
        };
        assert_eq!(
            table.rows,
            vec![strings(&["x\\ny", "1"]), strings(&["a\\tb", "2"])]
        );
    }

    #[test]
    fn round_trip_recovers_headers_and_cells() {
        let headers = strings(&["job_id", "job_title", "x"]);
        let rows = vec![
            strings(&["AD_PRES", "President", ""]),
            strings(&["AD_VP", "Administration VP", "y"]),
        ];
        let out = QueryOutput::rows(
            headers.clone(),
            rows.iter()
                .map(|r| r.iter().map(|c| Value::from(c.as_str())).collect())
                .collect(),
        );
        let Block::Table(table) = parse_rendered(&render_result(&out, 1000)) else {
            panic!("expected a table");
        };
        let upper: Vec<String> = headers.iter().map(|h| h.to_uppercase()).collect();
        assert_eq!(table.headers, upper);
        assert_eq!(table.rows, rows);
    }

    #[test]
    fn plain_text_is_not_a_table() {
        assert_eq!(
            parse_rendered("LINESIZE set to 80"),
            Block::Plain(strings(&["LINESIZE set to 80"]))
        );
        assert_eq!(
            parse_rendered("Table created.\nok"),
            Block::Plain(strings(&["Table created.", "ok"]))
        );
    }

    #[test]
    fn whitespace_only_second_line_is_plain() {
        let block = parse_rendered("head\n    \nbody");
        assert!(matches!(block, Block::Plain(lines) if lines.len() == 3));
    }

    #[test]
    fn footer_detection() {
        assert!(is_footer("12 row(s) selected."));
        assert!(is_footer("0  row(s)  selected."));
        assert!(!is_footer("row(s) selected."));
        assert!(!is_footer("2 rows selected."));
    }

    #[test]
    fn describe_table_has_no_footer() {
        let text = render_table(
            &["Name", "Null?", "Type"],
            &[strings(&["EMPLOYEE_ID", "NOT NULL", "INT"])],
            1000,
        );
        let Block::Table(table) = parse_rendered(&text) else {
            panic!("expected a table");
        };
        assert_eq!(table.headers, strings(&["NAME", "NULL?", "TYPE"]));
        assert!(table.footer.is_none());
    }
}
