//! Command-line front end: flag parsing, command dispatch and table output.

pub mod args;
pub mod commands;

pub use args::{parse_args, Invocation, UsageError};
pub use commands::{parse_command, run, split_words, Command};

// Cap to keep wide comment columns readable.
const MAX_COL_WIDTH: usize = 60;

/// Render rows as an ASCII table with a row-count footer.
pub fn render_table(columns: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut widths: Vec<usize> = columns.iter().map(|c| display_len(c).min(MAX_COL_WIDTH)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(columns.len()) {
            let w = display_len(cell);
            if w > widths[i] { widths[i] = w.min(MAX_COL_WIDTH); }
        }
    }

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let sep = build_separator(&widths);
    let mut out = Vec::with_capacity(rows.len() + 5);
    out.push(sep.clone());
    out.push(build_row(&header, &widths));
    out.push(sep.clone());
    for r in rows {
        out.push(build_row(r, &widths));
    }
    out.push(sep);
    out.push(format!("rows: {}", rows.len()));
    out.join("\n")
}

pub fn print_table(columns: &[&str], rows: &[Vec<String>]) {
    println!("{}", render_table(columns, rows));
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let text = truncate(cell, *w);
        let pad = " ".repeat(w.saturating_sub(display_len(&text)));
        s.push(' ');
        if is_numeric_like(cell) {
            s.push_str(&pad);
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&pad);
        }
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if display_len(s) <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

// ids and durations align right; prices carry a currency prefix and stay left
fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    !st.is_empty() && st.chars().all(|c| c.is_ascii_digit() || ".-+,".contains(c)) && st.chars().any(|c| c.is_ascii_digit())
}
