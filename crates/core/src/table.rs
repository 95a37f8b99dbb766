//! Markdown table rendering shared by every converter that emits tables.

/// Minimum column width; `---` is the shortest valid separator cell.
const MIN_COLUMN_WIDTH: usize = 3;

/// Render rows of cells as a GitHub-Flavored Markdown table.
///
/// The first row is always the header. Rows shorter than the widest row are
/// padded with empty cells, and every column is padded to the width of its
/// widest escaped cell (at least three characters).
///
/// # Example output
/// ```text
/// | Name  | Age |
/// | ----- | --- |
/// | Alice | 30  |
/// ```
pub fn render_markdown_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let escaped: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|col| row.get(col).map(|cell| escape_pipes(cell)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths = vec![MIN_COLUMN_WIDTH; columns];
    for row in &escaped {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &escaped[0], &widths);

    out.push('|');
    for width in &widths {
        out.push(' ');
        out.push_str(&"-".repeat(*width));
        out.push_str(" |");
    }
    out.push('\n');

    for row in &escaped[1..] {
        write_row(&mut out, row, &widths);
    }

    out
}

fn write_row(out: &mut String, row: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, width) in row.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        let len = cell.chars().count();
        if len < *width {
            out.push_str(&" ".repeat(width - len));
        }
        out.push_str(" |");
    }
    out.push('\n');
}

/// Escape `|` so a cell value cannot be read as a column delimiter.
fn escape_pipes(cell: &str) -> String {
    cell.replace('|', "\\|")
}
