pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 30;
pub const NO_DATA_MESSAGE: &str = "No data available";
pub const ELLIPSIS: &str = "...";

/// Lines above the first data row: top border, header row, separator.
pub const GRID_CHROME_LINES: usize = 3;

#[must_use]
pub fn format_grid(headers: &[String], rows: &[Vec<String>], max_column_width: usize) -> String {
    grid_lines(headers, rows, max_column_width).join("\n")
}

#[must_use]
pub fn grid_lines(headers: &[String], rows: &[Vec<String>], max_column_width: usize) -> Vec<String> {
    if headers.is_empty() {
        return vec![NO_DATA_MESSAGE.to_string()];
    }

    let widths = column_widths(headers, rows, max_column_width);
    let mut lines = Vec::with_capacity(rows.len() + GRID_CHROME_LINES);
    lines.push(border_line(&widths, '┌', '┬', '┐'));
    lines.push(row_line(headers, &widths));
    lines.push(border_line(&widths, '├', '┼', '┤'));
    for row in rows {
        lines.push(row_line(row, &widths));
    }
    lines
}

#[must_use]
pub fn column_widths(
    headers: &[String],
    rows: &[Vec<String>],
    max_column_width: usize,
) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let widest_cell = rows
                .iter()
                .filter_map(|row| row.get(index))
                .map(|cell| display_width(cell))
                .max()
                .unwrap_or(0);
            display_width(header).max(widest_cell).min(max_column_width)
        })
        .collect()
}

/// Pads `value` to exactly `width` characters, truncating with an ellipsis
/// when it does not fit.
#[must_use]
pub fn fit_cell(value: &str, width: usize) -> String {
    let length = display_width(value);
    if length <= width {
        return format!("{value}{}", " ".repeat(width - length));
    }

    let marker_width = display_width(ELLIPSIS);
    if width < marker_width {
        return value.chars().take(width).collect();
    }

    let mut truncated: String = value.chars().take(width - marker_width).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn border_line(widths: &[usize], left: char, junction: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (index, width) in widths.iter().enumerate() {
        if index > 0 {
            line.push(junction);
        }
        line.push_str(&"─".repeat(width + 2));
    }
    line.push(right);
    line
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("│");
    for (index, width) in widths.iter().enumerate() {
        let cell = cells.get(index).map_or("", String::as_str);
        line.push(' ');
        line.push_str(&fit_cell(cell, *width));
        line.push_str(" │");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{
        column_widths, fit_cell, format_grid, grid_lines,
        DEFAULT_MAX_COLUMN_WIDTH, NO_DATA_MESSAGE,
    };

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn sample() -> (Vec<String>, Vec<Vec<String>>) {
        (
            strings(&["id", "name"]),
            vec![
                strings(&["1", "alice"]),
                strings(&["2", "bob"]),
                strings(&["3", "NULL"]),
            ],
        )
    }

    #[test]
    fn renders_borders_header_and_rows() {
        let (headers, rows) = sample();
        let grid = format_grid(&headers, &rows, DEFAULT_MAX_COLUMN_WIDTH);
        let expected = [
            "┌────┬───────┐",
            "│ id │ name  │",
            "├────┼───────┤",
            "│ 1  │ alice │",
            "│ 2  │ bob   │",
            "│ 3  │ NULL  │",
        ]
        .join("\n");
        assert_eq!(grid, expected);
    }

    #[test]
    fn line_count_and_delimiters_track_shape() {
        let (headers, rows) = sample();
        let lines = grid_lines(&headers, &rows, DEFAULT_MAX_COLUMN_WIDTH);
        assert_eq!(lines.len(), rows.len() + 3);
        for line in &lines[1..] {
            if line.starts_with('├') {
                continue;
            }
            assert_eq!(line.matches('│').count(), headers.len() + 1);
        }
    }

    #[test]
    fn headers_without_rows_render_only_chrome() {
        let headers = strings(&["id", "email"]);
        let lines = grid_lines(&headers, &[], DEFAULT_MAX_COLUMN_WIDTH);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "│ id │ email │");
    }

    #[test]
    fn empty_headers_render_placeholder_message() {
        assert_eq!(format_grid(&[], &[], DEFAULT_MAX_COLUMN_WIDTH), NO_DATA_MESSAGE);
        assert_eq!(grid_lines(&[], &[], DEFAULT_MAX_COLUMN_WIDTH).len(), 1);
    }

    #[test]
    fn column_width_is_capped() {
        let headers = strings(&["note"]);
        let rows = vec![vec!["x".repeat(80)]];
        assert_eq!(column_widths(&headers, &rows, 30), vec![30]);

        let lines = grid_lines(&headers, &rows, 30);
        let cell = lines[3].trim_start_matches("│ ").trim_end_matches(" │");
        assert_eq!(cell.chars().count(), 30);
        assert!(cell.ends_with("..."));
        assert_eq!(cell, format!("{}...", "x".repeat(27)));
    }

    #[test]
    fn truncation_never_exceeds_width() {
        for width in 0..8 {
            let fitted = fit_cell("abcdefghijkl", width);
            assert_eq!(fitted.chars().count(), width, "width {width}");
        }
    }

    #[test]
    fn padded_cells_strip_back_to_original() {
        let fitted = fit_cell("bob", 10);
        assert_eq!(fitted.len(), 10);
        assert_eq!(fitted.trim_end(), "bob");
    }

    #[test]
    fn multibyte_cells_are_measured_in_characters() {
        let headers = strings(&["city"]);
        let rows = vec![strings(&["Zürich"])];
        assert_eq!(column_widths(&headers, &rows, 30), vec![6]);
        assert_eq!(fit_cell("Zürich", 8), "Zürich  ");
    }

    #[test]
    fn formatting_is_deterministic() {
        let (headers, rows) = sample();
        let first = format_grid(&headers, &rows, 12);
        let second = format_grid(&headers, &rows, 12);
        assert_eq!(first, second);
    }
}
