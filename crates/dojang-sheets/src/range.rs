//! A1 notation helpers.

/// Quotes a worksheet title for use in an A1 range.
///
/// Titles are always quoted: an unquoted `Q1` or `AB12` would be read as a
/// cell reference rather than a worksheet.
pub fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Column letters for a zero-based column index: 0 → `A`, 26 → `AA`.
pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|b| char::from(*b)).collect()
}

/// Ranges holding cells of an `old` grid that a smaller `new` grid no
/// longer covers. Rows and columns are counts, header included.
pub fn leftover_ranges(
    title: &str,
    old_rows: usize,
    old_cols: usize,
    new_rows: usize,
    new_cols: usize,
) -> Vec<String> {
    let sheet = quote_sheet(title);
    let mut ranges = Vec::new();
    if old_rows > new_rows {
        ranges.push(format!("{sheet}!{}:{old_rows}", new_rows + 1));
    }
    if old_cols > new_cols && new_rows > 0 {
        ranges.push(format!(
            "{sheet}!{}1:{}{}",
            column_letters(new_cols),
            column_letters(old_cols - 1),
            new_rows.min(old_rows)
        ));
    }
    ranges
}
