/// Width a horizontal tab expands to when text enters the document.
pub(crate) const TAB_EXPANSION: &str = "    ";

/// Normalize boundary text into document lines.
///
/// Carriage returns are stripped, tabs expand to four spaces, and the result is split on `'\n'`.
/// `str::split('\n')` preserves trailing empty segments, so N newlines yield N+1 lines.
pub(crate) fn normalize_lines(text: &str) -> Vec<String> {
    let cleaned: String = text.chars().filter(|&ch| ch != '\r').collect();
    cleaned
        .split('\n')
        .map(|line| line.replace('\t', TAB_EXPANSION))
        .collect()
}

/// Byte offset of character column `column` in `line` (clamped to the line length).
pub(crate) fn byte_index(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

pub(crate) fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// Split `line` at a character column.
pub(crate) fn split_at_column(line: &str, column: usize) -> (&str, &str) {
    line.split_at(byte_index(line, column))
}

/// Character-column substring `start..end`.
pub(crate) fn slice_columns(line: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_index(line, start);
    let end_byte = byte_index(line, end);
    &line[start_byte..end_byte.max(start_byte)]
}

/// Leading run of spaces on a line.
pub(crate) fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, ch)| *ch != ' ')
        .map(|(idx, _)| idx)
        .unwrap_or(line.len());
    &line[..end]
}
