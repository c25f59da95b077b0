//! Batch splitting on `GO` separators

/// One batch of a script, borrowed from the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    pub content: &'a str,
    /// 1-based line the batch starts on
    pub start_line: usize,
}

/// Split a script into batches on lines that hold only `GO` (or `GO;`).
///
/// Separator lines are not part of any batch; whitespace-only batches are
/// dropped.
pub fn split_batches(content: &str) -> Vec<Batch<'_>> {
    let mut batches = Vec::new();
    let mut current_pos = 0;
    let mut batch_start = 0;
    let mut current_line = 1;
    let mut batch_start_line = 1;

    for line in content.lines() {
        let trimmed = line.trim();
        let line_end = current_pos + line.len();
        let next_pos = if content[line_end..].starts_with("\r\n") {
            line_end + 2
        } else if content[line_end..].starts_with('\n') {
            line_end + 1
        } else {
            line_end
        };

        if trimmed.eq_ignore_ascii_case("go") || trimmed.eq_ignore_ascii_case("go;") {
            push_batch(&mut batches, content, batch_start..current_pos, batch_start_line);
            batch_start = next_pos;
            batch_start_line = current_line + 1;
        }

        current_pos = next_pos;
        current_line += 1;
    }

    push_batch(&mut batches, content, batch_start..content.len(), batch_start_line);
    batches
}

fn push_batch<'a>(
    batches: &mut Vec<Batch<'a>>,
    content: &'a str,
    range: std::ops::Range<usize>,
    start_line: usize,
) {
    let text = &content[range];
    if !text.trim().is_empty() {
        batches.push(Batch {
            content: text,
            start_line,
        });
    }
}
