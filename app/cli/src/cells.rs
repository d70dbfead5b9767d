//! Splitting notebook files into cells.

/// Line prefix that starts a new cell, as used by percent-format scripts.
pub const DEFAULT_SEPARATOR: &str = "# %%";

/// Split `text` into cells at every line starting with `separator`.
///
/// The separator line itself belongs to no cell, so trailing labels such as
/// `# %% setup` are dropped. Cells with nothing but whitespace are skipped.
pub fn split_cells(text: &str, separator: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim_start().starts_with(separator) {
            push_cell(&mut cells, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }
    push_cell(&mut cells, &current);
    cells
}

fn push_cell(cells: &mut Vec<String>, lines: &[&str]) {
    if lines.iter().any(|line| !line.trim().is_empty()) {
        cells.push(lines.join("\n"));
    }
}

#[cfg(test)]
#[path = "cells.test.rs"]
mod tests;
