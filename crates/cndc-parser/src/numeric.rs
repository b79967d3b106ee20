use crate::model::Cell;

/// Characters dropped before parsing: the thousands separator and the blanks
/// that spreadsheet exports leave inside numbers.
const STRIPPED: &[char] = &[',', ' ', '\u{a0}', '\u{202f}', '\t'];

/// Coerces a cell to a number. `None` is the missing-value sentinel: blank cells,
/// placeholders such as `n/d` and non-finite values all map to it.
pub fn normalize(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty | Cell::Date(_) => None,
        Cell::Number(value) => value.is_finite().then_some(*value),
        Cell::Text(text) => normalize_str(text),
    }
}

pub fn normalize_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| !STRIPPED.contains(c)).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
