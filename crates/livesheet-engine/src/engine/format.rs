use super::Value;

/// Format a cell value for display. Undefined renders blank.
pub fn format_value(value: Value) -> String {
    match value {
        Some(n) => format_number(n),
        None => String::new(),
    }
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e10 {
        format!("{:.0}", n)
    } else {
        format!("{:.2}", n)
    }
}
