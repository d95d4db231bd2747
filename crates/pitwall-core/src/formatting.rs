/// Format a lap time in seconds as `M:SS.mmm`.
///
/// # Examples
///
/// ```
/// use pitwall_core::formatting::format_lap_time;
///
/// assert_eq!(format_lap_time(90.5), "1:30.500");
/// assert_eq!(format_lap_time(59.9994), "0:59.999");
/// assert_eq!(format_lap_time(125.0), "2:05.000");
/// ```
pub fn format_lap_time(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as i64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    format!("{}:{:02}.{:03}", minutes, secs, millis)
}

/// Format an optional lap time, rendering a missing time as `"-"`.
pub fn format_optional_lap_time(seconds: Option<f64>) -> String {
    seconds.map(format_lap_time).unwrap_or_else(|| "-".to_string())
}

/// Format a signed lap-time delta with an explicit sign and three decimals.
///
/// # Examples
///
/// ```
/// use pitwall_core::formatting::format_delta;
///
/// assert_eq!(format_delta(1.5), "+1.500");
/// assert_eq!(format_delta(-0.7), "-0.700");
/// assert_eq!(format_delta(0.0), "+0.000");
/// ```
pub fn format_delta(seconds: f64) -> String {
    // Avoid printing "-0.000" for tiny negative rounding noise.
    let rounded = (seconds * 1000.0).round() / 1000.0;
    if rounded < 0.0 {
        format!("-{:.3}", rounded.abs())
    } else {
        format!("+{:.3}", rounded.abs())
    }
}

/// Format a floating-point number with a fixed number of decimal places,
/// rendering `None` as `"-"`.
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.prec$}", v, prec = decimals),
        None => "-".to_string(),
    }
}

/// Render rows as a left-aligned, space-padded text table with a header rule.
///
/// Rows shorter than the header are padded with empty cells.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells, &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        line.push_str(&" ".repeat(pad));
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

// ── Tests ──────────────────────────────────────────────────────────────────────
