use crate::analysis::ForecastPoint;

/// `$1,234,567.89`. The sign goes after the dollar sign: `$-12.00`.
pub fn format_currency(amount: f64) -> String {
    format!("${}", format_thousands(amount))
}

/// Two decimals with `,` between thousands groups.
pub fn format_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// The two console lines for the last forecast year.
pub fn forecast_lines(point: &ForecastPoint) -> [String; 2] {
    [
        format!(
            "Expected total payroll cost in {}: {}",
            point.year,
            format_currency(point.forecast)
        ),
        format!(
            "95% CI: {} - {}",
            format_currency(point.lower_ci),
            format_currency(point.upper_ci)
        ),
    ]
}
