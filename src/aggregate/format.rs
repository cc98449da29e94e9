//! Column-configured numeric display formats
//!
//! A format is `<prefix><pattern><suffix>`. The pattern is a run of `#`,
//! `0`, `,` and `.`: a `,` turns on thousands grouping and the digits after
//! `.` fix the decimal places (none without a `.`). A `%` in the suffix scales by 100.
//!
//! ```text
//! "$#,##0.00"  1234.5  -> "$1,234.50"
//! "0.0%"       0.256   -> "25.6%"
//! "# kg"       12      -> "12 kg"
//! ```

const PATTERN_CHARS: &[char] = &['#', '0', ',', '.'];

/// Parsed numeric format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    prefix: String,
    suffix: String,
    grouping: bool,
    decimals: usize,
    percent: bool,
}

impl NumberFormat {
    /// Parses a format string; `None` when it has no numeric pattern
    pub fn parse(format: &str) -> Option<Self> {
        let start = format.find(PATTERN_CHARS)?;
        let end = format[start..]
            .find(|c: char| !PATTERN_CHARS.contains(&c))
            .map(|i| start + i)
            .unwrap_or(format.len());
        let pattern = &format[start..end];
        if !pattern.contains(&['#', '0'][..]) {
            return None;
        }
        let suffix = &format[end..];
        Some(Self {
            prefix: format[..start].to_string(),
            suffix: suffix.to_string(),
            grouping: pattern.contains(','),
            decimals: pattern
                .split_once('.')
                .map(|(_, frac)| frac.chars().filter(|c| matches!(c, '#' | '0')).count())
                .unwrap_or(0),
            percent: suffix.contains('%'),
        })
    }

    /// Formats a number
    pub fn apply(&self, n: f64) -> String {
        if !n.is_finite() {
            return String::new();
        }
        let n = if self.percent { n * 100.0 } else { n };
        let digits = format!("{:.*}", self.decimals, n);
        let digits = if self.grouping { group_thousands(&digits) } else { digits };
        format!("{}{}{}", self.prefix, digits, self.suffix)
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, unsigned) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        let format = NumberFormat::parse("$#,##0.00").unwrap();
        assert_eq!(format.apply(1234.5), "$1,234.50");
        assert_eq!(format.apply(-1234567.0), "$-1,234,567.00");
    }

    #[test]
    fn test_percent_and_suffix() {
        assert_eq!(NumberFormat::parse("0.0%").unwrap().apply(0.256), "25.6%");
        assert_eq!(NumberFormat::parse("# kg").unwrap().apply(12.0), "12 kg");
        assert_eq!(NumberFormat::parse("0").unwrap().apply(2.6), "3");
    }

    #[test]
    fn test_no_pattern() {
        assert_eq!(NumberFormat::parse("kg"), None);
        assert_eq!(NumberFormat::parse(""), None);
        assert_eq!(NumberFormat::parse("."), None);
    }

    #[test]
    fn test_non_finite_is_blank() {
        assert_eq!(NumberFormat::parse("0.00").unwrap().apply(f64::NAN), "");
    }
}
