//! Parsing of customer input: menu options, multi-line forms and amounts.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:,\d+)*(?:\.\d+)?").expect("static regex"));

/// Token that returns to the main menu from free-text steps.
pub const BACK_TO_MENU: &str = "0";

/// Parse a numeric menu choice in `1..=options`.
///
/// Only the exact tokens "1".."n" are accepted; anything else, including
/// empty input, is `None`.
pub fn menu_choice(input: &str, options: u8) -> Option<u8> {
    let token = input.trim();
    if token.starts_with('0') || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let choice: u8 = token.parse().ok()?;
    (1..=options).contains(&choice).then_some(choice)
}

/// Split a multi-line form into trimmed, non-blank lines.
///
/// Returns `None` when fewer than `min` lines are present. Extra lines are
/// kept; callers read the positions they know and ignore the rest.
pub fn form_lines(input: &str, min: usize) -> Option<Vec<&str>> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    (lines.len() >= min).then_some(lines)
}

/// Parse a money amount such as `1500`, `$1,500.00` or `USD 900`.
///
/// Returns `None` for zero, negative or unparseable input.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$')
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '$'))
        .collect();
    let amount: Decimal = cleaned.parse().ok()?;
    (amount > Decimal::ZERO).then_some(amount.round_dp(2))
}

/// Read the first number out of free text such as `40m` or `about 60 metres`.
///
/// Commas followed by three digits group thousands (`1,200`). A single comma
/// followed by one or two digits is a decimal comma (`40,5`).
pub fn leading_number(input: &str) -> Option<Decimal> {
    let token = LEADING_NUMBER.find(input)?.as_str();
    let (whole, fraction) = match token.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (token, None),
    };
    let groups: Vec<&str> = whole.split(',').collect();
    let digits = match groups.as_slice() {
        [single] => single.to_string(),
        [first, rest @ ..] if rest.iter().all(|g| g.len() == 3) => {
            std::iter::once(*first).chain(rest.iter().copied()).collect()
        }
        [first, decimals] if fraction.is_none() && decimals.len() <= 2 => {
            return format!("{first}.{decimals}").parse().ok();
        }
        [first, ..] => return first.parse().ok(),
        [] => return None,
    };
    match fraction {
        Some(fraction) => format!("{digits}.{fraction}").parse().ok(),
        None => digits.parse().ok(),
    }
}

/// Whether a yes/no answer is negative, in any supported language.
pub fn is_negative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "no" | "n" | "not yet" | "kwete" | "aiwa" | "hapana" | "hatshi" | "cha" | "hayi"
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn menu_choice_accepts_exact_tokens() {
        assert_eq!(menu_choice("1", 3), Some(1));
        assert_eq!(menu_choice(" 3 ", 3), Some(3));
    }

    #[test]
    fn menu_choice_rejects_everything_else() {
        for input in ["", "0", "4", "01", "+1", "one", "1.", "-1", "1 2", "256"] {
            assert_eq!(menu_choice(input, 3), None, "input {input:?}");
        }
    }

    #[test]
    fn form_lines_requires_minimum() {
        assert!(form_lines("Harare\n40m\nDomestic", 4).is_none());
        let lines = form_lines("Harare\n40m\nDomestic\nYes", 4).unwrap();
        assert_eq!(lines, vec!["Harare", "40m", "Domestic", "Yes"]);
    }

    #[test]
    fn form_lines_trims_and_skips_blank_lines() {
        let lines = form_lines("  Tendai Moyo \r\n\n 12 June\n", 2).unwrap();
        assert_eq!(lines, vec!["Tendai Moyo", "12 June"]);
    }

    #[test]
    fn form_lines_keeps_extra_lines() {
        let lines = form_lines("a\nb\nc\nd\ne", 4).unwrap();
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn parse_amount_variants() {
        assert_eq!(parse_amount("1500"), Some(dec!(1500)));
        assert_eq!(parse_amount("$1,500.50"), Some(dec!(1500.50)));
        assert_eq!(parse_amount("USD 900"), Some(dec!(900)));
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("-5"), None);
        assert_eq!(parse_amount("cheap please"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn leading_number_reads_depths() {
        assert_eq!(leading_number("40m"), Some(dec!(40)));
        assert_eq!(leading_number("about 62.5 metres"), Some(dec!(62.5)));
        assert_eq!(leading_number("1,200m"), Some(dec!(1200)));
        assert_eq!(leading_number("1,250,000"), Some(dec!(1250000)));
        assert_eq!(leading_number("2,400.5 metres"), Some(dec!(2400.5)));
        assert_eq!(leading_number("40,5m"), Some(dec!(40.5)));
        assert_eq!(leading_number("40,25m"), Some(dec!(40.25)));
        assert_eq!(leading_number("40,5000m"), Some(dec!(40)));
        assert_eq!(leading_number("deep"), None);
    }

    #[test]
    fn negative_answers() {
        assert!(is_negative("No"));
        assert!(is_negative(" aiwa "));
        assert!(is_negative("Hatshi"));
        assert!(!is_negative("Yes"));
        assert!(!is_negative("Hongu"));
    }
}
