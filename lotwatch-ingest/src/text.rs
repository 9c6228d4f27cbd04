//! Text column normalization.

use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Collapse runs of whitespace (including invisible characters caught by
/// `\s`) to single spaces and trim the ends.
pub fn normalize_text(s: &str) -> String {
    whitespace_re().replace_all(s, " ").trim().to_string()
}

/// Lot numbers additionally get uppercased.
pub fn normalize_lot_number(s: &str) -> String {
    normalize_text(s).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_and_trims() {
        assert_eq!(normalize_text("  Whole   Milk \t 1L "), "Whole Milk 1L");
        assert_eq!(normalize_text("x\u{a0}y"), "x y");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_lot_number_uppercased() {
        assert_eq!(normalize_lot_number(" lot-04 a "), "LOT-04 A");
    }
}
