//! Text normalization ahead of pattern matching.

/// Collapse every whitespace run to a single space and trim the ends.
///
/// Case is left alone; the patterns are case-insensitive.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collapses_whitespace() {
        let raw = "  Procedimiento:\tArtroscopia\n\n de rodilla\r\n  Total:\u{00a0}$9,000 ";
        assert_eq!(
            normalize_text(raw),
            "Procedimiento: Artroscopia de rodilla Total: $9,000"
        );
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn test_keeps_case() {
        assert_eq!(normalize_text("ANESTESIA General"), "ANESTESIA General");
    }
}
