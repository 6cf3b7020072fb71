/// Strip one matching pair of surrounding `'` or `"` quotes.
///
/// Returns the inner string and whether anything was stripped. Only the
/// outermost characters are inspected; escapes are left alone and surrounding
/// whitespace must be trimmed by the caller.
pub fn trim_quotes(s: &str) -> (&str, bool) {
    let bytes = s.as_bytes();
    if bytes.len() > 1 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return (&s[1..s.len() - 1], true);
        }
    }
    (s, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_quotes() {
        assert_eq!(trim_quotes("''"), ("", true));
        assert_eq!(trim_quotes("\"\""), ("", true));
    }

    #[test]
    fn test_unbalanced_quotes() {
        assert_eq!(trim_quotes("'foo"), ("'foo", false));
        assert_eq!(trim_quotes("foo\""), ("foo\"", false));
        assert_eq!(trim_quotes("'foo\""), ("'foo\"", false));
        assert_eq!(trim_quotes("'"), ("'", false));
    }

    #[test]
    fn test_inner_quotes_untouched() {
        assert_eq!(trim_quotes("{\"foo\":\"bar\"}"), ("{\"foo\":\"bar\"}", false));
        assert_eq!(trim_quotes("\"say \"hi\"\""), ("say \"hi\"", true));
    }

    #[test]
    fn test_no_unescaping_or_whitespace_handling() {
        assert_eq!(trim_quotes("\"a\\nb\""), ("a\\nb", true));
        assert_eq!(trim_quotes(" 'foo' "), (" 'foo' ", false));
    }

    proptest! {
        #[test]
        fn prop_strips_exactly_one_pair(
            inner in ".*",
            quote in prop_oneof![Just('"'), Just('\'')],
        ) {
            let quoted = format!("{quote}{inner}{quote}");
            prop_assert_eq!(trim_quotes(&quoted), (inner.as_str(), true));
        }

        #[test]
        fn prop_unquoted_is_unchanged(s in "[^'\"].*") {
            prop_assert_eq!(trim_quotes(&s), (s.as_str(), false));
        }
    }
}
