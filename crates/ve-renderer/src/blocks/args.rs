//! Custom block argument parsing.
//!
//! The text after a block name is split into tokens. A token shaped like
//! `key=value` (with an identifier key) is a keyword argument; every other
//! token is positional. Values may be wrapped in single or double quotes to
//! carry whitespace.

/// Parsed arguments of one custom block, in source order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlockArgs {
    /// Positional tokens.
    pub positional: Vec<String>,
    /// Keyword arguments as `(key, value)` pairs.
    pub keywords: Vec<(String, String)>,
}

impl BlockArgs {
    /// Parse the argument text of a block header.
    ///
    /// ```
    /// use ve_renderer::BlockArgs;
    ///
    /// let args = BlockArgs::parse(r#"sticky "A caption" width=50%"#);
    /// assert_eq!(args.positional, vec!["sticky", "A caption"]);
    /// assert_eq!(args.keyword("width"), Some("50%"));
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let mut args = Self::default();
        let mut remaining = input.trim();

        while !remaining.is_empty() {
            if let Some((key, value, rest)) = parse_keyword(remaining) {
                args.keywords.push((key.to_owned(), value.to_owned()));
                remaining = rest;
            } else {
                let (value, rest) = parse_value(remaining);
                if !value.is_empty() {
                    args.positional.push(value.to_owned());
                }
                remaining = rest;
            }
            remaining = remaining.trim_start();
        }

        args
    }

    /// Keyword value by key. The last occurrence wins.
    #[must_use]
    pub fn keyword(&self, key: &str) -> Option<&str> {
        self.keywords
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn is_key(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parse `key=value` at the start of `s`.
fn parse_keyword(s: &str) -> Option<(&str, &str, &str)> {
    let token_end = s.find(char::is_whitespace).unwrap_or(s.len());
    let eq = s[..token_end].find('=')?;
    let key = &s[..eq];
    if !is_key(key) {
        return None;
    }
    let (value, rest) = parse_value(&s[eq + 1..]);
    Some((key, value, rest))
}

/// Parse one value: quoted up to the matching quote, otherwise up to whitespace.
fn parse_value(s: &str) -> (&str, &str) {
    for quote in ['"', '\''] {
        if let Some(stripped) = s.strip_prefix(quote)
            && let Some(end) = stripped.find(quote)
        {
            return (&stripped[..end], &stripped[end + 1..]);
        }
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(BlockArgs::parse("   "), BlockArgs::default());
    }

    #[test]
    fn test_positional_only() {
        let args = BlockArgs::parse("wd:Q42 sticky left");

        assert_eq!(args.positional, vec!["wd:Q42", "sticky", "left"]);
        assert!(args.keywords.is_empty());
    }

    #[test]
    fn test_quoted_positional_keeps_spaces() {
        let args = BlockArgs::parse(r#"https://x.org/a.jpg "A long caption" 'single quoted'"#);

        assert_eq!(
            args.positional,
            vec!["https://x.org/a.jpg", "A long caption", "single quoted"]
        );
    }

    #[test]
    fn test_keywords_in_order() {
        let args = BlockArgs::parse(r#"label="Card one" href=/essay zoom=4"#);

        assert_eq!(
            args.keywords,
            vec![
                ("label".to_owned(), "Card one".to_owned()),
                ("href".to_owned(), "/essay".to_owned()),
                ("zoom".to_owned(), "4".to_owned()),
            ]
        );
    }

    #[test]
    fn test_equals_in_url_is_positional() {
        let args = BlockArgs::parse("https://example.org/view?id=7 caption=Hi");

        assert_eq!(args.positional, vec!["https://example.org/view?id=7"]);
        assert_eq!(args.keyword("caption"), Some("Hi"));
    }

    #[test]
    fn test_mixed() {
        let args = BlockArgs::parse(r#"a.jpg sticky class=wide "B c""#);

        assert_eq!(args.positional, vec!["a.jpg", "sticky", "B c"]);
        assert_eq!(args.keyword("class"), Some("wide"));
    }

    #[test]
    fn test_unterminated_quote_is_literal() {
        let args = BlockArgs::parse(r#""open ended"#);

        assert_eq!(args.positional, vec![r#""open"#, "ended"]);
    }
}
