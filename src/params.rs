//! Quote-aware splitting of legacy command parameters.

/// Split the text after a legacy command's leading `Name,` into parameters.
///
/// A comma ends a parameter only when no quote is open; the open quote is
/// keyed to the character that opened it, so `'` inside `"..."` is literal.
/// A backtick-escaped comma (`` `, ``) is part of the parameter. An
/// unterminated quote swallows the rest of the input into the last
/// parameter. Parameters are trimmed; trailing empty ones are dropped,
/// empty ones in the middle are kept so positions survive.
pub fn split_params(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut open: Option<char> = None;
    let mut escaped = false;

    for ch in raw.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match (open, ch) {
            (_, '`') => {
                escaped = true;
                current.push(ch);
            }
            (Some(q), c) if c == q => {
                open = None;
                current.push(ch);
            }
            (None, '"' | '\'') => {
                open = Some(ch);
                current.push(ch);
            }
            (None, ',') => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    parts.push(current.trim().to_string());

    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_comma_in_quotes_does_not_split() {
        assert_eq!(
            split_params(r#" "Hello, World", 5"#),
            vec![r#""Hello, World""#, "5"]
        );
    }

    #[test]
    fn keeps_middle_empties_drops_trailing() {
        assert_eq!(split_params(" +1, , Mute, ,"), vec!["+1", "", "Mute"]);
    }

    #[test]
    fn unterminated_quote_folds_into_last_param() {
        assert_eq!(split_params(r#" a, "b, c"#), vec!["a", r#""b, c"#]);
    }

    #[test]
    fn other_quote_kind_is_literal_inside_string() {
        assert_eq!(split_params(r#" "it's, ok", x"#), vec![r#""it's, ok""#, "x"]);
    }

    #[test]
    fn escaped_comma_stays_in_param() {
        assert_eq!(split_params(" a`, b, c"), vec!["a`, b", "c"]);
    }

    #[test]
    fn empty_input() {
        assert!(split_params("").is_empty());
        assert!(split_params("   ").is_empty());
    }
}
