//! Single-line CSV tokenizer.
//!
//! Fields are comma-separated and may be wrapped in double quotes; inside a
//! quoted field commas do not split and `""` decodes to one literal quote.
//! Unquoted fields are trimmed, quoted fields keep their inner whitespace.
//! The caller splits the file into lines first, so a quoted field cannot
//! span lines.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first non-blank character of a field
    Start,
    Unquoted,
    Quoted,
    /// After the closing quote of a quoted field
    AfterQuote,
}

/// Split one CSV line into its fields. An empty line yields one empty field.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = State::Start;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Start => match c {
                ',' => fields.push(String::new()),
                '"' => state = State::Quoted,
                c if c.is_whitespace() => {}
                c => {
                    current.push(c);
                    state = State::Unquoted;
                }
            },
            State::Unquoted => match c {
                ',' => {
                    fields.push(current.trim_end().to_string());
                    current.clear();
                    state = State::Start;
                }
                c => current.push(c),
            },
            State::Quoted => match c {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => state = State::AfterQuote,
                c => current.push(c),
            },
            State::AfterQuote => match c {
                ',' => {
                    fields.push(std::mem::take(&mut current));
                    state = State::Start;
                }
                c if c.is_whitespace() => {}
                // Stray text after a closing quote is kept rather than rejected
                c => {
                    current.push(c);
                    state = State::Unquoted;
                }
            },
        }
    }

    match state {
        State::Unquoted => fields.push(current.trim_end().to_string()),
        _ => fields.push(current),
    }
    fields
}

/// Join values into one CSV line, quoting only the values that need it.
pub fn format_line<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|value| {
            let value = value.as_ref();
            let needs_quotes = value.contains(',')
                || value.contains('"')
                || value.starts_with(char::is_whitespace)
                || value.ends_with(char::is_whitespace);
            if needs_quotes {
                format!("\"{}\"", value.replace('"', "\"\""))
            } else {
                value.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        assert_eq!(parse_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_comma() {
        assert_eq!(parse_line("a,\"b,c\",d"), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_escaped_quote() {
        assert_eq!(parse_line("a,\"b\"\"c\",d"), vec!["a", "b\"c", "d"]);
    }

    #[test]
    fn test_empty_line_yields_one_empty_field() {
        assert_eq!(parse_line(""), vec![""]);
    }

    #[test]
    fn test_unquoted_fields_are_trimmed() {
        assert_eq!(parse_line("  a , b ,c  "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_fields_keep_inner_whitespace() {
        assert_eq!(parse_line(" \" a \" ,b"), vec![" a ", "b"]);
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(parse_line(",,"), vec!["", "", ""]);
        assert_eq!(parse_line("a,,\"\""), vec!["a", "", ""]);
    }

    #[test]
    fn test_unterminated_quote_keeps_rest_of_line() {
        assert_eq!(parse_line("a,\"b,c"), vec!["a", "b,c"]);
    }

    #[test]
    fn test_format_line_quotes_when_needed() {
        let line = format_line(&["a", "b,c", "say \"hi\"", " pad"]);
        assert_eq!(line, "a,\"b,c\",\"say \"\"hi\"\"\",\" pad\"");
        assert_eq!(parse_line(&line), vec!["a", "b,c", "say \"hi\"", " pad"]);
    }
}
