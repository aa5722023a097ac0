//! Shell escaping and quoting utilities.

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a path for shell execution (always quotes).
pub fn quote_path(path: &str) -> String {
    format!("'{}'", escape_single_quote_content(path))
}

/// Escape a command for embedding inside a double-quoted shell string.
/// Backslash, double quote, dollar and backtick lose their meaning to
/// the outer shell; everything else passes through untouched.
pub fn escape_double_quoted(command: &str) -> String {
    let mut escaped = String::with_capacity(command.len());
    for ch in command.chars() {
        if matches!(ch, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_path_simple() {
        assert_eq!(quote_path("/var/www"), "'/var/www'");
    }

    #[test]
    fn quote_path_with_quote() {
        assert_eq!(quote_path("/var/www/it's"), "'/var/www/it'\\''s'");
    }

    #[test]
    fn double_quoted_passthrough() {
        assert_eq!(escape_double_quoted("ls -la"), "ls -la");
    }

    #[test]
    fn double_quoted_escapes_specials() {
        assert_eq!(escape_double_quoted("echo \"hi\""), "echo \\\"hi\\\"");
        assert_eq!(escape_double_quoted("echo $HOME"), "echo \\$HOME");
        assert_eq!(escape_double_quoted("echo `date`"), "echo \\`date\\`");
        assert_eq!(escape_double_quoted("a\\b"), "a\\\\b");
    }

    #[test]
    fn double_quoted_keeps_single_quotes() {
        assert_eq!(escape_double_quoted("echo 'hi'"), "echo 'hi'");
    }
}
