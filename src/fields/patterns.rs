use std::sync::LazyLock;

use regex::Regex;

/// Mobile-style number: optional country code, then ten digits.
pub(crate) static MOBILE_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[ -]?)?\b[6-9]\d{9}\b").expect("mobile phone pattern")
});

/// Grouped number: area code, separator, subscriber digits.
pub(crate) static GROUPED_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\d{2,5}\)?[ -](?:\d{3,4}[ -]\d{3,5}|\d{5,8})\b").expect("grouped phone pattern")
});

pub(crate) static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9][A-Za-z0-9._%+-]*@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern")
});

pub(crate) static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|www\.)[a-z0-9._~:/?#@!$&'()*+,;=%-]+").expect("url pattern")
});

static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").expect("space run"));

static MULTI_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline run"));

pub(crate) fn is_tamil(ch: char) -> bool {
    matches!(ch as u32, 0x0B80..=0x0BFF)
}

fn is_allowed_punct(ch: char) -> bool {
    matches!(
        ch,
        '@' | '.'
            | ','
            | ':'
            | ';'
            | '-'
            | '_'
            | '/'
            | '\\'
            | '+'
            | '#'
            | '&'
            | '('
            | ')'
            | '\''
            | '"'
            | '!'
            | '?'
            | '|'
    )
}

/// Canonical text used for all field matching: Tamil and ASCII alphanumerics
/// plus a fixed punctuation set survive, everything else is dropped. Tabs
/// become spaces, space runs collapse to one, newline runs to at most two.
pub(crate) fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push('\n'),
            '\r' => {}
            _ if ch.is_whitespace() => out.push(' '),
            _ if ch.is_ascii_alphanumeric() || is_tamil(ch) || is_allowed_punct(ch) => {
                out.push(ch);
            }
            _ => {}
        }
    }
    let out = MULTI_SPACE.replace_all(&out, " ");
    let out = MULTI_NEWLINE.replace_all(&out, "\n\n");
    out.trim().to_string()
}

pub(crate) fn collapse_spaces(text: &str) -> String {
    MULTI_SPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_tamil_and_ascii() {
        assert_eq!(sanitize("சென்னை Hotel £5 ©"), "சென்னை Hotel 5");
    }

    #[test]
    fn sanitize_collapses_whitespace_runs() {
        assert_eq!(sanitize("a\t\tb   c\n\n\n\nd"), "a b c\n\nd");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize("ph:  98765\u{00a0}43210 \n\n\n visit\tus");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn mobile_pattern_does_not_match_inside_longer_digit_runs() {
        assert!(MOBILE_PHONE.find("id 987654321012345").is_none());
        assert!(MOBILE_PHONE.find("call 9876543210 now").is_some());
    }
}
