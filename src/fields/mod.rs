use regex::Regex;
use serde::Serialize;

mod patterns;

/// Structured fields parsed from a cleaned transcript. Every field is `None`
/// when nothing matched; `other_text` never repeats a line already claimed
/// by address, email, or url, and inline phone/email/url fragments are
/// stripped from the lines it keeps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedFields {
    pub full_text: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub other_text: Option<String>,
}

/// Classifies cleaned transcript text into disjoint structured fields. The
/// address keyword alternation is compiled once per parser.
pub struct FieldParser {
    address_line: Option<Regex>,
}

impl FieldParser {
    pub fn new(address_keywords: &[String]) -> Self {
        let alternation = address_keywords
            .iter()
            .map(|keyword| keyword.trim())
            .filter(|keyword| !keyword.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let address_line = if alternation.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\b(?:{alternation})\b");
            Some(Regex::new(&pattern).expect("address keyword pattern"))
        };
        Self { address_line }
    }

    pub fn parse(&self, text: &str) -> ParsedFields {
        let canonical = patterns::sanitize(text);
        if canonical.is_empty() {
            return ParsedFields::default();
        }

        let lines = canonical
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        let full_text = lines.join("\n");

        let phones = extract_phones(&canonical);
        let emails = find_unique(&patterns::EMAIL, &canonical);
        let urls = extract_urls(&canonical);
        let address_lines = lines
            .iter()
            .filter(|line| self.is_address_line(line))
            .cloned()
            .collect::<Vec<_>>();

        let mut other = Vec::new();
        for line in &lines {
            if address_lines.iter().any(|candidate| candidate == line) {
                continue;
            }
            if emails.iter().any(|candidate| candidate == line) {
                continue;
            }
            if urls.iter().any(|candidate| candidate == line) {
                continue;
            }
            let residue = strip_inline_matches(line);
            if residue.chars().count() <= 1 {
                continue;
            }
            other.push(residue);
        }

        ParsedFields {
            full_text: none_if_empty(full_text),
            address: none_if_empty(address_lines.join(" | ")),
            phone: none_if_empty(phones.join(", ")),
            email: none_if_empty(emails.join(", ")),
            url: none_if_empty(urls.join(", ")),
            other_text: none_if_empty(other.join("\n")),
        }
    }

    /// An address line carries at least one digit and one keyword; lines with
    /// an embedded address fragment plus unrelated text still qualify whole.
    fn is_address_line(&self, line: &str) -> bool {
        let Some(keyword) = &self.address_line else {
            return false;
        };
        line.chars().any(|ch| ch.is_ascii_digit()) && keyword.is_match(line)
    }
}

/// Keyword list used by the default configuration, tuned for Tamil Nadu
/// street naming alongside the generic English terms.
pub fn default_address_keywords() -> Vec<String> {
    [
        "street", "road", "rd", "st", "lane", "avenue", "nagar", "salai", "theru", "veedhi",
        "colony", "block", "sector", "floor", "cross", "main", "district", "post", "pin",
    ]
    .iter()
    .map(|keyword| keyword.to_string())
    .collect()
}

fn extract_phones(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in [&*patterns::MOBILE_PHONE, &*patterns::GROUPED_PHONE] {
        for matched in pattern.find_iter(text) {
            let candidate = matched.as_str().trim().to_string();
            let digits = candidate.chars().filter(|ch| ch.is_ascii_digit()).count();
            if !(7..=15).contains(&digits) {
                continue;
            }
            if !found.contains(&candidate) {
                found.push(candidate);
            }
        }
    }
    found
}

fn extract_urls(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for matched in patterns::URL.find_iter(text) {
        let candidate = matched
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', '"'])
            .to_string();
        if candidate.is_empty() {
            continue;
        }
        if !found.contains(&candidate) {
            found.push(candidate);
        }
    }
    found
}

fn find_unique(pattern: &Regex, text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for matched in pattern.find_iter(text) {
        let candidate = matched.as_str().to_string();
        if !found.contains(&candidate) {
            found.push(candidate);
        }
    }
    found
}

fn strip_inline_matches(line: &str) -> String {
    let without_mobile = patterns::MOBILE_PHONE.replace_all(line, "");
    let without_grouped = patterns::GROUPED_PHONE.replace_all(&without_mobile, "");
    let without_email = patterns::EMAIL.replace_all(&without_grouped, "");
    let without_url = patterns::URL.replace_all(&without_email, "");
    patterns::collapse_spaces(&without_url)
}

fn none_if_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
