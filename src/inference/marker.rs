use regex::Regex;

/// A README override label such as `Status:` or `Organization:`.
///
/// A marker may carry several spellings; any of them matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    labels: &'static [&'static str],
}

impl Marker {
    pub const ORGANIZATION: Marker = Marker {
        labels: &["Organization", "Org"],
    };
    pub const CONTACT_EMAIL: Marker = Marker {
        labels: &["Contact email"],
    };
    pub const STATUS: Marker = Marker { labels: &["Status"] };
    pub const VERSION: Marker = Marker {
        labels: &["Version"],
    };
    pub const EXEMPTION: Marker = Marker {
        labels: &["Exemption"],
    };
    pub const EXEMPTION_JUSTIFICATION: Marker = Marker {
        labels: &["Exemption justification"],
    };

    fn pattern(&self) -> String {
        let alternation = self
            .labels
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|");
        // Horizontal whitespace only: a bare `Label:` must not borrow the next line.
        format!(r"(?im)^[ \t]*(?:{alternation}):[ \t]*(.*)$")
    }
}

/// Find the first line of `text` that starts with `marker` and return the rest
/// of that line, trimmed.
///
/// Matching is case-insensitive and anchored to the start of a line (leading
/// indentation is allowed). Missing text, no matching line, or an empty value
/// all yield `None`.
pub fn extract(text: Option<&str>, marker: Marker) -> Option<String> {
    let text = text?;
    let re = Regex::new(&marker.pattern()).ok()?;
    let value = re.captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
