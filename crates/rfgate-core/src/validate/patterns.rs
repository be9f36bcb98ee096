// ── Field character classes ──
//
// Compiled once on first use. Every user-typed field is checked against
// one class before any range rule runs.

use std::sync::LazyLock;

use regex::Regex;
use strum::{EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum FieldClass {
    Integer,
    NonNegInteger,
    Float,
    DottedQuad,
    HostnameOrDottedQuad,
    Name,
    NameWithBlanks,
    FreeText,
    Hex,
}

impl FieldClass {
    fn pattern(self) -> &'static str {
        match self {
            Self::Integer => r"^-?\d+$",
            Self::NonNegInteger => r"^\d+$",
            Self::Float => r"^-?(\d+\.?\d*|\.\d+)$",
            Self::DottedQuad => r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$",
            Self::HostnameOrDottedQuad => {
                r"^[A-Za-z0-9]([A-Za-z0-9-]{0,62})(\.[A-Za-z0-9]([A-Za-z0-9-]{0,62}))*$"
            }
            Self::Name => r"^[A-Za-z0-9_-]+$",
            Self::NameWithBlanks => r"^[A-Za-z0-9_\-.,#/&()' ]+$",
            Self::FreeText => r"^[^\x00-\x1F<>]*$",
            Self::Hex => r"^(0[xX])?[0-9A-Fa-f]{1,8}$",
        }
    }

    /// Phrase completing "must be ...".
    pub fn describe(self) -> &'static str {
        match self {
            Self::Integer => "a whole number",
            Self::NonNegInteger => "a whole number of 0 or more",
            Self::Float => "a number",
            Self::DottedQuad => "an IP address such as 192.168.1.10",
            Self::HostnameOrDottedQuad => "a host name or IP address",
            Self::Name => "letters, digits, '-' or '_'",
            Self::NameWithBlanks => "letters, digits, spaces or simple punctuation",
            Self::FreeText => "printable text",
            Self::Hex => "a hexadecimal value",
        }
    }

    pub fn matches(self, text: &str) -> bool {
        match self {
            Self::DottedQuad => is_dotted_quad(text),
            // All-digit labels are an address attempt, not a host name.
            Self::HostnameOrDottedQuad if looks_numeric(text) => is_dotted_quad(text),
            class => regex_for(class).is_some_and(|re| re.is_match(text)),
        }
    }
}

static TABLE: LazyLock<Vec<(FieldClass, Regex)>> = LazyLock::new(|| {
    FieldClass::iter()
        .map(|class| {
            let re = Regex::new(class.pattern()).expect("field patterns are static");
            (class, re)
        })
        .collect()
});

fn regex_for(class: FieldClass) -> Option<&'static Regex> {
    TABLE.iter().find(|(c, _)| *c == class).map(|(_, re)| re)
}

fn looks_numeric(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn is_dotted_quad(text: &str) -> bool {
    let Some(caps) = regex_for(FieldClass::DottedQuad).and_then(|re| re.captures(text)) else {
        return false;
    };
    caps.iter()
        .skip(1)
        .flatten()
        .all(|octet| octet.as_str().parse::<u16>().is_ok_and(|n| n <= 255))
}

/// Parse hex text with or without a `0x` prefix.
pub fn parse_hex(text: &str) -> Option<u32> {
    if !FieldClass::Hex.matches(text) {
        return None;
    }
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).ok()
}
