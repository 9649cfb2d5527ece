use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Choice {
    A,
    B,
    C,
    #[default]
    D,
}

impl Choice {
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn from_letter(letter: &str) -> Option<Choice> {
        match letter.to_uppercase().as_str() {
            "A" => Some(Choice::A),
            "B" => Some(Choice::B),
            "C" => Some(Choice::C),
            "D" => Some(Choice::D),
            _ => None,
        }
    }

    pub fn as_number(self) -> u8 {
        match self {
            Choice::A => 0,
            Choice::B => 1,
            Choice::C => 2,
            Choice::D => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::C => "C",
            Choice::D => "D",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer shapes, most anchored first. Searched anywhere in the response,
/// case-insensitively; the first pattern with a match decides.
const ANSWER_PATTERNS: [&str; 11] = [
    r"answer\s*[:\-]\s*\[([ABCD])\]",
    r"\[([ABCD])\]",
    r"answer\s*[:\-]\s*([ABCD])\b",
    r"\b([ABCD])\b",
    r"answer\s*[:\-]\s*\[([ABCD])\]\b",
    r"answer\s*is\s*\[([ABCD])\]",
    r"answer\s*is\s*([ABCD])",
    r"the\s*answer\s*is\s*\[([ABCD])\]",
    r"the\s*answer\s*is\s*([ABCD])",
    r"choice\s*[:\-]\s*\[([ABCD])\]",
    r"option\s*[:\-]\s*\[([ABCD])\]",
];

static ANSWER_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    ANSWER_PATTERNS
        .iter()
        .map(|pattern| Regex::new(&format!("(?i){pattern}")).unwrap())
        .collect()
});

/// Outcome of the cascade: the letter plus the 1-based pattern slot that
/// produced it, `None` when the default applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parsed {
    pub choice: Choice,
    pub rule: Option<usize>,
}

pub fn parse_response_detailed(response: Option<&str>) -> Parsed {
    let fallback = Parsed {
        choice: Choice::D,
        rule: None,
    };
    let response = match response {
        Some(r) if !r.is_empty() => r.trim(),
        _ => return fallback,
    };

    for (idx, re) in ANSWER_RES.iter().enumerate() {
        if let Some(caps) = re.captures(response) {
            if let Some(choice) = Choice::from_letter(&caps[1]) {
                return Parsed {
                    choice,
                    rule: Some(idx + 1),
                };
            }
        }
    }

    debug!("[Parse] no answer pattern in {:?}, defaulting to D", response);
    fallback
}

/// Lenient answer extraction; never fails, defaults to `D`.
pub fn parse_response(response: Option<&str>) -> Choice {
    parse_response_detailed(response).choice
}

/// `A`..`D` (either case) to `0`..`3`; anything else is `3`.
pub fn option_to_number(option: &str) -> u8 {
    Choice::from_letter(option).unwrap_or(Choice::D).as_number()
}
