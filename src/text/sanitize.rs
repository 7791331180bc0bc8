use crate::constants::BLANK_TOKENS;

/// Outcome of sanitizing a raw cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// Empty or a null placeholder (`nan`, `n/a`, ...). Short-circuits the pipeline.
    Blank,
    /// Lowercased, trimmed text.
    Text(String),
}

impl Sanitized {
    /// Returns the text, or `None` for [`Sanitized::Blank`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Sanitized::Blank => None,
            Sanitized::Text(text) => Some(text),
        }
    }

    /// Returns `true` for [`Sanitized::Blank`].
    pub fn is_blank(&self) -> bool {
        matches!(self, Sanitized::Blank)
    }
}

/// Lowercases and trims `raw`, mapping placeholder tokens to [`Sanitized::Blank`].
pub fn sanitize(raw: &str) -> Sanitized {
    let lowered = raw.to_lowercase();
    let text = lowered.trim();

    if BLANK_TOKENS.contains(&text) {
        Sanitized::Blank
    } else {
        Sanitized::Text(text.to_string())
    }
}

/// Returns `true` if `raw` sanitizes to a blank cell.
pub fn is_blank(raw: &str) -> bool {
    sanitize(raw).is_blank()
}
