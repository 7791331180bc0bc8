/// Renders a canonical title in display case.
///
/// Whitespace-separated tokens that are entirely upper-case (acronyms such as `HR` or `R&D`)
/// are kept verbatim. Other tokens are split on `-`, each part gets an upper-case first
/// letter and a lower-case tail, and the hyphens are put back.
///
/// The function is idempotent: its output is a fixed point of itself.
///
/// ```
/// use titlenorm::text::format_title;
///
/// assert_eq!(format_title("senior  site-engineer"), "Senior Site-Engineer");
/// assert_eq!(format_title("HR executive"), "HR Executive");
/// ```
pub fn format_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(|token| {
            if is_all_upper(token) {
                token.to_string()
            } else {
                token
                    .split('-')
                    .map(capitalize)
                    .collect::<Vec<_>>()
                    .join("-")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// At least one cased character and no lower-case ones.
fn is_all_upper(token: &str) -> bool {
    token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase)
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut out = String::with_capacity(part.len());
    // Multi-char upper-case expansions (`ß` -> `SS`) keep only their head upper-case, so a
    // second pass sees the same head and a lower-case tail.
    let mut upper = first.to_uppercase();
    if let Some(head) = upper.next() {
        out.push(head);
    }
    for c in upper {
        out.extend(c.to_lowercase());
    }
    out.push_str(&chars.as_str().to_lowercase());
    out
}
