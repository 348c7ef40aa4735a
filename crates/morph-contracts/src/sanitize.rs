const FENCE: &str = "```";
const OPENING_FENCES: [&str; 3] = ["```xml", "```svg", FENCE];

/// Strips markdown code fences the model sometimes wraps its SVG in.
///
/// Repeats until a pass changes nothing, so the output never starts with an
/// opening fence or ends with a closing one and a second call is a no-op.
pub fn strip_code_fences(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let next = strip_once(current);
        if next == current {
            return current.to_string();
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = OPENING_FENCES
        .iter()
        .find_map(|fence| body.strip_prefix(*fence))
    {
        body = rest.trim();
    }
    if let Some(rest) = body.strip_suffix(FENCE) {
        body = rest.trim();
    }
    body
}
