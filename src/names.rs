/// Canonical join key for a player name.
///
/// Lowercases, trims, drops everything except ascii letters, spaces,
/// hyphens and apostrophes, and collapses whitespace runs to a single
/// space. Every upstream source is keyed through this before any merge.
/// An empty result means the caller should discard the record.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if ch.is_ascii_alphabetic() || ch == '-' || ch == '\'' {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}
