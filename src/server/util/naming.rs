const MAX_CHANNEL_NAME_LEN: usize = 100;

/// Builds a Discord text channel name such as `ticket-ferris` from a display name.
///
/// Discord lowercases channel names and rejects most punctuation, so anything outside
/// `[a-z0-9]` becomes a single `-`. A name with nothing usable falls back to `fallback`,
/// typically the user id.
pub fn channel_name(prefix: &str, name: &str, fallback: u64) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');

    let name = if slug.is_empty() {
        format!("{}-{}", prefix, fallback)
    } else {
        format!("{}-{}", prefix, slug)
    };
    truncate(&name, MAX_CHANNEL_NAME_LEN)
}

/// Cuts `text` to at most `max` characters, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
