//! Domain extraction for per-domain volume preferences.

/// Extract the preference key for a tab URL.
///
/// Strips the scheme, any userinfo, a leading `www.`, the port and everything
/// after the authority. Returns `None` when nothing usable remains, which
/// callers treat as "skip persistence".
pub fn domain_of(url: &str) -> Option<String> {
    let url = url.trim();

    let rest = match url.find("://") {
        Some(idx) if is_scheme(&url[..idx]) => &url[idx + 3..],
        _ => url,
    };

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];

    let host_port = match authority.rfind('@') {
        Some(idx) => &authority[idx + 1..],
        None => authority,
    };

    let host = host_port
        .split(':')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return None;
    }

    Some(host.to_string())
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
