/// Hostname-derived visual identity for tabs (favicon fallback badges)
use crate::tab_data::Tab;
use url::Url;

/// Badge palette; a hostname always lands on the same entry
pub const FAVICON_COLORS: [&str; 8] = [
    "#2563EB", "#10B981", "#F59E0B", "#EF4444",
    "#8B5CF6", "#EC4899", "#0891B2", "#D97706",
];

/// Initials shown when the URL cannot be parsed
pub const UNKNOWN_INITIALS: &str = "??";

/// Icon to render for a tab: the host favicon if any, with a badge to fall back to
#[derive(Debug, Clone, PartialEq)]
pub struct Favicon {
    pub image: Option<String>,
    pub badge: InitialsBadge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitialsBadge {
    pub initials: String,
    pub color: &'static str,
}

impl Favicon {
    pub fn for_tab(tab: &Tab) -> Favicon {
        let image = tab
            .fav_icon_url
            .as_deref()
            .filter(|src| !src.is_empty())
            .map(str::to_string);

        Favicon {
            image,
            badge: InitialsBadge::for_url(tab.url()),
        }
    }
}

impl InitialsBadge {
    pub fn for_url(url: &str) -> InitialsBadge {
        let hostname = extract_hostname(url).unwrap_or_default();
        InitialsBadge {
            initials: initials(url),
            color: color_from_domain(&hostname),
        }
    }
}

/// Hostname of a URL, `None` when the URL does not parse
///
/// URLs without a host (e.g. `about:blank`) yield an empty hostname.
pub fn extract_hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .map(|parsed| parsed.host_str().unwrap_or_default().to_string())
}

/// Two-letter badge text for a URL
///
/// Algorithm:
/// 1. Parse the URL and take its hostname
/// 2. Strip a leading "www."
/// 3. Keep the label before the first "."
/// 4. Uppercase its first two characters
///
/// Examples:
/// - https://www.google.com/search → GO
/// - https://x.com → X
/// - not a url → ??
pub fn initials(url: &str) -> String {
    match extract_hostname(url) {
        Some(hostname) => {
            let hostname = hostname.strip_prefix("www.").unwrap_or(&hostname);
            let label = hostname.split('.').next().unwrap_or_default();
            label.chars().take(2).collect::<String>().to_uppercase()
        }
        None => UNKNOWN_INITIALS.to_string(),
    }
}

/// Deterministic palette color for a hostname
///
/// Polynomial string hash over UTF-16 code units with 32-bit wrapping
/// (`hash = c + (hash << 5) - hash`), folded onto the palette by absolute value.
pub fn color_from_domain(domain: &str) -> &'static str {
    let hash = domain.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });
    FAVICON_COLORS[hash.unsigned_abs() as usize % FAVICON_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials_basic() {
        assert_eq!(initials("https://www.google.com/search?q=rust"), "GO");
        assert_eq!(initials("https://github.com/rust-lang/rust"), "GI");
        assert_eq!(initials("https://docs.rs"), "DO");
    }

    #[test]
    fn test_initials_short_label() {
        assert_eq!(initials("https://x.com"), "X");
    }

    #[test]
    fn test_initials_unparseable_url() {
        assert_eq!(initials(""), "??");
        assert_eq!(initials("not a url"), "??");
    }

    #[test]
    fn test_initials_hostless_url() {
        assert_eq!(initials("about:blank"), "");
    }

    #[test]
    fn test_extract_hostname_keeps_www() {
        assert_eq!(extract_hostname("https://www.bbc.co.uk/news"), Some("www.bbc.co.uk".to_string()));
        assert_eq!(extract_hostname("http://localhost:3000"), Some("localhost".to_string()));
        assert_eq!(extract_hostname("::"), None);
    }

    #[test]
    fn test_color_from_domain_is_deterministic() {
        let first = color_from_domain("example.com");
        for _ in 0..10 {
            assert_eq!(color_from_domain("example.com"), first);
        }
        assert!(FAVICON_COLORS.contains(&first));
    }

    #[test]
    fn test_color_from_domain_known_values() {
        // "a" hashes to 97 → 97 % 8 = 1
        assert_eq!(color_from_domain("a"), FAVICON_COLORS[1]);
        // empty hostname hashes to 0
        assert_eq!(color_from_domain(""), FAVICON_COLORS[0]);
        // "ab": 98 + (97 * 31) = 3105 → 3105 % 8 = 1
        assert_eq!(color_from_domain("ab"), FAVICON_COLORS[1]);
    }

    #[test]
    fn test_color_from_domain_long_hostname_wraps() {
        let long = "a-very-long-subdomain-name.with.many.labels.example.co.uk";
        assert!(FAVICON_COLORS.contains(&color_from_domain(long)));
    }

    #[test]
    fn test_favicon_prefers_host_icon() {
        let mut tab = Tab::new(1, "https://www.google.com", "Google", -1);
        tab.fav_icon_url = Some("https://www.google.com/favicon.ico".to_string());

        let favicon = Favicon::for_tab(&tab);

        assert_eq!(favicon.image.as_deref(), Some("https://www.google.com/favicon.ico"));
        assert_eq!(favicon.badge.initials, "GO");
        assert_eq!(favicon.badge.color, color_from_domain("www.google.com"));
    }

    #[test]
    fn test_favicon_without_icon_uses_badge() {
        let mut tab = Tab::new(1, "https://github.com", "GitHub", -1);
        tab.fav_icon_url = Some(String::new());

        let favicon = Favicon::for_tab(&tab);

        assert_eq!(favicon.image, None);
        assert_eq!(favicon.badge.initials, "GI");
    }
}
