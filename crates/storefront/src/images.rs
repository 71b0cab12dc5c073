//! Image URL helpers.

use url::Url;

/// Width used when callers don't ask for one.
pub const DEFAULT_IMAGE_WIDTH: u32 = 800;

/// Ask the image CDN for a compressed rendition of `url` at `width` pixels.
///
/// Only Pexels URLs are rewritten; any other URL, or one that doesn't parse,
/// comes back unchanged.
///
/// ```
/// use techspec_storefront::images::optimize_image;
///
/// assert_eq!(
///     optimize_image("https://images.pexels.com/photos/1.jpeg", 400),
///     "https://images.pexels.com/photos/1.jpeg?auto=compress&cs=tinysrgb&w=400"
/// );
/// assert_eq!(optimize_image("not a url", 400), "not a url");
/// ```
#[must_use]
pub fn optimize_image(url: &str, width: u32) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    if !parsed.host_str().is_some_and(|host| host.contains("pexels.com")) {
        return url.to_string();
    }

    let overrides = [
        ("auto", "compress".to_string()),
        ("cs", "tinysrgb".to_string()),
        ("w", width.to_string()),
    ];
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !overrides.iter().any(|(k, _)| *k == &**key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = parsed.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept);
        pairs.extend_pairs(overrides);
    }
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_existing_params() {
        assert_eq!(
            optimize_image("https://images.pexels.com/p.jpeg?w=1200&h=600", 800),
            "https://images.pexels.com/p.jpeg?h=600&auto=compress&cs=tinysrgb&w=800"
        );
    }

    #[test]
    fn test_other_hosts_unchanged() {
        let url = "https://cdn.example.com/p.jpeg?w=1200";
        assert_eq!(optimize_image(url, 800), url);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(optimize_image("", DEFAULT_IMAGE_WIDTH), "");
    }
}
