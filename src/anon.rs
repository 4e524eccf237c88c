/// Cookie the tracking script stores the anonymous id under.
pub static ANON_ID_COOKIE: &'static str = "tk_ai";

/// Extracts the anonymous tracking id from a `Cookie` header value.
///
/// Returns `None` when the cookie is missing or empty.
pub fn anon_id_from_cookies(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ANON_ID_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
