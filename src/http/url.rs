use std::fmt::Write;

/// Appends `params` to `base_url` as a query string.
///
/// A base that already carries a query (`?site=1`, `?rest_route=/x`) is
/// continued with `&`. Keys and values are encoded like `encodeURIComponent`.
pub fn construct_url(
    base_url: &str,
    params: &[(String, String)],
) -> Result<String, std::fmt::Error> {
    let mut url = String::with_capacity(base_url.len() + params.len() * 24);
    url.push_str(base_url);

    let Some((first, rest)) = params.split_first() else {
        return Ok(url);
    };

    match base_url.rfind('?') {
        None => url.push('?'),
        Some(idx) if idx + 1 == base_url.len() || base_url.ends_with('&') => {}
        Some(_) => url.push('&'),
    }

    push_pair(&mut url, first)?;
    for pair in rest {
        url.push('&');
        push_pair(&mut url, pair)?;
    }

    Ok(url)
}

fn push_pair(url: &mut String, (key, value): &(String, String)) -> std::fmt::Result {
    encode_component(url, key)?;
    url.push('=');
    encode_component(url, value)
}

fn is_component_safe(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&b)
}

fn encode_component(out: &mut String, input: &str) -> std::fmt::Result {
    for &b in input.as_bytes() {
        if is_component_safe(b) {
            out.push(b as char);
        } else {
            write!(out, "%{:02X}", b)?;
        }
    }

    Ok(())
}
