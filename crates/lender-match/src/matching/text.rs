/// Matching key: invisible characters stripped, whitespace collapsed, lowercase.
pub(crate) fn normalize_label(value: &str) -> String {
    display_label(value).to_lowercase()
}

/// Display form: invisible characters stripped and whitespace collapsed, casing kept.
pub(crate) fn display_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "").replace('\u{00a0}', " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase identifier with every run of non-alphanumerics replaced by `separator`.
pub(crate) fn slug(value: &str, separator: char) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(separator);
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Drops one trailing plural `s` ("loans" -> "loan") but leaves "ss" endings alone.
pub(crate) fn singular(value: &str) -> &str {
    if value.len() > 1 && value.ends_with('s') && !value.ends_with("ss") {
        &value[..value.len() - 1]
    } else {
        value
    }
}

/// Lowercase words of at least `min_len` alphanumeric characters.
pub(crate) fn words(value: &str, min_len: usize) -> Vec<String> {
    value
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| word.chars().count() >= min_len)
        .map(str::to_lowercase)
        .collect()
}
