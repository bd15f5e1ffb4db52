/// Collapses whitespace and numbers `?` placeholders as `$1`, `$2`, ...
pub fn sql(query: &str) -> String {
    let cleaned = query.split_whitespace().collect::<Vec<&str>>().join(" ");
    let mut result = String::with_capacity(cleaned.len() + 8);
    let mut param_index = 1;

    for ch in cleaned.chars() {
        if ch == '?' {
            result.push_str(&format!("${}", param_index));
            param_index += 1;
        } else {
            result.push(ch);
        }
    }

    result
}

/// `%term%` for ILIKE, with the LIKE metacharacters in `term` escaped.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
