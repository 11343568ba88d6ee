//! Value parsers for CLI arguments and config file values

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// Validate a byte size; `k`/`m` suffixes multiply by 1000 and 1000000
pub fn validate_byte_size(value: &str) -> Result<u64, String> {
    let trimmed = value.trim().to_lowercase();
    let (digits, multiplier) = match trimmed.strip_suffix('k') {
        Some(digits) => (digits, 1_000),
        None => match trimmed.strip_suffix('m') {
            Some(digits) => (digits, 1_000_000),
            None => (trimmed.as_str(), 1),
        },
    };
    match digits.parse::<u64>() {
        Ok(0) => Err("Size must be greater than 0".to_string()),
        Ok(n) => n
            .checked_mul(multiplier)
            .ok_or_else(|| format!("Size '{}' is too large", value)),
        Err(_) => Err(format!("'{}' is not a valid size", value)),
    }
}

/// Validate file extension format
pub fn validate_extension(ext: &str) -> Result<String, String> {
    let cleaned = ext.strip_prefix('.').unwrap_or(ext);

    if cleaned.is_empty() {
        return Err("Extension cannot be empty".to_string());
    }

    if cleaned.contains('/') || cleaned.contains('\\') {
        return Err("Extension cannot contain path separators".to_string());
    }

    Ok(cleaned.to_lowercase())
}

/// Validate glob pattern syntax
pub fn validate_glob_pattern(pattern: &str) -> Result<String, String> {
    match glob::Pattern::new(pattern) {
        Ok(_) => Ok(pattern.to_string()),
        Err(e) => Err(format!("Invalid glob pattern '{}': {}", pattern, e)),
    }
}

/// Validate a marker tag: one word of letters, digits or `_`
pub fn validate_tag(tag: &str) -> Result<String, String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err("Tag cannot be empty".to_string());
    }
    if !tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!(
            "Tag '{}' may only contain letters, digits and underscores",
            tag
        ));
    }
    Ok(tag.to_string())
}

/// Validate a view URL template; it must reference `{path}`
pub fn validate_url_template(template: &str) -> Result<String, String> {
    if !template.contains("{path}") {
        return Err(format!(
            "View URL template '{}' must contain the {{path}} placeholder",
            template
        ));
    }
    Ok(template.to_string())
}
