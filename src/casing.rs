//! Identifier casing helpers shared by analysis and emitters.

/// Split an identifier into lowercase words.
///
/// Boundaries are non-alphanumeric characters, lower→upper transitions, and the last
/// capital of an acronym run (`HTTPServer` → `http`, `server`).
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `create_widget`, `create-widget`, `createWidget` → `CreateWidget`
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// `CreateWidget` → `createWidget`
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut out = String::new();
    for (i, w) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(w);
        } else {
            out.push_str(&capitalize(w));
        }
    }
    out
}

/// `PriceAlert` → `price-alert`
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// English singular of a single lowercase word, for resource names.
pub fn singularize_word(word: &str) -> String {
    const IRREGULAR: [(&str, &str); 6] = [
        ("people", "person"),
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("data", "data"),
        ("status", "status"),
    ];
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return (*singular).to_string();
    }
    if word.len() > 3 {
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "xes", "ches", "shes", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

/// Singularize the last word of an identifier and return it kebab-cased.
///
/// `priceAlerts` → `price-alert`, `categories` → `category`
pub fn singularize(s: &str) -> String {
    let mut words = split_words(s);
    if let Some(last) = words.last_mut() {
        *last = singularize_word(last);
    }
    words.join("-")
}

/// ASCII identifier usable as a TypeScript type name.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("createWidget"), vec!["create", "widget"]);
        assert_eq!(split_words("HTTPServer_v2"), vec!["http", "server", "v2"]);
        assert_eq!(split_words("price-alerts"), vec!["price", "alerts"]);
        assert_eq!(split_words("getV2Items"), vec!["get", "v2", "items"]);
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_pascal_case("create_widget"), "CreateWidget");
        assert_eq!(to_camel_case("CreateWidget"), "createWidget");
        assert_eq!(to_kebab_case("PriceAlert"), "price-alert");
        assert_eq!(to_pascal_case("price-alert"), "PriceAlert");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("widgets"), "widget");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("priceAlerts"), "price-alert");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("schedule"), "schedule");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("Widget"));
        assert!(is_identifier("_Widget2"));
        assert!(!is_identifier("Widget Entity"));
        assert!(!is_identifier("2Widget"));
        assert!(!is_identifier(""));
    }
}
