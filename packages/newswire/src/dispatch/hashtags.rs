//! Category hashtag lookup for the messaging footer.
//!
//! Category names arrive from feed metadata with inconsistent spacing,
//! zero-width joiners, and truncated variants, so lookup goes exact
//! match first, then substring match against the longest keys.

/// Category table, four hashtags per category.
const CATEGORY_HASHTAGS: &[(&str, &[&str])] = &[
    (
        "خودرو",
        &["#خودرو", "#بازار_خودرو", "#قیمت_خودرو", "#صنعت_خودرو"],
    ),
    (
        "اخبار اقتصادی",
        &["#اقتصاد", "#اخبار_اقتصادی", "#بازار", "#اقتصاد_ایران"],
    ),
    (
        "بنادر و دریانوردی",
        &["#بنادر", "#دریانوردی", "#تجارت_دریایی", "#حمل_و_نقل"],
    ),
    ("طلا و ارز", &["#طلا", "#ارز", "#قیمت_طلا", "#قیمت_دلار"]),
    ("قیمت روز", &["#قیمت_روز", "#نرخ_روز", "#بازار", "#قیمت"]),
    (
        "اقتصاد جهان",
        &["#اقتصاد_جهان", "#اقتصاد_بین_الملل", "#بازار_جهانی", "#جهان"],
    ),
    (
        "مسکن و شهرسازی",
        &["#مسکن", "#شهرسازی", "#بازار_مسکن", "#ساختمان"],
    ),
    (
        "راههای کشور",
        &["#راه_و_شهرسازی", "#حمل_و_نقل", "#زیرساخت", "#جاده"],
    ),
    (
        "ارزدیجیتال",
        &["#ارز_دیجیتال", "#بیت_کوین", "#کریپتو", "#رمزارز"],
    ),
    ("بورس", &["#بورس", "#بازار_سرمایه", "#بورس_تهران", "#سهام"]),
];

/// Collapse whitespace and drop zero-width joiners and Arabic
/// diacritics so feed variants of the same category compare equal.
pub fn normalize_category(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(*c, '\u{200C}' | '\u{200D}'))
        .filter(|c| !('\u{064B}'..='\u{065F}').contains(c) && *c != '\u{0670}')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hashtags for a category name, with substring fallback and a
/// generated tag when nothing matches.
pub fn hashtags_for_category(category: &str) -> Vec<String> {
    let normalized = normalize_category(category);
    if normalized.is_empty() {
        return vec!["#اخبار".to_string()];
    }

    // exact match after normalization
    for (key, tags) in CATEGORY_HASHTAGS {
        if normalize_category(key) == normalized {
            return tags.iter().map(|t| t.to_string()).collect();
        }
    }

    // world-economy variants ("اقتصاد ایران - جهان" etc.) appear under
    // several names in the wild
    if normalized.contains("اقتصاد")
        && (normalized.contains("جهان")
            || normalized.contains("بین")
            || normalized.contains("الملل"))
    {
        return ["#اقتصاد_جهان", "#اقتصاد_بین_الملل", "#بازار_جهانی", "#جهان"]
            .iter()
            .map(|t| t.to_string())
            .collect();
    }

    // substring match, longest keys first so specific categories win
    let mut keys: Vec<&(&str, &[&str])> = CATEGORY_HASHTAGS.iter().collect();
    keys.sort_by_key(|(key, _)| std::cmp::Reverse(key.chars().count()));
    for (key, tags) in keys {
        let normalized_key = normalize_category(key);
        if (normalized.contains(&normalized_key) || normalized_key.contains(&normalized))
            && normalized_key.chars().count() >= 4
            && normalized.chars().count() >= 4
        {
            return tags.iter().map(|t| t.to_string()).collect();
        }
    }

    // fallback: a tag generated from the name itself
    let generated: String = normalized
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    vec![
        format!("#{}", generated),
        "#اخبار".to_string(),
        "#ایران".to_string(),
        "#اقتصاد".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let tags = hashtags_for_category("بورس");
        assert_eq!(tags[0], "#بورس");
        assert_eq!(tags.len(), 4);
    }

    #[test]
    fn test_normalization_collapses_spaces() {
        assert_eq!(normalize_category("  طلا   و  ارز "), "طلا و ارز");
    }

    #[test]
    fn test_world_economy_variant() {
        let tags = hashtags_for_category("اقتصاد ایران - جهان");
        assert_eq!(tags[0], "#اقتصاد_جهان");
    }

    #[test]
    fn test_unknown_category_generates_fallback() {
        let tags = hashtags_for_category("گردشگری");
        assert_eq!(tags[0], "#گردشگری");
        assert!(tags.contains(&"#اخبار".to_string()));
    }

    #[test]
    fn test_empty_category_default() {
        assert_eq!(hashtags_for_category(""), vec!["#اخبار"]);
    }
}
