// src/utils.rs

/// Integer percentage of `part` over `total`, rounded half up.
/// A zero total yields 0 instead of dividing.
pub fn percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// Same as [`percentage`] but never above 100. Used where the numerator
/// comes from an uncapped index count while the denominator is capped.
pub fn bounded_percentage(part: u64, total: u64) -> u32 {
    percentage(part, total).min(100)
}

/// Loose skill equality: either string contains the other.
///
/// Both inputs are expected to be normalized already. This is permissive on
/// purpose and matches "java" against "javascript"; callers rely on that
/// tolerance for phrasing differences such as "react" vs "react.js".
pub fn skills_overlap(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

/// Split a comma separated skill list as typed on the command line.
pub fn split_skill_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(40, 100), 40);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn test_bounded_percentage() {
        assert_eq!(bounded_percentage(1500, 1000), 100);
        assert_eq!(bounded_percentage(250, 1000), 25);
    }

    #[test]
    fn test_skills_overlap() {
        assert!(skills_overlap("react", "react.js"));
        assert!(skills_overlap("react.js", "react"));
        assert!(skills_overlap("java", "javascript"));
        assert!(!skills_overlap("go", "rust"));
        assert!(!skills_overlap("", "rust"));
    }

    #[test]
    fn test_split_skill_list() {
        assert_eq!(
            split_skill_list(" react, docker ,,node.js"),
            vec!["react", "docker", "node.js"]
        );
        assert!(split_skill_list(" , ").is_empty());
    }
}
