// src/skill_analysis/normalizer.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Built-in colloquial name -> technology category table.
const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("react", "react"),
    ("reactjs", "react"),
    ("react.js", "react"),
    ("react native", "react"),
    ("next.js", "nextjs"),
    ("nextjs", "nextjs"),
    ("next", "nextjs"),
    ("vue", "vue"),
    ("vuejs", "vue"),
    ("vue.js", "vue"),
    ("angular", "angular"),
    ("angularjs", "angular"),
    ("javascript", "javascript"),
    ("js", "javascript"),
    ("es6", "javascript"),
    ("ecmascript", "javascript"),
    ("typescript", "typescript"),
    ("ts", "typescript"),
    ("node", "nodejs"),
    ("nodejs", "nodejs"),
    ("node.js", "nodejs"),
    ("express", "nodejs"),
    ("express.js", "nodejs"),
    ("python", "python"),
    ("py", "python"),
    ("django", "python"),
    ("flask", "python"),
    ("fastapi", "python"),
    ("java", "java"),
    ("spring", "java"),
    ("spring boot", "java"),
    ("go", "go"),
    ("golang", "go"),
    ("rust", "rust"),
    ("sql", "sql"),
    ("postgresql", "sql"),
    ("postgres", "sql"),
    ("mysql", "sql"),
    ("mongodb", "mongodb"),
    ("mongo", "mongodb"),
    ("docker", "docker"),
    ("containers", "docker"),
    ("kubernetes", "kubernetes"),
    ("k8s", "kubernetes"),
    ("aws", "aws"),
    ("amazon web services", "aws"),
    ("azure", "azure"),
    ("gcp", "gcp"),
    ("google cloud", "gcp"),
    ("terraform", "terraform"),
    ("graphql", "graphql"),
    ("git", "git"),
    ("github", "git"),
    ("ci/cd", "devops"),
    ("devops", "devops"),
    ("html", "html-css"),
    ("css", "html-css"),
    ("html/css", "html-css"),
    ("tailwind", "html-css"),
    ("tailwindcss", "html-css"),
    ("machine learning", "machine-learning"),
    ("ml", "machine-learning"),
    ("ai", "machine-learning"),
    ("data science", "machine-learning"),
];

/// Lowercase and trim a skill name. Every comparison in the analyzer goes
/// through this.
pub fn normalize_skill(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Maps skill names onto canonical technology categories.
#[derive(Debug, Clone)]
pub struct SkillNormalizer {
    synonyms: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SynonymFile {
    #[serde(default)]
    synonyms: HashMap<String, String>,
}

impl Default for SkillNormalizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_SYNONYMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }
}

impl SkillNormalizer {
    pub fn new<I>(synonyms: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let synonyms = synonyms
            .into_iter()
            .map(|(k, v)| (normalize_skill(&k), normalize_skill(&v)))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        Self { synonyms }
    }

    /// Add or replace entries on top of the current table.
    pub fn with_synonyms<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in Self::new(extra).synonyms {
            self.synonyms.insert(k, v);
        }
        self
    }

    /// Load a `[synonyms]` TOML table and merge it over the built-in one.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read synonym file: {}", path.display()))?;
        let normalizer = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse synonym file: {}", path.display()))?;
        info!(
            "Loaded {} skill synonyms from {}",
            normalizer.len(),
            path.display()
        );
        Ok(normalizer)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SynonymFile = toml::from_str(content)?;
        Ok(Self::default().with_synonyms(file.synonyms))
    }

    /// Canonical technology for `skill`, by exact lookup after normalizing.
    pub fn technology_for(&self, skill: &str) -> Option<&str> {
        self.synonyms
            .get(&normalize_skill(skill))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}
