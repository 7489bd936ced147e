use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "GithubConfig::default_endpoint")]
    pub endpoint: String,
    #[serde(default = "GithubConfig::default_owner")]
    pub owner: String,
    #[serde(default = "GithubConfig::default_repo")]
    pub repo: String,
    #[serde(default = "GithubConfig::default_user_agent")]
    pub user_agent: String,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "GithubConfig::default_token_env")]
    pub token_env: String,
}

impl GithubConfig {
    fn default_endpoint() -> String {
        "https://api.github.com/graphql".to_string()
    }

    fn default_owner() -> String {
        "pyOpenSci".to_string()
    }

    fn default_repo() -> String {
        "software-submission".to_string()
    }

    fn default_user_agent() -> String {
        "peer-review-dashboard".to_string()
    }

    fn default_token_env() -> String {
        "GITHUB_TOKEN".to_string()
    }

    /// Bearer token from the process environment. Blank values count as absent.
    pub fn token(&self) -> Option<String> {
        match std::env::var(&self.token_env) {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
            _ => None,
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            owner: Self::default_owner(),
            repo: Self::default_repo(),
            user_agent: Self::default_user_agent(),
            token_env: Self::default_token_env(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(default = "FetcherConfig::default_page_size")]
    pub page_size: u32,
    #[serde(default = "FetcherConfig::default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "FetcherConfig::default_label_limit")]
    pub label_limit: u32,
}

impl FetcherConfig {
    const fn default_page_size() -> u32 {
        100
    }

    const fn default_page_delay_ms() -> u64 {
        1_000
    }

    const fn default_label_limit() -> u32 {
        20
    }

    /// GitHub rejects `first` values outside 1..=100.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, 100)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            page_size: Self::default_page_size(),
            page_delay_ms: Self::default_page_delay_ms(),
            label_limit: Self::default_label_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlagRule {
    pub name: String,
    pub tag: String,
}

impl FlagRule {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }
}

const DEFAULT_STAGES: &[&str] = &[
    "0/pre-review-checks",
    "1/editor-assigned",
    "2/seeking-reviewers",
    "3/reviewers-assigned",
    "4/reviews-in-awaiting-changes",
    "5/awaiting-reviewer-response",
    "6/pyOS-approved",
    "7/under-joss-review",
    "8/joss-review-complete",
    "9/joss-approved",
];

const DEFAULT_TERMINAL_STAGES: &[&str] = &["6/pyOS-approved", "9/joss-approved"];

const DEFAULT_FLAGS: &[(&str, &str)] = &[
    ("new_submission", "New Submission!"),
    ("presubmission", "presubmission"),
    ("review_underway", "review-underway"),
    ("incomplete", "incomplete"),
    ("out_of_scope", "out-of-scope"),
    ("archived", "archived"),
    ("needs_website", "needs-website"),
    ("duplicate", "duplicate"),
    ("astropy", "astropy"),
    ("pangeo", "Pangeo"),
];

const DEFAULT_AFFILIATIONS: &[&str] = &["astropy", "pangeo"];

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Review stages, earliest first. Order decides precedence.
    #[serde(default = "ClassifierConfig::default_stages")]
    pub stages: Vec<String>,
    #[serde(default = "ClassifierConfig::default_terminal_stages")]
    pub terminal_stages: Vec<String>,
    #[serde(default = "ClassifierConfig::default_flags")]
    pub flags: Vec<FlagRule>,
    #[serde(default = "ClassifierConfig::default_affiliations")]
    pub affiliations: Vec<String>,
}

impl ClassifierConfig {
    fn default_stages() -> Vec<String> {
        owned(DEFAULT_STAGES)
    }

    fn default_terminal_stages() -> Vec<String> {
        owned(DEFAULT_TERMINAL_STAGES)
    }

    fn default_flags() -> Vec<FlagRule> {
        DEFAULT_FLAGS
            .iter()
            .map(|(name, tag)| FlagRule::new(*name, *tag))
            .collect()
    }

    fn default_affiliations() -> Vec<String> {
        owned(DEFAULT_AFFILIATIONS)
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            stages: Self::default_stages(),
            terminal_stages: Self::default_terminal_stages(),
            flags: Self::default_flags(),
            affiliations: Self::default_affiliations(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: String,
    #[serde(default)]
    pub metrics_file: Option<String>,
}

impl OutputConfig {
    fn default_dir() -> String {
        "_data".to_string()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            metrics_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn defaults_cover_every_section() {
        let config = AppConfig::default();
        assert_eq!(config.github.endpoint, "https://api.github.com/graphql");
        assert_eq!(config.fetcher.page_size, 100);
        let stages = &config.classifier.stages;
        assert_eq!(stages.first().unwrap(), "0/pre-review-checks");
        assert_eq!(stages.last().unwrap(), "9/joss-approved");
        assert_eq!(config.classifier.flags.len(), 10);
        assert_eq!(config.output.dir, "_data");
    }

    #[test]
    fn page_size_is_clamped() {
        let mut fetcher = FetcherConfig::default();
        fetcher.page_size = 500;
        assert_eq!(fetcher.effective_page_size(), 100);
        fetcher.page_size = 0;
        assert_eq!(fetcher.effective_page_size(), 1);
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let source = "[fetcher]\npage_size = 25\n";
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .expect("build config")
            .try_deserialize()
            .expect("deserialize config");
        assert_eq!(config.fetcher.page_size, 25);
        assert_eq!(config.fetcher.page_delay_ms, 1_000);
        assert_eq!(config.github.repo, "software-submission");
    }
}
