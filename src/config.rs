use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubConfig>,
    #[serde(default)]
    pub assign: AssignConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GitHubConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl GitHubConfig {
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn repository(&self) -> Option<(&str, &str)> {
        match (self.owner.as_deref(), self.repo.as_deref()) {
            (Some(owner), Some(repo)) => Some((owner, repo)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignConfig {
    /// Open assigned issues that count as a 100% workload.
    #[serde(default = "default_full_load_issues")]
    pub full_load_issues: u32,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            full_load_issues: default_full_load_issues(),
        }
    }
}

fn default_full_load_issues() -> u32 {
    5
}

/// Declared skills for a collaborator. `workload` pins the percentage instead
/// of deriving it from open issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub login: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<f64>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.assign.full_load_issues == 0 {
            bail!("assign.full_load_issues must be at least 1");
        }
        for member in &self.team {
            if member.login.trim().is_empty() {
                bail!("team entries need a login");
            }
            if member.skills.iter().any(|s| s.trim().is_empty()) {
                bail!("team member {} has a blank skill", member.login);
            }
            if let Some(workload) = member.workload {
                if !workload.is_finite() {
                    bail!("team member {} has a non-finite workload", member.login);
                }
            }
        }
        Ok(())
    }

    /// Token from `GITHUB_TOKEN`, falling back to the config file.
    pub fn token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                self.github
                    .as_ref()
                    .map(|g| g.token.clone())
                    .filter(|t| !t.is_empty())
            })
    }

    pub fn github_mut(&mut self) -> &mut GitHubConfig {
        self.github.get_or_insert_with(GitHubConfig::default)
    }
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".workboard")
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}

/// Splits `owner/repo`.
pub fn parse_repository(spec: &str) -> Result<(String, String)> {
    let spec = spec.trim().trim_end_matches(".git");
    let spec = spec
        .strip_prefix("https://github.com/")
        .unwrap_or(spec)
        .trim_matches('/');
    match spec.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => bail!("Expected a repository as owner/repo, got {spec:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.github.is_none());
        assert_eq!(config.assign.full_load_issues, 5);
        assert!(config.team.is_empty());
    }

    #[test]
    fn parses_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[github]
token = "ghp_test"
owner = "acme"
repo = "site"

[assign]
full_load_issues = 4

[[team]]
login = "janedoe"
skills = ["backend", "security"]

[[team]]
login = "johndoe"
skills = ["frontend"]
workload = 75
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        let github = config.github.as_ref().unwrap();
        assert_eq!(github.repository(), Some(("acme", "site")));
        assert_eq!(github.api_url(), DEFAULT_API_URL);
        assert_eq!(config.assign.full_load_issues, 4);
        assert_eq!(config.team.len(), 2);
        assert_eq!(config.team[1].workload, Some(75.0));
    }

    #[test]
    fn zero_full_load_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[assign]\nfull_load_issues = 0\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("full_load_issues"));
    }

    #[test]
    fn non_finite_roster_workload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[team]]\nlogin = \"jane\"\nworkload = nan\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("non-finite workload"));

        std::fs::write(&path, "[[team]]\nlogin = \"jane\"\nworkload = inf\n").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn invalid_toml_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[github\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn save_then_load_keeps_repository() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        let github = config.github_mut();
        github.token = "ghp_saved".into();
        github.owner = Some("acme".into());
        github.repo = Some("site".into());
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let github = loaded.github.unwrap();
        assert_eq!(github.token, "ghp_saved");
        assert_eq!(github.repository(), Some(("acme", "site")));
    }

    #[test]
    fn parse_repository_forms() {
        assert_eq!(
            parse_repository("acme/site").unwrap(),
            ("acme".to_string(), "site".to_string())
        );
        assert_eq!(
            parse_repository("https://github.com/acme/site.git").unwrap(),
            ("acme".to_string(), "site".to_string())
        );
        assert!(parse_repository("acme").is_err());
        assert!(parse_repository("acme/site/issues").is_err());
        assert!(parse_repository("/site").is_err());
    }
}
