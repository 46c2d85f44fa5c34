use crate::envelope::DEFAULT_ASSET_HOST;
use crate::source::DEFAULT_ENDPOINT;
use crate::viewport::RootMargin;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "ideas.yaml";

#[derive(Deserialize)]
struct TimeoutSecs(u64);
impl Default for TimeoutSecs {
    fn default() -> Self {
        TimeoutSecs(10)
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct ViewportSize {
    width: f64,
    height: f64,
}
impl Default for ViewportSize {
    fn default() -> Self {
        ViewportSize {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct Project {
    endpoint: Option<Url>,
    asset_host: Option<String>,
    timeout_secs: TimeoutSecs,
    root_margin: RootMargin,
    viewport: ViewportSize,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
}

pub struct Config {
    /// The listing endpoint.
    pub endpoint: Url,

    /// The host image URLs are moved to.
    pub asset_host: String,

    /// The per-request timeout.
    pub timeout: Duration,

    pub root_margin: RootMargin,
    pub viewport_width: f64,
    pub viewport_height: f64,

    /// A template file to use instead of the built-in one.
    pub template: Option<PathBuf>,

    /// Where the rendered page is written.
    pub output: PathBuf,
}

impl Config {
    /// Looks for `ideas.yaml` in `dir` and then in each of its ancestors.
    /// Falls back to the defaults if there is none.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(dir) => Config::from_directory(dir),
                None => Config::from_project(Project::default(), Path::new(".")),
            }
        }
    }

    /// Loads the configuration from a project file. Relative `template` and
    /// `output` paths are resolved against the file's directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Config::from_project(project, project_root),
        }
    }

    fn from_project(project: Project, project_root: &Path) -> Result<Config> {
        Ok(Config {
            endpoint: match project.endpoint {
                Some(endpoint) => endpoint,
                None => Url::parse(DEFAULT_ENDPOINT)?,
            },
            asset_host: project
                .asset_host
                .unwrap_or_else(|| String::from(DEFAULT_ASSET_HOST)),
            timeout: Duration::from_secs(project.timeout_secs.0),
            root_margin: project.root_margin,
            viewport_width: project.viewport.width,
            viewport_height: project.viewport.height,
            template: project.template.map(|relpath| project_root.join(relpath)),
            output: project_root.join(
                project
                    .output
                    .unwrap_or_else(|| PathBuf::from("ideas.html")),
            ),
        })
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::from_project(Project::default(), dir.path())?;
        assert_eq!(DEFAULT_ENDPOINT, config.endpoint.as_str());
        assert_eq!(DEFAULT_ASSET_HOST, config.asset_host);
        assert_eq!(Duration::from_secs(10), config.timeout);
        assert_eq!(RootMargin::default(), config.root_margin);
        assert_eq!(1280.0, config.viewport_width);
        assert_eq!(dir.path().join("ideas.html"), config.output);
        assert_eq!(None, config.template);
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let root = tempfile::tempdir()?;
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;
        let mut file = File::create(root.path().join(PROJECT_FILE))?;
        writeln!(
            file,
            "endpoint: https://api.example.org/api/ideas\n\
             asset_host: static.example.net\n\
             timeout_secs: 3\n\
             root_margin:\n  bottom: 120\n\
             viewport:\n  width: 800\n  height: 600\n\
             template: theme/custom.html\n\
             output: out/ideas.html"
        )?;

        let config = Config::from_directory(&nested)?;
        assert_eq!("https://api.example.org/api/ideas", config.endpoint.as_str());
        assert_eq!("static.example.net", config.asset_host);
        assert_eq!(Duration::from_secs(3), config.timeout);
        assert_eq!(120.0, config.root_margin.bottom);
        assert_eq!(0.0, config.root_margin.top);
        assert_eq!(800.0, config.viewport_width);
        assert_eq!(600.0, config.viewport_height);
        assert_eq!(Some(root.path().join("theme/custom.html")), config.template);
        assert_eq!(root.path().join("out/ideas.html"), config.output);
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_fields() -> Result<()> {
        let root = tempfile::tempdir()?;
        let path = root.path().join(PROJECT_FILE);
        std::fs::write(&path, "endpont: https://typo.example.org/\n")?;
        assert!(Config::from_project_file(&path).is_err());
        Ok(())
    }
}
