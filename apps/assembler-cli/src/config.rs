// config.rs - Assembly configuration (`assemble.toml`).
//
// Resolution order:
//   1. `--config <FILE>` if given
//   2. `assemble.toml` in the project root
//   3. Built-in default (the Java block-world layout below)

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use assembler_workspace::{ExcludePatterns, FileRecord};
use serde::{Deserialize, Serialize};

/// Name of the project-local configuration file.
pub const CONFIG_FILE_NAME: &str = "assemble.toml";

const DEFAULT_SOURCE_CLASSES: &[&str] = &[
    "Block",
    "BlockWorldException",
    "Builder",
    "GrassBlock",
    "GroundBlock",
    "InvalidBlockException",
    "NoExitException",
    "SoilBlock",
    "StoneBlock",
    "Tile",
    "TooHighException",
    "TooLowException",
    "WoodBlock",
];

const DEFAULT_TEST_FILES: &[&str] = &["GrassBlockTest.java", "TileTest.java"];

/// Everything the pipeline needs to know about a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Working copy directory name, created under the project root.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Names skipped while copying the project (`target/`, `*.class`, `.git`).
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Remove the working copy when verification fails or no archive name is given.
    #[serde(default)]
    pub cleanup_on_failure: bool,

    #[serde(default)]
    pub verify: VerifyConfig,

    /// Filtered, then packaged first.
    #[serde(default = "default_sources")]
    pub sources: FileRecord,

    /// Packaged after the sources; never filtered.
    #[serde(default = "default_tests")]
    pub tests: FileRecord,
}

/// The external test step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Shell command line run inside the working copy.
    #[serde(default = "default_verify_command")]
    pub command: String,

    /// Extra environment variables for the command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            command: default_verify_command(),
            env: BTreeMap::new(),
        }
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            exclude: Vec::new(),
            cleanup_on_failure: false,
            verify: VerifyConfig::default(),
            sources: default_sources(),
            tests: default_tests(),
        }
    }
}

fn default_work_dir() -> String {
    "__temp".to_string()
}

fn default_verify_command() -> String {
    "mvn clean test -B".to_string()
}

fn default_sources() -> FileRecord {
    FileRecord::new(
        "src/main/java/",
        "src/",
        DEFAULT_SOURCE_CLASSES
            .iter()
            .map(|class| format!("{}.java", class)),
    )
}

fn default_tests() -> FileRecord {
    FileRecord::new("src/test/java/", "test/", DEFAULT_TEST_FILES.iter().copied())
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    BuiltIn,
}

impl AssemblyConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Pick the configuration for `project_root`, honoring an explicit override.
    pub fn resolve(
        project_root: &Path,
        override_path: Option<&Path>,
    ) -> anyhow::Result<(Self, ConfigSource)> {
        if let Some(path) = override_path {
            return Ok((Self::load(path)?, ConfigSource::File(path.to_path_buf())));
        }

        let project_file = project_root.join(CONFIG_FILE_NAME);
        if project_file.exists() {
            return Ok((Self::load(&project_file)?, ConfigSource::File(project_file)));
        }

        let config = Self::default();
        config.validate()?;
        Ok((config, ConfigSource::BuiltIn))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut components = Path::new(&self.work_dir).components();
        let single_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_name {
            anyhow::bail!(
                "work_dir '{}' must be a single directory name",
                self.work_dir
            );
        }
        if self.verify.command.trim().is_empty() {
            anyhow::bail!("verify.command is empty");
        }
        self.sources.validate().context("in [sources]")?;
        self.tests.validate().context("in [tests]")?;
        Ok(())
    }

    /// Records in packaging order.
    pub fn records(&self) -> [&FileRecord; 2] {
        [&self.sources, &self.tests]
    }

    pub fn excludes(&self) -> ExcludePatterns {
        ExcludePatterns::from_patterns(&self.exclude)
    }
}
