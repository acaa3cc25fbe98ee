//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".texcerpt/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default = "CompilerSettings::unset")]
    pub compiler: CompilerSettings,
    #[serde(default = "DocumentSettings::unset")]
    pub document: DocumentSettings,
    #[serde(default = "UiSettings::unset")]
    pub ui: UiSettings,
    #[serde(default)]
    pub keybindings: Keybindings,
}

/// External LaTeX toolchain invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    #[serde(default)]
    program: Option<String>,
    #[serde(default)]
    args: Option<Vec<String>>,
    #[serde(default)]
    job_name: Option<String>,
}

impl CompilerSettings {
    /// A layer that sets nothing; used for tables missing from a config file.
    fn unset() -> Self {
        Self {
            program: None,
            args: None,
            job_name: None,
        }
    }

    fn default_program() -> &'static str {
        "pdflatex"
    }

    fn default_args() -> Vec<String> {
        vec!["-interaction=nonstopmode".into()]
    }

    fn default_job_name() -> &'static str {
        "document"
    }

    pub fn program(&self) -> String {
        self.program
            .clone()
            .unwrap_or_else(|| Self::default_program().to_owned())
    }

    pub fn args(&self) -> Vec<String> {
        self.args.clone().unwrap_or_else(Self::default_args)
    }

    pub fn job_name(&self) -> String {
        self.job_name
            .clone()
            .unwrap_or_else(|| Self::default_job_name().to_owned())
    }

    pub fn set_program<S: Into<String>>(&mut self, program: S) {
        self.program = Some(program.into());
    }

    pub fn set_args(&mut self, args: Vec<String>) {
        self.args = Some(args);
    }
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            program: Some(Self::default_program().to_owned()),
            args: Some(Self::default_args()),
            job_name: Some(Self::default_job_name().to_owned()),
        }
    }
}

/// A `\usepackage` entry, either a bare name or a name with options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Package {
    Name(String),
    WithOptions {
        name: String,
        #[serde(default)]
        options: Vec<String>,
    },
}

impl Package {
    pub fn name(&self) -> &str {
        match self {
            Package::Name(name) | Package::WithOptions { name, .. } => name,
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            Package::Name(_) => &[],
            Package::WithOptions { options, .. } => options,
        }
    }
}

/// Preamble used to wrap assembled sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSettings {
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    class_options: Option<Vec<String>>,
    #[serde(default)]
    packages: Option<Vec<Package>>,
    #[serde(default)]
    title: Option<String>,
    /// Path to a template file replacing the built-in preamble.
    #[serde(default)]
    template: Option<PathBuf>,
}

impl DocumentSettings {
    fn unset() -> Self {
        Self {
            class: None,
            class_options: None,
            packages: None,
            title: None,
            template: None,
        }
    }

    fn default_class() -> &'static str {
        "article"
    }

    fn default_class_options() -> Vec<String> {
        vec!["12pt".into()]
    }

    fn default_packages() -> Vec<Package> {
        let plain = |name: &str| Package::Name(name.to_owned());
        vec![
            plain("amsmath"),
            plain("amssymb"),
            plain("longtable"),
            plain("multirow"),
            plain("geometry"),
            plain("array"),
            plain("tabularx"),
            Package::WithOptions {
                name: "xcolor".into(),
                options: vec!["table".into()],
            },
            plain("graphicx"),
            plain("hyperref"),
        ]
    }

    pub fn class(&self) -> String {
        self.class
            .clone()
            .unwrap_or_else(|| Self::default_class().to_owned())
    }

    pub fn class_options(&self) -> Vec<String> {
        self.class_options
            .clone()
            .unwrap_or_else(Self::default_class_options)
    }

    pub fn packages(&self) -> Vec<Package> {
        self.packages.clone().unwrap_or_else(Self::default_packages)
    }

    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_default()
    }

    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            class: Some(Self::default_class().to_owned()),
            class_options: Some(Self::default_class_options()),
            packages: Some(Self::default_packages()),
            title: Some(String::new()),
            template: None,
        }
    }
}

/// Terminal UI behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default)]
    open_after_build: Option<bool>,
    /// Directory receiving timestamped copies of generated PDFs.
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

impl UiSettings {
    fn unset() -> Self {
        Self {
            open_after_build: None,
            output_dir: None,
        }
    }

    pub fn open_after_build(&self) -> bool {
        self.open_after_build.unwrap_or(true)
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            open_after_build: Some(true),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybindings {
    #[serde(default = "Keybindings::default_up")]
    pub up: String,
    #[serde(default = "Keybindings::default_down")]
    pub down: String,
    #[serde(default = "Keybindings::default_select")]
    pub select: String,
    #[serde(default = "Keybindings::default_generate")]
    pub generate: String,
}

impl Keybindings {
    fn default_up() -> String {
        "k".into()
    }

    fn default_down() -> String {
        "j".into()
    }

    fn default_select() -> String {
        "space".into()
    }

    fn default_generate() -> String {
        "g".into()
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self {
            up: Self::default_up(),
            down: Self::default_down(),
            select: Self::default_select(),
            generate: Self::default_generate(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    compiler: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            compiler: env::var("TEXCERPT_COMPILER")
                .ok()
                .filter(|value| !value.trim().is_empty()),
        }
    }

    #[cfg(test)]
    fn for_tests(compiler: &str) -> Self {
        Self {
            compiler: Some(compiler.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    /// Load the built-in defaults plus an explicit file, skipping global and workspace lookup.
    ///
    /// Unlike the discovered layers, the file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_explicit(path, EnvOverrides::from_env())
    }

    fn load_explicit(path: &Path, env_overrides: EnvOverrides) -> Result<Self> {
        tracing::debug!(path = %path.display(), "loading explicit config");
        let merged = Self::from_str(&DEFAULT_CONFIG)?.merge(Self::from_file(path)?);
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data).with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            compiler: merge_compiler(self.compiler, other.compiler),
            document: merge_document(self.document, other.document),
            ui: merge_ui(self.ui, other.ui),
            keybindings: merge_keybindings(self.keybindings, other.keybindings),
        }
    }
}

fn merge_compiler(mut base: CompilerSettings, overlay: CompilerSettings) -> CompilerSettings {
    if let Some(value) = overlay.program {
        base.program = Some(value);
    }
    if let Some(value) = overlay.args {
        base.args = Some(value);
    }
    if let Some(value) = overlay.job_name {
        base.job_name = Some(value);
    }
    base
}

fn merge_document(mut base: DocumentSettings, overlay: DocumentSettings) -> DocumentSettings {
    if let Some(value) = overlay.class {
        base.class = Some(value);
    }
    if let Some(value) = overlay.class_options {
        base.class_options = Some(value);
    }
    if let Some(value) = overlay.packages {
        base.packages = Some(value);
    }
    if let Some(value) = overlay.title {
        base.title = Some(value);
    }
    if let Some(value) = overlay.template {
        base.template = Some(value);
    }
    base
}

fn merge_ui(mut base: UiSettings, overlay: UiSettings) -> UiSettings {
    if let Some(value) = overlay.open_after_build {
        base.open_after_build = Some(value);
    }
    if let Some(value) = overlay.output_dir {
        base.output_dir = Some(value);
    }
    base
}

fn merge_keybindings(base: Keybindings, overlay: Keybindings) -> Keybindings {
    Keybindings {
        up: choose_keybinding(base.up, overlay.up, Keybindings::default_up),
        down: choose_keybinding(base.down, overlay.down, Keybindings::default_down),
        select: choose_keybinding(base.select, overlay.select, Keybindings::default_select),
        generate: choose_keybinding(base.generate, overlay.generate, Keybindings::default_generate),
    }
}

fn choose_keybinding(base: String, overlay: String, default_fn: fn() -> String) -> String {
    if overlay != default_fn() {
        overlay
    } else {
        base
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("texcerpt/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(program) = env.compiler {
        config.compiler.program = Some(program);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.compiler.program(), "pdflatex");
        assert_eq!(config.compiler.args(), ["-interaction=nonstopmode"]);
        assert_eq!(config.document.class_options(), ["12pt"]);
        assert_eq!(config.document.packages(), DocumentSettings::default_packages());
        assert!(config.ui.open_after_build());
    }

    #[test]
    fn built_in_file_matches_code_defaults() -> Result<()> {
        let from_file = Config::from_str(&DEFAULT_CONFIG)?;
        assert_eq!(from_file, Config::default());
        Ok(())
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[compiler]
program = "xelatex"
[document]
class_options = ["11pt", "a4paper"]
"#,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".texcerpt"))?;
        fs::create_dir_all(workspace_dir.join(".git"))?;
        fs::write(
            workspace_dir.join(".texcerpt/config.toml"),
            r#"
[document]
packages = ["amsmath", { name = "babel", options = ["english"] }]
[ui]
open_after_build = false
[keybindings]
generate = "b"
"#,
        )?;

        let config = Config::load_with_layers(
            Some(global),
            Some(workspace_dir.join(".texcerpt/config.toml")),
            EnvOverrides::default(),
        )?;

        assert_eq!(config.compiler.program(), "xelatex");
        assert_eq!(config.compiler.args(), ["-interaction=nonstopmode"]);
        assert_eq!(config.document.class_options(), ["11pt", "a4paper"]);
        assert_eq!(config.document.class(), "article");
        let packages = config.document.packages();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[1].name(), "babel");
        assert_eq!(packages[1].options(), ["english"]);
        assert!(!config.ui.open_after_build());
        assert_eq!(config.keybindings.generate, "b");
        assert_eq!(config.keybindings.up, "k");
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let config = Config::load_with_layers(None, None, EnvOverrides::for_tests("lualatex"))?;
        assert_eq!(config.compiler.program(), "lualatex");
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn explicit_config_must_exist() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let missing = temp.path().join("no-such-config.toml");
        let err = Config::load_explicit(&missing, EnvOverrides::default()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("failed to read config file"));
        assert!(message.contains("no-such-config.toml"));
        Ok(())
    }

    #[test]
    fn explicit_config_overlays_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("texcerpt.toml");
        fs::write(&file, "[document]\nclass = \"report\"\n")?;
        let config = Config::load_explicit(&file, EnvOverrides::default())?;
        assert_eq!(config.document.class(), "report");
        assert_eq!(config.compiler.program(), "pdflatex");
        Ok(())
    }

    #[test]
    fn finds_repo_root_from_nested_directory() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested)?;
        fs::create_dir_all(temp.path().join(".git"))?;
        assert_eq!(find_repo_root(&nested), Some(temp.path().to_path_buf()));
        Ok(())
    }
}
