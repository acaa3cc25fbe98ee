//! Reassembly of selected sections into a standalone LaTeX document.

use std::fs;
use std::path::Path;

use minijinja::Environment;
use serde::Serialize;

use crate::app::sanitize;
use crate::domain::errors::DomainError;
use crate::domain::model::{AssembledDocument, Section};
use crate::infra::config::{Config, DocumentSettings, Package};

const BUILTIN_TEMPLATE: &str = "preamble";

/// Wraps sanitized section bodies in a minimal compilable preamble.
pub struct DocumentAssembler {
    env: Environment<'static>,
    settings: DocumentSettings,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self {
            env: default_environment(),
            settings: DocumentSettings::default(),
        }
    }
}

impl DocumentAssembler {
    pub fn new(settings: DocumentSettings) -> Self {
        Self {
            env: default_environment(),
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.document.clone())
    }

    /// Sanitize each section in the given order and wrap the result in the preamble.
    pub fn assemble<'a, I>(&self, sections: I) -> Result<AssembledDocument, DomainError>
    where
        I: IntoIterator<Item = &'a Section>,
    {
        let mut content = String::new();
        let mut titles = Vec::new();
        for section in sections {
            content.push_str(&sanitize::prepare_body(&section.body()));
            content.push_str("\n\n");
            titles.push(section.title.clone());
        }

        let context = TemplateContext {
            documentclass: documentclass_line(
                &self.settings.class(),
                &self.settings.class_options(),
            ),
            packages: self
                .settings
                .packages()
                .iter()
                .map(usepackage_line)
                .collect(),
            title: format!("\\title{{{}}}", self.settings.title()),
            content,
        };

        let mut source = match self.settings.template() {
            Some(path) => render_external(path, &context)?,
            None => self.render_builtin(&context)?,
        };
        if !source.ends_with('\n') {
            source.push('\n');
        }

        tracing::debug!(sections = titles.len(), bytes = source.len(), "assembled document");
        Ok(AssembledDocument { source, titles })
    }

    fn render_builtin(&self, context: &TemplateContext) -> Result<String, DomainError> {
        self.env
            .get_template(BUILTIN_TEMPLATE)
            .and_then(|template| template.render(context))
            .map_err(|err| DomainError::Template(err.to_string()))
    }
}

/// Assemble with the built-in preamble.
pub fn assemble<'a, I>(sections: I) -> Result<AssembledDocument, DomainError>
where
    I: IntoIterator<Item = &'a Section>,
{
    DocumentAssembler::default().assemble(sections)
}

fn default_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template(BUILTIN_TEMPLATE, DEFAULT_PREAMBLE_TEMPLATE)
        .expect("built-in preamble template is valid");
    env
}

fn render_external(path: &Path, context: &TemplateContext) -> Result<String, DomainError> {
    let source = fs::read_to_string(path).map_err(|err| {
        DomainError::Template(format!("failed to load {}: {err}", path.display()))
    })?;
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("external", &source)
        .map_err(|err| DomainError::Template(format!("invalid {}: {err}", path.display())))?;
    env.get_template("external")
        .and_then(|template| template.render(context))
        .map_err(|err| DomainError::Template(format!("{}: {err}", path.display())))
}

fn documentclass_line(class: &str, options: &[String]) -> String {
    if options.is_empty() {
        format!("\\documentclass{{{class}}}")
    } else {
        format!("\\documentclass[{}]{{{class}}}", options.join(","))
    }
}

fn usepackage_line(package: &Package) -> String {
    let options = package.options();
    if options.is_empty() {
        format!("\\usepackage{{{}}}", package.name())
    } else {
        format!("\\usepackage[{}]{{{}}}", options.join(","), package.name())
    }
}

#[derive(Serialize)]
struct TemplateContext {
    documentclass: String,
    packages: Vec<String>,
    title: String,
    content: String,
}

const DEFAULT_PREAMBLE_TEMPLATE: &str = r#"{{ documentclass }}
{% for package in packages %}
{{ package }}
{% endfor %}
{{ title }}
\begin{document}
{{ content }}\end{document}
"#;
