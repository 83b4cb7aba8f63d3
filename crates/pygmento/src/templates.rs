use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tera::{Context as TeraContext, Tera};
use walkdir::WalkDir;

use crate::filters::{HighlightFilter, StyleSheetFunction, CSS_FUNCTION_NAME, FILTER_NAME};
use crate::highlighter::Highlighter;
use crate::tags::TagLibrary;

const TEMPLATE_EXTENSIONS: &[&str] = &["html", "htm", "xml", "txt"];

/// Register the `pygmento` filter and `pygmento_css` function on `tera`
pub fn register(tera: &mut Tera, highlighter: Arc<Highlighter>) {
    tera.register_filter(FILTER_NAME, HighlightFilter::new(Arc::clone(&highlighter)));
    tera.register_function(CSS_FUNCTION_NAME, StyleSheetFunction::new(highlighter));
}

/// Tera templates compiled through the highlighting tags.
///
/// Tag errors surface when a template is added, not when it is rendered.
pub struct Templates {
    tera: Tera,
    tags: TagLibrary,
}

impl Templates {
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        let mut tera = Tera::default();
        register(&mut tera, highlighter);

        Self {
            tera,
            tags: TagLibrary::new(),
        }
    }

    /// Load every template under `dir`, named by its path relative to `dir`
    pub fn from_dir(dir: &Path, highlighter: Arc<Highlighter>) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Templates directory not found: {}", dir.display());
        }

        let mut templates = Self::new(highlighter);
        let mut sources = Vec::new();

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_template(e.path()))
        {
            let path = entry.path();
            let name = template_name(dir, path)?;
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;

            sources.push((name.clone(), templates.compile(&name, &source)?));
        }

        log::debug!("Loaded {} template(s) from {}", sources.len(), dir.display());

        // Added together so `extends` can see every parent
        templates
            .tera
            .add_raw_templates(sources)
            .with_context(|| format!("Failed to load templates from {}", dir.display()))?;

        Ok(templates)
    }

    pub fn add_raw_template(&mut self, name: &str, source: &str) -> Result<()> {
        let compiled = self.compile(name, source)?;
        self.tera
            .add_raw_template(name, &compiled)
            .with_context(|| format!("Failed to add template '{}'", name))
    }

    /// Tera source for `source` with the custom tags lowered
    pub fn compile(&self, name: &str, source: &str) -> Result<String> {
        self.tags
            .compile(source)
            .with_context(|| format!("Failed to compile template '{}'", name))
    }

    pub fn render(&self, name: &str, context: &TeraContext) -> Result<String> {
        self.tera
            .render(name, context)
            .with_context(|| format!("Failed to render template '{}'", name))
    }

    /// Compile and render a one-off template. No autoescaping.
    pub fn render_str(&mut self, source: &str, context: &TeraContext) -> Result<String> {
        let compiled = self
            .tags
            .compile(source)
            .context("Failed to compile template string")?;
        self.tera
            .render_str(&compiled, context)
            .context("Failed to render template string")
    }

    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    pub fn tera(&self) -> &Tera {
        &self.tera
    }
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}

fn template_name(dir: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(dir)
        .with_context(|| format!("{} is outside {}", path.display(), dir.display()))?;

    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
