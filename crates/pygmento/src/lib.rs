//! Syntax highlighting for Tera templates.
//!
//! Three template extensions share one [`Highlighter`], built once from a
//! [`PygmentoConfig`]:
//!
//! - `{{ code | pygmento(lexer="python") }}` highlights a value
//! - `{% pygmentoblock python %}...{% endpygmentoblock %}` highlights the
//!   rendered block content
//! - `{% pygmento_css %}` emits the `<style>` element for the configured style
//!
//! Unknown lexer names never fail a render; the lexer is guessed from the
//! code instead.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pygmento::{Highlighter, PygmentoConfig, Templates};
//!
//! # fn main() -> anyhow::Result<()> {
//! let highlighter = Arc::new(Highlighter::new(&PygmentoConfig::default())?);
//! let mut templates = Templates::new(highlighter);
//! templates.add_raw_template(
//!     "page.html",
//!     "{% pygmento_css %}{% pygmentoblock rust %}fn main() {}{% endpygmentoblock %}",
//! )?;
//! let html = templates.render("page.html", &tera::Context::new())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod filters;
pub mod formatter;
pub mod highlighter;
pub mod lexers;
pub mod safe;
pub mod tags;
pub mod templates;

pub use config::{load_config, PygmentoConfig};
pub use formatter::HtmlFormatter;
pub use highlighter::Highlighter;
pub use lexers::{LexerChoice, LexerSource};
pub use safe::SafeHtml;
pub use tags::TagLibrary;
pub use templates::{register, Templates};
