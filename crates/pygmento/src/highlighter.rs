use anyhow::Result;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::config::PygmentoConfig;
use crate::formatter::HtmlFormatter;
use crate::lexers::{find_lexer, guess_lexer, LexerChoice, LexerSource};
use crate::safe::SafeHtml;

/// Highlights code with a lexer looked up by name.
///
/// Built once per process from the configuration and shared read-only
/// (usually behind an `Arc`) by the template filter and the style-sheet
/// function. Nothing is cached between calls.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    formatter: HtmlFormatter,
}

impl Highlighter {
    pub fn new(config: &PygmentoConfig) -> Result<Self> {
        let themes = ThemeSet::load_defaults();
        let formatter = HtmlFormatter::new(&config.style, &config.css_class, &themes)?;

        log::debug!(
            "Highlighter ready: style '{}', css class '{}'",
            formatter.style(),
            formatter.css_class()
        );

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            formatter,
        })
    }

    /// Highlight `code`, guessing the lexer from the code when `lexer`
    /// is unknown
    pub fn highlight(&self, code: &str, lexer: &str) -> Result<SafeHtml> {
        let choice = self.resolve(lexer, code);
        let html = self
            .formatter
            .format(code, choice.syntax, &self.syntax_set)?;

        Ok(SafeHtml::new(html))
    }

    pub fn resolve(&self, lexer: &str, code: &str) -> LexerChoice<'_> {
        match find_lexer(&self.syntax_set, lexer) {
            Some(syntax) => LexerChoice {
                syntax,
                source: LexerSource::Named,
            },
            None => {
                let syntax = guess_lexer(&self.syntax_set, code);
                log::warn!(
                    "Lexer '{}' not found, guessed '{}' from the code",
                    lexer,
                    syntax.name
                );
                LexerChoice {
                    syntax,
                    source: LexerSource::Guessed,
                }
            }
        }
    }

    /// `<style>` element covering every fragment this highlighter produces
    pub fn style_sheet(&self) -> SafeHtml {
        SafeHtml::new(format!("<style>{}</style>", self.formatter.style_defs()))
    }

    pub fn css(&self) -> &str {
        self.formatter.style_defs()
    }

    pub fn formatter(&self) -> &HtmlFormatter {
        &self.formatter
    }

    /// Every lexer known to the syntax set
    pub fn lexers(&self) -> impl Iterator<Item = &SyntaxReference> {
        self.syntax_set.syntaxes().iter()
    }
}
