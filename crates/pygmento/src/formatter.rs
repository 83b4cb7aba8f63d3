use anyhow::{bail, Result};
use std::borrow::Cow;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Style name that maps onto `DEFAULT_THEME`
pub const DEFAULT_STYLE: &str = "default";
pub const DEFAULT_THEME: &str = "InspiredGitHub";

const CLASS_STYLE: ClassStyle = ClassStyle::Spaced;

/// Class-based HTML formatter.
///
/// Span classes come from the syntax scopes only, so the markup does not
/// depend on the style. The style only shows up in the CSS, which is scoped
/// under `.{css_class}` and computed once here.
#[derive(Debug, Clone)]
pub struct HtmlFormatter {
    style: String,
    css_class: String,
    css: String,
}

impl HtmlFormatter {
    pub fn new(style: &str, css_class: &str, themes: &ThemeSet) -> Result<Self> {
        validate_css_class(css_class)?;
        let (style, theme) = resolve_style(themes, style)?;

        let css = css_for_theme_with_class_style(theme, CLASS_STYLE)?;

        Ok(Self {
            style: style.to_string(),
            css_class: css_class.to_string(),
            css: scope_css(&css, css_class),
        })
    }

    /// Resolved theme name
    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn css_class(&self) -> &str {
        &self.css_class
    }

    /// CSS rules for every class this formatter emits
    pub fn style_defs(&self) -> &str {
        &self.css
    }

    pub fn format(
        &self,
        code: &str,
        syntax: &SyntaxReference,
        syntax_set: &SyntaxSet,
    ) -> Result<String> {
        // The newline-mode syntaxes expect every line to end with '\n'
        let code: Cow<'_, str> = if code.ends_with('\n') {
            Cow::Borrowed(code)
        } else {
            Cow::Owned(format!("{}\n", code))
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(&code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(format!(
            "<div class=\"{}\"><pre class=\"code\">{}</pre></div>\n",
            self.css_class,
            generator.finalize()
        ))
    }
}

/// Style names accepted by `HtmlFormatter::new`, "default" first
pub fn available_styles(themes: &ThemeSet) -> Vec<String> {
    let mut styles = vec![DEFAULT_STYLE.to_string()];
    styles.extend(themes.themes.keys().cloned());
    styles
}

fn resolve_style<'a>(themes: &'a ThemeSet, style: &str) -> Result<(&'a str, &'a Theme)> {
    let wanted = if style.eq_ignore_ascii_case(DEFAULT_STYLE) {
        DEFAULT_THEME
    } else {
        style
    };

    match themes
        .themes
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
    {
        Some((name, theme)) => Ok((name.as_str(), theme)),
        None => bail!(
            "Unknown style '{}'. Available styles: {}",
            style,
            available_styles(themes).join(", ")
        ),
    }
}

fn validate_css_class(css_class: &str) -> Result<()> {
    if css_class.is_empty() {
        bail!("CSS class must not be empty");
    }

    let valid = css_class
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let starts_with_digit = css_class.starts_with(|c: char| c.is_ascii_digit());

    if !valid || starts_with_digit {
        bail!("Invalid CSS class '{}'", css_class);
    }

    Ok(())
}

/// Prefix every selector with `.{css_class} `.
///
/// syntect writes each rule header on a single line ending in " {",
/// with selectors separated by ", ".
fn scope_css(css: &str, css_class: &str) -> String {
    let mut scoped = String::with_capacity(css.len() * 2);

    for line in css.lines() {
        let header = line
            .strip_suffix(" {")
            .filter(|_| !line.starts_with(char::is_whitespace));

        match header {
            Some(selectors) => {
                let selectors: Vec<String> = selectors
                    .split(", ")
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| format!(".{} {}", css_class, s))
                    .collect();
                scoped.push_str(&selectors.join(", "));
                scoped.push_str(" {");
            }
            None => scoped.push_str(line),
        }
        scoped.push('\n');
    }

    scoped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_css_prefixes_every_selector() {
        let css = "/*\n * theme\n */\n\n.code {\n color: #000000;\n}\n\n.comment, .string.quoted {\n color: #999999;\n}\n";
        let scoped = scope_css(css, "highlight");

        assert!(scoped.contains(".highlight .code {"));
        assert!(scoped.contains(".highlight .comment, .highlight .string.quoted {"));
        assert!(scoped.contains(" color: #999999;"));
        assert!(scoped.starts_with("/*\n * theme\n */"));
    }

    #[test]
    fn test_default_style_maps_to_default_theme() {
        let themes = ThemeSet::load_defaults();
        let formatter = HtmlFormatter::new("default", "highlight", &themes).unwrap();
        assert_eq!(formatter.style(), DEFAULT_THEME);
    }

    #[test]
    fn test_style_lookup_ignores_case() {
        let themes = ThemeSet::load_defaults();
        let formatter = HtmlFormatter::new("BASE16-OCEAN.DARK", "highlight", &themes).unwrap();
        assert_eq!(formatter.style(), "base16-ocean.dark");
    }

    #[test]
    fn test_unknown_style_lists_available_styles() {
        let themes = ThemeSet::load_defaults();
        let err = HtmlFormatter::new("no-such-style", "highlight", &themes).unwrap_err();
        let message = err.to_string();

        assert!(message.contains("Unknown style 'no-such-style'"));
        assert!(message.contains("InspiredGitHub"));
    }

    #[test]
    fn test_invalid_css_class() {
        let themes = ThemeSet::load_defaults();
        assert!(HtmlFormatter::new("default", "", &themes).is_err());
        assert!(HtmlFormatter::new("default", "two words", &themes).is_err());
        assert!(HtmlFormatter::new("default", "9lives", &themes).is_err());
        assert!(HtmlFormatter::new("default", "code_block-2", &themes).is_ok());
    }

    #[test]
    fn test_format_wraps_in_container() {
        let themes = ThemeSet::load_defaults();
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let formatter = HtmlFormatter::new("default", "snippet", &themes).unwrap();

        let html = formatter
            .format("x < 1", syntax_set.find_syntax_plain_text(), &syntax_set)
            .unwrap();

        assert!(html.starts_with("<div class=\"snippet\"><pre class=\"code\">"));
        assert!(html.ends_with("</pre></div>\n"));
        assert!(html.contains("x &lt; 1"));
    }

    #[test]
    fn test_available_styles_starts_with_default() {
        let styles = available_styles(&ThemeSet::load_defaults());
        assert_eq!(styles[0], "default");
        assert!(styles.iter().any(|s| s == "Solarized (dark)"));
    }
}
