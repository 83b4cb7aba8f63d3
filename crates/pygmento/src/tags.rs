//! Custom block tags for Tera.
//!
//! Tera has no hook for user-defined tags, so templates go through a compile
//! step first. The source is split into text and `{% ... %}` tokens; tags
//! registered in a [`TagLibrary`] get to consume tokens from the [`Parser`]
//! and return the Tera source that replaces them. Everything else is copied
//! through untouched, and Tera does the rendering.
//!
//! - `{% pygmentoblock python %}...{% endpygmentoblock %}` becomes
//!   `{% filter pygmento(lexer="python") %}...{% endfilter %}`
//! - `{% pygmento_css %}` becomes `{{ pygmento_css() }}`

use anyhow::{bail, Result};
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

use crate::filters::{CSS_FUNCTION_NAME, FILTER_NAME};

pub const BLOCK_TAG: &str = "pygmentoblock";
pub const END_BLOCK_TAG: &str = "endpygmentoblock";
pub const CSS_TAG: &str = "pygmento_css";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Tag(TagToken),
}

/// A `{% ... %}` tag as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    /// Text between the delimiters, trimmed
    pub contents: String,
    /// `{%-`
    pub trim_left: bool,
    /// `-%}`
    pub trim_right: bool,
    /// 1-based line the tag starts on
    pub line: usize,
    raw: String,
}

impl TagToken {
    pub fn name(&self) -> &str {
        self.contents.split_whitespace().next().unwrap_or("")
    }

    /// Tag name followed by its arguments, quoted arguments kept whole
    pub fn split_contents(&self) -> Vec<String> {
        split_contents(&self.contents)
    }

    /// The tag exactly as it appeared in the source
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `{% contents %}` with this tag's whitespace control
    pub fn wrap_tag(&self, contents: &str) -> String {
        format!(
            "{{%{} {} {}%}}",
            if self.trim_left { "-" } else { "" },
            contents,
            if self.trim_right { "-" } else { "" }
        )
    }

    /// `{{ expression }}` with this tag's whitespace control
    pub fn wrap_expression(&self, expression: &str) -> String {
        format!(
            "{{{{{} {} {}}}}}",
            if self.trim_left { "-" } else { "" },
            expression,
            if self.trim_right { "-" } else { "" }
        )
    }
}

/// Compile phase of a custom tag
pub trait CustomTag: Send + Sync {
    /// Consume whatever the tag owns from `parser` and return the Tera
    /// source that replaces it
    fn parse(&self, tag: &TagToken, parser: &mut Parser<'_>) -> Result<String>;
}

/// Registry of custom tags by name
pub struct TagLibrary {
    tags: HashMap<String, Box<dyn CustomTag>>,
}

impl TagLibrary {
    /// Library with the built-in highlighting tags
    pub fn new() -> Self {
        let mut library = Self::empty();

        library.register(BLOCK_TAG, Box::new(HighlightBlockTag));
        library.register(CSS_TAG, Box::new(StyleSheetTag));

        library
    }

    pub fn empty() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, tag: Box<dyn CustomTag>) {
        self.tags.insert(name.to_string(), tag);
    }

    pub fn get(&self, name: &str) -> Option<&dyn CustomTag> {
        self.tags.get(name).map(|tag| tag.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Compile template source into plain Tera source
    pub fn compile(&self, source: &str) -> Result<String> {
        let mut parser = Parser::new(source, self);
        parser.parse_until(&[])
    }
}

impl Default for TagLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Token stream handed to custom tags while compiling
pub struct Parser<'l> {
    tokens: VecDeque<Token>,
    library: &'l TagLibrary,
    open_tags: Vec<(String, usize)>,
}

impl<'l> Parser<'l> {
    pub fn new(source: &str, library: &'l TagLibrary) -> Self {
        Self {
            tokens: tokenize(source).into(),
            library,
            open_tags: Vec::new(),
        }
    }

    /// Compile tokens up to (not including) the first tag named in `until`.
    ///
    /// With an empty `until` this runs to the end of input. Otherwise
    /// running out of tokens is an unclosed-tag error.
    pub fn parse_until(&mut self, until: &[&str]) -> Result<String> {
        let mut output = String::new();

        while let Some(token) = self.tokens.pop_front() {
            match token {
                Token::Text(text) => output.push_str(&text),
                Token::Tag(tag) if until.contains(&tag.name()) => {
                    self.tokens.push_front(Token::Tag(tag));
                    return Ok(output);
                }
                Token::Tag(tag) => output.push_str(&self.compile_tag(tag)?),
            }
        }

        if !until.is_empty() {
            let (name, line) = self
                .open_tags
                .last()
                .cloned()
                .unwrap_or_else(|| (String::from("block"), 0));
            bail!(
                "unclosed tag '{}' on line {}, expected '{}'",
                name,
                line,
                until.join("' or '")
            );
        }

        Ok(output)
    }

    /// Pop a single token without compiling it
    pub fn next_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Drop the next token, returning it when it is a tag. Used for the end
    /// tag that stopped `parse_until`.
    pub fn delete_first_token(&mut self) -> Option<TagToken> {
        match self.tokens.pop_front()? {
            Token::Tag(tag) => Some(tag),
            Token::Text(_) => None,
        }
    }

    fn compile_tag(&mut self, tag: TagToken) -> Result<String> {
        let library = self.library;

        match library.get(tag.name()) {
            Some(custom) => {
                self.open_tags.push((tag.name().to_string(), tag.line));
                let compiled = custom.parse(&tag, self);
                self.open_tags.pop();
                compiled
            }
            None => Ok(tag.raw),
        }
    }
}

/// `{% pygmentoblock <lexer> %}...{% endpygmentoblock %}`
pub struct HighlightBlockTag;

impl CustomTag for HighlightBlockTag {
    fn parse(&self, tag: &TagToken, parser: &mut Parser<'_>) -> Result<String> {
        let bits = tag.split_contents();
        let lexer = match bits.get(1) {
            Some(lexer) => unquote(lexer),
            None => bail!("{} takes lexer name as an argument", BLOCK_TAG),
        };

        let body = parser.parse_until(&[END_BLOCK_TAG])?;
        let end = match parser.delete_first_token() {
            Some(end) => end,
            None => bail!("unclosed tag '{}', expected '{}'", BLOCK_TAG, END_BLOCK_TAG),
        };

        let open = tag.wrap_tag(&format!(
            "filter {}(lexer={})",
            FILTER_NAME,
            string_literal(lexer)?
        ));

        Ok(format!("{}{}{}", open, body, end.wrap_tag("endfilter")))
    }
}

/// `{% pygmento_css %}`
pub struct StyleSheetTag;

impl CustomTag for StyleSheetTag {
    fn parse(&self, tag: &TagToken, _parser: &mut Parser<'_>) -> Result<String> {
        Ok(tag.wrap_expression(&format!("{}()", CSS_FUNCTION_NAME)))
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    // comments | raw blocks | tags
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"(?s)\{#.*?#\}|\{%-?\s*raw\s*-?%\}.*?\{%-?\s*endraw\s*-?%\}|\{%(-?)(.*?)(-?)%\}",
        )
        .unwrap()
    })
}

/// Split source into text and tag tokens.
///
/// Comments and `{% raw %}` blocks stay text so nothing inside them is
/// treated as a tag. String literals are not: a `{% ... %}` inside
/// `{{ "..." }}` is still read as a tag, so wrap such text in `{% raw %}`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    let mut line = 1;

    for cap in token_regex().captures_iter(source) {
        let Some(whole) = cap.get(0) else {
            continue;
        };

        let Some(contents) = cap.get(2) else {
            continue;
        };

        push_text(&mut tokens, &source[last..whole.start()]);
        line += source[last..whole.start()].matches('\n').count();

        tokens.push(Token::Tag(TagToken {
            contents: contents.as_str().trim().to_string(),
            trim_left: cap.get(1).is_some_and(|m| !m.as_str().is_empty()),
            trim_right: cap.get(3).is_some_and(|m| !m.as_str().is_empty()),
            line,
            raw: whole.as_str().to_string(),
        }));

        line += whole.as_str().matches('\n').count();
        last = whole.end();
    }

    push_text(&mut tokens, &source[last..]);
    tokens
}

fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }

    match tokens.last_mut() {
        Some(Token::Text(previous)) => previous.push_str(text),
        _ => tokens.push(Token::Text(text.to_string())),
    }
}

/// Split on whitespace, keeping quoted strings together (quotes included)
pub fn split_contents(contents: &str) -> Vec<String> {
    let mut bits = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in contents.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None if ch == '"' || ch == '\'' => {
                current.push(ch);
                quote = Some(ch);
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    bits.push(std::mem::take(&mut current));
                }
            }
            None => current.push(ch),
        }
    }

    if !current.is_empty() {
        bits.push(current);
    }

    bits
}

fn unquote(bit: &str) -> &str {
    for quote in ['"', '\''] {
        if bit.len() >= 2 && bit.starts_with(quote) && bit.ends_with(quote) {
            return &bit[1..bit.len() - 1];
        }
    }
    bit
}

/// Tera string literals have no escapes, so pick a delimiter the value
/// does not contain
fn string_literal(value: &str) -> Result<String> {
    match ['"', '\'', '`'].into_iter().find(|q| !value.contains(*q)) {
        Some(quote) => Ok(format!("{}{}{}", quote, value, quote)),
        None => bail!("lexer name {} cannot be used in a template", value),
    }
}
