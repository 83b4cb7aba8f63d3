use std::collections::HashMap;
use std::sync::Arc;
use tera::{Filter, Function, Value};

use crate::highlighter::Highlighter;

/// `{{ code | pygmento(lexer="python") }}`
pub const FILTER_NAME: &str = "pygmento";
/// `{{ pygmento_css() }}`, what `{% pygmento_css %}` compiles to
pub const CSS_FUNCTION_NAME: &str = "pygmento_css";

pub struct HighlightFilter {
    highlighter: Arc<Highlighter>,
}

impl HighlightFilter {
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        Self { highlighter }
    }
}

impl Filter for HighlightFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let lexer = match args.get("lexer") {
            Some(Value::String(lexer)) => lexer,
            Some(other) => {
                return Err(tera::Error::msg(format!(
                    "Filter `{}` received an incorrect type for arg `lexer`: got `{}` but expected a String",
                    FILTER_NAME, other
                )))
            }
            None => {
                return Err(tera::Error::msg(format!(
                    "Filter `{}` expected an arg called `lexer`",
                    FILTER_NAME
                )))
            }
        };

        let code = stringify(value);
        let html = self
            .highlighter
            .highlight(&code, lexer)
            .map_err(|e| tera::Error::chain(format!("Failed to highlight {} code", lexer), e))?;

        Ok(Value::String(html.into_string()))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub struct StyleSheetFunction {
    highlighter: Arc<Highlighter>,
}

impl StyleSheetFunction {
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        Self { highlighter }
    }
}

impl Function for StyleSheetFunction {
    fn call(&self, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(Value::String(self.highlighter.style_sheet().into_string()))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Filters work on text; anything else is turned into its JSON text first
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
