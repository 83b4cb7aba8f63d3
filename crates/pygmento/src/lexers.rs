//! Lexer lookup by name and content-based guessing.

use syntect::parsing::{SyntaxReference, SyntaxSet};

/// Common names that are not a syntax name or file extension in the
/// default syntax set
const ALIASES: &[(&str, &str)] = &[
    ("shell", "sh"),
    ("console", "sh"),
    ("zsh", "sh"),
    ("c++", "cpp"),
    ("golang", "go"),
    ("python3", "py"),
    ("py3", "py"),
    ("node", "js"),
    // no TypeScript syntax in the default set
    ("ts", "js"),
    ("typescript", "js"),
    ("ecmascript", "js"),
    ("text", "txt"),
    ("plain", "txt"),
    ("plaintext", "txt"),
    ("postgresql", "sql"),
    ("mysql", "sql"),
    ("yml", "yaml"),
];

/// Markers counted when guessing the language of a fragment, keyed by a
/// token `find_lexer` resolves. Ties go to the earlier entry.
const SIGNALS: &[(&str, &[&str])] = &[
    ("py", &["def ", "import ", "print(", "elif ", "self.", "__init__", "None", "lambda "]),
    ("rs", &["fn ", "let mut ", "impl ", "pub fn ", "println!", "use std::", "&mut ", "-> "]),
    ("go", &["package ", "func ", ":= ", "fmt."]),
    ("java", &["public class ", "System.out", "public static void", "import java."]),
    ("cpp", &["#include <iostream>", "std::", "cout <<", "template<", "namespace "]),
    ("c", &["#include", "int main(", "printf(", "malloc("]),
    ("js", &["function ", "const ", "=> ", "console.log", "var ", "document."]),
    ("rb", &["puts ", "require '", "do |", "attr_accessor", "elsif "]),
    ("php", &["<?php", "$this->", "echo $"]),
    ("html", &["<!DOCTYPE", "<html", "<div", "<body", "</p>"]),
    ("sql", &["SELECT ", "FROM ", "WHERE ", "INSERT INTO", "CREATE TABLE"]),
    ("sh", &["#!/bin/", "echo ", "fi\n", "then\n", "export ", "$("]),
];

/// How a lexer was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerSource {
    /// The requested name resolved
    Named,
    /// The name did not resolve; picked from the code
    Guessed,
}

#[derive(Debug, Clone, Copy)]
pub struct LexerChoice<'a> {
    pub syntax: &'a SyntaxReference,
    pub source: LexerSource,
}

/// Resolve a lexer name (syntax name or file extension, case-insensitive)
pub fn find_lexer<'a>(syntax_set: &'a SyntaxSet, name: &str) -> Option<&'a SyntaxReference> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let token = ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, target)| *target)
        .unwrap_or(name);

    syntax_set.find_syntax_by_token(token)
}

/// Pick a lexer from the code itself. Falls back to plain text, never fails.
pub fn guess_lexer<'a>(syntax_set: &'a SyntaxSet, code: &str) -> &'a SyntaxReference {
    first_line_match(syntax_set, code)
        .or_else(|| best_signal_match(syntax_set, code))
        .unwrap_or_else(|| syntax_set.find_syntax_plain_text())
}

/// Shebangs, `<?php`, `<?xml` and other first-line patterns
fn first_line_match<'a>(syntax_set: &'a SyntaxSet, code: &str) -> Option<&'a SyntaxReference> {
    let line = code.lines().find(|line| !line.trim().is_empty())?;
    syntax_set.find_syntax_by_first_line(line)
}

fn best_signal_match<'a>(syntax_set: &'a SyntaxSet, code: &str) -> Option<&'a SyntaxReference> {
    let mut best: Option<(&str, usize)> = None;

    for (token, markers) in SIGNALS {
        let score = markers.iter().filter(|marker| code.contains(**marker)).count();
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((*token, score));
        }
    }

    best.and_then(|(token, _)| find_lexer(syntax_set, token))
}
