#![allow(dead_code)]

pub const MINIMAL_CONFIG: &str = r#"style: "default"
css_class: "highlight"
"#;

pub const DARK_CONFIG: &str = r#"style: "base16-ocean.dark"
css_class: "code-sample"
"#;

pub const PYTHON_SNIPPET: &str = "def greet(name):\n    return name.upper()\n";

pub const MINIMAL_TEMPLATES: &[(&str, &str)] = &[
    (
        "base.html",
        r#"<!DOCTYPE html>
<html>
<head>{% pygmento_css %}</head>
<body>{% block content %}{% endblock content %}</body>
</html>
"#,
    ),
    (
        "post.html",
        r#"{% extends "base.html" %}
{% block content %}
<h1>{{ title }}</h1>
{% pygmentoblock python %}def greet(name):
    return name.upper()
{% endpygmentoblock %}
<p>Inline: {{ snippet | pygmento(lexer="python") }}</p>
{% endblock content %}
"#,
    ),
];

pub const MISSING_LEXER_TEMPLATE: &str = r#"{% pygmentoblock %}
print(1)
{% endpygmentoblock %}
"#;

pub const UNCLOSED_BLOCK_TEMPLATE: &str = r#"{% pygmentoblock python %}
print(1)
"#;

pub const CONTEXT_JSON: &str = r#"{
  "title": "Greeting",
  "snippet": "print('hi')"
}
"#;

pub const CONTEXT_YAML: &str = r#"title: Greeting
snippet: "print('hi')"
"#;
