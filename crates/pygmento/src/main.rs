use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use syntect::highlighting::ThemeSet;

use pygmento::formatter::available_styles;
use pygmento::{load_config, Highlighter, PygmentoConfig, Templates};

#[derive(ClapParser)]
#[command(name = "pygmento")]
#[command(about = "Syntax highlighting for Tera templates")]
#[command(version)]
struct Cli {
    /// Config file (default: pygmento.yaml in the current directory, if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured style
    #[arg(long, global = true)]
    style: Option<String>,

    /// Override the configured CSS class
    #[arg(long, global = true)]
    css_class: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template
    Render {
        /// Template name, relative to the templates directory
        name: String,

        /// Templates directory
        #[arg(short, long, default_value = "templates")]
        templates: PathBuf,

        /// JSON or YAML file with the template context
        #[arg(long)]
        context: Option<PathBuf>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Highlight a file (or stdin) and print the HTML
    Highlight {
        /// Lexer name; guessed from the code when unknown
        #[arg(short, long)]
        lexer: String,

        /// Source file, stdin when omitted
        file: Option<PathBuf>,
    },

    /// Print the style sheet for the configured style
    Css {
        /// Print bare CSS without the <style> element
        #[arg(long)]
        raw: bool,
    },

    /// List available lexers
    Lexers,

    /// List available styles
    Styles,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Render {
            name,
            templates,
            context,
            output,
        } => {
            let highlighter = build_highlighter(&cli)?;
            render_template(highlighter, name, templates, context.as_deref(), output.as_deref())?
        }
        Commands::Highlight { lexer, file } => {
            let highlighter = build_highlighter(&cli)?;
            let code = read_source(file.as_deref())?;
            print!("{}", highlighter.highlight(&code, lexer)?);
        }
        Commands::Css { raw } => {
            let highlighter = build_highlighter(&cli)?;
            if *raw {
                print!("{}", highlighter.css());
            } else {
                println!("{}", highlighter.style_sheet());
            }
        }
        Commands::Lexers => {
            let highlighter = build_highlighter(&cli)?;
            for syntax in highlighter.lexers() {
                println!("{}: {}", syntax.name, syntax.file_extensions.join(", "));
            }
        }
        Commands::Styles => {
            for style in available_styles(&ThemeSet::load_defaults()) {
                println!("{}", style);
            }
        }
    }

    Ok(())
}

/// Config file, then environment, then command line
fn resolve_config(cli: &Cli) -> Result<PygmentoConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    config.apply_env();

    if let Some(style) = &cli.style {
        config.style = style.clone();
    }
    if let Some(css_class) = &cli.css_class {
        config.css_class = css_class.clone();
    }

    Ok(config)
}

fn build_highlighter(cli: &Cli) -> Result<Arc<Highlighter>> {
    let config = resolve_config(cli)?;
    let highlighter = Highlighter::new(&config).context("Failed to set up highlighter")?;
    Ok(Arc::new(highlighter))
}

fn render_template(
    highlighter: Arc<Highlighter>,
    name: &str,
    templates_dir: &Path,
    context_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let templates = Templates::from_dir(templates_dir, highlighter)?;
    let context = load_context(context_path)?;
    let html = templates.render(name, &context)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ {}", path.display());
        }
        None => print!("{}", html),
    }

    Ok(())
}

fn load_context(path: Option<&Path>) -> Result<tera::Context> {
    let Some(path) = path else {
        return Ok(tera::Context::new());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context {}", path.display()))?;

    let is_yaml = path
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    let value: serde_json::Value = if is_yaml {
        serde_yaml::from_str(&content).map_err(anyhow::Error::from)
    } else {
        serde_json::from_str(&content).map_err(anyhow::Error::from)
    }
    .with_context(|| format!("Failed to parse context {}", path.display()))?;

    tera::Context::from_value(value)
        .with_context(|| format!("Context {} must be a mapping", path.display()))
}

fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read stdin")?;
            Ok(code)
        }
    }
}
