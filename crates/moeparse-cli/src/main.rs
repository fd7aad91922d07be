//! moeparse CLI - Render and inspect chat markup
//!
//! Usage:
//!   mpcli [OPTIONS] [COMMAND] <FILE|->
//!
//! Commands:
//!   render    Render markup to HTML (default)
//!   tokens    Show the token tree
//!   stats     Show token statistics

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use moeparse_core::{bbcode, RenderOptions, Renderer, TagKind, Token};
use serde::Serialize;

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;
    init_logging(config.verbose);

    let input = read_input(&config.file)?;
    let registry = bbcode::registry().map_err(|e| format!("failed to build registry: {}", e))?;
    let tokens = registry.tokenize(&input);

    match config.command {
        Command::Render => cmd_render(&tokens, &config),
        Command::Tokens => cmd_tokens(&tokens, &input, &config),
        Command::Stats => cmd_stats(&tokens, &input, &config),
    }
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    escape: bool,
    verbose: bool,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Render,
    Tokens,
    Stats,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Render;
    let mut format = OutputFormat::Text;
    let mut escape = false;
    let mut verbose = false;
    let mut file = None;

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("mpcli {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "-e" | "--escape" => escape = true,
            "render" => command = Command::Render,
            "tokens" => command = Command::Tokens,
            "stats" => command = Command::Stats,
            "-" => file = Some(arg.clone()),
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        format,
        escape,
        verbose,
    })
}

fn print_help() {
    eprintln!(
        r#"mpcli - chat markup renderer

USAGE:
    mpcli [OPTIONS] [COMMAND] <FILE|->

COMMANDS:
    render      Render markup to HTML (default)
    tokens      Show the token tree
    stats       Show token statistics

OPTIONS:
    -e, --escape     Escape HTML special characters in plain text
    -j, --json       Output in JSON format
    -v, --verbose    Log tokenizer decisions to stderr
    -h, --help       Print help information
    -V, --version    Print version information

EXAMPLES:
    mpcli chat.txt              Render a file to HTML
    echo '[b]hi[/b]' | mpcli -  Render standard input
    mpcli -e chat.txt           Render with plain text escaped
    mpcli tokens -j chat.txt    Output the token tree as JSON
    mpcli stats chat.txt        Show token statistics
"#
    );
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn read_input(file: &str) -> Result<String, String> {
    if file == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        Ok(input)
    } else {
        fs::read_to_string(file).map_err(|e| format!("failed to read '{}': {}", file, e))
    }
}

// =============================================================================
// Render Command
// =============================================================================

fn cmd_render(tokens: &[Token], config: &Config) -> Result<(), String> {
    let renderer = Renderer::new(RenderOptions::new().with_escape_text(config.escape));
    let html = renderer
        .render(tokens)
        .map_err(|e| format!("render failed: {}", e))?;

    match config.format {
        OutputFormat::Json => print_json(&serde_json::json!({ "html": html }))?,
        OutputFormat::Text => print!("{}", html),
    }

    Ok(())
}

// =============================================================================
// Tokens Command
// =============================================================================

fn cmd_tokens(tokens: &[Token], input: &str, config: &Config) -> Result<(), String> {
    match config.format {
        OutputFormat::Json => {
            let json: Vec<JsonToken> = tokens.iter().map(convert_token).collect();
            print_json(&json)?;
        }
        OutputFormat::Text => {
            println!("Tokens: {} ({} bytes of input)", tokens.len(), input.len());
            for token in tokens {
                print_token(token, 1);
            }
        }
    }

    Ok(())
}

fn print_token(token: &Token, indent: usize) {
    let prefix = "  ".repeat(indent);
    let span = token.span();

    match token {
        Token::Text(text) => {
            println!(
                "{}Text {}..{}: {}",
                prefix,
                span.start,
                span.end,
                preview(&text.content)
            );
        }
        Token::Tag(tag) => {
            let kind = match tag.kind() {
                TagKind::Single => "single",
                TagKind::Paired => "paired",
            };
            println!(
                "{}Tag `{}` ({}) {}..{}: {}",
                prefix,
                tag.class(),
                kind,
                span.start,
                span.end,
                preview(tag.source())
            );

            let args: Vec<String> = tag
                .args()
                .iter()
                .enumerate()
                .map(|(i, value)| format!("{}={:?}", i, value))
                .collect();
            if !args.is_empty() {
                println!("{}  args: {}", prefix, args.join(", "));
            }

            match (tag.children(), tag.body()) {
                (Some(children), _) => {
                    for child in children {
                        print_token(child, indent + 1);
                    }
                }
                (None, Some(body)) => println!("{}  body: {}", prefix, preview(body)),
                (None, None) => {}
            }
        }
    }
}

fn preview(text: &str) -> String {
    let short: String = text.chars().take(60).collect();
    let ellipsis = if text.chars().count() > 60 { "..." } else { "" };
    format!("{}{}", short.replace('\n', "\\n"), ellipsis)
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(tokens: &[Token], input: &str, config: &Config) -> Result<(), String> {
    let stats = TokenStats::from_tokens(tokens, input);

    if matches!(config.format, OutputFormat::Json) {
        return print_json(&stats);
    }

    println!("Token Statistics");
    println!("----------------");
    println!("Top-level tokens: {}", tokens.len());
    println!("Text tokens:      {}", stats.text);
    println!("Tag tokens:       {}", stats.tags);
    println!("  Paired:         {}", stats.paired);
    println!("  Single:         {}", stats.single);
    println!("Max depth:        {}", stats.max_depth);
    println!();
    println!("By class:");
    for (class, count) in &stats.classes {
        println!("  {:<16}{}", class, count);
    }
    println!();
    println!("Size:");
    println!("  Bytes:          {}", stats.bytes);
    println!("  Lines:          {}", stats.lines);

    Ok(())
}

#[derive(Serialize)]
struct TokenStats {
    text: usize,
    tags: usize,
    paired: usize,
    single: usize,
    max_depth: usize,
    classes: BTreeMap<String, usize>,
    bytes: usize,
    lines: usize,
}

impl TokenStats {
    fn from_tokens(tokens: &[Token], input: &str) -> Self {
        let mut stats = Self {
            text: 0,
            tags: 0,
            paired: 0,
            single: 0,
            max_depth: 0,
            classes: BTreeMap::new(),
            bytes: input.len(),
            lines: input.lines().count(),
        };

        stats.count(tokens, 1);
        stats
    }

    fn count(&mut self, tokens: &[Token], depth: usize) {
        for token in tokens {
            match token {
                Token::Text(_) => self.text += 1,
                Token::Tag(tag) => {
                    self.tags += 1;
                    self.max_depth = self.max_depth.max(depth);
                    match tag.kind() {
                        TagKind::Single => self.single += 1,
                        TagKind::Paired => self.paired += 1,
                    }
                    *self.classes.entry(tag.class().to_string()).or_default() += 1;
                    if let Some(children) = tag.children() {
                        self.count(children, depth + 1);
                    }
                }
            }
        }
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonToken<'a> {
    Text {
        content: &'a str,
        span: JsonSpan,
    },
    Tag {
        class: &'a str,
        tag: &'a str,
        kind: &'a str,
        source: &'a str,
        args: Vec<&'a str>,
        named: BTreeMap<&'a str, usize>,
        body: Option<&'a str>,
        children: Option<Vec<JsonToken<'a>>>,
        span: JsonSpan,
    },
}

#[derive(Serialize)]
struct JsonSpan {
    start: u32,
    end: u32,
}

fn convert_token<'a>(token: &'a Token) -> JsonToken<'a> {
    let span = token.span();
    let span = JsonSpan {
        start: span.start,
        end: span.end,
    };

    match token {
        Token::Text(text) => JsonToken::Text {
            content: &text.content,
            span,
        },
        Token::Tag(tag) => JsonToken::Tag {
            class: tag.class(),
            tag: tag.tag(),
            kind: match tag.kind() {
                TagKind::Single => "single",
                TagKind::Paired => "paired",
            },
            source: tag.source(),
            args: tag.args().iter().collect(),
            named: tag.args().names().collect(),
            body: tag.body(),
            children: tag
                .children()
                .map(|children| children.iter().map(convert_token).collect()),
            span,
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize output: {}", e))?;
    println!("{}", json);
    Ok(())
}
