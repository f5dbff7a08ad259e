//! fmq CLI: frontmatter queries and template expansion for markdown notes.
//!
//! Commands: query, render, template list, template apply, completions

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use fmq_parser::parse_query;
use fmq_query::{execute, format_table, parse_blocks, OutputFormat};
use fmq_template::TemplateExpander;
use fmq_vault::Vault;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "fmq")]
#[command(version)]
#[command(about = "Frontmatter queries and template expansion for markdown notes")]
struct Cli {
    /// Vault folder to scan
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    /// Template folder, relative to the vault (overrides .fmq.toml)
    #[arg(long, global = true)]
    template_dir: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query block and print the result table
    #[command(alias = "q")]
    Query {
        /// File holding the query, `-` for stdin
        #[arg(default_value = "-")]
        file: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
    /// Replace every query block in a markdown file with its table
    Render {
        file: PathBuf,
        /// Write the result back to FILE instead of stdout
        #[arg(long)]
        in_place: bool,
    },
    /// Work with the template folder
    #[command(subcommand)]
    Template(TemplateCommand),
    /// Print shell completions
    Completions { shell: Shell },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// List available templates
    List,
    /// Expand a template against the current local time
    Apply {
        name: String,
        /// Insert into this file instead of printing
        #[arg(long)]
        into: Option<PathBuf>,
        /// 1-based line to insert before (default: append)
        #[arg(long, requires = "into")]
        line: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => OutputFormat::Markdown,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn open_vault(cli: &Cli) -> anyhow::Result<Vault> {
    let mut vault = Vault::open(&cli.vault)?;
    if let Some(dir) = &cli.template_dir {
        vault.config_mut().template_dir.clone_from(dir);
    }
    Ok(vault)
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Query { file, format } => {
            let text = read_input(file)?;
            let query = parse_query(&text)?;
            let vault = open_vault(&cli)?;
            let documents = vault.load_documents()?;
            let table = execute(&query, &documents);
            println!("{}", format_table(&table, (*format).into()));
        }
        Commands::Render { file, in_place } => {
            let markdown = fs::read_to_string(file)
                .with_context(|| format!("reading {}", file.display()))?;
            let vault = open_vault(&cli)?;
            let parsed = parse_blocks(&markdown, &vault.config().fence)?;
            let rendered = parsed.render(&vault.load_documents()?);
            if *in_place {
                fs::write(file, &rendered.text)
                    .with_context(|| format!("writing {}", file.display()))?;
                info!(file = %file.display(), blocks = rendered.blocks, "rendered in place");
            } else {
                print!("{}", rendered.text);
            }
        }
        Commands::Template(TemplateCommand::List) => {
            let vault = open_vault(&cli)?;
            for name in vault.list_templates()? {
                println!("{name}");
            }
        }
        Commands::Template(TemplateCommand::Apply { name, into, line }) => {
            let vault = open_vault(&cli)?;
            let template = vault.read_template(name)?;
            let expanded = TemplateExpander::local().expand(&template);
            match into {
                Some(target) => insert_into(target, &expanded, *line)?,
                None => print!("{expanded}"),
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "fmq", &mut io::stdout());
        }
    }
    Ok(())
}

fn read_input(file: &str) -> anyhow::Result<String> {
    if file == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading query from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(file).with_context(|| format!("reading {file}"))
    }
}

fn insert_into(target: &Path, text: &str, line: Option<usize>) -> anyhow::Result<()> {
    let content = fs::read_to_string(target)
        .with_context(|| format!("reading {}", target.display()))?;
    let updated = insert_at_line(&content, text, line)?;
    fs::write(target, updated).with_context(|| format!("writing {}", target.display()))?;
    info!(file = %target.display(), "template inserted");
    Ok(())
}

/// Insert `text` before 1-based `line` of `content`, or append when `line`
/// is `None` or one past the last line.
fn insert_at_line(content: &str, text: &str, line: Option<usize>) -> anyhow::Result<String> {
    let offset = match line {
        None => content.len(),
        Some(0) => bail!("line numbers start at 1"),
        Some(n) => line_offset(content, n)
            .with_context(|| format!("line {n} is past the end of the file"))?,
    };

    let mut out = String::with_capacity(content.len() + text.len() + 1);
    out.push_str(&content[..offset]);
    if offset > 0 && !content[..offset].ends_with('\n') {
        out.push('\n');
    }
    out.push_str(text);
    out.push_str(&content[offset..]);
    Ok(out)
}

/// Byte offset where 1-based line `n` starts.
fn line_offset(content: &str, n: usize) -> Option<usize> {
    if n == 1 {
        return Some(0);
    }
    let starts = content.match_indices('\n').map(|(i, _)| i + 1);
    let lines = content.lines().count();
    if n == lines + 1 {
        return Some(content.len());
    }
    starts.take(lines).nth(n - 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_by_default() {
        assert_eq!(insert_at_line("a\nb\n", "T\n", None).unwrap(), "a\nb\nT\n");
        assert_eq!(insert_at_line("a\nb", "T\n", None).unwrap(), "a\nb\nT\n");
        assert_eq!(insert_at_line("", "T\n", None).unwrap(), "T\n");
    }

    #[test]
    fn inserts_before_the_given_line() {
        assert_eq!(insert_at_line("a\nb\nc\n", "T\n", Some(1)).unwrap(), "T\na\nb\nc\n");
        assert_eq!(insert_at_line("a\nb\nc\n", "T\n", Some(2)).unwrap(), "a\nT\nb\nc\n");
        assert_eq!(insert_at_line("a\nb\nc\n", "T\n", Some(4)).unwrap(), "a\nb\nc\nT\n");
    }

    #[test]
    fn rejects_lines_out_of_range() {
        assert!(insert_at_line("a\nb\n", "T", Some(0)).is_err());
        assert!(insert_at_line("a\nb\n", "T", Some(5)).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
