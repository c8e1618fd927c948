//! CLI module - Command-line interface definition and handler

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::core::config::{ContextConfig, DEFAULT_MAX_TOKENS, DEFAULT_OUTPUT};
use crate::core::file_reader::DEFAULT_MAX_FILE_SIZE;
use crate::core::tokenizer::TokenModel;
use crate::flows::generate::{build_context, generate_context, ContextReport};

/// codebase-context - pack a project into one LLM-ready context file.
#[derive(Parser, Debug)]
#[command(name = "codebase-context")]
#[command(
    author,
    version,
    about,
    long_about = r#"Walk a project, select source files under a token budget and write a single
text document (header, summary, structure tree, file contents) that can be pasted
into an LLM prompt.

Selection order:
1. files matching --priority fragments, in the order given
2. everything else, shallowest first, then alphabetical

Files that do not fit the remaining budget are skipped; priority files are
always included and flagged if they push the total over budget.

Examples:
    codebase-context                                    # scan current directory
    codebase-context /path/to/project                   # scan a specific directory
    codebase-context -o out.txt --max-tokens 50000      # custom output and budget
    codebase-context . -e .py .js -p main.py utils.py   # filter and prioritize
"#
)]
pub struct Cli {
    /// Project root to scan.
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Output file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_OUTPUT,
        env = "CODEBASE_CONTEXT_OUTPUT"
    )]
    pub output: PathBuf,

    /// Token budget for the whole document.
    #[arg(
        short,
        long,
        value_name = "N",
        default_value_t = DEFAULT_MAX_TOKENS,
        env = "CODEBASE_CONTEXT_MAX_TOKENS",
        long_help = "Maximum estimated tokens for the whole document, including header,\n\
summary and tree overhead.\n\n\
Running over budget is not an error: files that do not fit are skipped and the\n\
summary reports it."
    )]
    pub max_tokens: usize,

    /// Only include these extensions (e.g. .py .js).
    #[arg(
        short,
        long,
        value_name = "EXT",
        num_args = 1..,
        value_delimiter = ',',
        env = "CODEBASE_CONTEXT_EXTENSIONS",
        long_help = "Only include files with these extensions. `py` and `.py` are the same,\n\
matching is case-insensitive. Files without an extension are left out when a\n\
filter is given.\n\n\
Priority files are subject to this filter too."
    )]
    pub extensions: Vec<String>,

    /// Files to include first (path or trailing path fragment).
    #[arg(
        short,
        long,
        value_name = "PATH",
        num_args = 1..,
        long_help = "Files to include before everything else, in the order given.\n\n\
A fragment matches a file whose relative path equals it or ends with\n\
`/<fragment>`, so `main.py` matches `main.py` and `src/main.py`.\n\n\
Priority files are always included, even over budget."
    )]
    pub priority: Vec<String>,

    /// Leave the project structure tree out of the output.
    #[arg(long)]
    pub no_tree: bool,

    /// Token estimation model (heuristic/chars/cl100k/o200k).
    #[arg(
        long,
        value_name = "MODEL",
        default_value = "heuristic",
        env = "CODEBASE_CONTEXT_TOKEN_MODEL",
        long_help = "How tokens are estimated.\n\n\
Supported values:\n\
- heuristic (default): average of chars/4 and words*4/3\n\
- chars: chars/4\n\
- cl100k: tiktoken cl100k_base\n\
- o200k: tiktoken o200k_base"
    )]
    pub token_model: String,

    /// Extra glob patterns to exclude (matched against path and file name).
    #[arg(short = 'x', long, value_name = "GLOB", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Include hidden files and directories.
    #[arg(
        long,
        long_help = "Include hidden files and directories (dotfiles).\n\n\
By default they are skipped unless named by a --priority fragment. Built-in\n\
exclusions such as .git still apply."
    )]
    pub hidden: bool,

    /// Honor .gitignore and .ignore files.
    #[arg(long)]
    pub gitignore: bool,

    /// Skip files larger than this many bytes.
    #[arg(
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_MAX_FILE_SIZE,
        env = "CODEBASE_CONTEXT_MAX_FILE_SIZE"
    )]
    pub max_file_size: u64,

    /// Print the selection as JSON instead of writing the output file.
    #[arg(long)]
    pub dry_run: bool,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode (errors only).
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug diagnostics).
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the run configuration from arguments
    pub fn to_config(&self) -> Result<ContextConfig> {
        let token_model: TokenModel = self
            .token_model
            .parse()
            .map_err(anyhow::Error::msg)
            .context("Invalid --token-model")?;

        Ok(ContextConfig::new(&self.path)
            .with_output(&self.output)
            .with_max_tokens(self.max_tokens)
            .with_extensions(&self.extensions)
            .with_priority(&self.priority)
            .with_tree(!self.no_tree)
            .with_token_model(token_model)
            .with_hidden(self.hidden)
            .with_gitignore(self.gitignore)
            .with_exclude(self.exclude.iter().cloned())
            .with_max_file_size(self.max_file_size))
    }

    fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

fn init_logging(level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

/// Human-readable run report on stderr
fn print_report(report: &ContextReport) {
    let selection = &report.selection;

    eprintln!("🔍 Scanned codebase at: {}", report.root.display());
    eprintln!(
        "📊 Found {} files ({} eligible)",
        report.found, selection.candidates
    );
    if let Some(output) = &report.output {
        eprintln!(
            "{} {}",
            "✅ Context file generated:".green(),
            output.display()
        );
    }
    eprintln!(
        "📝 Included {} files with ~{} tokens (budget {})",
        selection.len(),
        selection.total_tokens,
        selection.max_tokens
    );

    if selection.unreadable() > 0 {
        eprintln!(
            "{}",
            format!("⚠️  {} files could not be read as text", selection.unreadable()).yellow()
        );
    }
    if selection.over_budget {
        eprintln!(
            "{}",
            "⚠️  Priority files alone exceed the token budget".yellow()
        );
    }
    if selection.budget_exceeded {
        eprintln!(
            "{}",
            format!(
                "⚠️  {} files were excluded due to token limit",
                selection.budget_skipped()
            )
            .yellow()
        );
        eprintln!("💡 Consider increasing --max-tokens or using --priority to include specific files");
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level());
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.to_config()?;

    if cli.dry_run {
        let (_, report) = build_context(&config)?;
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
        return Ok(());
    }

    let report = generate_context(&config)
        .with_context(|| format!("Failed to generate context for {}", config.root.display()))?;

    if !cli.quiet {
        print_report(&report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ExtensionFilter;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["codebase-context"]).unwrap();
        let config = cli.to_config().unwrap();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.extensions, ExtensionFilter::All);
        assert!(config.include_tree);
        assert_eq!(config.token_model, TokenModel::Heuristic);
    }

    #[test]
    fn test_full_argument_set() {
        let cli = Cli::try_parse_from([
            "codebase-context",
            "proj",
            "-o",
            "out.txt",
            "--max-tokens",
            "500",
            "--no-tree",
            "-e",
            "py",
            ".JS",
            "-p",
            "./main.py",
            "lib/util.py",
        ])
        .unwrap();
        let config = cli.to_config().unwrap();
        assert_eq!(config.root, PathBuf::from("proj"));
        assert_eq!(config.output, PathBuf::from("out.txt"));
        assert_eq!(config.max_tokens, 500);
        assert!(!config.include_tree);
        assert!(config.extensions.allows(".py"));
        assert!(config.extensions.allows(".js"));
        assert_eq!(config.priority, vec!["main.py", "lib/util.py"]);
    }

    #[test]
    fn test_bad_token_model() {
        let cli = Cli::try_parse_from(["codebase-context", "--token-model", "bogus"]).unwrap();
        let err = cli.to_config().unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown model"));
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["codebase-context", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["codebase-context", "-v"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
        let cli = Cli::try_parse_from(["codebase-context"]).unwrap();
        assert_eq!(cli.log_level(), "warn");
    }
}
