//! scout — search operator composer CLI
//!
//! # Usage
//!
//! ```bash
//! # Compose from fields
//! scout --keywords "seo tips" --site example.com --or "guide|checklist"
//!
//! # Use a preset
//! scout preset guest-posts --set niche="content marketing"
//!
//! # Break an existing query into fields
//! scout explain 'site:example.com intitle:"write for us"'
//! ```

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use scout::prelude::*;
use scout::usecase::{self, REGISTRY};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scout")]
#[command(version)]
#[command(about = "🔍 Search operator query composer", long_about = None)]
#[command(after_help = "EXAMPLES:
    scout --keywords 'seo tips' --site example.com
    scout --exact 'nikola tesla' --before 1900-01-01 --open
    scout --around-first tesla --around-second edison --distance 3
    scout preset unwanted-files --set domain=yoursite.com --set filetypes=pdf,env
    scout explain '(seo | marketing) -jobs site:example.com'")]
struct Cli {
    #[command(flatten)]
    fields: FieldArgs,

    /// Read the request from a JSON file (fields from flags are appended)
    #[arg(long, value_name = "FILE")]
    request: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Open the search in the browser
    #[arg(long, global = true)]
    open: bool,

    /// Config file (default: ./scout.toml, then the user config dir)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Search endpoint, overrides the config file
    #[arg(long, env = "SCOUT_SEARCH_URL", global = true)]
    search_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Default)]
struct FieldArgs {
    /// Plain keywords
    #[arg(short, long)]
    keywords: Option<String>,

    /// Restrict to a site (site:)
    #[arg(long)]
    site: Option<String>,

    /// Phrase in the title (intitle:)
    #[arg(long)]
    intitle: Option<String>,

    /// Phrase in the URL (inurl:)
    #[arg(long)]
    inurl: Option<String>,

    /// File extension (filetype:)
    #[arg(long)]
    filetype: Option<String>,

    /// Exact phrase
    #[arg(long)]
    exact: Option<String>,

    /// Term to exclude
    #[arg(long)]
    exclude: Option<String>,

    /// Alternatives, separated by '|'
    #[arg(long = "or", value_delimiter = '|')]
    or_terms: Vec<String>,

    /// Only results before this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    before: Option<NaiveDate>,

    /// Only results after this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    after: Option<NaiveDate>,

    /// Sites related to a domain (related:)
    #[arg(long)]
    related: Option<String>,

    /// First AROUND term
    #[arg(long)]
    around_first: Option<String>,

    /// Second AROUND term
    #[arg(long)]
    around_second: Option<String>,

    /// AROUND distance in words
    #[arg(long, default_value_t = 3)]
    distance: u32,

    /// Cached copy of a page (cache:)
    #[arg(long)]
    cache: Option<String>,

    /// Range lower bound
    #[arg(long, requires = "max")]
    min: Option<f64>,

    /// Range upper bound
    #[arg(long, requires = "min")]
    max: Option<f64>,

    /// Currency symbol for the range (e.g. '$')
    #[arg(long)]
    currency: Option<String>,

    /// Raw tokens appended verbatim
    #[arg(long)]
    raw: Vec<String>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a query from a named preset
    Preset {
        /// Preset id (see `scout presets`)
        id: String,

        /// Preset inputs as key=value
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// List the available presets
    Presets,
    /// Parse an operator query and show its fields
    Explain {
        /// The query to explain
        query: String,
    },
    /// Show the operator reference
    Operators,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "scout=debug" } else { "scout=error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = ScoutConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(url) = &cli.search_url {
        config.search_url = url.clone();
    }
    let link = LinkOpener::from_config(&config);
    let open = cli.open || config.open_browser;

    match &cli.command {
        Some(Commands::Preset { id, set }) => {
            let preset = usecase::get(id)?;
            let inputs = Inputs::parse_pairs(set)?;
            if cli.verbose {
                println!("{} {}", "Preset:".dimmed(), preset.title.yellow());
            }
            let composition = preset.compose(&inputs)?;
            report(&composition, &link, cli, open)
        }
        Some(Commands::Presets) => {
            show_presets();
            Ok(())
        }
        Some(Commands::Explain { query }) => explain_query(query, &link, cli),
        Some(Commands::Operators) => {
            show_operators();
            Ok(())
        }
        None => {
            let request = build_request(cli)?;
            if request.is_empty() {
                println!("{}", "🔍 scout — search operator composer".cyan().bold());
                println!();
                println!("Usage: scout [FIELDS] [OPTIONS]");
                println!();
                println!("Try: scout --help");
                return Ok(());
            }
            if cli.verbose {
                println!("{} {} field(s)", "Input:".dimmed(), request.len());
            }
            report(&request.to_query(), &link, cli, open)
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ScoutError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ScoutError::InvalidDate(s.to_string()))
}

fn build_request(cli: &Cli) -> anyhow::Result<QueryRequest> {
    let mut request = match &cli.request {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<QueryRequest>(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => QueryRequest::new(),
    };

    let f = &cli.fields;
    let texts = [
        (FieldKind::Keywords, &f.keywords),
        (FieldKind::Site, &f.site),
        (FieldKind::InTitle, &f.intitle),
        (FieldKind::InUrl, &f.inurl),
        (FieldKind::FileType, &f.filetype),
        (FieldKind::Exact, &f.exact),
        (FieldKind::Exclude, &f.exclude),
        (FieldKind::Related, &f.related),
        (FieldKind::Cache, &f.cache),
    ];
    for (kind, value) in texts {
        if let Some(field) = value.as_ref().and_then(|v| QueryField::text(kind, v.as_str())) {
            request = request.push(field);
        }
    }

    if !f.or_terms.is_empty() {
        request = request.or_group(f.or_terms.iter().cloned());
    }
    if let Some(date) = f.before {
        request = request.before(date);
    }
    if let Some(date) = f.after {
        request = request.after(date);
    }
    if f.around_first.is_some() || f.around_second.is_some() {
        request = request.around(
            f.around_first.clone().unwrap_or_default(),
            f.around_second.clone().unwrap_or_default(),
            f.distance,
        );
    }
    if let (Some(min), Some(max)) = (f.min, f.max) {
        request = request.price_range(f.currency.as_deref(), min, max);
    }
    for token in &f.raw {
        request = request.custom(token.as_str());
    }

    Ok(request)
}

fn report(composition: &Composition, link: &LinkOpener, cli: &Cli, open: bool) -> anyhow::Result<()> {
    let url = link.url(&composition.query);

    match cli.format {
        OutputFormat::Json => {
            let warnings: Vec<String> = composition.warnings.iter().map(|w| w.to_string()).collect();
            let out = serde_json::json!({
                "query": composition.query,
                "url": url,
                "warnings": warnings,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            for warning in &composition.warnings {
                println!("{} {}", "⚠".yellow(), warning.to_string().yellow());
            }
            if composition.is_empty() {
                println!("{}", "(nothing to search)".dimmed());
                return Ok(());
            }
            println!("{}", "Generated query:".green().bold());
            println!("  {}", composition.query.white());
            if let Some(url) = &url {
                println!("{}", "Search URL:".cyan());
                println!("  {}", url);
            }
        }
    }

    if open {
        match link.open(&composition.query)? {
            Some(_) => {
                if matches!(cli.format, OutputFormat::Text) {
                    println!("{} Opened in browser", "✓".green());
                }
            }
            None => eprintln!("{}", "⚠ Empty query; not opening the browser".yellow()),
        }
    }
    Ok(())
}

fn explain_query(query: &str, link: &LinkOpener, cli: &Cli) -> anyhow::Result<()> {
    let request = scout::parse(query)?;
    let composition = request.to_query();

    if let OutputFormat::Json = cli.format {
        let warnings: Vec<String> = composition.warnings.iter().map(|w| w.to_string()).collect();
        let out = serde_json::json!({
            "fields": request,
            "query": composition.query,
            "url": link.url(&composition.query),
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "🔍 Query Explanation".cyan().bold());
    println!();
    println!("{} {}", "Query:".dimmed(), query.yellow());
    println!();
    println!("{}", "Fields:".green().bold());
    for field in &request {
        println!("  {:10} {}", field.kind().to_string().cyan(), describe(field).white());
    }
    for warning in &composition.warnings {
        println!("  {} {}", "⚠".yellow(), warning.to_string().yellow());
    }

    println!();
    println!("{}", "Normalized:".green().bold());
    println!("  {}", composition.query.white());
    Ok(())
}

fn describe(field: &QueryField) -> String {
    match field {
        QueryField::OrGroup(terms) => terms.join(" | "),
        QueryField::Before(date) | QueryField::After(date) => date.format("%Y-%m-%d").to_string(),
        QueryField::Around {
            first,
            second,
            distance,
        } => format!("{} ~{}~ {}", first, distance, second),
        QueryField::PriceRange { currency, min, max } => {
            let c = currency.as_deref().unwrap_or("");
            format!("{c}{min} to {c}{max}")
        }
        QueryField::Keywords(v)
        | QueryField::Site(v)
        | QueryField::InTitle(v)
        | QueryField::InUrl(v)
        | QueryField::FileType(v)
        | QueryField::Exact(v)
        | QueryField::Exclude(v)
        | QueryField::Related(v)
        | QueryField::Cache(v)
        | QueryField::Custom(v) => v.clone(),
    }
}

fn show_presets() {
    println!("{}", "🔍 Presets".cyan().bold());

    for preset in REGISTRY {
        println!();
        println!("{}  {}", preset.id.cyan().bold(), preset.title.white().bold());
        println!("  {}", preset.description.dimmed());
        for slot in preset.slots {
            let marker = if slot.required { "*" } else { " " };
            let default = slot
                .default
                .map(|d| format!(" (default: {})", d))
                .unwrap_or_default();
            println!(
                "  {}{:10} {:7} {}{}",
                marker.red(),
                slot.key.yellow(),
                slot.kind.to_string().dimmed(),
                slot.label,
                default.dimmed()
            );
        }
        if let Ok(example) = preset.compose_example() {
            println!("  {} {}", "e.g.".dimmed(), example.query.green());
        }
    }
}

fn show_operators() {
    println!("{}", "🔍 Operator Reference".cyan().bold());
    println!();

    let operators = [
        ("--keywords", "seo tips", "Plain terms"),
        ("--site", "site:example.com", "Results from one site"),
        ("--intitle", "intitle:\"guide\"", "Phrase in the page title"),
        ("--inurl", "inurl:\"blog\"", "Phrase in the URL"),
        ("--filetype", "filetype:pdf", "File extension"),
        ("--exact", "\"nikola tesla\"", "Exact phrase"),
        ("--exclude", "-jobs", "Exclude a term"),
        ("--or", "(seo | marketing)", "Any of the terms"),
        ("--before", "before:2024-01-31", "Published before"),
        ("--after", "after:2023-01-01", "Published after"),
        ("--related", "related:example.com", "Similar sites"),
        ("--around-*", "\"a\" AROUND(3) \"b\"", "Terms within N words"),
        ("--cache", "cache:example.com", "Cached copy"),
        ("--min/--max", "$10..$20", "Numeric range"),
    ];

    println!(
        "{:14} {:24} {}",
        "Flag".white().bold(),
        "Token".white().bold(),
        "Meaning".white().bold()
    );
    println!("{}", "─".repeat(64).dimmed());

    for (flag, token, meaning) in operators {
        println!("{:14} {:24} {}", flag.cyan().bold(), token.yellow(), meaning.dimmed());
    }
}
