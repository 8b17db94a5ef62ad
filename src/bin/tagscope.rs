use clap::{Parser, Subcommand};
use log::info;
use std::io;
use std::path::PathBuf;
use std::sync::Once;

use tagscope::chart::{ChartSink, JsonChartSink, NullChartSink};
use tagscope::classifier::EntityClassifier;
use tagscope::config::Config;
use tagscope::dataset::Dataset;
use tagscope::query::QueryEngine;
use tagscope::rules::RuleSet;
use tagscope::tools::{ToolRequest, Toolbox};

fn init_parallelism() {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = num_cpus::get();
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

#[derive(Parser, Debug)]
#[command(name = "tagscope", version, about = "Character popularity analytics over tagged artwork metadata")]
struct Cli {
    /// Dataset file (.parquet, .json, .jsonl, .csv)
    #[arg(long = "data", default_value = "metadata.parquet", global = true)]
    data: PathBuf,

    /// JSON config file; flags below override it
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// JSON rule set replacing the built-in ban/VIP lists
    #[arg(long = "rules", global = true)]
    rules: Option<PathBuf>,

    /// Directory chart descriptions are written to
    #[arg(long = "charts-dir", global = true)]
    charts_dir: Option<PathBuf>,

    /// Do not write charts
    #[arg(long = "no-charts", default_value_t = false, global = true)]
    no_charts: bool,

    /// Print the full JSON response instead of text
    #[arg(long = "json", default_value_t = false, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Top characters of a year
    Top { year: i32 },
    /// Popularity history of one character
    Stats { tag: String },
    /// How often `partner` appears when `base` is drawn
    Ship { base: String, partner: String },
    /// Characters driving a trait in a year
    Drivers { year: i32, tag: String },
    /// Head-to-head totals of two characters
    Compare { first: String, second: String },
    /// Answer JSON tool requests, one per stdin line, until EOF or Ctrl-C
    Serve,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = match &cli.config {
        Some(p) => Config::from_json_file(p)?,
        None => Config::default(),
    };
    if let Some(r) = &cli.rules { cfg.rules = Some(r.clone()); }
    if let Some(d) = &cli.charts_dir { cfg.charts_dir = d.clone(); }
    Ok(cfg)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    init_parallelism();
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    let rules = match &cfg.rules {
        Some(p) => RuleSet::from_json_file(p)?,
        None => RuleSet::default(),
    };
    let engine = QueryEngine::new(EntityClassifier::new(rules), cfg.query_settings());
    let dataset = Dataset::load_or_unavailable(&cli.data);
    let charts: Box<dyn ChartSink> = if cli.no_charts {
        Box::new(NullChartSink)
    } else {
        Box::new(JsonChartSink::new(cfg.charts_dir.clone()))
    };
    let toolbox = Toolbox::new(&dataset, engine, cfg.limits(), charts);

    let req = match cli.command {
        Command::Top { year } => ToolRequest::TopCharactersByYear { year },
        Command::Stats { tag } => ToolRequest::CharacterStats { character_tag: tag },
        Command::Ship { base, partner } => ToolRequest::ShipDependency { char1: base, char2: partner },
        Command::Drivers { year, tag } => ToolRequest::TagDriver { year, tag },
        Command::Compare { first, second } => ToolRequest::CompareCharacters { char1: first, char2: second },
        Command::Serve => return serve(&toolbox),
    };

    let resp = toolbox.invoke(&req);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else {
        println!("{}", resp.text);
    }
    if !resp.ok {
        std::process::exit(1);
    }
    Ok(())
}

fn serve(toolbox: &Toolbox<'_>) -> anyhow::Result<()> {
    // stdin reads block, so a flag checked between lines would never be seen
    ctrlc::set_handler(|| std::process::exit(130))?;
    info!("serving tool requests on stdin");
    toolbox.serve_lines(io::stdin().lock(), io::stdout().lock())
}
