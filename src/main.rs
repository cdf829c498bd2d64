use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum, ColorChoice, ArgAction, CommandFactory};
use clap_complete::Shell;
use comfy_table::{Table, ContentArrangement};
use serde::{Deserialize, Serialize};
use is_terminal::IsTerminal;
mod parser;
mod decoder;
mod stats;
mod html;
mod markdown;

use crate::decoder::DecodedEvent;
use crate::parser::ParseOutcome;
use crate::stats::{Statistics, sorted_by_count};

static ENABLE_COLOR: OnceLock<bool> = OnceLock::new();

const DEFAULT_CONFIG: &str = "fstrace-report.toml";
const REPORT_FILE: &str = "fstrace-report.html";

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Theme { Dark, Light }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum LogLevel { Error, Warn, Info, Debug, Trace }

#[derive(Clone, Copy, Debug, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum LogFormat { Text, Json }

#[derive(Parser, Debug)]
#[command(
    name = "fstrace-report",
    version,
    disable_version_flag = true,
    about = "Summarize a filesystem access trace into an HTML report",
    long_about = "Reads a trace log of file accesses (`process(pid): FLAGS path` per line), counts accesses per path, per written path and per pid, and writes a static HTML report to the temporary directory.",
    after_long_help = "Examples:\n  fstrace-report trace.log\n  fstrace-report trace.log --open\n  fstrace-report trace.log --theme light --json-path stats.json --top 20",
    color = ColorChoice::Auto
)]
struct Args {
    /// Trace log to analyze
    file: Option<PathBuf>,
    /// Open the generated report in the default viewer
    #[arg(long, default_value_t = false)]
    open: bool,
    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
    /// Write the HTML report here instead of the temporary directory
    #[arg(long)]
    html: Option<String>,
    #[arg(long, value_enum, default_value = "dark")]
    theme: Theme,
    #[arg(long, short = 'j')]
    json_path: Option<String>,
    #[arg(long)]
    csv_path: Option<String>,
    #[arg(long)]
    md_path: Option<String>,
    /// Rows per table in the terminal summary
    #[arg(long, short = 'n', default_value_t = 10)]
    top: usize,
    #[arg(long, default_value_t = false)]
    progress: bool,
    #[arg(short = 'q', long, default_value_t = false)]
    quiet: bool,
    #[arg(long, short = 'C', default_value_t = false)]
    no_color: bool,
    #[arg(long, default_value_t = false)]
    force_color: bool,
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
    #[arg(long)]
    log_path: Option<String>,
    #[arg(long)]
    config: Option<String>,
    #[arg(long, value_enum)]
    completions: Option<Shell>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            file: None,
            open: false,
            version: None,
            html: None,
            theme: Theme::Dark,
            json_path: None,
            csv_path: None,
            md_path: None,
            top: 10,
            progress: false,
            quiet: false,
            no_color: false,
            force_color: false,
            log_level: None,
            log_format: None,
            log_path: None,
            config: None,
            completions: None,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct AppConfig {
    open: Option<bool>,
    theme: Option<Theme>,
    html: Option<String>,
    json_path: Option<String>,
    csv_path: Option<String>,
    md_path: Option<String>,
    top: Option<usize>,
    progress: Option<bool>,
    force_color: Option<bool>,
    log_level: Option<LogLevel>,
    log_format: Option<LogFormat>,
    log_path: Option<String>,
}

fn main() {
    let mut args = Args::parse();
    if let Some(sh) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(sh, &mut cmd, "fstrace-report", &mut std::io::stdout());
        return;
    }
    let cfg_err = match load_config(args.config.as_deref()) {
        Ok(Some(cfg)) => { apply_config(&mut args, cfg); None }
        Ok(None) => None,
        Err(e) => Some(e),
    };
    init_logging(&args);
    if let Some(e) = cfg_err { log::warn!("Ignoring config: {:#}", e); }
    let term = std::env::var("TERM").unwrap_or_default();
    let no_color_env = std::env::var_os("NO_COLOR").is_some();
    let color_default = std::io::stdout().is_terminal() && !no_color_env && term != "dumb";
    let enable_color = if args.force_color { true } else { color_default && !args.no_color };
    let _ = ENABLE_COLOR.set(enable_color);

    let Some(file) = args.file.clone() else {
        let _ = Args::command().print_help();
        return;
    };
    if !file.is_file() {
        eprintln!("{}", paint(&format!("File not found: {}", file.display()), "1;31"));
        std::process::exit(1);
    }
    if let Err(e) = run(&args, &file) {
        log::error!("Run failed: {:#}", e);
        eprintln!("{}", paint(&format!("Error: {:#}", e), "1;31"));
        std::process::exit(1);
    }
}

fn run(args: &Args, file: &Path) -> Result<()> {
    if !args.quiet { println!("{}", paint(&format!("Reading {}", file.display()), "1;36")); }
    let text = std::fs::read_to_string(file).with_context(|| format!("reading trace log {}", file.display()))?;

    let pb = if args.progress { Some(indicatif::ProgressBar::new_spinner()) } else { None };
    if let Some(ref pb) = pb { pb.set_message("Parsing"); }
    let mut outcome = ParseOutcome::default();
    for line in parser::non_empty_lines(&text) {
        outcome.record(parser::parse_line(line));
        if let Some(ref pb) = pb && outcome.total_lines % 500 == 0 { pb.tick(); pb.set_message(format!("Parsed {} lines", outcome.total_lines)); }
    }
    if let Some(pb) = pb { pb.finish_and_clear(); }
    log::info!("parsed {} of {} lines ({} errors)", outcome.parsed, outcome.total_lines, outcome.errors);

    let decoded: Vec<DecodedEvent> = std::mem::take(&mut outcome.events).into_iter().map(decoder::decode_event).collect();
    let stats = stats::aggregate(&decoded);
    log::debug!("{} paths, {} write paths, {} pids", stats.paths_count, stats.write_paths_count, stats.pid_count);

    let html_path = report_path(args);
    let html = html::render_html(&stats, args.theme);
    std::fs::write(&html_path, html).with_context(|| format!("writing report {}", html_path.display()))?;
    if !args.quiet { println!("{}", paint(&format!("HTML generated: {}", html_path.display()), "1;36")); }
    if args.open { open_file_default(&html_path); }

    if let Some(p) = args.json_path.as_ref() {
        match serde_json::to_vec_pretty(&stats).map_err(std::io::Error::from).and_then(|b| std::fs::write(p, b)) {
            Ok(_) => { if !args.quiet { println!("{}", paint(&format!("JSON written: {}", p), "1;36")); } }
            Err(e) => log::error!("JSON write failed for {}: {}", p, e),
        }
    }
    if let Some(p) = args.csv_path.as_ref() {
        if let Err(e) = write_csv(p, &stats) { log::error!("CSV write failed for {}: {}", p, e); } else if !args.quiet { println!("{}", paint(&format!("CSV written: {}", p), "1;36")); }
    }
    if let Some(p) = args.md_path.as_ref() {
        let md = markdown::render_markdown(&stats, &outcome);
        match std::fs::write(p, md) {
            Ok(_) => { if !args.quiet { println!("{}", paint(&format!("Markdown written: {}", p), "1;36")); } }
            Err(e) => log::error!("Markdown write failed for {}: {}", p, e),
        }
    }
    if !args.quiet { print_summary(&stats, &outcome, args.top); }
    Ok(())
}

fn report_path(args: &Args) -> PathBuf {
    match args.html.as_ref() {
        Some(p) => PathBuf::from(p),
        None => std::env::temp_dir().join(REPORT_FILE),
    }
}

fn load_config(path: Option<&str>) -> Result<Option<AppConfig>> {
    let (p, explicit) = match path { Some(p) => (PathBuf::from(p), true), None => (PathBuf::from(DEFAULT_CONFIG), false) };
    if !explicit && !p.exists() { return Ok(None); }
    let s = std::fs::read_to_string(&p).with_context(|| format!("reading {}", p.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s).with_context(|| format!("parsing {}", p.display()))?;
    Ok(Some(cfg))
}

/// Config values only fill in options left at their defaults.
fn apply_config(args: &mut Args, cfg: AppConfig) {
    if !args.open && let Some(v) = cfg.open { args.open = v; }
    if args.theme == Theme::Dark && let Some(v) = cfg.theme { args.theme = v; }
    if args.html.is_none() && let Some(v) = cfg.html { args.html = Some(v); }
    if args.json_path.is_none() && let Some(v) = cfg.json_path { args.json_path = Some(v); }
    if args.csv_path.is_none() && let Some(v) = cfg.csv_path { args.csv_path = Some(v); }
    if args.md_path.is_none() && let Some(v) = cfg.md_path { args.md_path = Some(v); }
    if args.top == 10 && let Some(v) = cfg.top { args.top = v; }
    if !args.progress && let Some(v) = cfg.progress { args.progress = v; }
    if !args.force_color && let Some(v) = cfg.force_color { args.force_color = v; }
    if args.log_level.is_none() && let Some(v) = cfg.log_level { args.log_level = Some(v); }
    if args.log_format.is_none() && let Some(v) = cfg.log_format { args.log_format = Some(v); }
    if args.log_path.is_none() && let Some(v) = cfg.log_path { args.log_path = Some(v); }
}

fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if let Some(lvl) = args.log_level {
        let f = match lvl { LogLevel::Error => log::LevelFilter::Error, LogLevel::Warn => log::LevelFilter::Warn, LogLevel::Info => log::LevelFilter::Info, LogLevel::Debug => log::LevelFilter::Debug, LogLevel::Trace => log::LevelFilter::Trace };
        builder.filter_level(f);
    }
    if let Some(fmt) = args.log_format {
        match fmt {
            LogFormat::Json => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    let ts = chrono::Local::now().to_rfc3339();
                    let obj = serde_json::json!({
                        "ts": ts,
                        "level": record.level().to_string(),
                        "target": record.target(),
                        "msg": record.args().to_string(),
                    });
                    writeln!(buf, "{}", obj)
                });
            }
            LogFormat::Text => {
                builder.format(|buf, record| {
                    use std::io::Write;
                    let ts = chrono::Local::now().format("%H:%M:%S");
                    writeln!(buf, "[{:<5} {}] {}", record.level(), ts, record.args())
                });
            }
        }
    }
    if let Some(path) = args.log_path.as_ref() {
        match std::fs::File::create(path) {
            Ok(f) => { builder.target(env_logger::Target::Pipe(Box::new(f))); }
            Err(e) => { eprintln!("Failed to open log file {}: {}", path, e); }
        }
    }
    builder.init();
}

fn print_summary(stats: &Statistics, outcome: &ParseOutcome, top: usize) {
    let line = format!("Parsed {} of {} lines ({} errors)", outcome.parsed, outcome.total_lines, outcome.errors);
    println!("{}", paint(&line, if outcome.errors > 0 { "33" } else { "1;32" }));
    let sections = [("Path", &stats.count_per_path, stats.paths_count), ("Write Path", &stats.count_per_write_path, stats.write_paths_count)];
    for (title, map, total) in sections {
        if map.is_empty() { continue; }
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![paint(&format!("{} ({})", title, total), "1"), paint("Count", "1")]);
        for (k, c) in sorted_by_count(map).into_iter().take(top) { table.add_row(vec![k.to_string(), c.to_string()]); }
        println!("{}", table);
    }
    if !stats.count_per_pid.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![paint(&format!("PID ({})", stats.pid_count), "1"), paint("Process", "1"), paint("Count", "1")]);
        for (pid, c) in sorted_by_count(&stats.count_per_pid).into_iter().take(top) { table.add_row(vec![pid.to_string(), stats.process_of(pid).to_string(), c.to_string()]); }
        println!("{}", table);
    }
}

fn write_csv(path: &str, stats: &Statistics) -> Result<(), std::io::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["section", "key", "count", "process"])?;
    for (k, c) in sorted_by_count(&stats.count_per_path) { wtr.write_record(["path", k, &c.to_string(), ""])?; }
    for (k, c) in sorted_by_count(&stats.count_per_write_path) { wtr.write_record(["write_path", k, &c.to_string(), ""])?; }
    for (k, c) in sorted_by_count(&stats.count_per_pid) { wtr.write_record(["pid", k, &c.to_string(), stats.process_of(k)])?; }
    wtr.flush()?;
    Ok(())
}

fn paint(s: &str, code: &str) -> String {
    if *ENABLE_COLOR.get().unwrap_or(&true) { format!("\x1b[{}m{}\x1b[0m", code, s) } else { s.to_string() }
}

/// Viewer command for the given `std::env::consts::OS` value.
fn opener_for(os: &str, target: &str) -> (&'static str, Vec<String>) {
    match os {
        "macos" => ("open", vec![target.to_string()]),
        "windows" => ("cmd", vec!["/C".to_string(), "start".to_string(), String::new(), target.to_string()]),
        "linux" => ("xdg-open", vec![target.to_string()]),
        _ => ("xdg-open", vec![target.to_string()]),
    }
}

fn open_file_default(p: &Path) {
    let s = p.to_string_lossy().into_owned();
    let (prog, argv) = opener_for(std::env::consts::OS, &s);
    let _ = std::process::Command::new(prog).args(&argv).spawn().map_err(|e| log::error!("Failed to open file {}: {}", s, e));
}
