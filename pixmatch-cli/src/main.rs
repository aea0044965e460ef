mod clipboard;
mod fetch;

use clap::{Parser, Subcommand};
use clipboard::Clipboard;
use pixmatch::catalogue::source::{display_name, scan_dir};
use pixmatch::{
    fingerprint_bytes, fingerprint_path, reindex_all, CanonicalSize, Catalogue, CatalogueStore,
    Fingerprint, MatchConfig, MatchReport, MatchResult, Matcher, Removal, StoreStatus, Tolerance,
    Upsert, Verdict,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_PATH: &str = "pixmatch.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Match images against a catalogue of reference images")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-index every image in the configured image directory.
    Reindex,
    /// Index a single image file.
    Add {
        /// Image file to fingerprint.
        path: PathBuf,
        /// Display name for the entry (defaults to the file name without extension).
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Remove an entry by display name.
    Remove {
        /// Display name of the entry.
        name: String,
    },
    /// List catalogue entries.
    List,
    /// Compare a local image file or an image URL against the catalogue.
    Match {
        /// Local path or http(s) URL of the query image.
        target: String,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Do not copy a strong match to the clipboard.
        #[arg(long)]
        no_clipboard: bool,
    },
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    index_path: PathBuf,
    image_dir: PathBuf,
    canonical_width: u32,
    canonical_height: u32,
    tolerance: u32,
    strong_match_threshold: f64,
    top_n: usize,
    parallel: bool,
    copy_to_clipboard: bool,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            index_path: PathBuf::from("image_index.json"),
            image_dir: PathBuf::from("images"),
            canonical_width: CanonicalSize::DEFAULT.width(),
            canonical_height: CanonicalSize::DEFAULT.height(),
            tolerance: cfg.tolerance.0,
            strong_match_threshold: cfg.strong_threshold,
            top_n: cfg.top_n,
            parallel: cfg.parallel,
            copy_to_clipboard: true,
        }
    }
}

impl Config {
    fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => Path::new(DEFAULT_CONFIG_PATH),
            None => return Ok(Self::default()),
        };
        let text = fs::read_to_string(path)
            .map_err(|err| format!("cannot read config {}: {err}", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }

    fn canonical_size(&self) -> pixmatch::PixMatchResult<CanonicalSize> {
        CanonicalSize::new(self.canonical_width, self.canonical_height)
    }

    fn match_config(&self) -> MatchConfig {
        MatchConfig {
            tolerance: Tolerance(self.tolerance),
            strong_threshold: self.strong_match_threshold,
            top_n: self.top_n,
            parallel: self.parallel,
        }
    }
}

/// Owns the catalogue for one invocation.
struct Session {
    store: CatalogueStore,
    catalogue: Catalogue,
    size: CanonicalSize,
}

impl Session {
    fn open(cfg: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let size = cfg.canonical_size()?;
        let store = CatalogueStore::new(&cfg.index_path);
        let outcome = store.load();
        match &outcome.status {
            StoreStatus::Corrupt { reason } | StoreStatus::Unreadable { reason } => {
                eprintln!(
                    "Warning: index file {} could not be used ({reason}). Starting fresh.",
                    store.path().display()
                );
            }
            StoreStatus::Missing | StoreStatus::Loaded => {}
        }
        Ok(Self {
            store,
            catalogue: outcome.catalogue,
            size,
        })
    }

    fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.save(&self.catalogue)?;
        println!(
            "Saved {} entries to {}.",
            self.catalogue.len(),
            self.store.path().display()
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    query: &'a str,
    tolerance: u32,
    strong_threshold: f64,
    verdict: Verdict,
    best: Option<&'a MatchResult>,
    top: &'a [MatchResult],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("pixmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let Some(command) = cli.command else {
        return Err("no command given; run with --help for usage".into());
    };

    let config = Config::load(cli.config.as_deref())?;
    let matcher = Matcher::new(config.match_config())?;
    let mut session = Session::open(&config)?;

    match command {
        Command::Reindex => reindex(&mut session, &config.image_dir),
        Command::Add { path, name } => add(&mut session, &path, name),
        Command::Remove { name } => remove(&mut session, &name),
        Command::List => {
            for name in session.catalogue.names() {
                println!("{name}");
            }
            println!("{} entries", session.catalogue.len());
            Ok(())
        }
        Command::Match {
            target,
            json,
            no_clipboard,
        } => {
            let clipboard = clipboard::detect(config.copy_to_clipboard && !no_clipboard && !json);
            run_match(&session, &matcher, &target, json, &*clipboard)
        }
    }
}

fn reindex(session: &mut Session, image_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !image_dir.is_dir() {
        fs::create_dir_all(image_dir)?;
        println!(
            "Created '{}'. Place your reference images inside it and run reindex again.",
            image_dir.display()
        );
        return Ok(());
    }

    println!("Indexing files in '{}'...", image_dir.display());
    let sources = scan_dir(image_dir)?;
    let report = reindex_all(&mut session.catalogue, sources, session.size);
    for failure in &report.failures {
        eprintln!("  skipped '{}': {}", failure.name, failure.reason);
    }
    println!(
        "Indexed/updated {} files ({} skipped).",
        report.indexed_count(),
        report.failure_count()
    );
    session.save()
}

fn add(
    session: &mut Session,
    path: &Path,
    name: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = match name.or_else(|| display_name(path)) {
        Some(name) => name,
        None => {
            let msg = format!("cannot derive a name from {}; pass --name", path.display());
            return Err(msg.into());
        }
    };
    let fp = fingerprint_path(path, session.size)?;
    match session.catalogue.upsert(name.as_str(), fp)? {
        Upsert::Inserted => println!("Added '{name}'."),
        Upsert::Replaced => println!("Updated '{name}'."),
    }
    session.save()
}

fn remove(session: &mut Session, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    match session.catalogue.remove(name) {
        Removal::Removed => {
            println!("Removed '{name}'.");
            session.save()
        }
        Removal::NotFound => {
            println!("Entry '{name}' not found in the index.");
            Ok(())
        }
    }
}

fn load_query(
    target: &str,
    size: CanonicalSize,
) -> Result<Fingerprint, Box<dyn std::error::Error>> {
    if fetch::is_url(target) {
        eprintln!("Downloading {target}...");
        let bytes = fetch::download(target)?;
        Ok(fingerprint_bytes(&bytes, size)?)
    } else {
        Ok(fingerprint_path(target, size)?)
    }
}

fn run_match(
    session: &Session,
    matcher: &Matcher,
    target: &str,
    json: bool,
    clipboard: &dyn Clipboard,
) -> Result<(), Box<dyn std::error::Error>> {
    if session.catalogue.is_empty() && !json {
        println!("Index is empty. Run 'reindex' or 'add' first.");
        return Ok(());
    }

    let query = load_query(target, session.size)?;
    let report = matcher.match_query(&query, &session.catalogue);

    if json {
        let out = JsonReport {
            query: target,
            tolerance: matcher.config().tolerance.0,
            strong_threshold: report.strong_threshold(),
            verdict: report.verdict(),
            best: report.best(),
            top: report.top_entries(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_report(&report, session.catalogue.len(), matcher.config().tolerance);

    if let Some(best) = report.strong_match() {
        if clipboard.is_enabled() {
            match clipboard.copy(&best.name) {
                Ok(()) => println!(
                    "(Copied '{}' to clipboard via {}.)",
                    best.name,
                    clipboard.describe()
                ),
                Err(err) => eprintln!("Could not copy to clipboard: {err}"),
            }
        }
    }
    Ok(())
}

fn print_report(report: &MatchReport, entries: usize, tolerance: Tolerance) {
    println!(
        "\n--- Comparing against {entries} indexed entries (tolerance: {}) ---",
        tolerance.0
    );
    for hit in report.near_perfect() {
        println!(
            "  --> NEAR PERFECT MATCH: '{}' with {:.2}% confidence",
            hit.name, hit.confidence
        );
    }

    println!("\n--- TOP MATCHES ---");
    for (idx, result) in report.top_entries().iter().enumerate() {
        println!("  #{}: '{}' ({:.2}%)", idx + 1, result.name, result.confidence);
    }

    println!("\n--- VERDICT ---");
    match (report.verdict(), report.best()) {
        (Verdict::StrongMatch, Some(best)) => println!(
            "Best match is '{}' with a strong confidence of {:.2}%.",
            best.name, best.confidence
        ),
        (Verdict::NoStrongMatch, Some(best)) => println!(
            "No strong match found. Best result: '{}' ({:.2}%).",
            best.name, best.confidence
        ),
        _ => println!("No entries to compare against."),
    }
}
