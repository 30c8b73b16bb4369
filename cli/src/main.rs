use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use arcsviz::constants::{DEFAULT_ARENA_CAPACITY, DEFAULT_ELEMENT_CAPACITY};
use arcsviz::{
    Arena, CacheOptions, Dataset, FileLoader, LoadOptions, MatrixReport, PairReport,
    ResourceCache, Str,
};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "arcsviz",
    version,
    about = "Mechanic co-occurrence reports for card manifests"
)]
struct Args {
    /// Card manifest CSV: fate rows, item rows and mechanic continuation rows.
    manifest: PathBuf,

    /// Mechanics CSV: a header row, then one mechanic name per row.
    mechanics: PathBuf,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Which report to produce.
    #[arg(long, value_enum, default_value_t = Report::Matrix)]
    report: Report,

    /// List the items carrying both mechanics instead of a report.
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pair: Option<Vec<String>>,

    /// Directory of item images, named by item id.
    #[arg(long, value_name = "dir", requires = "pair")]
    images: Option<PathBuf>,

    /// Hard limit on bytes charged to the arena.
    #[arg(long, value_name = "bytes", default_value_t = DEFAULT_ARENA_CAPACITY)]
    arena_capacity: usize,

    /// Maximum number of manifest elements.
    #[arg(long, value_name = "number", default_value_t = DEFAULT_ELEMENT_CAPACITY)]
    element_capacity: usize,

    /// Fail on the first malformed manifest row instead of reporting it.
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Report {
    /// Full mechanic by mechanic count matrix.
    Matrix,
    /// Count per unordered mechanic pair.
    Pairs,
    /// Items per ordered mechanic pair.
    Items,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);
    if let Err(err) = run(&args) {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // Only fails when a global subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .try_init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let manifest = fs::read(&args.manifest)
        .map_err(|err| format!("cannot read {}: {err}", args.manifest.display()))?;
    let mechanics = fs::read(&args.mechanics)
        .map_err(|err| format!("cannot read {}: {err}", args.mechanics.display()))?;

    let options = LoadOptions::new()
        .with_arena_capacity(args.arena_capacity)
        .with_element_capacity(args.element_capacity)
        .with_strict(args.strict);
    let mut arena = Arena::with_capacity(options.arena_capacity);
    let dataset = Dataset::load(&manifest, &mechanics, &mut arena, &options)?;
    info!(
        elements = dataset.elements().len(),
        mechanics = dataset.catalog().len(),
        diagnostics = dataset.diagnostics().len(),
        "loaded {}",
        args.manifest.display()
    );

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    if let Some(pair) = &args.pair {
        return run_pair(args, pair, &dataset, &mut arena, &output_target);
    }

    with_output_writer(output_target.path(), |writer| {
        match (args.report, args.format) {
            (Report::Matrix, Format::Csv) => arcsviz::write_matrix_csv(writer, &dataset)?,
            (Report::Matrix, Format::Json) => {
                arcsviz::write_json(writer, &MatrixReport::new(&dataset))?
            }
            (Report::Pairs, Format::Csv) => arcsviz::write_pair_counts(writer, &dataset)?,
            (Report::Pairs, Format::Json) => {
                arcsviz::write_json(writer, &PairReport::all_counts(&dataset))?
            }
            (Report::Items, Format::Csv) => arcsviz::write_pair_items(writer, &dataset)?,
            (Report::Items, Format::Json) => {
                arcsviz::write_json(writer, &PairReport::all_items(&dataset))?
            }
        }
        Ok(())
    })
}

fn run_pair(
    args: &Args,
    pair: &[String],
    dataset: &Dataset<'_>,
    arena: &mut Arena,
    output_target: &OutputTarget,
) -> Result<(), Box<dyn Error>> {
    let [a, b] = pair else {
        return Err("--pair takes exactly two mechanic names".into());
    };
    let index = |name: &str| {
        dataset
            .catalog()
            .index_of(Str::from(name))
            .ok_or_else(|| format!("unknown mechanic: {name}"))
    };
    let (i, j) = (index(a.as_str())?, index(b.as_str())?);
    let mut report = PairReport::with_items(dataset, i, j)
        .ok_or_else(|| format!("unknown mechanic pair: {a} x {b}"))?;

    if let Some(dir) = &args.images {
        let mut cache = ResourceCache::new(FileLoader::new(), CacheOptions::new().with_root(dir));
        let registered = cache.register_dir(dir, arena)?;
        debug!(registered, dir = %dir.display(), "image directory scanned");
        for item in &mut report.items {
            let handle = cache.get_resource(item.id, arena)?;
            if let Some(path) = cache.loader().path(handle) {
                item.image = Some(path.display().to_string());
            }
        }
    }

    with_output_writer(output_target.path(), |writer| {
        match args.format {
            Format::Csv => arcsviz::write_items_csv(writer, &report.items)?,
            Format::Json => arcsviz::write_json(writer, &report)?,
        }
        Ok(())
    })
}

#[derive(Clone, Debug)]
enum OutputTarget {
    Stdout,
    File(String),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some(path) if path != "-" => OutputTarget::File(path.to_string()),
            _ => OutputTarget::Stdout,
        }
    }

    fn path(&self) -> Option<&str> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.as_str()),
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = io::BufWriter::new(fs::File::create(path)?);
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}
