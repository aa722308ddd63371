use anyhow::Context;
use clap::{Parser, Subcommand};
use poimap::generator::{Region, generate};
use poimap::{Config, DataFile, GeoPoint, PoiService, write_points};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Query a point-of-interest data set", long_about = None)]
struct Args {
    /// JSON configuration file (zoom threshold, cluster count, seed, ...)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a random data set over the major land masses
    Generate {
        #[arg(short = 'n', long, default_value_t = 10_000)]
        count: usize,

        /// Output file; format follows the extension (.jsonl, .json, .snap)
        #[arg(short, long)]
        output: PathBuf,

        /// Number of regions to draw from (1-5)
        #[arg(short, long, default_value_t = 5)]
        regions: usize,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print every point
    Fetch {
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Print the points strictly inside a bounding box
    Within {
        #[arg(short, long)]
        data: PathBuf,

        /// left,bottom,right,top
        #[arg(allow_hyphen_values = true)]
        bounds: String,
    },

    /// Print the zoom-dependent view: clusters below the threshold, else the box contents
    View {
        #[arg(short, long)]
        data: PathBuf,

        /// left,bottom,right,top
        #[arg(allow_hyphen_values = true)]
        bounds: String,

        #[arg(allow_hyphen_values = true)]
        zoom: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poimap=info,poimap_cli=info,warn".into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Generate {
            count,
            output,
            regions,
            seed,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let points = generate(count, Region::first(regions), &mut rng);
            write_points(&output, &points)
                .with_context(|| format!("writing {}", output.display()))?;
            info!("Wrote {} points to {}", points.len(), output.display());
        }
        Command::Fetch { data } => {
            let service = open_service(&data, config)?;
            print_points(service.fetch_all()?, args.pretty)?;
        }
        Command::Within { data, bounds } => {
            let service = open_service(&data, config)?;
            print_points(&service.fetch_within_str(&bounds)?, args.pretty)?;
        }
        Command::View { data, bounds, zoom } => {
            let service = open_service(&data, config)?;
            let view = service.fetch_view_str(&bounds, &zoom)?;
            info!(
                "{} {} points for bounds ({}) @ zoom {}",
                if view.is_clusters() { "Clustered" } else { "Selected" },
                view.len(),
                bounds,
                zoom
            );
            print_points(&view, args.pretty)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Config::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

fn open_service(data: &Path, config: Config) -> anyhow::Result<PoiService> {
    info!("Opening data set at {}", data.display());
    let service = PoiService::start(DataFile::open(data)?, config)?;
    if let Some(err) = service.load_error() {
        anyhow::bail!("data set {} could not be loaded: {}", data.display(), err);
    }
    Ok(service)
}

fn print_points(points: &[GeoPoint], pretty: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, points)?;
    } else {
        serde_json::to_writer(&mut out, points)?;
    }
    writeln!(out)?;
    Ok(())
}
