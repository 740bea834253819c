use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use choiceset::catalogue::{available_presets, get_by_name};
use choiceset::enumerate::PairStats;
use choiceset::format::{
    long_to_wide, modfed_to_ngene, persist_all, read_table, wide_to_long, write_table,
    NgeneSchema, DEFAULT_NO_CHOICE_COLUMN,
};
use choiceset::sample::{ReservoirSampler, Sampler};
use choiceset::sink::{ChoiceSetSink, LongCsvSink, WideCsvSink};
use choiceset::{run_design, DesignConfig};
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use log::info;

#[derive(Parser)]
#[command(author, version, about = "Candidate choice sets for discrete-choice experiments")]
struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate all valid choice sets and write the candidate files
    Generate {
        /// Named preset (see `presets`)
        #[arg(short, long, default_value = "copy", conflicts_with = "config")]
        preset: String,

        /// JSON configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Wide candidate CSV with every accepted choice set
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Also write every accepted choice set in the long idefix layout
        #[arg(long, value_name = "FILE")]
        long: Option<PathBuf>,

        /// Also write a uniform sample of the candidates (wide layout)
        #[arg(long, value_name = "FILE")]
        sample: Option<PathBuf>,

        /// Sample size bound, overriding the configuration
        #[arg(short = 'm', long, value_name = "INT")]
        max_choices: Option<usize>,

        /// Sampling seed
        #[arg(short, long, value_name = "INT")]
        seed: Option<u64>,

        /// Worker threads (default: all cores)
        #[arg(short = 'j', long, value_name = "INT")]
        threads: Option<usize>,
    },

    /// Convert a wide design to the long idefix layout
    ToLong {
        /// Wide design CSV
        input: PathBuf,
        /// Long design CSV to write
        output: PathBuf,
    },

    /// Convert a long idefix design back to the wide layout
    ToWide {
        /// Long design CSV
        input: PathBuf,
        /// Wide design CSV to write
        output: PathBuf,
    },

    /// Convert a modfed design to the ngene layout
    ToNgene {
        /// Modfed design CSV
        input: PathBuf,
        /// Ngene design CSV to write
        output: PathBuf,

        /// Name of the no-choice indicator column
        #[arg(long, value_name = "NAME", default_value = DEFAULT_NO_CHOICE_COLUMN)]
        no_choice_column: String,
    },

    /// Draw a uniform sample of rows from a wide design
    Sample {
        /// Wide design CSV (first column is the identifier)
        input: PathBuf,
        /// Sampled CSV to write
        output: PathBuf,

        /// Number of rows to keep
        #[arg(short = 'm', long, value_name = "INT")]
        max_choices: usize,

        /// Sampling seed
        #[arg(short, long, value_name = "INT")]
        seed: Option<u64>,
    },

    /// List presets, or print one as a JSON configuration
    Presets {
        /// Preset to print
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => simplelog::LevelFilter::Warn,
        (false, 0) => simplelog::LevelFilter::Info,
        (false, 1) => simplelog::LevelFilter::Debug,
        (false, _) => simplelog::LevelFilter::Trace,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    match cli.command {
        Commands::Generate {
            preset,
            config,
            output,
            long,
            sample,
            max_choices,
            seed,
            threads,
        } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => get_by_name(&preset)?,
            };
            if max_choices.is_some() {
                config.max_choices = max_choices;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if threads.is_some() {
                config.threads = threads;
            }
            generate(&config, &output, long.as_deref(), sample.as_deref())?;
        }

        Commands::ToLong { input, output } => {
            let wide = read_table(&input)?;
            let long = wide_to_long(&wide)?;
            write_table(&output, &long)?;
            info!(
                "wrote {} long rows to {}",
                long.nrows(),
                output.display()
            );
        }

        Commands::ToWide { input, output } => {
            let long = read_table(&input)?;
            let wide = long_to_wide(&long)?;
            write_table(&output, &wide)?;
            info!(
                "wrote {} choice situations to {}",
                wide.nrows(),
                output.display()
            );
        }

        Commands::ToNgene {
            input,
            output,
            no_choice_column,
        } => {
            let modfed = read_table(&input)?;
            let schema = NgeneSchema::default().with_no_choice_column(no_choice_column);
            let ngene = modfed_to_ngene(&modfed, &schema)?;
            write_table(&output, &ngene)?;
            info!(
                "created ngene format design with {} rows (choice situations)",
                ngene.nrows()
            );
        }

        Commands::Sample {
            input,
            output,
            max_choices,
            seed,
        } => {
            if max_choices == 0 {
                bail!("--max-choices must be at least 1");
            }
            let table = read_table(&input)?;
            let sampled = Sampler::new(max_choices).seed(seed).sample_table(&table)?;
            write_table(&output, &sampled)?;
            info!("wrote {} rows to {}", sampled.nrows(), output.display());
        }

        Commands::Presets { name } => match name {
            Some(name) => println!("{}", preset_json(&name)?),
            None => {
                for (name, description) in available_presets() {
                    println!("{name:<12} {description}");
                }
            }
        },
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<DesignConfig> {
    let file = File::open(path).wrap_err_with(|| format!("opening {}", path.display()))?;
    let config: DesignConfig = serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("parsing configuration {}", path.display()))?;
    Ok(config)
}

fn preset_json(name: &str) -> Result<String> {
    let config = get_by_name(name)?;
    Ok(serde_json::to_string_pretty(&config)?)
}

/// Stage every requested output before scanning, publish them only once all
/// of them are complete.
fn generate(
    config: &DesignConfig,
    output: &Path,
    long: Option<&Path>,
    sample: Option<&Path>,
) -> Result<PairStats> {
    config.validate()?;

    let mut reservoir = match (sample, config.max_choices) {
        (Some(_), Some(max)) => Some(ReservoirSampler::new(max, config.seed)),
        (Some(_), None) => bail!("--sample needs --max-choices or max_choices in the configuration"),
        (None, _) => None,
    };
    let mut wide = WideCsvSink::create(output, config.id_column)
        .wrap_err_with(|| format!("creating {}", output.display()))?;
    let mut long_sink = long
        .map(|path| {
            LongCsvSink::create(path).wrap_err_with(|| format!("creating {}", path.display()))
        })
        .transpose()?;
    let sample_sink = sample
        .map(|path| {
            WideCsvSink::create(path, config.id_column)
                .wrap_err_with(|| format!("creating {}", path.display()))
        })
        .transpose()?;

    let time_total = std::time::Instant::now();
    let stats = run_design(config, &mut (&mut wide, (&mut long_sink, &mut reservoir)))?;
    info!(
        "{} of {} pairs accepted in {:.2?}",
        stats.accepted,
        stats.pairs_examined,
        time_total.elapsed()
    );

    let mut staged = vec![wide.finish()?];
    if let Some(sink) = long_sink {
        staged.push(sink.finish()?);
    }
    if let (Some(reservoir), Some(mut sink)) = (reservoir, sample_sink) {
        let design = reservoir.into_design();
        info!("sampled {} of {} choice sets", design.len(), stats.accepted);
        for &choice_set in &design {
            sink.accept(choice_set)?;
        }
        staged.push(sink.finish()?);
    }

    for path in persist_all(staged)? {
        info!("wrote {}", path.display());
    }
    Ok(stats)
}
