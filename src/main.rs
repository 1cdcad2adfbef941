use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use credit_scorer::config::{self, Config};
use credit_scorer::ingest::{self, AmountsOwed, DelayMode, MixSource};
use credit_scorer::output::{self, OutputFormat};
use credit_scorer::profile::{CreditMix, CreditProfile, LoanPortfolio};
use credit_scorer::risk::{self, MarketInputs};
use credit_scorer::scoring::{self, Preset, Scorer};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_OUTPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

/// One customer's inputs, as command line flags.
#[derive(Args, Debug)]
struct ProfileArgs {
    /// Days past due; repeat for a payment series
    #[arg(long = "delay", allow_negative_numbers = true)]
    delays: Vec<f64>,
    /// Number of past-due payments
    #[arg(long, default_value_t = 0.0)]
    delayed_payments: f64,
    /// Months on file (defaults to --history)
    #[arg(long)]
    months: Option<f64>,
    /// Utilization ratio, or outstanding debt under the traditional preset
    #[arg(long, default_value_t = 0.0)]
    utilization: f64,
    /// Credit history age in months
    #[arg(long, default_value_t = 0.0)]
    history: f64,
    /// Credit mix rating or 0/1/2 code
    #[arg(long, conflicts_with = "loans")]
    mix: Option<String>,
    /// Number of loans held
    #[arg(long)]
    loans: Option<f64>,
    /// Comma separated loan types
    #[arg(long, requires = "loans")]
    loan_types: Option<String>,
    #[arg(long, default_value_t = 0.0)]
    inquiries: f64,
}

impl ProfileArgs {
    fn into_profile(self) -> CreditProfile {
        let credit_mix = match (self.mix, self.loans) {
            (Some(raw), _) => CreditMix::parse(&raw),
            (None, Some(count)) => CreditMix::Loans(LoanPortfolio::from_type_list(
                count,
                self.loan_types.as_deref().unwrap_or(""),
            )),
            (None, None) => CreditMix::Unknown,
        };

        let mut profile = CreditProfile::new("command line")
            .with_history(self.history)
            .with_utilization(self.utilization)
            .with_credit_mix(credit_mix)
            .with_inquiries(self.inquiries);
        profile = match self.delays.as_slice() {
            [single] => profile.with_delay(*single),
            _ => profile.with_delays(self.delays),
        };
        if let Some(months) = self.months {
            profile = profile.with_months_on_file(months);
        }
        profile.delayed_payments = self.delayed_payments;
        profile
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score every customer in a CSV file
    Score {
        /// Customer table (one row per customer-month or per customer)
        csv: PathBuf,
        /// Start from this preset instead of the configured one
        #[arg(long, value_enum)]
        preset: Option<Preset>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// How delays are folded per customer
        #[arg(long, value_enum)]
        delays: Option<DelayMode>,
        /// Which columns describe the credit mix
        #[arg(long, value_enum)]
        mix_source: Option<MixSource>,
        /// Which column feeds the amounts-owed factor (defaults to the preset's)
        #[arg(long, value_enum)]
        amounts_owed: Option<AmountsOwed>,
        /// Print recommendations under the table
        #[arg(long)]
        advice: bool,
    },
    /// Score one profile given on the command line and show the breakdown
    Explain {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, value_enum)]
        preset: Option<Preset>,
    },
    /// Write the cleaned per-customer training table
    Clean {
        csv: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Collapse the recorded label to good (1) / bad (0)
        #[arg(long)]
        binary: bool,
    },
    /// Compare computed bands with the ratings recorded in the data
    Evaluate {
        csv: PathBuf,
        /// Good/bad instead of Bad/Standard/Good
        #[arg(long)]
        binary: bool,
        #[arg(long, value_enum)]
        preset: Option<Preset>,
        #[arg(long, value_enum)]
        amounts_owed: Option<AmountsOwed>,
    },
    /// Merton default probability, Altman Z'' and a lending decision
    Risk {
        /// Financial statement YAML
        statement: PathBuf,
        /// Share price
        #[arg(long)]
        price: f64,
        /// Annualised asset volatility
        #[arg(long)]
        sigma: f64,
        /// Risk-free rate
        #[arg(long, allow_negative_numbers = true)]
        rate: f64,
        /// Horizon in years
        #[arg(long, default_value_t = 1.0)]
        horizon: f64,
    },
    /// Create a config file interactively
    Init {
        /// Where to write the config (defaults to ~/.config/credit-scorer/config.yaml)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Check the effective scoring config and exit
    Validate,
}

#[derive(Parser, Debug)]
#[command(name = "credit-scorer")]
#[command(about = "FICO-like credit scoring and company credit risk CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/credit-scorer/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Print the error chain and exit with `code`.
fn fail(code: i32, heading: &str, error: anyhow::Error) -> ! {
    eprintln!("{}: {:#}", heading, error);
    std::process::exit(code);
}

/// Load the config file and make sure the scoring rules hold together.
fn load_valid_config(path: Option<&str>, preset: Option<Preset>) -> Config {
    let mut config = match config::load_config(path.map(PathBuf::from)) {
        Ok(c) => c,
        Err(e) => fail(EXIT_CONFIG, "Config error", e),
    };
    if preset.is_some() {
        config.scoring.preset = preset;
    }

    if let Err(errors) = scoring::validate_scoring(&config.scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    config
}

/// Settle ingest options that follow the scoring preset.
fn resolve_ingest(config: &mut Config, amounts_owed: Option<AmountsOwed>) {
    if amounts_owed.is_some() {
        config.ingest.amounts_owed = amounts_owed;
    }
    let preset = config.scoring.preset.unwrap_or_default();
    config.ingest.resolve(preset);
}

fn build_scorer(config: &Config) -> Scorer {
    match Scorer::new(&config.scoring) {
        Ok(s) => s,
        Err(e) => fail(EXIT_CONFIG, "Config error", e),
    }
}

/// Write to `path`, or stdout when no path is given.
fn emit(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            config::ensure_parent_dir(path)?;
            fs::write(path, contents)
                .with_context(|| format!("Failed to write output file: {}", path.display()))
        }
        None => {
            if contents.ends_with('\n') {
                print!("{}", contents);
            } else {
                println!("{}", contents);
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = credit_scorer::telemetry::init(cli.verbose) {
        eprintln!("Logging setup failed: {}", e);
    }

    let start_time = Instant::now();
    let use_colors = output::should_use_colors();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Score {
            csv,
            preset,
            format,
            output: out_path,
            delays,
            mix_source,
            amounts_owed,
            advice,
        } => {
            let mut config = load_valid_config(config_path, preset);
            if let Some(delays) = delays {
                config.ingest.delays = delays;
            }
            if let Some(mix_source) = mix_source {
                config.ingest.mix_source = mix_source;
            }
            resolve_ingest(&mut config, amounts_owed);
            let scorer = build_scorer(&config);

            let profiles = match ingest::load_profiles(&csv, &config.ingest) {
                Ok(p) => p,
                Err(e) => fail(EXIT_INPUT, "Input error", e),
            };
            info!(customers = profiles.len(), path = %csv.display(), "loaded customer table");

            let results = scorer.score_batch(&profiles);
            // Colors only make sense on the terminal.
            let colored = use_colors && out_path.is_none();
            let mut rendered = match output::render_scores(&results, format, colored) {
                Ok(r) => r,
                Err(e) => fail(EXIT_OUTPUT, "Output error", e),
            };

            if advice && format == OutputFormat::Table {
                for result in &results {
                    let lines = output::format_recommendations(
                        &scoring::recommendations(&result.components),
                        colored,
                    );
                    rendered.push_str(&format!("\n\n{}\n{}", result.customer_id, lines));
                }
            }

            if let Err(e) = emit(out_path.as_deref(), &rendered) {
                fail(EXIT_OUTPUT, "Output error", e);
            }
            info!(
                customers = results.len(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "scored customers"
            );
        }
        Commands::Explain { profile, preset } => {
            let config = load_valid_config(config_path, preset);
            let scorer = build_scorer(&config);
            let profile = profile.into_profile();
            let result = scorer.calculate_score(&profile);
            println!("{}", output::format_breakdown(&result, use_colors));
            println!();
            println!("Recommendations:");
            println!(
                "{}",
                output::format_recommendations(
                    &scoring::recommendations(&result.components),
                    use_colors
                )
            );
        }
        Commands::Clean {
            csv,
            output: out_path,
            binary,
        } => {
            let config = load_valid_config(config_path, None);
            let summaries = match ingest::read_summaries(&csv) {
                Ok(s) => s,
                Err(e) => fail(EXIT_INPUT, "Input error", e),
            };
            let binary = binary || config.ingest.binary_labels;

            let mut buffer = Vec::new();
            let written = output::write_clean_csv(&mut buffer, &summaries, binary)
                .and_then(|()| String::from_utf8(buffer).context("CSV output is not UTF-8"))
                .and_then(|text| emit(out_path.as_deref(), &text));
            if let Err(e) = written {
                fail(EXIT_OUTPUT, "Output error", e);
            }
            info!(customers = summaries.len(), "wrote cleaned table");
        }
        Commands::Evaluate {
            csv,
            binary,
            preset,
            amounts_owed,
        } => {
            let mut config = load_valid_config(config_path, preset);
            resolve_ingest(&mut config, amounts_owed);
            let scorer = build_scorer(&config);
            let profiles = match ingest::load_profiles(&csv, &config.ingest) {
                Ok(p) => p,
                Err(e) => fail(EXIT_INPUT, "Input error", e),
            };
            let results = scorer.score_batch(&profiles);
            let evaluation =
                credit_scorer::evaluation::evaluate_results(&results, scorer.bands(), binary);
            if evaluation.samples == 0 {
                eprintln!("No customers with a recorded rating in {}", csv.display());
                std::process::exit(EXIT_INPUT);
            }
            println!("{}", output::format_evaluation(&evaluation));
        }
        Commands::Risk {
            statement,
            price,
            sigma,
            rate,
            horizon,
        } => {
            let stmt = match risk::load_statement(&statement) {
                Ok(s) => s,
                Err(e) => fail(EXIT_INPUT, "Input error", e),
            };
            let market = MarketInputs {
                price,
                sigma,
                rate,
                horizon,
            };
            let report = risk::assess(&stmt, &market);
            println!("{}", output::format_risk_report(&report, use_colors));
        }
        Commands::Init { path } => {
            if let Err(e) = config::init::run_init_wizard(path) {
                fail(EXIT_CONFIG, "Init failed", e);
            }
        }
        Commands::Validate => {
            let config = load_valid_config(config_path, None);
            let preset = config.scoring.preset.unwrap_or_default();
            println!("Config OK (preset: {:?})", preset);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
