use anyhow::{Context, Result};
use clap::ValueEnum;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, save_config, Config};
use crate::ingest::{DelayMode, IngestOptions, MixSource};
use crate::scoring::{validate_scoring, BandConfig, Preset, ScoringConfig, Weights};

/// Line-oriented prompts over any reader/writer pair.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write prompt")
    }

    /// Prompt user with a message and return their trimmed input.
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush stdout")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            anyhow::bail!("Input ended before the wizard finished");
        }
        Ok(line.trim().to_string())
    }

    /// Prompt user with a message and a default value. Returns default if input is empty.
    fn prompt_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    /// Prompt user with a yes/no question. Returns bool based on input and default.
    fn prompt_yes_no(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let input = self.prompt(&format!("{} [{}]: ", message, hint))?;
        let input = input.to_lowercase();
        if input.is_empty() {
            Ok(default_yes)
        } else {
            Ok(input == "y" || input == "yes")
        }
    }

    /// Prompt until the answer names one of `T`'s variants.
    fn prompt_choice<T: ValueEnum>(&mut self, message: &str, default: &str) -> Result<T> {
        loop {
            let input = self.prompt_with_default(message, default)?;
            match T::from_str(&input, true) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&format!("  Invalid: {}. Try again.", e))?,
            }
        }
    }

    fn prompt_f64(&mut self, message: &str, default: f64) -> Result<f64> {
        loop {
            let input = self.prompt_with_default(message, &default.to_string())?;
            match input.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => return Ok(v),
                _ => self.say("  Invalid: must be a non-negative number. Try again.")?,
            }
        }
    }

    fn prompt_u16(&mut self, message: &str, default: u16) -> Result<u16> {
        loop {
            let input = self.prompt_with_default(message, &default.to_string())?;
            match input.parse::<u16>() {
                Ok(v) => return Ok(v),
                Err(_) => self.say("  Invalid: must be a whole number. Try again.")?,
            }
        }
    }
}

/// Run the interactive init wizard on stdin/stdout.
///
/// If `default_path` is Some, it is offered as the config file path.
/// Otherwise, the default config path is offered.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_wizard(stdin.lock(), stdout.lock(), default_path)
}

/// Wizard body. Returns the written path, or None when the user declined
/// to overwrite an existing file.
pub fn run_wizard<R: BufRead, W: Write>(
    input: R,
    output: W,
    default_path: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    let mut p = Prompter { input, output };

    p.say("")?;
    p.say("Credit Scorer Configuration Wizard")?;
    p.say("==================================")?;
    p.say("")?;

    // 1. Preset
    p.say("A preset is a complete set of rule tables. 'standard' suits raw monthly")?;
    p.say("records; 'aggregated' suits per-customer averages; 'traditional' scores")?;
    p.say("cleaned tables on outstanding debt.")?;
    let preset: Preset =
        p.prompt_choice("Preset (standard/aggregated/traditional)", "standard")?;
    let base = preset.rules();

    // 2. Weights
    p.say("")?;
    let kept = base
        .weights
        .as_array()
        .iter()
        .map(|w| format!("{:.2}", w))
        .collect::<Vec<_>>()
        .join("/");
    let weights = if p.prompt_yes_no(
        &format!("Customize component weights? (n keeps {})", kept),
        false,
    )? {
        loop {
            let weights = Weights {
                payment_history: p.prompt_f64("  Payment history", base.weights.payment_history)?,
                utilization: p.prompt_f64("  Amounts owed", base.weights.utilization)?,
                history_length: p.prompt_f64("  Length of history", base.weights.history_length)?,
                credit_mix: p.prompt_f64("  Credit mix", base.weights.credit_mix)?,
                inquiries: p.prompt_f64("  Inquiries", base.weights.inquiries)?,
            };
            let candidate = ScoringConfig {
                preset: Some(preset),
                weights: Some(weights.clone()),
                ..ScoringConfig::default()
            };
            match validate_scoring(&candidate) {
                Ok(()) => break Some(weights),
                Err(errors) => {
                    for e in errors {
                        p.say(&format!("  Invalid: {}", e))?;
                    }
                    p.say("  Try again.")?;
                }
            }
        }
    } else {
        None
    };

    // 3. Bands
    p.say("")?;
    let bands = if p.prompt_yes_no(
        "Customize band cutoffs? (n keeps Bad < 525 <= Standard < 710 <= Good)",
        false,
    )? {
        loop {
            let bands = BandConfig {
                standard_from: p.prompt_u16("  Lowest Standard score", base.bands.standard_from)?,
                good_from: p.prompt_u16("  Lowest Good score", base.bands.good_from)?,
                bad_up_to: p.prompt_u16("  Highest score still rated bad (good/bad cut)", base.bands.bad_up_to)?,
            };
            let candidate = ScoringConfig {
                preset: Some(preset),
                bands: Some(bands.clone()),
                ..ScoringConfig::default()
            };
            match validate_scoring(&candidate) {
                Ok(()) => break Some(bands),
                Err(errors) => {
                    for e in errors {
                        p.say(&format!("  Invalid: {}", e))?;
                    }
                    p.say("  Try again.")?;
                }
            }
        }
    } else {
        None
    };

    // 4. Ingest options
    p.say("")?;
    p.say("Delays can be scored as one average per customer or as every monthly delay.")?;
    let delays: DelayMode = p.prompt_choice("Delay handling (average/series)", "average")?;
    let mix_source: MixSource =
        p.prompt_choice("Credit mix source (rating/loans)", "rating")?;
    let binary_labels = p.prompt_yes_no("Write good/bad labels in cleaned tables?", false)?;

    // 5. Config path
    let default_config_path = match default_path {
        Some(path) => path,
        None => get_config_path()?,
    };
    p.say("")?;
    let path_str = p.prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = p.prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            p.say("Aborted.")?;
            return Ok(None);
        }
    }

    // 6. Write config
    let config = Config {
        scoring: ScoringConfig {
            preset: Some(preset),
            weights,
            bands,
            ..ScoringConfig::default()
        },
        ingest: IngestOptions {
            delays,
            mix_source,
            amounts_owed: None,
            binary_labels,
        },
    };
    save_config(&config_path, &config)?;

    p.say("")?;
    p.say(&format!("Config written to {}", config_path.display()))?;
    p.say("Every rule table can be overridden in the file; run `credit-scorer validate` after editing.")?;

    Ok(Some(config_path))
}
