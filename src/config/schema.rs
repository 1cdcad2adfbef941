use serde::{Deserialize, Serialize};

use crate::ingest::IngestOptions;
use crate::scoring::ScoringConfig;

/// Contents of `config.yaml`.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   preset: standard
///   bands:
///     standard_from: 525
///     good_from: 710
///     bad_up_to: 590
/// ingest:
///   delays: average
///   mix_source: rating
///   amounts_owed: ratio
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub ingest: IngestOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::DelayMode;
    use crate::scoring::Preset;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_sections_parse() {
        let yaml = r#"
scoring:
  preset: aggregated
  bands:
    standard_from: 500
    good_from: 700
    bad_up_to: 600
ingest:
  delays: series
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.scoring.preset, Some(Preset::Aggregated));
        assert_eq!(config.scoring.rules().bands.bad_up_to, 600);
        assert_eq!(config.ingest.delays, DelayMode::Series);
        assert!(!config.ingest.binary_labels);
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        assert!(serde_saphyr::from_str::<Config>("queries: []\n").is_err());
    }

    #[test]
    fn test_serialized_config_omits_unset_sections() {
        let config = Config {
            scoring: ScoringConfig {
                preset: Some(Preset::Standard),
                ..ScoringConfig::default()
            },
            ..Config::default()
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        assert!(yaml.contains("preset: standard"));
        assert!(!yaml.contains("weights"));
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
