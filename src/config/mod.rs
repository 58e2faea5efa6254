pub mod toml_config;

pub use toml_config::GenerationConfig;

#[cfg(feature = "cli")]
use crate::core::pipeline::PipelineOptions;
#[cfg(feature = "cli")]
use crate::domain::model::LocationKind;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// 批次生成的命令列旗標。不加 `--execute` 時只做 dry-run
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "geo-pages")]
#[command(about = "Generate location-specific overrides for service pages")]
pub struct CliConfig {
    #[arg(long, short = 'c', default_value = "geo-pages.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Call the text generator (dry-run otherwise)")]
    pub execute: bool,

    #[arg(long, help = "Write overrides to the content store (report-only otherwise)")]
    pub persist: bool,

    #[arg(long, value_enum, help = "Only process locations of this type")]
    pub location_type: Option<LocationKind>,

    #[arg(long, help = "Regenerate pairs that already have an override")]
    pub force_update: bool,

    #[arg(long, help = "Only process the service with this slug")]
    pub service: Option<String>,

    #[arg(long, short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU / memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn pipeline_options(&self, config: &GenerationConfig) -> PipelineOptions {
        PipelineOptions {
            execute: self.execute,
            persist: self.persist,
            location_type: self.location_type,
            force_update: self.force_update,
            service_slug: self.service.clone(),
            pair_interval: config.pair_interval(),
        }
    }

    pub fn monitoring_enabled(&self, config: &GenerationConfig) -> bool {
        self.monitor || config.monitoring_enabled()
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_dry_run() {
        let cli = CliConfig::parse_from(["geo-pages"]);
        assert!(!cli.execute);
        assert!(!cli.persist);
        assert_eq!(cli.config, PathBuf::from("geo-pages.toml"));
    }

    #[test]
    fn test_flags_map_to_pipeline_options() {
        let cli = CliConfig::parse_from([
            "geo-pages",
            "--execute",
            "--persist",
            "--location-type",
            "town",
            "--force-update",
            "--service",
            "diseno-web",
        ]);
        let config = GenerationConfig::from_toml_str(
            r#"
[job]
name = "t"
[store]
path = "./content"
[generator]
endpoint = "http://localhost:9000"
model = "m"
[schedule]
pair_interval_seconds = 3
[report]
output_path = "./reports"
"#,
        )
        .unwrap();

        let options = cli.pipeline_options(&config);
        assert!(options.execute && options.persist && options.force_update);
        assert_eq!(options.location_type, Some(LocationKind::Town));
        assert_eq!(options.service_slug.as_deref(), Some("diseno-web"));
        assert_eq!(options.pair_interval, std::time::Duration::from_secs(3));
    }
}
