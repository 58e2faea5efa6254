use clap::Parser;
use geo_pages::core::report::ReportWriter;
use geo_pages::utils::error::ErrorSeverity;
use geo_pages::utils::monitor::RunMonitor;
use geo_pages::utils::{logger, validation::Validate};
use geo_pages::{CliConfig, GenerationConfig, GenerationEngine, LocalStorage, PagesError};

/// 依錯誤嚴重程度決定退出碼
fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 可重跑
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

fn report_failure(stage: &str, e: &PagesError) -> i32 {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    exit_code(e.severity())
}

fn display_config_summary(config: &GenerationConfig, cli: &CliConfig) {
    println!("📋 Configuration Summary:");
    println!("  Job: {}", config.job.name);
    println!("  Store: {}", config.store_path());
    println!(
        "  Generator: {} ({})",
        config.generator.endpoint, config.generator.model
    );
    println!("  Report: {} [{}]", config.output_path(), config.report.formats.join(", "));
    println!(
        "  Rate limit: {}–{} ms, retry x{}, pair interval {}s",
        config.rate_limit.min_delay_ms,
        config.rate_limit.max_delay_ms,
        config.retry.max_attempts,
        config.schedule.pair_interval_seconds
    );
    if let Some(kind) = cli.location_type {
        println!("  Location type: {}", kind);
    }
    if let Some(service) = &cli.service {
        println!("  Service: {}", service);
    }
    if !cli.execute {
        println!("  🔍 DRY RUN MODE (pass --execute to call the generator)");
    } else if !cli.persist {
        println!("  📄 REPORT-ONLY MODE (pass --persist to write overrides)");
    }
    if cli.force_update {
        println!("  ♻️ Force update: existing overrides will be regenerated");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting geo-pages generation");
    tracing::info!("📁 Loading configuration from: {}", cli.config.display());

    let config = match GenerationConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config.display(), e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        std::process::exit(report_failure("Configuration validation", &e));
    }
    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &cli);

    let monitor_enabled = cli.monitoring_enabled(&config);
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let formats = config.report_formats()?;
    let engine = match GenerationEngine::from_config(&config) {
        Ok(engine) => engine.with_monitor(RunMonitor::new(monitor_enabled)),
        Err(e) => std::process::exit(report_failure("Engine setup", &e)),
    };
    let writer = ReportWriter::new(LocalStorage::new(config.output_path()), formats);

    match engine
        .run_and_report(&cli.pipeline_options(&config), &writer)
        .await
    {
        Ok((report, files)) => {
            println!("✅ {}", report.summary());
            for file in &files {
                println!("📁 Report saved to: {}/{}", config.output_path(), file);
            }
            if report.has_failures() {
                for entry in report.failed() {
                    eprintln!(
                        "⚠️ {} / {}: {}",
                        entry.service_slug,
                        entry.location_slug,
                        entry.error.as_deref().unwrap_or("unknown error")
                    );
                }
                eprintln!("💡 Rerun the job to retry failed pairs; completed pairs are skipped");
                std::process::exit(exit_code(ErrorSeverity::Medium));
            }
        }
        Err(e) => {
            let code = report_failure("Generation run", &e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
