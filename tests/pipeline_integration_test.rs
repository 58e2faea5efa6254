mod common;

use anyhow::Result;
use geo_pages::core::report::{PairOutcome, ReportFormat, ReportWriter};
use geo_pages::domain::model::{LocationKind, OverrideDocument};
use geo_pages::{GenerationConfig, GenerationEngine, LocalStorage, PipelineOptions};
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

fn persist_options() -> PipelineOptions {
    PipelineOptions {
        execute: true,
        persist: true,
        pair_interval: Duration::ZERO,
        ..Default::default()
    }
}

async fn read_overrides(store: &std::path::Path) -> Result<Vec<OverrideDocument>> {
    let bytes = tokio::fs::read(store.join("overrides.json")).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// 端到端：mock 生成端點 → 驗證修復 → 寫入 overrides.json → 報告
#[tokio::test]
async fn test_generation_run_persists_repaired_overrides() -> Result<()> {
    let store_dir = TempDir::new()?;
    let report_dir = TempDir::new()?;
    common::write_content(store_dir.path()).await?;

    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/generate")
                .json_body_partial(r#"{"model": "gen-model-1", "maxOutputTokens": 8192}"#);
            then.status(200)
                .json_body(serde_json::json!({"text": common::model_output("tu ciudad")}));
        })
        .await;

    let config = GenerationConfig::from_toml_str(&common::config_toml(
        &server.url("/generate"),
        store_dir.path(),
        report_dir.path(),
        3,
    ))?;
    config.validate_config()?;

    let engine = GenerationEngine::from_config(&config)?;
    let writer = ReportWriter::new(LocalStorage::new(report_dir.path()), config.report_formats()?);
    let (report, files) = engine.run_and_report(&persist_options(), &writer).await?;

    assert_eq!(generate.hits_async().await, 3);
    assert_eq!(report.count(PairOutcome::Created), 3);
    assert_eq!(files.len(), 2);

    let overrides = read_overrides(store_dir.path()).await?;
    assert_eq!(overrides.len(), 3);
    for doc in &overrides {
        assert_eq!(doc.id, format!("override.svc-web.{}", doc.location_ref));
        // 多出的 feature 被截斷，數值還原
        assert_eq!(doc.content.features.as_ref().unwrap().len(), 2);
        let stats = doc.content.impact_section.as_ref().unwrap().stats.as_ref().unwrap();
        assert_eq!(stats[0].value, "+150");
        assert_eq!(stats[1].value, "98%");
        let hero = doc.content.hero.as_ref().unwrap();
        assert_eq!(hero.primary_button.as_ref().unwrap().href, "/contacto");
    }

    let csv = tokio::fs::read_to_string(report_dir.path().join("generation_report.csv")).await?;
    assert!(csv.contains("diseno-web,santander,created,1,"));
    Ok(())
}

/// 第二次執行不會再呼叫生成端點
#[tokio::test]
async fn test_rerun_is_idempotent() -> Result<()> {
    let store_dir = TempDir::new()?;
    let report_dir = TempDir::new()?;
    common::write_content(store_dir.path()).await?;

    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST).path("/generate");
            then.status(200)
                .json_body(serde_json::json!({"text": common::model_output("aquí")}));
        })
        .await;

    let config = GenerationConfig::from_toml_str(&common::config_toml(
        &server.url("/generate"),
        store_dir.path(),
        report_dir.path(),
        3,
    ))?;
    let engine = GenerationEngine::from_config(&config)?;

    engine.run(&persist_options()).await?;
    let hits_after_first = generate.hits_async().await;
    let second = engine.run(&persist_options()).await?;

    assert_eq!(hits_after_first, 3);
    assert_eq!(generate.hits_async().await, hits_after_first);
    assert_eq!(second.count(PairOutcome::Skipped), 3);
    assert_eq!(read_overrides(store_dir.path()).await?.len(), 3);
    Ok(())
}

/// 端點持續失敗：每組用完重試後標記失敗，整體不中止
#[tokio::test]
async fn test_provider_failures_are_isolated_per_pair() -> Result<()> {
    let store_dir = TempDir::new()?;
    let report_dir = TempDir::new()?;
    common::write_content(store_dir.path()).await?;

    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST).path("/generate");
            then.status(500).body("upstream exploded");
        })
        .await;

    let config = GenerationConfig::from_toml_str(&common::config_toml(
        &server.url("/generate"),
        store_dir.path(),
        report_dir.path(),
        2,
    ))?;
    let engine = GenerationEngine::from_config(&config)?;
    let writer = ReportWriter::new(LocalStorage::new(report_dir.path()), vec![ReportFormat::Json]);

    let (report, _) = engine.run_and_report(&persist_options(), &writer).await?;

    assert_eq!(generate.hits_async().await, 6);
    assert_eq!(report.count(PairOutcome::Failed), 3);
    assert!(report
        .failed()
        .all(|entry| entry.attempts == 2 && entry.error.as_deref().unwrap().contains("500")));
    assert!(!store_dir.path().join("overrides.json").exists());

    let json: serde_json::Value = serde_json::from_slice(
        &tokio::fs::read(report_dir.path().join("generation_report.json")).await?,
    )?;
    assert_eq!(json["entries"].as_array().unwrap().len(), 3);
    Ok(())
}

/// dry-run 與 location type 篩選
#[tokio::test]
async fn test_dry_run_with_location_filter() -> Result<()> {
    let store_dir = TempDir::new()?;
    let report_dir = TempDir::new()?;
    common::write_content(store_dir.path()).await?;

    let server = MockServer::start_async().await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST).path("/generate");
            then.status(200)
                .json_body(serde_json::json!({"text": common::model_output("aquí")}));
        })
        .await;

    let config = GenerationConfig::from_toml_str(&common::config_toml(
        &server.url("/generate"),
        store_dir.path(),
        report_dir.path(),
        3,
    ))?;
    let engine = GenerationEngine::from_config(&config)?;
    let options = PipelineOptions {
        execute: false,
        location_type: Some(LocationKind::City),
        ..persist_options()
    };

    let report = engine.run(&options).await?;

    assert_eq!(generate.hits_async().await, 0);
    assert_eq!(report.count(PairOutcome::Planned), 2);
    assert!(report.entries.iter().all(|e| e.location_slug != "torrelavega"));
    Ok(())
}

/// 只寫報告不寫內容庫
#[tokio::test]
async fn test_report_only_mode_embeds_content() -> Result<()> {
    let store_dir = TempDir::new()?;
    let report_dir = TempDir::new()?;
    common::write_content(store_dir.path()).await?;

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/generate");
            then.status(200)
                .json_body(serde_json::json!({"text": common::model_output("Sevilla")}));
        })
        .await;

    let config = GenerationConfig::from_toml_str(&common::config_toml(
        &server.url("/generate"),
        store_dir.path(),
        report_dir.path(),
        3,
    ))?;
    let engine = GenerationEngine::from_config(&config)?;
    let writer = ReportWriter::new(LocalStorage::new(report_dir.path()), vec![ReportFormat::Json]);
    let options = PipelineOptions {
        persist: false,
        service_slug: Some("diseno-web".to_string()),
        ..persist_options()
    };

    let (report, _) = engine.run_and_report(&options, &writer).await?;

    assert_eq!(report.count(PairOutcome::Generated), 3);
    assert!(!store_dir.path().join("overrides.json").exists());
    let json: serde_json::Value = serde_json::from_slice(
        &tokio::fs::read(report_dir.path().join("generation_report.json")).await?,
    )?;
    assert_eq!(
        json["entries"][0]["content"]["customHero"]["title"],
        "Diseño web en Sevilla"
    );
    Ok(())
}
