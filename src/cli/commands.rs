use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};

use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::config::StoreConfig;
use crate::error::{AirQualityError, Result};
use crate::models::{Metric, RegionFilter, Report};
use crate::report::{plain_summary, render_error, render_markdown, render_text, render_trend, respond};
use crate::service::AirQualityService;
use crate::store::{RegionProfile, SqliteStore, SyntheticGenerator, REGION_PROFILES};
use crate::utils::constants::KNOWN_REGIONS;
use crate::utils::filename::generate_default_export_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvWriter, ExportFormat, ParquetWriter};

pub async fn run(cli: Cli) -> Result<()> {
    let config = StoreConfig::load(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Report {
            region,
            days,
            format,
            prompt,
            no_ai,
        } => {
            let filter = RegionFilter::parse(region.as_deref().unwrap_or_default());
            let progress = ProgressReporter::new_spinner("Querying air quality readings...", quiet);

            let report = with_service(&config, move |service| service.run_report(filter, days)).await;
            let report = finish(&progress, report)?;

            println!("{}", present(&report, format, prompt.as_deref(), no_ai)?);
        }

        Commands::Trend {
            region,
            metric,
            days,
            output,
        } => {
            let metric: Metric = metric.parse()?;
            let progress = ProgressReporter::new_spinner("Querying daily averages...", quiet);

            let query_region = region.clone();
            let trend = with_service(&config, move |service| {
                service.trend(&query_region, metric, days)
            })
            .await;
            let trend = finish(&progress, trend)?;

            println!("{}", render_trend(&region, metric, days, &trend));

            if let Some(path) = output {
                create_parent_dir(&path)?;
                CsvWriter::new().write_trend(&trend, &path)?;
                println!("Trend written to {}", path.display());
            }
        }

        Commands::Export {
            region,
            days,
            output,
            compression,
        } => {
            let output = output.unwrap_or_else(generate_default_export_filename);
            let format = ExportFormat::from_path(&output);
            // Fail on a bad compression name before touching the store
            let parquet = ParquetWriter::new().with_compression(&compression)?;

            let filter = RegionFilter::parse(region.as_deref().unwrap_or_default());
            let progress = ProgressReporter::new_spinner("Querying air quality readings...", quiet);
            let report = with_service(&config, move |service| service.run_report(filter, days)).await;
            let report = finish(&progress, report)?;

            if report.is_empty {
                println!("No rows to export for {} (last {} days)", report.region_filter, days);
                return Ok(());
            }

            create_parent_dir(&output)?;
            match format {
                ExportFormat::Parquet => {
                    parquet.write_rows(&report.rows, &output)?;
                    println!("\n{}", parquet.get_file_info(&output)?.summary());
                }
                ExportFormat::Csv => CsvWriter::new().write_rows(&report.rows, &output)?,
            }
            info!("Exported {} regions to {}", report.rows.len(), output.display());
            println!("Chart data written to {}", output.display());
        }

        Commands::Regions => {
            let regions = match with_service(&config, |service| service.regions()).await {
                Ok(regions) => regions,
                Err(e) => {
                    warn!("Falling back to known regions: {}", e);
                    eprintln!("⚠️  Store unavailable, showing known regions");
                    KNOWN_REGIONS.iter().map(|r| r.to_string()).collect()
                }
            };

            for region in regions {
                println!("{}", region);
            }
        }

        Commands::Check => {
            let progress = ProgressReporter::new_spinner("Connecting...", quiet);
            let described = with_service(&config, |service| {
                service.check_connection()?;
                Ok(service.store().describe())
            })
            .await;
            let described = finish(&progress, described)?;

            println!("✅ Connected to {}", described);
        }

        Commands::Seed {
            database,
            days,
            per_day,
            seed,
            region,
        } => {
            let store = match database {
                Some(path) => SqliteStore::open_at(path, config.table.clone()),
                None => SqliteStore::new(&config)?,
            };
            let profiles = select_profiles(&region)?;

            let progress = ProgressReporter::new_spinner("Writing synthetic readings...", quiet);
            let written = tokio::task::spawn_blocking(move || -> Result<(usize, SqliteStore)> {
                let readings = SyntheticGenerator::new(seed)
                    .with_readings_per_day(per_day)
                    .generate(&profiles, days, Utc::now());
                store.initialize()?;
                let written = store.insert_readings(&readings)?;
                Ok((written, store))
            })
            .await?;
            let (written, store) = finish(&progress, written)?;

            println!(
                "Wrote {} readings to {} (table {})",
                written,
                store.path().display(),
                store.table()
            );
        }
    }

    Ok(())
}

/// Build the store-backed service and run `task` on a blocking thread.
async fn with_service<T, F>(config: &StoreConfig, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&AirQualityService) -> Result<T> + Send + 'static,
{
    let config = config.clone();
    tokio::task::spawn_blocking(move || {
        let service = AirQualityService::from_config(&config)?;
        task(&service)
    })
    .await?
}

/// Stop the spinner; on failure print the matching error panel.
fn finish<T>(progress: &ProgressReporter, result: Result<T>) -> Result<T> {
    progress.clear();
    result.inspect_err(|e| println!("{}", render_error(e)))
}

fn present(report: &Report, format: OutputFormat, prompt: Option<&str>, no_ai: bool) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => return Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => render_text(report),
        OutputFormat::Markdown => render_markdown(report),
    };

    Ok(match prompt {
        Some(prompt) if no_ai => plain_summary(prompt, &rendered),
        Some(prompt) => respond(prompt, report, &rendered),
        None => rendered,
    })
}

fn select_profiles(regions: &[String]) -> Result<Vec<RegionProfile>> {
    if regions.is_empty() {
        return Ok(REGION_PROFILES.to_vec());
    }

    regions
        .iter()
        .map(|region| {
            RegionProfile::find(region).copied().ok_or_else(|| {
                AirQualityError::InvalidFormat(format!("No synthetic profile for region '{}'", region))
            })
        })
        .collect()
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn empty_report() -> Report {
        Report {
            period_days: 7,
            generated_at: Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap(),
            region_filter: RegionFilter::AllRegions,
            rows: vec![],
            is_empty: true,
        }
    }

    #[test]
    fn test_present_json_ignores_prompt() -> Result<()> {
        let out = present(&empty_report(), OutputFormat::Json, Some("is it hot?"), false)?;
        let value: serde_json::Value = serde_json::from_str(&out)?;
        assert_eq!(value["isEmpty"], serde_json::Value::Bool(true));
        assert_eq!(value["periodDays"], serde_json::json!(7));
        Ok(())
    }

    #[test]
    fn test_present_prompt_modes() -> Result<()> {
        let analysed = present(&empty_report(), OutputFormat::Markdown, Some("is it hot?"), false)?;
        assert!(analysed.starts_with("🌡️ **Temperature Analysis**"));

        let plain = present(&empty_report(), OutputFormat::Markdown, Some("is it hot?"), true)?;
        assert!(plain.starts_with("📊 **DATA SUMMARY**"));
        assert!(plain.ends_with("**Your Question:** is it hot?"));
        Ok(())
    }

    #[test]
    fn test_select_profiles() -> Result<()> {
        assert_eq!(select_profiles(&[])?.len(), 8);
        assert_eq!(select_profiles(&["Sinai".to_string()])?[0].region, "Sinai");
        assert!(select_profiles(&["Atlantis".to_string()]).is_err());
        Ok(())
    }
}
