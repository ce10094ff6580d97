//! Report writers: CSV exports, JSON confidence report, Markdown summary

use anyhow::{Context, Result};
use regen_monetary::{AuditReport, BasefeeRecord, EpochRecord, SensitivitySurface, SweepRow};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// One epoch row with the derived supply ratio
#[derive(Serialize)]
struct EpochRow<'a> {
    epoch: u64,
    fees: f64,
    eco_index: f64,
    eco_source: &'a regen_monetary::EcoSource,
    alpha: f64,
    beta: f64,
    supply: f64,
    burn: f64,
    mint: f64,
    validator_fund: f64,
    inflation_rate: f64,
    supply_ratio: f64,
}

pub fn write_epochs_csv(path: &Path, records: &[EpochRecord], supply_cap: f64) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for r in records {
        writer.serialize(EpochRow {
            epoch: r.epoch,
            fees: r.fees,
            eco_index: r.eco_index,
            eco_source: &r.eco_source,
            alpha: r.alpha,
            beta: r.beta,
            supply: r.supply,
            burn: r.burn,
            mint: r.mint,
            validator_fund: r.fund,
            inflation_rate: r.inflation_rate,
            supply_ratio: r.supply_ratio(supply_cap),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_basefee_csv(path: &Path, records: &[BasefeeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for r in records {
        writer.serialize(r)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_sweep_csv(path: &Path, rows: &[SweepRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    if let Some(first) = rows.first() {
        let mut header = vec!["alpha".to_string(), "beta".to_string(), "confidence".to_string()];
        header.extend(first.metrics.to_named_values().iter().map(|(n, _)| n.to_string()));
        writer.write_record(&header)?;
    }

    for row in rows {
        let mut fields = vec![
            row.alpha.to_string(),
            row.beta.to_string(),
            row.confidence.to_string(),
        ];
        fields.extend(row.metrics.to_named_values().iter().map(|(_, v)| v.to_string()));
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_sensitivity_csv(path: &Path, surface: &SensitivitySurface) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["eco_index", "throughput", "net_mint_m"])?;
    for (eco, fees, value) in surface.cells() {
        writer.write_record([eco.to_string(), fees.to_string(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Single-row metrics export of the primary policy
pub fn write_metrics_csv(path: &Path, report: &AuditReport, timestamp: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let named = report.primary.metrics.to_named_values();
    let mut header = vec!["timestamp_utc", "epochs", "confidence_score"];
    header.extend(named.iter().map(|(n, _)| *n));
    header.push("note");
    writer.write_record(&header)?;

    let mut fields = vec![
        timestamp.to_string(),
        report.epochs.to_string(),
        report.confidence().to_string(),
    ];
    fields.extend(named.iter().map(|(_, v)| v.to_string()));
    fields.push(report.note.clone());
    writer.write_record(&fields)?;
    writer.flush()?;
    Ok(())
}

pub fn confidence_json(report: &AuditReport, timestamp: &str) -> serde_json::Value {
    json!({
        "timestamp_utc": timestamp,
        "epochs": report.epochs,
        "seed": report.seed,
        "confidence_score": report.confidence(),
        "breakdown": report.primary.breakdown,
        "control": report.primary.metrics.control,
        "metrics": report.primary.metrics.run,
        "pid": {
            "confidence_score": report.pid.confidence,
            "metrics": report.pid.metrics,
        },
        "basefee_final_supply": report.baseline_final_supply(),
        "note": report.note,
    })
}

pub fn render_summary(report: &AuditReport) -> String {
    let m = &report.primary.metrics.run;
    let mut lines = vec![
        "# Regen Monetary Policy Validation Summary".to_string(),
        String::new(),
        format!("**Confidence score (offline audit):** `{:.3}`", report.confidence()),
        String::new(),
        "## Key results".to_string(),
        String::new(),
        format!("- Epochs: `{}` (seed `{}`)", report.epochs, report.seed),
        format!("- Inflation mean: `{:.6}`", m.infl_mean),
        format!("- Inflation std: `{:.6}`", m.infl_std),
        format!("- Validator fund drift (pct): `{:.3}`", m.fund_drift_pct),
        format!("- EcoIndex ↔ inflation correlation: `{:.3}`", m.eco_infl_corr),
        format!(
            "- Eco coupling slope: `{:.4}` (expected `{:.4}`)",
            m.eco_coupling_slope, m.eco_coupling_expected
        ),
        format!("- Burn/Mint ratio (sum): `{:.3}`", m.burn_to_mint_ratio),
        format!("- Alpha range: `{:.3}` to `{:.3}`", m.alpha_min, m.alpha_max),
        format!("- Beta range: `{:.3}` to `{:.3}`", m.beta_min, m.beta_max),
        String::new(),
        "## Policy comparison".to_string(),
        String::new(),
        "| Policy | Confidence | Inflation mean | Final supply |".to_string(),
        "|---|---|---|---|".to_string(),
    ];

    let final_supply = |v: Option<f64>| v.map(|s| format!("{s:.0}")).unwrap_or_else(|| "-".into());
    lines.push(format!(
        "| Threshold | {:.3} | {:.6} | {} |",
        report.primary.confidence,
        m.infl_mean,
        final_supply(report.threshold_run.final_supply())
    ));
    lines.push(format!(
        "| PID | {:.3} | {:.6} | {} |",
        report.pid.confidence,
        report.pid.metrics.run.infl_mean,
        final_supply(report.pid_run.final_supply())
    ));
    lines.push(format!(
        "| Basefee baseline | - | - | {} |",
        final_supply(report.baseline_final_supply())
    ));

    if let Some(best) = report
        .sweep
        .iter()
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    {
        lines.push(String::new());
        lines.push("## Parameter sweep".to_string());
        lines.push(String::new());
        lines.push(format!(
            "Best initial gains over {} points: alpha `{:.2}`, beta `{:.2}` (confidence `{:.3}`).",
            report.sweep.len(),
            best.alpha,
            best.beta,
            best.confidence
        ));
    }

    lines.push(String::new());
    lines.push("## Interpretation".to_string());
    lines.push(report.note.clone());
    lines.join("\n")
}

/// Write every audit artifact into `dir`; returns the written paths.
pub fn write_audit_bundle(
    dir: &Path,
    report: &AuditReport,
    supply_cap: f64,
    timestamp: &str,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = |name: &str| dir.join(name);
    let written = vec![
        path("validation_metrics.csv"),
        path("confidence_report.json"),
        path("parameter_sweep.csv"),
        path("sensitivity_surface.csv"),
        path("epochs_threshold.csv"),
        path("epochs_pid.csv"),
        path("epochs_basefee.csv"),
        path("validation_summary.md"),
    ];

    write_metrics_csv(&written[0], report, timestamp)?;
    let json = serde_json::to_string_pretty(&confidence_json(report, timestamp))?;
    fs::write(&written[1], json)
        .with_context(|| format!("Failed to write {}", written[1].display()))?;
    write_sweep_csv(&written[2], &report.sweep)?;
    write_sensitivity_csv(&written[3], &report.sensitivity)?;
    write_epochs_csv(&written[4], &report.threshold_run.records, supply_cap)?;
    write_epochs_csv(&written[5], &report.pid_run.records, supply_cap)?;
    write_basefee_csv(&written[6], &report.baseline)?;
    fs::write(&written[7], render_summary(report))
        .with_context(|| format!("Failed to write {}", written[7].display()))?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regen_monetary::{run_audit, run_simulation, ControllerKind, SimulationConfig};

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig {
            epochs: 30,
            ..SimulationConfig::default()
        };
        config.sweep.alpha_steps = 2;
        config.sweep.beta_steps = 2;
        config.sensitivity.eco_steps = 2;
        config.sensitivity.throughput_steps = 3;
        config
    }

    #[test]
    fn test_epochs_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config();
        let run = run_simulation(&config, ControllerKind::Threshold).unwrap();
        let path = dir.path().join("epochs.csv");
        write_epochs_csv(&path, &run.records, config.supply.supply_cap).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "epoch");
        assert_eq!(&headers[3], "eco_source");
        assert_eq!(&headers[11], "supply_ratio");
        let rows: Vec<_> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 30);
        assert_eq!(&rows[0][3], "synthetic");
    }

    #[test]
    fn test_audit_bundle_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config();
        let report = run_audit(&config).unwrap();
        let paths = write_audit_bundle(
            dir.path(),
            &report,
            config.supply.supply_cap,
            "2024-01-01T00:00:00Z",
        )
        .unwrap();
        for p in &paths {
            assert!(p.exists(), "missing {}", p.display());
        }

        let content = fs::read_to_string(dir.path().join("confidence_report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["epochs"], 30);
        assert_eq!(json["timestamp_utc"], "2024-01-01T00:00:00Z");
        assert!(json["confidence_score"].as_f64().unwrap() <= 0.999);

        let mut sweep = csv::Reader::from_path(dir.path().join("parameter_sweep.csv")).unwrap();
        assert_eq!(sweep.records().count(), 4);

        let surface_path = dir.path().join("sensitivity_surface.csv");
        let mut surface = csv::Reader::from_path(surface_path).unwrap();
        assert_eq!(surface.records().count(), 6);
    }

    #[test]
    fn test_summary_mentions_policies() {
        let report = run_audit(&small_config()).unwrap();
        let summary = render_summary(&report);
        assert!(summary.starts_with("# Regen Monetary Policy Validation Summary"));
        assert!(summary.contains("| Threshold |"));
        assert!(summary.contains("| PID |"));
        assert!(summary.contains("Best initial gains over 4 points"));
    }
}
