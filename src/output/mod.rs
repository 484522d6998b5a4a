//! Helpers for rendering run reports for the terminal or as JSON

use crate::config::RunSettings;
use crate::manifest::format_timestamp;
use crate::run::RunSummary;
use serde_json::{Value, json};

/// Combined structured and human-readable representation of a run summary
#[derive(Debug, Clone)]
pub struct RenderedSummary {
    /// Structured JSON representation suitable for downstream consumers
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Describe the settings a run is about to use.
pub fn render_banner(settings: &RunSettings) -> Vec<String> {
    vec![
        "QR Code Generator".to_string(),
        "=====================================".to_string(),
        "Configuration:".to_string(),
        format!("   - Total codes: {}", settings.total_codes),
        format!(
            "   - Code format: {} ({} characters)",
            settings.format.template(),
            settings.format.length()
        ),
        format!(
            "   - Image size: {}x{} pixels ({})",
            settings.render.size,
            settings.render.size,
            settings.layout.extension()
        ),
        format!(
            "   - Error correction: {} ({}% recovery)",
            settings.render.error_correction,
            settings.render.error_correction.recovery_percent()
        ),
        format!("   - Output folder: {}/", settings.layout.folder().display()),
        format!("   - CSV file: {}", settings.csv_file.display()),
    ]
}

/// Render a finished run into both JSON and human-readable forms.
pub fn render_summary(summary: &RunSummary) -> RenderedSummary {
    let failures: Vec<Value> = summary
        .render
        .failures
        .iter()
        .map(|failure| json!({ "code": failure.code, "message": failure.message }))
        .collect();

    let json = json!({
        "run_id": summary.run_id.to_string(),
        "requested": summary.requested,
        "generated": summary.generated,
        "succeeded": summary.render.succeeded,
        "failed": summary.render.failed(),
        "failures": failures,
        "batches": summary.render.batch_sizes.len(),
        "output_folder": summary.output_folder.display().to_string(),
        "csv_file": summary.csv_file.display().to_string(),
        "generated_at": format_timestamp(summary.generated_at),
        "bytes_written": summary.bytes_written,
        "elapsed_ms": summary.elapsed.as_millis() as u64,
    });

    let mut human = vec![
        "QR Code Generation Complete!".to_string(),
        "=====================================".to_string(),
        format!("   Generated: {} unique codes", summary.generated),
        format!(
            "   Successfully created: {} QR codes",
            summary.render.succeeded
        ),
    ];
    if summary.render.failed() > 0 {
        human.push(format!("   Failed: {} QR codes", summary.render.failed()));
        for failure in &summary.render.failures {
            human.push(format!("     - {}: {}", failure.code, failure.message));
        }
    }
    human.push(format!(
        "   Location: {}/",
        summary.output_folder.display()
    ));
    human.push(format!("   CSV file: {}", summary.csv_file.display()));
    human.push(format!(
        "   Total size: {}",
        format_bytes(summary.bytes_written)
    ));
    human.push(format!(
        "   Elapsed: {:.1}s",
        summary.elapsed.as_secs_f64()
    ));

    RenderedSummary { json, human }
}

fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let value = bytes as f64;
    if value >= MIB {
        format!("{:.1} MB", value / MIB)
    } else if value >= KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QrmintConfig;
    use crate::error::RenderError;
    use crate::layout::DirectoryState;
    use crate::pipeline::RenderReport;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use std::time::Duration;
    use uuid::Uuid;

    fn summary(failures: Vec<RenderError>) -> RunSummary {
        RunSummary {
            run_id: Uuid::nil(),
            requested: 3,
            generated: 3,
            render: RenderReport {
                succeeded: 3 - failures.len(),
                failures,
                batch_sizes: vec![2, 1],
            },
            output_folder: PathBuf::from("qr_codes"),
            directory: DirectoryState::Created,
            csv_file: PathBuf::from("qr_codes.csv"),
            generated_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            bytes_written: 2048,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_banner_describes_format() {
        let settings = QrmintConfig::default().resolve().unwrap();
        let lines = render_banner(&settings);
        assert!(lines.iter().any(|l| l.contains("QRCXXXXX (8 characters)")));
        assert!(lines.iter().any(|l| l.contains("600x600")));
        assert!(lines.iter().any(|l| l.contains("H (30% recovery)")));
    }

    #[test]
    fn test_summary_json() {
        let rendered = render_summary(&summary(vec![RenderError::new("AB002", "disk full")]));
        assert_eq!(rendered.json["succeeded"], 2);
        assert_eq!(rendered.json["failed"], 1);
        assert_eq!(rendered.json["failures"][0]["code"], "AB002");
        assert_eq!(rendered.json["generated_at"], "2026-01-02T03:04:05.000Z");
        assert_eq!(rendered.json["batches"], 2);
        assert_eq!(rendered.json["elapsed_ms"], 1500);
    }

    #[test]
    fn test_summary_human_lines() {
        let clean = render_summary(&summary(Vec::new()));
        assert!(clean.human.iter().any(|l| l.contains("Successfully created: 3")));
        assert!(!clean.human.iter().any(|l| l.contains("Failed")));
        assert!(clean.human.iter().any(|l| l.contains("Total size: 2.0 KB")));

        let failed = render_summary(&summary(vec![RenderError::new("AB002", "disk full")]));
        assert!(failed.human.iter().any(|l| l.contains("Failed: 1 QR codes")));
        assert!(failed.human.iter().any(|l| l.contains("AB002: disk full")));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(12), "12 bytes");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
