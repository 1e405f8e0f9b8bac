use nu_ansi_term::Color::{Blue, Green, Red};
use shelf_core::ShelfResult;
use shelf_operations::{
    sync::sync_metrics, SyncFailure, SyncOutcome, SyncReport, SyncTarget, ShelfContext,
};
use tabled::{
    builder::Builder,
    settings::{peaker::PriorityMax, themes::BorderCorrection, Panel, Style, Width},
};
use tracing::info;

use crate::utils::{
    icon_or, json_output, metric, print_json, short_date, term_width, Colored, Icons,
};

const HEADER: [&str; 7] = [
    "Id",
    "Name",
    "Stars",
    "Popularity",
    "Maintenance",
    "Last Commit",
    "Error",
];

fn report_rows(report: &SyncReport) -> Vec<[String; 7]> {
    report
        .results
        .iter()
        .map(|result| {
            match &result.outcome {
                SyncOutcome::Success { metrics } => {
                    [
                        result.id.to_string(),
                        format!(
                            "{} {}",
                            Colored(Green, icon_or(Icons::CHECK, "+")),
                            Colored(Blue, &result.name)
                        ),
                        metrics.stars.to_string(),
                        metrics.popularity_score.to_string(),
                        metrics.maintenance_score.to_string(),
                        short_date(&metrics.last_commit_date).to_string(),
                        String::new(),
                    ]
                }
                SyncOutcome::Failure { error } => {
                    [
                        result.id.to_string(),
                        format!(
                            "{} {}",
                            Colored(Red, icon_or(Icons::CROSS, "x")),
                            Colored(Blue, &result.name)
                        ),
                        metric::<u64>(None),
                        metric::<u8>(None),
                        metric::<u8>(None),
                        metric::<&str>(None),
                        Colored(Red, error).to_string(),
                    ]
                }
            }
        })
        .collect()
}

fn report_table(report: &SyncReport) -> String {
    let mut builder = Builder::new();
    builder.push_record(HEADER);
    for row in report_rows(report) {
        builder.push_record(row);
    }

    builder
        .build()
        .with(Panel::header(format!("{} Metrics Sync", icon_or(Icons::SYNC, ""))))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .with(Width::wrap(term_width()).priority(PriorityMax::default()))
        .to_string()
}

pub async fn sync_entries(ctx: &ShelfContext, entry: Option<i32>) -> ShelfResult<()> {
    let target = entry.map_or(SyncTarget::All, SyncTarget::Entry);

    let report = match sync_metrics(ctx, target).await {
        Ok(report) => report,
        Err(err) => {
            if json_output() {
                print_json(&SyncFailure::from(&err))?;
            }
            return Err(err);
        }
    };

    if json_output() {
        return print_json(&report.envelope());
    }

    if report.results.is_empty() {
        info!("Nothing to sync. Import or add entries first.");
        return Ok(());
    }

    info!("\n{}", report_table(&report));

    let color = if report.fail_count() == 0 { Green } else { Red };
    info!(
        success_count = report.success_count(),
        fail_count = report.fail_count(),
        "{}",
        Colored(color, report.message())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use shelf_operations::{EntrySyncResult, SyncMetrics};

    use super::*;

    fn report() -> SyncReport {
        SyncReport::default()
            .record(EntrySyncResult {
                id: 1,
                name: "Zustand".into(),
                outcome: SyncOutcome::Success {
                    metrics: SyncMetrics {
                        stars: 50_000,
                        forks: 1_600,
                        watchers: 300,
                        open_issues: 12,
                        last_commit_date: "2025-01-15T08:30:00Z".into(),
                        popularity_score: 88,
                        maintenance_score: 100,
                    },
                },
            })
            .record(EntrySyncResult {
                id: 2,
                name: "Broken".into(),
                outcome: SyncOutcome::Failure {
                    error: "Failed to fetch repository metrics".into(),
                },
            })
    }

    #[test]
    fn test_report_rows_line_up_with_header() {
        let rows = report_rows(&report());

        let error = HEADER.iter().position(|h| *h == "Error").unwrap();
        let stars = HEADER.iter().position(|h| *h == "Stars").unwrap();
        let last_commit = HEADER.iter().position(|h| *h == "Last Commit").unwrap();

        assert_eq!(rows[0][stars], "50000");
        assert_eq!(rows[0][last_commit], "2025-01-15");
        assert_eq!(rows[0][error], "");

        assert!(rows[1][error].contains("Failed to fetch repository metrics"));
        for cell in &rows[1][stars..error] {
            assert!(cell.contains('-'));
            assert!(!cell.contains("Failed"));
        }
    }
}
