//! Analyze command implementation

use std::fs;
use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fintrack_core::aggregate::share_percent;
use fintrack_core::{
    format_money, AnalysisReport, ExpenseDataset, ExpenseRecord, InsightSource,
    NarrativeConfig, ReportBuilder,
};

/// Read exported expense records from a JSON array
pub fn load_expenses(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read expenses from {}", path.display()))?;
    let records: Vec<ExpenseRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid expense JSON in {}", path.display()))?;
    Ok(records)
}

/// Keep records in the inclusive window, newest first
pub fn select_window(
    records: Vec<ExpenseRecord>,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<ExpenseRecord> {
    let mut selected: Vec<ExpenseRecord> = records
        .into_iter()
        .filter(|r| r.date >= from && r.date <= to)
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    selected
}

/// Load, filter and analyze an expense file
pub async fn run_analysis(
    config_path: Option<&Path>,
    file: &Path,
    from: NaiveDate,
    to: NaiveDate,
    offline: bool,
) -> Result<AnalysisReport> {
    let records = load_expenses(file)?;
    let dataset = ExpenseDataset::new(from, to, select_window(records, from, to))?;
    tracing::debug!(
        records = dataset.len(),
        from = %from,
        to = %to,
        "Loaded expense dataset"
    );

    let builder = if offline {
        ReportBuilder::offline()
    } else {
        ReportBuilder::from_config(&NarrativeConfig::load(config_path)?)
    };

    let report = builder
        .build_report_with_cancel(&dataset, interrupted(tokio::signal::ctrl_c()))
        .await;
    Ok(report)
}

/// Resolves on Ctrl-C; never resolves if the handler could not be installed
pub(crate) async fn interrupted<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::debug!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}

pub async fn cmd_analyze(
    config_path: Option<&Path>,
    file: &Path,
    from: NaiveDate,
    to: NaiveDate,
    offline: bool,
    json: bool,
) -> Result<()> {
    let report = run_analysis(config_path, file, from, to, offline).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

/// Human-readable report
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str("📊 Expense Analysis\n");
    out.push_str(&format!(
        "   Period: {} to {}\n",
        report.start_date, report.end_date
    ));
    out.push_str("   ─────────────────────────────────────────────\n");

    if report.expense_count == 0 {
        out.push_str("   No expenses found in this period.\n");
    } else {
        out.push_str(&format!(
            "   Total: {}   Transactions: {}   Average: {}\n",
            format_money(report.total_expenses),
            report.expense_count,
            format_money(report.average_expense)
        ));
        out.push_str(&format!("   Top category: {}\n\n", report.top_category));
        out.push_str(&format!(
            "   {:16} │ {:>12} │ {:>7}\n",
            "Category", "Amount", "%"
        ));
        out.push_str("   ─────────────────┼──────────────┼────────\n");
        for (category, amount) in report.category_breakdown.iter() {
            out.push_str(&format!(
                "   {:16} │ {:>12} │ {:>6}%\n",
                category.as_str(),
                format_money(amount),
                share_percent(amount, report.total_expenses)
            ));
        }
    }

    let heading = match report.insight_source {
        InsightSource::Ai => "🤖 AI Insights",
        InsightSource::RuleBased => "🧮 Insights (rule-based)",
    };
    out.push('\n');
    out.push_str(&format!("{}\n", heading));
    out.push_str("   ─────────────────────────────────────────────\n");
    for line in report.ai_insights.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("   {}\n", line));
        }
    }
    out.push('\n');
    out
}
