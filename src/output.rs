//! Markdown rendering of a [`MonthlyAudit`] and the single report write.
//!
//! Rendering is a pure function of the audit value. Section headers and
//! column order are load-bearing: downstream diff tooling keys on them, so
//! they stay byte-stable across runs. Every section renders something even
//! with no data behind it.

use crate::error::Result;
use crate::types::{JournalRow, MonthlyAudit, TopicRow};
use crate::util::mean_or_none;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Table};

/// Rows shown in the journal and topic tables.
const TABLE_CAP: usize = 30;
/// Topic columns in the trend tables.
const TREND_TOPIC_CAP: usize = 6;

/// Table cell for an optional score: fixed two decimals, or the `N/A` token.
fn fmt_score(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{:.2}", x),
        None => "N/A".to_string(),
    }
}

/// Trend cell: absent means blank, not `N/A`, so sparse weeks stay readable.
fn fmt_trend_cell(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{:.2}", x),
        None => String::new(),
    }
}

pub fn render_report(audit: &MonthlyAudit, month: &str) -> String {
    let mut doc = String::new();
    let g = &audit.global;

    doc.push_str(&format!("# Monthly Audit Report ({month})\n\n"));
    doc.push_str(&format!("- Data files: {} weekly snapshots\n", g.file_count));
    doc.push_str(&format!("- Articles scored (rows): {}\n", g.record_count));
    doc.push_str(&format!(
        "- Global mean Research Score: {}\n",
        fmt_score(g.mean_research.map(crate::util::round2))
    ));
    doc.push_str(&format!(
        "- Global mean Impact Score: {}\n",
        fmt_score(g.mean_impact.map(crate::util::round2))
    ));

    doc.push_str("\n## Journal Summary (by volume)\n\n");
    doc.push_str(&journal_table(audit));

    doc.push_str("\n## Topic Summary (by volume)\n\n");
    doc.push_str(&topic_table(audit));

    doc.push_str("\n## Topic Trend (last 26 weeks, weekly means)\n\n");
    doc.push_str(&trend_section(audit));

    doc
}

fn journal_table(audit: &MonthlyAudit) -> String {
    if audit.journals.is_empty() {
        return "_No journal data available._\n".to_string();
    }
    let rows: Vec<JournalRow> = audit
        .journals
        .iter()
        .take(TABLE_CAP)
        .map(|j| JournalRow {
            n: j.count,
            journal: j.journal.clone(),
            mean_research: fmt_score(j.mean_research),
            research_delta: fmt_score(j.research_delta),
            mean_impact: fmt_score(j.mean_impact),
            impact_delta: fmt_score(j.impact_delta),
        })
        .collect();
    let table = Table::new(rows).with(Style::markdown()).to_string();
    format!("{table}\n")
}

fn topic_table(audit: &MonthlyAudit) -> String {
    if audit.topics.is_empty() {
        return "_No topic data available._\n".to_string();
    }
    let rows: Vec<TopicRow> = audit
        .topics
        .iter()
        .take(TABLE_CAP)
        .map(|t| TopicRow {
            n: t.count,
            tag: t.tag.clone(),
            mean_research: fmt_score(t.mean_research),
            mean_impact: fmt_score(t.mean_impact),
        })
        .collect();
    let table = Table::new(rows).with(Style::markdown()).to_string();
    format!("{table}\n")
}

fn trend_section(audit: &MonthlyAudit) -> String {
    let weeks = &audit.trend_weeks;
    let mut out = String::new();
    out.push_str(&format!(
        "Weeks covered: {}\n\n",
        if weeks.is_empty() {
            "N/A".to_string()
        } else {
            weeks.join(", ")
        }
    ));

    let top_topics: Vec<&str> = audit
        .topics
        .iter()
        .take(TREND_TOPIC_CAP)
        .map(|t| t.tag.as_str())
        .collect();
    if top_topics.is_empty() || weeks.is_empty() {
        out.push_str("_Not enough data to compute trends._\n");
        return out;
    }

    out.push_str("### Research Score trend\n\n");
    out.push_str(&trend_table(audit, &top_topics, |b| b.research.as_slice()));
    out.push_str("\n### Impact Score trend\n\n");
    out.push_str(&trend_table(audit, &top_topics, |b| b.impact.as_slice()));
    out
}

fn trend_table<'a, F>(audit: &'a MonthlyAudit, topics: &[&str], pick: F) -> String
where
    F: Fn(&'a crate::types::ScoreBucket) -> &'a [Option<f64>],
{
    let mut builder = Builder::default();
    let mut header = vec!["Week".to_string()];
    header.extend(topics.iter().map(|t| t.to_string()));
    builder.push_record(header);

    for week in &audit.trend_weeks {
        let mut row = vec![week.clone()];
        for topic in topics {
            let cell = audit
                .buckets
                .get(&(week.clone(), topic.to_string()))
                .and_then(|bucket| mean_or_none(pick(bucket)));
            row.push(fmt_trend_cell(cell));
        }
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::markdown());
    format!("{table}\n")
}

/// Write the finished document as `audit_<YYYY-MM>.md`, creating the reports
/// directory on first use.
pub fn write_report(report_dir: &Path, month: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(report_dir)?;
    let path = report_dir.join(format!("audit_{month}.md"));
    fs::write(&path, content)?;
    Ok(path)
}
