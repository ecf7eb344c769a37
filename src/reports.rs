//! The aggregation engine: grouped statistics over one run's records.
//!
//! Three groupings run over the same normalized records: by journal, by
//! topic tag, and by (ISO week, topic tag). All of them share the global
//! means computed once at the top so no delta can drift within a run.

use crate::loader::LoadResult;
use crate::types::{
    ArticleRecord, GlobalStats, JournalAggregate, MonthlyAudit, ScoreBucket, TopicAggregate,
};
use crate::util::{mean_opt, mean_or_none, round2, trend_weeks, week_label};
use std::collections::HashMap;

pub fn build_audit(load: &LoadResult) -> MonthlyAudit {
    let records = &load.records;

    let research: Vec<Option<f64>> = records.iter().map(|r| r.research_score).collect();
    let impact: Vec<Option<f64>> = records.iter().map(|r| r.impact_score).collect();
    let global = GlobalStats {
        file_count: load.file_count,
        record_count: records.len(),
        mean_research: mean_opt(&research),
        mean_impact: mean_opt(&impact),
    };

    MonthlyAudit {
        journals: journal_aggregates(records, &global),
        topics: topic_aggregates(records),
        buckets: week_topic_buckets(records),
        trend_weeks: trend_weeks(&load.snapshot_dates),
        global,
    }
}

/// Signed difference of a rounded group mean against the unrounded global
/// mean, rounded for display. Absent when either side is absent.
fn delta(group: Option<f64>, global: Option<f64>) -> Option<f64> {
    match (group, global) {
        (Some(g), Some(whole)) => Some(round2(g - whole)),
        _ => None,
    }
}

fn group_means(rows: &[&ArticleRecord]) -> (Option<f64>, Option<f64>) {
    let research: Vec<Option<f64>> = rows.iter().map(|r| r.research_score).collect();
    let impact: Vec<Option<f64>> = rows.iter().map(|r| r.impact_score).collect();
    (mean_or_none(&research), mean_or_none(&impact))
}

/// Group by journal name; records with an empty journal are left out of this
/// table only (they still count globally).
fn journal_aggregates(records: &[ArticleRecord], global: &GlobalStats) -> Vec<JournalAggregate> {
    let mut by_journal: HashMap<&str, Vec<&ArticleRecord>> = HashMap::new();
    for r in records {
        if !r.journal.is_empty() {
            by_journal.entry(r.journal.as_str()).or_default().push(r);
        }
    }

    let mut rows: Vec<JournalAggregate> = by_journal
        .into_iter()
        .map(|(journal, members)| {
            let (rs, im) = group_means(&members);
            JournalAggregate {
                journal: journal.to_string(),
                count: members.len(),
                mean_research: rs,
                research_delta: delta(rs, global.mean_research),
                mean_impact: im,
                impact_delta: delta(im, global.mean_impact),
            }
        })
        .collect();
    // Count descending, name ascending as the tie-break.
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.journal.cmp(&b.journal)));
    rows
}

/// Group by topic tag. Multi-membership: a record contributes to every tag
/// it carries, so tag counts can sum past the record count.
fn topic_aggregates(records: &[ArticleRecord]) -> Vec<TopicAggregate> {
    let mut by_topic: HashMap<&str, Vec<&ArticleRecord>> = HashMap::new();
    for r in records {
        for tag in &r.topic_tags {
            by_topic.entry(tag.as_str()).or_default().push(r);
        }
    }

    let mut rows: Vec<TopicAggregate> = by_topic
        .into_iter()
        .map(|(tag, members)| {
            let (rs, im) = group_means(&members);
            TopicAggregate {
                tag: tag.to_string(),
                count: members.len(),
                mean_research: rs,
                mean_impact: im,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    rows
}

/// Accumulate both scores of every (record, tag) pair under the record's
/// week label. Records from unlabeled files land under "unknown", which the
/// trend section never selects.
fn week_topic_buckets(records: &[ArticleRecord]) -> HashMap<(String, String), ScoreBucket> {
    let mut buckets: HashMap<(String, String), ScoreBucket> = HashMap::new();
    for r in records {
        let week = week_label(r.run_date);
        for tag in &r.topic_tags {
            let bucket = buckets.entry((week.clone(), tag.clone())).or_default();
            bucket.research.push(r.research_score);
            bucket.impact.push(r.impact_score);
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(journal: &str, research: Option<f64>, impact: Option<f64>) -> ArticleRecord {
        ArticleRecord {
            run_date: NaiveDate::from_ymd_opt(2024, 1, 8),
            title: String::new(),
            journal: journal.to_string(),
            doi: String::new(),
            research_score: research,
            impact_score: impact,
            topic_tags: Vec::new(),
            method_tags: Vec::new(),
        }
    }

    fn load_result(records: Vec<ArticleRecord>) -> LoadResult {
        LoadResult {
            file_count: 1,
            snapshot_dates: vec![NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()],
            records,
            ..Default::default()
        }
    }

    #[test]
    fn journal_delta_against_global_mean() {
        // Two journals: J1 averages 80, J2 averages 60, global is 70.
        let load = load_result(vec![
            record("J1", Some(80.0), None),
            record("J2", Some(60.0), None),
        ]);
        let audit = build_audit(&load);
        assert_eq!(audit.global.mean_research, Some(70.0));
        let j1 = audit.journals.iter().find(|j| j.journal == "J1").unwrap();
        assert_eq!(j1.mean_research, Some(80.0));
        assert_eq!(j1.research_delta, Some(10.0));
        assert_eq!(j1.mean_impact, None);
        assert_eq!(j1.impact_delta, None);
    }

    #[test]
    fn same_journal_across_files_delta_is_zero() {
        let load = load_result(vec![
            record("J1", Some(60.0), None),
            record("J1", Some(80.0), None),
        ]);
        let audit = build_audit(&load);
        assert_eq!(audit.global.mean_research, Some(70.0));
        let j1 = &audit.journals[0];
        assert_eq!(j1.count, 2);
        assert_eq!(j1.mean_research, Some(70.0));
        assert_eq!(j1.research_delta, Some(0.0));
    }

    #[test]
    fn empty_journal_excluded_from_journal_table_only() {
        let load = load_result(vec![record("", Some(50.0), None), record("J1", Some(90.0), None)]);
        let audit = build_audit(&load);
        assert_eq!(audit.journals.len(), 1);
        assert_eq!(audit.global.record_count, 2);
        // the unattributed record still moves the global mean
        assert_eq!(audit.global.mean_research, Some(70.0));
    }

    #[test]
    fn scoreless_group_reports_absent_not_zero() {
        let load = load_result(vec![record("J1", None, None)]);
        let audit = build_audit(&load);
        let j1 = &audit.journals[0];
        assert_eq!(j1.count, 1);
        assert_eq!(j1.mean_research, None);
        assert_eq!(j1.research_delta, None);
    }

    #[test]
    fn topics_are_multi_membership() {
        let mut r = record("J1", Some(80.0), Some(40.0));
        r.topic_tags = vec!["a".to_string(), "b".to_string()];
        let load = load_result(vec![r]);
        let audit = build_audit(&load);
        assert_eq!(audit.global.record_count, 1);
        assert_eq!(audit.topics.len(), 2);
        for topic in &audit.topics {
            assert_eq!(topic.count, 1);
            assert_eq!(topic.mean_research, Some(80.0));
            assert_eq!(topic.mean_impact, Some(40.0));
        }
    }

    #[test]
    fn aggregate_ordering_count_desc_then_name() {
        let load = load_result(vec![
            record("B", Some(1.0), None),
            record("A", Some(1.0), None),
            record("C", Some(1.0), None),
            record("C", Some(1.0), None),
        ]);
        let audit = build_audit(&load);
        let names: Vec<&str> = audit.journals.iter().map(|j| j.journal.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn week_buckets_follow_the_snapshot_date() {
        let mut r1 = record("J1", Some(80.0), None);
        r1.topic_tags = vec!["x".to_string()];
        let mut r2 = record("J1", Some(60.0), Some(10.0));
        r2.run_date = None;
        r2.topic_tags = vec!["x".to_string()];
        let load = load_result(vec![r1, r2]);
        let audit = build_audit(&load);

        let labeled = &audit.buckets[&("2024-W02".to_string(), "x".to_string())];
        assert_eq!(labeled.research, vec![Some(80.0)]);
        let unknown = &audit.buckets[&("unknown".to_string(), "x".to_string())];
        assert_eq!(unknown.impact, vec![Some(10.0)]);
        // only filename-dated weeks are trend-eligible
        assert_eq!(audit.trend_weeks, vec!["2024-W02"]);
    }
}
