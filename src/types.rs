use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tabled::Tabled;

/// One snapshot entry as it appears on disk. Any field may be absent or
/// carry the wrong type; normalization decides what survives.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawArticle {
    pub title: Value,
    pub journal: Value,
    pub doi: Value,
    pub research_score: Value,
    pub impact_score: Value,
    pub topic_tags: Value,
    pub method_tags: Value,
}

/// A normalized article entry. Built once per snapshot entry and read-only
/// for the rest of the run.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    /// Date derived from the snapshot filename; `None` renders as the
    /// "unknown" week bucket.
    pub run_date: Option<NaiveDate>,
    pub title: String,
    pub journal: String,
    pub doi: String,
    pub research_score: Option<f64>,
    pub impact_score: Option<f64>,
    pub topic_tags: Vec<String>,
    pub method_tags: Vec<String>,
}

/// Run-wide totals. The means are unrounded here; rounding happens at the
/// table edge so every delta in the run subtracts the same global value.
#[derive(Debug, Clone)]
pub struct GlobalStats {
    pub file_count: usize,
    pub record_count: usize,
    pub mean_research: Option<f64>,
    pub mean_impact: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct JournalAggregate {
    pub journal: String,
    pub count: usize,
    pub mean_research: Option<f64>,
    pub research_delta: Option<f64>,
    pub mean_impact: Option<f64>,
    pub impact_delta: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TopicAggregate {
    pub tag: String,
    pub count: usize,
    pub mean_research: Option<f64>,
    pub mean_impact: Option<f64>,
}

/// Scores accumulated for one (week label, topic tag) cell. Absent scores
/// are kept so the cell mean stays null-tolerant.
#[derive(Debug, Clone, Default)]
pub struct ScoreBucket {
    pub research: Vec<Option<f64>>,
    pub impact: Vec<Option<f64>>,
}

/// Everything the renderer needs for one report, computed in a single pass
/// over the normalized records.
#[derive(Debug, Clone)]
pub struct MonthlyAudit {
    pub global: GlobalStats,
    pub journals: Vec<JournalAggregate>,
    pub topics: Vec<TopicAggregate>,
    pub buckets: HashMap<(String, String), ScoreBucket>,
    pub trend_weeks: Vec<String>,
}

#[derive(Debug, Clone, Tabled)]
pub struct JournalRow {
    #[tabled(rename = "N")]
    pub n: usize,
    #[tabled(rename = "Journal")]
    pub journal: String,
    #[tabled(rename = "Mean Research")]
    pub mean_research: String,
    #[tabled(rename = "Δ vs Global")]
    pub research_delta: String,
    #[tabled(rename = "Mean Impact")]
    pub mean_impact: String,
    #[tabled(rename = "Δ vs Global")]
    pub impact_delta: String,
}

#[derive(Debug, Clone, Tabled)]
pub struct TopicRow {
    #[tabled(rename = "N")]
    pub n: usize,
    #[tabled(rename = "Topic Tag")]
    pub tag: String,
    #[tabled(rename = "Mean Research")]
    pub mean_research: String,
    #[tabled(rename = "Mean Impact")]
    pub mean_impact: String,
}
