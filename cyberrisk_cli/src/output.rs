use anyhow::Result;
use cyberrisk_lib::reconcile::UnmatchedName;
use cyberrisk_lib::{Aggregate, EnrichedPolygon, MatchKind, MetricRecord, PolygonStatus};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct RecordRow {
    #[tabled(rename = "Country")]
    #[serde(rename = "Country")]
    country: String,
    #[tabled(rename = "Region")]
    #[serde(rename = "Region")]
    region: String,
    #[tabled(rename = "CEI")]
    #[serde(rename = "CEI")]
    cei: String,
    #[tabled(rename = "GCI")]
    #[serde(rename = "GCI")]
    gci: String,
    #[tabled(rename = "NCSI")]
    #[serde(rename = "NCSI")]
    ncsi: String,
    #[tabled(rename = "DDL")]
    #[serde(rename = "DDL")]
    ddl: String,
    #[tabled(rename = "Risk Score")]
    #[serde(rename = "Risk Score")]
    risk_score: String,
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
}

#[derive(Tabled, Serialize)]
pub struct AggregateRow {
    #[tabled(rename = "Group")]
    #[serde(rename = "Group")]
    group: String,
    #[tabled(rename = "Countries")]
    #[serde(rename = "Countries")]
    countries: usize,
    #[tabled(rename = "Avg CEI")]
    #[serde(rename = "Avg CEI")]
    cei: f64,
    #[tabled(rename = "Avg GCI")]
    #[serde(rename = "Avg GCI")]
    gci: f64,
    #[tabled(rename = "Avg NCSI")]
    #[serde(rename = "Avg NCSI")]
    ncsi: f64,
    #[tabled(rename = "Avg DDL")]
    #[serde(rename = "Avg DDL")]
    ddl: f64,
    #[tabled(rename = "Avg Risk")]
    #[serde(rename = "Avg Risk")]
    risk_score: f64,
}

#[derive(Tabled, Serialize)]
pub struct RankRow {
    #[tabled(rename = "#")]
    #[serde(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Country")]
    #[serde(rename = "Country")]
    country: String,
    #[tabled(rename = "Region")]
    #[serde(rename = "Region")]
    region: String,
    #[tabled(rename = "Risk Score")]
    #[serde(rename = "Risk Score")]
    risk_score: String,
    #[tabled(rename = "Category")]
    #[serde(rename = "Category")]
    category: String,
}

#[derive(Tabled, Serialize)]
pub struct PolygonRow {
    #[tabled(rename = "Polygon")]
    #[serde(rename = "Polygon")]
    polygon: String,
    #[tabled(rename = "Country")]
    #[serde(rename = "Country")]
    country: String,
    #[tabled(rename = "Match")]
    #[serde(rename = "Match")]
    match_kind: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Color")]
    #[serde(rename = "Color")]
    color: String,
    #[tabled(rename = "Elevation")]
    #[serde(rename = "Elevation")]
    elevation: String,
}

#[derive(Tabled, Serialize)]
pub struct UnmatchedRow {
    #[tabled(rename = "Polygon")]
    #[serde(rename = "Polygon")]
    polygon: String,
    #[tabled(rename = "Closest Country")]
    #[serde(rename = "Closest Country")]
    suggestion: String,
    #[tabled(rename = "Similarity")]
    #[serde(rename = "Similarity")]
    similarity: String,
}

#[derive(Tabled, Serialize)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    #[serde(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

// -- Row builders --

pub fn build_record_rows(records: &[&MetricRecord]) -> Vec<RecordRow> {
    records
        .iter()
        .map(|r| RecordRow {
            country: r.name.clone(),
            region: r.region.clone(),
            cei: format!("{:.2}", r.cei),
            gci: format!("{:.1}", r.gci),
            ncsi: format!("{:.1}", r.ncsi),
            ddl: format!("{:.1}", r.ddl),
            risk_score: format!("{:.2}", r.risk_score),
            category: r.category_label(),
        })
        .collect()
}

pub fn build_aggregate_rows(aggregates: &[Aggregate<'_>]) -> Vec<AggregateRow> {
    aggregates
        .iter()
        .map(|a| {
            let means = a.means.rounded();
            AggregateRow {
                group: a.key.clone(),
                countries: a.count,
                cei: means.cei,
                gci: means.gci,
                ncsi: means.ncsi,
                ddl: means.ddl,
                risk_score: means.risk_score,
            }
        })
        .collect()
}

pub fn build_rank_rows(records: &[&MetricRecord]) -> Vec<RankRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| RankRow {
            rank: i + 1,
            country: r.name.clone(),
            region: r.region.clone(),
            risk_score: format!("{:.2}", r.risk_score),
            category: r.category_label(),
        })
        .collect()
}

pub fn build_polygon_rows(polygons: &[EnrichedPolygon<'_>]) -> Vec<PolygonRow> {
    polygons
        .iter()
        .map(|p| PolygonRow {
            polygon: if p.polygon.name.is_empty() {
                "(unnamed)".to_string()
            } else {
                p.polygon.name.clone()
            },
            country: p.record.map(|r| r.name.clone()).unwrap_or_default(),
            match_kind: match p.match_kind {
                Some(MatchKind::Exact) => "exact",
                Some(MatchKind::Alias) => "alias",
                Some(MatchKind::Substring) => "substring",
                None => "-",
            }
            .to_string(),
            status: match p.status {
                PolygonStatus::Visible => "visible",
                PolygonStatus::FilteredOut => "filtered out",
                PolygonStatus::NoData => "no data",
            }
            .to_string(),
            color: p.color.to_hex(),
            elevation: format!("{:.3}", p.elevation),
        })
        .collect()
}

pub fn build_unmatched_rows(unmatched: &[UnmatchedName]) -> Vec<UnmatchedRow> {
    unmatched
        .iter()
        .map(|u| UnmatchedRow {
            polygon: u.name.clone(),
            suggestion: u.suggestion.clone().unwrap_or_else(|| "-".to_string()),
            similarity: u
                .similarity
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

/// Flattens a JSON object into one row per top-level key.
pub fn build_field_rows(value: &serde_json::Value) -> Vec<FieldRow> {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| FieldRow {
                field: k.clone(),
                value: match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect(),
        other => vec![FieldRow {
            field: "value".to_string(),
            value: other.to_string(),
        }],
    }
}

// -- Generic printers --

pub fn print_table<T: Tabled>(rows: Vec<T>) {
    println!("{}", Table::new(rows));
}

pub fn print_markdown<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_csv<T: Serialize>(rows: Vec<T>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Prints `rows` in the chosen format. JSON output serializes `data`
/// instead, so it carries full-precision values.
pub fn emit<T, D>(rows: Vec<T>, data: &D, format: &OutputFormat) -> Result<()>
where
    T: Tabled + Serialize,
    D: Serialize,
{
    match format {
        OutputFormat::Table => print_table(rows),
        OutputFormat::Json => print_json(data),
        OutputFormat::Csv => print_csv(rows)?,
        OutputFormat::Markdown => print_markdown(rows),
    }
    Ok(())
}
