//! JSON Time-Series (JTS) documents for sensor data upload.
//!
//! A [`JtsDocument`] bundles one or more [`TimeSeries`]. Each series is a
//! column identified by the registered instance id plus a measurement name
//! (`temp`, `soil_moist`, `soil_ec`, `light_lux`, ...). On serialization,
//! records of all series are merged into rows keyed by timestamp:
//!
//! ```text
//! {"docType": "jts", "version": "1.0",
//!  "header": {"startTime": ..., "endTime": ..., "recordCount": 2,
//!             "columns": {"0": {"id": "42", "name": "temp", "dataType": "NUMBER", ...}}},
//!  "data": [{"ts": ..., "f": {"0": {"v": 21.5}}}, ...]}
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

const DOC_TYPE: &str = "jts";
const VERSION: &str = "1.0";

/// A single measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct TsRecord {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Optional quality indicator.
    pub quality: Option<i64>,
    /// Optional free-form annotation.
    pub annotation: Option<String>,
}

impl TsRecord {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            quality: None,
            annotation: None,
        }
    }

    pub fn with_quality(mut self, quality: i64) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }
}

/// One named measurement stream for one plant instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    identifier: String,
    name: String,
    records: Vec<TsRecord>,
}

impl TimeSeries {
    /// `identifier` is the id returned by instance registration.
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn insert(&mut self, record: TsRecord) {
        self.records.push(record);
    }

    pub fn with_record(mut self, record: TsRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[TsRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A JTS document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JtsDocument {
    series: Vec<TimeSeries>,
}

impl JtsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_series(&mut self, series: TimeSeries) {
        self.series.push(series);
    }

    pub fn with_series(mut self, series: impl IntoIterator<Item = TimeSeries>) -> Self {
        self.series.extend(series);
        self
    }

    pub fn series(&self) -> &[TimeSeries] {
        &self.series
    }

    /// Number of distinct timestamps across all series.
    pub fn record_count(&self) -> usize {
        self.rows().len()
    }

    fn rows(&self) -> BTreeMap<DateTime<Utc>, BTreeMap<String, FieldValue<'_>>> {
        let mut rows: BTreeMap<DateTime<Utc>, BTreeMap<String, FieldValue<'_>>> = BTreeMap::new();
        for (column, series) in self.series.iter().enumerate() {
            for record in &series.records {
                rows.entry(record.timestamp).or_default().insert(
                    column.to_string(),
                    FieldValue {
                        v: record.value,
                        q: record.quality,
                        a: record.annotation.as_deref(),
                    },
                );
            }
        }
        rows
    }
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Document<'a> {
    doc_type: &'static str,
    version: &'static str,
    header: Header<'a>,
    data: Vec<Row<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Header<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,
    record_count: usize,
    columns: BTreeMap<String, Column<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Column<'a> {
    id: &'a str,
    name: &'a str,
    data_type: &'static str,
    render_type: &'static str,
    format: &'static str,
    aggregate: &'static str,
}

#[derive(Serialize)]
struct Row<'a> {
    ts: String,
    f: BTreeMap<String, FieldValue<'a>>,
}

#[derive(Serialize)]
struct FieldValue<'a> {
    v: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    a: Option<&'a str>,
}

impl Serialize for JtsDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows = self.rows();
        let columns = self
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| {
                (
                    i.to_string(),
                    Column {
                        id: &s.identifier,
                        name: &s.name,
                        data_type: "NUMBER",
                        render_type: "VALUE",
                        format: "0.###",
                        aggregate: "NONE",
                    },
                )
            })
            .collect();

        let header = Header {
            start_time: rows.keys().next().map(format_ts),
            end_time: rows.keys().next_back().map(format_ts),
            record_count: rows.len(),
            columns,
        };
        let data = rows
            .into_iter()
            .map(|(ts, f)| Row { ts: format_ts(&ts), f })
            .collect();

        Document {
            doc_type: DOC_TYPE,
            version: VERSION,
            header,
            data,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap()
    }

    #[test]
    fn test_series_merge_into_rows_by_timestamp() {
        let temp = TimeSeries::new("42", "temp")
            .with_record(TsRecord::new(at(0), 21.5))
            .with_record(TsRecord::new(at(15), 22.0));
        let moist = TimeSeries::new("42", "soil_moist").with_record(TsRecord::new(at(15), 40.0));
        let doc = JtsDocument::new().with_series([temp, moist]);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["docType"], json!("jts"));
        assert_eq!(value["version"], json!("1.0"));
        assert_eq!(value["header"]["recordCount"], json!(2));
        assert_eq!(value["header"]["startTime"], json!("2024-03-01T10:00:00.000Z"));
        assert_eq!(value["header"]["endTime"], json!("2024-03-01T10:15:00.000Z"));
        assert_eq!(value["header"]["columns"]["1"]["name"], json!("soil_moist"));
        assert_eq!(value["header"]["columns"]["0"]["id"], json!("42"));

        let data = value["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["f"], json!({"0": {"v": 21.5}}));
        assert_eq!(data[1]["f"], json!({"0": {"v": 22.0}, "1": {"v": 40.0}}));
    }

    #[test]
    fn test_quality_and_annotation_serialized_when_set() {
        let series = TimeSeries::new("1", "temp")
            .with_record(TsRecord::new(at(0), 1.0).with_quality(100).with_annotation("calibrated"));
        let value = serde_json::to_value(JtsDocument::new().with_series([series])).unwrap();
        assert_eq!(value["data"][0]["f"]["0"], json!({"v": 1.0, "q": 100, "a": "calibrated"}));
    }

    #[test]
    fn test_empty_document() {
        let doc = JtsDocument::new();
        assert_eq!(doc.record_count(), 0);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["header"]["recordCount"], json!(0));
        assert!(value["header"].get("startTime").is_none());
        assert_eq!(value["data"], json!([]));
    }
}
