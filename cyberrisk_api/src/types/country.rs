//! Per-country metric rows returned by the `/countries` endpoint.

use serde::{Deserialize, Deserializer, Serialize};

/// One country row as the risk service sends it.
///
/// Every field is optional on the wire. The service has been seen sending
/// numbers as strings and dropping fields for countries with partial data, so
/// numeric fields accept a number, a numeric string, or `null`. Coercion into
/// a usable record happens in the library layer, not here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CountryRecord {
    /// Country display name.
    #[serde(rename = "Country", alias = "country", default)]
    pub country: Option<String>,

    /// Geographic region (e.g. "Europe", "Asia").
    #[serde(rename = "Region", alias = "region", default)]
    pub region: Option<String>,

    /// Cyber exposure index, 0-1.
    #[serde(rename = "CEI", default, deserialize_with = "lenient_f64")]
    pub cei: Option<f64>,

    /// Global cybersecurity index, 0-100.
    #[serde(rename = "GCI", default, deserialize_with = "lenient_f64")]
    pub gci: Option<f64>,

    /// National cyber security index, 0-100.
    #[serde(rename = "NCSI", default, deserialize_with = "lenient_f64")]
    pub ncsi: Option<f64>,

    /// Digital development level, 0-10.
    #[serde(rename = "DDL", default, deserialize_with = "lenient_f64")]
    pub ddl: Option<f64>,

    /// Server-assigned category label ("Low", "Medium", "High").
    #[serde(rename = "Risk_Category", default)]
    pub risk_category: Option<String>,

    /// Derived risk score, 0-1.
    #[serde(rename = "Risk_Score", default, deserialize_with = "lenient_f64")]
    pub risk_score: Option<f64>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Number(n)) => Some(n),
        Some(Lenient::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(Lenient::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_are_accepted() {
        let json = r#"{"Country": "Chile", "CEI": "0.41", "GCI": 68, "DDL": " 6.5 "}"#;
        let rec: CountryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.cei, Some(0.41));
        assert_eq!(rec.gci, Some(68.0));
        assert_eq!(rec.ddl, Some(6.5));
    }

    #[test]
    fn garbage_numbers_become_none() {
        let json = r#"{"Country": "Chile", "CEI": "n/a", "GCI": null, "NCSI": true}"#;
        let rec: CountryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.cei, None);
        assert_eq!(rec.gci, None);
        assert_eq!(rec.ncsi, None);
        assert_eq!(rec.risk_score, None);
    }
}
