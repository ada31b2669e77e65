//! Inspection data supplied by the caller
//!
//! Every field is optional on input. Absent or `null` sequences come in
//! empty and absent scalars as `None`, which the tables render as `-`.
//! Identifiers and free text may also arrive as JSON numbers.

use serde::{Deserialize, Deserializer, Serialize};

/// `null` reads as the field's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Required text given as a string, a number or `null`
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

/// Optional text given as a string or a number; blank reads as absent
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Reading>::deserialize(deserializer)?.and_then(|value| value.display()))
}

/// Everything needed to render one household's final report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportData {
    /// Building number
    #[serde(deserialize_with = "text_or_empty")]
    pub dong: String,
    /// Unit number
    #[serde(deserialize_with = "text_or_empty")]
    pub ho: String,
    /// Apartment complex display name
    #[serde(deserialize_with = "text_or_empty")]
    pub complex: String,
    #[serde(deserialize_with = "null_as_default")]
    pub visual_inspections: Vec<InspectionRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub thermal_inspections: Vec<InspectionRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub air_measurements: Vec<AirMeasurement>,
    #[serde(deserialize_with = "null_as_default")]
    pub radon_measurements: Vec<RadonMeasurement>,
    #[serde(deserialize_with = "null_as_default")]
    pub level_measurements: Vec<LevelMeasurement>,
}

/// Fields shared by every kind of inspection entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionRecord {
    #[serde(deserialize_with = "optional_text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub trade: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub note: Option<String>,
    pub result: Option<InspectionResult>,
    /// Localized result label, preferred over `result` when present
    #[serde(deserialize_with = "optional_text")]
    pub result_text: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub created_at: Option<String>,
}

/// Outcome of a single inspection item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionResult {
    Normal,
    Check,
    Na,
    #[serde(other)]
    Other,
}

impl InspectionResult {
    /// Raw value as stored, `None` for unrecognized input
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            InspectionResult::Normal => Some("normal"),
            InspectionResult::Check => Some("check"),
            InspectionResult::Na => Some("na"),
            InspectionResult::Other => None,
        }
    }
}

/// Indoor air quality reading (TVOC/HCHO) after a ventilation process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AirMeasurement {
    #[serde(flatten)]
    pub inspection: InspectionRecord,
    pub process_type: Option<ProcessType>,
    pub tvoc: Option<Reading>,
    pub hcho: Option<Reading>,
}

/// Ventilation process that preceded an air measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    FlushOut,
    BakeOut,
    #[serde(other)]
    Other,
}

impl ProcessType {
    /// Display label; unknown processes have none
    pub fn label(&self) -> Option<&'static str> {
        match self {
            ProcessType::FlushOut => Some("Flush-out"),
            ProcessType::BakeOut => Some("Bake-out"),
            ProcessType::Other => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RadonMeasurement {
    #[serde(flatten)]
    pub inspection: InspectionRecord,
    pub radon: Option<Reading>,
    /// Unit label, e.g. `pCi/L`
    #[serde(deserialize_with = "optional_text")]
    pub unit: Option<String>,
}

/// Floor level gauge reading: left/right offsets at four points
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelMeasurement {
    #[serde(flatten)]
    pub inspection: InspectionRecord,
    pub point1_left_mm: Option<Reading>,
    pub point1_right_mm: Option<Reading>,
    pub point2_left_mm: Option<Reading>,
    pub point2_right_mm: Option<Reading>,
    pub point3_left_mm: Option<Reading>,
    pub point3_right_mm: Option<Reading>,
    pub point4_left_mm: Option<Reading>,
    pub point4_right_mm: Option<Reading>,
    pub reference_mm: Option<Reading>,
    /// Reference height joined in from the household record
    pub level_reference_mm: Option<Reading>,
}

impl LevelMeasurement {
    /// The four `(left, right)` offset pairs in point order
    pub fn points(&self) -> [(Option<&Reading>, Option<&Reading>); 4] {
        [
            (self.point1_left_mm.as_ref(), self.point1_right_mm.as_ref()),
            (self.point2_left_mm.as_ref(), self.point2_right_mm.as_ref()),
            (self.point3_left_mm.as_ref(), self.point3_right_mm.as_ref()),
            (self.point4_left_mm.as_ref(), self.point4_right_mm.as_ref()),
        ]
    }
}

/// A numeric reading that may arrive as a JSON number or a decimal string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    /// Text shown in a table cell, `None` when there is nothing to show
    ///
    /// Integral numbers print without a fractional part (`150`, not `150.0`).
    pub fn display(&self) -> Option<String> {
        match self {
            Reading::Number(value) if value.is_finite() => Some(value.to_string()),
            Reading::Number(_) => None,
            Reading::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
        }
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Reading::Number(value)
    }
}

impl From<&str> for Reading {
    fn from(value: &str) -> Self {
        Reading::Text(value.to_string())
    }
}
