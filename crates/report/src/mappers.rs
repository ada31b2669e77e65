//! Projection of inspection records into table cells

use crate::model::{
    AirMeasurement, InspectionRecord, LevelMeasurement, RadonMeasurement, Reading,
};
use crate::table::{CellSource, EMPTY_CELL};

/// Level reference height used when a record has none
pub const DEFAULT_LEVEL_REFERENCE_MM: &str = "150";

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn reading(value: Option<&Reading>) -> Option<String> {
    value.and_then(Reading::display)
}

impl InspectionRecord {
    /// Result label, preferring the localized text over the raw value
    pub fn result_label(&self) -> Option<String> {
        non_empty(self.result_text.as_deref())
            .or_else(|| self.result.and_then(|r| r.as_str()).map(str::to_string))
    }
}

impl CellSource for InspectionRecord {
    fn cell_value(&self, field: &str) -> Option<String> {
        match field {
            "location" => non_empty(self.location.as_deref()),
            "trade" => non_empty(self.trade.as_deref()),
            "note" => non_empty(self.note.as_deref()),
            "result" => self.result_label(),
            "created_at" => non_empty(self.created_at.as_deref()),
            _ => None,
        }
    }
}

/// One air quality row: the i-th air and i-th radon measurement
#[derive(Debug, Clone, Copy)]
pub struct AirRadonRow<'a> {
    pub air: Option<&'a AirMeasurement>,
    pub radon: Option<&'a RadonMeasurement>,
}

/// Pair air and radon measurements by index
///
/// The result is as long as the longer input; the shorter side is `None`
/// past its end.
pub fn zip_air_radon<'a>(
    air: &'a [AirMeasurement],
    radon: &'a [RadonMeasurement],
) -> Vec<AirRadonRow<'a>> {
    (0..air.len().max(radon.len()))
        .map(|i| AirRadonRow {
            air: air.get(i),
            radon: radon.get(i),
        })
        .collect()
}

impl RadonMeasurement {
    /// `"{value} {unit}"`, trimmed
    pub fn radon_text(&self) -> Option<String> {
        let value = reading(self.radon.as_ref())?;
        let unit = self.unit.as_deref().unwrap_or("");
        Some(format!("{value} {unit}").trim().to_string())
    }
}

impl CellSource for AirRadonRow<'_> {
    fn cell_value(&self, field: &str) -> Option<String> {
        match field {
            "process_type" => self
                .air?
                .process_type
                .and_then(|p| p.label())
                .map(str::to_string),
            "tvoc" => reading(self.air?.tvoc.as_ref()),
            "hcho" => reading(self.air?.hcho.as_ref()),
            "radon" => self.radon?.radon_text(),
            // Shared fields: air side first, radon side otherwise
            _ => self
                .air
                .and_then(|a| a.inspection.cell_value(field))
                .or_else(|| self.radon.and_then(|r| r.inspection.cell_value(field))),
        }
    }
}

impl LevelMeasurement {
    /// Reference height: joined value, own value, then the default
    pub fn reference_text(&self) -> String {
        reading(self.level_reference_mm.as_ref())
            .or_else(|| reading(self.reference_mm.as_ref()))
            .unwrap_or_else(|| DEFAULT_LEVEL_REFERENCE_MM.to_string())
    }

    /// All four points on one line, e.g.
    /// `1번 좌3/우4 2번 좌-/우2 3번 좌0/우0 4번 좌1/우1 (기준 150mm)`
    pub fn points_summary(&self) -> String {
        let points = self
            .points()
            .iter()
            .enumerate()
            .map(|(i, (left, right))| {
                format!(
                    "{}번 좌{}/우{}",
                    i + 1,
                    reading(*left).as_deref().unwrap_or(EMPTY_CELL),
                    reading(*right).as_deref().unwrap_or(EMPTY_CELL)
                )
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{points} (기준 {}mm)", self.reference_text())
    }
}

impl CellSource for LevelMeasurement {
    fn cell_value(&self, field: &str) -> Option<String> {
        match field {
            "reference_mm" => Some(self.reference_text()),
            "points" => Some(self.points_summary()),
            _ => self.inspection.cell_value(field),
        }
    }
}
