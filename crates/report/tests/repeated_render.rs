//! Memory stays flat across many renders with an embedded font
//!
//! Kept in its own test binary so no other test shares the process while
//! resident memory is sampled.

use std::fs;
use std::path::{Path, PathBuf};

use report::{InspectionRecord, ReportConfig, ReportData, ReportGenerator, ReportPaths};

const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
const PAGE_SIZE: u64 = 4096;

/// Resident set size in bytes, from `/proc/self/statm`
fn resident_bytes() -> Option<u64> {
    let statm = fs::read_to_string("/proc/self/statm").ok()?;
    let pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(pages * PAGE_SIZE)
}

#[test]
fn test_repeated_renders_do_not_grow_memory() {
    if !Path::new(SYSTEM_FONT).exists() || resident_bytes().is_none() {
        return;
    }
    let font_size = fs::metadata(SYSTEM_FONT).unwrap().len();

    let dir = tempfile::tempdir().unwrap();
    let mut config = ReportConfig {
        paths: ReportPaths::under(dir.path()),
        ..Default::default()
    };
    config.paths.font_path = PathBuf::from(SYSTEM_FONT);
    let generator = ReportGenerator::new(config);

    let report = ReportData {
        dong: "12".to_string(),
        ho: "305".to_string(),
        visual_inspections: (0..22)
            .map(|i| InspectionRecord {
                location: Some(format!("Room {i}")),
                note: Some("Hairline crack".to_string()),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };

    for _ in 0..5 {
        generator.render(&report).unwrap();
    }
    let before = resident_bytes().unwrap();

    let renders = 50;
    for _ in 0..renders {
        generator.render(&report).unwrap();
    }
    let after = resident_bytes().unwrap();

    // Holding on to one font copy per render would add renders * font_size
    let growth = after.saturating_sub(before);
    assert!(
        growth < font_size * renders / 2,
        "resident memory grew by {growth} bytes over {renders} renders"
    );
}
