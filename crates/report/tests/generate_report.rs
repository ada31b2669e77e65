//! End-to-end report generation tests
//!
//! Templates are built in-test with lopdf; fonts are absent unless a system
//! TrueType font is available, so most reports use the built-in fallback.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use report::mappers::zip_air_radon;
use report::table::{text_for_cell, CellSource};
use report::{
    AirMeasurement, FontKind, InspectionRecord, LevelMeasurement, ProcessType, RenderMode,
    ReportConfig, ReportData, ReportGenerator, ReportOptions, ReportPaths, Section,
};

/// A template PDF with `page_count` pages, each labelled with its number
fn write_template(path: &Path, page_count: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids = Vec::new();
    for i in 0..page_count {
        let content = format!(
            "BT /F1 18 Tf 50 800 Td (Template page {}) Tj ET\n0.2 0.4 0.8 rg 60 300 200 150 re f",
            i + 1
        );
        let contents_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "Contents" => contents_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => page_count as i64,
            "Kids" => page_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    doc.save(path).unwrap();
}

fn generator_in(base: &Path) -> ReportGenerator {
    ReportGenerator::new(ReportConfig {
        paths: ReportPaths::under(base),
        ..Default::default()
    })
}

fn page_content(path: &Path, page: u32) -> String {
    let doc = Document::load(path).unwrap();
    let page_id = doc.get_pages()[&page];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

fn visual(location: &str) -> InspectionRecord {
    InspectionRecord {
        location: Some(location.to_string()),
        trade: Some("Tile".to_string()),
        note: Some("Crack near the door frame".to_string()),
        result_text: Some("Check".to_string()),
        ..Default::default()
    }
}

fn household() -> ReportData {
    ReportData {
        dong: "101".to_string(),
        ho: "1203".to_string(),
        complex: "Sample Park".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_visual_rows_capped_at_page_budget() {
    let dir = tempfile::tempdir().unwrap();
    let report = ReportData {
        visual_inspections: (0..25).map(|i| visual(&format!("Room {i}"))).collect(),
        ..household()
    };

    let rendered = generator_in(dir.path()).render(&report).unwrap();
    let visual = rendered
        .sections
        .iter()
        .find(|s| s.section == Section::Visual)
        .unwrap();

    assert_eq!(visual.rows_drawn, 22);
    assert_eq!(visual.overflow, 3);
}

#[test]
fn test_air_without_radon_renders_dash() {
    let air = vec![AirMeasurement {
        inspection: InspectionRecord {
            location: Some("Living".to_string()),
            ..Default::default()
        },
        process_type: Some(ProcessType::FlushOut),
        tvoc: Some(0.12.into()),
        hcho: Some(0.03.into()),
    }];

    let rows = zip_air_radon(&air, &[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(text_for_cell(rows[0].cell_value("radon").as_deref(), 12), "-");
    assert_eq!(
        text_for_cell(rows[0].cell_value("process_type").as_deref(), 10),
        "Flush-out"
    );
}

#[test]
fn test_missing_template_produces_four_pages() {
    let dir = tempfile::tempdir().unwrap();
    let generated = generator_in(dir.path())
        .generate(&household(), &ReportOptions::default())
        .unwrap();

    assert_eq!(generated.mode, RenderMode::DataOnly);
    assert_eq!(generated.font, FontKind::Builtin);
    assert_eq!(generated.path, dir.path().join("reports").join(&generated.filename));
    assert_eq!(generated.url, format!("/reports/{}", generated.filename));
    assert_eq!(generated.size, fs::metadata(&generated.path).unwrap().len());

    let doc = Document::load(&generated.path).unwrap();
    assert_eq!(doc.get_pages().len(), 4);

    // Empty sections still get their table header
    for page in 1..=4 {
        assert!(page_content(&generated.path, page).contains("re\nf"));
    }
}

#[test]
fn test_level_reference_defaults_to_150() {
    let dir = tempfile::tempdir().unwrap();
    let report = ReportData {
        level_measurements: vec![LevelMeasurement {
            inspection: InspectionRecord {
                location: Some("Kitchen".to_string()),
                ..Default::default()
            },
            point1_left_mm: Some(3.0.into()),
            ..Default::default()
        }],
        ..household()
    };

    let generated = generator_in(dir.path())
        .generate(&report, &ReportOptions::default())
        .unwrap();

    // Level is the fourth slot
    let content = page_content(&generated.path, 4);
    assert!(content.contains("(150) Tj"));
    assert!(content.contains("(Kitchen) Tj"));
}

#[test]
fn test_filename_contains_household() {
    let dir = tempfile::tempdir().unwrap();
    let report = ReportData {
        dong: "12".to_string(),
        ho: "305".to_string(),
        ..Default::default()
    };

    let generated = generator_in(dir.path())
        .generate(&report, &ReportOptions::default())
        .unwrap();

    assert!(generated.filename.starts_with("final_report_12-305_"));
    assert!(generated.filename.ends_with(".pdf"));
    assert!(generated.path.exists());
}

#[test]
fn test_requested_filename_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let options = ReportOptions {
        filename: Some("household-101-1203".to_string()),
    };

    let generated = generator_in(dir.path())
        .generate(&household(), &options)
        .unwrap();

    assert_eq!(generated.filename, "household-101-1203.pdf");
    assert_eq!(generated.url, "/reports/household-101-1203.pdf");
}

#[test]
fn test_template_mode_overlays_slot_pages() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ReportPaths::under(dir.path());
    write_template(&paths.template_path, 13);

    let report = ReportData {
        visual_inspections: vec![visual("Bathroom")],
        ..household()
    };
    let generated = generator_in(dir.path())
        .generate(&report, &ReportOptions::default())
        .unwrap();

    assert_eq!(generated.mode, RenderMode::Template);
    let doc = Document::load(&generated.path).unwrap();
    assert_eq!(doc.get_pages().len(), 13);

    // Slot 7 (0-based) is page 8: template kept underneath, body covered,
    // table drawn on top
    let content = page_content(&generated.path, 8);
    assert!(content.starts_with("q\n"));
    let template_pos = content.find("Template page 8").unwrap();
    let cover_pos = content.find("24 24 547 764 re").unwrap();
    let row_pos = content.find("(Bathroom) Tj").unwrap();
    assert!(template_pos < cover_pos);
    assert!(cover_pos < row_pos);

    for page in [10, 12, 13] {
        assert!(page_content(&generated.path, page).contains("24 24 547 764 re"));
    }

    // Pages without a slot are untouched
    let untouched = page_content(&generated.path, 1);
    assert!(untouched.contains("Template page 1"));
    assert!(!untouched.contains("547 764 re"));
}

#[test]
fn test_short_template_falls_back_to_data_only() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ReportPaths::under(dir.path());
    write_template(&paths.template_path, 12);

    let generated = generator_in(dir.path())
        .generate(&household(), &ReportOptions::default())
        .unwrap();

    assert_eq!(generated.mode, RenderMode::DataOnly);
    let doc = Document::load(&generated.path).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
}

#[test]
fn test_sections_follow_slot_order() {
    let dir = tempfile::tempdir().unwrap();
    let rendered = generator_in(dir.path()).render(&household()).unwrap();

    let order: Vec<(Section, usize)> = rendered
        .sections
        .iter()
        .map(|s| (s.section, s.page))
        .collect();
    assert_eq!(
        order,
        vec![
            (Section::Visual, 1),
            (Section::Thermal, 2),
            (Section::Air, 3),
            (Section::Level, 4),
        ]
    );
}

#[test]
fn test_report_from_json_input() {
    let dir = tempfile::tempdir().unwrap();
    let json = r#"{
        "dong": "7",
        "ho": "702",
        "air_measurements": [
            {"location": "Room", "process_type": "bake_out", "tvoc": "0.08", "hcho": 0.02}
        ],
        "radon_measurements": [
            {"location": "Room", "radon": 1.1, "unit": "pCi/L"},
            {"location": "Hall", "radon": "0.9", "unit": "pCi/L"}
        ]
    }"#;
    let report: ReportData = serde_json::from_str(json).unwrap();

    let rendered = generator_in(dir.path()).render(&report).unwrap();
    let air = rendered
        .sections
        .iter()
        .find(|s| s.section == Section::Air)
        .unwrap();
    assert_eq!(air.rows_drawn, 2);
    assert_eq!(air.overflow, 0);
}

#[test]
fn test_report_from_json_with_nulls_and_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let json = r#"{
        "dong": 12,
        "ho": 305,
        "complex": null,
        "visual_inspections": [{"location": "Hall", "note": null, "result": "check"}],
        "thermal_inspections": null,
        "air_measurements": null,
        "radon_measurements": null,
        "level_measurements": null
    }"#;
    let report: ReportData = serde_json::from_str(json).unwrap();

    let generated = generator_in(dir.path())
        .generate(&report, &ReportOptions::default())
        .unwrap();
    assert!(generated.filename.starts_with("final_report_12-305_"));
    assert_eq!(generated.mode, RenderMode::DataOnly);
    assert!(page_content(&generated.path, 1).contains("(Hall) Tj"));
}

#[test]
fn test_embedded_font_when_available() {
    let system_font = PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
    if !system_font.exists() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut config = ReportConfig {
        paths: ReportPaths::under(dir.path()),
        ..Default::default()
    };
    config.paths.font_path = system_font.clone();

    let report = ReportData {
        visual_inspections: vec![visual("Bathroom")],
        ..household()
    };
    let generated = ReportGenerator::new(config)
        .generate(&report, &ReportOptions::default())
        .unwrap();

    assert_eq!(generated.font, FontKind::Embedded);
    let content = page_content(&generated.path, 1);
    assert!(content.contains("> Tj"));

    // Only the drawn glyphs are embedded
    let font_size = fs::metadata(&system_font).unwrap().len();
    assert!(generated.size < font_size / 2);
}

#[test]
fn test_concurrent_reports_with_same_filename() {
    let dir = tempfile::tempdir().unwrap();
    let generator = generator_in(dir.path());
    let report = ReportData {
        visual_inspections: vec![visual("Hall")],
        ..household()
    };
    let options = ReportOptions {
        filename: Some("shared".to_string()),
    };

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    (0..3)
                        .map(|_| generator.generate(&report, &options))
                        .collect::<Result<Vec<_>, _>>()
                })
            })
            .collect();

        for handle in handles {
            let generated = handle.join().unwrap().unwrap();
            assert!(generated.iter().all(|g| g.filename == "shared.pdf"));
        }
    });

    let output_dir = dir.path().join("reports");
    let entries: Vec<_> = fs::read_dir(&output_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let doc = Document::load(output_dir.join("shared.pdf")).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
}
