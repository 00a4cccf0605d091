//! Output persistence for one run.
//!
//! Everything is addressed through an explicit `RunContext` constructed
//! by the caller; no module-level output paths. The model table goes
//! out as CSV and XLSX, the summary and calibration report as pretty
//! JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;

use crate::calibration::CalibrationReport;
use crate::simulate::{SimRow, SimulationResult};
use crate::skill_blend::SgMetric;

/// Run-scoped output destination, passed to every collaborator that
/// persists anything.
#[derive(Debug, Clone)]
pub struct RunContext {
    out_dir: PathBuf,
}

impl RunContext {
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output dir {}", out_dir.display()))?;
        Ok(Self { out_dir })
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.out_dir.join(name)
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        let json = serde_json::to_string_pretty(value).context("serializing json output")?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
    }
}

pub fn write_outputs<T: Serialize>(
    ctx: &RunContext,
    result: &SimulationResult,
    summary: &T,
    report: &CalibrationReport,
) -> Result<()> {
    let rows = model_table_rows(result);
    write_csv(&ctx.path("model_table.csv"), &rows)?;
    // The spreadsheet is a convenience copy of the CSV; a failure there
    // should not sink an otherwise complete run.
    if let Err(err) = write_xlsx(&ctx.path("model_table.xlsx"), &rows) {
        log::warn!("xlsx export failed: {err:#}");
    }
    ctx.write_json("summary.json", summary)?;
    ctx.write_json("calibration_report.json", report)?;
    Ok(())
}

static MODEL_TABLE_HEADER: Lazy<Vec<String>> = Lazy::new(|| {
    let mut header: Vec<String> = vec!["Player".to_string(), "MODEL_SCORE".to_string()];
    header.extend(
        ["P_T10", "P_T20", "P_T30", "P_T40", "P_MC"]
            .iter()
            .map(|s| s.to_string()),
    );
    header.extend(SgMetric::ALL.iter().map(|m| m.label().to_string()));
    header.extend(
        [
            "STD_DEV",
            "BIG_NUM",
            "COURSE_HISTORY",
            "COURSE_FIT",
            "APPROACH_WEIGHTED",
            "POOR_SHOT_AVOID",
            "PENALTY_AVOID",
            "FILL_PLAYER",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    header
});

fn model_table_rows(result: &SimulationResult) -> Vec<Vec<String>> {
    let mut rows = vec![MODEL_TABLE_HEADER.clone()];
    rows.extend(result.rows.iter().map(model_table_row));
    rows
}

fn model_table_row(row: &SimRow) -> Vec<String> {
    let mut cells = vec![row.player.name.clone(), fmt_f64(row.model_score)];
    for p in [row.p_t10, row.p_t20, row.p_t30, row.p_t40, row.p_mc] {
        cells.push(fmt_f64(p));
    }
    for metric in SgMetric::ALL {
        cells.push(fmt_opt(row.player.sg.get(metric)));
    }
    cells.push(fmt_opt(row.player.std_dev));
    cells.push(fmt_opt(row.player.big_num));
    cells.push(fmt_opt(row.player.course_history));
    cells.push(fmt_opt(row.player.course_fit));
    cells.push(fmt_opt(row.player.approach_weighted));
    cells.push(fmt_opt(row.player.poor_shot_avoid));
    cells.push(fmt_opt(row.player.penalty_avoid));
    cells.push(row.player.fill_player.to_string());
    cells
}

fn fmt_f64(v: f64) -> String {
    format!("{v:.6}")
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_f64).unwrap_or_default()
}

fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut out = String::new();
    for row in rows {
        let line = row
            .iter()
            .map(|cell| csv_escape(cell))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

fn csv_escape(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn write_xlsx(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Model")?;
    write_sheet_rows(sheet, rows)?;
    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn write_sheet_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("writing cell ({row_idx}, {col_idx})"))?;
        }
    }
    Ok(())
}
