//! Report writers: `.xlsx` and `.csv`, selected by output extension.
//!
//! Writes are atomic — the report is rendered to a sibling temp file and
//! renamed over the target — so a crash mid-write never leaves a partial
//! upload file for someone to import.

use crate::config::ConversionMode;
use crate::error::ConvertError;
use crate::output::Report;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use std::path::Path;
use tracing::info;

/// Header fill used by the MSM reporting template.
const MSM_HEADER_FILL: u32 = 0x366092;

/// Write `report` to `path`, dispatching on the file extension.
pub fn write_report(report: &Report, path: &Path, mode: ConversionMode) -> Result<(), ConvertError> {
    info!("Writing output to {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ConvertError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    let bytes = match extension.as_deref() {
        Some("xlsx") => render_xlsx(report, path, mode)?,
        Some("csv") => render_csv(report)?,
        _ => {
            return Err(ConvertError::UnsupportedOutputFormat {
                path: path.to_path_buf(),
            })
        }
    };

    atomic_write(path, &bytes)?;
    info!("SUCCESS: wrote {} rows to {}", report.rows.len(), path.display());
    Ok(())
}

/// Temp file + rename in the target directory.
fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let map_err = |e: std::io::Error| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let tmp_path = path.with_extension("out.tmp");
    std::fs::write(&tmp_path, bytes).map_err(map_err)?;
    std::fs::rename(&tmp_path, path).map_err(map_err)
}

// ── CSV ──────────────────────────────────────────────────────────────────

fn render_csv(report: &Report) -> Result<Vec<u8>, ConvertError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&report.headers)
        .and_then(|_| {
            report
                .rows
                .iter()
                .try_for_each(|row| writer.write_record(row))
        })
        .map_err(|e| ConvertError::Internal(format!("CSV render failed: {e}")))?;
    writer
        .into_inner()
        .map_err(|e| ConvertError::Internal(format!("CSV render failed: {e}")))
}

// ── XLSX ─────────────────────────────────────────────────────────────────

fn render_xlsx(report: &Report, path: &Path, mode: ConversionMode) -> Result<Vec<u8>, ConvertError> {
    let map_err = |e: rust_xlsxwriter::XlsxError| ConvertError::WorkbookFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    match mode {
        ConversionMode::Applens => write_plain_sheet(sheet, report).map_err(map_err)?,
        ConversionMode::Msm => write_msm_sheet(sheet, report).map_err(map_err)?,
    }

    workbook.save_to_buffer().map_err(map_err)
}

fn write_plain_sheet(
    sheet: &mut rust_xlsxwriter::Worksheet,
    report: &Report,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (col, header) in report.headers.iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for (r, row) in report.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            sheet.write_string(r as u32 + 1, c as u16, cell)?;
        }
    }
    Ok(())
}

/// The styled MSM sheet: blue banner header with wrapped text, bordered
/// cells, auto-ish column widths, frozen header row, numeric Time Spent.
fn write_msm_sheet(
    sheet: &mut rust_xlsxwriter::Worksheet,
    report: &Report,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    sheet.set_name("MSM Data")?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_font_size(10)
        .set_background_color(Color::RGB(MSM_HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin);

    let body_format = Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    // Row height 45 gives the wrapped header text room to breathe.
    sheet.set_row_height(0, 45)?;
    for (col, header) in report.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    let numeric_cols = [report.column("S.No"), report.column("Time Spent()")];
    for (r, row) in report.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let is_numeric = numeric_cols.contains(&Some(c));
            match cell.parse::<f64>() {
                Ok(n) if is_numeric => {
                    sheet.write_number_with_format(r as u32 + 1, c as u16, n, &body_format)?
                }
                _ => sheet.write_string_with_format(r as u32 + 1, c as u16, cell, &body_format)?,
            };
        }
    }

    // Column widths: longest cell + 2, floored at 15 so the wrapped
    // headers stay legible, capped at 50.
    for (col, header) in report.headers.iter().enumerate() {
        let max_len = report
            .rows
            .iter()
            .map(|row| row[col].chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);
        let width = (max_len + 2).clamp(15, 50);
        sheet.set_column_width(col as u16, width as f64)?;
    }

    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}
