//! CSV and Excel export of report tables.

use std::io::Write;
use std::path::Path;

use chrono::{Datelike, Local, NaiveTime};
use csv::{QuoteStyle, WriterBuilder};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use tracing::info;

use crate::dates::DateRange;
use crate::error::{AppError, Result};
use crate::report::{AttendanceLogRow, BasicReportRow, MonthlyReportRow};
use crate::theme::Theme;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

/// A report flattened to display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| h.to_string()).collect()
}

fn time_or_dash(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn coordinate(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// Basic report: one line per user per day.
pub fn basic_table(rows: &[BasicReportRow]) -> ReportTable {
    ReportTable {
        title: "Basic Report".to_string(),
        headers: headers(&["Employee", "Date", "Status", "Check In", "Check Out", "Duration"]),
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.user_name.clone(),
                    row.date.format("%Y-%m-%d").to_string(),
                    row.status.label().to_string(),
                    time_or_dash(row.check_in),
                    time_or_dash(row.check_out),
                    row.duration.clone().unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect(),
    }
}

/// Attendance log: one line per event.
pub fn log_table(rows: &[AttendanceLogRow]) -> ReportTable {
    ReportTable {
        title: "Attendance Log".to_string(),
        headers: headers(&["Employee", "Date", "Time", "Type", "Address", "Latitude", "Longitude"]),
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.user_name.clone(),
                    row.date.format("%Y-%m-%d").to_string(),
                    row.time.format("%H:%M:%S").to_string(),
                    row.event_type.as_str().to_string(),
                    row.address.clone(),
                    coordinate(row.latitude),
                    coordinate(row.longitude),
                ]
            })
            .collect(),
    }
}

/// Monthly report: day-code grid followed by counters.
pub fn monthly_table(rows: &[MonthlyReportRow], range: DateRange) -> ReportTable {
    // Day numbers repeat once the range leaves its first month
    let day_format = if (range.start().year(), range.start().month()) == (range.end().year(), range.end().month()) {
        "%d"
    } else {
        "%m-%d"
    };
    let mut header = vec!["Employee".to_string()];
    header.extend(range.days().map(|d| d.format(day_format).to_string()));
    header.extend(headers(&[
        "Present",
        "Absent",
        "Half Day",
        "Week Off",
        "Holiday",
        "Weekend Present",
        "Holiday Present",
        "Total Payable Days",
    ]));

    ReportTable {
        title: "Monthly Report".to_string(),
        headers: header,
        rows: rows
            .iter()
            .map(|row| {
                let mut line = vec![row.user_name.clone()];
                line.extend(row.codes().into_iter().map(str::to_string));
                line.extend(
                    [
                        row.present_days,
                        row.absent_days,
                        row.half_days,
                        row.week_offs,
                        row.holidays,
                        row.weekend_presents,
                        row.holiday_presents,
                    ]
                    .iter()
                    .map(u32::to_string),
                );
                line.push(row.total_payable_days.to_string());
                line
            })
            .collect(),
    }
}

/// Write a table as CSV with every field double-quoted.
pub fn write_csv_to<W: Write>(table: &ReportTable, out: W) -> Result<()> {
    let mut writer = WriterBuilder::new().quote_style(QuoteStyle::Always).from_writer(out);

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Render a table as a CSV string.
pub fn to_csv(table: &ReportTable) -> Result<String> {
    let mut buf = Vec::new();
    write_csv_to(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| AppError::export(format!("CSV is not valid UTF-8: {e}")))
}

/// Write a table to a CSV file.
pub fn write_csv(table: &ReportTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv_to(table, file)?;
    info!("Exported {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

/// Write a table to an Excel file using the theme's header colors.
pub fn write_xlsx(table: &ReportTable, path: &Path, theme: &Theme) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name(&table.title)?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(theme.header_color))
        .set_font_color(Color::RGB(theme.header_text_color))
        .set_border(FormatBorder::Thin);

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string((idx + 1) as u32, col as u16, value)?;
        }
    }

    // Column widths from the longest value, header included
    for (col, header) in table.headers.iter().enumerate() {
        let longest = table
            .rows
            .iter()
            .filter_map(|row| row.get(col))
            .map(|v| v.chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(8);
        worksheet.set_column_width(col as u16, (longest + 2).clamp(4, 40) as f64)?;
    }

    // Autofilter
    if !table.rows.is_empty() && !table.headers.is_empty() {
        let last_row = table.rows.len() as u32;
        worksheet.autofilter(0, 0, last_row, (table.headers.len() - 1) as u16)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    info!("Exported {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

/// Write a table in the given format.
pub fn write_table(table: &ReportTable, path: &Path, format: ExportFormat, theme: &Theme) -> Result<()> {
    match format {
        ExportFormat::Csv => write_csv(table, path),
        ExportFormat::Xlsx => write_xlsx(table, path, theme),
    }
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str, extension: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.{extension}", ts = now.format("%Y%m%d_%H%M%S"))
}
