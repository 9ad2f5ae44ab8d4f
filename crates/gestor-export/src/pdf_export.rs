//! Annual PDF report of monthly closings

use chrono::NaiveDateTime;
use gestor_config::CurrencyConfig;
use gestor_core::format::format_money;
use gestor_core::MonthlyReport;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb};

use crate::error::{ExportError, ExportResult};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 14.0;
const ROW_HEIGHT: f32 = 8.0;
const BOTTOM_LIMIT: f32 = 20.0;

pub const PDF_COLUMNS: [&str; 5] = [
    "Mês de Referência",
    "Entradas",
    "Saídas",
    "Saldo Mensal",
    "Principal Gasto",
];
const COLUMN_X: [f32; 5] = [14.0, 62.0, 100.0, 138.0, 172.0];

/// Download name for the annual report of `year`
pub fn pdf_filename(year: i32) -> String {
    format!("relatorio-financeiro-family-{}.pdf", year)
}

/// Table row for one closing
pub fn report_row(report: &MonthlyReport, currency: &CurrencyConfig) -> [String; 5] {
    [
        report.month_name.clone(),
        format_money(report.total_income, currency),
        format_money(report.total_expense, currency),
        format_money(report.balance, currency),
        report
            .top_category
            .map(|c| c.label().to_string())
            .unwrap_or_else(|| "Nenhum".to_string()),
    ]
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn write_header_row(layer: &PdfLayerReference, font: &IndirectFontRef, y: f32) {
    layer.set_fill_color(rgb(21, 29, 42));
    for (label, x) in PDF_COLUMNS.iter().zip(COLUMN_X) {
        layer.use_text(*label, 10.0, Mm(x), Mm(y), font);
    }
}

/// Render the annual report for `year` as PDF bytes
///
/// The document is built completely in memory; an empty selection is an
/// error rather than a blank file.
pub fn annual_report_pdf(
    year: i32,
    reports: &[&MonthlyReport],
    currency: &CurrencyConfig,
    generated_at: NaiveDateTime,
) -> ExportResult<Vec<u8>> {
    if reports.is_empty() {
        return Err(ExportError::Empty {
            what: format!("closings for {}", year),
        });
    }

    let title = format!("Relatório Consolidado - Ano {}", year);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut current = doc.get_page(page).get_layer(layer);

    current.set_fill_color(rgb(21, 29, 42));
    current.use_text("Family Gestor", 22.0, Mm(MARGIN_LEFT), Mm(PAGE_HEIGHT - 20.0), &bold);
    current.set_fill_color(rgb(100, 116, 139));
    current.use_text(&title, 12.0, Mm(MARGIN_LEFT), Mm(PAGE_HEIGHT - 28.0), &regular);
    current.set_fill_color(rgb(148, 163, 184));
    current.use_text(
        format!("Gerado em: {}", generated_at.format("%d/%m/%Y %H:%M:%S")),
        8.0,
        Mm(MARGIN_LEFT),
        Mm(PAGE_HEIGHT - 34.0),
        &regular,
    );

    let mut y = PAGE_HEIGHT - 44.0;
    write_header_row(&current, &bold, y);
    y -= ROW_HEIGHT;

    for report in reports {
        if y < BOTTOM_LIMIT {
            let (next_page, next_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            current = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT - 20.0;
            write_header_row(&current, &bold, y);
            y -= ROW_HEIGHT;
        }

        current.set_fill_color(rgb(51, 65, 85));
        for (cell, x) in report_row(report, currency).iter().zip(COLUMN_X) {
            current.use_text(cell.as_str(), 9.0, Mm(x), Mm(y), &regular);
        }
        y -= ROW_HEIGHT;
    }

    let bytes = doc.save_to_bytes()?;
    log::debug!(
        "Rendered PDF for {} with {} closings ({} bytes)",
        year,
        reports.len(),
        bytes.len()
    );
    Ok(bytes)
}
