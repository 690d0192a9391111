// ==========================================
// 商品目录批量导入导出 - XLSX 导出写入器
// ==========================================
// 职责: 生成最小 SpreadsheetML 包（单工作表 "Products"）
// 约束: 工作表 XML 在内存中构建，finish 时一次性打包
// 单元格: 文本使用 inlineStr，id / price 使用数值
// ==========================================

use crate::domain::{ProductExportRow, EXPORT_HEADER};
use crate::exporter::error::ExportResult;
use crate::exporter::RowSink;
use crate::repository::product_repo_impl::{format_price, format_timestamp};
use std::fmt::Write as _;
use std::io::{Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 工作表名称
pub const SHEET_NAME: &str = "Products";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        SHEET_NAME
    )
}

/// 单元格（数值以文本形式传入，原样写入 <v>）
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(&'a str),
}

pub struct XlsxDocumentWriter {
    sheet_data: String,
    next_row: u32,
}

impl XlsxDocumentWriter {
    /// 创建写入器并写出导出表头
    pub fn new() -> Self {
        Self::with_header(&EXPORT_HEADER)
    }

    /// 使用自定义表头（生成上传样例文件时使用）
    pub fn with_header(header: &[&str]) -> Self {
        let mut writer = Self {
            sheet_data: String::new(),
            next_row: 1,
        };
        let cells: Vec<Cell<'_>> = header.iter().map(|h| Cell::Text(h)).collect();
        writer.push_row(&cells);
        writer
    }

    /// 已写入的数据行数（不含表头）
    pub fn data_rows(&self) -> u32 {
        self.next_row - 2
    }

    /// 追加一行原始单元格
    pub fn push_row(&mut self, cells: &[Cell<'_>]) {
        let row = self.next_row;
        // String 写入不会失败
        let _ = write!(self.sheet_data, r#"<row r="{}">"#, row);
        for (col, cell) in cells.iter().enumerate() {
            let reference = format!("{}{}", column_name(col), row);
            let _ = match cell {
                Cell::Text(text) => write!(
                    self.sheet_data,
                    r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    reference,
                    escape_xml(text)
                ),
                Cell::Number(value) => {
                    write!(self.sheet_data, r#"<c r="{}"><v>{}</v></c>"#, reference, value)
                }
            };
        }
        self.sheet_data.push_str("</row>");
        self.next_row += 1;
    }

    /// 打包为 .xlsx 并写入 out
    pub fn finish<W: Write + Seek>(self, out: W) -> ExportResult<W> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(out);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS_XML.as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(workbook_xml().as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(WORKBOOK_RELS_XML.as_bytes())?;

        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        )?;
        zip.write_all(self.sheet_data.as_bytes())?;
        zip.write_all(b"</sheetData></worksheet>")?;

        Ok(zip.finish()?)
    }
}

impl Default for XlsxDocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RowSink for XlsxDocumentWriter {
    fn write_row(&mut self, row: &ProductExportRow) -> ExportResult<()> {
        let id = row.id.to_string();
        let price = format_price(row.price);
        let created_at = format_timestamp(row.created_at);
        self.push_row(&[
            Cell::Number(&id),
            Cell::Text(&row.unique_id),
            Cell::Text(&row.name),
            Cell::Number(&price),
            Cell::Text(&row.category),
            Cell::Text(&created_at),
        ]);
        Ok(())
    }
}

/// 0 → A, 25 → Z, 26 → AA
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// XML 文本转义（并丢弃 XML 1.0 不允许的控制字符）
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            c if (c as u32) < 0x20 => {}
            c => escaped.push(c),
        }
    }
    escaped
}
