// ==========================================
// 商品目录批量导入导出 - 目录导出器
// ==========================================
// 职责: ExportQuery → CSV / XLSX 文档
// 流程: 查询游标逐行回调 → 文档写入器 → 字节
// 约束: 每次导出独立构建写入器，不跨调用共享状态
// ==========================================

use crate::domain::{ExportFormat, ExportQuery};
use crate::exporter::csv_writer::CsvDocumentWriter;
use crate::exporter::error::ExportResult;
use crate::exporter::xlsx_writer::XlsxDocumentWriter;
use crate::exporter::RowSink;
use crate::repository::CatalogReader;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

// ==========================================
// ExportDocument - 导出结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub format: ExportFormat,
    pub file_name: String,
    pub row_count: usize,
    pub bytes: Vec<u8>,
}

impl ExportDocument {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Content-Disposition 响应头
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

// ==========================================
// CatalogExporter - 目录导出器
// ==========================================
pub struct CatalogExporter<R>
where
    R: CatalogReader,
{
    reader: Arc<R>,
}

impl<R> CatalogExporter<R>
where
    R: CatalogReader,
{
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// 导出为完整文档
    ///
    /// # 参数
    /// - query: 过滤/排序条件
    /// - format: csv / xlsx
    #[instrument(skip(self, format), fields(format = %format))]
    pub fn export(&self, query: &ExportQuery, format: ExportFormat) -> ExportResult<ExportDocument> {
        let start_time = Instant::now();

        let (bytes, row_count) = match format {
            ExportFormat::Csv => self.export_csv_to(query, Vec::new())?,
            ExportFormat::Xlsx => {
                let mut sheet = XlsxDocumentWriter::new();
                let row_count = self.reader.scan_products(query, |row| sheet.write_row(&row))?;
                let bytes = sheet.finish(Cursor::new(Vec::new()))?.into_inner();
                (bytes, row_count)
            }
        };

        info!(
            rows = row_count,
            bytes = bytes.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "商品导出完成"
        );

        Ok(ExportDocument {
            format,
            file_name: format!("products.{}", format.extension()),
            row_count,
            bytes,
        })
    }

    /// CSV 直接流式写入任意 Write（不经过内存缓冲）
    ///
    /// # 返回
    /// - (W, usize): 底层 Write 与导出行数
    pub fn export_csv_to<W: Write>(&self, query: &ExportQuery, out: W) -> ExportResult<(W, usize)> {
        let mut writer = CsvDocumentWriter::new(out)?;
        let row_count = self
            .reader
            .scan_products(query, |row| writer.write_row(&row))?;
        Ok((writer.finish()?, row_count))
    }
}
