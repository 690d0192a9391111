// ==========================================
// 商品目录批量导入导出 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析（与业务规则无关）
// 支持: CSV (.csv) / Excel (.xlsx/.xls)
// 约束:
// - CSV 逐条惰性读取，不整体载入内存
// - Excel 只读取第一个工作表，内存上限为单个工作表
// - 迭代结束 (None) 表示“无更多行”；Some(Err) 表示读取中断
// ==========================================

use crate::domain::{CellValue, FileFormat, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{Data, Range, Reader, Xls, Xlsx};
use csv::{ReaderBuilder, StringRecordsIntoIter};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// 可读可定位的上传数据源
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

/// 上传数据源（文件或内存缓冲）
pub type UploadReader = Box<dyn ReadSeek>;

/// 解析出的单行
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    /// 正常行
    Row(RawRow),
    /// 行级解析失败（仅影响本行）
    Malformed { row_index: usize, reason: String },
}

impl ParsedRow {
    pub fn row_index(&self) -> usize {
        match self {
            ParsedRow::Row(row) => row.row_index(),
            ParsedRow::Malformed { row_index, .. } => *row_index,
        }
    }
}

/// 惰性、有限、只进的行序列
pub type RowStream = Box<dyn Iterator<Item = ImportResult<ParsedRow>> + Send>;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 打开数据源并返回行序列
    ///
    /// # 返回
    /// - Ok(RowStream): 表头已读取成功
    /// - Err: 文件级错误（格式错误、无表头等）
    fn open_rows(&self, reader: UploadReader) -> ImportResult<RowStream>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn open_rows(&self, reader: UploadReader) -> ImportResult<RowStream> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 行长度不一致由本层按行处理
            .from_reader(BufReader::new(reader));

        // 读取表头
        let header_record = reader.headers()?;
        let header_line = header_record.position().map(|p| p.line()).unwrap_or(1);
        let next_line = header_line + line_span(header_record.iter());
        let headers: Vec<String> = header_record
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        Ok(Box::new(CsvRows {
            records: reader.into_records(),
            headers,
            next_index: 0,
            next_line,
            finished: false,
        }))
    }
}

struct CsvRows {
    records: StringRecordsIntoIter<BufReader<UploadReader>>,
    headers: Vec<String>,
    next_index: usize,
    // 上一条记录之后的物理行号（csv 读取器会静默丢弃空行）
    next_line: u64,
    finished: bool,
}

impl CsvRows {
    /// 分配数据行号：被丢弃的空行同样占用行号
    ///
    /// # 参数
    /// - start_line: 记录起始物理行号（读取器未提供时按顺序递增）
    /// - span: 记录占用的物理行数（引号内换行会跨行）
    fn advance(&mut self, start_line: Option<u64>, span: u64) -> usize {
        let skipped = start_line
            .map(|line| line.saturating_sub(self.next_line))
            .unwrap_or(0);
        self.next_index += 1 + usize::try_from(skipped).unwrap_or(0);
        self.next_line = start_line.unwrap_or(self.next_line) + span;
        self.next_index
    }
}

/// 记录占用的物理行数
fn line_span<'a, I>(fields: I) -> u64
where
    I: Iterator<Item = &'a str>,
{
    1 + fields
        .map(|field| field.matches('\n').count() as u64)
        .sum::<u64>()
}

impl Iterator for CsvRows {
    type Item = ImportResult<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let result = self.records.next()?;

            let record = match result {
                Ok(record) => record,
                Err(err) if err.is_io_error() => {
                    self.finished = true;
                    return Some(Err(ImportError::from(err)));
                }
                Err(err) => {
                    let row_index = self.advance(err.position().map(|p| p.line()), 1);
                    return Some(Ok(ParsedRow::Malformed {
                        row_index,
                        reason: format!("row could not be decoded: {}", err),
                    }));
                }
            };

            let row_index = self.advance(
                record.position().map(|p| p.line()),
                line_span(record.iter()),
            );

            // 跳过完全空白的行
            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            if record.len() != self.headers.len() {
                return Some(Ok(ParsedRow::Malformed {
                    row_index,
                    reason: format!(
                        "row has {} fields but header has {}",
                        record.len(),
                        self.headers.len()
                    ),
                }));
            }

            let cells = self
                .headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.clone(), CellValue::Text(value.trim().to_string())))
                .collect();

            return Some(Ok(ParsedRow::Row(RawRow::new(row_index, cells))));
        }
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser {
    legacy_xls: bool,
}

impl ExcelParser {
    pub fn xlsx() -> Self {
        Self { legacy_xls: false }
    }

    pub fn xls() -> Self {
        Self { legacy_xls: true }
    }
}

impl FileParser for ExcelParser {
    fn open_rows(&self, reader: UploadReader) -> ImportResult<RowStream> {
        if self.legacy_xls {
            let workbook: Xls<UploadReader> =
                Xls::new(reader).map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
            first_sheet_rows(workbook)
        } else {
            let workbook: Xlsx<UploadReader> =
                Xlsx::new(reader).map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
            first_sheet_rows(workbook)
        }
    }
}

/// 读取第一个工作表并返回行序列
fn first_sheet_rows<W>(mut workbook: W) -> ImportResult<RowStream>
where
    W: Reader<UploadReader>,
    W::Error: Display,
{
    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("workbook has no worksheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    if range.is_empty() {
        return Err(ImportError::MissingHeader);
    }

    // 提取表头（第一行）
    let headers: Vec<String> = (0..range.width())
        .map(|col| {
            range
                .get((0, col))
                .map(|cell| cell.to_string().trim().to_string())
                .unwrap_or_default()
        })
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::MissingHeader);
    }

    tracing::debug!(
        sheet = %sheet_name,
        height = range.height(),
        width = range.width(),
        "工作表加载完成"
    );

    Ok(Box::new(SheetRows {
        range,
        headers,
        next_row: 1,
    }))
}

struct SheetRows {
    range: Range<Data>,
    headers: Vec<String>,
    next_row: usize,
}

impl Iterator for SheetRows {
    type Item = ImportResult<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_row < self.range.height() {
            let row = self.next_row;
            self.next_row += 1;

            let cells: Vec<(String, CellValue)> = self
                .headers
                .iter()
                .enumerate()
                .filter(|(_, header)| !header.is_empty())
                .filter_map(|(col, header)| {
                    self.range
                        .get((row, col))
                        .and_then(to_cell_value)
                        .map(|value| (header.clone(), value))
                })
                .collect();

            // 跳过完全空白的行（行号仍然占用，保持与工作表对齐）
            if cells.iter().all(|(_, v)| v.is_blank()) {
                continue;
            }

            return Some(Ok(ParsedRow::Row(RawRow::new(row, cells))));
        }
        None
    }
}

/// calamine 单元格 → CellValue（空单元格视为缺失）
fn to_cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::String(s) => Some(CellValue::Text(s.trim().to_string())),
        other => Some(CellValue::Text(other.to_string().trim().to_string())),
    }
}

// ==========================================
// 通用文件解析器（根据声明格式选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 按声明格式打开数据源
    ///
    /// # 说明
    /// - 空数据源直接返回 EmptyFile，不产生任何行
    pub fn open(&self, format: FileFormat, mut reader: UploadReader) -> ImportResult<RowStream> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        if len == 0 {
            return Err(ImportError::EmptyFile);
        }

        match format {
            FileFormat::Csv => CsvParser.open_rows(reader),
            FileFormat::Xlsx => ExcelParser::xlsx().open_rows(reader),
            FileFormat::Xls => ExcelParser::xls().open_rows(reader),
        }
    }

    /// 按文件扩展名打开磁盘文件
    pub fn open_path<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<(FileFormat, RowStream)> {
        let path = file_path.as_ref();
        let file_name = path.to_string_lossy();
        let format = FileFormat::from_file_name(&file_name).ok_or_else(|| {
            ImportError::UnsupportedFormat(
                path.extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_else(|| file_name.to_string()),
            )
        })?;

        let file = File::open(path)?;
        let rows = self.open(format, Box::new(file))?;
        Ok((format, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn csv_reader(content: &str) -> UploadReader {
        Box::new(Cursor::new(content.as_bytes().to_vec()))
    }

    fn collect(stream: RowStream) -> Vec<ParsedRow> {
        stream.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let rows = collect(
            UniversalFileParser
                .open(
                    FileFormat::Csv,
                    csv_reader("name,price,category_id\nMouse,25.50,1\nKeyboard,49.99,2\n"),
                )
                .unwrap(),
        );

        assert_eq!(rows.len(), 2);
        match &rows[0] {
            ParsedRow::Row(row) => {
                assert_eq!(row.row_index(), 1);
                assert_eq!(row.get("name"), Some(&CellValue::Text("Mouse".to_string())));
                assert_eq!(row.get("price"), Some(&CellValue::Text("25.50".to_string())));
            }
            other => panic!("Expected Row, got {:?}", other),
        }
        assert_eq!(rows[1].row_index(), 2);
    }

    #[test]
    fn test_csv_field_count_mismatch_is_row_level() {
        let rows = collect(
            UniversalFileParser
                .open(
                    FileFormat::Csv,
                    csv_reader("name,price,category_id\nMouse,25.50,1\nBroken,1\nPen,2,1\n"),
                )
                .unwrap(),
        );

        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], ParsedRow::Row(_)));
        match &rows[1] {
            ParsedRow::Malformed { row_index, reason } => {
                assert_eq!(*row_index, 2);
                assert!(reason.contains("2 fields"));
            }
            other => panic!("Expected Malformed, got {:?}", other),
        }
        assert!(matches!(rows[2], ParsedRow::Row(_)));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let rows = collect(
            UniversalFileParser
                .open(FileFormat::Csv, csv_reader("name,price\nA,1\n,\nB,2\n"))
                .unwrap(),
        );

        // 空白行被跳过，但行号保留
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_index(), 1);
        assert_eq!(rows[1].row_index(), 3);
    }

    #[test]
    fn test_csv_empty_lines_keep_row_numbers() {
        let rows = collect(
            UniversalFileParser
                .open(
                    FileFormat::Csv,
                    csv_reader("name,price,category_id\nA,1,1\n\nB,-1,1\n\n\nC,3,1\n"),
                )
                .unwrap(),
        );

        // 空行被读取器丢弃，行号仍与文件对齐
        let indexes: Vec<usize> = rows.iter().map(ParsedRow::row_index).collect();
        assert_eq!(indexes, vec![1, 3, 6]);
    }

    #[test]
    fn test_csv_quoted_newline_is_one_row() {
        let rows = collect(
            UniversalFileParser
                .open(
                    FileFormat::Csv,
                    csv_reader("name,price\n\"Desk\nLamp\",1\n\nPen,2\n"),
                )
                .unwrap(),
        );

        assert_eq!(rows.len(), 2);
        match &rows[0] {
            ParsedRow::Row(row) => {
                assert_eq!(row.row_index(), 1);
                assert_eq!(row.get("name"), Some(&CellValue::Text("Desk\nLamp".to_string())));
            }
            other => panic!("Expected Row, got {:?}", other),
        }
        assert_eq!(rows[1].row_index(), 3);
    }

    #[test]
    fn test_empty_file_is_format_error() {
        let err = UniversalFileParser
            .open(FileFormat::Csv, csv_reader(""))
            .err()
            .unwrap();
        assert!(matches!(err, ImportError::EmptyFile));

        let err = UniversalFileParser
            .open(FileFormat::Xlsx, csv_reader(""))
            .err()
            .unwrap();
        assert!(matches!(err, ImportError::EmptyFile));
    }

    #[test]
    fn test_blank_header_is_format_error() {
        let err = UniversalFileParser
            .open(FileFormat::Csv, csv_reader(" , \nA,1\n"))
            .err()
            .unwrap();
        assert!(matches!(err, ImportError::MissingHeader));
    }

    #[test]
    fn test_garbage_xlsx_is_format_error() {
        let err = UniversalFileParser
            .open(FileFormat::Xlsx, csv_reader("name,price\nnot,a workbook\n"))
            .err()
            .unwrap();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_open_path_checks_extension() {
        let mut temp_file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(temp_file, "name,price").unwrap();

        let err = UniversalFileParser.open_path(temp_file.path()).err().unwrap();
        assert!(matches!(err, ImportError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn test_open_path_csv() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "name,price,category_id").unwrap();
        writeln!(temp_file, "Mouse,25.50,1").unwrap();

        let (format, rows) = UniversalFileParser.open_path(temp_file.path()).unwrap();
        assert_eq!(format, FileFormat::Csv);
        assert_eq!(collect(rows).len(), 1);
    }

    #[test]
    fn test_open_path_file_not_found() {
        let result = UniversalFileParser.open_path(Path::new("non_existent.csv"));
        assert!(matches!(result.err(), Some(ImportError::FileReadError(_))));
    }

    #[test]
    fn test_non_utf8_row_is_row_level() {
        let mut bytes = b"name,price\nOk,1\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b',', b'1', b'\n']);
        bytes.extend_from_slice(b"Fine,2\n");

        let rows = collect(
            UniversalFileParser
                .open(FileFormat::Csv, Box::new(Cursor::new(bytes)))
                .unwrap(),
        );
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[1], ParsedRow::Malformed { row_index: 2, .. }));
        assert!(matches!(rows[2], ParsedRow::Row(_)));
    }

    #[test]
    fn test_named_temp_file_roundtrip() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "name\n").unwrap();
        let file = File::open(temp_file.path()).unwrap();
        let rows = collect(UniversalFileParser.open(FileFormat::Csv, Box::new(file)).unwrap());
        assert!(rows.is_empty());
    }
}
