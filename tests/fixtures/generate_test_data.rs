// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成批量上传压力测试文件（CSV + XLSX，各 10000 行）
// 输出: tests/fixtures/datasets/*
// ==========================================

use catalog_bulk::exporter::{XlsxCell, XlsxDocumentWriter};
use csv::Writer;
use std::error::Error;
use std::fs::{self, File};

const NUM_PRODUCTS: usize = 10_000;
const OUTPUT_DIR: &str = "tests/fixtures/datasets";

// 上传文件表头
const UPLOAD_HEADER: [&str; 4] = ["name", "price", "category_id", "image"];

const ADJECTIVES: [&str; 21] = [
    "Premium", "Professional", "Advanced", "Ultimate", "Deluxe", "Standard", "Basic", "Pro",
    "Elite", "Superior", "Enhanced", "Modern", "Classic", "Digital", "Smart", "Wireless",
    "Portable", "Compact", "Heavy-Duty", "Industrial", "Commercial",
];

const PRODUCT_TYPES: [&str; 20] = [
    "Laptop", "Phone", "Tablet", "Monitor", "Keyboard", "Mouse", "Headphones", "Speaker",
    "Camera", "Printer", "Scanner", "Router", "Switch", "Charger", "Cable", "Adapter", "Webcam",
    "Microphone", "Controller", "Console",
];

const BRANDS: [&str; 11] = [
    "TechPro", "DigiCorp", "SmartTech", "ElectroMax", "GadgetHub", "TechVision", "DigitalWave",
    "ProElectronics", "MegaTech", "UltraGadget", "InnovateTech",
];

// 上传记录
struct UploadRecord {
    name: String,
    price: String,
    category_id: String,
}

// 按序号确定性生成（同一序号总是得到同一商品）
fn generate_record(index: usize) -> UploadRecord {
    let brand = BRANDS[index % BRANDS.len()];
    let adjective = ADJECTIVES[(index / 3) % ADJECTIVES.len()];
    let product_type = PRODUCT_TYPES[(index / 7) % PRODUCT_TYPES.len()];
    let model = 1000 + (index * 7919) % 9000;
    // 10.00 ~ 4999.99
    let cents = 1000 + (index * 104_729) % 499_000;

    UploadRecord {
        name: format!("{} {} {} {}", brand, adjective, product_type, model),
        price: format!("{}.{:02}", cents / 100, cents % 100),
        category_id: "1".to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成批量上传测试文件...");
    fs::create_dir_all(OUTPUT_DIR)?;

    generate_csv()?;
    generate_xlsx()?;

    println!("✓ 所有测试文件生成完成！");
    println!("  使用前请确认分类 1 (Electronics) 已存在: cargo run --bin import_test_data");
    Ok(())
}

fn generate_csv() -> Result<(), Box<dyn Error>> {
    let path = format!("{}/products-bulk-{}.csv", OUTPUT_DIR, NUM_PRODUCTS);
    let mut wtr = Writer::from_writer(File::create(&path)?);
    wtr.write_record(UPLOAD_HEADER)?;

    for i in 0..NUM_PRODUCTS {
        let record = generate_record(i);
        wtr.write_record([record.name.as_str(), record.price.as_str(), record.category_id.as_str(), ""])?;
    }

    wtr.flush()?;
    println!("✓ 生成 {} ({}条)", path, NUM_PRODUCTS);
    Ok(())
}

fn generate_xlsx() -> Result<(), Box<dyn Error>> {
    let path = format!("{}/products-bulk-{}.xlsx", OUTPUT_DIR, NUM_PRODUCTS);
    let mut sheet = XlsxDocumentWriter::with_header(&UPLOAD_HEADER);

    for i in 0..NUM_PRODUCTS {
        let record = generate_record(i);
        sheet.push_row(&[
            XlsxCell::Text(&record.name),
            XlsxCell::Number(&record.price),
            XlsxCell::Number(&record.category_id),
        ]);
    }

    sheet.finish(File::create(&path)?)?;
    println!(
        "✓ 生成 {} ({}条, {:.2} MB)",
        path,
        NUM_PRODUCTS,
        fs::metadata(&path)?.len() as f64 / 1024.0 / 1024.0
    );
    Ok(())
}
