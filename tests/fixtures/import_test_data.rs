// ==========================================
// 导入演示数据到数据库
// ==========================================
// 用法: cargo run --bin import_test_data -- [db_path]
// 内容: 5 个分类 + 10 个演示商品（分类 1）
// ==========================================

use catalog_bulk::db::{init_schema, open_sqlite_connection};
use catalog_bulk::domain::{CategoryRef, FileFormat};
use catalog_bulk::importer::{BulkIngestor, Deadline};
use catalog_bulk::repository::{ProductRepositoryImpl, ProductStore};
use std::error::Error;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Books", "Home & Kitchen", "Sports"];

const DEMO_PRODUCTS: [(&str, &str); 10] = [
    ("Laptop Dell XPS 13", "1299.99"),
    ("iPhone 14 Pro", "999.99"),
    ("Samsung Galaxy S23", "899.99"),
    ("Sony WH-1000XM5", "349.99"),
    ("Apple Watch Series 8", "399.99"),
    ("MacBook Pro 16", "2499.99"),
    ("iPad Pro 12.9", "1099.99"),
    ("AirPods Pro", "249.99"),
    ("Gaming Mouse Logitech", "79.99"),
    ("Mechanical Keyboard", "149.99"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "catalog_bulk.db".to_string());
    println!("开始导入演示数据到数据库: {}", db_path);

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    // 清空现有数据
    println!("清空现有数据...");
    conn.execute("DELETE FROM products", [])?;
    conn.execute("DELETE FROM categories", [])?;
    conn.execute("DELETE FROM sqlite_sequence WHERE name IN ('products', 'categories')", [])
        .ok();

    let repo = Arc::new(ProductRepositoryImpl::from_connection(Arc::new(Mutex::new(conn))));

    println!("生成分类（{}个）...", CATEGORIES.len());
    for name in CATEGORIES {
        repo.create_category(name)?;
    }
    let categories: Vec<CategoryRef> = repo.list_categories().await?;
    let electronics = categories
        .iter()
        .find(|c| c.name == "Electronics")
        .map(|c| c.id)
        .ok_or("Electronics category missing")?;

    // 演示商品走正常批量导入流程
    println!("生成演示商品（{}个）...", DEMO_PRODUCTS.len());
    let mut csv = String::from("name,price,category_id\n");
    for (name, price) in DEMO_PRODUCTS {
        csv.push_str(&format!("{},{},{}\n", name, price, electronics));
    }

    let summary = BulkIngestor::new(repo.clone())
        .ingest(
            FileFormat::Csv,
            Box::new(Cursor::new(csv.into_bytes())),
            &Deadline::never(),
        )
        .await?;

    println!("✓ 数据导入完成！");
    println!("  - 分类: {} 个", categories.len());
    println!("  - 商品: {} 个（失败 {} 个）", summary.inserted, summary.failed);
    Ok(())
}
