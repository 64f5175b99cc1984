use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

const HEADER: [&str; 7] = [
    "product_id",
    "product_name",
    "category",
    "discounted_price",
    "actual_price",
    "discount_percentage",
    "rating",
];

/// (category path, typical list price in rupees)
const CATEGORIES: [(&str, f64); 9] = [
    ("Electronics|Mobiles&Accessories|Smartphones&BasicMobiles|Smartphones", 18000.0),
    ("Electronics|HomeTheater,TV&Video|Televisions|SmartTelevisions", 35000.0),
    ("Electronics|Headphones,Earbuds&Accessories|Headphones|In-Ear", 1500.0),
    ("Computers&Accessories|Accessories&Peripherals|Cables&Accessories|Cables", 600.0),
    ("Computers&Accessories|Accessories&Peripherals|Keyboards,Mice&InputDevices|Mice", 900.0),
    ("Home&Kitchen|Kitchen&HomeAppliances|SmallKitchenAppliances|MixerGrinders", 4500.0),
    ("Home&Kitchen|Heating,Cooling&AirQuality|RoomHeaters|FanHeaters", 2500.0),
    ("OfficeProducts|OfficePaperProducts|Paper|Stationery|Pens,Pencils&WritingSupplies", 250.0),
    ("Toys&Games|Arts&Crafts|Drawing&PaintingSupplies|ColouringPens&Markers", 400.0),
];

#[derive(Parser)]
#[command(about = "Write a deterministic sample product catalog as CSV and Parquet")]
struct Args {
    /// Output path without extension
    #[arg(default_value = "sample_catalog")]
    stem: PathBuf,

    /// Number of products
    #[arg(short, long, default_value_t = 300)]
    rows: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Indian digit grouping as used on the storefront: `₹1,23,456`.
fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{digits}");
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (a, b) = rest.split_at(rest.len() - 2);
        groups.push(b);
        rest = a;
    }
    groups.push(rest);
    groups.reverse();
    format!("₹{},{tail}", groups.join(","))
}

fn sample_rating(rng: &mut SimpleRng) -> String {
    match rng.pick(40) {
        0 => "|".to_string(),
        1 => String::new(),
        _ => format!("{:.1}", rng.range(3.0, 5.0)),
    }
}

fn generate(args: &Args) -> Vec<[String; 7]> {
    let mut rng = SimpleRng::new(args.seed);
    (0..args.rows)
        .map(|i| {
            let (category, typical) = CATEGORIES[rng.pick(CATEGORIES.len())];
            let actual = (typical * rng.range(0.4, 2.5)).round().max(99.0);
            let discount = rng.range(0.0, 0.9);
            let discounted = (actual * (1.0 - discount)).round();
            let pct = ((1.0 - discounted / actual) * 100.0).round();

            let leaf = category.rsplit('|').next().unwrap_or(category);
            [
                format!("B0{:08X}", rng.next_u64() as u32),
                format!("{leaf} #{i}"),
                category.to_string(),
                format_rupees(discounted as u64),
                format_rupees(actual as u64),
                format!("{pct}%"),
                sample_rating(&mut rng),
            ]
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[[String; 7]]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[[String; 7]]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        HEADER
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<ArrayRef> = (0..HEADER.len())
        .map(|col| {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|row| Some(row[col].as_str()).filter(|s| !s.is_empty()))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = generate(&args);

    let csv_path = args.stem.with_extension("csv");
    write_csv(&csv_path, &rows)?;

    let parquet_path = args.stem.with_extension("parquet");
    write_parquet(&parquet_path, &rows)?;

    log::info!("seed {} produced {} products", args.seed, rows.len());
    println!(
        "Wrote {} products to {} and {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupees_use_indian_grouping() {
        assert_eq!(format_rupees(399), "₹399");
        assert_eq!(format_rupees(1999), "₹1,999");
        assert_eq!(format_rupees(123456), "₹1,23,456");
        assert_eq!(format_rupees(12345678), "₹1,23,45,678");
    }

    #[test]
    fn generation_is_deterministic() {
        let args = Args {
            stem: PathBuf::from("unused"),
            rows: 50,
            seed: 7,
        };
        assert_eq!(generate(&args), generate(&args));
        assert_eq!(generate(&args).len(), 50);
    }
}
