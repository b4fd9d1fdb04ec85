use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

/// Builders with their model lines as (model, typical length in metres, base price in EUR).
const CATALOGUE: &[(&str, &[(&str, f64, f64)])] = &[
    ("Beneteau", &[("Oceanis 40.1", 12.4, 260_000.0), ("First 24", 7.3, 70_000.0), ("Swift Trawler 41", 12.6, 520_000.0)]),
    ("Jeanneau", &[("Sun Odyssey 410", 12.3, 280_000.0), ("Merry Fisher 895", 8.5, 95_000.0)]),
    ("Sunseeker", &[("Predator 65", 20.2, 2_400_000.0), ("Manhattan 55", 17.2, 1_500_000.0)]),
    ("Princess", &[("F45", 14.6, 1_100_000.0), ("Y85", 26.2, 6_200_000.0)]),
    ("Hallberg-Rassy", &[("HR 44", 13.9, 780_000.0), ("HR 340", 10.3, 310_000.0)]),
    ("Lagoon", &[("42", 12.8, 560_000.0), ("Sixty 5", 19.6, 3_100_000.0)]),
];

const COUNTRIES: &[&str] = &["France", "Spain", "Italy", "Croatia", "Greece", "Netherlands"];
const VAT_STATUSES: &[&str] = &["VAT paid", "VAT not paid"];
const BOAT_COUNT: usize = 240;

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    id: String,
    builder: String,
    model: String,
    year_built: Option<i64>,
    length: Option<f64>,
    price_eur: Option<f64>,
    country: String,
    vat_status: String,
    is_sold: bool,
    last_seen_at: String,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    (0..BOAT_COUNT)
        .map(|i| {
            let (builder, models) = *rng.pick(CATALOGUE);
            let &(model, base_len, base_price) = rng.pick(models);
            let year = 1985 + (rng.next_u64() % 41) as i64;
            // Older boats trade at a discount; a little noise keeps the scatter honest.
            let age_factor = 1.0 - (2026 - year) as f64 * 0.02;
            let price = (base_price * age_factor.max(0.25) * rng.gauss(1.0, 0.12).max(0.4)).round();
            let length = ((base_len + rng.gauss(0.0, 0.15)) * 10.0).round() / 10.0;

            // A handful of listings arrive with gaps, as scraped records do.
            let missing = rng.next_f64();
            Row {
                id: format!("boat-{i:04}"),
                builder: builder.to_string(),
                model: model.to_string(),
                year_built: (missing > 0.03).then_some(year),
                length: (missing < 0.03 || missing > 0.06).then_some(length),
                price_eur: (missing < 0.06 || missing > 0.10).then_some(price),
                country: rng.pick(COUNTRIES).to_string(),
                vat_status: rng.pick(VAT_STATUSES).to_string(),
                is_sold: rng.next_f64() < 0.2,
                last_seen_at: format!(
                    "2026-{:02}-{:02}T{:02}:00:00Z",
                    1 + rng.next_u64() % 9,
                    1 + rng.next_u64() % 28,
                    rng.next_u64() % 24
                ),
            }
        })
        .collect()
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("builder", DataType::Utf8, false),
        Field::new("model", DataType::Utf8, false),
        Field::new("year_built", DataType::Int64, true),
        Field::new("length", DataType::Float64, true),
        Field::new("price_eur", DataType::Float64, true),
        Field::new("country", DataType::Utf8, true),
        Field::new("vat_status", DataType::Utf8, true),
        Field::new("is_sold", DataType::Boolean, false),
        Field::new("image_url", DataType::Utf8, true),
        Field::new("navinet_updated_at", DataType::Utf8, true),
        Field::new("last_seen_at", DataType::Utf8, true),
    ]));

    let strings = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let nulls = || -> ArrayRef { Arc::new(StringArray::from(vec![None::<&str>; rows.len()])) };

    let columns: Vec<ArrayRef> = vec![
        strings(|r| r.id.as_str()),
        strings(|r| r.builder.as_str()),
        strings(|r| r.model.as_str()),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.year_built).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.length).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.price_eur).collect::<Vec<_>>())),
        strings(|r| r.country.as_str()),
        strings(|r| r.vat_status.as_str()),
        Arc::new(BooleanArray::from(rows.iter().map(|r| r.is_sold).collect::<Vec<_>>())),
        nulls(),
        nulls(),
        strings(|r| r.last_seen_at.as_str()),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("Failed to create RecordBatch")?;
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn write_json(rows: &[Row], path: &str) -> Result<()> {
    let records: Vec<_> = rows
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "builder": r.builder,
                "model": r.model,
                "year_built": r.year_built,
                "length": r.length,
                "price_eur": r.price_eur,
                "country": r.country,
                "vat_status": r.vat_status,
                "is_sold": r.is_sold,
                "last_seen_at": r.last_seen_at,
            })
        })
        .collect();
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {path}"))?;
    serde_json::to_writer_pretty(file, &records).context("Failed to write JSON")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_parquet(&rows, "boats.parquet")?;
    write_json(&rows, "boats.json")?;

    let sold = rows.iter().filter(|r| r.is_sold).count();
    println!("Wrote {} listings ({sold} sold) to boats.parquet and boats.json", rows.len());
    Ok(())
}
