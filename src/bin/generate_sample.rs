use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Product ids with a long tail: low ids are far more frequent.
fn product(rng: &mut SimpleRng) -> String {
    let r = rng.next_f64();
    let id = (r * r * r * 180.0) as u32;
    format!("SKU-{id:03}")
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West", "", "  "];
    let notes = [
        "",
        "restocked",
        "late delivery, customer notified",
        "damaged box, \"minor\"",
        "promo",
    ];

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;
    writer.write_record(["timestamp", "region", "product", "units", "price", "notes"])?;

    let n_rows = 5000;
    for i in 0..n_rows {
        let ts = start + Duration::minutes(37 * i as i64);
        let seasonal = 20.0 + 8.0 * (i as f64 / 240.0 * std::f64::consts::TAU).sin();
        let units = rng.gauss(seasonal, 4.0).max(0.0).round();
        // A handful of unparseable prices to exercise skipping.
        let price = if i % 250 == 17 {
            "n/a".to_string()
        } else {
            format!("{:.2}", rng.gauss(49.0, 12.0).abs())
        };

        writer.write_record([
            ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            rng.pick(&regions).to_string(),
            product(&mut rng),
            units.to_string(),
            price,
            rng.pick(&notes).to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {n_rows} rows to {output_path}");
    Ok(())
}
