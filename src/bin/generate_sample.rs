use anyhow::{Context, Result};
use serde::Serialize;

/// One CSV row; `duration_s` and `year` are left for the loader to derive.
#[derive(Serialize)]
struct TrackRow {
    id: String,
    name: String,
    popularity: u32,
    duration_ms: u64,
    release_date: String,
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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Typical track length in seconds for a release year: rising towards the
/// early nineties, then falling again.
fn typical_duration_s(year: i32) -> f64 {
    let t = f64::from(year - 1990);
    250.0 - 0.035 * t * t
}

/// Release dates come at year, month or day precision.
fn release_date(year: i32, rng: &mut SimpleRng) -> String {
    let month = rng.below(12) + 1;
    let day = rng.below(28) + 1;
    match rng.below(10) {
        0 => format!("{year}"),
        1 => format!("{year}-{month:02}"),
        _ => format!("{year}-{month:02}-{day:02}"),
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_tracks.csv".to_string());
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut row_id: u64 = 0;
    for year in 1950..=2020 {
        // More releases in later years.
        let per_year = 20 + (year - 1950) as u64 * 2;
        for _ in 0..per_year {
            let duration_s = rng.gauss(typical_duration_s(year), 45.0).max(30.0);
            let popularity = rng
                .gauss(f64::from(year - 1950) * 0.8 + 10.0, 12.0)
                .clamp(0.0, 100.0);

            writer
                .serialize(TrackRow {
                    id: format!("trk{row_id:06x}"),
                    name: format!("Track {row_id}"),
                    popularity: popularity.round() as u32,
                    duration_ms: (duration_s * 1000.0).round() as u64,
                    release_date: release_date(year, &mut rng),
                })
                .context("writing CSV row")?;
            row_id += 1;
        }
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {row_id} tracks to {output_path}");
    Ok(())
}
