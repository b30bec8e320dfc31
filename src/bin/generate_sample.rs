use serde::Serialize;

/// One row of the synthetic `vehicles_us.csv`.
#[derive(Serialize)]
struct Ad {
    price: Option<u32>,
    model_year: String,
    model: &'static str,
    condition: &'static str,
    fuel: &'static str,
    odometer: Option<u32>,
    transmission: &'static str,
    #[serde(rename = "type")]
    body_type: &'static str,
    paint_color: Option<&'static str>,
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

// (model, body type, base price in USD)
const MODELS: [(&str, &str, f64); 8] = [
    ("ford f-150", "pickup", 32000.0),
    ("chevrolet silverado", "truck", 34000.0),
    ("toyota camry", "sedan", 24000.0),
    ("honda civic", "sedan", 21000.0),
    ("jeep grand cherokee", "SUV", 36000.0),
    ("subaru outback", "wagon", 28000.0),
    ("nissan frontier", "pickup", 27000.0),
    ("hyundai elantra", "sedan", 18000.0),
];
const CONDITIONS: [(&str, f64); 5] = [
    ("new", 1.15),
    ("like new", 1.05),
    ("excellent", 1.0),
    ("good", 0.85),
    ("fair", 0.6),
];
const FUELS: [&str; 4] = ["gas", "gas", "diesel", "hybrid"];
const TRANSMISSIONS: [&str; 3] = ["automatic", "automatic", "manual"];
const COLORS: [&str; 6] = ["white", "black", "silver", "red", "blue", "grey"];

const CURRENT_YEAR: i32 = 2024;
const ROWS: usize = 5000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SimpleRng::new(42);
    let output_path = "vehicles_us.csv";
    let mut writer = csv::Writer::from_path(output_path)?;

    for _ in 0..ROWS {
        let (model, body_type, base) = rng.pick(&MODELS);
        let (condition, factor) = rng.pick(&CONDITIONS);
        let age = (rng.next_f64() * 25.0) as i32;
        let miles = (age as f64 * 12000.0 + rng.gauss(0.0, 15000.0)).max(0.0);

        // value decays with age and mileage
        let price = base * factor * 0.88f64.powi(age) * (1.0 - miles / 600_000.0).max(0.2)
            + rng.gauss(0.0, 1500.0);

        // a few rows exercise the loader's cleaning rules
        let roll = rng.next_f64();
        let model_year = if roll < 0.03 {
            String::new()
        } else if roll < 0.05 {
            format!("{}.0", CURRENT_YEAR - age)
        } else {
            (CURRENT_YEAR - age).to_string()
        };

        writer.serialize(Ad {
            price: (rng.next_f64() > 0.02).then(|| price.max(1.0) as u32),
            model_year,
            model,
            condition,
            fuel: rng.pick(&FUELS),
            odometer: (rng.next_f64() > 0.05).then(|| miles as u32),
            transmission: rng.pick(&TRANSMISSIONS),
            body_type,
            paint_color: (rng.next_f64() > 0.15).then(|| rng.pick(&COLORS)),
        })?;
    }
    writer.flush()?;

    println!("Wrote {ROWS} listings to {output_path}");
    Ok(())
}
