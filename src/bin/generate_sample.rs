//! Writes a deterministic synthetic employee table as `employees.parquet`
//! and `employees.csv`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const EMPLOYEES: i64 = 1470;

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
        items[(self.next_f64() * items.len() as f64) as usize % items.len()]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmployeeRow {
    #[serde(rename = "EmployeeID")]
    employee_id: i64,
    age: i64,
    attrition: &'static str,
    department: &'static str,
    education: &'static str,
    gender: &'static str,
    job_level: &'static str,
    job_role: &'static str,
    monthly_income: i64,
    total_working_years: i64,
    years_at_company: i64,
}

const DEPARTMENTS: [(&str, &[&str]); 3] = [
    ("Sales", &["Sales Executive", "Sales Representative", "Manager"]),
    (
        "Research & Development",
        &["Research Scientist", "Laboratory Technician", "Research Director", "Manager"],
    ),
    ("Human Resources", &["Human Resources", "Manager"]),
];

const EDUCATION: [&str; 5] = ["Below College", "College", "Bachelor", "Master", "Doctor"];
const LEVELS: [&str; 5] = ["Entry-level", "Junior", "Mid-level", "Senior", "Executive"];

fn generate(rng: &mut SimpleRng) -> Vec<EmployeeRow> {
    (1..=EMPLOYEES)
        .map(|employee_id| {
            let dept_roll = rng.next_f64();
            let (department, roles) = if dept_roll < 0.3 {
                DEPARTMENTS[0]
            } else if dept_roll < 0.95 {
                DEPARTMENTS[1]
            } else {
                DEPARTMENTS[2]
            };
            let job_role = rng.pick(roles);

            let age = rng.gauss(37.0, 9.0).clamp(18.0, 60.0).round() as i64;
            let total_working_years =
                (rng.gauss((age - 18) as f64 * 0.6, 4.0)).clamp(0.0, (age - 18) as f64).round() as i64;
            let years_at_company = (total_working_years as f64 * rng.next_f64()).round() as i64;

            let level_idx = ((total_working_years as f64 / 8.0) + rng.gauss(0.0, 0.7))
                .round()
                .clamp(0.0, 4.0) as usize;
            // A few rows carry labels outside the known set.
            let job_level = if rng.chance(0.01) { "Intern" } else { LEVELS[level_idx] };

            let monthly_income =
                (rng.gauss(2500.0 + level_idx as f64 * 3800.0, 900.0)).max(1000.0).round() as i64;

            let attrition_p = if years_at_company < 3 { 0.3 } else { 0.1 };
            EmployeeRow {
                employee_id,
                age,
                attrition: if rng.chance(attrition_p) { "Yes" } else { "No" },
                department,
                education: rng.pick(&EDUCATION),
                gender: if rng.chance(0.4) { "Female" } else { "Male" },
                job_level,
                job_role,
                monthly_income,
                total_working_years,
                years_at_company,
            }
        })
        .collect()
}

fn write_parquet(rows: &[EmployeeRow], path: &str) -> Result<()> {
    let int_col = |f: fn(&EmployeeRow) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let str_col = |f: fn(&EmployeeRow) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("EmployeeID", DataType::Int64, false),
        Field::new("Age", DataType::Int64, false),
        Field::new("Attrition", DataType::Utf8, false),
        Field::new("Department", DataType::Utf8, false),
        Field::new("Education", DataType::Utf8, false),
        Field::new("Gender", DataType::Utf8, false),
        Field::new("JobLevel", DataType::Utf8, false),
        Field::new("JobRole", DataType::Utf8, false),
        Field::new("MonthlyIncome", DataType::Int64, false),
        Field::new("TotalWorkingYears", DataType::Int64, false),
        Field::new("YearsAtCompany", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            int_col(|r| r.employee_id),
            int_col(|r| r.age),
            str_col(|r| r.attrition),
            str_col(|r| r.department),
            str_col(|r| r.education),
            str_col(|r| r.gender),
            str_col(|r| r.job_level),
            str_col(|r| r.job_role),
            int_col(|r| r.monthly_income),
            int_col(|r| r.total_working_years),
            int_col(|r| r.years_at_company),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(rows: &[EmployeeRow], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_parquet(&rows, "employees.parquet")?;
    write_csv(&rows, "employees.csv")?;

    log::info!("Wrote {} employees to employees.parquet and employees.csv", rows.len());
    println!("Wrote {} employees to employees.parquet and employees.csv", rows.len());
    Ok(())
}
