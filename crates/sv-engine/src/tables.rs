//! Interpolation coefficient tables.
//!
//! Each table maps a fractional-phase row (see [`Phase::fractional_row`])
//! to the weights of one kernel's taps. Tables are computed once, in double
//! precision with `libm` so every platform gets the same bits, and are
//! read-only afterwards.
//!
//! [`Phase::fractional_row`]: sv_ir::Phase::fractional_row

use std::f64::consts::PI;
use std::sync::OnceLock;

use sv_ir::TABLE_ROWS;

/// Taps of the windowed-sinc kernel.
pub const SINC_TAPS: usize = 7;

/// Weights for `[sample[i], sample[i + 1]]`.
pub type LinearTable = [[f32; 2]; TABLE_ROWS];

/// Weights for `sample[i - 1..=i + 2]`.
pub type CubicTable = [[f32; 4]; TABLE_ROWS];

/// Weights for `sample[i - 3..=i + 3]`.
pub type SincTable = [[f32; SINC_TAPS]; TABLE_ROWS];

/// All coefficient tables.
pub struct InterpTables {
    pub linear: LinearTable,
    pub cubic: CubicTable,
    pub sinc7: SincTable,
}

static TABLES: OnceLock<InterpTables> = OnceLock::new();

/// Shared tables, computed on first use.
#[inline]
pub fn tables() -> &'static InterpTables {
    TABLES.get_or_init(InterpTables::compute)
}

/// Compute the tables now, so the first render does not pay for it.
pub fn init_tables() {
    let _ = tables();
}

impl InterpTables {
    fn compute() -> Self {
        log::debug!("computing interpolation tables ({} rows)", TABLE_ROWS);
        Self {
            linear: linear_table(),
            cubic: cubic_table(),
            sinc7: sinc_table(),
        }
    }
}

fn row_fraction(row: usize) -> f64 {
    row as f64 / TABLE_ROWS as f64
}

fn linear_table() -> LinearTable {
    let mut table = [[0.0; 2]; TABLE_ROWS];
    for (row, coeffs) in table.iter_mut().enumerate() {
        let x = row_fraction(row);
        *coeffs = [(1.0 - x) as f32, x as f32];
    }
    table
}

/// Catmull-Rom spline weights.
fn cubic_table() -> CubicTable {
    let mut table = [[0.0; 4]; TABLE_ROWS];
    for (row, coeffs) in table.iter_mut().enumerate() {
        let x = row_fraction(row);
        *coeffs = [
            (x * (-0.5 + x * (1.0 - 0.5 * x))) as f32,
            (1.0 + x * x * (1.5 * x - 2.5)) as f32,
            (x * (0.5 + x * (2.0 - 1.5 * x))) as f32,
            (0.5 * x * x * (x - 1.0)) as f32,
        ];
    }
    table
}

/// Hann-windowed sinc. Rows run backwards: the kernel sees the phase shifted
/// by half a sample, and row `r` holds the taps for offset `255 - r`.
fn sinc_table() -> SincTable {
    let mut table = [[0.0; SINC_TAPS]; TABLE_ROWS];
    let centre = SINC_TAPS as f64 / 2.0;
    for tap in 0..SINC_TAPS {
        for step in 0..TABLE_ROWS {
            let offset = tap as f64 - centre + row_fraction(step);
            let weight = if offset.abs() > 1e-6 {
                let arg = PI * offset;
                let window = 0.5 * (1.0 + libm::cos(2.0 * arg / SINC_TAPS as f64));
                libm::sin(arg) / arg * window
            } else {
                1.0
            };
            table[TABLE_ROWS - step - 1][tap] = weight as f32;
        }
    }
    table
}
