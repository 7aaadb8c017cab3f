//! Human-readable kernel dump
//!
//! ```text
//! Kernel "Diamond" of size 3x3+1+1 with values from 1 to 1
//! Forming a output range from 0 to 5 (Sum 5)
//!  0:       nan         1       nan
//!  1:         1         1         1
//!  2:       nan         1       nan
//! ```
//!
//! Lists with more than one kernel number each entry (`Kernel #0 ...`).

use std::fmt;

use crate::kernel::{Kernel, KernelList};
use morphkit_core::EPSILON;

/// Significant digits in the dump
const PRECISION: usize = 6;

/// Format like C's `%.{precision}g`
pub(crate) fn format_g(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn write_kernel(f: &mut fmt::Formatter<'_>, kernel: &Kernel, index: Option<usize>) -> fmt::Result {
    f.write_str("Kernel")?;
    if let Some(index) = index {
        write!(f, " #{index}")?;
    }
    write!(f, " \"{}", kernel.kind())?;
    if kernel.angle().abs() >= EPSILON {
        write!(f, "@{}", format_g(kernel.angle(), PRECISION))?;
    }
    let stats = kernel.stats();
    writeln!(
        f,
        "\" of size {}x{}+{}+{} with values from {} to {}",
        kernel.width(),
        kernel.height(),
        kernel.origin_x(),
        kernel.origin_y(),
        format_g(stats.minimum, PRECISION),
        format_g(stats.maximum, PRECISION)
    )?;
    write!(
        f,
        "Forming a output range from {} to {}",
        format_g(stats.negative_range, PRECISION),
        format_g(stats.positive_range, PRECISION)
    )?;
    if stats.is_zero_summing() {
        writeln!(f, " (Zero-Summing)")?;
    } else if stats.is_normalized() {
        writeln!(f, " (Normalized)")?;
    } else {
        writeln!(f, " (Sum {})", format_g(stats.sum(), PRECISION))?;
    }
    for (y, row) in kernel.values().chunks(kernel.width()).enumerate() {
        write!(f, "{y:>2}:")?;
        for cell in row {
            let text = match cell {
                Some(v) => format_g(*v, PRECISION),
                None => "nan".to_string(),
            };
            write!(f, " {text:>width$}", width = PRECISION + 3)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_kernel(f, self, None)
    }
}

impl fmt::Display for KernelList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbered = self.len() > 1;
        for (i, kernel) in self.iter().enumerate() {
            write_kernel(f, kernel, numbered.then_some(i))?;
        }
        Ok(())
    }
}
