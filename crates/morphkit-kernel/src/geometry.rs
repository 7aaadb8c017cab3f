//! Geometry argument parsing
//!
//! Named kernels, array headers and scale settings all take a geometry-style
//! argument string: up to four numbers `rho`, `sigma`, `xi`, `psi` plus
//! single-character flags.
//!
//! # Format
//!
//! ```text
//! rho [x|X|:|,|/ sigma] [(+|-|,|/|:) xi [(+|-|,|/|:) psi]] [flags]
//! ```
//!
//! Flags may appear anywhere and are removed before the numbers are read:
//! `%` percent, `!` aspect, `<` less, `>` greater, `@` area, `^` minimum.
//! Four plain numbers separated by spaces or commas are always read as
//! `rho sigma xi psi`.
//!
//! # Examples
//!
//! ```
//! use morphkit_kernel::geometry::parse_geometry;
//!
//! let g = parse_geometry("5x3+2-1").unwrap();
//! assert_eq!((g.rho, g.sigma, g.xi, g.psi), (5.0, 3.0, 2.0, -1.0));
//!
//! let g = parse_geometry("1,2@").unwrap();
//! assert!(g.flags.area && g.flags.sigma && !g.flags.xi);
//! ```

use crate::{KernelError, KernelResult};

/// Which values and modifier flags were present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryFlags {
    /// `rho` was given
    pub rho: bool,
    /// `sigma` was given
    pub sigma: bool,
    /// `xi` was given
    pub xi: bool,
    /// `psi` was given
    pub psi: bool,
    /// An `x` separator was seen
    pub separator: bool,
    /// `%`
    pub percent: bool,
    /// `!`
    pub aspect: bool,
    /// `<`
    pub less: bool,
    /// `>`
    pub greater: bool,
    /// `@`
    pub area: bool,
    /// `^`
    pub minimum: bool,
}

/// Parsed geometry arguments
///
/// Values that were not given are zero; check [`GeometryArgs::flags`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryArgs {
    pub rho: f64,
    pub sigma: f64,
    pub xi: f64,
    pub psi: f64,
    pub flags: GeometryFlags,
}

/// Length of the longest prefix of `s` that reads as a decimal number
fn number_prefix(s: &[u8]) -> usize {
    let mut i = 0;
    if matches!(s.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while s.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut digits = i - int_start;
    if s.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while s.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }
    if matches!(s.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(s.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while s.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

/// Read a number at the start of `s[pos..]`, returning it and the new position
fn read_number(s: &[u8], pos: usize) -> Option<(f64, usize)> {
    let rest = s.get(pos..)?;
    let len = number_prefix(rest);
    if len == 0 {
        return None;
    }
    let text = std::str::from_utf8(&rest[..len]).ok()?;
    text.parse::<f64>().ok().map(|v| (v, pos + len))
}

/// Try the plain `a b c d` / `a,b,c,d` form
fn parse_four(text: &str) -> Option<[f64; 4]> {
    let parts: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 4 {
        return None;
    }
    let mut out = [0.0; 4];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(out)
}

/// Read an optionally signed value introduced by `+`, `-`, `,`, `/` or `:`
///
/// Returns `None` if no value is introduced at `pos`.
fn signed_value(s: &[u8], mut pos: usize) -> Option<(Option<f64>, usize)> {
    if !matches!(s.get(pos), Some(b'+' | b'-' | b',' | b'/' | b':')) {
        return None;
    }
    if matches!(s.get(pos), Some(b',' | b'/' | b':')) {
        pos += 1;
    }
    let mut negative = false;
    while let Some(&c) = s.get(pos) {
        match c {
            b'-' => negative = !negative,
            b'+' => {}
            _ => break,
        }
        pos += 1;
    }
    match read_number(s, pos) {
        Some((v, end)) => Some((Some(if negative { -v } else { v }), end)),
        None => Some((None, pos)),
    }
}

/// Parse a geometry argument string
///
/// # Errors
///
/// Returns `KernelError::InvalidSpec` if the string holds characters that
/// cannot appear in a geometry, or if text remains after `psi`.
pub fn parse_geometry(text: &str) -> KernelResult<GeometryArgs> {
    let mut args = GeometryArgs::default();

    if let Some([rho, sigma, xi, psi]) = parse_four(text) {
        args.rho = rho;
        args.sigma = sigma;
        args.xi = xi;
        args.psi = psi;
        args.flags.rho = true;
        args.flags.sigma = true;
        args.flags.xi = true;
        args.flags.psi = true;
        return Ok(args);
    }

    let mut body = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_whitespace() => {}
            '%' => args.flags.percent = true,
            '!' => args.flags.aspect = true,
            '<' => args.flags.less = true,
            '>' => args.flags.greater = true,
            '@' => args.flags.area = true,
            '^' => args.flags.minimum = true,
            '#' | '(' | ')' => {}
            'x' | 'X' => {
                args.flags.separator = true;
                body.push(c as u8);
            }
            '0'..='9' | '+' | '-' | ',' | '.' | '/' | ':' | 'e' | 'E' => body.push(c as u8),
            other => {
                return Err(KernelError::spec(format!(
                    "unexpected character '{other}' in geometry '{text}'"
                )));
            }
        }
    }

    let s = body.as_slice();
    let mut pos = 0;

    // rho: a leading number directly followed by a separator or the end
    let len = number_prefix(s);
    if len > 0 && matches!(s.get(len), None | Some(b'x' | b'X' | b':' | b',' | b'/')) {
        if let Some((v, end)) = read_number(s, 0) {
            args.rho = v;
            args.flags.rho = true;
            pos = end;
        }
    }

    // sigma
    if let Some(&sep) = s.get(pos) {
        if matches!(sep, b'x' | b'X' | b':' | b',' | b'/') {
            pos += 1;
            let dimension_sep = matches!(sep, b'x' | b'X' | b':');
            let signed_next = matches!(s.get(pos), Some(b'+' | b'-'));
            if !dimension_sep || !signed_next {
                if let Some((v, end)) = read_number(s, pos) {
                    args.sigma = v;
                    args.flags.sigma = true;
                    pos = end;
                }
            }
        }
    }

    // xi, then psi
    if let Some((value, end)) = signed_value(s, pos) {
        pos = end;
        if let Some(v) = value {
            args.xi = v;
            args.flags.xi = true;
        }
        if let Some((value, end)) = signed_value(s, pos) {
            pos = end;
            if let Some(v) = value {
                args.psi = v;
                args.flags.psi = true;
            }
        }
    }

    if pos < s.len() {
        return Err(KernelError::spec(format!(
            "unexpected text '{}' in geometry '{text}'",
            String::from_utf8_lossy(&s[pos..])
        )));
    }
    Ok(args)
}
