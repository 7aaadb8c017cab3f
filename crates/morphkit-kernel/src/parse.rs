//! Kernel description parsing
//!
//! A kernel description is one or more `;`-separated segments. Each segment
//! is either a named builtin or an explicit value array:
//!
//! ```text
//! Diamond:1                      named kernel with geometry arguments
//! Gaussian:0x2                   radius 0 (auto), sigma 2
//! 3x3+0+0: 1,1,- 1,0,- 1,-,0     array with size and origin header
//! 3>: 0,0,0 1,1,0 0,0,0          array expanded by 90 degree rotations
//! 0,1,0 1,1,1 0,1,0              bare list of n*n values
//! @kernel.txt                    read the description from a file
//! ```
//!
//! Array tokens are separated by spaces or commas; `nan` or `-` marks a
//! cell outside the neighborhood. A header flag `@` expands the kernel into
//! its 45 degree rotations, `>` into its 90 degree rotations and `<` into
//! its four mirror images.

use crate::builtin::KernelRegistry;
use crate::geometry::{GeometryFlags, parse_geometry};
use crate::kernel::{Kernel, KernelKind, KernelList, kernel_side};
use crate::{KernelError, KernelResult};

/// Parse a kernel description using the standard registry
///
/// # Errors
///
/// Returns `KernelError::InvalidSpec` if any segment is malformed (no
/// partial list is returned) and `KernelError::Io` if a `@file` cannot be
/// read.
///
/// # Examples
///
/// ```
/// use morphkit_kernel::parse_kernel_list;
///
/// let list = parse_kernel_list("Diamond:1; 3: -1,-1,-1 -1,8,-1 -1,-1,-1").unwrap();
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.first().width(), 3);
/// ```
pub fn parse_kernel_list(spec: &str) -> KernelResult<KernelList> {
    parse_kernel_list_with(KernelRegistry::standard(), spec)
}

/// Parse a kernel description, resolving names through `registry`
///
/// # Errors
///
/// Same as [`parse_kernel_list`].
pub fn parse_kernel_list_with(registry: &KernelRegistry, spec: &str) -> KernelResult<KernelList> {
    if let Some(path) = spec.strip_prefix('@') {
        let path = path.trim();
        let contents = std::fs::read_to_string(path).map_err(|source| KernelError::Io {
            path: path.to_string(),
            source,
        })?;
        tracing::debug!(path, "read kernel description from file");
        return parse_segments(registry, &contents);
    }
    parse_segments(registry, spec)
}

fn parse_segments(registry: &KernelRegistry, spec: &str) -> KernelResult<KernelList> {
    let mut result: Option<KernelList> = None;
    for segment in spec.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let list = if segment.starts_with(|c: char| c.is_ascii_alphabetic()) {
            let (name, args) = split_name(segment);
            registry.build(name, args)?
        } else {
            parse_array(segment)?
        };
        match result.as_mut() {
            Some(all) => all.extend(list),
            None => result = Some(list),
        }
    }
    result.ok_or_else(|| KernelError::spec(format!("no kernels in '{spec}'")))
}

/// Split `Name:args` into the name and its geometry argument text
fn split_name(segment: &str) -> (&str, &str) {
    let end = segment
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(segment.len());
    let (name, rest) = segment.split_at(end);
    let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == ':');
    (name, rest)
}

/// Expand a single kernel according to header flags
pub(crate) fn expand_by_flags(kernel: Kernel, flags: &GeometryFlags) -> KernelList {
    if flags.area {
        kernel.expand_rotate(45.0)
    } else if flags.greater {
        kernel.expand_rotate(90.0)
    } else if flags.less {
        kernel.expand_mirror()
    } else {
        KernelList::single(kernel)
    }
}

/// Parse one array segment, applying any expansion flag in its header
pub(crate) fn parse_array(segment: &str) -> KernelResult<KernelList> {
    let (kernel, flags) = parse_array_kernel(segment)?;
    Ok(expand_by_flags(kernel, &flags))
}

/// Parse one array segment into a single kernel and its header flags
pub(crate) fn parse_array_kernel(segment: &str) -> KernelResult<(Kernel, GeometryFlags)> {
    let segment = segment.trim().trim_matches('\'');

    let (width, height, origin_x, origin_y, body, flags) = match segment.split_once(':') {
        Some((header, body)) => {
            let args = parse_geometry(header)?;
            let mut rho = args.rho;
            let mut sigma = args.sigma;
            if !args.flags.rho {
                rho = sigma;
            }
            if rho < 1.0 {
                rho = 1.0;
            }
            if sigma < 1.0 {
                sigma = rho;
            }
            let width = kernel_side(rho)?;
            let height = kernel_side(sigma)?;
            if args.xi < 0.0 || args.psi < 0.0 {
                return Err(KernelError::spec(format!(
                    "negative origin in kernel header '{header}'"
                )));
            }
            let origin_x = if args.flags.xi {
                args.xi as usize
            } else {
                (width - 1) / 2
            };
            let origin_y = if args.flags.psi {
                args.psi as usize
            } else {
                (height - 1) / 2
            };
            (width, height, origin_x, origin_y, body, args.flags)
        }
        None => {
            let count = tokens(segment).count();
            let side = (count as f64).sqrt().round() as usize;
            if count == 0 || side * side != count {
                return Err(KernelError::spec(format!(
                    "{count} values do not form a square kernel"
                )));
            }
            let center = (side - 1) / 2;
            (side, side, center, center, segment, GeometryFlags::default())
        }
    };

    if origin_x >= width || origin_y >= height {
        return Err(KernelError::spec(format!(
            "origin +{origin_x}+{origin_y} outside {width}x{height} kernel"
        )));
    }

    let expected = width
        .checked_mul(height)
        .ok_or(KernelError::AllocationFailed)?;
    let mut values = Vec::new();
    values
        .try_reserve_exact(expected)
        .map_err(|_| KernelError::AllocationFailed)?;
    for token in tokens(body) {
        if values.len() == expected {
            return Err(KernelError::spec(format!(
                "too many values for a {width}x{height} kernel"
            )));
        }
        values.push(parse_token(token)?);
    }
    if values.len() < expected {
        return Err(KernelError::spec(format!(
            "only {} of {expected} values given for a {width}x{height} kernel",
            values.len()
        )));
    }

    let kernel = Kernel::new(
        KernelKind::UserDefined,
        width,
        height,
        origin_x,
        origin_y,
        values,
    )?;
    Ok((kernel, flags))
}

fn tokens(body: &str) -> impl Iterator<Item = &str> {
    body.split(|c: char| c.is_whitespace() || c == ',' || c == '\'')
        .filter(|t| !t.is_empty())
}

fn parse_token(token: &str) -> KernelResult<Option<f64>> {
    if token == "-" || token.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    token
        .parse::<f64>()
        .map(Some)
        .map_err(|_| KernelError::spec(format!("'{token}' is not a kernel value")))
}

impl std::str::FromStr for KernelList {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_kernel_list(s)
    }
}
