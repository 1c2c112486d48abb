//! Format-directed argument scanning.
//!
//! Handlers read their arguments by matching the remaining input against a
//! directive string:
//!
//! - literal text must match byte for byte;
//! - whitespace in the directive skips any amount of input whitespace, and
//!   the start of every directive skips leading input whitespace;
//! - `%d`, `%u`, `%x`, `%o`, `%b` extract signed decimal, unsigned decimal,
//!   hex, octal and binary integers; `%%` matches a literal `%`;
//! - `w` (4 bytes), `l`, `ll` and `L` (8 bytes) select the destination
//!   width, which is otherwise 4 bytes;
//! - `%D` and `%X` read the width from a [`ScanArg::Width`] passed right
//!   before the destination.
//!
//! A scan either succeeds completely, committing every extracted value and
//! leaving the cursor after the consumed input, or fails without writing
//! anything and with the cursor back where the call started. Integer
//! overflow is an ordinary mismatch.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::{ParseContext, unformat};
//!
//! let mut ctx = ParseContext::new("id 42 range 100-200");
//! let mut id = 0i32;
//! assert!(unformat!(ctx, "id %d", &mut id));
//! assert_eq!(id, 42);
//!
//! let (mut lo, mut hi) = (0u32, 0u32);
//! assert!(unformat!(ctx, "range %u-%u", &mut lo, &mut hi));
//! assert_eq!((lo, hi), (100, 200));
//! assert!(ctx.at_end());
//! ```

use tracing::warn;

use crate::context::{ParseContext, is_white_space};

const DEFAULT_WIDTH: usize = 4;

/// One argument bound to a directive: an integer destination or an explicit
/// width for `%D` / `%X`.
#[derive(Debug)]
pub enum ScanArg<'a> {
    /// Destination width in bytes for the next capital conversion.
    Width(usize),
    I8(&'a mut i8),
    U8(&'a mut u8),
    I16(&'a mut i16),
    U16(&'a mut u16),
    I32(&'a mut i32),
    U32(&'a mut u32),
    I64(&'a mut i64),
    U64(&'a mut u64),
}

impl ScanArg<'_> {
    /// Storage width of a destination in bytes, `None` for [`ScanArg::Width`].
    pub fn dest_width(&self) -> Option<usize> {
        match self {
            Self::Width(_) => None,
            Self::I8(_) | Self::U8(_) => Some(1),
            Self::I16(_) | Self::U16(_) => Some(2),
            Self::I32(_) | Self::U32(_) => Some(4),
            Self::I64(_) | Self::U64(_) => Some(8),
        }
    }

    // Two's complement truncation to the destination width.
    fn store(&mut self, raw: u64) {
        match self {
            Self::Width(_) => {}
            Self::I8(v) => **v = raw as i8,
            Self::U8(v) => **v = raw as u8,
            Self::I16(v) => **v = raw as i16,
            Self::U16(v) => **v = raw as u16,
            Self::I32(v) => **v = raw as i32,
            Self::U32(v) => **v = raw as u32,
            Self::I64(v) => **v = raw as i64,
            Self::U64(v) => **v = raw,
        }
    }
}

macro_rules! scan_arg_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a mut $ty> for ScanArg<'a> {
                fn from(value: &'a mut $ty) -> Self {
                    ScanArg::$variant(value)
                }
            }
        )*
    };
}

scan_arg_from! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
}

/// Matches the remaining input of a context against a directive.
///
/// Arguments may be any `&mut` integer destination or a [`ScanArg`].
///
/// ```
/// use cmdtree_core::{ParseContext, ScanArg, unformat};
///
/// let mut ctx = ParseContext::new("mtu 1500");
/// let mut mtu = 0u16;
/// assert!(unformat!(ctx, "mtu %D", ScanArg::Width(2), &mut mtu));
/// assert_eq!(mtu, 1500);
/// ```
#[macro_export]
macro_rules! unformat {
    ($ctx:expr, $directive:expr $(, $arg:expr)* $(,)?) => {
        $ctx.unformat($directive, &mut [$($crate::ScanArg::from($arg)),*])
    };
}

/// Value of `byte` as a digit in `base`, if it is one.
///
/// Letters continue after `9`. Up to base 36 letters are case-insensitive;
/// above it upper case follows lower case, then `/` and `?` complete the
/// base-64 alphabet.
pub fn digit_value(byte: u8, base: u32) -> Option<u32> {
    let digit = match byte {
        b'0'..=b'9' => u32::from(byte - b'0'),
        b'a'..=b'z' => 10 + u32::from(byte - b'a'),
        b'A'..=b'Z' if base > 36 => 36 + u32::from(byte - b'A'),
        b'A'..=b'Z' => 10 + u32::from(byte - b'A'),
        b'/' => 62,
        b'?' => 63,
        _ => return None,
    };
    (digit < base).then_some(digit)
}

/// Reads an integer in `base` for a destination of `width` bytes.
///
/// Returns the two's complement bit pattern of the value. A leading `-` is
/// only accepted when `signed`; a `-` or `+` after the first character ends
/// the value. The value must fit the width (as a signed or unsigned integer
/// depending on `signed`), otherwise the read fails.
pub(crate) fn parse_integer(
    ctx: &mut ParseContext,
    base: u32,
    signed: bool,
    width: usize,
) -> Option<u64> {
    if !(2..=64).contains(&base) || !matches!(width, 1 | 2 | 4 | 8) {
        return None;
    }

    let mut magnitude: u64 = 0;
    let mut n_digits = 0usize;
    let mut n_input = 0usize;
    let mut negative = false;

    while let Some(byte) = ctx.next_byte() {
        match byte {
            b'-' | b'+' if n_input > 0 => {
                ctx.unread();
                break;
            }
            b'-' => {
                if !signed {
                    return None;
                }
                negative = true;
                n_input += 1;
                continue;
            }
            b'+' => {
                n_input += 1;
                continue;
            }
            _ => {}
        }

        let Some(digit) = digit_value(byte, base) else {
            ctx.unread();
            break;
        };
        magnitude = magnitude
            .checked_mul(u64::from(base))?
            .checked_add(u64::from(digit))?;
        n_digits += 1;
        n_input += 1;
    }

    if n_digits == 0 {
        return None;
    }

    let bits = (width * 8) as u32;
    let limit: u128 = match (signed, negative) {
        (false, _) => (1u128 << bits) - 1,
        (true, false) => (1u128 << (bits - 1)) - 1,
        (true, true) => 1u128 << (bits - 1),
    };
    if u128::from(magnitude) > limit {
        return None;
    }

    Some(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    })
}

struct Scanner<'s, 'a> {
    args: &'s mut [ScanArg<'a>],
    next_arg: usize,
    pending: Vec<(usize, u64)>,
}

impl Scanner<'_, '_> {
    fn run(&mut self, ctx: &mut ParseContext, fmt: &[u8]) -> bool {
        let mut f = 0;
        loop {
            let at_start = f == 0;
            let mut skip_white_space = at_start;
            let mut conversion = false;
            let cf = fmt.get(f).copied();

            match cf {
                Some(c) if is_white_space(c) => {
                    skip_white_space = true;
                    while fmt.get(f).is_some_and(|c| is_white_space(*c)) {
                        f += 1;
                    }
                }
                Some(b'%') => {
                    f += 1;
                    match fmt.get(f) {
                        None => return false,
                        Some(b'%') => {}
                        Some(_) => conversion = true,
                    }
                }
                _ => {}
            }

            let skipped = if skip_white_space {
                ctx.skip_whitespace()
            } else {
                0
            };

            if cf.is_none() {
                // An empty directive only matches leading whitespace.
                return !(at_start && skipped == 0);
            }

            if conversion {
                match self.conversion(ctx, fmt, f) {
                    Some(next) => f = next,
                    None => return false,
                }
            } else if cf == Some(b'%') {
                if ctx.next_byte() != Some(b'%') {
                    return false;
                }
                f += 1;
            } else {
                while let Some(&c) = fmt.get(f) {
                    if c == b'%' || is_white_space(c) {
                        break;
                    }
                    f += 1;
                    if ctx.next_byte() != Some(c) {
                        return false;
                    }
                }
            }
        }
    }

    // `f` points just past the `%`; returns the index after the conversion.
    fn conversion(&mut self, ctx: &mut ParseContext, fmt: &[u8], mut f: usize) -> Option<usize> {
        let mut next = || {
            let c = fmt.get(f).copied();
            f += 1;
            c
        };

        let mut width = None;
        let mut cf = next()?;
        match cf {
            b'w' => {
                cf = next()?;
                width = Some(4);
            }
            b'l' => {
                cf = next()?;
                if cf == b'l' {
                    cf = next()?;
                }
                width = Some(8);
            }
            b'L' => {
                cf = next()?;
                width = Some(8);
            }
            _ => {}
        }

        let (base, signed) = match cf {
            b'D' => {
                width = Some(self.take_width()?);
                (10, true)
            }
            b'd' => (10, true),
            b'u' => (10, false),
            b'b' => (2, false),
            b'o' => (8, false),
            b'X' => {
                width = Some(self.take_width()?);
                (16, false)
            }
            b'x' => (16, false),
            other => {
                warn!(conversion = %char::from(other), "Unsupported scan conversion");
                return None;
            }
        };

        let width = width.unwrap_or(DEFAULT_WIDTH);
        let value = parse_integer(ctx, base, signed, width)?;
        let slot = self.take_destination(width)?;
        self.pending.push((slot, value));
        Some(f)
    }

    fn take_width(&mut self) -> Option<usize> {
        match self.args.get(self.next_arg) {
            Some(ScanArg::Width(width)) => {
                self.next_arg += 1;
                Some(*width)
            }
            other => {
                warn!(index = self.next_arg, arg = ?other, "Expected a width argument");
                None
            }
        }
    }

    fn take_destination(&mut self, width: usize) -> Option<usize> {
        let index = self.next_arg;
        match self.args.get(index).and_then(ScanArg::dest_width) {
            Some(dest) if dest == width => {
                self.next_arg += 1;
                Some(index)
            }
            found => {
                warn!(
                    index,
                    expected = width,
                    found = ?found,
                    "Scan destination does not match directive width"
                );
                None
            }
        }
    }

    fn commit(self) {
        for (slot, value) in self.pending {
            self.args[slot].store(value);
        }
    }
}

impl ParseContext {
    /// Matches the remaining input against `directive`, binding extracted
    /// values to `args` in order.
    ///
    /// See the crate documentation for the directive
    /// language. Prefer the [`unformat!`](crate::unformat) macro at call
    /// sites.
    pub fn unformat(&mut self, directive: &str, args: &mut [ScanArg<'_>]) -> bool {
        let start = self.position();
        let mut scanner = Scanner {
            args,
            next_arg: 0,
            pending: Vec::new(),
        };

        if scanner.run(self, directive.as_bytes()) {
            scanner.commit();
            true
        } else {
            self.set_position(start);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unformat;

    #[test]
    fn test_literal_then_decimal() {
        let mut ctx = ParseContext::new("id 42");
        let mut id = -1i32;
        assert!(unformat!(ctx, "id %d", &mut id));
        assert_eq!(id, 42);
        assert!(ctx.at_end());
    }

    #[test]
    fn test_value_stops_at_non_digit() {
        let mut ctx = ParseContext::new("id 42x");
        let mut id = -1i32;
        assert!(unformat!(ctx, "id %d", &mut id));
        assert_eq!(id, 42);
        assert_eq!(ctx.remaining(), "x");
    }

    #[test]
    fn test_literal_mismatch_restores_cursor() {
        let mut ctx = ParseContext::new("idx 42");
        let mut id = -1i32;
        assert!(!unformat!(ctx, "id %d", &mut id));
        assert_eq!(id, -1);
        assert_eq!(ctx.position(), 0);
    }

    #[test]
    fn test_failure_after_partial_extraction_writes_nothing() {
        let mut ctx = ParseContext::new("a 1 b x");
        let (mut a, mut b) = (0i32, 0i32);
        assert!(!unformat!(ctx, "a %d b %d", &mut a, &mut b));
        assert_eq!((a, b), (0, 0));
        assert_eq!(ctx.position(), 0);
    }

    #[test]
    fn test_restores_to_call_start_not_line_start() {
        let mut ctx = ParseContext::new("show 5 frob");
        assert!(unformat!(ctx, "show"));
        let before = ctx.position();
        let mut n = 0i32;
        assert!(!unformat!(ctx, "%d frob %d", &mut n));
        assert_eq!(ctx.position(), before);
    }

    #[test]
    fn test_signs() {
        let mut ctx = ParseContext::new("-17");
        let mut v = 0i32;
        assert!(unformat!(ctx, "%d", &mut v));
        assert_eq!(v, -17);

        let mut ctx = ParseContext::new("+17");
        assert!(unformat!(ctx, "%d", &mut v));
        assert_eq!(v, 17);

        let mut ctx = ParseContext::new("-17");
        let mut u = 0u32;
        assert!(!unformat!(ctx, "%u", &mut u));
        assert_eq!(ctx.position(), 0);

        let mut ctx = ParseContext::new("-");
        assert!(!unformat!(ctx, "%d", &mut v));
    }

    #[test]
    fn test_dash_after_digits_ends_value() {
        let mut ctx = ParseContext::new("100-200");
        let (mut lo, mut hi) = (0i32, 0i32);
        assert!(unformat!(ctx, "%d-%d", &mut lo, &mut hi));
        assert_eq!((lo, hi), (100, 200));
    }

    #[test]
    fn test_bases() {
        let mut ctx = ParseContext::new("ff 17 101");
        let (mut x, mut o, mut b) = (0u32, 0u32, 0u32);
        assert!(unformat!(ctx, "%x %o %b", &mut x, &mut o, &mut b));
        assert_eq!((x, o, b), (255, 15, 5));

        let mut ctx = ParseContext::new("FF");
        assert!(unformat!(ctx, "%x", &mut x));
        assert_eq!(x, 255);
    }

    #[test]
    fn test_width_modifiers() {
        let mut ctx = ParseContext::new("5000000000 -5000000000 7");
        let (mut a, mut b, mut c) = (0u64, 0i64, 0u32);
        assert!(unformat!(ctx, "%lu %lld %wu", &mut a, &mut b, &mut c));
        assert_eq!((a, b, c), (5_000_000_000, -5_000_000_000, 7));
    }

    #[test]
    fn test_capital_width_comes_before_destination() {
        let mut ctx = ParseContext::new("-100 ff");
        let (mut d, mut x) = (0i8, 0u16);
        assert!(unformat!(ctx, "%D %X", ScanArg::Width(1), &mut d, ScanArg::Width(2), &mut x));
        assert_eq!((d, x), (-100i8, 255u16));
    }

    #[test]
    fn test_width_mismatch_is_non_match() {
        let mut ctx = ParseContext::new("7");
        let mut v = 0u64;
        assert!(!unformat!(ctx, "%d", &mut v));
        assert_eq!(v, 0);

        let mut w = 0u8;
        assert!(!unformat!(ctx, "%D", &mut w));
    }

    #[test]
    fn test_overflow_is_non_match() {
        let mut ctx = ParseContext::new("2147483648");
        let mut v = 0i32;
        assert!(!unformat!(ctx, "%d", &mut v));
        assert_eq!(ctx.position(), 0);

        let mut ctx = ParseContext::new("-2147483648");
        assert!(unformat!(ctx, "%d", &mut v));
        assert_eq!(v, i32::MIN);

        let mut ctx = ParseContext::new("4294967295");
        let mut u = 0u32;
        assert!(unformat!(ctx, "%u", &mut u));
        assert_eq!(u, u32::MAX);

        let mut ctx = ParseContext::new("99999999999999999999999");
        let mut big = 0u64;
        assert!(!unformat!(ctx, "%lu", &mut big));

        let mut ctx = ParseContext::new("256");
        let mut small = 0u8;
        assert!(!unformat!(ctx, "%D", ScanArg::Width(1), &mut small));
    }

    #[test]
    fn test_whitespace_handling() {
        let mut ctx = ParseContext::new("   id    9");
        let mut v = 0i32;
        assert!(unformat!(ctx, "id %d", &mut v));
        assert_eq!(v, 9);

        let mut ctx = ParseContext::new("id9");
        assert!(unformat!(ctx, "id %d", &mut v));
        assert_eq!(v, 9);

        let mut ctx = ParseContext::new(" 3");
        assert!(unformat!(ctx, "  %d", &mut v));
        assert_eq!(v, 3);
    }

    #[test]
    fn test_percent_literal() {
        let mut ctx = ParseContext::new("50%");
        let mut v = 0i32;
        assert!(unformat!(ctx, "%d%%", &mut v));
        assert_eq!(v, 50);
        assert!(ctx.at_end());
    }

    #[test]
    fn test_bad_directives() {
        let mut ctx = ParseContext::new("5");
        let mut v = 0i32;
        assert!(!unformat!(ctx, "%", &mut v));
        assert!(!unformat!(ctx, "%q", &mut v));
        assert!(!unformat!(ctx, "%d"));
        assert!(!unformat!(ctx, "%l"));
        assert_eq!(ctx.position(), 0);
    }

    #[test]
    fn test_empty_directive() {
        let mut ctx = ParseContext::new("x");
        assert!(!unformat!(ctx, ""));
        let mut ctx = ParseContext::new("  x");
        assert!(unformat!(ctx, ""));
        assert_eq!(ctx.remaining(), "x");
    }

    #[test]
    fn test_repeated_scan_loop() {
        let mut ctx = ParseContext::new("id 3 id 4");
        let mut id = 0i32;
        let mut seen = Vec::new();
        while !ctx.at_end() {
            if unformat!(ctx, "id %d", &mut id) {
                seen.push(id);
            } else {
                break;
            }
        }
        assert_eq!(seen, vec![3, 4]);
    }

    #[test]
    fn test_digit_alphabet() {
        assert_eq!(digit_value(b'z', 36), Some(35));
        assert_eq!(digit_value(b'Z', 36), Some(35));
        assert_eq!(digit_value(b'Z', 64), Some(61));
        assert_eq!(digit_value(b'/', 64), Some(62));
        assert_eq!(digit_value(b'?', 64), Some(63));
        assert_eq!(digit_value(b'?', 10), None);
        assert_eq!(digit_value(b'a', 10), None);
    }

    #[test]
    fn test_parse_integer_base64() {
        let mut ctx = ParseContext::new("B?");
        // 'B' = 37, '?' = 63
        assert_eq!(parse_integer(&mut ctx, 64, false, 8), Some(37 * 64 + 63));
        let mut ctx = ParseContext::new("zz");
        assert_eq!(parse_integer(&mut ctx, 36, false, 4), Some(35 * 36 + 35));
        let mut ctx = ParseContext::new("1");
        assert_eq!(parse_integer(&mut ctx, 65, false, 4), None);
    }
}
