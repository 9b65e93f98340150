//! Correctly-rounded decimal → binary64/binary32 conversion (spec §4.13).
//!
//! Short inputs take a fast path identical in spirit to the classic
//! "Clinger fast path": if the significand fits in 53 bits and the decimal
//! exponent is in the range where `10^n` is exactly representable as an
//! `f64`, a single floating-point multiply/divide is already correctly
//! rounded. Anything else — long digit runs, extreme exponents — goes
//! through the bigint pipeline spec §4.13 names: `bigint_mad` (accumulate a
//! digit into a running bigint), `bigint_mul_pow5`, `bigint_shift_left`, and
//! `bigint_div` (here, repeated division by a small divisor, since our
//! denominators are always a power of 5 or 1).

/// Little-endian base-2^32 unsigned bigint.
#[derive(Clone, Debug, Default)]
struct BigUint {
    limbs: Vec<u32>,
}

impl BigUint {
    fn from_u64(v: u64) -> Self {
        let lo = v as u32;
        let hi = (v >> 32) as u32;
        let mut limbs = vec![lo, hi];
        trim(&mut limbs);
        BigUint { limbs }
    }

    fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    /// `bigint_mad(digit, radix)`: `self = self * radix + digit`.
    fn mad(&mut self, digit: u32, radix: u32) {
        let mut carry: u64 = digit as u64;
        for limb in &mut self.limbs {
            let v = (*limb as u64) * (radix as u64) + carry;
            *limb = v as u32;
            carry = v >> 32;
        }
        while carry > 0 {
            self.limbs.push(carry as u32);
            carry >>= 32;
        }
        trim(&mut self.limbs);
    }

    fn mul_small(&mut self, m: u32) {
        let mut carry: u64 = 0;
        for limb in &mut self.limbs {
            let v = (*limb as u64) * (m as u64) + carry;
            *limb = v as u32;
            carry = v >> 32;
        }
        while carry > 0 {
            self.limbs.push(carry as u32);
            carry >>= 32;
        }
        trim(&mut self.limbs);
    }

    /// `bigint_mul_pow5(exp)`: multiplies by `5^exp` in chunks of `5^13`
    /// (the largest power of 5 that still fits a `u32`).
    fn mul_pow5(&mut self, mut exp: u32) {
        const CHUNK_EXP: u32 = 13;
        const CHUNK_VAL: u32 = 1_220_703_125; // 5^13
        while exp >= CHUNK_EXP {
            self.mul_small(CHUNK_VAL);
            exp -= CHUNK_EXP;
        }
        if exp > 0 {
            self.mul_small(5u32.pow(exp));
        }
    }

    /// `bigint_shift_left(bits)`.
    fn shift_left(&mut self, bits: u32) {
        if self.is_zero() || bits == 0 {
            return;
        }
        let limb_shift = (bits / 32) as usize;
        let bit_shift = bits % 32;
        let mut out = vec![0u32; limb_shift];
        let mut carry: u32 = 0;
        for &limb in &self.limbs {
            let v = ((limb as u64) << bit_shift) | carry as u64;
            out.push(v as u32);
            carry = (v >> 32) as u32;
        }
        if carry > 0 {
            out.push(carry);
        }
        self.limbs = out;
        trim(&mut self.limbs);
    }

    /// `bigint_div`: divides by the small value `d`, returning the
    /// remainder (`0 <= remainder < d`).
    fn div_small(&mut self, d: u32) -> u32 {
        let mut rem: u64 = 0;
        for limb in self.limbs.iter_mut().rev() {
            let cur = (rem << 32) | (*limb as u64);
            *limb = (cur / d as u64) as u32;
            rem = cur % d as u64;
        }
        trim(&mut self.limbs);
        rem as u32
    }

    fn bit_length(&self) -> u32 {
        match self.limbs.last() {
            None => 0,
            Some(&top) => (self.limbs.len() as u32 - 1) * 32 + (32 - top.leading_zeros()),
        }
    }

    /// Returns the top `n` bits (MSB-first, as a right-aligned `u64`) and
    /// whether any bit below that window was set (a sticky-bit
    /// contribution for round-to-nearest-even).
    fn top_bits(&self, n: u32) -> (u64, bool) {
        let total = self.bit_length();
        if total <= n {
            return (self.as_u64_lossy(), false);
        }
        let drop = total - n;
        let mut sticky = false;
        for i in 0..drop {
            if self.get_bit(i) {
                sticky = true;
                break;
            }
        }
        let mut bits: u64 = 0;
        for i in 0..n {
            if self.get_bit(drop + i) {
                bits |= 1u64 << i;
            }
        }
        (bits, sticky)
    }

    fn get_bit(&self, i: u32) -> bool {
        let limb = (i / 32) as usize;
        let bit = i % 32;
        self.limbs.get(limb).map(|&l| (l >> bit) & 1 != 0).unwrap_or(false)
    }

    fn as_u64_lossy(&self) -> u64 {
        let lo = *self.limbs.first().unwrap_or(&0) as u64;
        let hi = *self.limbs.get(1).unwrap_or(&0) as u64;
        lo | (hi << 32)
    }
}

fn trim(limbs: &mut Vec<u32>) {
    while matches!(limbs.last(), Some(&0)) {
        limbs.pop();
    }
}

/// A parsed decimal literal: `sign * digits * 10^exp10`.
struct Decimal {
    negative: bool,
    digits: BigUint,
    /// Number of significant decimal digits absorbed into `digits`.
    digit_count: u32,
    exp10: i64,
}

fn tokenize(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let mut chars = s.chars().peekable();
    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut digits = BigUint::default();
    let mut digit_count: u32 = 0;
    let mut point_shift: i64 = 0;
    let mut seen_digit = false;
    let mut seen_point = false;

    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            seen_digit = true;
            digits.mad(c as u32 - '0' as u32, 10);
            digit_count += 1;
            if seen_point {
                point_shift -= 1;
            }
            chars.next();
        } else if c == '.' && !seen_point {
            seen_point = true;
            chars.next();
        } else {
            break;
        }
    }

    if !seen_digit {
        return None;
    }

    let mut exp10 = point_shift;
    if matches!(chars.peek(), Some('e') | Some('E')) {
        chars.next();
        let exp_negative = match chars.peek() {
            Some('-') => {
                chars.next();
                true
            }
            Some('+') => {
                chars.next();
                false
            }
            _ => false,
        };
        let mut exp_val: i64 = 0;
        let mut any = false;
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                any = true;
                exp_val = exp_val.saturating_mul(10).saturating_add((c as u8 - b'0') as i64);
                chars.next();
            } else {
                break;
            }
        }
        if !any {
            return None;
        }
        exp10 += if exp_negative { -exp_val } else { exp_val };
    }

    if chars.next().is_some() {
        return None; // trailing garbage
    }

    Some(Decimal { negative, digits, digit_count, exp10 })
}

struct FloatFormat {
    /// Mantissa width including the implicit leading bit.
    mantissa_bits: u32,
    exp_bits: u32,
    bias: i64,
}

const F64_FORMAT: FloatFormat = FloatFormat { mantissa_bits: 53, exp_bits: 11, bias: 1023 };
const F32_FORMAT: FloatFormat = FloatFormat { mantissa_bits: 24, exp_bits: 8, bias: 127 };

/// Parses `s` as a correctly-rounded `f64` (spec §4.13).
pub fn parse_f64(s: &str) -> Option<f64> {
    let bits = parse_bits(s, &F64_FORMAT)?;
    Some(f64::from_bits(bits))
}

/// Parses `s` as a correctly-rounded `f32`, used for `KeyAttrDataFloat` in
/// ASCII files (spec §9 Open Question 1: mimic `strtof`, not `strtod`
/// narrowed after the fact).
pub fn parse_f32(s: &str) -> Option<f32> {
    let bits = parse_bits(s, &F32_FORMAT)? as u32;
    Some(f32::from_bits(bits))
}

fn fast_path_f64(dec: &Decimal) -> Option<f64> {
    if dec.digit_count > 15 || !(-22..=22).contains(&dec.exp10) {
        return None;
    }
    let mantissa = dec.digits.as_u64_lossy();
    if dec.digits.bit_length() > 53 {
        return None;
    }
    let mantissa_f = mantissa as f64;
    let value = if dec.exp10 >= 0 {
        mantissa_f * 10f64.powi(dec.exp10 as i32)
    } else {
        mantissa_f / 10f64.powi(-dec.exp10 as i32)
    };
    Some(if dec.negative { -value } else { value })
}

fn parse_bits(s: &str, fmt: &FloatFormat) -> Option<u64> {
    let dec = tokenize(s)?;

    if dec.digits.is_zero() {
        return Some(if dec.negative { 1u64 << 63 } else { 0 });
    }

    if fmt.mantissa_bits == 53 {
        if let Some(v) = fast_path_f64(&dec) {
            return Some(v.to_bits());
        }
    }

    let sign_bit: u64 = if dec.negative { 1 } else { 0 };
    let max_exp = (1i64 << fmt.exp_bits) - 1;

    // value = digits * 10^exp10 = num/den * 2^exp10, with num or den
    // carrying the |exp10|-th power of 5 depending on its sign (§4.13).
    let mut num = dec.digits.clone();
    let mut div5_count: u32 = 0;
    if dec.exp10 >= 0 {
        num.mul_pow5(dec.exp10 as u32);
    } else {
        div5_count = (-dec.exp10) as u32;
    }

    // Guarantee the post-division quotient still has at least
    // `mantissa_bits + 1` bits by pre-shifting left generously: dividing by
    // 5 shrinks the bit length by at most ~2.33 bits per step.
    let guard_bits = 64u32;
    let pre_shift = div5_count.saturating_mul(3) + guard_bits;
    num.shift_left(pre_shift);

    let mut sticky_from_division = false;
    for _ in 0..div5_count {
        let rem = num.div_small(5);
        if rem != 0 {
            sticky_from_division = true;
        }
    }

    let want_bits = fmt.mantissa_bits + 1; // mantissa + round bit
    let qbits = num.bit_length();
    debug_assert!(qbits >= want_bits, "strtod: insufficient guard bits");

    let (top, low_sticky) = num.top_bits(want_bits);
    let sticky = low_sticky || sticky_from_division;

    // value ≈ top * 2^final_exp2, final_exp2 = exp10 - pre_shift + (qbits - want_bits)
    let final_exp2 = dec.exp10 - pre_shift as i64 + (qbits as i64 - want_bits as i64);

    let round_bit = top & 1;
    let mut mantissa = top >> 1; // `mantissa_bits`-wide, top bit set
    let mut exp2 = final_exp2 + 1;

    let round_up = if round_bit == 0 {
        false
    } else if sticky {
        true
    } else {
        mantissa & 1 == 1 // exactly halfway: round to even
    };
    if round_up {
        mantissa += 1;
        if mantissa == 1u64 << fmt.mantissa_bits {
            mantissa >>= 1;
            exp2 += 1;
        }
    }

    // `mantissa` has an implicit leading bit at position `mantissa_bits-1`;
    // the double/float's stored exponent measures from that bit.
    let unbiased = exp2 + (fmt.mantissa_bits as i64 - 1);
    let biased = unbiased + fmt.bias;

    if biased >= max_exp {
        return Some(sign_bit << (fmt.mantissa_bits as u64 + fmt.exp_bits as u64 - 1) | (max_exp as u64) << (fmt.mantissa_bits - 1));
    }
    if biased <= 0 {
        // Subnormal or underflow to zero: shift the mantissa right by the
        // amount the exponent is short, dropping the implicit bit.
        let shift = (1 - biased) as u32;
        if shift >= fmt.mantissa_bits {
            return Some(sign_bit << (fmt.mantissa_bits as u64 + fmt.exp_bits as u64 - 1));
        }
        let sub_mantissa = mantissa >> shift;
        return Some((sign_bit << (fmt.mantissa_bits as u64 + fmt.exp_bits as u64 - 1)) | sub_mantissa);
    }

    let stored_mantissa = mantissa & ((1u64 << (fmt.mantissa_bits - 1)) - 1);
    let bits = (sign_bit << (fmt.mantissa_bits as u64 + fmt.exp_bits as u64 - 1))
        | ((biased as u64) << (fmt.mantissa_bits - 1))
        | stored_mantissa;
    Some(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_integers() {
        assert_eq!(Some(0.0), parse_f64("0"));
        assert_eq!(Some(1.0), parse_f64("1"));
        assert_eq!(Some(-42.0), parse_f64("-42"));
    }

    #[test]
    fn parses_fractional_and_exponent_forms() {
        assert_eq!("0.1".parse::<f64>().ok(), parse_f64("0.1"));
        assert_eq!("1.5e10".parse::<f64>().ok(), parse_f64("1.5e10"));
        assert_eq!("-2.5e-8".parse::<f64>().ok(), parse_f64("-2.5e-8"));
    }

    #[test]
    fn matches_native_parse_for_long_digit_runs() {
        let cases = ["123456789012345678901234567890e-20", "0.000000000000000000001", "9.999999999999999e300"];
        for c in cases {
            let native: f64 = c.parse().unwrap();
            let ours = parse_f64(c).unwrap();
            assert_eq!(native.to_bits(), ours.to_bits(), "mismatch for {c}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(None, parse_f64(""));
        assert_eq!(None, parse_f64("abc"));
        assert_eq!(None, parse_f64("1.2.3"));
    }

    #[test]
    fn f32_round_trip_matches_native() {
        for c in ["3.14", "1e38", "-0.0001", "65504.0"] {
            let native: f32 = c.parse().unwrap();
            let ours = parse_f32(c).unwrap();
            assert_eq!(native.to_bits(), ours.to_bits(), "mismatch for {c}");
        }
    }
}
