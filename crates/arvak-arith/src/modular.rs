//! Integer helpers shared by the modular operations.

/// Extended Euclid: returns `(g, s, t)` with `a*s + b*t == g == gcd(a, b)`.
pub fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1i128, 0i128);
    let (mut old_t, mut t) = (0i128, 1i128);
    while r != 0 {
        let q = old_r.div_euclid(r);
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
        (old_t, t) = (t, old_t - q * t);
    }
    if old_r < 0 {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Multiplicative inverse of `a` modulo `m`, if it exists.
pub fn multiplicative_inverse(a: i64, m: u64) -> Option<u64> {
    if m == 0 {
        return None;
    }
    if m == 1 {
        return Some(0);
    }
    let m = m as i128;
    let a = (a as i128).rem_euclid(m);
    let (g, s, _) = extended_gcd(a, m);
    if g != 1 {
        return None;
    }
    Some(s.rem_euclid(m) as u64)
}

/// `value mod m` for a signed value, in `[0, m)`.
pub fn reduce(value: i64, m: u64) -> u64 {
    (value as i128).rem_euclid(m as i128) as u64
}

/// `(a * b) mod m` without overflow.
pub fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

/// `(base ^ exp) mod m`.
pub fn pow_mod(base: u64, exp: u64, m: u64) -> u64 {
    if m == 1 {
        return 0;
    }
    let mut result = 1u64;
    let mut base = base % m;
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Inverse of an odd `a` modulo `2^64`, by Newton iteration.
///
/// Each step doubles the number of correct low bits, starting from 3.
pub fn inverse_mod_pow2(a: u64) -> u64 {
    let mut x = a;
    for _ in 0..5 {
        x = x.wrapping_mul(2u64.wrapping_sub(a.wrapping_mul(x)));
    }
    x
}

/// Bit mask of the low `width` bits.
#[inline]
pub fn mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// `2^width` as a `u128`, valid up to width 127.
#[inline]
pub fn span(width: usize) -> u128 {
    1u128 << width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_gcd() {
        let (g, s, t) = extended_gcd(240, 46);
        assert_eq!(g, 2);
        assert_eq!(240 * s + 46 * t, 2);
    }

    #[test]
    fn test_inverse() {
        assert_eq!(multiplicative_inverse(7, 13), Some(2));
        assert_eq!(multiplicative_inverse(-1, 13), Some(12));
        assert_eq!(multiplicative_inverse(2, 8), None);
        assert_eq!(multiplicative_inverse(3, 1), Some(0));
        for a in 1..13 {
            let inv = multiplicative_inverse(a, 13).unwrap();
            assert_eq!(mul_mod(a as u64, inv, 13), 1);
        }
    }

    #[test]
    fn test_pow_and_mask() {
        assert_eq!(pow_mod(2, 10, 1000), 24);
        assert_eq!(pow_mod(5, 0, 7), 1);
        assert_eq!(mask(3), 7);
        assert_eq!(mask(64), u64::MAX);
        assert_eq!(reduce(-3, 13), 10);
        assert_eq!(span(64), 1u128 << 64);
    }

    #[test]
    fn test_inverse_mod_pow2() {
        for a in [1u64, 3, 5, 11, 0xdead_beef, u64::MAX] {
            assert_eq!(a.wrapping_mul(inverse_mod_pow2(a)), 1);
        }
    }
}
