//! Exact rationals.

use std::cmp::Ordering;
use std::fmt;

/// `num/den` in lowest terms. The denominator is positive; the sign lives
/// in the numerator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rat {
    num: i64,
    den: u64,
}

impl Rat {
    pub const ZERO: Rat = Rat { num: 0, den: 1 };

    /// Normalized rational, or `None` for a zero denominator.
    pub fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        if num == 0 {
            return Some(Self::ZERO);
        }
        let g = gcd(num.unsigned_abs(), den.unsigned_abs());
        let negative = (num < 0) != (den < 0);
        let n = num.unsigned_abs() / g;
        let d = den.unsigned_abs() / g;
        let n = i64::try_from(n).ok()?;
        Some(Rat {
            num: if negative { -n } else { n },
            den: d,
        })
    }

    pub const fn integer(n: i64) -> Self {
        Rat { num: n, den: 1 }
    }

    pub const fn num(self) -> i64 {
        self.num
    }

    pub const fn den(self) -> u64 {
        self.den
    }

    pub const fn is_zero(self) -> bool {
        self.num == 0
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

impl Ord for Rat {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = i128::from(self.num) * i128::from(other.den);
        let rhs = i128::from(other.num) * i128::from(self.den);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Rat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
