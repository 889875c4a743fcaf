//! Affine point arithmetic over `F_p`.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

use super::{mod_inverse, Secp256k1};

/// A finite curve point with coordinates in `[0, p)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AffinePoint {
    pub x: BigUint,
    pub y: BigUint,
}

/// A curve point, including the identity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Point {
    /// The point at infinity (group identity).
    Infinity,
    /// A finite point.
    Affine(AffinePoint),
}

impl Secp256k1 {
    // -- field helpers ---------------------------------------------------

    fn fsub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        ((a + &self.p) - b) % &self.p
    }

    fn fmul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    // -- predicates ------------------------------------------------------

    /// Whether `point` satisfies `y² = x³ + 7` with both coordinates in range.
    pub fn is_on_curve(&self, point: &AffinePoint) -> bool {
        if point.x >= self.p || point.y >= self.p {
            return false;
        }
        let lhs = self.fmul(&point.y, &point.y);
        let rhs = (self.fmul(&self.fmul(&point.x, &point.x), &point.x) + &self.b) % &self.p;
        lhs == rhs
    }

    // -- group law -------------------------------------------------------

    /// Point negation `-P = (x, p - y)`.
    pub fn negate(&self, point: &Point) -> Point {
        match point {
            Point::Infinity => Point::Infinity,
            Point::Affine(a) => Point::Affine(AffinePoint {
                x: a.x.clone(),
                y: self.fsub(&BigUint::zero(), &a.y),
            }),
        }
    }

    /// Point doubling: `λ = 3x² / 2y`, `x' = λ² - 2x`, `y' = λ(x - x') - y`.
    pub fn double(&self, point: &Point) -> Point {
        let a = match point {
            Point::Infinity => return Point::Infinity,
            Point::Affine(a) => a,
        };
        if a.y.is_zero() {
            return Point::Infinity;
        }

        let numerator = self.fmul(&BigUint::from(3u32), &self.fmul(&a.x, &a.x));
        let Some(denominator) = mod_inverse(&(&a.y << 1usize), &self.p) else {
            return Point::Infinity;
        };
        let lambda = self.fmul(&numerator, &denominator);

        let x3 = self.fsub(&self.fmul(&lambda, &lambda), &((&a.x << 1usize) % &self.p));
        let y3 = self.fsub(&self.fmul(&lambda, &self.fsub(&a.x, &x3)), &a.y);
        Point::Affine(AffinePoint { x: x3, y: y3 })
    }

    /// Point addition: `λ = (y2 - y1) / (x2 - x1)`, `x3 = λ² - x1 - x2`,
    /// `y3 = λ(x1 - x3) - y1`.
    pub fn add(&self, lhs: &Point, rhs: &Point) -> Point {
        let (a, b) = match (lhs, rhs) {
            (Point::Infinity, _) => return rhs.clone(),
            (_, Point::Infinity) => return lhs.clone(),
            (Point::Affine(a), Point::Affine(b)) => (a, b),
        };

        if a.x == b.x {
            // Same x: either the same point or mutual inverses.
            return if a.y == b.y {
                self.double(lhs)
            } else {
                Point::Infinity
            };
        }

        let Some(inv) = mod_inverse(&self.fsub(&b.x, &a.x), &self.p) else {
            return Point::Infinity;
        };
        let lambda = self.fmul(&self.fsub(&b.y, &a.y), &inv);

        let x3 = self.fsub(&self.fsub(&self.fmul(&lambda, &lambda), &a.x), &b.x);
        let y3 = self.fsub(&self.fmul(&lambda, &self.fsub(&a.x, &x3)), &a.y);
        Point::Affine(AffinePoint { x: x3, y: y3 })
    }

    /// Scalar multiplication by double-and-add, most significant bit first.
    pub fn mul(&self, point: &Point, scalar: &BigUint) -> Point {
        let mut result = Point::Infinity;
        for byte in scalar.to_bytes_be() {
            for bit in (0..8).rev() {
                result = self.double(&result);
                if (byte >> bit) & 1 == 1 {
                    result = self.add(&result, point);
                }
            }
        }
        result
    }

    /// `scalar · G`.
    pub fn mul_generator(&self, scalar: &BigUint) -> Point {
        self.mul(&Point::Affine(self.g.clone()), scalar)
    }

    /// Recovers the point with abscissa `x` and the requested y parity.
    ///
    /// Returns `None` if `x >= p` or `x³ + 7` is not a quadratic residue.
    pub fn lift_x(&self, x: &BigUint, odd_y: bool) -> Option<AffinePoint> {
        if *x >= self.p {
            return None;
        }
        let y_squared = (self.fmul(&self.fmul(x, x), x) + &self.b) % &self.p;
        let mut y = y_squared.modpow(&self.sqrt_exp, &self.p);
        if self.fmul(&y, &y) != y_squared {
            return None;
        }
        if y.is_odd() != odd_y {
            if y.is_zero() {
                return None;
            }
            y = &self.p - y;
        }
        Some(AffinePoint { x: x.clone(), y })
    }
}
