//! Closed-form real roots of `a·x² + b·x + c = 0`.

/// Quadratic with real coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadratic {
    a: f64,
    b: f64,
    c: f64,
}

impl Quadratic {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Monic form `x² + b·x + c`.
    pub fn monic(b: f64, c: f64) -> Self {
        Self::new(1.0, b, c)
    }

    pub fn discriminant(&self) -> f64 {
        self.b * self.b - 4.0 * self.a * self.c
    }

    /// Whether real roots exist.
    pub fn check(&self) -> bool {
        if self.a == 0.0 {
            return self.b != 0.0;
        }
        self.discriminant() >= 0.0
    }

    /// Both real roots as `(min, max)`, or `None` when the discriminant is
    /// negative. A degenerate linear equation yields its single root twice.
    pub fn roots(&self) -> Option<(f64, f64)> {
        if self.a == 0.0 {
            if self.b == 0.0 {
                return None;
            }
            let x = -self.c / self.b;
            return Some((x, x));
        }

        let disc = self.discriminant();
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let inv_denom = 0.5 / self.a;
        let r1 = (-self.b - sqrt_disc) * inv_denom;
        let r2 = (-self.b + sqrt_disc) * inv_denom;
        Some((r1.min(r2), r1.max(r2)))
    }

    pub fn solution_max(&self) -> Option<f64> {
        self.roots().map(|(_, max)| max)
    }

    pub fn solution_min(&self) -> Option<f64> {
        self.roots().map(|(min, _)| min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_real_roots() {
        // (x - 2)(x + 3)
        let q = Quadratic::monic(1.0, -6.0);
        assert!(q.check());
        assert_eq!(q.roots(), Some((-3.0, 2.0)));
        assert_eq!(q.solution_max(), Some(2.0));
        assert_eq!(q.solution_min(), Some(-3.0));
    }

    #[test]
    fn negative_discriminant_has_no_root() {
        let q = Quadratic::monic(0.0, 1.0);
        assert!(!q.check());
        assert_eq!(q.roots(), None);
        assert_eq!(q.solution_max(), None);
    }

    #[test]
    fn double_root() {
        let q = Quadratic::new(2.0, -8.0, 8.0);
        assert_eq!(q.roots(), Some((2.0, 2.0)));
    }

    #[test]
    fn negative_leading_coefficient_orders_roots() {
        // -(x - 1)(x - 4)
        let q = Quadratic::new(-1.0, 5.0, -4.0);
        assert_eq!(q.roots(), Some((1.0, 4.0)));
    }

    #[test]
    fn linear_degenerate_case() {
        let q = Quadratic::new(0.0, 2.0, -4.0);
        assert_eq!(q.roots(), Some((2.0, 2.0)));
        assert!(!Quadratic::new(0.0, 0.0, 1.0).check());
    }
}
