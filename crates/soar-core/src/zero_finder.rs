//! Bracketed root search (Brent's method).
//!
//! Used by the task-level searches that invert the glide solver, e.g. the
//! MacCready setting that arrives exactly at the finish.

/// Search interval and tolerance.
#[derive(Debug, Clone, Copy)]
pub struct ZeroFinder {
    pub x_min: f64,
    pub x_max: f64,
    pub tolerance: f64,
}

const MAX_ITERATIONS: usize = 100;

impl ZeroFinder {
    pub fn new(x_min: f64, x_max: f64, tolerance: f64) -> Self {
        debug_assert!(x_min < x_max);
        Self {
            x_min,
            x_max,
            tolerance,
        }
    }

    /// Root of `f` within the interval.
    ///
    /// Returns `None` when `f` has the same sign at both ends of the
    /// interval, so no root is bracketed.
    pub fn find_zero<F>(&self, mut f: F) -> Option<f64>
    where
        F: FnMut(f64) -> f64,
    {
        let mut a = self.x_min;
        let mut b = self.x_max;
        let mut fa = f(a);
        let mut fb = f(b);

        if fa == 0.0 {
            return Some(a);
        }
        if fb == 0.0 {
            return Some(b);
        }
        if fa.signum() == fb.signum() {
            return None;
        }

        let mut c = a;
        let mut fc = fa;

        for _ in 0..MAX_ITERATIONS {
            let prev_step = b - a;

            if fc.abs() < fb.abs() {
                // keep b as the best approximation
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol_act = 2.0 * f64::EPSILON * b.abs() + self.tolerance * 0.5;
            let mut new_step = (c - b) * 0.5;

            if new_step.abs() <= tol_act || fb == 0.0 {
                return Some(b);
            }

            if prev_step.abs() >= tol_act && fa.abs() > fb.abs() {
                // interpolation is worth trying
                let cb = c - b;
                let mut p;
                let mut q;
                if a == c {
                    // linear
                    let t1 = fb / fa;
                    p = cb * t1;
                    q = 1.0 - t1;
                } else {
                    // inverse quadratic
                    let qa = fa / fc;
                    let t1 = fb / fc;
                    let t2 = fb / fa;
                    p = t2 * (cb * qa * (qa - t1) - (b - a) * (t1 - 1.0));
                    q = (qa - 1.0) * (t1 - 1.0) * (t2 - 1.0);
                }
                if p > 0.0 {
                    q = -q;
                } else {
                    p = -p;
                }

                if p < 0.75 * cb * q - (tol_act * q).abs() / 2.0
                    && p < (prev_step * q / 2.0).abs()
                {
                    new_step = p / q;
                }
            }

            if new_step.abs() < tol_act {
                new_step = if new_step > 0.0 { tol_act } else { -tol_act };
            }

            a = b;
            fa = fb;
            b += new_step;
            fb = f(b);

            if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
                c = a;
                fc = fa;
            }
        }

        Some(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_root_of_cubic() {
        let zf = ZeroFinder::new(0.0, 3.0, 1e-9);
        let root = zf.find_zero(|x| x * x * x - 2.0).unwrap();
        assert!((root - 2f64.cbrt()).abs() < 1e-7);
    }

    #[test]
    fn finds_root_at_interval_end() {
        let zf = ZeroFinder::new(1.0, 5.0, 1e-6);
        assert_eq!(zf.find_zero(|x| x - 1.0), Some(1.0));
    }

    #[test]
    fn unbracketed_interval_has_no_root() {
        let zf = ZeroFinder::new(-1.0, 1.0, 1e-6);
        assert_eq!(zf.find_zero(|x| x * x + 1.0), None);
    }

    #[test]
    fn decreasing_function() {
        let zf = ZeroFinder::new(0.0, 10.0, 1e-8);
        let root = zf.find_zero(|x| 4.0 - x).unwrap();
        assert!((root - 4.0).abs() < 1e-6);
    }
}
