//! Piecewise-linear scoring curves.
//!
//! Each curve is a list of `(input, score)` knots sorted by input. Inputs
//! below the first knot or above the last take the end score, so every
//! curve maps the whole real line onto [0, 1].

pub type Curve = &'static [(f64, f64)];

/// Lower debt/equity is better; 3x leverage and above scores zero
pub const DEBT_TO_EQUITY: Curve = &[(0.0, 1.0), (0.3, 1.0), (0.5, 0.83), (1.0, 0.5), (2.0, 0.17), (3.0, 0.0)];

/// FCF yield for companies with positive free cash flow
pub const FCF_YIELD: Curve = &[(0.0, 0.75), (0.05, 1.0)];

/// Score for positive free cash flow when the yield cannot be computed
pub const POSITIVE_FCF_DEFAULT: f64 = 0.75;

/// Shared by ROE and net margin
pub const PROFITABILITY: Curve = &[(0.0, 0.0), (0.10, 0.5), (0.15, 0.75), (0.20, 1.0)];

pub const GROSS_MARGIN: Curve = &[(0.0, 0.0), (0.2, 0.3), (0.4, 0.7), (0.6, 1.0)];

/// Annual revenue and earnings growth
pub const ANNUAL_GROWTH: Curve = &[(-0.10, 0.0), (0.0, 0.25), (0.10, 0.5), (0.20, 0.75), (0.30, 1.0)];

pub const QUARTERLY_GROWTH: Curve = &[(-0.10, 0.0), (0.0, 0.25), (0.05, 0.5), (0.15, 0.75), (0.25, 1.0)];

/// RS rating 1-99
pub const RS_RATING: Curve = &[(40.0, 0.0), (50.0, 0.125), (60.0, 0.375), (70.0, 0.625), (80.0, 0.875), (90.0, 1.0)];

pub const RETURN_6M: Curve = &[(-0.20, 0.0), (-0.10, 1.0 / 6.0), (0.0, 1.0 / 3.0), (0.05, 0.5), (0.15, 0.83), (0.30, 1.0)];

pub const RETURN_3M: Curve = &[(-0.10, 0.0), (-0.05, 1.0 / 6.0), (0.0, 1.0 / 3.0), (0.05, 0.5), (0.10, 0.83), (0.20, 1.0)];

/// Higher beta is riskier
pub const BETA: Curve = &[(1.2, 1.0), (1.5, 0.8), (2.0, 0.4), (2.5, 0.0)];

/// Position within the 52-week range; buying at the very top is penalized
pub const RANGE_POSITION: Curve = &[(0.0, 0.6), (0.2, 0.85), (0.4, 1.0), (0.8, 1.0), (0.95, 0.8), (1.0, 0.8)];

/// Consensus mean, 1 strong buy to 5 strong sell
pub const ANALYST_RATING: Curve = &[(2.0, 1.0), (3.0, 0.6), (4.0, 0.0)];

/// Evaluate `curve` at `x`, clamping to the end knots.
pub fn interpolate(x: f64, curve: Curve) -> f64 {
    let (first, last) = match (curve.first(), curve.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return 0.0,
    };
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    for pair in curve.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x <= x1 {
            if x1 - x0 <= 0.0 {
                return y1;
            }
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }
    last.1
}
