// core/src/units.rs
// Unit helpers. Every function returns 0.0 for zero, negative-zero or non-finite input.

/// General kg ↔ lb ratio.
pub const LB_PER_KG: f64 = 2.20462;
/// Ratio used by the body composition sheet (453 g per lb).
pub const KG_PER_LB_453: f64 = 453.0 / 1000.0;
pub const CM_PER_INCH: f64 = 2.54;

// --- RoundTo trait (public, used by every evaluation) ---
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if !self.is_finite() { return 0.0; }
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

#[inline]
fn sane(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

/// kg → lb (×2.20462).
pub fn kg_to_lb(kg: f64) -> f64 {
    sane(kg * LB_PER_KG)
}

/// lb → kg, inverse of [`kg_to_lb`].
pub fn lb_to_kg(lb: f64) -> f64 {
    sane(lb / LB_PER_KG)
}

/// kg → lb on the 453 g scale (×1000/453).
pub fn kg_to_lb_453(kg: f64) -> f64 {
    sane(kg / KG_PER_LB_453)
}

/// lb → kg on the 453 g scale (×453/1000).
pub fn lb_to_kg_453(lb: f64) -> f64 {
    sane(lb * KG_PER_LB_453)
}

pub fn cm_to_in(cm: f64) -> f64 {
    sane(cm / CM_PER_INCH)
}

/// Option-aware helpers for raw sheet fields (absent → 0).
#[inline]
pub fn or_zero(x: Option<f64>) -> f64 {
    x.map(sane).unwrap_or(0.0)
}
