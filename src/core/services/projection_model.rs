/// Years used when no horizon is configured.
pub const DEFAULT_YEARS: u32 = 10;
/// Annual return used when no rate is configured.
pub const DEFAULT_RATE: f64 = 0.10;

/// What money would become if invested instead of spent.
pub struct ProjectionModel;

impl ProjectionModel {
    /// `price * (1 + rate)^years`, compounded yearly.
    pub fn future_value(price: f64, years: u32, rate: f64) -> f64 {
        price * (1.0 + rate).powf(f64::from(years))
    }

    /// Growth on top of the original amount.
    pub fn investment_gain(price: f64, years: u32, rate: f64) -> f64 {
        Self::future_value(price, years, rate) - price
    }
}
