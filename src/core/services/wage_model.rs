/// Conversions between money and work time.
pub struct WageModel;

impl WageModel {
    /// Value of one hour of work. Zero when the hours are not positive or
    /// either input is not a finite number.
    pub fn hourly_rate(salary: f64, hours_per_month: f64) -> f64 {
        if !salary.is_finite() || !hours_per_month.is_finite() || hours_per_month <= 0.0 {
            return 0.0;
        }
        salary / hours_per_month
    }

    /// Hours of work needed to pay `price`. Zero when the rate is unusable.
    pub fn time_cost(price: f64, hourly_rate: f64) -> f64 {
        if !price.is_finite() || !hourly_rate.is_finite() || hourly_rate <= 0.0 {
            return 0.0;
        }
        price / hourly_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hourly_rate_divides_salary_by_hours() {
        assert_eq!(WageModel::hourly_rate(4400.0, 176.0), 25.0);
        assert_eq!(WageModel::hourly_rate(0.0, 160.0), 0.0);
        assert_eq!(WageModel::hourly_rate(4400.0, 0.0), 0.0);
        assert_eq!(WageModel::hourly_rate(f64::NAN, 160.0), 0.0);
    }

    #[test]
    fn time_cost_guards_against_zero_rate() {
        assert_eq!(WageModel::time_cost(100.0, 25.0), 4.0);
        assert_eq!(WageModel::time_cost(100.0, 0.0), 0.0);
        assert_eq!(WageModel::time_cost(100.0, -3.0), 0.0);
    }

    #[test]
    fn time_cost_matches_division_over_a_grid() {
        for salary in [1200.0, 3500.0, 12_000.0] {
            for hours in [80.0, 160.0, 220.0] {
                let rate = WageModel::hourly_rate(salary, hours);
                assert!((rate - salary / hours).abs() < 1e-12);
                for price in [9.9, 150.0, 4999.0] {
                    let cost = WageModel::time_cost(price, rate);
                    assert!((cost - price / rate).abs() < 1e-9);
                }
            }
        }
    }
}
