//! Progressive harvest tax.
//!
//! Harvest income is taxed on a bracket schedule keyed to the earner's
//! current balance; the withheld share accrues to the communal treasury.
//! Wealthier citizens keep a smaller share of each harvest, which keeps
//! Spark circulating instead of pooling.

use rust_decimal::Decimal;

/// Tax brackets as `(balance threshold, rate percent)` -- the rate applies
/// from the threshold up to the next one.
const BRACKETS: [(i64, i64); 6] = [(0, 0), (20, 5), (50, 10), (100, 15), (250, 25), (500, 40)];

/// Return the tax rate (as a fraction) for an earner with the given balance.
pub fn tax_rate(balance: Decimal) -> Decimal {
    let mut rate = 0;
    for (threshold, percent) in BRACKETS {
        if balance >= Decimal::from(threshold) {
            rate = percent;
        }
    }
    Decimal::new(rate, 2)
}

/// Split a gross amount into `(net, tax)` for an earner with the given
/// balance. The two parts always sum to the gross amount.
pub fn split(gross: Decimal, balance: Decimal) -> (Decimal, Decimal) {
    let tax = gross.saturating_mul(tax_rate(balance));
    (gross.saturating_sub(tax), tax)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poor_earners_pay_nothing() {
        assert_eq!(tax_rate(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(tax_rate(Decimal::from(19)), Decimal::ZERO);
    }

    #[test]
    fn brackets_step_at_thresholds() {
        assert_eq!(tax_rate(Decimal::from(20)), Decimal::new(5, 2));
        assert_eq!(tax_rate(Decimal::from(49)), Decimal::new(5, 2));
        assert_eq!(tax_rate(Decimal::from(50)), Decimal::new(10, 2));
        assert_eq!(tax_rate(Decimal::from(100)), Decimal::new(15, 2));
        assert_eq!(tax_rate(Decimal::from(250)), Decimal::new(25, 2));
        assert_eq!(tax_rate(Decimal::from(500)), Decimal::new(40, 2));
        assert_eq!(tax_rate(Decimal::from(10_000)), Decimal::new(40, 2));
    }

    #[test]
    fn split_conserves_the_gross() {
        let gross = Decimal::ONE;
        for balance in [0, 19, 20, 75, 300, 900] {
            let (net, tax) = split(gross, Decimal::from(balance));
            assert_eq!(net.saturating_add(tax), gross);
        }
    }

    #[test]
    fn mid_bracket_split() {
        let (net, tax) = split(Decimal::ONE, Decimal::from(120));
        assert_eq!(tax, Decimal::new(15, 2));
        assert_eq!(net, Decimal::new(85, 2));
    }
}
