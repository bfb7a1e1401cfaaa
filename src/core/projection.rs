use super::types::Projection;

const MONTHS_PER_YEAR: u32 = 12;

/// One asset class being fed a monthly contribution that steps up once a year.
#[derive(Debug, Clone)]
pub(crate) struct SipAccount {
    balance: f64,
    invested: f64,
    current_monthly: f64,
    monthly_rate: f64,
    step_up_factor: f64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct YearEnd {
    pub contribution_monthly: f64,
    pub invested: f64,
    pub balance: f64,
}

impl SipAccount {
    pub(crate) fn new(
        monthly_amount: f64,
        annual_rate_percent: f64,
        annual_step_up_percent: f64,
    ) -> Self {
        Self {
            balance: 0.0,
            invested: 0.0,
            current_monthly: monthly_amount.max(0.0),
            monthly_rate: annual_rate_percent / 100.0 / MONTHS_PER_YEAR as f64,
            step_up_factor: 1.0 + annual_step_up_percent / 100.0,
        }
    }

    /// Contributes at the start of each month, then credits that month's growth.
    pub(crate) fn run_year(&mut self) -> YearEnd {
        let contribution_monthly = self.current_monthly;
        for _ in 0..MONTHS_PER_YEAR {
            self.balance += self.current_monthly;
            self.invested += self.current_monthly;
            self.balance *= 1.0 + self.monthly_rate;
        }
        self.current_monthly *= self.step_up_factor;

        YearEnd {
            contribution_monthly,
            invested: self.invested,
            balance: self.balance,
        }
    }

    pub(crate) fn projection(&self) -> Projection {
        Projection {
            invested: round_currency(self.invested),
            value: round_currency(self.balance),
        }
    }
}

pub fn project(
    monthly_amount: f64,
    annual_rate_percent: f64,
    years: u32,
    annual_step_up_percent: f64,
) -> Projection {
    let mut account =
        SipAccount::new(monthly_amount, annual_rate_percent, annual_step_up_percent);
    for _ in 0..years {
        account.run_year();
    }
    account.projection()
}

pub(crate) fn round_currency(amount: f64) -> i64 {
    amount.round() as i64
}
