mod quota_period;

pub use quota_period::{roll_if_new_period, same_billing_period};
