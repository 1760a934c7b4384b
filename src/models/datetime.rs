//! DateTime model: leaves the calendar date as is and obfuscates the time
//! of day by permuting the difference from the previous value within its
//! magnitude class. Continuity of time values across the table survives.
//!
//! The calendar is injected at construction so the server timezone is a
//! caller decision, not a process global; tests pass a fixed UTC calendar.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, TimestampSecondArray};
use arrow::datatypes::DataType;
use chrono::{LocalResult, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::error::SamarError;
use crate::kernels::feistel::transform_signed;
use crate::kernels::sip::hash_u64;
use crate::models::{type_mismatch, Model};

pub struct DateTimeModel {
    seed: u64,
    src_prev_value: i64,
    res_prev_value: i64,
    calendar: Tz,
}

impl DateTimeModel {
    pub fn new(seed: u64, calendar: Tz) -> Self {
        Self {
            seed,
            src_prev_value: 0,
            res_prev_value: 0,
            calendar,
        }
    }

    /// Epoch seconds at the start of the calendar day containing `t`.
    fn start_of_day(&self, t: i64) -> i64 {
        match self.calendar.timestamp_opt(t, 0) {
            LocalResult::Single(dt) => t - i64::from(dt.time().num_seconds_from_midnight()),
            // Out of chrono's representable range; fall back to UTC days.
            _ => t - t.rem_euclid(86_400),
        }
    }
}

impl Model for DateTimeModel {
    fn generate(&mut self, column: &dyn Array) -> Result<ArrayRef, SamarError> {
        let src = column
            .as_any()
            .downcast_ref::<TimestampSecondArray>()
            .ok_or_else(|| type_mismatch("second-precision timestamp", column))?;

        let mut values = Vec::with_capacity(src.len());
        for &src_datetime in src.values().iter() {
            let src_date = self.start_of_day(src_datetime);

            let src_diff = src_datetime.wrapping_sub(self.src_prev_value);
            let res_diff = i64::from(transform_signed(src_diff, self.seed) as i32);

            let new_datetime = self.res_prev_value.wrapping_add(res_diff);
            let new_time = new_datetime - self.start_of_day(new_datetime);
            let res = src_date + new_time;

            self.src_prev_value = src_datetime;
            self.res_prev_value = res;
            values.push(res);
        }

        let out = TimestampSecondArray::new(values.into(), src.nulls().cloned());
        let out = if let DataType::Timestamp(_, tz) = src.data_type() {
            out.with_timezone_opt(tz.clone())
        } else {
            out
        };
        Ok(Arc::new(out))
    }

    fn update_seed(&mut self) {
        self.seed = hash_u64(self.seed);
    }
}
