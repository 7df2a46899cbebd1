use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, trace};

use crate::error::{Result, WorklogError};
use crate::format::OutputFormat;
use crate::quarter::QuarterDescriptor;

pub const WORKLOG_TOPIC: &str = "WorkLog";

/// Read-only inputs of a single render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub customer: String,
    pub author_name: String,
    pub author_email: String,
    pub descriptor: QuarterDescriptor,
}

impl RenderContext {
    pub fn new(
        customer: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        descriptor: QuarterDescriptor,
    ) -> Self {
        Self {
            customer: customer.into(),
            author_name: author_name.into(),
            author_email: author_email.into(),
            descriptor,
        }
    }

    pub fn quarter(&self) -> u32 {
        self.descriptor.quarter
    }

    pub fn year(&self) -> i32 {
        self.descriptor.year
    }

    fn validate(&self) -> Result<()> {
        let d = &self.descriptor;
        if d.first_day > d.last_day {
            return Err(WorklogError::Render(format!(
                "first day {} is after last day {}",
                d.first_day, d.last_day
            )));
        }
        if d.first_week > d.last_week {
            return Err(WorklogError::Render(format!(
                "first week {} is after last week {}",
                d.first_week, d.last_week
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorklogRenderer {
    extras: bool,
}

impl WorklogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the PTO and check-in sections after the weekly log.
    pub fn with_extras(mut self, extras: bool) -> Self {
        self.extras = extras;
        self
    }

    /// Walks weeks from last to first and, inside each week, days from the
    /// cursor back towards Sunday.
    #[tracing::instrument(skip(self, ctx, format), fields(format_id = format.id()))]
    pub fn render(&self, ctx: &RenderContext, format: &dyn OutputFormat) -> Result<String> {
        ctx.validate()?;
        let d = &ctx.descriptor;

        let mut out = String::new();
        out.push_str(&format.directives());
        out.push_str(&format.header_main(ctx));
        out.push_str(&format.header_topic(WORKLOG_TOPIC));

        let mut cursor = d.last_day;
        let mut days = 0usize;
        for week_number in (d.first_week..=d.last_week).rev() {
            let offset = i64::from(cursor.weekday().num_days_from_sunday());
            let sunday = cursor - Duration::days(offset);
            trace!(week_number, %cursor, %sunday, "rendering week");
            out.push_str(&format.header_week(week_number, sunday));

            for day in 0..offset {
                let print_day = cursor - Duration::days(day);
                if d.is_day_printable(print_day) {
                    out.push_str(&format.header_daily(ctx, print_day));
                    out.push_str(&format.item_daily());
                    days += 1;
                }
            }

            cursor = previous_saturday(cursor, offset);
        }

        if self.extras {
            out.push_str(&format.header_pto());
            out.push_str(&format.header_check_in(ctx));
        }

        debug!(
            weeks = d.last_week - d.first_week + 1,
            days,
            bytes = out.len(),
            "rendered worklog"
        );
        Ok(out)
    }
}

fn previous_saturday(cursor: NaiveDate, offset: i64) -> NaiveDate {
    cursor - Duration::days(offset + 1)
}
