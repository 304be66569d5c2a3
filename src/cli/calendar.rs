//! todocal calendar command implementation

use crate::calendar::{build_month_report, month_of, previous_month_of};
use crate::cli::{open_session, Globals};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::render::render_month_report;

/// Options for `todocal calendar`
pub struct CalendarOptions {
    /// Explicit `(year, month)`; the current month when absent
    pub month: Option<(i32, u32)>,
    pub prev: bool,
    pub globals: Globals,
}

pub fn run(options: CalendarOptions) -> Result<()> {
    let session = open_session(options.globals.data_dir.clone())?;
    let store = session.store();
    let today = store.clock().today();

    let (year, month) = match options.month {
        Some(explicit) => explicit,
        None if options.prev => previous_month_of(today),
        None => month_of(today),
    };
    let report = build_month_report(year, month, store.calendar().entries())?;

    let human = HumanOutput::new(render_month_report(&report).join("\n"));

    emit_success(options.globals.output(), "calendar", &report, Some(&human))
}
