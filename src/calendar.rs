//! Completion calendar.
//!
//! Completion events live in an append-only [`CalendarLog`]. A month report
//! splits the month into contiguous runs of days sharing a [`WeekCategory`]
//! and lists the tasks completed within each run.
//!
//! Entries are tied to tasks and projects by name only. Renames rewrite every
//! entry carrying the old name and deletes purge every entry carrying the
//! deleted name, so two entities sharing a name also share history.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::CalendarEntry;

/// Placeholder shown for a run without completions.
pub const EMPTY_MARK: &str = "-";

/// Grouping of weekdays used by the report layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WeekCategory {
    SatSunMon,
    TueWed,
    ThuFri,
}

impl WeekCategory {
    pub fn label(self) -> &'static str {
        match self {
            WeekCategory::SatSunMon => "SatSunMon",
            WeekCategory::TueWed => "TueWed",
            WeekCategory::ThuFri => "ThuFri",
        }
    }
}

impl fmt::Display for WeekCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn weekday_category(weekday: Weekday) -> WeekCategory {
    match weekday {
        Weekday::Sat | Weekday::Sun | Weekday::Mon => WeekCategory::SatSunMon,
        Weekday::Tue | Weekday::Wed => WeekCategory::TueWed,
        Weekday::Thu | Weekday::Fri => WeekCategory::ThuFri,
    }
}

/// Category for an English weekday name as stored in [`CalendarEntry::weekday`].
pub fn weekday_name_category(name: &str) -> Result<WeekCategory> {
    let weekday = Weekday::from_str(name.trim())
        .map_err(|_| Error::Validation(format!("unknown weekday '{name}'")))?;
    Ok(weekday_category(weekday))
}

/// Append-only record of completions, rewritten only by rename and delete cascades.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarLog {
    entries: Vec<CalendarEntry>,
}

impl CalendarLog {
    pub fn new(entries: Vec<CalendarEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CalendarEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<CalendarEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the entry for a completion on `date` and return it.
    pub fn record_completion(
        &mut self,
        date: NaiveDate,
        task_name: &str,
        project_name: &str,
    ) -> CalendarEntry {
        let entry = CalendarEntry {
            date,
            month: format!("{:02}", date.month()),
            week: weekday_category(date.weekday()),
            weekday: date.format("%A").to_string(),
            day: date.day().to_string(),
            completed_task: task_name.to_string(),
            project_name: project_name.to_string(),
        };
        self.entries.push(entry.clone());
        entry
    }

    pub fn rename_task(&mut self, old_name: &str, new_name: &str) -> usize {
        let mut changed = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| entry.completed_task == old_name)
        {
            entry.completed_task = new_name.to_string();
            changed += 1;
        }
        changed
    }

    pub fn rename_project(&mut self, old_name: &str, new_name: &str) -> usize {
        let mut changed = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| entry.project_name == old_name)
        {
            entry.project_name = new_name.to_string();
            changed += 1;
        }
        changed
    }

    pub fn purge_task(&mut self, task_name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.completed_task != task_name);
        before - self.entries.len()
    }

    pub fn purge_project(&mut self, project_name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.project_name != project_name);
        before - self.entries.len()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompletedPair {
    pub task: String,
    pub project: String,
}

impl CompletedPair {
    pub fn placeholder() -> Self {
        Self {
            task: EMPTY_MARK.to_string(),
            project: EMPTY_MARK.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.task == EMPTY_MARK && self.project == EMPTY_MARK
    }
}

/// One run of consecutive days sharing a category.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WeekGroup {
    pub number: u32,
    pub category: WeekCategory,
    pub days: Vec<NaiveDate>,
    /// Never empty: a run without completions holds one placeholder pair.
    pub pairs: Vec<CompletedPair>,
}

impl WeekGroup {
    pub fn day_numbers(&self) -> Vec<u32> {
        self.days.iter().map(|day| day.day()).collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthReport {
    pub year: i32,
    pub month: u32,
    pub groups: Vec<WeekGroup>,
}

impl MonthReport {
    /// Every real (non-placeholder) pair in report order.
    pub fn completions(&self) -> impl Iterator<Item = &CompletedPair> {
        self.groups
            .iter()
            .flat_map(|group| group.pairs.iter())
            .filter(|pair| !pair.is_placeholder())
    }
}

pub fn first_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    if !(1..=12).contains(&month) || year <= 0 {
        return Err(Error::Validation(format!(
            "invalid month {year}-{month:02}"
        )));
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::Validation(format!("invalid month {year}-{month:02}")))
}

/// `(year, month)` containing `date`.
pub fn month_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// `(year, month)` before the month containing `date`.
pub fn previous_month_of(date: NaiveDate) -> (i32, u32) {
    let first = date.with_day(1).unwrap_or(date);
    match first.checked_sub_months(Months::new(1)) {
        Some(prev) => (prev.year(), prev.month()),
        None => month_of(first),
    }
}

pub fn build_month_report(
    year: i32,
    month: u32,
    entries: &[CalendarEntry],
) -> Result<MonthReport> {
    let first = first_day_of_month(year, month)?;

    let mut groups: Vec<WeekGroup> = Vec::new();
    for day in first.iter_days().take_while(|day| day.month() == month) {
        let category = weekday_category(day.weekday());
        match groups.last_mut() {
            Some(group) if group.category == category => group.days.push(day),
            _ => groups.push(WeekGroup {
                number: groups.len() as u32 + 1,
                category,
                days: vec![day],
                pairs: Vec::new(),
            }),
        }
    }

    for group in &mut groups {
        for day in &group.days {
            group.pairs.extend(
                entries
                    .iter()
                    .filter(|entry| entry.date == *day)
                    .map(|entry| CompletedPair {
                        task: entry.completed_task.clone(),
                        project: entry.project_name.clone(),
                    }),
            );
        }
        if group.pairs.is_empty() {
            group.pairs.push(CompletedPair::placeholder());
        }
    }

    Ok(MonthReport {
        year,
        month,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekdays_map_to_three_categories() {
        for day in date(2024, 7, 1).iter_days().take(31) {
            let category = weekday_category(day.weekday());
            let expected = match day.weekday() {
                Weekday::Sat | Weekday::Sun | Weekday::Mon => WeekCategory::SatSunMon,
                Weekday::Tue | Weekday::Wed => WeekCategory::TueWed,
                Weekday::Thu | Weekday::Fri => WeekCategory::ThuFri,
            };
            assert_eq!(category, expected, "{day}");
        }
    }

    #[test]
    fn weekday_names_parse() {
        assert_eq!(
            weekday_name_category("Sunday").unwrap(),
            WeekCategory::SatSunMon
        );
        assert_eq!(weekday_name_category("Wednesday").unwrap(), WeekCategory::TueWed);
        assert_eq!(weekday_name_category("Friday").unwrap(), WeekCategory::ThuFri);
        assert!(matches!(
            weekday_name_category("Caturday"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn record_completion_fills_derived_fields() {
        let mut log = CalendarLog::default();
        // 2024-03-05 is a Tuesday.
        let entry = log.record_completion(date(2024, 3, 5), "Design", "Launch");
        assert_eq!(entry.month, "03");
        assert_eq!(entry.day, "5");
        assert_eq!(entry.weekday, "Tuesday");
        assert_eq!(entry.week, WeekCategory::TueWed);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn runs_split_on_category_change() {
        // June 2024 starts on a Saturday and ends on a Sunday.
        let report = build_month_report(2024, 6, &[]).unwrap();
        let first = &report.groups[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.category, WeekCategory::SatSunMon);
        assert_eq!(first.day_numbers(), vec![1, 2, 3]);
        assert_eq!(report.groups[1].day_numbers(), vec![4, 5]);
        assert_eq!(report.groups[2].day_numbers(), vec![6, 7]);
        let last = report.groups.last().unwrap();
        assert_eq!(last.day_numbers(), vec![29, 30]);
        assert_eq!(last.category, WeekCategory::SatSunMon);

        let total_days: usize = report.groups.iter().map(|g| g.days.len()).sum();
        assert_eq!(total_days, 30);
        for (index, group) in report.groups.iter().enumerate() {
            assert_eq!(group.number as usize, index + 1);
            assert_eq!(group.pairs, vec![CompletedPair::placeholder()]);
        }
    }

    #[test]
    fn partial_leading_run_is_its_own_group() {
        // May 2024 starts on a Wednesday.
        let report = build_month_report(2024, 5, &[]).unwrap();
        assert_eq!(report.groups[0].day_numbers(), vec![1]);
        assert_eq!(report.groups[0].category, WeekCategory::TueWed);
        assert_eq!(report.groups[1].day_numbers(), vec![2, 3]);
    }

    #[test]
    fn entries_land_in_their_run_in_day_order() {
        let mut log = CalendarLog::default();
        log.record_completion(date(2024, 6, 3), "Late", "P");
        log.record_completion(date(2024, 6, 1), "Early", "P");
        log.record_completion(date(2024, 7, 1), "Other month", "P");
        let report = build_month_report(2024, 6, log.entries()).unwrap();
        let tasks: Vec<&str> = report.groups[0]
            .pairs
            .iter()
            .map(|pair| pair.task.as_str())
            .collect();
        assert_eq!(tasks, vec!["Early", "Late"]);
        assert_eq!(report.completions().count(), 2);
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(matches!(
            build_month_report(2024, 13, &[]),
            Err(Error::Validation(_))
        ));
        assert!(build_month_report(0, 1, &[]).is_err());
    }

    #[test]
    fn renames_and_purges_match_by_name() {
        let mut log = CalendarLog::default();
        log.record_completion(date(2024, 6, 3), "Write", "Docs");
        log.record_completion(date(2024, 6, 4), "Write", "Blog");
        log.record_completion(date(2024, 6, 5), "Edit", "Docs");

        assert_eq!(log.rename_task("Write", "Draft"), 2);
        assert_eq!(log.rename_project("Docs", "Manual"), 2);
        assert_eq!(log.purge_project("Blog"), 1);
        assert_eq!(log.purge_task("Edit"), 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].completed_task, "Draft");
        assert_eq!(log.entries()[0].project_name, "Manual");
    }

    #[test]
    fn previous_month_wraps_year() {
        assert_eq!(previous_month_of(date(2024, 1, 31)), (2023, 12));
        assert_eq!(previous_month_of(date(2024, 3, 31)), (2024, 2));
        assert_eq!(month_of(date(2024, 3, 31)), (2024, 3));
    }
}
