//! Fixed-width text layout for month reports.
//!
//! Widths are counted in display columns: a character that encodes to a single
//! UTF-8 byte takes one column, anything else takes two.

use crate::calendar::{MonthReport, WeekGroup};

pub const WEEK_WIDTH: usize = 4;
pub const CATEGORY_WIDTH: usize = 9;
pub const DAYS_WIDTH: usize = 12;
pub const TASK_WIDTH: usize = 22;
pub const PROJECT_WIDTH: usize = 22;

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

fn char_width(ch: char) -> usize {
    if ch.len_utf8() == 1 {
        1
    } else {
        2
    }
}

pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Pad `text` to exactly `width` columns, truncating with `...` when too wide.
pub fn format_cell(text: &str, width: usize) -> String {
    let full_width = display_width(text);
    if full_width <= width {
        let mut cell = String::with_capacity(text.len() + width - full_width);
        cell.push_str(text);
        cell.extend(std::iter::repeat(' ').take(width - full_width));
        return cell;
    }

    let budget = width.saturating_sub(ELLIPSIS_WIDTH);
    let mut cell = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = char_width(ch);
        if used + w > budget {
            break;
        }
        cell.push(ch);
        used += w;
    }
    cell.push_str(ELLIPSIS);
    used += ELLIPSIS_WIDTH;
    cell.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    cell
}

fn row(week: &str, category: &str, days: &str, task: &str, project: &str) -> String {
    format!(
        "{}| {}| {}| {}| {}",
        format_cell(week, WEEK_WIDTH),
        format_cell(category, CATEGORY_WIDTH),
        format_cell(days, DAYS_WIDTH),
        format_cell(task, TASK_WIDTH),
        format_cell(project, PROJECT_WIDTH),
    )
}

pub fn separator() -> String {
    let mut line = "-".repeat(WEEK_WIDTH);
    for width in [CATEGORY_WIDTH, DAYS_WIDTH, TASK_WIDTH, PROJECT_WIDTH] {
        line.push('+');
        line.push_str(&"-".repeat(width + 1));
    }
    line
}

pub fn header() -> String {
    row("Week", "Category", "Days", "Completed task", "Project")
}

/// Rows for one run followed by the separator line.
pub fn render_week_group(group: &WeekGroup) -> Vec<String> {
    let days = group
        .day_numbers()
        .iter()
        .map(|day| day.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let number = group.number.to_string();

    let mut lines = Vec::with_capacity(group.pairs.len() + 1);
    for (index, pair) in group.pairs.iter().enumerate() {
        if index == 0 {
            lines.push(row(
                &number,
                group.category.label(),
                &days,
                &pair.task,
                &pair.project,
            ));
        } else {
            lines.push(row("", "", "", &pair.task, &pair.project));
        }
    }
    lines.push(separator());
    lines
}

pub fn render_month_report(report: &MonthReport) -> Vec<String> {
    let mut lines = vec![
        format!("Completed tasks for {}-{:02}", report.year, report.month),
        header(),
        separator(),
    ];
    for group in &report.groups {
        lines.extend(render_week_group(group));
    }
    lines
}
