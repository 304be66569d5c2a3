//! Interactive menu
//!
//! A line-oriented loop over any `BufRead`/`Write` pair. The main menu
//! switches between TODO mode and Calendar mode. Failed actions are reported
//! and the loop continues; leaving a mode saves pending changes and quitting
//! always saves. End of input behaves like `q`.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::calendar::{build_month_report, month_of, previous_month_of};
use crate::cli::view;
use crate::error::{Error, Result};
use crate::model::{EntityId, Priority, RepeatType};
use crate::render::render_month_report;
use crate::session::Session;
use crate::store::{DeleteSummary, TodoStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    Back,
    Quit,
}

/// Answer to an entry prompt.
enum Reply<T> {
    Given(T),
    /// The user typed `q`.
    Cancelled,
    /// Input ended.
    Closed,
}

impl<T> Reply<T> {
    fn try_map<U>(self, f: impl FnOnce(T) -> Result<U>) -> Result<Reply<U>> {
        Ok(match self {
            Reply::Given(value) => Reply::Given(f(value)?),
            Reply::Cancelled => Reply::Cancelled,
            Reply::Closed => Reply::Closed,
        })
    }
}

/// Unwrap a `Result<Reply<T>>` inside an action: cancel returns to the mode
/// menu and end of input quits.
macro_rules! answer {
    ($menu:ident, $reply:expr) => {
        match $reply? {
            Reply::Given(value) => value,
            Reply::Cancelled => {
                writeln!($menu.out, "Cancelled.")?;
                return Ok(Flow::Stay);
            }
            Reply::Closed => return Ok(Flow::Quit),
        }
    };
}

/// Like `answer!`, but hands a non-value reply back to the caller.
macro_rules! answer_or {
    ($reply:expr) => {
        match $reply? {
            Reply::Given(value) => value,
            Reply::Cancelled => return Ok(Reply::Cancelled),
            Reply::Closed => return Ok(Reply::Closed),
        }
    };
}

pub struct Menu<'s, R, W> {
    session: &'s mut Session,
    input: R,
    out: W,
    color: bool,
}

impl<'s, R: BufRead, W: Write> Menu<'s, R, W> {
    pub fn new(session: &'s mut Session, input: R, out: W) -> Self {
        Self {
            session,
            input,
            out,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Run until the user quits or input ends, then save.
    pub fn run(mut self) -> Result<()> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "=== todocal ===")?;
            writeln!(self.out, "t  TODO mode")?;
            writeln!(self.out, "c  Calendar mode")?;
            writeln!(self.out, "q  Quit")?;
            let Some(choice) = self.ask("Select mode: ")? else {
                break;
            };
            let flow = match choice.as_str() {
                "t" => self.todo_mode()?,
                "c" => self.calendar_mode()?,
                "q" => Flow::Quit,
                "" => Flow::Stay,
                other => {
                    writeln!(self.out, "Unknown mode '{other}'")?;
                    Flow::Stay
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }
        self.session.flush()?;
        writeln!(self.out, "Saved. Bye.")?;
        Ok(())
    }

    // =========================================================================
    // TODO mode
    // =========================================================================

    fn todo_mode(&mut self) -> Result<Flow> {
        let flow = loop {
            writeln!(self.out)?;
            writeln!(self.out, "--- TODO mode ---")?;
            writeln!(self.out, "p   new project      t   new task")?;
            writeln!(self.out, "pl  list projects    tl  list tasks")?;
            writeln!(self.out, "f   finish task")?;
            writeln!(self.out, "pd  delete project   td  delete task")?;
            writeln!(self.out, "rm  rename           cp  change priority")?;
            writeln!(self.out, "cr  change repeat")?;
            writeln!(self.out, "r   back             q   quit")?;
            let Some(choice) = self.ask("Command: ")? else {
                break Flow::Quit;
            };
            let result = match choice.as_str() {
                "p" => self.create_project(),
                "t" => self.create_task(),
                "pl" => self.list_projects(),
                "tl" => self.list_tasks(),
                "f" => self.complete_task(),
                "pd" => self.delete_project(),
                "td" => self.delete_task(),
                "rm" => self.rename(),
                "cp" => self.change_priority(),
                "cr" => self.change_repeat(),
                "r" => Ok(Flow::Back),
                "q" => Ok(Flow::Quit),
                "" => Ok(Flow::Stay),
                other => {
                    writeln!(self.out, "Unknown command '{other}'")?;
                    Ok(Flow::Stay)
                }
            };
            match result {
                Ok(Flow::Stay) => {}
                Ok(flow) => break flow,
                Err(err) => self.report(&err)?,
            }
        };

        if flow == Flow::Back && self.session.flush_if_dirty()? {
            writeln!(self.out, "Saved.")?;
        }
        Ok(flow)
    }

    fn create_project(&mut self) -> Result<Flow> {
        let name = answer!(self, self.field("Project name (q=back): "));
        let priority = answer!(self, self.ask_priority());
        let project = self.session.store_mut().create_project(&name, priority)?;
        let position = self
            .session
            .store()
            .project_position(project.id)
            .unwrap_or(0);
        let line = view::project_line(position, &project, self.color);
        writeln!(self.out, "Created {line}")?;
        Ok(Flow::Stay)
    }

    fn create_task(&mut self) -> Result<Flow> {
        if self.session.store().projects().is_empty() {
            writeln!(self.out, "Create a project first.")?;
            return Ok(Flow::Stay);
        }
        self.print_tree()?;
        let parent = answer!(self, self.field_id("Parent id, project or task (q=back): "));
        let name = answer!(self, self.field("Task name (q=back): "));
        let priority = answer!(self, self.ask_priority());
        let repeat = answer!(self, self.ask_repeat());
        let task = self
            .session
            .store_mut()
            .create_task(parent, &name, priority, repeat)?;
        let position = self
            .session
            .store()
            .project_position(task.project_id)
            .unwrap_or(0);
        let line = view::task_line(position, &task, self.color);
        writeln!(self.out, "Created {}", line.trim_start())?;
        Ok(Flow::Stay)
    }

    fn list_projects(&mut self) -> Result<Flow> {
        let lines = view::project_lines(self.session.store(), self.color);
        if lines.is_empty() {
            writeln!(self.out, "No projects.")?;
        }
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(Flow::Stay)
    }

    fn list_tasks(&mut self) -> Result<Flow> {
        self.print_tree()?;
        Ok(Flow::Stay)
    }

    fn complete_task(&mut self) -> Result<Flow> {
        self.print_tree()?;
        let id = answer!(self, self.field_id("Finished task id (q=back): "));
        let (task, entry) = self.session.store_mut().complete_task(id)?;
        writeln!(
            self.out,
            "Completed '{}' on {} ({} {})",
            task.name, entry.date, entry.weekday, entry.week
        )?;
        Ok(Flow::Stay)
    }

    fn delete_project(&mut self) -> Result<Flow> {
        self.list_projects()?;
        let id = answer!(self, self.field_id("Project id to delete (q=back): "));
        self.delete_confirmed(|store, confirmed| store.delete_project(id, confirmed))
    }

    fn delete_task(&mut self) -> Result<Flow> {
        self.print_tree()?;
        let id = answer!(self, self.field_id("Task id to delete (q=back): "));
        self.delete_confirmed(|store, confirmed| store.delete_task(id, confirmed))
    }

    /// Try an unconfirmed delete first and ask before cascading.
    fn delete_confirmed<F>(&mut self, mut delete: F) -> Result<Flow>
    where
        F: FnMut(&mut TodoStore, bool) -> Result<DeleteSummary>,
    {
        let summary = match delete(self.session.store_mut(), false) {
            Err(Error::ConfirmationRequired { target, count }) => {
                writeln!(self.out, "Warning: {target} has {count} dependent task(s).")?;
                let Some(answer) = self.ask("Delete them all? (y/N): ")? else {
                    return Ok(Flow::Quit);
                };
                if !matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
                    writeln!(self.out, "Cancelled.")?;
                    return Ok(Flow::Stay);
                }
                delete(self.session.store_mut(), true)?
            }
            other => other?,
        };
        writeln!(
            self.out,
            "Deleted. Tasks removed: {}, calendar entries removed: {}",
            summary.removed_tasks, summary.removed_entries
        )?;
        Ok(Flow::Stay)
    }

    fn rename(&mut self) -> Result<Flow> {
        self.print_tree()?;
        let id = answer!(self, self.field_id("Project or task id to rename (q=back): "));
        let name = answer!(self, self.field("New name (q=back): "));
        let kind = self.session.store_mut().rename(id, &name)?;
        writeln!(self.out, "Renamed {kind} {id}.")?;
        Ok(Flow::Stay)
    }

    fn change_priority(&mut self) -> Result<Flow> {
        self.print_tree()?;
        let id = answer!(self, self.field_id("Project or task id (q=back): "));
        let answer = answer!(self, self.field("New priority (h/m/l): "));
        let priority: Priority = answer.parse()?;
        let kind = self.session.store_mut().set_priority(id, priority)?;
        writeln!(self.out, "Priority of {kind} {id} is now {priority}.")?;
        Ok(Flow::Stay)
    }

    fn change_repeat(&mut self) -> Result<Flow> {
        self.print_tree()?;
        let id = answer!(self, self.field_id("Task id (q=back): "));
        let answer = answer!(self, self.field("Repeat (n/d/w/m): "));
        let repeat: RepeatType = answer.parse()?;
        self.session.store_mut().set_repeat_type(id, repeat)?;
        writeln!(self.out, "Repeat of task {id} is now {repeat}.")?;
        Ok(Flow::Stay)
    }

    // =========================================================================
    // Calendar mode
    // =========================================================================

    fn calendar_mode(&mut self) -> Result<Flow> {
        let flow = loop {
            writeln!(self.out)?;
            writeln!(self.out, "--- Calendar mode ---")?;
            writeln!(self.out, "1  this month (default)")?;
            writeln!(self.out, "2  last month")?;
            writeln!(self.out, "3  pick year and month")?;
            writeln!(self.out, "r  back             q  quit")?;
            let Some(choice) = self.ask("Select: ")? else {
                break Flow::Quit;
            };
            let today = self.session.store().clock().today();
            let month = match choice.as_str() {
                "" | "1" => Ok(Reply::Given(month_of(today))),
                "2" => Ok(Reply::Given(previous_month_of(today))),
                "3" => self.ask_month(),
                "r" => break Flow::Back,
                "q" => break Flow::Quit,
                other => {
                    writeln!(self.out, "Unknown selection '{other}'")?;
                    continue;
                }
            };
            let outcome = match month {
                Ok(Reply::Given((year, month))) => self.print_month(year, month),
                Ok(Reply::Cancelled) => Ok(()),
                Ok(Reply::Closed) => break Flow::Quit,
                Err(err) => Err(err),
            };
            if let Err(err) = outcome {
                self.report(&err)?;
            }
        };

        if flow == Flow::Back && self.session.flush_if_dirty()? {
            writeln!(self.out, "Saved.")?;
        }
        Ok(flow)
    }

    fn ask_month(&mut self) -> Result<Reply<(i32, u32)>> {
        let year = answer_or!(self.field("Year (q=back): "));
        let month = answer_or!(self.field("Month 1-12 (q=back): "));
        let year: i32 = year
            .parse()
            .map_err(|_| Error::Validation(format!("'{year}' is not a year")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| Error::Validation(format!("'{month}' is not a month")))?;
        Ok(Reply::Given((year, month)))
    }

    fn print_month(&mut self, year: i32, month: u32) -> Result<()> {
        let report = build_month_report(year, month, self.session.store().calendar().entries())?;
        debug!(year, month, groups = report.groups.len(), "month report");
        for line in render_month_report(&report) {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    // =========================================================================
    // Prompt helpers
    // =========================================================================

    /// Prompt and read one trimmed line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Entry prompt where a bare `q` backs out of the current action.
    fn field(&mut self, prompt: &str) -> Result<Reply<String>> {
        Ok(match self.ask(prompt)? {
            Some(text) if text == "q" => Reply::Cancelled,
            Some(text) => Reply::Given(text),
            None => Reply::Closed,
        })
    }

    fn field_id(&mut self, prompt: &str) -> Result<Reply<EntityId>> {
        self.field(prompt)?.try_map(|text| parse_id(&text))
    }

    /// Blank answers mean medium.
    fn ask_priority(&mut self) -> Result<Reply<Priority>> {
        self.field("Priority (h/m/l) [m]: ")?.try_map(|text| {
            if text.is_empty() {
                Ok(Priority::Medium)
            } else {
                text.parse()
            }
        })
    }

    /// Blank answers mean none.
    fn ask_repeat(&mut self) -> Result<Reply<RepeatType>> {
        self.field("Repeat (n/d/w/m) [n]: ")?.try_map(|text| {
            if text.is_empty() {
                Ok(RepeatType::None)
            } else {
                text.parse()
            }
        })
    }

    fn print_tree(&mut self) -> Result<()> {
        let order = self.session.config().sort_order;
        let lines = view::tree_lines(self.session.store(), order, self.color);
        if lines.is_empty() {
            writeln!(self.out, "No projects.")?;
        }
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn report(&mut self, err: &Error) -> Result<()> {
        debug!(error = %err, "menu action failed");
        writeln!(self.out, "error: {err}")?;
        Ok(())
    }
}

fn parse_id(text: &str) -> Result<EntityId> {
    text.parse()
        .map_err(|_| Error::Validation(format!("'{text}' is not a numeric id")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::store::Clock;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn session(temp: &TempDir) -> Session {
        let clock = Clock::Fixed(NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        Session::open_with_clock(Storage::new(temp.path()), clock).unwrap()
    }

    fn drive(session: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        Menu::new(session, script.as_bytes(), &mut out)
            .run()
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn creates_and_lists_in_todo_mode() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        let out = drive(
            &mut session,
            "t\np\nLaunch\nh\nt\n1\nDesign\n\n\ntl\nq\n",
        );

        assert!(out.contains("Created [1] (id:1)   Launch  (high)"));
        assert!(out.contains("Created [1.1] (id:2)   Design"));
        assert!(out.contains("  [1.1] (id:2)   Design"));
        assert!(out.ends_with("Saved. Bye.\n"));
        assert!(!session.is_dirty());

        let reopened = Storage::new(temp.path()).load_all().unwrap();
        assert_eq!(reopened.tasks.len(), 1);
    }

    #[test]
    fn errors_are_reported_and_loop_continues() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        let out = drive(&mut session, "t\nf\n42\nf\nabc\npl\nq\n");

        assert!(out.contains("no open task with id 42"));
        assert!(out.contains("'abc' is not a numeric id"));
        assert!(out.contains("No projects."));
    }

    #[test]
    fn cascade_delete_asks_first() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        let project = session
            .store_mut()
            .create_project("Launch", Priority::High)
            .unwrap();
        session
            .store_mut()
            .create_task(project.id, "Design", Priority::Medium, RepeatType::None)
            .unwrap();

        let out = drive(&mut session, "t\npd\n1\nn\npd\n1\ny\nq\n");
        assert!(out.contains("Warning: project 'Launch' has 1 dependent task(s)."));
        assert!(out.contains("Cancelled."));
        assert!(out.contains("Tasks removed: 1, calendar entries removed: 0"));
        assert!(session.store().projects().is_empty());
        assert!(session.store().tasks().is_empty());
    }

    #[test]
    fn calendar_mode_renders_months() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        let project = session
            .store_mut()
            .create_project("Launch", Priority::High)
            .unwrap();
        let task = session
            .store_mut()
            .create_task(project.id, "Design", Priority::Medium, RepeatType::None)
            .unwrap();
        session.store_mut().complete_task(task.id).unwrap();

        let out = drive(&mut session, "c\n\n2\n3\n2024\n13\nr\nq\n");
        assert!(out.contains("Completed tasks for 2024-06"));
        assert!(out.contains("Completed tasks for 2024-05"));
        assert!(out.contains("| Design"));
        assert!(out.contains("error: "));
        assert!(out.contains("Saved."));
    }

    #[test]
    fn end_of_input_quits_and_saves() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        drive(&mut session, "t\np\nLaunch\n");

        let saved = Storage::new(temp.path()).load_all().unwrap();
        assert!(saved.projects.is_empty());

        drive(&mut session, "t\np\nLaunch\nl\n");
        let saved = Storage::new(temp.path()).load_all().unwrap();
        assert_eq!(saved.projects.len(), 1);
        assert_eq!(saved.projects[0].priority, Priority::Low);
    }

    #[test]
    fn bare_q_backs_out_of_entry_prompts() {
        let temp = TempDir::new().unwrap();
        let mut session = session(&temp);
        let out = drive(&mut session, "t\np\nq\np\nLaunch\nq\nrm\nq\nr\nc\n3\nq\nq\n");

        assert_eq!(out.matches("Cancelled.").count(), 3);
        assert!(session.store().projects().is_empty());
        assert!(!out.contains("Completed tasks for"));
        assert!(out.ends_with("Saved. Bye.\n"));
    }

    #[test]
    fn parse_id_rejects_text() {
        assert_eq!(parse_id("7").unwrap(), 7);
        assert!(matches!(parse_id("seven"), Err(Error::Validation(_))));
    }
}
