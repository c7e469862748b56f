use crate::command::{Command, CommandError};
use crate::database::{Database, StoreError};
use crate::display::*;
use crate::model::Student;
use futures_util::TryStreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive session over a database. Results and error messages are
/// written to `out`.
pub struct Session<'a, W> {
    db: &'a mut Database,
    out: W,
}

impl<'a, W: Write> Session<'a, W> {
    pub fn new(db: &'a mut Database, out: W) -> Self {
        Self { db, out }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Prompt for and execute commands read from `input` until `quit` or
    /// end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(
        &mut self,
        mut input: R,
        prompt: &str,
    ) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            write!(self.out, "{prompt}> ")?;
            self.out.flush()?;
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                writeln!(self.out)?;
                return Ok(());
            }
            match std::str::from_utf8(&buf) {
                Ok(line) => {
                    if self.execute(line.trim_end_matches(['\r', '\n'])).await? == Flow::Quit {
                        return Ok(());
                    }
                }
                Err(e) => self.report_invalid_input(&e)?,
            }
        }
    }

    /// Prompt for and execute commands with line editing and history until
    /// `quit`, end of input or interruption.
    pub async fn run_editor(
        &mut self,
        editor: &mut DefaultEditor,
        prompt: &str,
    ) -> Result<(), ReadlineError> {
        let prompt = format!("{prompt}> ");
        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if self.execute(&line).await? == Flow::Quit {
                        return Ok(());
                    }
                }
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => return Ok(()),
                Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
                    self.report_invalid_input(&e)?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn report_invalid_input(&mut self, e: &dyn std::error::Error) -> io::Result<()> {
        debug!(error = %e, "invalid input line");
        writeln!(self.out, "Error: invalid UTF-8 input")
    }

    /// Execute one command line. Only console I/O errors are returned,
    /// everything else is reported to the user.
    pub async fn execute(&mut self, line: &str) -> io::Result<Flow> {
        match self.perform(line).await {
            Ok(flow) => Ok(flow),
            Err(Error::Io(e)) => Err(e),
            Err(e) => {
                debug!(line, error = ?e, "command failed");
                match e {
                    Error::Command(CommandError::Unknown(_)) => writeln!(self.out, "{e}")?,
                    e => writeln!(self.out, "Error: {e}")?,
                }
                Ok(Flow::Continue)
            }
        }
    }

    async fn perform(&mut self, line: &str) -> Result<Flow, Error> {
        let Some(command) = Command::parse(line)? else {
            return Ok(Flow::Continue);
        };
        match command {
            Command::Student { github } => match self.db.student_by_github(&github).await? {
                Some(student) => display_student(&mut self.out, &student)?,
                None => display_no_student(&mut self.out, &github)?,
            },
            Command::NewStudent {
                first_name,
                last_name,
                github,
            } => {
                self.db
                    .create_student(&first_name, &last_name, &github)
                    .await?;
                display_new_student(
                    &mut self.out,
                    &Student {
                        first_name,
                        last_name,
                        github,
                    },
                )?;
            }
            Command::Project { title } => match self.db.project_by_title(&title).await? {
                Some(project) => display_project(&mut self.out, &project)?,
                None => display_no_project(&mut self.out, &title)?,
            },
            Command::NewProject {
                title,
                description,
                max_grade,
            } => {
                self.db
                    .create_project(&title, &description, max_grade)
                    .await?;
                display_new_project(&mut self.out, &title, max_grade)?;
            }
            Command::Grade { github, title } => match self.db.grade_for(&github, &title).await? {
                Some(grade) => display_grade(&mut self.out, &grade)?,
                None => display_no_grade(&mut self.out, &github, &title)?,
            },
            Command::Assign {
                github,
                title,
                grade,
            } => {
                self.db.assign_grade(&github, &title, grade).await?;
                display_assigned(&mut self.out, &github, &title, grade)?;
            }
            Command::Grades { github } => {
                let mut grades = self.db.grades_for(&github);
                while let Some(grade) = grades.try_next().await.map_err(StoreError::from)? {
                    display_grade_line(&mut self.out, &grade)?;
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::database::testing::database;

    const PROMPT: &str = "HBA Database";

    async fn session_output(db: &mut Database, input: &str) -> String {
        let mut session = Session::new(db, Vec::new());
        session.run(input.as_bytes(), PROMPT).await.unwrap();
        String::from_utf8(session.into_output()).unwrap()
    }

    /// Output without the prompts.
    async fn run(db: &mut Database, input: &str) -> String {
        session_output(db, input)
            .await
            .replace(&format!("{PROMPT}> "), "")
    }

    #[tokio::test]
    async fn test_scenario() {
        let mut db = database().await;
        let output = run(
            &mut db,
            r#"new_student Ada Lovelace adalove
student adalove
new_project Calculator "Basic arithmetic" 100
project Calculator
assign adalove Calculator 95
grade adalove Calculator
quit
"#,
        )
        .await;
        assert_eq!(
            output,
            "Ada Lovelace with GitHub username: adalove has been added to database!
Student: Ada Lovelace
GitHub account: adalove
Calculator with Max grade: 100 has been added to database!
Project: Calculator
Description: Basic arithmetic
Max Grade: 100
adalove has been given a grade of: 95 on Calculator
Project: Calculator
Grade: 95
"
        );
    }

    #[tokio::test]
    async fn test_quit_stops_prompting() {
        let mut db = database().await;
        let output = session_output(&mut db, "quit\nstudent adalove\n").await;
        assert_eq!(output, format!("{PROMPT}> "));
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let mut db = database().await;
        let output = session_output(&mut db, "\n").await;
        assert_eq!(output, format!("{PROMPT}> {PROMPT}> \n"));
    }

    #[tokio::test]
    async fn test_errors_do_not_end_session() {
        let mut db = database().await;
        let output = run(
            &mut db,
            "hello world
student
assign adalove Calculator A+
student adalove
project Calculator
grade adalove Calculator
new_student Ada Lovelace adalove
new_student Ada Byron adalove
student adalove
",
        )
        .await;
        let lines = output.trim_end().lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Invalid Entry. Try again.");
        assert_eq!(
            lines[1],
            "Error: invalid arguments for student, usage: student <github>"
        );
        assert_eq!(lines[2], r#"Error: invalid number for grade: "A+""#);
        assert_eq!(lines[3], "No student with GitHub account adalove");
        assert_eq!(lines[4], "No project titled Calculator");
        assert_eq!(lines[5], "No grade for adalove on Calculator");
        assert!(lines[7].starts_with("Error: insert rejected: "), "{}", lines[7]);
        assert_eq!(lines[8], "Student: Ada Lovelace");
        assert_eq!(lines.len(), 10);
    }

    #[tokio::test]
    async fn test_grade_listing() {
        let mut db = database().await;
        let output = run(
            &mut db,
            "grades adalove
assign adalove Calculator 95
assign adalove Blockly 12
assign adalove Calculator 80
assign jhacks Calculator 40
grades adalove
",
        )
        .await;
        let mut listing = output
            .lines()
            .filter(|l| l.starts_with("Project: "))
            .collect::<Vec<_>>();
        listing.sort_unstable();
        assert_eq!(
            listing,
            vec![
                "Project: Blockly Grade: 12",
                "Project: Calculator Grade: 80",
                "Project: Calculator Grade: 95",
            ]
        );
    }

    #[tokio::test]
    async fn test_execute() {
        let mut db = database().await;
        let mut session = Session::new(&mut db, Vec::new());
        assert_eq!(
            session.execute("new_student Ada Lovelace adalove").await.unwrap(),
            Flow::Continue
        );
        assert_eq!(session.execute("frobnicate").await.unwrap(), Flow::Continue);
        assert_eq!(session.execute("quit").await.unwrap(), Flow::Quit);
        let output = String::from_utf8(session.into_output()).unwrap();
        assert_eq!(
            output,
            "Ada Lovelace with GitHub username: adalove has been added to database!
Invalid Entry. Try again.
"
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_line() {
        let mut db = database().await;
        let mut session = Session::new(&mut db, Vec::new());
        session
            .run(
                &b"student \xff\xfe\nnew_student Ada Lovelace adalove\n"[..],
                PROMPT,
            )
            .await
            .unwrap();
        let output = String::from_utf8(session.into_output()).unwrap();
        assert_eq!(
            output.replace(&format!("{PROMPT}> "), ""),
            "Error: invalid UTF-8 input
Ada Lovelace with GitHub username: adalove has been added to database!

"
        );
        assert!(db.student_by_github("adalove").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let mut db = database().await;
        let output = run(&mut db, "new_student Ada Lovelace adalove\r\nstudent adalove\r\n").await;
        assert!(output.contains("GitHub account: adalove\n"), "{output}");
    }

    #[tokio::test]
    async fn test_invalid_entry_changes_nothing() {
        let mut db = database().await;
        let output = run(
            &mut db,
            "new_students Ada Lovelace adalove
add_project Calculator Arithmetic 100
assign_grade adalove Calculator 95
",
        )
        .await;
        assert_eq!(output.trim_end().lines().count(), 3);
        assert!(
            output
                .trim_end()
                .lines()
                .all(|l| l == "Invalid Entry. Try again.")
        );
        assert_eq!(db.student_by_github("adalove").await.unwrap(), None);
        assert_eq!(db.project_by_title("Calculator").await.unwrap(), None);
        assert_eq!(db.grade_for("adalove", "Calculator").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_project_is_rejected() {
        let mut db = database().await;
        let output = run(
            &mut db,
            r#"new_project Calculator "Basic arithmetic" 100
new_project Calculator "Advanced arithmetic" 50
project Calculator
"#,
        )
        .await;
        let lines = output.trim_end().lines().collect::<Vec<_>>();
        assert!(lines[1].starts_with("Error: insert rejected: "), "{}", lines[1]);
        assert_eq!(
            &lines[2..],
            [
                "Project: Calculator",
                "Description: Basic arithmetic",
                "Max Grade: 100",
            ]
        );
    }
}
