use std::num::ParseIntError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid Entry. Try again.")]
    Unknown(String),
    #[error("invalid arguments for {command}, usage: {usage}")]
    InvalidArguments {
        command: &'static str,
        usage: &'static str,
    },
    #[error("invalid number for {name}: {value:?}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("unterminated quote")]
    UnterminatedQuote,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Student {
        github: String,
    },
    NewStudent {
        first_name: String,
        last_name: String,
        github: String,
    },
    Project {
        title: String,
    },
    NewProject {
        title: String,
        description: String,
        max_grade: i64,
    },
    Grade {
        github: String,
        title: String,
    },
    Assign {
        github: String,
        title: String,
        grade: i64,
    },
    Grades {
        github: String,
    },
    Quit,
}

impl Command {
    /// Parse an input line. `Ok(None)` is returned for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut tokens = tokenize(line)?.into_iter();
        let Some(command) = tokens.next() else {
            return Ok(None);
        };
        let args = tokens.collect::<Vec<_>>();
        let command = match command.as_str() {
            "student" => {
                let [github] = arguments("student", "student <github>", args)?;
                Command::Student { github }
            }
            "new_student" => {
                let [first_name, last_name, github] = arguments(
                    "new_student",
                    "new_student <first name> <last name> <github>",
                    args,
                )?;
                Command::NewStudent {
                    first_name,
                    last_name,
                    github,
                }
            }
            "project" => {
                let [title] = arguments("project", "project <title>", args)?;
                Command::Project { title }
            }
            "new_project" => {
                let [title, description, max_grade] = arguments(
                    "new_project",
                    "new_project <title> <description> <max grade>",
                    args,
                )?;
                Command::NewProject {
                    title,
                    description,
                    max_grade: number("max grade", max_grade)?,
                }
            }
            "grade" => {
                let [github, title] = arguments("grade", "grade <github> <title>", args)?;
                Command::Grade { github, title }
            }
            "assign" => {
                let [github, title, grade] =
                    arguments("assign", "assign <github> <title> <grade>", args)?;
                Command::Assign {
                    github,
                    title,
                    grade: number("grade", grade)?,
                }
            }
            "grades" => {
                let [github] = arguments("grades", "grades <github>", args)?;
                Command::Grades { github }
            }
            "quit" => Command::Quit,
            _ => return Err(CommandError::Unknown(command)),
        };
        Ok(Some(command))
    }
}

fn arguments<const N: usize>(
    command: &'static str,
    usage: &'static str,
    args: Vec<String>,
) -> Result<[String; N], CommandError> {
    args.try_into()
        .map_err(|_| CommandError::InvalidArguments { command, usage })
}

fn number(name: &'static str, value: String) -> Result<i64, CommandError> {
    value
        .parse()
        .map_err(|source| CommandError::InvalidNumber {
            name,
            value,
            source,
        })
}

/// Split a line on whitespace. A double-quoted run, which may contain
/// whitespace, is part of the current token without its quotes.
fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.get_or_insert_with(String::new);
            }
            c if c.is_whitespace() && !quoted => tokens.extend(current.take()),
            c => current.get_or_insert_with(String::new).push(c),
        }
    }
    if quoted {
        return Err(CommandError::UnterminatedQuote);
    }
    tokens.extend(current);
    Ok(tokens)
}
