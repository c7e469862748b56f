use crate::model::{Grade, Project, Student};
use std::io::{self, Write};

pub fn display_student(out: &mut impl Write, student: &Student) -> io::Result<()> {
    writeln!(out, "Student: {}", student.full_name())?;
    writeln!(out, "GitHub account: {}", student.github)
}

pub fn display_new_student(out: &mut impl Write, student: &Student) -> io::Result<()> {
    writeln!(
        out,
        "{} with GitHub username: {} has been added to database!",
        student.full_name(),
        student.github
    )
}

pub fn display_project(out: &mut impl Write, project: &Project) -> io::Result<()> {
    writeln!(out, "Project: {}", project.title)?;
    writeln!(out, "Description: {}", project.description)?;
    writeln!(out, "Max Grade: {}", project.max_grade)
}

pub fn display_new_project(out: &mut impl Write, title: &str, max_grade: i64) -> io::Result<()> {
    writeln!(
        out,
        "{title} with Max grade: {max_grade} has been added to database!"
    )
}

pub fn display_grade(out: &mut impl Write, grade: &Grade) -> io::Result<()> {
    writeln!(out, "Project: {}", grade.project_title)?;
    writeln!(out, "Grade: {}", grade.grade)
}

pub fn display_assigned(
    out: &mut impl Write,
    github: &str,
    title: &str,
    grade: i64,
) -> io::Result<()> {
    writeln!(out, "{github} has been given a grade of: {grade} on {title}")
}

/// One line of a student grade listing.
pub fn display_grade_line(out: &mut impl Write, grade: &Grade) -> io::Result<()> {
    writeln!(out, "Project: {} Grade: {}", grade.project_title, grade.grade)
}

pub fn display_no_student(out: &mut impl Write, github: &str) -> io::Result<()> {
    writeln!(out, "No student with GitHub account {github}")
}

pub fn display_no_project(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "No project titled {title}")
}

pub fn display_no_grade(out: &mut impl Write, github: &str, title: &str) -> io::Result<()> {
    writeln!(out, "No grade for {github} on {title}")
}
