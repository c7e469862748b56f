#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub max_grade: i64,
}
