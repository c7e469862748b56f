/// Grade received by a student on a project. The student is implied by
/// the query which produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grade {
    pub project_title: String,
    pub grade: i64,
}
