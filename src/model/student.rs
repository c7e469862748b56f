#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Student {
    pub first_name: String,
    pub last_name: String,
    pub github: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[test]
fn test_full_name() {
    let s = Student {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        github: "adalove".into(),
    };
    assert_eq!(s.full_name(), "Ada Lovelace");
}
