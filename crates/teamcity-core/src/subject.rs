//! Test subjects and their display names.
//!
//! A subject is whatever a message reports about: a single test case, a
//! suite, a self-describing test (e.g. a script-based test file), or an
//! entity the reporter knows nothing about beyond its type.

use serde::{Deserialize, Serialize};

/// One row of a data-driven parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSet {
    /// Positional row, rendered as `#<index>`.
    Indexed(usize),
    /// Keyed row, rendered as `"<key>"`.
    Named(String),
}

impl std::fmt::Display for DataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSet::Indexed(index) => write!(f, "#{}", index),
            DataSet::Named(key) => write!(f, "\"{}\"", key),
        }
    }
}

/// A single test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_set: Option<DataSet>,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_set: None,
        }
    }

    /// One invocation of a data-driven test.
    pub fn with_data_set(mut self, data_set: DataSet) -> Self {
        self.data_set = Some(data_set);
        self
    }

    /// Name including the data set label, if any.
    pub fn display_name(&self) -> String {
        match &self.data_set {
            Some(data_set) => format!("{} with data set {}", self.name, data_set),
            None => self.name.clone(),
        }
    }
}

/// A named grouping of tests and nested suites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
}

impl TestSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Suite grouping every invocation of one data-driven test method.
    pub fn for_data_provider(class: &str, method: &str) -> Self {
        Self::new(format!("{}::{}", class, method))
    }
}

/// Whatever a service message is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    TestCase(TestCase),
    Suite(TestSuite),
    SelfDescribing { description: String },
    Other { type_name: String },
}

impl Subject {
    pub fn test(name: impl Into<String>) -> Self {
        Subject::TestCase(TestCase::new(name))
    }

    pub fn suite(name: impl Into<String>) -> Self {
        Subject::Suite(TestSuite::new(name))
    }

    pub fn self_describing(description: impl Into<String>) -> Self {
        Subject::SelfDescribing {
            description: description.into(),
        }
    }

    /// Fallback subject identified only by its Rust type.
    pub fn of_type<T: ?Sized>() -> Self {
        Subject::Other {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }
}

impl From<TestCase> for Subject {
    fn from(test: TestCase) -> Self {
        Subject::TestCase(test)
    }
}

impl From<TestSuite> for Subject {
    fn from(suite: TestSuite) -> Self {
        Subject::Suite(suite)
    }
}

/// Display name used for the `name` attribute.
pub fn derive_name(subject: &Subject) -> String {
    match subject {
        Subject::TestCase(test) => test.display_name(),
        Subject::Suite(suite) => suite.name.clone(),
        Subject::SelfDescribing { description } => description.clone(),
        Subject::Other { type_name } => type_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    #[test]
    fn test_plain_test_case_name() {
        assert_eq!(derive_name(&Subject::test("testSimpleMethod")), "testSimpleMethod");
    }

    #[test]
    fn test_named_data_set_name() {
        let test = TestCase::new("testMethodWithDataProvider")
            .with_data_set(DataSet::Named("five.one".to_string()));
        assert_eq!(
            derive_name(&test.into()),
            "testMethodWithDataProvider with data set \"five.one\""
        );
    }

    #[test]
    fn test_indexed_data_set_name() {
        let test = TestCase::new("testAdd").with_data_set(DataSet::Indexed(2));
        assert_eq!(derive_name(&test.into()), "testAdd with data set #2");
    }

    #[test]
    fn test_suite_names() {
        assert_eq!(derive_name(&Subject::suite("Unit")), "Unit");
        let provider = TestSuite::for_data_provider("Fixtures\\DataProviderTest", "testMethod");
        assert_eq!(derive_name(&provider.into()), "Fixtures\\DataProviderTest::testMethod");
    }

    #[test]
    fn test_self_describing_name() {
        let subject = Subject::self_describing("/tmp/fixtures/example.phpt");
        assert_eq!(derive_name(&subject), "/tmp/fixtures/example.phpt");
    }

    #[test]
    fn test_fallback_uses_type_name() {
        let name = derive_name(&Subject::of_type::<Probe>());
        assert!(name.ends_with("Probe"), "got {name}");
    }

    #[test]
    fn test_subject_serde_tagging() {
        let subject: Subject = serde_json::from_str(
            r#"{"kind":"test_case","name":"testOne","data_set":"one"}"#,
        )
        .unwrap();
        assert_eq!(
            subject,
            TestCase::new("testOne")
                .with_data_set(DataSet::Named("one".to_string()))
                .into()
        );

        let subject: Subject =
            serde_json::from_str(r#"{"kind":"test_case","name":"testTwo","data_set":3}"#).unwrap();
        assert_eq!(derive_name(&subject), "testTwo with data set #3");

        let subject: Subject = serde_json::from_str(r#"{"kind":"suite","name":"All"}"#).unwrap();
        assert_eq!(subject, Subject::suite("All"));
    }
}
