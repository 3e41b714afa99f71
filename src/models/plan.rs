//! Suite plans
//!
//! A plan describes the suite tree a run executes: which tests each suite
//! contains, how they turn out, and which nested suites run in parallel.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Planned outcome of a test
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Pass,
    Fail,
    Ignore,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "pass"),
            Outcome::Fail => write!(f, "fail"),
            Outcome::Ignore => write!(f, "ignore"),
        }
    }
}

/// A single planned test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestPlan {
    pub name: String,

    #[serde(default)]
    pub outcome: Outcome,

    /// Failure message reported with `fail`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Simulated running time
    #[serde(default)]
    pub duration_ms: u64,
}

impl TestPlan {
    pub fn pass(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Pass,
            message: None,
            duration_ms,
        }
    }

    pub fn fail(name: impl Into<String>, duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Fail,
            message: Some(message.into()),
            duration_ms,
        }
    }

    pub fn ignore(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Ignore,
            message: None,
            duration_ms: 0,
        }
    }
}

/// A suite and everything nested under it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuitePlan {
    pub name: String,

    #[serde(default)]
    pub tests: Vec<TestPlan>,

    #[serde(default)]
    pub nested: Vec<SuitePlan>,

    /// Run nested suites concurrently, each on its own forked tracker
    #[serde(default)]
    pub parallel: bool,

    /// Abort the suite right after it starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort: Option<String>,
}

impl SuitePlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
            nested: Vec::new(),
            parallel: false,
            abort: None,
        }
    }

    pub fn with_test(mut self, test: TestPlan) -> Self {
        self.tests.push(test);
        self
    }

    pub fn with_nested(mut self, suite: SuitePlan) -> Self {
        self.nested.push(suite);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn aborting(mut self, reason: impl Into<String>) -> Self {
        self.abort = Some(reason.into());
        self
    }

    /// Load a plan from a YAML or JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan file: {}", path.display()))?;

        let plan: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML plan: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON plan: {}", path.display()))?
        };

        plan.validate()?;
        Ok(plan)
    }

    /// Check names: suites unique across the tree, tests unique per suite
    pub fn validate(&self) -> Result<()> {
        let mut suites = HashSet::new();
        self.validate_into(&mut suites)
    }

    fn validate_into<'a>(&'a self, suites: &mut HashSet<&'a str>) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Suite name must not be empty");
        }
        if !suites.insert(self.name.as_str()) {
            anyhow::bail!("Duplicate suite name '{}'", self.name);
        }

        let mut tests = HashSet::new();
        for test in &self.tests {
            if test.name.trim().is_empty() {
                anyhow::bail!("Test name must not be empty in suite '{}'", self.name);
            }
            if !tests.insert(test.name.as_str()) {
                anyhow::bail!(
                    "Duplicate test name '{}' in suite '{}'",
                    test.name,
                    self.name
                );
            }
        }

        for suite in &self.nested {
            suite.validate_into(suites)?;
        }
        Ok(())
    }

    /// Number of suites in the tree, including this one
    pub fn suite_count(&self) -> usize {
        1 + self.nested.iter().map(SuitePlan::suite_count).sum::<usize>()
    }

    /// Number of tests in the tree
    pub fn test_count(&self) -> usize {
        self.tests.len() + self.nested.iter().map(SuitePlan::test_count).sum::<usize>()
    }

    /// Built-in plan mixing sequential and parallel suites
    pub fn demo() -> Self {
        SuitePlan::new("Everything")
            .parallel(true)
            .with_test(TestPlan::pass("environment is sane", 2))
            .with_nested(
                SuitePlan::new("Arithmetic")
                    .with_test(TestPlan::pass("adds", 8))
                    .with_test(TestPlan::pass("subtracts", 3))
                    .with_test(TestPlan::fail("divides", 5, "expected 2 but got 3")),
            )
            .with_nested(
                SuitePlan::new("Collections")
                    .parallel(true)
                    .with_test(TestPlan::pass("empty vec", 1))
                    .with_nested(
                        SuitePlan::new("Maps")
                            .with_test(TestPlan::pass("insert", 6))
                            .with_test(TestPlan::ignore("rehash")),
                    )
                    .with_nested(
                        SuitePlan::new("Sets")
                            .with_test(TestPlan::pass("union", 4))
                            .with_test(TestPlan::pass("difference", 2)),
                    ),
            )
            .with_nested(SuitePlan::new("Network").aborting("fixture server unavailable"))
            .with_nested(
                SuitePlan::new("Strings")
                    .with_test(TestPlan::pass("split", 1))
                    .with_test(TestPlan::pass("trim", 7)),
            )
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_demo_plan_is_valid() {
        let plan = SuitePlan::demo();
        assert!(plan.validate().is_ok());
        assert_eq!(plan.suite_count(), 7);
        assert_eq!(plan.test_count(), 11);
    }

    #[test]
    fn test_duplicate_suite_names() {
        let plan = SuitePlan::new("Root")
            .with_nested(SuitePlan::new("A"))
            .with_nested(SuitePlan::new("B").with_nested(SuitePlan::new("A")));
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate suite name 'A'"));
    }

    #[test]
    fn test_duplicate_test_names() {
        let plan = SuitePlan::new("Root")
            .with_test(TestPlan::pass("t", 0))
            .with_test(TestPlan::ignore("t"));
        assert!(plan.validate().is_err());

        // Same test name in different suites is fine
        let plan = SuitePlan::new("Root")
            .with_test(TestPlan::pass("t", 0))
            .with_nested(SuitePlan::new("Inner").with_test(TestPlan::pass("t", 0)));
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_empty_names_rejected() {
        assert!(SuitePlan::new(" ").validate().is_err());
        assert!(SuitePlan::new("Root")
            .with_test(TestPlan::pass("", 0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(
            &path,
            r#"
name: Root
parallel: true
tests:
  - name: boots
    duration_ms: 3
nested:
  - name: Inner
    tests:
      - name: breaks
        outcome: fail
        message: boom
      - name: later
        outcome: ignore
  - name: Broken
    abort: no database
"#,
        )
        .unwrap();

        let plan = SuitePlan::load(&path).unwrap();
        assert!(plan.parallel);
        assert_eq!(plan.tests[0].outcome, Outcome::Pass);
        assert_eq!(plan.nested[0].tests[0].outcome, Outcome::Fail);
        assert_eq!(plan.nested[0].tests[0].message.as_deref(), Some("boom"));
        assert_eq!(plan.nested[1].abort.as_deref(), Some("no database"));
    }

    #[test]
    fn test_load_json_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.json");
        let plan = SuitePlan::demo();
        std::fs::write(&path, serde_json::to_string_pretty(&plan).unwrap()).unwrap();

        assert_eq!(SuitePlan::load(&path).unwrap(), plan);
    }

    #[test]
    fn test_load_rejects_invalid_plan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.yml");
        std::fs::write(&path, "name: Root\nnested:\n  - name: Root\n").unwrap();
        assert!(SuitePlan::load(&path).is_err());
    }
}
