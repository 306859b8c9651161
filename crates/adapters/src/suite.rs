// Copyright 2025 Semtest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Suite unit format.
//!
//! A suite unit is one `*.semtest.toml` or `*.semtest.json` file in the
//! benchmark tree; other TOML and JSON files are not suites. Its top-level
//! bindings are named responder definitions and benchmark entries:
//!
//! ```toml
//! [responders.dog_photo]
//! kind = "fixture"
//! responses = [
//!     "There's a dog in the background of the photo",
//!     "In the background of the photo is a dog",
//! ]
//!
//! [[benchmark]]
//! name = "mock_prompt_1"
//! expectation = "A dog is in the background of the photograph"
//! iterations = 2
//! responder = "dog_photo"            # local binding
//!
//! [[benchmark]]
//! name = "mock_prompt_2"
//! expectation = "A dog is in the background of the photograph"
//! responder = "mock_helpers.prompt2" # binding in another unit
//! ```
//!
//! The same structure is accepted as JSON.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// File name suffixes recognised as suite units.
pub const SUITE_SUFFIXES: &[&str] = &[".semtest.toml", ".semtest.json"];

/// File name of `path` with its suite suffix removed, if it is a suite.
pub fn suite_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    SUITE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
}

/// Serialisation format of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl SuiteFormat {
    /// Format for `path`, or `None` if it is not a suite file.
    pub fn from_path(path: &Path) -> Option<Self> {
        suite_stem(path)?;
        match path.extension()?.to_str()? {
            "toml" => Some(SuiteFormat::Toml),
            "json" => Some(SuiteFormat::Json),
            _ => None,
        }
    }
}

/// One parsed suite file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteUnit {
    /// Named responder definitions other entries may reference.
    #[serde(default)]
    pub responders: BTreeMap<String, ResponderSpec>,
    /// Benchmark entries, in file order.
    #[serde(default, rename = "benchmark")]
    pub benchmarks: Vec<BenchmarkSpec>,
}

impl SuiteUnit {
    /// Parse `contents` in `format`.
    pub fn parse(contents: &str, format: SuiteFormat) -> Result<Self, String> {
        match format {
            SuiteFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
            SuiteFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        }
    }
}

fn default_iterations() -> usize {
    1
}

/// One `[[benchmark]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkSpec {
    /// Binding name; defaults to `bench_<index>`.
    #[serde(default)]
    pub name: Option<String>,
    /// Semantic expectation text.
    #[serde(alias = "semantic_expectation")]
    pub expectation: String,
    /// Iterations per run.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Comparator name; defaults to cosine similarity.
    #[serde(default)]
    pub comparator: Option<String>,
    /// Responder producing the text under test.
    pub responder: ResponderRef,
    /// Arguments forwarded to the responder on every iteration.
    #[serde(default)]
    pub args: Vec<String>,
}

/// How a benchmark names its responder.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponderRef {
    /// `binding` in the same unit, or `module.binding` in another.
    Named(String),
    /// Defined in place.
    Inline(ResponderSpec),
}

impl ResponderRef {
    /// Split a named reference into `(module, binding)`.
    ///
    /// The module part is `None` for unqualified names.
    pub fn split(name: &str) -> (Option<&str>, &str) {
        match name.rsplit_once('.') {
            Some((module, binding)) => (Some(module), binding),
            None => (None, name),
        }
    }
}

/// A responder definition. Each reference instantiates it afresh.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponderSpec {
    /// Replays canned responses in order.
    Fixture {
        /// Responses, one per call.
        responses: Vec<String>,
        /// Responses that are reported as faults instead of returned.
        #[serde(default)]
        reject: Vec<String>,
    },
    /// Runs a program and uses its standard output.
    Command {
        /// Executable.
        program: String,
        /// Fixed arguments, placed before forwarded ones.
        #[serde(default)]
        args: Vec<String>,
    },
    /// Asks an OpenAI-compatible chat completion endpoint.
    Chat {
        /// User prompt; forwarded arguments are appended.
        prompt: String,
        /// Model; defaults to the configured chat model.
        #[serde(default)]
        model: Option<String>,
        /// Optional system message.
        #[serde(default)]
        system: Option<String>,
        /// Sampling temperature.
        #[serde(default)]
        temperature: Option<f32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_unit() {
        let unit = SuiteUnit::parse(
            r#"
            [responders.dogs]
            kind = "fixture"
            responses = ["a dog", "two dogs"]

            [[benchmark]]
            name = "mock_prompt_1"
            semantic_expectation = "A dog is in the background"
            iterations = 2
            responder = "dogs"

            [[benchmark]]
            expectation = "hello friend"
            responder = { kind = "command", program = "echo", args = ["hi"] }
            args = ["there"]
            "#,
            SuiteFormat::Toml,
        )
        .unwrap();

        assert_eq!(unit.responders.len(), 1);
        assert_eq!(unit.benchmarks.len(), 2);
        assert_eq!(unit.benchmarks[0].expectation, "A dog is in the background");
        assert_eq!(unit.benchmarks[0].iterations, 2);
        assert!(matches!(&unit.benchmarks[0].responder, ResponderRef::Named(n) if n == "dogs"));
        assert_eq!(unit.benchmarks[1].name, None);
        assert_eq!(unit.benchmarks[1].iterations, 1);
        assert_eq!(unit.benchmarks[1].args, vec!["there"]);
        assert!(matches!(
            &unit.benchmarks[1].responder,
            ResponderRef::Inline(ResponderSpec::Command { program, .. }) if program == "echo"
        ));
    }

    #[test]
    fn test_parse_json_unit() {
        let unit = SuiteUnit::parse(
            r#"{
                "responders": {
                    "greeter": {"kind": "chat", "prompt": "Say hello", "temperature": 0.2}
                },
                "benchmark": [
                    {"name": "hello", "expectation": "hello friend", "responder": "greeter"}
                ]
            }"#,
            SuiteFormat::Json,
        )
        .unwrap();
        assert!(matches!(
            unit.responders.get("greeter"),
            Some(ResponderSpec::Chat { temperature: Some(_), .. })
        ));
        assert_eq!(unit.benchmarks[0].name.as_deref(), Some("hello"));
    }

    #[test]
    fn test_unit_with_only_responders() {
        let unit = SuiteUnit::parse(
            "[responders.prompt1]\nkind = \"fixture\"\nresponses = [\"x\"]\n",
            SuiteFormat::Toml,
        )
        .unwrap();
        assert!(unit.benchmarks.is_empty());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = SuiteUnit::parse(
            "[[benchmark]]\nexpectation = \"x\"\nresponder = \"r\"\niteratons = 3\n",
            SuiteFormat::Toml,
        )
        .unwrap_err();
        assert!(err.contains("iteratons"));
    }

    #[test]
    fn test_missing_expectation_is_rejected() {
        assert!(SuiteUnit::parse("[[benchmark]]\nresponder = \"r\"\n", SuiteFormat::Toml).is_err());
    }

    #[test]
    fn test_split_reference() {
        assert_eq!(ResponderRef::split("prompt1"), (None, "prompt1"));
        assert_eq!(ResponderRef::split("mock_helpers.prompt1"), (Some("mock_helpers"), "prompt1"));
        assert_eq!(
            ResponderRef::split("nested_dir.helpers.prompt1"),
            (Some("nested_dir.helpers"), "prompt1")
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SuiteFormat::from_path(Path::new("a/b.semtest.toml")), Some(SuiteFormat::Toml));
        assert_eq!(SuiteFormat::from_path(Path::new("b.semtest.json")), Some(SuiteFormat::Json));
        assert_eq!(SuiteFormat::from_path(Path::new("Cargo.toml")), None);
        assert_eq!(SuiteFormat::from_path(Path::new("package.json")), None);
        assert_eq!(SuiteFormat::from_path(Path::new(".semtest.toml")), None);
        assert_eq!(SuiteFormat::from_path(Path::new("b.semtest.py")), None);
        assert_eq!(SuiteFormat::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_suite_stem() {
        assert_eq!(suite_stem(Path::new("dir/mock_test.semtest.toml")), Some("mock_test"));
        assert_eq!(suite_stem(Path::new("a.b.semtest.json")), Some("a.b"));
        assert_eq!(suite_stem(Path::new("rustfmt.toml")), None);
    }
}
