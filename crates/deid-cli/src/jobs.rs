//! TOML job manifests.
//!
//! ```toml
//! [defaults]
//! indent = 4
//!
//! [[job]]
//! request_id = "123"
//! input = "customer.csv"
//! output = "customerOutput.json"
//! rules = [{ rule = "age_band", fields = ["dob"] }]
//! ```

use std::path::{Path, PathBuf};

use deid_ingest::InputFormat;
use deid_output::DEFAULT_INDENT;
use deid_transform::RuleSpec;
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a job manifest.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("manifest {path} defines no [[job]] entries")]
    NoJobs { path: PathBuf },
}

/// Settings shared by every job unless the job overrides them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobDefaults {
    #[serde(default)]
    pub indent: Option<usize>,
}

/// One pipeline: input file, output file and the rules to run in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub request_id: String,
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub format: Option<InputFormat>,
    #[serde(default)]
    pub indent: Option<usize>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl Job {
    /// Output indent: the job's, else the manifest default, else 4.
    pub fn indent(&self, defaults: &JobDefaults) -> usize {
        self.indent.or(defaults.indent).unwrap_or(DEFAULT_INDENT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobManifest {
    #[serde(default)]
    pub defaults: JobDefaults,
    #[serde(rename = "job", default)]
    pub jobs: Vec<Job>,
}

impl JobManifest {
    /// Parse manifest text; paths are left as written.
    pub fn parse(text: &str, path: &Path) -> Result<Self, JobError> {
        toml::from_str(text).map_err(|source| JobError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve relative input and output paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for job in &mut self.jobs {
            if job.input.is_relative() {
                job.input = base.join(&job.input);
            }
            if job.output.is_relative() {
                job.output = base.join(&job.output);
            }
        }
    }
}

/// Read a manifest from disk, resolving paths against its directory.
pub fn load_manifest(path: &Path) -> Result<JobManifest, JobError> {
    let text = std::fs::read_to_string(path).map_err(|source| JobError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut manifest = JobManifest::parse(&text, path)?;
    if manifest.jobs.is_empty() {
        return Err(JobError::NoJobs {
            path: path.to_path_buf(),
        });
    }
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    manifest.resolve_paths(base);
    tracing::debug!(
        manifest = %path.display(),
        jobs = manifest.jobs.len(),
        "Loaded job manifest"
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deid_transform::RuleKind;

    const MANIFEST: &str = r#"
[defaults]
indent = 2

[[job]]
request_id = "123"
input = "customer.csv"
output = "out/customerOutput.json"
rules = [{ rule = "age_band", fields = ["dob"], reference_date = "2024-01-01" }]

[[job]]
request_id = "456"
input = "/data/customer.json"
output = "customerOutput2.json"
format = "json"
indent = 8
rules = [
    { rule = "age_band", fields = ["age"] },
    { rule = "postcode_trim_to_three", fields = ["PostCode"] },
    { rule = "postcode_trim_to_two", fields = ["PostCode"], min_group_size = 5 },
]
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = JobManifest::parse(MANIFEST, Path::new("jobs.toml")).unwrap();

        assert_eq!(manifest.jobs.len(), 2);
        let first = &manifest.jobs[0];
        assert_eq!(first.request_id, "123");
        assert_eq!(first.indent(&manifest.defaults), 2);
        assert_eq!(first.rules[0].kind(), RuleKind::AgeBand);
        let second = &manifest.jobs[1];
        assert_eq!(second.format, Some(InputFormat::Json));
        assert_eq!(second.indent(&manifest.defaults), 8);
        assert_eq!(
            second.rules.iter().map(RuleSpec::kind).collect::<Vec<_>>(),
            RuleKind::ALL.to_vec()
        );
    }

    #[test]
    fn test_default_indent_is_four() {
        let job = Job {
            request_id: "1".to_string(),
            input: "a.csv".into(),
            output: "a.json".into(),
            format: None,
            indent: None,
            rules: Vec::new(),
        };
        assert_eq!(job.indent(&JobDefaults::default()), 4);
    }

    #[test]
    fn test_relative_paths_resolve_against_manifest_dir() {
        let mut manifest = JobManifest::parse(MANIFEST, Path::new("jobs.toml")).unwrap();
        manifest.resolve_paths(Path::new("/srv/batch"));

        assert_eq!(manifest.jobs[0].input, Path::new("/srv/batch/customer.csv"));
        assert_eq!(
            manifest.jobs[0].output,
            Path::new("/srv/batch/out/customerOutput.json")
        );
        assert_eq!(manifest.jobs[1].input, Path::new("/data/customer.json"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let text = r#"
[[job]]
request_id = "1"
input = "a.csv"
output = "a.json"
ouput_dir = "typo"
"#;
        assert!(matches!(
            JobManifest::parse(text, Path::new("jobs.toml")),
            Err(JobError::Parse { .. })
        ));
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let text = r#"
[[job]]
request_id = "1"
input = "a.csv"
output = "a.json"
rules = [{ rule = "shuffle", fields = ["a"] }]
"#;
        assert!(JobManifest::parse(text, Path::new("jobs.toml")).is_err());
    }

    #[test]
    fn test_missing_manifest_file() {
        let err = load_manifest(Path::new("no/such/jobs.toml")).unwrap_err();
        assert!(matches!(err, JobError::Read { .. }));
    }
}
