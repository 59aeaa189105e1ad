use serde::Deserialize;

use crate::schedule::Schedule;

/// One named job entry in a schedule file.
#[derive(Deserialize, Clone, Debug)]
pub struct NamedSchedule {
    pub name: String,
    pub schedule: String,
}

/// The top-level shape of a YAML schedule file: a flat list of named jobs.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ScheduleFile {
    pub jobs: Vec<NamedSchedule>,
}

/// Failure reading or parsing a schedule file from disk.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yml::Error),
}

impl ScheduleFile {
    /// Reads and deserializes a schedule file. Does not validate the
    /// individual schedule strings — see [`validate_config`].
    pub fn read(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let file = serde_yml::from_str(&content)?;
        Ok(file)
    }
}

/// One problem found while validating a [`ScheduleFile`], severe enough to
/// refuse loading (`Error`) or merely worth surfacing (`Warning`).
#[derive(Debug, Clone)]
pub enum ValidationIssue {
    Error(String),
    Warning(String),
}

impl ValidationIssue {
    pub fn is_error(&self) -> bool {
        matches!(self, ValidationIssue::Error(_))
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::Error(msg) => write!(f, "error: {}", msg),
            ValidationIssue::Warning(msg) => write!(f, "warning: {}", msg),
        }
    }
}

/// Checks every job's name and schedule string, without registering
/// anything. Unlike the core `add` path, this collects every problem rather
/// than stopping at the first one, since it's meant to be run by a human
/// before deploying the file.
pub fn validate_config(file: &ScheduleFile) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen_names: Vec<&str> = Vec::new();

    for job in &file.jobs {
        if job.name.is_empty() {
            issues.push(ValidationIssue::Error("job name must not be empty".into()));
        } else if seen_names.contains(&job.name.as_str()) {
            issues.push(ValidationIssue::Warning(format!(
                "duplicate job name: '{}'",
                job.name
            )));
        }
        seen_names.push(&job.name);

        if let Err(err) = Schedule::parse(&job.schedule) {
            issues.push(ValidationIssue::Error(format!(
                "job '{}': {}",
                job.name, err
            )));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_file_has_no_issues() {
        let file = ScheduleFile {
            jobs: vec![NamedSchedule {
                name: "heartbeat".into(),
                schedule: "0 0 * * * * *".into(),
            }],
        };
        assert!(validate_config(&file).is_empty());
    }

    #[test]
    fn empty_name_is_an_error() {
        let file = ScheduleFile {
            jobs: vec![NamedSchedule {
                name: "".into(),
                schedule: "0 0 * * * * *".into(),
            }],
        };
        let issues = validate_config(&file);
        assert!(issues.iter().any(|i| i.is_error()));
    }

    #[test]
    fn duplicate_name_is_a_warning_not_an_error() {
        let file = ScheduleFile {
            jobs: vec![
                NamedSchedule {
                    name: "dup".into(),
                    schedule: "0 0 * * * * *".into(),
                },
                NamedSchedule {
                    name: "dup".into(),
                    schedule: "0 30 * * * * *".into(),
                },
            ],
        };
        let issues = validate_config(&file);
        assert!(!issues.iter().any(|i| i.is_error()));
        assert!(issues.iter().any(|i| matches!(i, ValidationIssue::Warning(_))));
    }

    #[test]
    fn bad_schedule_is_an_error() {
        let file = ScheduleFile {
            jobs: vec![NamedSchedule {
                name: "broken".into(),
                schedule: "not a schedule".into(),
            }],
        };
        let issues = validate_config(&file);
        assert!(issues.iter().any(|i| i.is_error()));
    }
}
