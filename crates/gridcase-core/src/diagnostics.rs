//! Warning and error collection for the case validation pass.
//!
//! [`crate::Case::validate`] returns hard integrity errors only.
//! [`crate::Case::validate_into`] adds those to a [`Diagnostics`] together
//! with policy warnings, so tools can print or serialize one report:
//!
//! ```
//! use gridcase_core::diagnostics::{Category, Diagnostics};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning(Category::Topology, "bus 4 has no branches");
//! diag.add_error_with_entity(Category::Reference, "refers to missing bus 9", "generator 1 'G1'");
//!
//! assert_eq!(diag.summary(), "1 warning, 1 error");
//! ```

use serde::Serialize;

use crate::error::CaseError;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but usable by a solver
    Warning,
    /// The case cannot be handed to a solver as is
    Error,
}

/// What part of the case an issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Element points at a bus the case does not own
    Reference,
    /// Element identities collide
    Identity,
    /// Collections are empty or inconsistent in size
    Structure,
    /// Connectivity: self-loops, isolated buses, slack buses
    Topology,
    /// Case-level settings such as base MVA
    Configuration,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Category::Reference => "reference",
            Category::Identity => "identity",
            Category::Structure => "structure",
            Category::Topology => "topology",
            Category::Configuration => "configuration",
        })
    }
}

/// A single issue found in a case
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Offending element, e.g. "generator 3 'G3'"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;
        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        Ok(())
    }
}

impl From<&CaseError> for DiagnosticIssue {
    fn from(err: &CaseError) -> Self {
        match err {
            CaseError::DanglingReference {
                element,
                id,
                name,
                bus,
            } => DiagnosticIssue::new(
                Severity::Error,
                Category::Reference,
                format!("refers to missing bus {bus}"),
            )
            .with_entity(format!("{element} {id} '{name}'")),
            CaseError::BusNotFound(bus) => DiagnosticIssue::new(
                Severity::Error,
                Category::Reference,
                format!("bus {bus} not found"),
            ),
            CaseError::DuplicateBusId { id, .. } => {
                DiagnosticIssue::new(Severity::Error, Category::Identity, err.to_string())
                    .with_entity(format!("bus {id}"))
            }
            CaseError::Configuration(_) => {
                DiagnosticIssue::new(Severity::Error, Category::Configuration, err.to_string())
            }
            CaseError::Io(_) | CaseError::Parse(_) => {
                DiagnosticIssue::new(Severity::Error, Category::Structure, err.to_string())
            }
        }
    }
}

/// Collection of issues for one validation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, category: Category, message: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: Category, message: &str, entity: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error(&mut self, category: Category, message: &str) {
        self.add(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn add_error_with_entity(&mut self, category: Category, message: &str, entity: &str) {
        self.add(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    /// Record a case error as an error-level issue.
    pub fn add_case_error(&mut self, err: &CaseError) {
        self.add(err.into());
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn issues_by_category(
        &self,
        category: Category,
    ) -> impl Iterator<Item = &DiagnosticIssue> + '_ {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    /// Short form such as "2 warnings, 1 error".
    pub fn summary(&self) -> String {
        fn plural(count: usize, word: &str) -> String {
            format!("{} {}{}", count, word, if count == 1 { "" } else { "s" })
        }

        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => plural(w, "warning"),
            (0, e) => plural(e, "error"),
            (w, e) => format!("{}, {}", plural(w, "warning"), plural(e, "error")),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}
