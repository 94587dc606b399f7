//! Publish outcomes.

use std::fmt;

/// A write a dry run would have made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// What happened to one manifest page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Created {
        title: String,
        id: u64,
        url: String,
    },
    Updated {
        title: String,
        id: u64,
        url: String,
    },
    /// Remote content already matches; attachments were still synced.
    Unchanged { title: String, id: u64 },
    /// A page with the same title exists and overwriting is off.
    Skipped { title: String, id: u64 },
    Deleted { id: u64 },
    /// Dry run only.
    Planned { action: Action, target: String },
    Failed { title: String, error: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { title, url, .. } => write!(f, "created  \"{title}\" {url}"),
            Self::Updated { title, url, .. } => write!(f, "updated  \"{title}\" {url}"),
            Self::Unchanged { title, id } => write!(f, "identical \"{title}\" (id {id})"),
            Self::Skipped { title, id } => {
                write!(f, "skipped  \"{title}\" (exists as {id}, overwrite off)")
            }
            Self::Deleted { id } => write!(f, "deleted  page {id}"),
            Self::Planned { action, target } => write!(f, "would {action} {target}"),
            Self::Failed { title, error } => write!(f, "FAILED   \"{title}\": {error}"),
        }
    }
}

/// Outcomes of a publish run, in processing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub outcomes: Vec<Outcome>,
}

impl PublishReport {
    pub(crate) fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    /// True if any page failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Outcome::Failed { .. }))
    }
}

impl fmt::Display for PublishReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        let failed = self.failures().count();
        write!(
            f,
            "{} page(s) processed, {} failed",
            self.outcomes.len(),
            failed
        )
    }
}
