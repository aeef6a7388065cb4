use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::app::Queue;

/// One externally named form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Build the full field set for a commit: the management form followed by
/// four fields per item, named by the item's external index.
pub fn form_fields(queue: &Queue) -> Vec<FormField> {
    let mut fields = vec![
        FormField::new("form-TOTAL_FORMS", queue.len().to_string()),
        FormField::new("form-INITIAL_FORMS", queue.len().to_string()),
    ];

    for item in &queue.items {
        let n = item.form_index;
        let d = &item.disposition;
        fields.push(FormField::new(format!("form-{n}-item"), item.id.to_string()));
        fields.push(FormField::new(
            format!("form-{n}-action"),
            d.action_code().map(|c| c.to_string()).unwrap_or_default(),
        ));
        fields.push(FormField::new(
            format!("form-{n}-reject_reason"),
            d.reject_reason().map(|r| r.to_string()).unwrap_or_default(),
        ));
        fields.push(FormField::new(
            format!("form-{n}-comment"),
            d.comment().unwrap_or_default(),
        ));
    }
    fields
}

/// Where Ctrl+S sends the reviewed queue
#[derive(Debug, Clone, PartialEq)]
pub enum CommitTarget {
    Http { url: String, timeout: Duration },
    File(PathBuf),
    Disabled,
}

impl CommitTarget {
    pub fn describe(&self) -> String {
        match self {
            CommitTarget::Http { url, .. } => url.clone(),
            CommitTarget::File(path) => path.display().to_string(),
            CommitTarget::Disabled => "nowhere".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub reviewed: usize,
    pub total: usize,
    pub destination: String,
}

#[derive(Serialize)]
struct CommitFile<'a> {
    committed_at: DateTime<Utc>,
    reviewed: usize,
    fields: &'a [FormField],
}

/// Send every item's fields to the commit target
pub fn commit(queue: &Queue, target: &CommitTarget) -> Result<CommitReport> {
    let fields = form_fields(queue);
    let reviewed = queue.reviewed_count();

    match target {
        CommitTarget::Http { url, timeout } => {
            let client = reqwest::blocking::Client::builder()
                .timeout(*timeout)
                .build()
                .context("Failed to build HTTP client")?;
            let pairs: Vec<(&str, &str)> = fields
                .iter()
                .map(|f| (f.name.as_str(), f.value.as_str()))
                .collect();
            let response = client
                .post(url)
                .form(&pairs)
                .send()
                .with_context(|| format!("Commit to {url} failed"))?;
            if !response.status().is_success() {
                bail!("Commit rejected: {}", response.status());
            }
        }
        CommitTarget::File(path) => {
            let record = CommitFile {
                committed_at: Utc::now(),
                reviewed,
                fields: &fields,
            };
            let content = serde_json::to_string_pretty(&record)?;
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        CommitTarget::Disabled => bail!("No commit target configured (set endpoint.commit_url or --commit-file)"),
    }

    tracing::info!(reviewed, total = queue.len(), destination = %target.describe(), "committed reviews");
    Ok(CommitReport {
        reviewed,
        total: queue.len(),
        destination: target.describe(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::queue::{payload, Disposition};

    fn field<'a>(fields: &'a [FormField], name: &str) -> Option<&'a str> {
        fields.iter().find(|f| f.name == name).map(|f| f.value.as_str())
    }

    fn queue() -> Queue {
        let mut queue = Queue::new(10);
        queue.splice(vec![payload(11, 0), payload(12, 1), payload(13, 2)], 3);
        queue.record(0, Disposition::Approved);
        queue.record(
            1,
            Disposition::Rejected {
                reason: 3,
                comment: "spam link".into(),
            },
        );
        queue
    }

    #[test]
    fn fields_follow_external_encoding() {
        let fields = form_fields(&queue());
        assert_eq!(field(&fields, "form-TOTAL_FORMS"), Some("3"));
        assert_eq!(field(&fields, "form-0-item"), Some("11"));
        assert_eq!(field(&fields, "form-0-action"), Some("4"));
        assert_eq!(field(&fields, "form-1-action"), Some("3"));
        assert_eq!(field(&fields, "form-1-reject_reason"), Some("3"));
        assert_eq!(field(&fields, "form-1-comment"), Some("spam link"));
        // pending items go out blank
        assert_eq!(field(&fields, "form-2-action"), Some(""));
        assert_eq!(field(&fields, "form-2-comment"), Some(""));
    }

    #[test]
    fn appended_items_use_renumbered_indices() {
        let mut queue = queue();
        queue.splice(vec![payload(20, 0)], 4);
        let fields = form_fields(&queue);
        assert_eq!(field(&fields, "form-3-item"), Some("20"));
    }

    #[test]
    fn commit_to_file_writes_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commit.json");
        let report = commit(&queue(), &CommitTarget::File(path.clone())).unwrap();
        assert_eq!(report.reviewed, 2);
        assert_eq!(report.total, 3);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["reviewed"], 2);
        assert!(written["committed_at"].is_string());
        assert_eq!(written["fields"][0]["name"], "form-TOTAL_FORMS");
    }

    #[test]
    fn disabled_target_is_an_error() {
        assert!(commit(&queue(), &CommitTarget::Disabled).is_err());
    }
}
