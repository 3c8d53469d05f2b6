//! End-of-recording issue report

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCount {
    pub issue: String,
    pub count: usize,
}

/// How often each issue fired over a whole recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    /// Most frequent first; equal counts keep first-appearance order
    pub issues: Vec<IssueCount>,
    pub frames: usize,
}

impl IssueSummary {
    pub fn from_frames<'a, I, F>(frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: IntoIterator<Item = &'a String>,
    {
        let mut issues: Vec<IssueCount> = Vec::new();
        let mut total = 0;

        for frame in frames {
            total += 1;
            for issue in frame {
                match issues.iter_mut().find(|c| &c.issue == issue) {
                    Some(c) => c.count += 1,
                    None => issues.push(IssueCount {
                        issue: issue.clone(),
                        count: 1,
                    }),
                }
            }
        }

        // Stable sort keeps first appearance among equal counts
        issues.sort_by(|a, b| b.count.cmp(&a.count));
        Self {
            issues,
            frames: total,
        }
    }

    pub fn most_common(&self) -> Option<&str> {
        self.issues.first().map(|c| c.issue.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
