use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Parent ids of a commit, first parent first. Most commits have one or two.
pub type ParentIds = SmallVec<[String; 2]>;

/// A commit as supplied by the history source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Unique commit ID (SHA or any opaque string)
    pub id: String,
    /// Parent commit IDs; index 0 is the first ("main") parent
    pub parent_ids: ParentIds,
    /// Position in the overall sequence, newest commit = row 0
    pub row: usize,
}

impl CommitRecord {
    pub fn new<I, S>(id: impl Into<String>, parent_ids: I, row: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            parent_ids: parent_ids.into_iter().map(Into::into).collect(),
            row,
        }
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parent_ids.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_roots_and_merges() {
        let root = CommitRecord::new("a", Vec::<String>::new(), 2);
        let linear = CommitRecord::new("b", ["a"], 1);
        let merge = CommitRecord::new("m", ["b", "f"], 0);

        assert!(root.is_root() && !root.is_merge());
        assert!(!linear.is_root() && !linear.is_merge());
        assert!(merge.is_merge());
        assert_eq!(merge.first_parent(), Some("b"));
        assert_eq!(root.first_parent(), None);
    }

    #[test]
    fn deserializes_input_contract() {
        let json = r#"{"id":"e","parent_ids":["c","d"],"row":0}"#;
        let record: CommitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, CommitRecord::new("e", ["c", "d"], 0));
    }
}
