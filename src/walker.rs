use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use git2::{BranchType, Commit, Repository, Revwalk, Sort};
use graph::CommitRecord;
use std::path::Path;

/// Display data that travels alongside a commit record
#[derive(Debug, Clone)]
pub struct CommitMeta {
    pub short_id: String,
    pub summary: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LoadedCommit {
    pub record: CommitRecord,
    pub meta: CommitMeta,
}

/// Reads commit history out of a git repository, newest first
pub struct GitWalker {
    repo: Repository,
}

impl GitWalker {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;
        Ok(Self { repo })
    }

    /// Walk HEAD and every local branch in pages of `page_size` commits
    pub fn pages(&self, page_size: usize) -> Result<CommitPages<'_>> {
        let mut revwalk = self.repo.revwalk()?;

        // An unborn HEAD (fresh repository) simply has no history yet
        if self.repo.head().is_ok() {
            revwalk.push_head()?;
        }
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(target) = branch.get().target() {
                revwalk.push(target)?;
            }
        }

        // Children before parents, newest first among siblings
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        Ok(CommitPages {
            repo: &self.repo,
            revwalk,
            page_size: page_size.max(1),
            next_row: 0,
        })
    }
}

/// Iterator over pages of commits with globally increasing rows
pub struct CommitPages<'r> {
    repo: &'r Repository,
    revwalk: Revwalk<'r>,
    page_size: usize,
    next_row: usize,
}

impl<'r> CommitPages<'r> {
    fn load(&mut self, commit: &Commit) -> Result<LoadedCommit> {
        let id = commit.id().to_string();
        let parents: Vec<String> = commit.parent_ids().map(|oid| oid.to_string()).collect();

        let timestamp = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .context("Invalid commit timestamp")?;

        let meta = CommitMeta {
            short_id: id.chars().take(8).collect(),
            summary: commit.summary().unwrap_or("").to_string(),
            author: commit.author().name().unwrap_or("Unknown").to_string(),
            timestamp,
        };

        let record = CommitRecord::new(id, parents, self.next_row);
        self.next_row += 1;
        Ok(LoadedCommit { record, meta })
    }
}

impl<'r> Iterator for CommitPages<'r> {
    type Item = Result<Vec<LoadedCommit>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut page = Vec::with_capacity(self.page_size);
        while page.len() < self.page_size {
            let oid = match self.revwalk.next() {
                Some(Ok(oid)) => oid,
                Some(Err(e)) => return Some(Err(anyhow::Error::from(e).context("Failed to walk history"))),
                None => break,
            };
            let repo = self.repo;
            let loaded = repo
                .find_commit(oid)
                .map_err(anyhow::Error::from)
                .and_then(|commit| self.load(&commit));
            match loaded {
                Ok(commit) => page.push(commit),
                Err(e) => return Some(Err(e)),
            }
        }

        if page.is_empty() {
            None
        } else {
            Some(Ok(page))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::Result;
    use git2::{Commit, Oid, Repository, Signature};
    use tempfile::TempDir;

    pub fn create_test_repo() -> Result<(TempDir, Repository)> {
        let dir = TempDir::new()?;
        let repo = Repository::init(dir.path())?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok((dir, repo))
    }

    pub fn commit_to_repo(repo: &Repository, message: &str, parents: &[&Commit], update_ref: Option<&str>) -> Result<Oid> {
        let sig = Signature::now("Test User", "test@example.com")?;
        let tree_id = {
            let mut index = repo.index()?;
            index.write_tree()?
        };
        let tree = repo.find_tree(tree_id)?;

        Ok(repo.commit(update_ref, &sig, &sig, message, &tree, parents)?)
    }

    pub fn linear_repo(count: usize) -> Result<(TempDir, Repository)> {
        let (dir, repo) = create_test_repo()?;
        let mut parent: Option<Oid> = None;
        for i in 0..count {
            let parents: Vec<Commit> = parent.map(|oid| repo.find_commit(oid)).transpose()?.into_iter().collect();
            let refs: Vec<&Commit> = parents.iter().collect();
            parent = Some(commit_to_repo(&repo, &format!("Commit {i}"), &refs, Some("HEAD"))?);
        }
        Ok((dir, repo))
    }
}
