//! Local repository mirrors
//!
//! One mirror per repository lives under the mirrors root, keyed by the
//! squashed repository name.

mod lock;

pub use lock::MirrorLock;

use crate::config::Config;
use crate::types::RebaseRequest;
use std::path::{Path, PathBuf};

/// Where a repository's mirror lives and where it comes from
#[derive(Debug, Clone)]
pub struct RepositoryLocation {
    mirrors_root: PathBuf,
    gerrit_host: String,
    repository_name: String,
    local_name: String,
}

impl RepositoryLocation {
    /// Location for `request` under the configured mirrors root
    pub fn for_request(config: &Config, request: &RebaseRequest) -> Self {
        Self::new(
            config.mirrors_root.clone(),
            config.gerrit_host.clone(),
            request.repository_name(),
            request.local_name(),
        )
    }

    /// Location from explicit parts
    pub fn new(
        mirrors_root: PathBuf,
        gerrit_host: String,
        repository_name: &str,
        local_name: &str,
    ) -> Self {
        Self {
            mirrors_root,
            gerrit_host,
            repository_name: repository_name.to_string(),
            local_name: local_name.to_string(),
        }
    }

    /// Directory holding all mirrors
    pub fn mirrors_root(&self) -> &Path {
        &self.mirrors_root
    }

    /// Squashed name, the mirror's directory key
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Gerrit host
    pub fn gerrit_host(&self) -> &str {
        &self.gerrit_host
    }

    /// Canonical repository name
    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// `<mirrors_root>/<local_name>`
    pub fn mirror_path(&self) -> PathBuf {
        self.mirrors_root.join(&self.local_name)
    }

    /// Anonymous fetch URL
    pub fn remote_url(&self) -> String {
        format!("https://{}/r/{}", self.gerrit_host, self.repository_name)
    }

    /// Arguments that make git operate on this mirror (`-C <mirror>`)
    pub fn git_prefix(&self) -> Vec<String> {
        vec![
            "-C".to_string(),
            self.mirror_path().display().to_string(),
        ]
    }

    /// Lock file guarding this mirror
    pub fn lock_path(&self) -> PathBuf {
        self.mirrors_root
            .join(".locks")
            .join(format!("{}.lock", self.local_name))
    }

    /// True iff the mirror directory and its `.git` metadata both exist.
    ///
    /// Not cached; callers probe once per run.
    pub fn exists(&self) -> bool {
        let mirror = self.mirror_path();
        mirror.is_dir() && mirror.join(".git").exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(root: &Path) -> RepositoryLocation {
        RepositoryLocation::new(
            root.to_path_buf(),
            "gerrit.example.org".to_string(),
            "org/group/project",
            "org_group_project",
        )
    }

    #[test]
    fn test_derived_paths() {
        let loc = location(Path::new("/srv/mirrors"));
        assert_eq!(loc.mirror_path(), PathBuf::from("/srv/mirrors/org_group_project"));
        assert_eq!(loc.remote_url(), "https://gerrit.example.org/r/org/group/project");
        assert_eq!(loc.git_prefix(), vec!["-C", "/srv/mirrors/org_group_project"]);
        assert_eq!(
            loc.lock_path(),
            PathBuf::from("/srv/mirrors/.locks/org_group_project.lock")
        );
    }

    #[test]
    fn test_exists_requires_git_metadata() {
        let root = tempfile::tempdir().unwrap();
        let loc = location(root.path());
        assert!(!loc.exists());

        std::fs::create_dir_all(loc.mirror_path()).unwrap();
        assert!(!loc.exists(), "directory without .git is not a mirror");

        std::fs::create_dir_all(loc.mirror_path().join(".git")).unwrap();
        assert!(loc.exists());
    }
}
