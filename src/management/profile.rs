use std::{fmt::Write, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use crate::{
    config,
    recommend::{ProfileError, ProfileStore},
    types::ListeningProfile,
};

/// File-backed listening profiles, one JSON document per user.
pub struct ProfileManager {
    dir: PathBuf,
}

impl ProfileManager {
    pub fn new() -> Self {
        Self::with_dir(config::data_dir().join("profiles"))
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn load(&self, user_id: &str) -> Result<Option<ListeningProfile>, ProfileError> {
        let path = self.profile_path(user_id)?;
        let content = match async_fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub async fn persist(&self, profile: &ListeningProfile) -> Result<PathBuf, ProfileError> {
        let path = self.profile_path(&profile.user_id)?;
        async_fs::create_dir_all(&self.dir).await?;

        let json = serde_json::to_string_pretty(profile)?;
        async_fs::write(&path, json).await?;
        Ok(path)
    }

    /// User ids are used as file names. Bytes outside `[A-Za-z0-9_-]` are
    /// written as `%XX`, so distinct ids never share a file.
    fn profile_path(&self, user_id: &str) -> Result<PathBuf, ProfileError> {
        if user_id.is_empty() {
            return Err(ProfileError::InvalidUserId(user_id.to_string()));
        }

        let mut file = String::with_capacity(user_id.len() + 5);
        for b in user_id.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                file.push(b as char);
            } else {
                let _ = write!(file, "%{:02X}", b);
            }
        }
        file.push_str(".json");
        Ok(self.dir.join(file))
    }
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for ProfileManager {
    async fn get_listening_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<ListeningProfile>, ProfileError> {
        self.load(user_id).await
    }
}
