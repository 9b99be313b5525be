use crate::{error, management::ProfileManager, profile, success};

use super::{connect, resolve_user, spinner};

pub async fn collect(user: Option<String>) {
    let catalog = connect().await;
    let user_id = resolve_user(&catalog, user).await;

    let pb = spinner(&format!("Collecting listening data for {}...", user_id));
    let collected = profile::collect(&catalog, &user_id).await;
    pb.finish_and_clear();

    let listening_profile = match collected {
        Ok(p) => p,
        Err(e) => error!("Failed to collect listening data. Err: {}", e),
    };

    match ProfileManager::new().persist(&listening_profile).await {
        Ok(path) => success!(
            "Stored profile of {} ({} tracks, {} genres) at {}",
            user_id,
            listening_profile.known_tracks().count(),
            listening_profile.top_genres.len(),
            path.display()
        ),
        Err(e) => error!("Failed to store profile. Err: {}", e),
    }
}
