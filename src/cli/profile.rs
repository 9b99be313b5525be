use tabled::Table;

use crate::{
    error,
    management::ProfileManager,
    types::{ProfileTableRow, TimeWindow, Track},
    utils, warning,
};

use super::{connect, resolve_user};

pub async fn show_profile(user: Option<String>) {
    let user_id = match user {
        Some(user) if user != "me" => user,
        other => resolve_user(&connect().await, other).await,
    };

    let listening_profile = match ProfileManager::new().load(&user_id).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            warning!(
                "No profile stored for {}. Run `seedlist collect` first.",
                user_id
            );
            return;
        }
        Err(e) => error!("Failed to read profile. Err: {}", e),
    };

    let mut rows: Vec<ProfileTableRow> = Vec::new();
    for window in TimeWindow::ALL {
        rows.push(track_row(
            format!("top tracks ({})", window.as_str()),
            listening_profile.top_tracks.get(window),
        ));
    }
    for window in TimeWindow::ALL {
        let artists = listening_profile.top_artists.get(window);
        rows.push(ProfileTableRow {
            section: format!("top artists ({})", window.as_str()),
            entries: artists.len(),
            highlights: highlights(artists.iter().map(|a| a.name.as_str())),
        });
    }
    rows.push(track_row(
        "recently played".to_string(),
        &listening_profile.recently_played,
    ));
    rows.push(track_row(
        "saved tracks".to_string(),
        &listening_profile.saved_tracks,
    ));
    rows.push(ProfileTableRow {
        section: "top genres".to_string(),
        entries: listening_profile.top_genres.len(),
        highlights: highlights(listening_profile.top_genres.iter().map(|g| g.name.as_str())),
    });

    println!(
        "Profile of {} collected {}",
        listening_profile.user_id,
        listening_profile.collected_at.format("%Y-%m-%d %H:%M")
    );
    println!("{}", Table::new(rows));
}

fn track_row(section: String, tracks: &[Track]) -> ProfileTableRow {
    ProfileTableRow {
        section,
        entries: tracks.len(),
        highlights: highlights(tracks.iter().map(|t| t.name.as_str())),
    }
}

fn highlights<'a>(names: impl Iterator<Item = &'a str>) -> String {
    utils::truncate(&names.take(3).collect::<Vec<_>>().join(", "), 60)
}
