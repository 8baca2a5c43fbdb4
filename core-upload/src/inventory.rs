//! Channel inventory fetcher
//!
//! Pulls the full identifier set of the destination channel's uploads.
//! Reconciliation is only sound against a complete inventory, so paging
//! always runs to exhaustion; a partial listing fails the fetch.

use bridge_traits::video::VideoPlatform;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use crate::error::Result;

/// Complete snapshot of the channel's published uploads.
#[derive(Debug, Default)]
pub struct ChannelInventory {
    video_ids: HashSet<String>,
}

impl ChannelInventory {
    pub fn contains(&self, video_id: &str) -> bool {
        self.video_ids.contains(video_id)
    }

    pub fn len(&self) -> usize {
        self.video_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.video_ids.is_empty()
    }
}

impl FromIterator<String> for ChannelInventory {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            video_ids: iter.into_iter().collect(),
        }
    }
}

/// Fetch the channel's uploads to exhaustion.
///
/// `channel_id = None` targets the authenticated user's own channel.
///
/// # Errors
///
/// Returns [`UploadError::Auth`](crate::UploadError::Auth) on credential
/// rejection, which aborts the run before any upload starts.
#[instrument(skip(platform))]
pub async fn fetch_inventory(
    platform: &dyn VideoPlatform,
    channel_id: Option<&str>,
) -> Result<ChannelInventory> {
    let mut video_ids = HashSet::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = platform.list_channel_uploads(channel_id, page_token).await?;
        debug!(count = page.videos.len(), "Fetched inventory page");

        for video in page.videos {
            video_ids.insert(video.id);
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(videos = video_ids.len(), "Channel inventory complete");
    Ok(ChannelInventory { video_ids })
}
