use crate::{
    config::RetryPolicy,
    error::{ApiError, PublishError},
    types::Privacy,
    utils,
    ytmusic::MusicCatalog,
};

/// Largest number of tracks sent in one edit request.
pub const ADD_BATCH_SIZE: usize = 100;

/// Creates a playlist and fills it, in two steps.
///
/// If an add fails after creation the playlist stays on the account with the
/// tracks added so far; [`PublishError::TracksAddFailed`] carries its id.
pub struct Publisher<'a, K> {
    catalog: &'a K,
    retry: RetryPolicy,
}

impl<'a, K: MusicCatalog> Publisher<'a, K> {
    pub fn new(catalog: &'a K, retry: RetryPolicy) -> Self {
        Self { catalog, retry }
    }

    pub async fn publish(
        &self,
        title: &str,
        description: &str,
        privacy: Privacy,
        track_ids: &[String],
        allow_duplicates: bool,
    ) -> Result<String, PublishError> {
        let description = utils::sanitize_description(description);
        let playlist_id = self
            .catalog
            .create_playlist(title, &description, privacy)
            .await
            .map_err(PublishError::CreateFailed)?;
        tracing::debug!("created playlist {}", playlist_id);

        let mut added = 0;
        for batch in track_ids.chunks(ADD_BATCH_SIZE) {
            self.add_batch(&playlist_id, batch, allow_duplicates)
                .await
                .map_err(|source| PublishError::TracksAddFailed {
                    playlist_id: playlist_id.clone(),
                    added,
                    source,
                })?;
            added += batch.len();
        }

        Ok(playlist_id)
    }

    async fn add_batch(
        &self,
        playlist_id: &str,
        batch: &[String],
        allow_duplicates: bool,
    ) -> Result<(), ApiError> {
        let mut retries = 0;
        loop {
            match self
                .catalog
                .add_tracks(playlist_id, batch, allow_duplicates)
                .await
            {
                Err(ApiError::Conflict) if retries < self.retry.max_retries => {
                    retries += 1;
                    let wait = self.retry.base_delay * retries;
                    tracing::info!(
                        "conflict adding tracks, retrying in {:?} (attempt {}/{})",
                        wait,
                        retries,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(wait).await;
                }
                result => return result,
            }
        }
    }
}
