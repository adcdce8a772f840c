use std::time::Duration;

use log::{info, warn};

use crate::config::AppConfig;
use crate::error::ImportError;
use crate::model::TranscriptRecord;
use crate::resolver::{SearchMode, VideoResolver};
use crate::retry::RetryPolicy;
use crate::transcript::TranscriptFetcher;

/// Drives the resolver and the transcript fetcher over a whole batch of
/// videos, guaranteeing one output record per resolved video.
///
/// Per video, "fetch + flatten" runs as one unit under a wider budget than the
/// fetch layer's: any error counts as retryable here, with no added delay
/// beyond what the fetcher sleeps internally. A video that exhausts the budget
/// degrades to an error record instead of aborting the batch, so one video's
/// total failure never removes or blocks another's result.
pub struct BatchProcessor {
    resolver: VideoResolver,
    fetcher: TranscriptFetcher,
    policy: RetryPolicy,
}

impl BatchProcessor {
    pub fn new(config: &AppConfig) -> Result<Self, ImportError> {
        Ok(BatchProcessor {
            resolver: VideoResolver::new(config)?,
            fetcher: TranscriptFetcher::new(config)?,
            policy: RetryPolicy::new(config.retry.batch_attempts, Duration::ZERO),
        })
    }

    #[doc(hidden)]
    pub fn with_components(
        resolver: VideoResolver,
        fetcher: TranscriptFetcher,
        batch_attempts: u32,
    ) -> Self {
        BatchProcessor {
            resolver,
            fetcher,
            policy: RetryPolicy::new(batch_attempts, Duration::ZERO),
        }
    }

    /// Resolve videos for `mode`/`arg` and fetch every transcript. The output
    /// length always equals the number of resolved videos.
    pub async fn process(
        &self,
        mode: SearchMode,
        arg: &str,
    ) -> Result<Vec<TranscriptRecord>, ImportError> {
        let videos = self.resolver.resolve(mode, arg).await?;

        let mut records = Vec::with_capacity(videos.len());
        for video in &videos {
            let label = format!("Processing video {}", video.video_id);
            let attempt = self
                .policy
                .run(&label, |_| true, || async {
                    let transcript = self.fetcher.fetch(&video.video_id).await?;
                    Ok(transcript.flatten(&video.title))
                })
                .await;

            match attempt {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        "Failed to process video {} after {} attempts: {}",
                        video.video_id, self.policy.max_attempts, e
                    );
                    records.push(TranscriptRecord::failed(&video.title, &video.video_id));
                }
            }
        }

        info!(
            "Processed batch of {} video(s), {} failed",
            records.len(),
            records.iter().filter(|r| r.is_error()).count()
        );
        Ok(records)
    }
}
