// Relay of local scratch files to a temporary public host.
//
// The uploader owns the cleanup obligation: the scratch file is gone after
// relay() returns, whatever the upload outcome.

pub mod litterbox;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub use litterbox::*;

use crate::error::{Result, SubfetchError};
use crate::post::PostResult;
use crate::scratch::remove_quietly;

/// Temporary public file host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelayHost: Send + Sync {
    /// Upload a local file, returning its public URL
    async fn upload(&self, path: &Path) -> Result<String>;
}

pub struct RelayUploader {
    host: Arc<dyn RelayHost>,
}

impl RelayUploader {
    pub fn new(host: Arc<dyn RelayHost>) -> Self {
        Self { host }
    }

    /// Upload the file named by `result.content` and return a copy pointing
    /// at the public URL
    pub async fn relay(&self, result: &PostResult) -> Result<PostResult> {
        let path = Path::new(&result.content);
        info!("Relaying {}", path.display());

        let uploaded = self.host.upload(path).await;
        remove_quietly(path).await;

        match uploaded {
            Ok(url) => {
                info!("Relayed '{}' to {}", result.title, url);
                Ok(result.with_content(url))
            }
            Err(e) => {
                warn!("Relay of {} failed: {}", path.display(), e);
                Err(match e {
                    SubfetchError::RelayFailed(_) => e,
                    other => SubfetchError::RelayFailed(other.to_string()),
                })
            }
        }
    }
}
