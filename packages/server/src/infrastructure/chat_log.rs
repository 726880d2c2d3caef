//! File-backed chat log.

use std::{io, path::Path};

use async_trait::async_trait;
use tokio::{fs::File, io::AsyncWriteExt, sync::Mutex};

use crate::domain::ChatLog;

/// Chat log written to a file that is truncated when opened.
pub struct FileChatLog {
    file: Mutex<File>,
}

impl FileChatLog {
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl ChatLog for FileChatLog {
    async fn append(&self, line: &[u8]) -> io::Result<()> {
        let mut file = self.file.lock().await;
        file.write_all(line).await?;
        file.flush().await
    }
}
