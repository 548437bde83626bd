//! Redis-backed FIFO job queue.
//!
//! A plain list with LPUSH on the producer side and RPOP on the worker
//! side. Dequeue is poll-based rather than blocking because the
//! connection manager multiplexes one connection across all callers.

use async_trait::async_trait;
use redis::AsyncCommands;

use pdfpress_core::error::{AppError, ErrorKind};
use pdfpress_core::result::AppResult;
use pdfpress_core::types::JobId;

use crate::keys;
use crate::traits::JobQueue;

use super::client::RedisClient;

/// Redis-backed [`JobQueue`].
#[derive(Debug, Clone)]
pub struct RedisJobQueue {
    /// Redis client.
    client: RedisClient,
}

impl RedisJobQueue {
    /// Create a new Redis job queue.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn key(&self) -> String {
        self.client.prefixed_key(&keys::queue())
    }

    /// Map a Redis error to an AppError.
    fn map_err(op: &str, e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Broker, format!("Redis {op} failed: {e}"), e)
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, id: JobId) -> AppResult<()> {
        let mut conn = self.client.conn_mut();
        let _: i64 = conn
            .lpush(self.key(), id.to_string())
            .await
            .map_err(|e| Self::map_err("enqueue", e))?;
        Ok(())
    }

    async fn dequeue(&self) -> AppResult<Option<JobId>> {
        let mut conn = self.client.conn_mut();
        let raw: Option<String> = conn
            .rpop(self.key(), None)
            .await
            .map_err(|e| Self::map_err("dequeue", e))?;

        match raw {
            None => Ok(None),
            Some(raw) => raw
                .parse::<JobId>()
                .map(Some)
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Serialization,
                        format!("corrupt queue entry '{raw}'"),
                        e,
                    )
                }),
        }
    }

    async fn len(&self) -> AppResult<u64> {
        let mut conn = self.client.conn_mut();
        conn.llen(self.key())
            .await
            .map_err(|e| Self::map_err("len", e))
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client.ping().await
    }
}
