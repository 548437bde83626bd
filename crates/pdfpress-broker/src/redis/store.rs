//! Redis-backed job store.
//!
//! Each job is one hash under `{prefix}job:{id}` with flat string fields,
//! so the guarded transition can compare and mutate `status` server-side
//! in a Lua script without deserializing the record.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Script};

use pdfpress_core::error::{AppError, ErrorKind};
use pdfpress_core::result::AppResult;
use pdfpress_core::types::JobId;
use pdfpress_entity::job::{Dpi, Job, JobState, JobStatus, JpegQuality, OptimizeParams};

use crate::keys;
use crate::traits::JobStore;

use super::client::RedisClient;

/// Creates the job hash only if the key does not exist yet.
const CREATE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
"#;

/// Compare-and-swap on the `status` field.
///
/// Returns 'ok' on success, 'missing' for an unknown key, or the current
/// status string when it does not match the expected value.
const TRANSITION_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], 'status')
if not current then
  return 'missing'
end
if current ~= ARGV[1] then
  return current
end
redis.call('HSET', KEYS[1], 'status', ARGV[2], 'updated_at', ARGV[3])
if ARGV[4] then
  redis.call('HSET', KEYS[1], ARGV[4], ARGV[5])
end
return 'ok'
"#;

/// Redis-backed [`JobStore`].
#[derive(Debug, Clone)]
pub struct RedisJobStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisJobStore {
    /// Create a new Redis job store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(op: &str, e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Broker, format!("Redis {op} failed: {e}"), e)
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn create(&self, job: &Job) -> AppResult<()> {
        let key = self.client.prefixed_key(&keys::job(job.id));
        let mut conn = self.client.conn_mut();

        let (status, extra) = state_fields(&job.state);
        let mut fields: Vec<(&str, String)> = vec![
            ("status", status.to_string()),
            ("dpi", job.params.dpi.value().to_string()),
            ("jpegq", job.params.jpegq.value().to_string()),
            ("original_filename", job.original_filename.clone()),
            ("input_path", job.input_path.clone()),
            ("created_at", job.created_at.to_rfc3339()),
            ("updated_at", job.updated_at.to_rfc3339()),
        ];
        if let Some((field, value)) = extra {
            fields.push((field, value.to_string()));
        }

        let script = Script::new(CREATE_SCRIPT);
        let mut invocation = script.prepare_invoke();
        invocation.key(&key);
        for (field, value) in &fields {
            invocation.arg(*field).arg(value);
        }
        let created: i64 = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(|e| Self::map_err("create", e))?;

        if created == 0 {
            return Err(AppError::conflict(format!("job {} already exists", job.id)));
        }
        Ok(())
    }

    async fn get(&self, id: JobId) -> AppResult<Option<Job>> {
        let key = self.client.prefixed_key(&keys::job(id));
        let mut conn = self.client.conn_mut();
        let fields: HashMap<String, String> = conn
            .hgetall(&key)
            .await
            .map_err(|e| Self::map_err("get", e))?;

        if fields.is_empty() {
            return Ok(None);
        }
        job_from_hash(id, &fields).map(Some)
    }

    async fn transition(&self, id: JobId, from: JobStatus, to: JobState) -> AppResult<Job> {
        let key = self.client.prefixed_key(&keys::job(id));
        let mut conn = self.client.conn_mut();

        let (status, extra) = state_fields(&to);
        let script = Script::new(TRANSITION_SCRIPT);
        let mut invocation = script.prepare_invoke();
        invocation
            .key(&key)
            .arg(from.as_str())
            .arg(status.as_str())
            .arg(Utc::now().to_rfc3339());
        if let Some((field, value)) = extra {
            invocation.arg(field).arg(value);
        }
        let outcome: String = invocation
            .invoke_async(&mut conn)
            .await
            .map_err(|e| Self::map_err("transition", e))?;

        match outcome.as_str() {
            "ok" => {}
            "missing" => return Err(AppError::not_found(format!("job {id} not found"))),
            current => {
                return Err(AppError::conflict(format!(
                    "job {id} is {current}, expected {from}"
                )));
            }
        }

        // Only the owning worker writes past this point, so the re-read
        // cannot observe a concurrent mutation.
        self.get(id)
            .await?
            .ok_or_else(|| AppError::broker(format!("job {id} vanished after transition")))
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client.ping().await
    }
}

/// Split a state into its status tag and the optional variant field.
fn state_fields(state: &JobState) -> (JobStatus, Option<(&'static str, &str)>) {
    match state {
        JobState::Queued => (JobStatus::Queued, None),
        JobState::Processing => (JobStatus::Processing, None),
        JobState::Done { output_path } => {
            (JobStatus::Done, Some(("output_path", output_path.as_str())))
        }
        JobState::Failed { error } => (JobStatus::Failed, Some(("error", error.as_str()))),
    }
}

/// Rebuild a [`Job`] from its flat hash fields.
fn job_from_hash(id: JobId, fields: &HashMap<String, String>) -> AppResult<Job> {
    let field = |name: &str| -> AppResult<&str> {
        fields.get(name).map(String::as_str).ok_or_else(|| {
            AppError::new(
                ErrorKind::Serialization,
                format!("corrupt job record for {id}: missing field '{name}'"),
            )
        })
    };
    let corrupt = |detail: String| AppError::new(
        ErrorKind::Serialization,
        format!("corrupt job record for {id}: {detail}"),
    );

    let dpi_raw: u32 = field("dpi")?
        .parse()
        .map_err(|_| corrupt("non-numeric dpi".into()))?;
    let dpi = Dpi::try_from(dpi_raw).map_err(|e| corrupt(e.to_string()))?;
    let jpegq_raw: u32 = field("jpegq")?
        .parse()
        .map_err(|_| corrupt("non-numeric jpegq".into()))?;
    let jpegq = JpegQuality::try_from(jpegq_raw).map_err(|e| corrupt(e.to_string()))?;

    let state = match field("status")? {
        "queued" => JobState::Queued,
        "processing" => JobState::Processing,
        "done" => JobState::Done {
            output_path: field("output_path")?.to_string(),
        },
        "failed" => JobState::Failed {
            error: field("error")?.to_string(),
        },
        other => return Err(corrupt(format!("unknown status '{other}'"))),
    };

    Ok(Job {
        id,
        params: OptimizeParams { dpi, jpegq },
        original_filename: field("original_filename")?.to_string(),
        input_path: field("input_path")?.to_string(),
        state,
        created_at: parse_timestamp(field("created_at")?).map_err(corrupt)?,
        updated_at: parse_timestamp(field("updated_at")?).map_err(corrupt)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{raw}': {e}"))
}
