//! Entry operations within one generation: write-by-key, read-by-key.

use super::connection::CacheDb;
use crate::{AgentRequest, AgentResponse, Error};
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Handle to a single named generation.
///
/// Obtained from [`CacheDb::open_generation`]. The handle does not keep the
/// generation alive: once it is deleted, writes through the handle fail and
/// reads find nothing.
#[derive(Clone, Debug)]
pub struct Generation {
    db: CacheDb,
    name: String,
}

impl Generation {
    pub(crate) fn new(db: CacheDb, name: String) -> Self {
        Self { db, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a response under the request's key, replacing any previous entry.
    pub async fn put(&self, request: &AgentRequest, response: &AgentResponse) -> Result<(), Error> {
        let generation = self.name.clone();
        let key = request.cache_key();
        let method = request.method().to_string();
        let url = request.url().to_string();
        let headers_json = serde_json::to_string(&response.headers)?;
        let response = response.clone();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (
                    generation, request_key, method, url, response_url,
                    status, status_text, headers_json, body, response_type, stored_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(generation, request_key) DO UPDATE SET
                    method = excluded.method,
                    url = excluded.url,
                    response_url = excluded.response_url,
                    status = excluded.status,
                    status_text = excluded.status_text,
                    headers_json = excluded.headers_json,
                    body = excluded.body,
                    response_type = excluded.response_type,
                    stored_at = excluded.stored_at",
                    params![
                        generation,
                        key,
                        method,
                        url,
                        response.url,
                        response.status,
                        response.status_text,
                        headers_json,
                        response.body.as_ref(),
                        response.response_type.as_str(),
                        chrono::Utc::now().to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        tracing::debug!(generation = %self.name, url = %request.url(), "stored cache entry");
        Ok(())
    }

    /// Look up the stored response for a request.
    ///
    /// Returns None if nothing is stored under the request's key.
    pub async fn match_request(&self, request: &AgentRequest) -> Result<Option<AgentResponse>, Error> {
        let generation = self.name.clone();
        let key = request.cache_key();

        self.db
            .conn
            .call(move |conn| -> Result<Option<AgentResponse>, Error> {
                let row = conn.query_row(
                    "SELECT response_url, status, status_text, headers_json, body, response_type
                     FROM entries WHERE generation = ?1 AND request_key = ?2",
                    params![generation, key],
                    |row| {
                        Ok((
                            row.get::<_, Option<String>>(0)?,
                            row.get::<_, u16>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, Vec<u8>>(4)?,
                            row.get::<_, String>(5)?,
                        ))
                    },
                );

                let (url, status, status_text, headers_json, body, response_type) = match row {
                    Ok(r) => r,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                Ok(Some(AgentResponse {
                    url,
                    status,
                    status_text,
                    headers: serde_json::from_str(&headers_json)?,
                    body: Bytes::from(body),
                    response_type: response_type.parse()?,
                }))
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored entries.
    pub async fn len(&self) -> Result<u64, Error> {
        let generation = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE generation = ?1", params![generation], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}
