//! Seam between the run driver and the remote service.
//!
//! The driver only ever makes two calls against the service; putting
//! them behind a trait lets tests drive the full polling loop with
//! canned replies instead of a live server.

use async_trait::async_trait;
use revox_core::run::PollReply;

use crate::api::{ConverterApi, ConverterApiError, SubmitResponse};

/// The calls the run driver makes against the conversion service.
#[async_trait]
pub trait ConversionService {
    /// Upload a file and queue a conversion job.
    async fn submit_conversion(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        artist: &str,
    ) -> Result<SubmitResponse, ConverterApiError>;

    /// Fetch and classify the current result of a job.
    async fn fetch_result(&self, job_id: &str) -> Result<PollReply, ConverterApiError>;
}

#[async_trait]
impl ConversionService for ConverterApi {
    async fn submit_conversion(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        artist: &str,
    ) -> Result<SubmitResponse, ConverterApiError> {
        ConverterApi::submit_conversion(self, file_name, bytes, artist).await
    }

    async fn fetch_result(&self, job_id: &str) -> Result<PollReply, ConverterApiError> {
        ConverterApi::fetch_result(self, job_id).await
    }
}
