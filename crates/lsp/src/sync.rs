//! Document synchronization between the editor and the analysis
//! service.
//!
//! Every buffer-affecting editor event funnels through
//! [`DocumentSync`], which owns the [`BufferSet`] and the per-buffer
//! version counters. Versions are what keep the service's view
//! coherent: a buffer reports version 0 exactly once (its first open)
//! and strictly increasing values afterward, including across re-opens
//! of the same file.

use std::sync::Arc;

use tracing::debug;

use crate::buffer::{Buffer, BufferSet};
use crate::service::AnalysisService;
use crate::{Error, Result};

/// Tracks open documents and forwards open/change notifications.
pub struct DocumentSync {
	service: Arc<dyn AnalysisService>,
	language_id: String,
	buffers: BufferSet,
}

impl DocumentSync {
	/// Creates a tracker reporting documents as `language_id`.
	pub fn new(service: Arc<dyn AnalysisService>, language_id: impl Into<String>) -> Self {
		Self {
			service,
			language_id: language_id.into(),
			buffers: BufferSet::new(),
		}
	}

	/// The buffers currently known to the session.
	pub fn buffers(&self) -> &BufferSet {
		&self.buffers
	}

	/// Handles the editor's "buffer loaded" event.
	///
	/// A handle seen for the first time starts at version 0 and opens the
	/// document on the service; a re-load of a known handle (e.g. `:e!`)
	/// continues its version sequence and reports a change instead.
	pub async fn buf_read_post(&mut self, num: i64, path: &str, text: &str) -> Result<()> {
		let version = match self.buffers.get(num) {
			Some(existing) => existing.version() + 1,
			None => 0,
		};
		let buffer = Buffer::new(num, path, text, version);
		debug!(buffer = num, version, "buffer loaded");
		self.notify(buffer).await
	}

	/// Handles the editor's "buffer content changed" event.
	///
	/// The buffer must have been loaded first; content changes for
	/// unknown handles indicate lost events and are rejected.
	pub async fn buf_text_changed(&mut self, num: i64, text: &str) -> Result<()> {
		let previous = self.buffers.get(num).ok_or(Error::UnknownBuffer(num))?;
		let buffer = Buffer::new(num, previous.path(), text, previous.version() + 1);
		debug!(buffer = num, version = buffer.version(), "buffer changed");
		self.notify(buffer).await
	}

	/// Stores the new snapshot and tells the service about it: version 0
	/// is a fresh open, anything later is a change.
	async fn notify(&mut self, buffer: Buffer) -> Result<()> {
		let uri = buffer.uri()?;
		let version = buffer.version();
		let text = buffer.text();
		self.buffers.insert(buffer);

		if version == 0 {
			self.service
				.did_open(uri, self.language_id.clone(), version, text)
				.await
				.map_err(|err| Error::service("textDocument/didOpen", err))
		} else {
			self.service
				.did_change(uri, version, text)
				.await
				.map_err(|err| Error::service("textDocument/didChange", err))
		}
	}
}
