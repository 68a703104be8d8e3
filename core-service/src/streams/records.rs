//! Catalog scan delivery: a count, then records in fixed-size batches.

use super::{EventSink, StreamEvent};
use crate::error::Result;
use core_sync::{CatalogScanner, KnownState, MediaRecord};
use std::mem;
use tracing::{debug, info, instrument};

pub struct RecordStreamer {
    scanner: CatalogScanner,
    batch_size: usize,
}

impl RecordStreamer {
    pub fn new(scanner: CatalogScanner, batch_size: usize) -> Self {
        Self {
            scanner,
            batch_size: batch_size.max(1),
        }
    }

    /// Emit the unfiltered count, then every new or updated record.
    ///
    /// Stops between rows once the stream is cancelled; dropping the scan
    /// releases the open cursor.
    #[instrument(skip(self, known, sink), fields(batch_size = self.batch_size))]
    pub fn stream(&self, known: KnownState, sink: &EventSink) -> Result<()> {
        let total = self.scanner.count(None);
        if !sink.success(StreamEvent::Count(total)) {
            return Ok(());
        }

        let mut batch: Vec<MediaRecord> = Vec::with_capacity(self.batch_size);
        let mut emitted = 0usize;
        for record in self.scanner.scan(known) {
            batch.push(record);
            if batch.len() >= self.batch_size {
                emitted += batch.len();
                let full = mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
                if !sink.success(StreamEvent::Records(full)) {
                    debug!(emitted, "Scan cancelled");
                    return Ok(());
                }
            }
            if sink.is_cancelled() {
                debug!(emitted, "Scan cancelled");
                return Ok(());
            }
        }

        if !batch.is_empty() {
            emitted += batch.len();
            sink.success(StreamEvent::Records(batch));
        }
        info!(total, emitted, "Catalog scan streamed");
        Ok(())
    }
}
