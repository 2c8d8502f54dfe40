use std::io::Read;
use std::sync::Arc;

use csv::ReaderBuilder;

use super::import_model::{parse_listing_record, ImportSummary};
use crate::errors::{Error, Result, ValidationError};
use crate::vehicles::{ListingRepositoryTrait, NewListing};

/// Streams a listing export into the repository in fixed-size batches.
pub struct ListingImportService {
    listing_repository: Arc<dyn ListingRepositoryTrait>,
    batch_size: usize,
}

impl ListingImportService {
    pub fn new(listing_repository: Arc<dyn ListingRepositoryTrait>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "batch size must be at least 1".to_string(),
            )));
        }
        Ok(Self {
            listing_repository,
            batch_size,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Imports every line after the header, skipping the first `start_from`
    /// data lines. Each batch commits or fails on its own; a failed batch is
    /// logged and the import moves on.
    pub async fn import<R: Read>(&self, reader: R, start_from: usize) -> Result<ImportSummary> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut summary = ImportSummary::default();
        let mut batch: Vec<NewListing> = Vec::with_capacity(self.batch_size);
        let mut batch_id = 0usize;

        for (line, record) in csv_reader.records().skip(start_from).enumerate() {
            let record = record?;
            match parse_listing_record(&record) {
                Some(listing) => {
                    log::debug!(
                        "Importing batch #{}, record #{}",
                        batch_id,
                        batch.len() + 1
                    );
                    batch.push(listing);
                }
                None => {
                    log::warn!(
                        "Skipping line {} with {} columns",
                        start_from + line + 1,
                        record.len()
                    );
                    summary.records_skipped += 1;
                }
            }

            if batch.len() >= self.batch_size {
                self.flush(std::mem::take(&mut batch), batch_id, &mut summary)
                    .await;
                batch_id += 1;
            }
        }

        if !batch.is_empty() {
            self.flush(batch, batch_id, &mut summary).await;
        }

        log::info!(
            "Import finished: {} records in {} batches, {} batches failed, {} lines skipped",
            summary.records_imported,
            summary.batches_committed,
            summary.batches_failed,
            summary.records_skipped
        );
        Ok(summary)
    }

    async fn flush(&self, batch: Vec<NewListing>, batch_id: usize, summary: &mut ImportSummary) {
        let size = batch.len();
        match self.listing_repository.insert_listings(batch).await {
            Ok(inserted) => {
                log::info!("Insertion #{} committed {} records", batch_id, inserted);
                summary.batches_committed += 1;
                summary.records_imported += inserted;
            }
            Err(e) => {
                log::error!("Insertion #{} failed ({} records): {}", batch_id, size, e);
                summary.batches_failed += 1;
            }
        }
    }
}
