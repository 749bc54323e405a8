// geotag/src/core/orchestrator.rs
use super::{GeotagError, GeotagRecord, IngestConfig, Result, Stage};
use crate::handoff::RecordStore;
use crate::processors::{GeoCoordinate, ImageSource, Loader, ReverseGeocoder, TagExtractor};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of one submission once its pipeline has run.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The submission is still current; this is its final record.
    Completed(GeotagRecord),
    /// A newer submission or a `clear` took over while this one was in flight.
    Superseded,
}

struct Session {
    sequence: u64,
    record: GeotagRecord,
}

/// Drives a photo through extraction, conversion and enrichment, and owns
/// the resulting [`GeotagRecord`].
///
/// Cloning yields another handle onto the same session, so a new photo can be
/// submitted (or the session cleared) while an earlier submission is still
/// awaiting extraction or geocoding. Every submission takes a fresh sequence
/// number; results are applied only while that number is still current.
pub struct IngestionOrchestrator<E, G> {
    session: Arc<Mutex<Session>>,
    extractor: Arc<E>,
    geocoder: Arc<G>,
    loader: Loader,
    config: Arc<IngestConfig>,
}

impl<E, G> Clone for IngestionOrchestrator<E, G> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            extractor: Arc::clone(&self.extractor),
            geocoder: Arc::clone(&self.geocoder),
            loader: self.loader.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: TagExtractor, G: ReverseGeocoder> IngestionOrchestrator<E, G> {
    pub fn new(config: IngestConfig, extractor: E, geocoder: G) -> Self {
        let loader = Loader::new().with_max_file_size(config.max_file_size);

        Self {
            session: Arc::new(Mutex::new(Session {
                sequence: 0,
                record: GeotagRecord::default(),
            })),
            extractor: Arc::new(extractor),
            geocoder: Arc::new(geocoder),
            loader,
            config: Arc::new(config),
        }
    }

    pub async fn submit_file<P: AsRef<Path>>(&self, path: P) -> Result<SubmitOutcome> {
        self.submit(ImageSource::File(path.as_ref().to_path_buf()))
            .await
    }

    pub async fn submit_capture(&self, bytes: Vec<u8>) -> Result<SubmitOutcome> {
        self.submit(ImageSource::Capture(bytes)).await
    }

    /// Runs the whole pipeline for a new photo.
    ///
    /// Fails only when the input is rejected before extraction, in which case
    /// the current record is left untouched.
    pub async fn submit(&self, source: ImageSource) -> Result<SubmitOutcome> {
        let image = self.loader.load(source).await?;

        let sequence = {
            let mut session = self.session.lock().await;
            session.sequence += 1;
            session.record = GeotagRecord::previewing(image.preview.clone());
            log::info!("Submission #{} previewing", session.sequence);
            session.sequence
        };

        if !self
            .update(sequence, |record| record.set_stage(Stage::Extracting))
            .await
        {
            return Ok(SubmitOutcome::Superseded);
        }

        let tags = self.extractor.extract(Arc::clone(&image.bytes)).await;
        let coordinate = GeoCoordinate::from_tags(&tags, self.config.hemisphere_fallback);
        let enrich = coordinate.filter(|_| self.config.enable_geocoding);

        let applied = self
            .update(sequence, |record| {
                record.apply_extraction(coordinate, tags.date_time_original.clone());
                if enrich.is_some() {
                    record.set_stage(Stage::Enriching);
                }
            })
            .await;
        if !applied {
            return Ok(SubmitOutcome::Superseded);
        }

        match coordinate {
            Some(coordinate) => log::info!("Submission #{} geolocated at {}", sequence, coordinate),
            None => log::info!("Submission #{} has no usable GPS data", sequence),
        }

        if let Some(coordinate) = enrich {
            let result = self.geocoder.reverse_geocode(coordinate).await;
            if let Err(failure) = &result {
                log::warn!("Submission #{}: {}", sequence, failure);
            }

            if !self
                .update(sequence, |record| record.apply_enrichment(result))
                .await
            {
                return Ok(SubmitOutcome::Superseded);
            }
        }

        let session = self.session.lock().await;
        if session.sequence == sequence {
            Ok(SubmitOutcome::Completed(session.record.clone()))
        } else {
            Ok(SubmitOutcome::Superseded)
        }
    }

    /// Discards the record and anything still in flight for it.
    pub async fn clear(&self) {
        let mut session = self.session.lock().await;
        session.sequence += 1;
        session.record = GeotagRecord::default();
        log::info!("Record cleared");
    }

    pub async fn record(&self) -> GeotagRecord {
        self.session.lock().await.record.clone()
    }

    pub async fn stage(&self) -> Stage {
        self.session.lock().await.record.stage()
    }

    /// Prepares the current record for saving. The caller shows
    /// [`PendingReview::prompt`] and then confirms or drops the review.
    pub async fn submit_for_review(&self) -> Result<PendingReview> {
        let session = self.session.lock().await;
        let stage = session.record.stage();
        if !stage.is_submittable() {
            return Err(GeotagError::InvalidState {
                operation: "submit for review",
                stage,
            });
        }

        Ok(PendingReview {
            record: session.record.clone(),
        })
    }

    async fn update(&self, sequence: u64, apply: impl FnOnce(&mut GeotagRecord)) -> bool {
        let mut session = self.session.lock().await;
        if session.sequence != sequence {
            log::debug!(
                "Discarding result of submission #{} (current is #{})",
                sequence,
                session.sequence
            );
            return false;
        }
        apply(&mut session.record);
        true
    }
}

/// A record awaiting the user's confirmation before it is persisted.
#[derive(Debug, Clone)]
pub struct PendingReview {
    record: GeotagRecord,
}

impl PendingReview {
    pub fn record(&self) -> &GeotagRecord {
        &self.record
    }

    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Save this record?\n  Latitude:  {}\n  Longitude: {}\n  Captured:  {}",
            self.record.latitude_text(),
            self.record.longitude_text(),
            self.record.capture_time_text()
        );
        let place = self.record.place_text();
        if !place.is_empty() {
            prompt.push_str(&format!("\n  Place:     {}", place));
        }
        prompt
    }

    pub fn confirm<S: RecordStore + ?Sized>(self, store: &mut S) -> Result<()> {
        store.persist(&self.record)?;
        log::info!("Record saved");
        Ok(())
    }
}
