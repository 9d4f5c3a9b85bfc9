use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::assets::garment::{GarmentImage, decode_garment, decode_garment_path};
use crate::foundation::error::{DrapeError, DrapeResult};

/// Where garment bytes come from.
#[derive(Clone, Debug)]
pub enum GarmentSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl GarmentSource {
    /// Decode on the current thread.
    pub fn decode(&self) -> DrapeResult<GarmentImage> {
        match self {
            Self::Bytes(b) => decode_garment(b),
            Self::Path(p) => decode_garment_path(p),
        }
    }
}

/// Decode `primary`, retrying with `fallback` when it fails.
///
/// The primary error is returned when both sources fail.
pub fn decode_with_fallback(
    primary: &GarmentSource,
    fallback: Option<&GarmentSource>,
) -> DrapeResult<GarmentImage> {
    match primary.decode() {
        Ok(img) => Ok(img),
        Err(err) => {
            let Some(fallback) = fallback else {
                return Err(err);
            };
            tracing::warn!(error = %err, "garment decode failed, trying fallback source");
            fallback.decode().map_err(|_| err)
        }
    }
}

struct Pending {
    generation: u64,
    rx: Receiver<(u64, DrapeResult<GarmentImage>)>,
}

/// Background garment decoder.
///
/// Each [`GarmentLoader::request`] starts a worker thread and supersedes any earlier request.
/// Results are collected with [`GarmentLoader::poll`] from the frame loop; a result belonging to a
/// superseded or cancelled request is dropped.
#[derive(Default)]
pub struct GarmentLoader {
    generation: u64,
    pending: Option<Pending>,
}

impl std::fmt::Debug for GarmentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GarmentLoader")
            .field("generation", &self.generation)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl GarmentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start decoding in the background; returns the request generation.
    pub fn request(&mut self, primary: GarmentSource, fallback: Option<GarmentSource>) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = decode_with_fallback(&primary, fallback.as_ref());
            // Receiver may be gone after cancel; nothing to do then.
            let _ = tx.send((generation, result));
        });
        self.pending = Some(Pending { generation, rx });
        generation
    }

    /// `true` while a request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Current request generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Non-blocking check for a finished decode of the current request.
    pub fn poll(&mut self) -> Option<DrapeResult<GarmentImage>> {
        let pending = self.pending.as_ref()?;
        match pending.rx.try_recv() {
            Ok(msg) => {
                self.pending = None;
                self.accept(msg)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                Some(Err(DrapeError::decode("garment decode worker exited")))
            }
        }
    }

    /// Block until the current request finishes. `None` when nothing is pending.
    pub fn wait(&mut self) -> Option<DrapeResult<GarmentImage>> {
        let pending = self.pending.take()?;
        match pending.rx.recv() {
            Ok(msg) => self.accept(msg),
            Err(_) => Some(Err(DrapeError::decode("garment decode worker exited"))),
        }
    }

    /// Drop the outstanding request; its result is discarded when it arrives.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!(generation = self.generation, "garment decode cancelled");
        }
        self.generation += 1;
    }

    fn accept(
        &self,
        (generation, result): (u64, DrapeResult<GarmentImage>),
    ) -> Option<DrapeResult<GarmentImage>> {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale garment decode"
            );
            return None;
        }
        Some(result)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
