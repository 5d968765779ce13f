//! Mock catalog service implementation
//!
//! Holds a small in-memory catalog and records lookups for test assertions.
//! Thread-safe via `Mutex`.

use crate::{CatalogError, CatalogService, FrameRef};
use std::collections::HashSet;
use std::sync::Mutex;

/// Mock catalog service backed by in-memory sets.
#[derive(Debug)]
pub struct MockCatalogService {
    frames: Mutex<HashSet<String>>,
    colors: Mutex<HashSet<String>>,
    default_frame: Mutex<FrameRef>,
    lookups: Mutex<Vec<String>>,
}

impl MockCatalogService {
    /// Create a mock catalog seeded with the standard frames and colors.
    pub fn new() -> Self {
        let frames = ["frame_classic", "frame_rounded", "frame_shrine_gate"]
            .into_iter()
            .map(String::from)
            .collect();
        let colors = ["color_vermilion", "color_indigo", "color_gold"]
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            frames: Mutex::new(frames),
            colors: Mutex::new(colors),
            default_frame: Mutex::new(FrameRef {
                key: "frame_classic".to_string(),
                display_name: "Classic".to_string(),
            }),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Replace the default frame returned by `default_frame`.
    pub fn set_default_frame(&self, frame: FrameRef) {
        *self
            .default_frame
            .lock()
            .expect("default frame lock poisoned — prior test panicked") = frame;
    }

    /// Add a frame key to the catalog.
    pub fn add_frame(&self, key: &str) {
        self.frames
            .lock()
            .expect("frames lock poisoned — prior test panicked")
            .insert(key.to_string());
    }

    /// Add a color key to the catalog.
    pub fn add_color(&self, key: &str) {
        self.colors
            .lock()
            .expect("colors lock poisoned — prior test panicked")
            .insert(key.to_string());
    }

    /// Return all recorded lookup keys, in call order.
    pub fn recorded_lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .expect("lookups lock poisoned — prior test panicked")
            .clone()
    }

    fn record(&self, key: &str) {
        self.lookups
            .lock()
            .expect("lookups lock poisoned — prior test panicked")
            .push(key.to_string());
    }
}

impl Default for MockCatalogService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CatalogService for MockCatalogService {
    async fn default_frame(&self) -> Result<FrameRef, CatalogError> {
        self.record("default_frame");
        Ok(self
            .default_frame
            .lock()
            .expect("default frame lock poisoned — prior test panicked")
            .clone())
    }

    async fn frame_exists(&self, key: &str) -> Result<bool, CatalogError> {
        self.record(key);
        Ok(self
            .frames
            .lock()
            .expect("frames lock poisoned — prior test panicked")
            .contains(key))
    }

    async fn color_exists(&self, key: &str) -> Result<bool, CatalogError> {
        self.record(key);
        Ok(self
            .colors
            .lock()
            .expect("colors lock poisoned — prior test panicked")
            .contains(key))
    }
}
