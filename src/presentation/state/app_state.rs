use std::sync::Arc;

use crate::application::ports::GenerationClient;
use crate::application::services::{AudioProcessingService, ChunkReceiver};
use crate::presentation::config::{ScaffoldConfig, Settings};

pub struct AppState<G: ?Sized>
where
    G: GenerationClient,
{
    pub chunk_receiver: Arc<ChunkReceiver>,
    pub processing: Arc<AudioProcessingService<G>>,
    pub settings: Settings,
    pub scaffold_config: ScaffoldConfig,
}

impl<G: ?Sized> Clone for AppState<G>
where
    G: GenerationClient,
{
    fn clone(&self) -> Self {
        Self {
            chunk_receiver: Arc::clone(&self.chunk_receiver),
            processing: Arc::clone(&self.processing),
            settings: self.settings.clone(),
            scaffold_config: self.scaffold_config.clone(),
        }
    }
}
