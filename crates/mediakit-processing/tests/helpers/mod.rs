#![allow(dead_code)]

pub mod codec;
pub mod fixtures;
pub mod storage;

use std::sync::Arc;

use mediakit_core::ProcessingConfig;
use mediakit_processing::{AttachmentService, CodecAdapter};
use mediakit_storage::{MemoryStorage, Storage};

pub use codec::ScriptedCodec;

/// Service wired to a scripted codec and in-memory storage
pub struct TestPipeline {
    pub service: AttachmentService,
    pub codec: Arc<ScriptedCodec>,
    pub storage: Arc<MemoryStorage>,
}

pub fn setup_pipeline(codec: ScriptedCodec) -> TestPipeline {
    setup_pipeline_with_config(codec, ProcessingConfig::default())
}

pub fn setup_pipeline_with_config(codec: ScriptedCodec, config: ProcessingConfig) -> TestPipeline {
    let codec = codec.into_arc();
    let storage = Arc::new(MemoryStorage::new());
    let service = AttachmentService::new(
        &config,
        codec.clone() as Arc<dyn CodecAdapter>,
        storage.clone() as Arc<dyn Storage>,
    )
    .expect("mime table covers every container");

    TestPipeline {
        service,
        codec,
        storage,
    }
}
