mod tab_locks;
mod volume_pipeline;

pub(crate) use tab_locks::TabLocks;

pub use volume_pipeline::VolumePipeline;
