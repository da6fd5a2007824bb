pub(crate) mod classification;
pub(crate) mod enrollment;
pub(crate) mod task_fanout;
