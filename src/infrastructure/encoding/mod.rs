mod drawtext;
mod encode_task;
mod ffmpeg_api_transcoder;
mod filter_graph;

pub use drawtext::drawtext_chain;
pub use encode_task::{EncodeTask, TaskInput, TaskOutput, seconds_arg};
pub use ffmpeg_api_transcoder::FfmpegApiTranscoder;
pub use filter_graph::{
    Filter, FilterChain, FilterGraph, FilterNode, GraphOutputs, LOUDNESS_RANGE,
    LOUDNESS_TARGET_LUFS, StreamKind, StreamRef, TRUE_PEAK_DB,
};
