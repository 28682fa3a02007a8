use rn_core::SegmentId;
use rn_track::TrackError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("cannot place vehicle: {0}")]
    Track(#[from] TrackError),

    #[error("distance {distance} is outside {segment} (length {length})")]
    OutOfRange { segment: SegmentId, distance: f64, length: f64 },
}

pub type MotionResult<T> = Result<T, MotionError>;
