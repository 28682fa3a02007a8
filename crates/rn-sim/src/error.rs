use rn_core::{CoreError, SegmentId, VehicleId};
use rn_motion::MotionError;
use rn_track::TrackError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("vehicle {vehicle}: {reason}")]
    InvalidVehicle {
        vehicle: VehicleId,
        reason:  &'static str,
    },

    #[error("{segment} already holds vehicle {holder}")]
    SegmentTaken {
        segment: SegmentId,
        holder:  VehicleId,
    },

    #[error("motion error: {0}")]
    Motion(#[from] MotionError),

    #[error("track error: {0}")]
    Track(#[from] TrackError),
}

pub type SimResult<T> = Result<T, SimError>;
