/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Built-in rocket transitions.

use super::{Transition, TransitionError, WriteMode};
use crate::store::Aggregate;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Status written by [`LaunchedTransition`].
pub const STATUS_LAUNCHED: &str = "launched";

/// Status written by [`ExplodedTransition`].
pub const STATUS_EXPLODED: &str = "exploded";

fn decode<T: DeserializeOwned>(kind: &'static str, payload: &[u8]) -> Result<T, TransitionError> {
    serde_json::from_slice(payload).map_err(|source| TransitionError::Decode { kind, source })
}

fn non_negative(field: &'static str, value: i64) -> Result<i64, TransitionError> {
    if value < 0 {
        return Err(TransitionError::InvalidField {
            field,
            reason: format!("must not be negative, got {value}"),
        });
    }
    Ok(value)
}

fn existing(
    kind: &'static str,
    prior: Option<&Aggregate>,
    key: &str,
) -> Result<Aggregate, TransitionError> {
    prior.cloned().ok_or_else(|| TransitionError::MissingAggregate {
        key: key.to_string(),
        kind,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LaunchedPayload {
    #[serde(rename = "type")]
    kind: String,
    launch_speed: i64,
    mission: String,
}

#[derive(Debug, Deserialize)]
struct SpeedChangedPayload {
    by: i64,
}

#[derive(Debug, Deserialize)]
struct ExplodedPayload {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MissionChangedPayload {
    new_mission: String,
}

/// `RocketLaunched`: sets type, speed, mission and status, creating the row.
#[derive(Debug, Default, Clone, Copy)]
pub struct LaunchedTransition;

impl Transition for LaunchedTransition {
    fn kind(&self) -> &'static str {
        "RocketLaunched"
    }

    fn write_mode(&self) -> WriteMode {
        WriteMode::Upsert
    }

    fn apply(
        &self,
        prior: Option<&Aggregate>,
        key: &str,
        sequence_num: u64,
        payload: &[u8],
    ) -> Result<Aggregate, TransitionError> {
        let payload: LaunchedPayload = decode(self.kind(), payload)?;
        let speed = non_negative("launchSpeed", payload.launch_speed)?;

        let mut next = prior
            .cloned()
            .unwrap_or_else(|| Aggregate::empty(key));
        next.kind = Some(payload.kind);
        next.speed = Some(speed);
        next.mission = Some(payload.mission);
        next.status = Some(STATUS_LAUNCHED.to_string());
        next.watermark = sequence_num;
        Ok(next)
    }
}

/// `RocketSpeedIncreased`: adds `by` to the speed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpeedIncreasedTransition;

impl Transition for SpeedIncreasedTransition {
    fn kind(&self) -> &'static str {
        "RocketSpeedIncreased"
    }

    fn apply(
        &self,
        prior: Option<&Aggregate>,
        key: &str,
        sequence_num: u64,
        payload: &[u8],
    ) -> Result<Aggregate, TransitionError> {
        let payload: SpeedChangedPayload = decode(self.kind(), payload)?;
        let by = non_negative("by", payload.by)?;

        let mut next = existing(self.kind(), prior, key)?;
        next.speed = Some(next.speed.unwrap_or(0).saturating_add(by));
        next.watermark = sequence_num;
        Ok(next)
    }
}

/// `RocketSpeedDecreased`: subtracts `by` from the speed, clamping at zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpeedDecreasedTransition;

impl Transition for SpeedDecreasedTransition {
    fn kind(&self) -> &'static str {
        "RocketSpeedDecreased"
    }

    fn apply(
        &self,
        prior: Option<&Aggregate>,
        key: &str,
        sequence_num: u64,
        payload: &[u8],
    ) -> Result<Aggregate, TransitionError> {
        let payload: SpeedChangedPayload = decode(self.kind(), payload)?;
        let by = non_negative("by", payload.by)?;

        let mut next = existing(self.kind(), prior, key)?;
        next.speed = Some(next.speed.unwrap_or(0).saturating_sub(by).max(0));
        next.watermark = sequence_num;
        Ok(next)
    }
}

/// `RocketExploded`: marks the rocket as exploded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplodedTransition;

impl Transition for ExplodedTransition {
    fn kind(&self) -> &'static str {
        "RocketExploded"
    }

    fn apply(
        &self,
        prior: Option<&Aggregate>,
        key: &str,
        sequence_num: u64,
        payload: &[u8],
    ) -> Result<Aggregate, TransitionError> {
        let payload: ExplodedPayload = decode(self.kind(), payload)?;
        if let Some(reason) = payload.reason.as_deref() {
            tracing::debug!(key, sequence_num, reason, "rocket exploded");
        }

        let mut next = existing(self.kind(), prior, key)?;
        next.status = Some(STATUS_EXPLODED.to_string());
        next.watermark = sequence_num;
        Ok(next)
    }
}

/// `RocketMissionChanged`: replaces the mission.
#[derive(Debug, Default, Clone, Copy)]
pub struct MissionChangedTransition;

impl Transition for MissionChangedTransition {
    fn kind(&self) -> &'static str {
        "RocketMissionChanged"
    }

    fn apply(
        &self,
        prior: Option<&Aggregate>,
        key: &str,
        sequence_num: u64,
        payload: &[u8],
    ) -> Result<Aggregate, TransitionError> {
        let payload: MissionChangedPayload = decode(self.kind(), payload)?;

        let mut next = existing(self.kind(), prior, key)?;
        next.mission = Some(payload.new_mission);
        next.watermark = sequence_num;
        Ok(next)
    }
}
