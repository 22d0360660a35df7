/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Tests for the Sequencer module.


use crate::sequencer::InboundEvent;

pub(crate) fn launched(key: &str, sequence_num: u64, speed: i64, mission: &str) -> InboundEvent {
    InboundEvent::new(
        key,
        sequence_num,
        "RocketLaunched",
        format!(r#"{{"type":"Falcon-9","launchSpeed":{speed},"mission":"{mission}"}}"#),
    )
}

pub(crate) fn speed_increased(key: &str, sequence_num: u64, by: i64) -> InboundEvent {
    InboundEvent::new(
        key,
        sequence_num,
        "RocketSpeedIncreased",
        format!(r#"{{"by":{by}}}"#),
    )
}

pub(crate) fn speed_decreased(key: &str, sequence_num: u64, by: i64) -> InboundEvent {
    InboundEvent::new(
        key,
        sequence_num,
        "RocketSpeedDecreased",
        format!(r#"{{"by":{by}}}"#),
    )
}
