//! Normalization of free-form robot control commands.

use serde_json::{Map, Value};

use crate::api::{MoveCommand, MoveDirection};

/// Backend contract bounds for a movement.
const SPEED_RANGE: (f64, f64) = (0.0, 1.0);
const DURATION_RANGE_MS: (f64, f64) = (0.0, 10_000.0);
const DEFAULT_SPEED: f64 = 0.5;
const DEFAULT_DURATION_MS: f64 = 300.0;

/// A normalized robot control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotCommand {
    Move(MoveDirection),
    Stop,
    Estop,
}

/// Map a free-form command string onto a canonical action.
///
/// The model emits many aliases (`move_forward`, `front`, `turn_left`, …).
/// Anything unrecognized normalizes to `Stop`: a wrong-but-safe halt beats
/// an error on a moving chassis.
pub fn normalize_cmd(raw: &str) -> RobotCommand {
    let normalized: String = raw
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    match normalized.as_str() {
        "front" | "move_front" | "move_forward" | "forward" => {
            RobotCommand::Move(MoveDirection::Forward)
        }
        "back" | "move_back" | "move_backward" | "backward" => {
            RobotCommand::Move(MoveDirection::Backward)
        }
        "move_left" | "turn_left" | "left" => RobotCommand::Move(MoveDirection::Left),
        "move_right" | "turn_right" | "right" => RobotCommand::Move(MoveDirection::Right),
        "move_forward_left" | "forward_left" => RobotCommand::Move(MoveDirection::ForwardLeft),
        "move_forward_right" | "forward_right" => RobotCommand::Move(MoveDirection::ForwardRight),
        "move_back_left" | "back_left" | "move_backward_left" | "backward_left" => {
            RobotCommand::Move(MoveDirection::BackwardLeft)
        }
        "move_back_right" | "back_right" | "move_backward_right" | "backward_right" => {
            RobotCommand::Move(MoveDirection::BackwardRight)
        }
        "stop" | "halt" => RobotCommand::Stop,
        "estop" | "e_stop" | "emergency_stop" => RobotCommand::Estop,
        _ => RobotCommand::Stop,
    }
}

/// Build the `/control/move` payload for a directional command, clamping
/// `speed` and `duration_ms` into the backend contract and applying
/// defaults for absent or non-numeric values.
pub fn move_payload(direction: MoveDirection, arguments: &Map<String, Value>) -> MoveCommand {
    let speed = arguments
        .get("speed")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_SPEED)
        .clamp(SPEED_RANGE.0, SPEED_RANGE.1);
    let duration_ms = arguments
        .get("duration_ms")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_DURATION_MS)
        .clamp(DURATION_RANGE_MS.0, DURATION_RANGE_MS.1);

    MoveCommand {
        command: direction,
        speed: Some(speed),
        duration_ms: Some(duration_ms.round() as u64),
    }
}
