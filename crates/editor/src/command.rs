//! JSON command protocol for scripted sessions.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use shared::{BoxDimensions, FaceLabel, PrimitiveKind, PrimitiveRef};

use crate::editor::ClickOutcome;
use crate::harness::TestHarness;
use crate::viewport::OrbitCamera;

/// A command a script can execute against the editor.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    /// Choose which primitive kind the pointer picks
    SetMode { kind: PrimitiveKind },
    SetViewport { width: f32, height: f32 },
    /// Place the orbit camera (angles in degrees)
    SetCamera {
        yaw: f32,
        pitch: f32,
        distance: f32,
        #[serde(default)]
        target: [f32; 3],
    },
    /// Orbit the current camera (degrees) and zoom by a fraction of the distance
    Orbit {
        #[serde(default)]
        dx: f32,
        #[serde(default)]
        dy: f32,
        #[serde(default)]
        zoom: f32,
    },
    /// Pointer position in screen pixels
    PointerMove { x: f32, y: f32 },
    /// Pointer position in normalized device coordinates
    PointerNdc { x: f32, y: f32 },
    /// Click on whatever is hovered
    Click,
    /// Toggle a primitive directly; faces may be given by name
    Select {
        kind: PrimitiveKind,
        #[serde(default)]
        index: Option<usize>,
        #[serde(default)]
        face: Option<FaceLabel>,
    },
    /// Replace the solid with a fresh box (missing sizes keep the current ones)
    Reset {
        #[serde(default)]
        width: Option<f32>,
        #[serde(default)]
        height: Option<f32>,
        #[serde(default)]
        depth: Option<f32>,
    },
    /// Report the editor state
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Click/select result; a failed carve makes the whole response unsuccessful
fn outcome_response(outcome: &ClickOutcome) -> CommandResponse {
    let mut data = serde_json::json!({
        "target": to_value(&outcome.target),
        "added": outcome.toggle.added,
        "evicted": to_value(&outcome.toggle.evicted),
    });
    let mut error = None;
    match &outcome.carve {
        Some(Ok(report)) => data["carve"] = to_value(report),
        Some(Err(e)) => error = Some(e.to_string()),
        None => {}
    }
    CommandResponse {
        success: error.is_none(),
        error,
        data: Some(data),
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: EditorCommand) -> CommandResponse {
    match cmd {
        EditorCommand::SetMode { kind } => {
            harness.editor.set_active_kind(kind);
            CommandResponse::ok()
        }

        EditorCommand::SetViewport { width, height } => {
            harness.editor.set_viewport(width, height);
            let camera = harness.camera;
            harness.set_camera(camera);
            CommandResponse::ok()
        }

        EditorCommand::SetCamera {
            yaw,
            pitch,
            distance,
            target,
        } => {
            harness.set_camera(OrbitCamera {
                yaw: yaw.to_radians(),
                pitch: pitch.to_radians().clamp(-1.5, 1.5),
                distance,
                target: Vec3::from_array(target),
                ..OrbitCamera::default()
            });
            CommandResponse::ok()
        }

        EditorCommand::Orbit { dx, dy, zoom } => {
            let mut camera = harness.camera;
            camera.rotate(dx, dy);
            camera.zoom(zoom);
            harness.set_camera(camera);
            CommandResponse::ok_with_data(to_value(&camera))
        }

        EditorCommand::PointerMove { x, y } => {
            let hover = harness.editor.pointer_move(Vec2::new(x, y));
            CommandResponse::ok_with_data(serde_json::json!({ "hover": to_value(&hover) }))
        }

        EditorCommand::PointerNdc { x, y } => {
            let hover = harness.editor.pointer_move_ndc(Vec2::new(x, y));
            CommandResponse::ok_with_data(serde_json::json!({ "hover": to_value(&hover) }))
        }

        EditorCommand::Click => match harness.editor.click() {
            Some(outcome) => outcome_response(&outcome),
            None => CommandResponse::ok_with_data(serde_json::json!({ "target": null })),
        },

        EditorCommand::Select { kind, index, face } => {
            let index = match (kind, face, index) {
                (PrimitiveKind::Face, Some(face), _) => face.index(),
                (_, _, Some(index)) => index,
                _ => return CommandResponse::err("select needs an index (or a face name)"),
            };
            match harness.editor.select(PrimitiveRef { kind, index }) {
                Ok(outcome) => outcome_response(&outcome),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        EditorCommand::Reset {
            width,
            height,
            depth,
        } => {
            let current = harness.editor.solid().dims;
            let dims = BoxDimensions::new(
                width.unwrap_or(current.width),
                height.unwrap_or(current.height),
                depth.unwrap_or(current.depth),
            );
            match harness.editor.reset(dims) {
                Ok(()) => CommandResponse::ok_with_data(to_value(&dims)),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        EditorCommand::Inspect => CommandResponse::ok_with_data(to_value(&harness.inspect())),
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: EditorCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<EditorCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serde_click() {
        let cmd: EditorCommand = serde_json::from_str(r#"{"command": "click"}"#).unwrap();
        assert!(matches!(cmd, EditorCommand::Click));
    }

    #[test]
    fn test_command_serde_select_face_alias() {
        let json = r#"{"command": "select", "kind": "face", "face": "frente"}"#;
        let cmd: EditorCommand = serde_json::from_str(json).unwrap();
        match cmd {
            EditorCommand::Select { kind, face, index } => {
                assert_eq!(kind, PrimitiveKind::Face);
                assert_eq!(face, Some(FaceLabel::Front));
                assert_eq!(index, None);
            }
            _ => panic!("Expected Select"),
        }
    }

    #[test]
    fn test_command_serde_set_camera_default_target() {
        let json = r#"{"command": "set_camera", "yaw": 30, "pitch": 20, "distance": 12}"#;
        match serde_json::from_str::<EditorCommand>(json).unwrap() {
            EditorCommand::SetCamera { target, distance, .. } => {
                assert_eq!(target, [0.0; 3]);
                assert_eq!(distance, 12.0);
            }
            _ => panic!("Expected SetCamera"),
        }
    }

    #[test]
    fn test_execute_orbit() {
        let mut h = TestHarness::new().unwrap();
        let before = h.camera;
        let resp = execute_json(&mut h, r#"{"command": "orbit", "dx": 90, "zoom": 0.5}"#).unwrap();
        assert!(resp.success);
        assert!((h.camera.yaw - before.yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(h.camera.pitch, before.pitch);
        assert!((h.camera.distance - before.distance * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_execute_inspect() {
        let mut h = TestHarness::new().unwrap();
        let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
        assert!(resp.success);
        let data = resp.data.unwrap();
        assert_eq!(data["edges"], 12);
        assert_eq!(data["mode"], "face");
        assert_eq!(data["closed"], true);
    }

    #[test]
    fn test_execute_select_out_of_range() {
        let mut h = TestHarness::new().unwrap();
        let resp = execute_json(&mut h, r#"{"command": "select", "kind": "edge", "index": 40}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("40"));
    }

    #[test]
    fn test_execute_select_without_index() {
        let mut h = TestHarness::new().unwrap();
        let resp = execute_json(&mut h, r#"{"command": "select", "kind": "vertex"}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_execute_reset_invalid() {
        let mut h = TestHarness::new().unwrap();
        let resp = execute_json(&mut h, r#"{"command": "reset", "height": -1.0}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(h.inspect().dims, BoxDimensions::default());
    }

    #[test]
    fn test_click_without_hover() {
        let mut h = TestHarness::new().unwrap();
        let resp = execute_json(&mut h, r#"{"command": "click"}"#).unwrap();
        assert!(resp.success);
        assert!(resp.data.unwrap()["target"].is_null());
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = TestHarness::new().unwrap();
        let result = execute_json(&mut h, "not valid json");
        assert!(result.is_err());
        assert!(execute_json_batch(&mut h, "{}").is_err());
    }
}
