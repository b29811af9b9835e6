//! Editor settings

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{BoxDimensions, PrimitiveKind};

use crate::error::SettingsError;
use crate::viewport::Appearance;

/// Pointer picking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingSettings {
    /// Edge hit radius in pixels
    pub edge_px: f32,
    /// Vertex hit radius in pixels
    pub vertex_px: f32,
    /// Viewport size assumed until the host reports one
    pub viewport: [f32; 2],
}

impl Default for PickingSettings {
    fn default() -> Self {
        Self {
            edge_px: 6.0,
            vertex_px: 8.0,
            viewport: [800.0, 600.0],
        }
    }
}

/// Cutter planning constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarveSettings {
    /// Face cutter thickness along the normal, as a fraction of the extent there
    pub face_thickness_fraction: f32,
    /// Face cutter center offset from the solid center, as a fraction of the extent
    pub face_offset_fraction: f32,
    /// Subtracted from the height for the Y size of side cutters
    pub height_clearance: f32,
    pub mitre_degrees: f32,
    /// Upward shift of front/back face cutters, as a fraction of the height
    pub mitre_lift_fraction: f32,
    /// Added at both ends of through-cuts, as a fraction of the extent
    pub cut_overshoot: f32,
    /// Thickness of straight edge notches, capped at the face cutter thickness
    pub edge_notch_width: f32,
    /// Inward shift of edge cutters from the edge's face plane, as a fraction of the extent
    pub edge_offset_fraction: f32,
    /// Distance of the vertex-batch cutter from the centroid along the normal,
    /// capped at a quarter of the cutter thickness
    pub vertex_offset: f32,
    /// Allowed off-plane distance of the 4th vertex, relative to selection size
    pub coplanarity_tolerance: f32,
    pub min_cutter_size: f32,
}

impl Default for CarveSettings {
    fn default() -> Self {
        Self {
            face_thickness_fraction: 0.125,
            face_offset_fraction: 0.5,
            height_clearance: 0.07,
            mitre_degrees: 45.0,
            mitre_lift_fraction: 0.3,
            cut_overshoot: 0.01,
            edge_notch_width: 0.9,
            edge_offset_fraction: 0.019,
            vertex_offset: 0.1,
            coplanarity_tolerance: 1e-3,
            min_cutter_size: 1e-4,
        }
    }
}

/// Colors pushed to the host (RGB, 0..1)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    pub face: [f32; 3],
    pub edge: [f32; 3],
    pub vertex: [f32; 3],
    pub hovered: [f32; 3],
    pub selected: [f32; 3],
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            face: [0.5, 0.5, 0.5],
            edge: [1.0, 1.0, 0.0],
            vertex: [0.0, 1.0, 0.0],
            hovered: [1.0, 0.65, 0.0],
            selected: [1.0, 0.0, 0.0],
        }
    }
}

impl AppearanceSettings {
    pub fn color_for(&self, kind: PrimitiveKind, appearance: Appearance) -> [f32; 3] {
        match appearance {
            Appearance::Hovered => self.hovered,
            Appearance::Selected => self.selected,
            Appearance::Default => match kind {
                PrimitiveKind::Face => self.face,
                PrimitiveKind::Edge => self.edge,
                PrimitiveKind::Vertex => self.vertex,
            },
        }
    }
}

/// All editor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Initial solid
    pub solid: BoxDimensions,
    pub picking: PickingSettings,
    pub carve: CarveSettings,
    pub appearance: AppearanceSettings,
    /// Dihedral angle above which a rebuilt edge counts as a feature edge
    pub sharp_edge_degrees: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            solid: BoxDimensions::default(),
            picking: PickingSettings::default(),
            carve: CarveSettings::default(),
            appearance: AppearanceSettings::default(),
            sharp_edge_degrees: 1.0,
        }
    }
}

impl EditorSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "carve", "carve-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from the user config dir, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings to the user config dir
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let s: EditorSettings =
            serde_json::from_str(r#"{ "carve": { "mitre_degrees": 30.0 }, "sharp_edge_degrees": 5.0 }"#)
                .unwrap();
        assert_eq!(s.carve.mitre_degrees, 30.0);
        assert_eq!(s.carve.height_clearance, 0.07);
        assert_eq!(s.sharp_edge_degrees, 5.0);
        assert_eq!(s.solid, BoxDimensions::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("carve-editor-settings-{}", std::process::id()))
            .join("settings.json");
        let mut s = EditorSettings::default();
        s.picking.edge_px = 11.0;
        s.save_to(&path).unwrap();
        let loaded = EditorSettings::load_from(&path).unwrap();
        assert_eq!(loaded.picking.edge_px, 11.0);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = EditorSettings::load_from(Path::new("/nonexistent/carve/settings.json"));
        assert!(matches!(err, Err(SettingsError::Io(_))));
    }

    #[test]
    fn test_color_for() {
        let a = AppearanceSettings::default();
        assert_eq!(a.color_for(PrimitiveKind::Edge, Appearance::Default), a.edge);
        assert_eq!(a.color_for(PrimitiveKind::Face, Appearance::Selected), a.selected);
    }
}
