use serde_derive::{Deserialize, Serialize};

/// Detected-size value meaning "no size was observed".
pub const UNKNOWN_SIZE: i64 = -1;

fn unknown_size() -> i64 {
    UNKNOWN_SIZE
}

/// One named param table observed in regulation data.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ParamInfo {
    /// Param table name (e.g. `EquipParamWeapon`).
    pub name: String,
    /// Paramdef type the rows are laid out with.
    pub param_type: String,
    /// Row size observed in the decoded param, or `-1`.
    #[serde(default = "unknown_size")]
    pub detected_size: i64,
    /// Paramdef data version recorded in the param file, when known.
    #[serde(default)]
    pub paramdef_data_version: Option<u16>,
}

impl ParamInfo {
    pub fn detected_size(&self) -> Option<u64> {
        u64::try_from(self.detected_size).ok()
    }

    /// The recorded paramdef data version, else `fallback` (the schema's own
    /// version); out-of-range fallbacks degrade to 0.
    pub fn data_version_or(&self, fallback: i32) -> u16 {
        self.paramdef_data_version
            .unwrap_or_else(|| u16::try_from(fallback).unwrap_or(0))
    }
}

/// The list of params produced by the regulation reader.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ParamManifest {
    #[serde(default)]
    pub params: Vec<ParamInfo>,
}

impl ParamManifest {
    /// Detected row size for a paramdef type; the first param of that type wins.
    pub fn detected_size(&self, param_type: &str) -> Option<u64> {
        self.params
            .iter()
            .find(|param| param.param_type == param_type)
            .and_then(ParamInfo::detected_size)
    }
}
