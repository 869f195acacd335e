// Re-export from paramdef_types so the generator can refer to one path
pub use paramdef_types::{
    FieldDef, NOT_A_BITFIELD, ParamInfo, ParamManifest, Paramdef, PrimitiveKind, UNKNOWN_SIZE,
};
