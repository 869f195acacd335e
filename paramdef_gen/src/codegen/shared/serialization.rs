use super::ir::{FieldIr, FieldLayoutIr, GroupIr, LayoutIr, ParamdefIr};
use super::ir_proto;
use prost::Message;
use thiserror::Error;

/// Serialize the layout IR into pretty JSON.
pub fn layout_ir_to_json(layout_ir: &LayoutIr) -> Result<String, IrSerializationError> {
    Ok(serde_json::to_string_pretty(layout_ir)?)
}

/// Serialize the layout IR into a protobuf byte vector.
pub fn layout_ir_to_protobuf(layout_ir: &LayoutIr) -> Result<Vec<u8>, IrSerializationError> {
    let proto: ir_proto::LayoutIr = layout_ir.into();
    let mut buf = Vec::with_capacity(proto.encoded_len());
    proto.encode(&mut buf).map_err(IrSerializationError::from)?;
    Ok(buf)
}

#[derive(Debug, Error)]
pub enum IrSerializationError {
    #[error("failed to encode protobuf: {0}")]
    ProtobufEncode(#[from] prost::EncodeError),
    #[error("failed to serialize json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<&LayoutIr> for ir_proto::LayoutIr {
    fn from(value: &LayoutIr) -> Self {
        Self {
            version: value.version,
            paramdefs: value.paramdefs.iter().map(ir_proto::ParamdefIr::from).collect(),
        }
    }
}

impl From<&ParamdefIr> for ir_proto::ParamdefIr {
    fn from(value: &ParamdefIr) -> Self {
        Self {
            param_type: value.param_type.clone(),
            data_version: value.data_version,
            big_endian: value.big_endian,
            unicode: value.unicode,
            format_version: value.format_version,
            size: value.size,
            detected_size: value.detected_size,
            fields: value.fields.iter().map(ir_proto::FieldIr::from).collect(),
            groups: value.groups.iter().map(ir_proto::GroupIr::from).collect(),
        }
    }
}

impl From<&FieldIr> for ir_proto::FieldIr {
    fn from(value: &FieldIr) -> Self {
        use ir_proto::field_ir::Layout;
        let layout = match &value.layout {
            FieldLayoutIr::SizedScalar { size } => {
                Layout::SizedScalar(ir_proto::SizedScalarLayout { size: *size })
            }
            FieldLayoutIr::SizedArray {
                length,
                element_size,
            } => Layout::SizedArray(ir_proto::SizedArrayLayout {
                length: *length,
                element_size: *element_size,
            }),
            FieldLayoutIr::ZeroSize { reason } => Layout::ZeroSize(ir_proto::ZeroSizeLayout {
                reason: reason.clone(),
            }),
            FieldLayoutIr::BitfieldMember {
                group,
                bit_offset,
                bit_width,
                mask,
            } => Layout::BitfieldMember(ir_proto::BitfieldMemberLayout {
                group: *group,
                bit_offset: *bit_offset,
                bit_width: *bit_width,
                mask: mask.clone(),
            }),
        };

        Self {
            name: value.name.clone(),
            kind: value.kind.clone(),
            internal_type: value.internal_type.clone(),
            offset: value.offset,
            is_bool: value.is_bool,
            default: value.default.clone(),
            layout: Some(layout),
        }
    }
}

impl From<&GroupIr> for ir_proto::GroupIr {
    fn from(value: &GroupIr) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            storage: value.storage.clone(),
            offset: value.offset,
            capacity: value.capacity,
            used_bits: value.used_bits,
            members: value.members.clone(),
        }
    }
}
