use prost::{Message, Oneof};

#[derive(Clone, PartialEq, Message)]
pub struct LayoutIr {
    #[prost(uint32, tag = "1")]
    pub version: u32,
    #[prost(message, repeated, tag = "2")]
    pub paramdefs: Vec<ParamdefIr>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ParamdefIr {
    #[prost(string, tag = "1")]
    pub param_type: String,
    #[prost(int32, tag = "2")]
    pub data_version: i32,
    #[prost(bool, tag = "3")]
    pub big_endian: bool,
    #[prost(bool, tag = "4")]
    pub unicode: bool,
    #[prost(int32, tag = "5")]
    pub format_version: i32,
    #[prost(uint64, tag = "6")]
    pub size: u64,
    #[prost(uint64, optional, tag = "7")]
    pub detected_size: Option<u64>,
    #[prost(message, repeated, tag = "8")]
    pub fields: Vec<FieldIr>,
    #[prost(message, repeated, tag = "9")]
    pub groups: Vec<GroupIr>,
}

#[derive(Clone, PartialEq, Message)]
pub struct FieldIr {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub kind: String,
    #[prost(string, tag = "3")]
    pub internal_type: String,
    #[prost(uint64, optional, tag = "4")]
    pub offset: Option<u64>,
    #[prost(bool, tag = "5")]
    pub is_bool: bool,
    #[prost(string, optional, tag = "6")]
    pub default: Option<String>,
    #[prost(oneof = "field_ir::Layout", tags = "7, 8, 9, 10")]
    pub layout: Option<field_ir::Layout>,
}

pub mod field_ir {
    use super::*;

    #[derive(Clone, PartialEq, Oneof)]
    pub enum Layout {
        #[prost(message, tag = "7")]
        SizedScalar(super::SizedScalarLayout),
        #[prost(message, tag = "8")]
        SizedArray(super::SizedArrayLayout),
        #[prost(message, tag = "9")]
        ZeroSize(super::ZeroSizeLayout),
        #[prost(message, tag = "10")]
        BitfieldMember(super::BitfieldMemberLayout),
    }
}

#[derive(Clone, PartialEq, Message)]
pub struct SizedScalarLayout {
    #[prost(uint64, tag = "1")]
    pub size: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct SizedArrayLayout {
    #[prost(uint64, tag = "1")]
    pub length: u64,
    #[prost(uint64, tag = "2")]
    pub element_size: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ZeroSizeLayout {
    #[prost(string, tag = "1")]
    pub reason: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct BitfieldMemberLayout {
    #[prost(uint32, tag = "1")]
    pub group: u32,
    #[prost(uint32, tag = "2")]
    pub bit_offset: u32,
    #[prost(uint32, tag = "3")]
    pub bit_width: u32,
    #[prost(string, tag = "4")]
    pub mask: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct GroupIr {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub storage: String,
    #[prost(uint64, tag = "4")]
    pub offset: u64,
    #[prost(uint32, tag = "5")]
    pub capacity: u32,
    #[prost(uint32, tag = "6")]
    pub used_bits: u32,
    #[prost(string, repeated, tag = "7")]
    pub members: Vec<String>,
}
