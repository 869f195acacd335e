pub mod ir;
pub mod ir_proto;
pub mod serialization;
