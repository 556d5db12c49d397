//! Protobuf messages carried inside each RecordIO record.
//!
//! Field numbers follow the `Record` schema read by common topic-model
//! trainers, so only the tensor variants are modelled.
use std::collections::HashMap;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Float32Tensor {
    #[prost(float, repeated, tag = "1")]
    pub values: Vec<f32>,
    #[prost(uint64, repeated, tag = "2")]
    pub keys: Vec<u64>,
    #[prost(uint64, repeated, tag = "3")]
    pub shape: Vec<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Float64Tensor {
    #[prost(double, repeated, tag = "1")]
    pub values: Vec<f64>,
    #[prost(uint64, repeated, tag = "2")]
    pub keys: Vec<u64>,
    #[prost(uint64, repeated, tag = "3")]
    pub shape: Vec<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Int32Tensor {
    #[prost(int32, repeated, tag = "1")]
    pub values: Vec<i32>,
    #[prost(uint64, repeated, tag = "2")]
    pub keys: Vec<u64>,
    #[prost(uint64, repeated, tag = "3")]
    pub shape: Vec<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(oneof = "value::Kind", tags = "2, 3, 7")]
    pub kind: Option<value::Kind>,
}

pub mod value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        #[prost(message, tag = "2")]
        Float32Tensor(super::Float32Tensor),
        #[prost(message, tag = "3")]
        Float64Tensor(super::Float64Tensor),
        #[prost(message, tag = "7")]
        Int32Tensor(super::Int32Tensor),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Record {
    #[prost(map = "string, message", tag = "1")]
    pub features: HashMap<String, Value>,
    #[prost(map = "string, message", tag = "2")]
    pub label: HashMap<String, Value>,
    #[prost(string, optional, tag = "3")]
    pub uid: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub metadata: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub configuration: Option<String>,
}
