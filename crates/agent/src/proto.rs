//! Generated protobuf / tonic code for `diagnosticspb`.

tonic::include_proto!("diagnosticspb");
