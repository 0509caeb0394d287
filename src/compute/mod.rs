pub mod binding;
pub mod store;

pub use binding::{
    BindingConfig, BindingId, CapacityPlacement, ComputeBinding, ComputeBindingBuilder, LayerRef, RolloutPolicy,
    Runtime, POOLED_QUALIFIER,
};
pub use store::{DataStore, TENANT_PARTITION_KEY};
