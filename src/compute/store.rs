use serde::{Deserialize, Serialize};

use super::CapacityPlacement;
use crate::iam::DeploymentEnvironment;

/// Partition key shared by every tenant-isolated store
pub const TENANT_PARTITION_KEY: &str = "tenantId";

const READ_ACTIONS: &[&str] = &[
    "dynamodb:BatchGetItem",
    "dynamodb:ConditionCheckItem",
    "dynamodb:DescribeTable",
    "dynamodb:GetItem",
    "dynamodb:GetRecords",
    "dynamodb:GetShardIterator",
    "dynamodb:Query",
    "dynamodb:Scan",
];

const WRITE_ACTIONS: &[&str] = &[
    "dynamodb:BatchWriteItem",
    "dynamodb:DeleteItem",
    "dynamodb:DescribeTable",
    "dynamodb:PutItem",
    "dynamodb:UpdateItem",
];

/// A service's exclusive key-value store, partitioned by tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStore {
    pub name: String,
    pub identifier: String,
    pub partition_key: String,
    pub sort_key: String,
    pub placement: CapacityPlacement,
}

impl DataStore {
    pub fn new(
        service: &str,
        sort_key: &str,
        placement: CapacityPlacement,
        env: &DeploymentEnvironment,
    ) -> Self {
        let name = format!("{}-{}", service, placement.stack_qualifier());
        let identifier = env.arn("dynamodb", &format!("table/{}", name));

        Self {
            name,
            identifier,
            partition_key: TENANT_PARTITION_KEY.to_string(),
            sort_key: sort_key.to_string(),
            placement,
        }
    }

    pub fn read_actions(&self) -> &'static [&'static str] {
        READ_ACTIONS
    }

    pub fn write_actions(&self) -> &'static [&'static str] {
        WRITE_ACTIONS
    }
}
