//! JSON-RPC method names used by the staking tools.

pub const GET_BALANCE: &str = "itc_getBalance";
pub const GET_SHARD_ID: &str = "itc_getShardID";
pub const GET_SHARDING_STRUCTURE: &str = "itc_getShardingStructure";
pub const SEND_RAW_STAKING_TRANSACTION: &str = "itc_sendRawStakingTransaction";
pub const GET_TRANSACTION_RECEIPT: &str = "itc_getTransactionReceipt";
pub const GET_CURRENT_STAKING_ERROR_SINK: &str = "itc_getCurrentStakingErrorSink";
pub const GET_TRANSACTION_COUNT: &str = "itc_getTransactionCount";
