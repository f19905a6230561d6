pub mod diagnostic_op;
pub mod list_monitors_op;
pub mod login_op;
pub mod op_helper;
pub mod snapshot_op;
