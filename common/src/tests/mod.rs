mod credential;
mod error_location;
mod rpc_status;
