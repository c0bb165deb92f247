//! # Command registry bridge
//!
//! Two cooperating halves, one per side of the connection. Business logic
//! flows exclusively through RPC round trips; there is no shared memory
//! between them.
//!
//! Method names are part of the wire contract, like the proxy ids in
//! [`crate::ident`].

pub mod ext;
pub mod host;

pub(crate) mod methods {
    pub const REGISTER_COMMAND: &str = "register-command";
    pub const UNREGISTER_COMMAND: &str = "unregister-command";
    pub const EXECUTE_COMMAND: &str = "execute-command";
    pub const GET_COMMANDS: &str = "get-commands";
}
