//! Command Handlers module
//!
//! Handlers that orchestrate business operations. Each handler owns the
//! transactional boundary for its command.

mod commands;
mod create_invitation;
mod delete_invitation;
mod publish_invitation;
mod topup;
mod update_invitation;


pub use commands::*;
pub use create_invitation::CreateInvitationHandler;
pub use delete_invitation::DeleteInvitationHandler;
pub use publish_invitation::PublishInvitationHandler;
pub use topup::TopupHandler;
pub use update_invitation::UpdateInvitationHandler;
