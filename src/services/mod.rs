pub mod badges;
pub mod guest_identity;
pub mod notify;
