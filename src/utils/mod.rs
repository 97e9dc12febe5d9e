pub mod fingerprint;
pub mod jwt;
