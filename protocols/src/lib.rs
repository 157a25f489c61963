//! Wire codecs for the name lookups that talk to hosts directly.
//!
//! Nothing in here touches a socket: every function turns a request into bytes
//! or a reply payload into a value.

pub mod dns;
pub mod mdns;
pub mod netbios;
