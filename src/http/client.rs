//! Upstream client construction.
//!
//! Every relay owns one client, built here with redirect-following turned off.
//! The policy is fixed at construction; nothing mutates a client afterwards,
//! so concurrent requests never observe each other's settings.
//!
//! Proxy environment variables are ignored: the host has already decided
//! where the request goes.

use reqwest::{redirect, Client};

use crate::plugin::registration::RelayOptions;

/// Build a client that hands back the first response, 3xx included.
pub fn build_client(options: &RelayOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .redirect(redirect::Policy::none())
        .no_proxy()
        .connect_timeout(options.connect_timeout());

    if let Some(timeout) = options.timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build()
}
