//! Environment lookups shared by the binaries
//!
//! The agent reads its listen address, port, and optional shared secret
//! from the environment (a `.env` file works too, via dotenv). The sampler
//! CLI falls back to `SAMPLER_URL` when no backend URL is given on the
//! command line or in a config file.

use std::net::Ipv4Addr;

const AGENT_PORT: &str = "AGENT_PORT";

const DEFAULT_PORT: u16 = 51411;

/// Port the agent listens on, `AGENT_PORT` or 51411
pub fn get_port() -> u16 {
    let port_from_env = std::env::var(AGENT_PORT);
    port_from_env.map_or(DEFAULT_PORT, |res| res.parse().unwrap_or(DEFAULT_PORT))
}

const AGENT_ADDR: &str = "AGENT_ADDR";

const DEFAULT_ADDR: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 0);

/// Address the agent binds, `AGENT_ADDR` or all interfaces
pub fn get_addr() -> Ipv4Addr {
    let addr_from_env = std::env::var(AGENT_ADDR);
    addr_from_env.map_or(DEFAULT_ADDR, |res| res.parse().unwrap_or(DEFAULT_ADDR))
}

const AGENT_SECRET: &str = "AGENT_SECRET";

/// Shared secret the agent requires on every request, if set
pub fn get_secret() -> Option<String> {
    let secret_from_env = std::env::var(AGENT_SECRET);
    secret_from_env.ok()
}

const SAMPLER_URL: &str = "SAMPLER_URL";

/// Backend URL fallback for the sampler CLI, if set
pub fn get_backend_url() -> Option<String> {
    let url_from_env = std::env::var(SAMPLER_URL);
    url_from_env.ok()
}
