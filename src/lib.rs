pub mod config;
pub mod devtools_guard;
pub mod domain_lock;
pub mod errors;
pub mod guard;
pub mod logger;
pub mod metrics;
pub mod obfuscator;
pub mod pipeline;
pub mod tamper_seal;
