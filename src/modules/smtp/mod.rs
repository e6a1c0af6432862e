// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

pub mod client;
pub mod executor;
pub mod manager;
pub mod pool;
pub mod template;
pub mod transport;
pub mod util;
