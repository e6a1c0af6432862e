// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

pub mod context;
pub mod dispatch;
pub mod error;
pub mod logger;
pub mod rest;
pub mod settings;
pub mod smtp;
pub mod utils;
