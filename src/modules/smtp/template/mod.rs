// Copyright © 2025 hackmailer contributors
// Licensed under the hackmailer project license.
// Unauthorized copying, modification, or distribution is prohibited.

pub mod entity;
pub mod fetch;
pub mod render;
pub mod send;
#[cfg(test)]
mod tests;
